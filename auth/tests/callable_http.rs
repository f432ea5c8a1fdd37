//! HTTP tests for the role service routes.

#![cfg(feature = "axum")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use shiptrack_auth::handlers::roles::RoleResponse;
use shiptrack_auth::handlers::triggers::UserCreatedResponse;
use shiptrack_auth::mocks::InMemoryIdentityStore;
use shiptrack_auth::{role_router, CallableState, Claims, Role};
use shiptrack_web::error::ErrorBody;

const SECRET: &str = "trigger-secret";

fn server() -> (InMemoryIdentityStore, TestServer) {
    let store = InMemoryIdentityStore::new();
    store.insert_user("u1", Claims::new().with("foo", 1));
    store.insert_user("admin", Claims::new().with_role(Role::Admin));
    store.insert_user("sender", Claims::new().with_role(Role::Sender));

    let state = CallableState::with_trigger_secret(store.clone(), store.clone(), SECRET);
    let server = TestServer::new(role_router(state)).unwrap();
    (store, server)
}

fn token(uid: &str) -> String {
    InMemoryIdentityStore::issue_token(uid)
}

#[tokio::test]
async fn set_user_role_assigns_to_caller() {
    let (store, server) = server();

    let response = server
        .post("/setUserRole")
        .authorization_bearer(token("u1"))
        .json(&json!({ "role": "SENDER" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<RoleResponse>(),
        RoleResponse {
            success: true,
            role: Some(Role::Sender)
        }
    );
    let claims = store.claims("u1").unwrap();
    assert_eq!(claims.role(), Some(Role::Sender));
    assert_eq!(claims.get("foo"), Some(&json!(1)));
}

#[tokio::test]
async fn set_user_role_without_token_is_unauthenticated() {
    let (store, server) = server();

    let response = server
        .post("/setUserRole")
        .json(&json!({ "role": "CUSTOMER" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<ErrorBody>().code, "unauthenticated");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn set_user_role_with_bad_token_is_unauthenticated() {
    let (_store, server) = server();

    let response = server
        .post("/setUserRole")
        .authorization_bearer("forged")
        .json(&json!({ "role": "CUSTOMER" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn set_user_role_refuses_elevated_role() {
    let (store, server) = server();

    let response = server
        .post("/setUserRole")
        .authorization_bearer(token("u1"))
        .json(&json!({ "role": "ADMIN" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body = response.json::<ErrorBody>();
    assert_eq!(body.code, "permission-denied");
    assert_eq!(body.message, "You can only register as CUSTOMER or SENDER");
    assert_eq!(store.claims("u1").unwrap().role(), None);
}

#[tokio::test]
async fn set_user_role_refuses_other_uid() {
    let (store, server) = server();

    let response = server
        .post("/setUserRole")
        .authorization_bearer(token("u1"))
        .json(&json!({ "role": "SENDER", "uid": "sender" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(store.claims("sender").unwrap().role(), Some(Role::Sender));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn admin_assigns_station() {
    let (store, server) = server();

    let response = server
        .post("/adminSetUserRole")
        .authorization_bearer(token("admin"))
        .json(&json!({ "targetUid": "u1", "newRole": "STATION" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<RoleResponse>().role, Some(Role::Station));
    assert_eq!(store.claims("u1").unwrap().role(), Some(Role::Station));
}

#[tokio::test]
async fn admin_route_refuses_non_admin() {
    let (_store, server) = server();

    let response = server
        .post("/adminSetUserRole")
        .authorization_bearer(token("sender"))
        .json(&json!({ "targetUid": "u1", "newRole": "CUSTOMER" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<ErrorBody>().message, "Admin only");
}

#[tokio::test]
async fn admin_route_validates_input() {
    let (_store, server) = server();

    for body in [
        json!({ "newRole": "STATION" }),
        json!({ "targetUid": "u1", "newRole": "PILOT" }),
        json!({ "targetUid": "u1" }),
    ] {
        let response = server
            .post("/adminSetUserRole")
            .authorization_bearer(token("admin"))
            .json(&body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorBody>().code, "invalid-argument");
    }
}

#[tokio::test]
async fn user_created_trigger_requires_secret() {
    let (store, server) = server();

    let response = server
        .post("/triggers/user-created")
        .json(&json!({ "uid": "u1" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn user_created_trigger_assigns_customer_once() {
    let (store, server) = server();

    for expected_assigned in [true, false] {
        let response = server
            .post("/triggers/user-created")
            .add_header(
                HeaderName::from_static("x-trigger-secret"),
                HeaderValue::from_static(SECRET),
            )
            .json(&json!({ "uid": "u1" }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<UserCreatedResponse>(),
            UserCreatedResponse {
                assigned: expected_assigned,
                role: Some(Role::Customer)
            }
        );
    }
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn trigger_without_configured_secret_is_refused() {
    let store = InMemoryIdentityStore::new();
    store.insert_user("u1", Claims::new());
    let server = TestServer::new(role_router(CallableState::new(store.clone(), store))).unwrap();

    let response = server
        .post("/triggers/user-created")
        .add_header(
            HeaderName::from_static("x-trigger-secret"),
            HeaderValue::from_static(""),
        )
        .json(&json!({ "uid": "u1" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_body_without_token_is_unauthenticated() {
    let (store, server) = server();

    for route in ["/setUserRole", "/adminSetUserRole"] {
        let response = server.post(route).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<ErrorBody>().code, "unauthenticated");
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn undecodable_self_assign_body_is_permission_denied() {
    let (store, server) = server();

    let responses = [
        server.post("/setUserRole").authorization_bearer(token("u1")).await,
        server
            .post("/setUserRole")
            .authorization_bearer(token("u1"))
            .json(&json!(null))
            .await,
        server
            .post("/setUserRole")
            .authorization_bearer(token("u1"))
            .json(&json!({ "role": 5 }))
            .await,
        server
            .post("/setUserRole")
            .authorization_bearer(token("u1"))
            .text("SENDER")
            .await,
    ];

    for response in responses {
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<ErrorBody>().code, "permission-denied");
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn undecodable_admin_body_is_invalid_argument() {
    let (_store, server) = server();

    let responses = [
        server.post("/adminSetUserRole").authorization_bearer(token("admin")).await,
        server
            .post("/adminSetUserRole")
            .authorization_bearer(token("admin"))
            .json(&json!(null))
            .await,
        server
            .post("/adminSetUserRole")
            .authorization_bearer(token("admin"))
            .json(&json!({ "targetUid": 7, "newRole": "STATION" }))
            .await,
    ];

    for response in responses {
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorBody>().code, "invalid-argument");
    }
}

#[tokio::test]
async fn undecodable_admin_body_from_non_admin_is_permission_denied() {
    let (_store, server) = server();

    let response = server
        .post("/adminSetUserRole")
        .authorization_bearer(token("sender"))
        .json(&json!(null))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<ErrorBody>().code, "permission-denied");
}

#[tokio::test]
async fn user_created_trigger_rejects_body_without_uid() {
    let (store, server) = server();

    for body in [json!(null), json!({ "uid": "" }), json!({ "uid": 3 })] {
        let response = server
            .post("/triggers/user-created")
            .add_header(
                HeaderName::from_static("x-trigger-secret"),
                HeaderValue::from_static(SECRET),
            )
            .json(&body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorBody>().code, "invalid-argument");
    }
    assert_eq!(store.write_count(), 0);
}
