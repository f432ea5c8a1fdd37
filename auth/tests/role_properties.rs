//! Property tests for role assignment.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use shiptrack_auth::mocks::InMemoryIdentityStore;
use shiptrack_auth::{AuthError, Claims, DefaultRoleOutcome, Role, RoleAssignmentService, VerifiedToken};
use std::future::Future;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn caller(uid: &str) -> VerifiedToken {
    VerifiedToken {
        uid: uid.to_string(),
        email: None,
        claims: Claims::new(),
    }
}

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

proptest! {
    #[test]
    fn self_assign_refuses_elevated_roles(role in any_role()) {
        prop_assume!(!role.is_self_assignable());

        let store = InMemoryIdentityStore::new();
        store.insert_user("u1", Claims::new());
        let service = RoleAssignmentService::new(store.clone());

        let result = block_on(service.self_assign(Some(&caller("u1")), None, Some(role.as_str())));

        prop_assert!(matches!(result, Err(AuthError::PermissionDenied { .. })), "expected PermissionDenied");
        prop_assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn self_assign_refuses_arbitrary_strings(requested in "\\PC*") {
        prop_assume!(requested != "CUSTOMER" && requested != "SENDER");

        let store = InMemoryIdentityStore::new();
        store.insert_user("u1", Claims::new());
        let service = RoleAssignmentService::new(store.clone());

        let result = block_on(service.self_assign(Some(&caller("u1")), None, Some(&requested)));

        prop_assert!(matches!(result, Err(AuthError::PermissionDenied { .. })), "expected PermissionDenied");
        prop_assert_eq!(store.claims("u1").unwrap().role(), None);
    }

    #[test]
    fn admin_assign_accepts_every_role(role in any_role()) {
        let store = InMemoryIdentityStore::new();
        store.insert_user("admin", Claims::new().with_role(Role::Admin));
        store.insert_user("u1", Claims::new());
        let service = RoleAssignmentService::new(store.clone());

        let assigned = block_on(service.admin_assign(Some(&caller("admin")), Some("u1"), Some(role.as_str())));

        prop_assert_eq!(assigned, Ok(role));
        prop_assert_eq!(store.claims("u1").unwrap().role(), Some(role));
    }

    #[test]
    fn non_admin_is_refused_whatever_the_role(caller_role in any_role(), role in any_role()) {
        prop_assume!(caller_role != Role::Admin);

        let store = InMemoryIdentityStore::new();
        store.insert_user("someone", Claims::new().with_role(caller_role));
        store.insert_user("u1", Claims::new());
        let service = RoleAssignmentService::new(store.clone());

        let result = block_on(service.admin_assign(Some(&caller("someone")), Some("u1"), Some(role.as_str())));

        prop_assert!(matches!(result, Err(AuthError::PermissionDenied { .. })), "expected PermissionDenied");
        prop_assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn default_trigger_never_overwrites(existing in any_role()) {
        let store = InMemoryIdentityStore::new();
        store.insert_user("u1", Claims::new().with_role(existing));
        let service = RoleAssignmentService::new(store.clone());

        let outcome = block_on(service.on_user_created("u1")).unwrap();

        prop_assert_eq!(outcome, DefaultRoleOutcome::AlreadyAssigned(Some(existing)));
        prop_assert_eq!(store.claims("u1").unwrap().role(), Some(existing));
        prop_assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn role_writes_keep_unrelated_claims(key in "[a-z]{1,8}", value in any::<i64>(), role in any_role()) {
        prop_assume!(key != "role");

        let store = InMemoryIdentityStore::new();
        store.insert_user("admin", Claims::new().with_role(Role::Admin));
        store.insert_user("u1", Claims::new().with(key.clone(), value));
        let service = RoleAssignmentService::new(store.clone());

        block_on(service.admin_assign(Some(&caller("admin")), Some("u1"), Some(role.as_str()))).unwrap();

        let claims = store.claims("u1").unwrap();
        prop_assert_eq!(claims.get(&key), Some(&serde_json::json!(value)));
        prop_assert_eq!(claims.role(), Some(role));
        prop_assert_eq!(claims.len(), 2);
    }
}

#[tokio::test]
async fn self_assign_merges_into_existing_claims() {
    let store = InMemoryIdentityStore::new();
    store.insert_user("u1", Claims::new().with("foo", 1));
    let service = RoleAssignmentService::new(store.clone());

    service
        .self_assign(Some(&caller("u1")), None, Some("CUSTOMER"))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(store.claims("u1").unwrap()).unwrap(),
        serde_json::json!({ "foo": 1, "role": "CUSTOMER" })
    );
}

#[tokio::test]
async fn default_trigger_leaves_admin_alone() {
    let store = InMemoryIdentityStore::new();
    store.insert_user("boss", Claims::new().with_role(Role::Admin));
    let service = RoleAssignmentService::new(store.clone());

    let outcome = service.on_user_created("boss").await.unwrap();

    assert_eq!(outcome, DefaultRoleOutcome::AlreadyAssigned(Some(Role::Admin)));
    assert_eq!(store.claims("boss").unwrap().role(), Some(Role::Admin));
}

#[tokio::test]
async fn unauthenticated_self_assign_writes_nothing() {
    let store = InMemoryIdentityStore::new();
    store.insert_user("u1", Claims::new());
    let service = RoleAssignmentService::new(store.clone());

    let err = service
        .self_assign(None, Some("u1"), Some("SENDER"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::Unauthenticated);
    assert_eq!(err.code(), "unauthenticated");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn concurrent_writes_are_last_write_wins() {
    let store = InMemoryIdentityStore::new();
    store.insert_user("admin", Claims::new().with_role(Role::Admin));
    store.insert_user("u1", Claims::new());
    let service = RoleAssignmentService::new(store.clone());

    service
        .self_assign(Some(&caller("u1")), None, Some("SENDER"))
        .await
        .unwrap();
    service
        .admin_assign(Some(&caller("admin")), Some("u1"), Some("STATION"))
        .await
        .unwrap();

    assert_eq!(store.claims("u1").unwrap().role(), Some(Role::Station));
    assert_eq!(store.write_count(), 2);
}
