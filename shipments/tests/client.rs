//! Shipment client against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use serde_json::json;
use shiptrack_shipments::{
    ApiClientConfig, ApiError, CheckpointStatus, Coordinates, CreateShipmentDto, ShipmentClient,
    StaticToken, TrackingUpdateDto,
};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SHIPMENT_ID: &str = "0b6f7c9e-2d1a-4c8e-9f3b-5a7d2e1c4b60";

fn client(server: &MockServer, tokens: StaticToken) -> ShipmentClient<StaticToken> {
    let config = ApiClientConfig::new(format!("{}/api/", server.uri()));
    ShipmentClient::new(&config, tokens).unwrap()
}

fn detail_json() -> serde_json::Value {
    json!({
        "id": SHIPMENT_ID,
        "trackingId": "PKG-ABC123",
        "sender": "ACME",
        "receiver": "Bob",
        "currentStatus": "CREATED",
        "expectedDelivery": "2026-10-25T12:00:00Z",
        "lastLat": null,
        "lastLng": null,
        "timeline": [
            { "timestamp": "2026-10-19T08:00:00Z", "status": "CREATED", "message": "Shipment created", "lat": null, "lng": null }
        ]
    })
}

#[tokio::test]
async fn create_sends_bearer_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shipment/create"))
        .and(header("authorization", "Bearer id-token"))
        .and(body_json(json!({
            "sender": "ACME",
            "receiver": "Bob",
            "expectedDelivery": "2026-10-25T12:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(detail_json()))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server, StaticToken::new("id-token"))
        .create(&CreateShipmentDto {
            sender: "ACME".into(),
            receiver: "Bob".into(),
            receiver_address: None,
            expected_delivery: Utc.with_ymd_and_hms(2026, 10, 25, 12, 0, 0).unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(created.tracking_id, "PKG-ABC123");
    assert_eq!(created.current_status, CheckpointStatus::Created);
    assert_eq!(created.timeline.len(), 1);
}

#[tokio::test]
async fn list_and_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": SHIPMENT_ID,
            "sender": "ACME",
            "receiver": "Bob",
            "currentStatus": "IN_TRANSIT",
            "expectedDelivery": "2026-10-25T12:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/shipment/{SHIPMENT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_json()))
        .mount(&server)
        .await;

    let client = client(&server, StaticToken::new("id-token"));

    let mine = client.list_mine().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].current_status, CheckpointStatus::InTransit);

    let detail = client.get(mine[0].id).await.unwrap();
    assert_eq!(detail.id, mine[0].id);
}

#[tokio::test]
async fn track_public_without_token_sorts_checkpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shipment/track/PKG-ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trackingId": "PKG-ABC123",
            "status": "OUT_FOR_DELIVERY",
            "expectedDelivery": "2026-10-25T12:00:00Z",
            "checkpoints": [
                { "timestamp": "2026-10-19T08:00:00Z", "status": "CREATED", "message": "", "lat": null, "lng": null },
                { "timestamp": "2026-10-21T10:00:00Z", "status": "OUT_FOR_DELIVERY", "message": "", "lat": null, "lng": null },
                { "timestamp": "2026-10-20T09:00:00Z", "status": "IN_TRANSIT", "message": "", "lat": 49.44, "lng": 7.77 }
            ]
        })))
        .mount(&server)
        .await;

    let view = client(&server, StaticToken::anonymous())
        .track_public("  PKG-ABC123 ")
        .await
        .unwrap();

    assert_eq!(view.checkpoints[0].status, CheckpointStatus::OutForDelivery);
    assert_eq!(
        view.latest_located_checkpoint().unwrap().status,
        CheckpointStatus::InTransit
    );

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn blank_tracking_id_never_reaches_backend() {
    let server = MockServer::start().await;

    let err = client(&server, StaticToken::anonymous())
        .track_public("   ")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidTrackingId));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn send_update_posts_checkpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tracking/update"))
        .and(header_exists("authorization"))
        .and(body_json(json!({
            "shipmentId": SHIPMENT_ID,
            "status": "IN_TRANSIT",
            "message": "Left hub",
            "lat": 49.44,
            "lng": 7.77,
            "timestamp": "2026-10-19T09:30:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Tracking update received"))
        .expect(1)
        .mount(&server)
        .await;

    let update = TrackingUpdateDto::new(
        SHIPMENT_ID,
        CheckpointStatus::InTransit,
        "Left hub",
        Some(Coordinates::new(49.44, 7.77).unwrap()),
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
    )
    .unwrap();

    client(&server, StaticToken::new("station-token"))
        .send_update(&update)
        .await
        .unwrap();
}

fn checkpoint() -> TrackingUpdateDto {
    TrackingUpdateDto::new(
        SHIPMENT_ID,
        CheckpointStatus::Delivered,
        "Handed over",
        None,
        Utc.with_ymd_and_hms(2026, 10, 19, 17, 0, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn send_update_status_decides_outcome_not_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tracking/update"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tracking/update"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Station role required"))
        .mount(&server)
        .await;
    let client = client(&server, StaticToken::new("station-token"));

    client.send_update(&checkpoint()).await.unwrap();
    let err = client.send_update(&checkpoint()).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn backend_errors_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Shipment not found"))
        .mount(&server)
        .await;

    let err = client(&server, StaticToken::new("id-token"))
        .get(SHIPMENT_ID.parse().unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, ApiError::Status { message, .. } if message == "Shipment not found"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server, StaticToken::new("id-token"))
        .list_mine()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}
