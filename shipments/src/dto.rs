//! Request and response bodies of the shipment backend.
//!
//! Field names follow the backend's camelCase JSON.

use crate::error::{ApiError, Result};
use crate::types::{CheckpointStatus, Coordinates};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /shipment/create`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentDto {
    /// Sender name or company
    pub sender: String,
    /// Receiver name
    pub receiver: String,
    /// Receiver address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    /// Promised delivery time
    pub expected_delivery: DateTime<Utc>,
}

/// Row of `GET /shipment`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentListItemDto {
    /// Shipment id
    pub id: Uuid,
    /// Sender name or company
    pub sender: String,
    /// Receiver name
    pub receiver: String,
    /// Latest status
    pub current_status: CheckpointStatus,
    /// Promised delivery time
    pub expected_delivery: DateTime<Utc>,
}

/// One step in a shipment's journey.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointDto {
    /// When the checkpoint was recorded
    pub timestamp: DateTime<Utc>,
    /// Status at this checkpoint
    pub status: CheckpointStatus,
    /// Free-text note from the station
    #[serde(default)]
    pub message: String,
    /// Latitude, if the station sent a location
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude, if the station sent a location
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Response of `GET /shipment/{id}` and `POST /shipment/create`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetailDto {
    /// Shipment id
    pub id: Uuid,
    /// Public tracking id
    pub tracking_id: String,
    /// Sender name or company
    pub sender: String,
    /// Receiver name
    pub receiver: String,
    /// Latest status
    pub current_status: CheckpointStatus,
    /// Promised delivery time
    pub expected_delivery: DateTime<Utc>,
    /// Last known latitude
    #[serde(default)]
    pub last_lat: Option<f64>,
    /// Last known longitude
    #[serde(default)]
    pub last_lng: Option<f64>,
    /// Checkpoints, in the backend's order
    #[serde(default)]
    pub timeline: Vec<CheckpointDto>,
}

/// Response of `GET /shipment/track/{trackingId}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentTrackingDto {
    /// Public tracking id
    pub tracking_id: String,
    /// Latest status
    pub status: CheckpointStatus,
    /// Promised delivery time
    pub expected_delivery: DateTime<Utc>,
    /// Checkpoints, in the backend's order
    #[serde(default)]
    pub checkpoints: Vec<CheckpointDto>,
}

/// Body of `POST /tracking/update`.
///
/// Built through [`TrackingUpdateDto::new`], which validates the shipment id
/// and the location.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdateDto {
    /// Shipment the station scanned
    pub shipment_id: Uuid,
    /// Reported status
    pub status: CheckpointStatus,
    /// Free-text note
    pub message: String,
    /// Latitude, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// When the station recorded the update
    pub timestamp: DateTime<Utc>,
}

impl TrackingUpdateDto {
    /// Build an update from station input.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidShipmentId` if `shipment_id` (trimmed) is not a
    ///   hyphenated UUID
    /// - `ApiError::InvalidStatus` if `status` cannot be reported by a station
    pub fn new(
        shipment_id: &str,
        status: CheckpointStatus,
        message: impl Into<String>,
        location: Option<Coordinates>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let shipment_id = parse_shipment_id(shipment_id)?;
        if !status.is_station_update() {
            return Err(ApiError::InvalidStatus(status));
        }

        Ok(Self {
            shipment_id,
            status,
            message: message.into(),
            lat: location.map(Coordinates::lat),
            lng: location.map(Coordinates::lng),
            timestamp,
        })
    }
}

/// Parse a shipment id typed by a user.
///
/// # Errors
///
/// Returns `ApiError::InvalidShipmentId` unless the trimmed input is a
/// hyphenated UUID.
pub fn parse_shipment_id(raw: &str) -> Result<Uuid> {
    let trimmed = raw.trim();
    // Only the 36-character hyphenated form is accepted.
    if trimmed.len() != 36 {
        return Err(ApiError::InvalidShipmentId(raw.to_string()));
    }
    Uuid::try_parse(trimmed).map_err(|_| ApiError::InvalidShipmentId(raw.to_string()))
}
