//! Error types for the shipment API client

use crate::types::CheckpointStatus;
use thiserror::Error;

/// Result type alias for shipment API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur when talking to the shipment backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Tracking id is blank
    #[error("Tracking id must not be empty")]
    InvalidTrackingId,

    /// Shipment id is not a UUID
    #[error("Shipment ID must be a valid UUID: {0:?}")]
    InvalidShipmentId(String),

    /// Status a station may not report
    #[error("{0} cannot be reported by a station")]
    InvalidStatus(CheckpointStatus),

    /// Latitude or longitude out of range, or only one of them given
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

impl ApiError {
    /// Whether the request was refused before reaching the backend.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTrackingId
                | Self::InvalidShipmentId(_)
                | Self::InvalidStatus(_)
                | Self::InvalidCoordinates(_)
        )
    }

    /// HTTP status, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
