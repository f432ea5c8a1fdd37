//! View models derived from the backend DTOs.

use crate::dto::{CheckpointDto, ShipmentListItemDto, ShipmentTrackingDto};
use crate::types::{CheckpointStatus, Coordinates};
use chrono::{DateTime, Utc};

/// A checkpoint ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedCheckpoint {
    /// When the checkpoint was recorded
    pub timestamp: DateTime<Utc>,
    /// Status at this checkpoint
    pub status: CheckpointStatus,
    /// Station note
    pub message: String,
    /// Location, when the backend sent a valid pair
    pub location: Option<Coordinates>,
}

impl From<CheckpointDto> for TrackedCheckpoint {
    fn from(dto: CheckpointDto) -> Self {
        // A half-missing or out-of-range pair is shown without a location.
        let location = Coordinates::from_parts(dto.lat, dto.lng).ok().flatten();
        Self {
            timestamp: dto.timestamp,
            status: dto.status,
            message: dto.message,
            location,
        }
    }
}

/// Public tracking page model.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingView {
    /// Public tracking id
    pub tracking_id: String,
    /// Latest status
    pub status: CheckpointStatus,
    /// Promised delivery time
    pub expected_delivery: DateTime<Utc>,
    /// Checkpoints, most recent first
    pub checkpoints: Vec<TrackedCheckpoint>,
}

impl TrackingView {
    /// Map a tracking response, ordering checkpoints newest first.
    ///
    /// Checkpoints with equal timestamps keep the backend's relative order.
    #[must_use]
    pub fn from_dto(dto: ShipmentTrackingDto) -> Self {
        let mut checkpoints: Vec<TrackedCheckpoint> =
            dto.checkpoints.into_iter().map(TrackedCheckpoint::from).collect();
        checkpoints.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Self {
            tracking_id: dto.tracking_id,
            status: dto.status,
            expected_delivery: dto.expected_delivery,
            checkpoints,
        }
    }

    /// Most recent checkpoint that carries a location.
    #[must_use]
    pub fn latest_located_checkpoint(&self) -> Option<&TrackedCheckpoint> {
        self.checkpoints.iter().find(|c| c.location.is_some())
    }

    /// Most recent checkpoint.
    #[must_use]
    pub fn latest_checkpoint(&self) -> Option<&TrackedCheckpoint> {
        self.checkpoints.first()
    }
}

impl From<ShipmentTrackingDto> for TrackingView {
    fn from(dto: ShipmentTrackingDto) -> Self {
        Self::from_dto(dto)
    }
}

/// Dashboard counters over a sender's shipments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShipmentSummary {
    /// All shipments
    pub total: usize,
    /// Created but not picked up yet
    pub pending: usize,
    /// Picked up and not delivered
    pub in_transit: usize,
    /// Delivered
    pub delivered: usize,
}

impl ShipmentSummary {
    /// Count `items` by status.
    #[must_use]
    pub fn from_items(items: &[ShipmentListItemDto]) -> Self {
        items.iter().fold(Self::default(), |mut summary, item| {
            summary.total += 1;
            match item.current_status {
                CheckpointStatus::Created => summary.pending += 1,
                CheckpointStatus::Delivered => summary.delivered += 1,
                _ => summary.in_transit += 1,
            }
            summary
        })
    }
}
