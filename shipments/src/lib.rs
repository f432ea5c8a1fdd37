//! # Shiptrack shipment client
//!
//! Types and a REST client for the shipment and tracking backend.
//!
//! ## Example
//!
//! ```no_run
//! use shiptrack_shipments::{ApiClientConfig, ShipmentClient, StaticToken};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public tracking needs no token
//!     let client = ShipmentClient::new(&ApiClientConfig::from_env(), StaticToken::anonymous())?;
//!
//!     let view = client.track_public("PKG-ABC123").await?;
//!     if let Some(checkpoint) = view.latest_located_checkpoint() {
//!         println!("Last seen at {:?}", checkpoint.location);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Bearer token attached from the signed-in identity
//! - Input checks before any request (shipment UUIDs, coordinate ranges)
//! - Tracking view with checkpoints ordered newest first

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod token;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use client::ShipmentClient;
pub use config::ApiClientConfig;
pub use dto::{
    parse_shipment_id, CheckpointDto, CreateShipmentDto, ShipmentDetailDto, ShipmentListItemDto,
    ShipmentTrackingDto, TrackingUpdateDto,
};
pub use error::{ApiError, Result};
pub use token::{ProviderTokenSource, StaticToken, TokenSource};
pub use types::{CheckpointStatus, Coordinates};
pub use view::{ShipmentSummary, TrackedCheckpoint, TrackingView};
