//! HTTP handlers shared by every shiptrack service.

pub mod health;

pub use health::health_check;
