//! Core shipment types

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a shipment or of one of its checkpoints
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointStatus {
    /// Recorded by the backend when the shipment is created
    Created,
    /// Collected from the sender
    PickedUp,
    /// Between stations
    InTransit,
    /// On the last leg
    OutForDelivery,
    /// Handed to the receiver
    Delivered,
    /// Held up
    Delayed,
}

impl CheckpointStatus {
    /// Statuses a station may report, in journey order.
    pub const STATION_UPDATES: [Self; 5] = [
        Self::PickedUp,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Delayed,
    ];

    /// Wire form (`"PICKED_UP"`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::PickedUp => "PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Delayed => "DELAYED",
        }
    }

    /// Human label, e.g. `OUT FOR DELIVERY`
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Whether a station may send this status in a tracking update
    #[must_use]
    pub const fn is_station_update(self) -> bool {
        !matches!(self, Self::Created)
    }
}

impl fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckpointStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [Self::Created]
            .into_iter()
            .chain(Self::STATION_UPDATES)
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown status: {s:?}"))
    }
}

/// A validated latitude/longitude pair
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Create coordinates.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCoordinates` unless `lat` is in [-90, 90]
    /// and `lng` in [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::InvalidCoordinates(
                "Latitude must be between -90 and 90.".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ApiError::InvalidCoordinates(
                "Longitude must be between -180 and 180.".into(),
            ));
        }
        Ok(Self { lat, lng })
    }

    /// Coordinates from two optional parts.
    ///
    /// Both missing gives `None`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCoordinates` if only one part is given or
    /// the pair is out of range.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Self>> {
        match (lat, lng) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Err(ApiError::InvalidCoordinates(
                "Please provide both latitude and longitude, or leave both empty.".into(),
            )),
        }
    }

    /// Latitude in degrees
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&CheckpointStatus::OutForDelivery).unwrap(),
            "\"OUT_FOR_DELIVERY\""
        );
        assert_eq!("PICKED_UP".parse(), Ok(CheckpointStatus::PickedUp));
        assert_eq!("CREATED".parse(), Ok(CheckpointStatus::Created));
        assert!("picked_up".parse::<CheckpointStatus>().is_err());
        assert_eq!(CheckpointStatus::OutForDelivery.label(), "OUT FOR DELIVERY");
    }

    #[test]
    fn test_created_is_not_a_station_update() {
        assert!(!CheckpointStatus::Created.is_station_update());
        assert!(CheckpointStatus::STATION_UPDATES.iter().all(|s| s.is_station_update()));
    }

    #[test]
    fn test_coordinate_bounds_are_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.1).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_from_parts() {
        assert_eq!(Coordinates::from_parts(None, None).unwrap(), None);
        assert!(matches!(
            Coordinates::from_parts(Some(1.0), None),
            Err(ApiError::InvalidCoordinates(_))
        ));
        let coords = Coordinates::from_parts(Some(49.44), Some(7.77)).unwrap().unwrap();
        assert_eq!(coords.to_string(), "49.44000, 7.77000");
    }

    proptest! {
        #[test]
        fn valid_coordinates_are_accepted(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let coords = Coordinates::new(lat, lng).unwrap();
            prop_assert_eq!(coords.lat(), lat);
            prop_assert_eq!(coords.lng(), lng);
        }

        #[test]
        fn out_of_range_latitude_is_refused(lat in 90.000_001f64..1e6, sign in any::<bool>()) {
            let lat = if sign { lat } else { -lat };
            prop_assert!(Coordinates::new(lat, 0.0).is_err());
        }
    }
}
