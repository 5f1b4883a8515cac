use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Default depot: the Toronto warehouse.
pub const DEFAULT_DEPOT_NAME: &str = "Main Warehouse";
pub const DEFAULT_DEPOT_LAT: f64 = 43.6532;
pub const DEFAULT_DEPOT_LNG: f64 = -79.3832;

/// Average city speed in km/h.
pub const DEFAULT_SPEED_KMH: f64 = 35.0;

/// Time spent at the destination before heading back (seconds).
pub const DEFAULT_DWELL_SECS: f64 = 30.0;

/// Rows returned by the delivery history view.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// The fixed origin every trip leaves from and returns to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Default for Depot {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEPOT_NAME.to_string(),
            coordinate: Coordinate::new(DEFAULT_DEPOT_LAT, DEFAULT_DEPOT_LNG),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("speed_kmh must be a positive number, got {0}")]
    InvalidSpeed(f64),
    #[error("dwell_secs must be a positive number, got {0}")]
    InvalidDwell(f64),
    #[error("depot coordinate ({lat}, {lng}) is out of range")]
    InvalidDepot { lat: f64, lng: f64 },
    #[error("history_limit must be at least 1")]
    InvalidHistoryLimit,
}

/// Immutable parameters handed to the trip simulator and tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub depot: Depot,
    pub speed_kmh: f64,
    pub dwell_secs: f64,
    pub history_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            depot: Depot::default(),
            speed_kmh: DEFAULT_SPEED_KMH,
            dwell_secs: DEFAULT_DWELL_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl TrackerConfig {
    pub fn with_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    pub fn with_dwell_secs(mut self, dwell_secs: f64) -> Self {
        self.dwell_secs = dwell_secs;
        self
    }

    pub fn with_depot(mut self, name: impl Into<String>, coordinate: Coordinate) -> Self {
        self.depot = Depot {
            name: name.into(),
            coordinate,
        };
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.speed_kmh));
        }
        if !self.dwell_secs.is_finite() || self.dwell_secs <= 0.0 {
            return Err(ConfigError::InvalidDwell(self.dwell_secs));
        }
        if !self.depot.coordinate.is_valid() {
            return Err(ConfigError::InvalidDepot {
                lat: self.depot.coordinate.lat,
                lng: self.depot.coordinate.lng,
            });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_toronto_depot() {
        let config = TrackerConfig::default();
        assert_eq!(config.depot.name, "Main Warehouse");
        assert_eq!(config.depot.coordinate, Coordinate::new(43.6532, -79.3832));
        assert_eq!(config.speed_kmh, 35.0);
        assert_eq!(config.dwell_secs, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_speed_and_dwell() {
        let config = TrackerConfig::default().with_speed_kmh(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpeed(0.0)));

        let config = TrackerConfig::default().with_dwell_secs(-1.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDwell(-1.0)));

        let config = TrackerConfig::default().with_speed_kmh(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_depot() {
        let config = TrackerConfig::default().with_depot("Nowhere", Coordinate::new(91.0, 0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDepot { .. })
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = TrackerConfig::default().with_history_limit(10);
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: TrackerConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, config);
    }
}
