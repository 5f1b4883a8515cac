//! Test helpers for common test setup and utilities.
//!
//! Shared fixtures so unit tests, integration tests and benches use the same
//! geography and start time.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::ManualClock;
use crate::config::TrackerConfig;
use crate::geo::Coordinate;
use crate::model::{Delivery, DeliveryId, DeliveryStatus, Destination, DriverId};
use crate::store::MemoryStore;
use crate::tracker::FleetTracker;

/// Fixed start instant (2023-11-14T22:13:20Z) used across tests.
pub const TEST_EPOCH_SECS: i64 = 1_700_000_000;

pub fn test_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(TEST_EPOCH_SECS, 0).expect("TEST_EPOCH_SECS should be in range")
}

/// Pearson Airport, about 19.6 km west of the default depot.
pub fn pearson() -> Destination {
    Destination {
        name: "Pearson Airport".to_string(),
        coordinate: Coordinate::new(43.6777, -79.6248),
    }
}

/// A destination sitting exactly on the default depot.
pub fn depot_destination() -> Destination {
    let depot = TrackerConfig::default().depot;
    Destination {
        name: depot.name,
        coordinate: depot.coordinate,
    }
}

/// An `en_route` delivery for driver 1, assigned at `assigned_at`.
pub fn test_delivery(destination: Destination, assigned_at: DateTime<Utc>) -> Delivery {
    Delivery {
        id: DeliveryId(1),
        driver_id: DriverId(1),
        package_id: "PKG-TEST".to_string(),
        destination,
        assigned_at,
        completed_at: None,
        status: DeliveryStatus::EnRoute,
    }
}

/// Tracker type with shared store and clock handles, so several trackers can poll
/// the same fleet.
pub type TestTracker = FleetTracker<Arc<MemoryStore>, Arc<ManualClock>>;

/// Tracker over the seeded store (driver 1 = default driver) with a manual clock at
/// [`test_epoch`].
///
/// # Panics
///
/// Panics if `config` does not validate.
pub fn create_test_tracker(config: TrackerConfig) -> TestTracker {
    let store = Arc::new(MemoryStore::seeded().expect("seeding an empty store should succeed"));
    let clock = Arc::new(ManualClock::new(test_epoch()));
    FleetTracker::new(config, store, clock).expect("test tracker config should be valid")
}
