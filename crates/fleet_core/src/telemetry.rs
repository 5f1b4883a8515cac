//! Fleet-level summaries: history rows and per-poll status counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Delivery, DeliveryId, DeliveryStatus, DriverId, DriverStatus, TripPhase};

/// One delivery as shown in the dispatcher history, joined with its driver's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: DeliveryId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub package_id: String,
    pub dest_name: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
}

impl DeliveryRecord {
    pub fn from_delivery(delivery: &Delivery, driver_name: impl Into<String>) -> Self {
        Self {
            id: delivery.id,
            driver_id: delivery.driver_id,
            driver_name: driver_name.into(),
            package_id: delivery.package_id.clone(),
            dest_name: delivery.destination.name.clone(),
            dest_lat: delivery.destination.coordinate.lat,
            dest_lng: delivery.destination.coordinate.lng,
            assigned_at: delivery.assigned_at,
            completed_at: delivery.completed_at,
            status: delivery.status,
        }
    }

    /// Assignment to completion, in seconds. `None` unless completed.
    pub fn trip_duration_secs(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.assigned_at).num_seconds())
    }
}

/// Driver and trip-phase tallies for one dispatcher poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetCounts {
    pub drivers_idle: usize,
    pub drivers_busy: usize,
    pub en_route: usize,
    pub at_destination: usize,
    pub returning: usize,
}

impl FleetCounts {
    /// Count one driver given its status after reconciliation and its derived phase.
    pub fn record(&mut self, status: DriverStatus, phase: Option<TripPhase>) {
        match status {
            DriverStatus::Idle => self.drivers_idle += 1,
            DriverStatus::Busy => self.drivers_busy += 1,
        }
        match phase {
            Some(TripPhase::EnRoute) => self.en_route += 1,
            Some(TripPhase::AtDestination) => self.at_destination += 1,
            Some(TripPhase::Returning) => self.returning += 1,
            Some(TripPhase::Completed) | None => {}
        }
    }

    pub fn total_drivers(&self) -> usize {
        self.drivers_idle + self.drivers_busy
    }
}
