//! Fleet tracker: the polling entry points used by the dispatcher and driver views.
//!
//! Every poll reads the clock once, loads the driver's active delivery, runs the trip
//! simulator at that instant and reconciles stored status with the derived phase.
//! Assignment is the only other write path and goes through the store's atomic
//! cancel-then-insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{Depot, TrackerConfig};
use crate::destinations::{demo_destinations, find_demo_destination};
use crate::error::TrackerError;
use crate::geo::{distance_km, eta_minutes, round_to, Coordinate};
use crate::model::{
    Delivery, DeliveryId, Destination, Driver, DriverId, NewDelivery, NewDriver, TripPhase,
};
use crate::reconcile::{reconcile, Reconciliation};
use crate::store::FleetStore;
use crate::telemetry::{DeliveryRecord, FleetCounts};
use crate::trip::{compute_position, Snapshot, IDLE_AT_WAREHOUSE, WAITING_FOR_ASSIGNMENT};

pub const DEFAULT_VEHICLE: &str = "Van";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterDriver {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub vehicle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    #[serde(default)]
    pub dest_name: String,
    /// When both coordinates are omitted the name is looked up in the demo pool.
    #[serde(default)]
    pub dest_lat: Option<f64>,
    #[serde(default)]
    pub dest_lng: Option<f64>,
    #[serde(default)]
    pub package_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    pub delivery: Delivery,
    pub cancelled: Vec<DeliveryId>,
    pub eta_to_dest_min: f64,
    pub distance_km: f64,
    pub message: String,
}

/// One driver as seen by a poll, after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverObservation {
    pub driver: Driver,
    pub coordinate: Coordinate,
    pub status_label: String,
    pub driver_label: String,
    /// `None` when the driver has nothing assigned.
    pub trip: Option<Snapshot>,
    pub reconciliation: Option<Reconciliation>,
}

impl DriverObservation {
    fn idle(driver: Driver, depot: &Depot) -> Self {
        Self {
            driver,
            coordinate: depot.coordinate,
            status_label: IDLE_AT_WAREHOUSE.to_string(),
            driver_label: WAITING_FOR_ASSIGNMENT.to_string(),
            trip: None,
            reconciliation: None,
        }
    }

    pub fn phase(&self) -> Option<TripPhase> {
        self.trip.as_ref().map(|trip| trip.phase)
    }
}

/// Dispatcher's live view of every driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetView {
    pub depot: Depot,
    pub drivers: Vec<DriverObservation>,
    pub counts: FleetCounts,
    pub timestamp: DateTime<Utc>,
}

pub struct FleetTracker<S, C> {
    config: TrackerConfig,
    store: S,
    clock: C,
}

impl<S: FleetStore, C: Clock> FleetTracker<S, C> {
    pub fn new(config: TrackerConfig, store: S, clock: C) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            clock,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn demo_destinations(&self) -> Vec<Destination> {
        demo_destinations()
    }

    pub fn register_driver(&self, request: RegisterDriver) -> Result<Driver, TrackerError> {
        let username = request.username.trim();
        let name = request.name.trim();
        if username.is_empty() || name.is_empty() {
            return Err(TrackerError::validation("username and name are required"));
        }
        let vehicle = request
            .vehicle
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VEHICLE);

        let driver = self.store.register_driver(NewDriver {
            username: username.to_string(),
            name: name.to_string(),
            phone: request.phone.trim().to_string(),
            vehicle: vehicle.to_string(),
        })?;
        tracing::info!(driver_id = %driver.id, name = %driver.name, "driver registered");
        Ok(driver)
    }

    /// Start a new trip for a driver, cancelling whatever it was doing.
    pub fn assign(&self, request: AssignRequest) -> Result<AssignmentReceipt, TrackerError> {
        let dest_name = request.dest_name.trim();
        let Some(driver_id) = request.driver_id else {
            return Err(TrackerError::validation("driver_id and dest_name required"));
        };
        if dest_name.is_empty() {
            return Err(TrackerError::validation("driver_id and dest_name required"));
        }

        let coordinate = match (request.dest_lat, request.dest_lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
            (None, None) => find_demo_destination(dest_name)
                .map(|destination| destination.coordinate)
                .ok_or_else(|| {
                    TrackerError::validation(format!(
                        "dest_lat and dest_lng required for unknown destination '{dest_name}'"
                    ))
                })?,
            _ => {
                return Err(TrackerError::validation(
                    "dest_lat and dest_lng must be given together",
                ))
            }
        };
        if !coordinate.is_valid() {
            return Err(TrackerError::validation(format!(
                "destination ({}, {}) is out of range",
                coordinate.lat, coordinate.lng
            )));
        }

        if self.store.driver(driver_id)?.is_none() {
            return Err(TrackerError::NotFound(format!("driver {driver_id} not found")));
        }

        let now = self.clock.now();
        let package_id = request
            .package_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("PKG-{}", now.timestamp()));

        let assignment = self.store.assign_delivery(NewDelivery {
            driver_id,
            package_id: package_id.clone(),
            destination: Destination {
                name: dest_name.to_string(),
                coordinate,
            },
            assigned_at: now,
        })?;

        let km = distance_km(self.config.depot.coordinate, coordinate);
        tracing::info!(
            delivery_id = %assignment.delivery.id,
            driver_id = %driver_id,
            package_id = %package_id,
            cancelled = assignment.cancelled.len(),
            distance_km = km,
            "delivery assigned"
        );

        Ok(AssignmentReceipt {
            message: format!("Assigned {package_id} to driver {driver_id}"),
            eta_to_dest_min: eta_minutes(km, self.config.speed_kmh),
            distance_km: round_to(km, 2),
            delivery: assignment.delivery,
            cancelled: assignment.cancelled,
        })
    }

    /// Simulate and reconcile one driver at `now`.
    pub fn observe_driver(
        &self,
        driver: Driver,
        now: DateTime<Utc>,
    ) -> Result<DriverObservation, TrackerError> {
        let Some(delivery) = self.store.get_active_delivery(driver.id)? else {
            return Ok(DriverObservation::idle(driver, &self.config.depot));
        };

        let snapshot = self.simulate(&delivery, now);
        let outcome = reconcile(&self.store, &delivery, snapshot.phase, now)?;
        let driver = match outcome {
            Reconciliation::InSync => driver,
            _ => self.store.driver(driver.id)?.unwrap_or(driver),
        };

        Ok(DriverObservation {
            driver,
            coordinate: snapshot.coordinate,
            status_label: snapshot.status_label.clone(),
            driver_label: snapshot.driver_label.clone(),
            trip: Some(snapshot),
            reconciliation: Some(outcome),
        })
    }

    /// Pure simulation with this tracker's configuration.
    pub fn simulate(&self, delivery: &Delivery, now: DateTime<Utc>) -> Snapshot {
        compute_position(
            delivery,
            &self.config.depot,
            self.config.speed_kmh,
            self.config.dwell_secs,
            now,
        )
    }

    /// Dispatcher view: every driver, reconciled at a single instant.
    pub fn live_fleet(&self) -> Result<FleetView, TrackerError> {
        let now = self.clock.now();
        let mut counts = FleetCounts::default();
        let mut drivers = Vec::new();
        for driver in self.store.drivers()? {
            let observation = self.observe_driver(driver, now)?;
            counts.record(observation.driver.status, observation.phase());
            drivers.push(observation);
        }
        Ok(FleetView {
            depot: self.config.depot.clone(),
            drivers,
            counts,
            timestamp: now,
        })
    }

    /// Driver view of its own trip.
    pub fn driver_status(&self, driver_id: DriverId) -> Result<DriverObservation, TrackerError> {
        let now = self.clock.now();
        let driver = self
            .store
            .driver(driver_id)?
            .ok_or_else(|| TrackerError::NotFound("Driver not found".to_string()))?;
        self.observe_driver(driver, now)
    }

    pub fn history(&self) -> Result<Vec<DeliveryRecord>, TrackerError> {
        Ok(self.store.recent_deliveries(self.config.history_limit)?)
    }
}
