//! Wire shapes for handler bodies.
//!
//! Coordinates are rounded to 6 decimals and distances to 2 on the way out; the
//! tracker itself keeps full precision.

use chrono::{DateTime, Utc};
use fleet_core::config::Depot;
use fleet_core::geo::{distance_km, eta_minutes, round_to};
use fleet_core::model::{DeliveryId, Destination, DriverId, DriverStatus};
use fleet_core::telemetry::FleetCounts;
use fleet_core::tracker::{DriverObservation, FleetView};
use fleet_core::trip::WAITING_FOR_ASSIGNMENT;
use serde::{Deserialize, Serialize};

const COORDINATE_PLACES: i32 = 6;
const DISTANCE_PLACES: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotView {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&Depot> for DepotView {
    fn from(depot: &Depot) -> Self {
        Self {
            name: depot.name.clone(),
            lat: depot.coordinate.lat,
            lng: depot.coordinate.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDeliveryView {
    pub id: DeliveryId,
    pub package_id: String,
    pub dest_name: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    /// Derived phase, already reconciled into storage.
    pub status: String,
    pub assigned_at: DateTime<Utc>,
    pub dist_km: f64,
    pub progress_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDriverView {
    pub id: DriverId,
    pub username: String,
    pub name: String,
    pub vehicle: String,
    pub status: DriverStatus,
    pub lat: f64,
    pub lng: f64,
    pub status_label: String,
    pub eta_str: Option<String>,
    pub delivery: Option<LiveDeliveryView>,
}

impl From<&DriverObservation> for LiveDriverView {
    fn from(observation: &DriverObservation) -> Self {
        let position = observation.coordinate.rounded(COORDINATE_PLACES);
        let delivery = observation.trip.as_ref().map(|trip| LiveDeliveryView {
            id: trip.delivery_id,
            package_id: trip.package_id.clone(),
            dest_name: trip.destination.name.clone(),
            dest_lat: trip.destination.coordinate.lat,
            dest_lng: trip.destination.coordinate.lng,
            status: trip.phase.as_str().to_string(),
            assigned_at: trip.assigned_at,
            dist_km: round_to(trip.distance_km, DISTANCE_PLACES),
            progress_pct: trip.progress_pct,
        });
        Self {
            id: observation.driver.id,
            username: observation.driver.username.clone(),
            name: observation.driver.name.clone(),
            vehicle: observation.driver.vehicle.clone(),
            status: observation.driver.status,
            lat: position.lat,
            lng: position.lng,
            status_label: observation.status_label.clone(),
            eta_str: observation.trip.as_ref().map(|trip| trip.eta.clone()),
            delivery,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFleetView {
    pub store: DepotView,
    pub drivers: Vec<LiveDriverView>,
    pub counts: FleetCounts,
    pub timestamp: DateTime<Utc>,
}

impl From<&FleetView> for LiveFleetView {
    fn from(view: &FleetView) -> Self {
        Self {
            store: DepotView::from(&view.depot),
            drivers: view.drivers.iter().map(LiveDriverView::from).collect(),
            counts: view.counts,
            timestamp: view.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyDeliveryView {
    pub package_id: String,
    pub dest_name: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub dist_km: f64,
    pub status: String,
}

/// The driver's own screen. `status` is a trip phase or `idle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyStatusView {
    pub status: String,
    pub status_label: String,
    pub lat: f64,
    pub lng: f64,
    pub eta_to_dest: Option<String>,
    pub eta_to_store: Option<String>,
    pub progress_pct: Option<u8>,
    pub delivery: Option<MyDeliveryView>,
}

impl From<&DriverObservation> for MyStatusView {
    fn from(observation: &DriverObservation) -> Self {
        let position = observation.coordinate.rounded(COORDINATE_PLACES);
        match &observation.trip {
            None => Self {
                status: "idle".to_string(),
                status_label: WAITING_FOR_ASSIGNMENT.to_string(),
                lat: position.lat,
                lng: position.lng,
                eta_to_dest: None,
                eta_to_store: None,
                progress_pct: None,
                delivery: None,
            },
            Some(trip) => Self {
                status: trip.phase.as_str().to_string(),
                status_label: observation.driver_label.clone(),
                lat: position.lat,
                lng: position.lng,
                eta_to_dest: Some(trip.eta_to_destination.clone()),
                eta_to_store: Some(trip.eta_to_depot.clone()),
                progress_pct: Some(trip.progress_pct),
                delivery: Some(MyDeliveryView {
                    package_id: trip.package_id.clone(),
                    dest_name: trip.destination.name.clone(),
                    dest_lat: trip.destination.coordinate.lat,
                    dest_lng: trip.destination.coordinate.lng,
                    dist_km: round_to(trip.distance_km, DISTANCE_PLACES),
                    status: trip.phase.as_str().to_string(),
                }),
            },
        }
    }
}

/// A pickable destination with its one-way distance and drive time from the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationView {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
    pub eta_min: f64,
}

impl DestinationView {
    pub fn new(destination: &Destination, depot: &Depot, speed_kmh: f64) -> Self {
        let km = distance_km(depot.coordinate, destination.coordinate);
        Self {
            name: destination.name.clone(),
            lat: destination.coordinate.lat,
            lng: destination.coordinate.lng,
            distance_km: round_to(km, DISTANCE_PLACES),
            eta_min: eta_minutes(km, speed_kmh),
        }
    }
}
