//! Dispatcher endpoints: driver registration, assignment, the live map and history.

use fleet_core::clock::Clock;
use fleet_core::model::{DeliveryId, Driver};
use fleet_core::store::FleetStore;
use fleet_core::telemetry::DeliveryRecord;
use fleet_core::tracker::{AssignRequest, FleetTracker, RegisterDriver};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::{
    normalize_event, success_response, tracker_error_response, validation_error_response,
    ApiResponse,
};
use crate::views::{DepotView, DestinationView, LiveFleetView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub success: bool,
    pub message: String,
    pub driver: Driver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedResponse {
    pub success: bool,
    pub message: String,
    pub delivery_id: DeliveryId,
    pub package_id: String,
    pub eta_to_dest_min: f64,
    pub distance_km: f64,
    pub cancelled: Vec<DeliveryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<DeliveryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub store: DepotView,
    pub destinations: Vec<DestinationView>,
}

pub fn handle_register_driver<S: FleetStore, C: Clock>(
    tracker: &FleetTracker<S, C>,
    event: Value,
) -> ApiResponse {
    let payload = match normalize_event(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };
    let request = match serde_json::from_value::<RegisterDriver>(payload) {
        Ok(value) => value,
        Err(error) => return validation_error_response(&format!("Malformed request: {error}")),
    };

    match tracker.register_driver(request) {
        Ok(driver) => success_response(
            200,
            RegisteredResponse {
                success: true,
                message: format!("Driver '{}' registered.", driver.name),
                driver,
            },
        ),
        Err(error) => tracker_error_response(&error),
    }
}

pub fn handle_assign<S: FleetStore, C: Clock>(
    tracker: &FleetTracker<S, C>,
    event: Value,
) -> ApiResponse {
    let payload = match normalize_event(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };
    let request = match serde_json::from_value::<AssignRequest>(payload) {
        Ok(value) => value,
        Err(error) => return validation_error_response(&format!("Malformed request: {error}")),
    };

    match tracker.assign(request) {
        Ok(receipt) => success_response(
            200,
            AssignedResponse {
                success: true,
                message: receipt.message,
                delivery_id: receipt.delivery.id,
                package_id: receipt.delivery.package_id,
                eta_to_dest_min: receipt.eta_to_dest_min,
                distance_km: receipt.distance_km,
                cancelled: receipt.cancelled,
            },
        ),
        Err(error) => tracker_error_response(&error),
    }
}

pub fn handle_drivers_live<S: FleetStore, C: Clock>(tracker: &FleetTracker<S, C>) -> ApiResponse {
    match tracker.live_fleet() {
        Ok(view) => success_response(200, LiveFleetView::from(&view)),
        Err(error) => tracker_error_response(&error),
    }
}

pub fn handle_history<S: FleetStore, C: Clock>(tracker: &FleetTracker<S, C>) -> ApiResponse {
    match tracker.history() {
        Ok(history) => success_response(200, HistoryResponse { history }),
        Err(error) => tracker_error_response(&error),
    }
}

pub fn handle_destinations<S: FleetStore, C: Clock>(tracker: &FleetTracker<S, C>) -> ApiResponse {
    let config = tracker.config();
    let destinations = tracker
        .demo_destinations()
        .iter()
        .map(|destination| DestinationView::new(destination, &config.depot, config.speed_kmh))
        .collect();
    success_response(
        200,
        DestinationsResponse {
            store: DepotView::from(&config.depot),
            destinations,
        },
    )
}

#[cfg(test)]
mod tests {
    use fleet_core::config::TrackerConfig;
    use fleet_core::test_helpers::create_test_tracker;
    use serde_json::json;

    use super::*;

    #[test]
    fn register_requires_username_and_name() {
        let tracker = create_test_tracker(TrackerConfig::default());
        let response = handle_register_driver(&tracker, json!({"body": {"username": "sam"}}));
        assert_eq!(response.status_code, 400);
        let body = response.json().expect("json");
        assert_eq!(body["error"], "validation_error");
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let tracker = create_test_tracker(TrackerConfig::default());
        let response = handle_register_driver(
            &tracker,
            json!({"username": "driver", "name": "Another Alex"}),
        );
        assert_eq!(response.status_code, 409);
        let body = response.json().expect("json");
        assert_eq!(body["message"], "Username already exists");
    }

    #[test]
    fn malformed_assign_payload_is_rejected() {
        let tracker = create_test_tracker(TrackerConfig::default());
        let response = handle_assign(&tracker, json!({"driver_id": "one", "dest_name": "Ajax"}));
        assert_eq!(response.status_code, 400);
        assert!(tracker.history().expect("history").is_empty());
    }

    #[test]
    fn destinations_list_the_demo_pool_with_drive_times() {
        let tracker = create_test_tracker(TrackerConfig::default());
        let response = handle_destinations(&tracker);
        assert_eq!(response.status_code, 200);
        let body: DestinationsResponse =
            serde_json::from_str(&response.body).expect("destinations body");
        assert_eq!(body.destinations.len(), 8);
        assert_eq!(body.store.name, "Main Warehouse");
        let pearson = &body.destinations[0];
        assert_eq!(pearson.name, "Pearson Airport");
        assert_eq!(pearson.distance_km, 19.62);
        assert_eq!(pearson.eta_min, 33.6);
    }
}
