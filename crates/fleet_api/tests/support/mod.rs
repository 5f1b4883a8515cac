#![allow(dead_code)]

use fleet_api::response::ApiResponse;
use fleet_core::config::TrackerConfig;
use fleet_core::test_helpers::{create_test_tracker, TestTracker};
use serde_json::{json, Value};

pub fn tracker() -> TestTracker {
    create_test_tracker(TrackerConfig::default())
}

/// Decode a response body, failing the test on anything but valid JSON.
pub fn body(response: &ApiResponse) -> Value {
    response.json().expect("response body should be JSON")
}

/// Gateway-style event whose body is a serialized JSON string.
pub fn gateway_event(payload: Value) -> Value {
    json!({ "body": payload.to_string() })
}

/// Seconds from assignment until a trip to `(lat, lng)` is back at the default depot.
pub fn round_trip_secs(lat: f64, lng: f64) -> f64 {
    let config = TrackerConfig::default();
    let km = fleet_core::geo::distance_km(
        config.depot.coordinate,
        fleet_core::geo::Coordinate::new(lat, lng),
    );
    2.0 * fleet_core::geo::travel_seconds(km, config.speed_kmh) + config.dwell_secs
}
