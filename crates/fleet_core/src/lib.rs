pub mod clock;
pub mod config;
pub mod destinations;
pub mod error;
pub mod geo;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod telemetry;
pub mod telemetry_export;
pub mod tracker;
pub mod trip;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
