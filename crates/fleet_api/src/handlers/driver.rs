use fleet_core::clock::Clock;
use fleet_core::model::DriverId;
use fleet_core::store::FleetStore;
use fleet_core::tracker::FleetTracker;

use crate::response::{success_response, tracker_error_response, ApiResponse};
use crate::views::MyStatusView;

/// The signed-in driver's own trip. Polling here reconciles stored status just like
/// the dispatcher map does.
pub fn handle_my_status<S: FleetStore, C: Clock>(
    tracker: &FleetTracker<S, C>,
    driver_id: DriverId,
) -> ApiResponse {
    match tracker.driver_status(driver_id) {
        Ok(observation) => success_response(200, MyStatusView::from(&observation)),
        Err(error) => tracker_error_response(&error),
    }
}
