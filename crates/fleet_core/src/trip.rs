//! Trip simulator: derives a vehicle's phase and position from elapsed time alone.
//!
//! A trip is a straight outbound leg from the depot, a fixed dwell at the destination,
//! and the same leg back, all at constant speed:
//!
//! ```text
//! 0 ── travel ──▶ travel ── dwell ──▶ travel+dwell ── travel ──▶ total
//!    en_route       at_destination         returning          completed
//! ```
//!
//! Nothing here reads the clock or touches storage. Given the same delivery, config
//! and `now`, [`compute_position`] always returns the same [`Snapshot`], and a later
//! `now` never yields an earlier phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::seconds_between;
use crate::config::Depot;
use crate::geo::{distance_km, interpolate, travel_seconds, Coordinate};
use crate::model::{Delivery, DeliveryId, Destination, TripPhase};

/// Timing of one round trip, fixed at assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPlan {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub distance_km: f64,
    pub travel_secs: f64,
    pub dwell_secs: f64,
    pub total_secs: f64,
}

/// Where the vehicle is at a given elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPosition {
    pub phase: TripPhase,
    pub coordinate: Coordinate,
    /// Seconds left in the current phase window (0 once completed).
    pub remaining_secs: f64,
    pub elapsed_secs: f64,
}

impl TripPlan {
    pub fn new(origin: Coordinate, destination: Coordinate, speed_kmh: f64, dwell_secs: f64) -> Self {
        let distance_km = distance_km(origin, destination);
        let travel_secs = travel_seconds(distance_km, speed_kmh);
        Self {
            origin,
            destination,
            distance_km,
            travel_secs,
            dwell_secs,
            total_secs: 2.0 * travel_secs + dwell_secs,
        }
    }

    /// Phase for `elapsed_secs`; negative or NaN input counts as zero.
    pub fn phase_at(&self, elapsed_secs: f64) -> TripPhase {
        let e = clamp_elapsed(elapsed_secs);
        if e < self.travel_secs {
            TripPhase::EnRoute
        } else if e < self.travel_secs + self.dwell_secs {
            TripPhase::AtDestination
        } else if e < self.total_secs {
            TripPhase::Returning
        } else {
            TripPhase::Completed
        }
    }

    pub fn position_at(&self, elapsed_secs: f64) -> TripPosition {
        let e = clamp_elapsed(elapsed_secs);
        let phase = self.phase_at(e);
        let (coordinate, remaining_secs) = match phase {
            TripPhase::EnRoute => (
                interpolate(self.origin, self.destination, self.leg_fraction(e)),
                self.travel_secs - e,
            ),
            TripPhase::AtDestination => {
                (self.destination, self.travel_secs + self.dwell_secs - e)
            }
            TripPhase::Returning => (
                interpolate(
                    self.destination,
                    self.origin,
                    self.leg_fraction(e - self.travel_secs - self.dwell_secs),
                ),
                self.total_secs - e,
            ),
            TripPhase::Completed => (self.origin, 0.0),
        };
        TripPosition {
            phase,
            coordinate,
            remaining_secs,
            elapsed_secs: e,
        }
    }

    /// Seconds until the vehicle is back at the depot.
    pub fn remaining_total_secs(&self, elapsed_secs: f64) -> f64 {
        (self.total_secs - clamp_elapsed(elapsed_secs)).max(0.0)
    }

    /// Whole-trip progress in percent, rounded and clamped to [0, 100].
    pub fn progress_pct(&self, elapsed_secs: f64) -> u8 {
        if self.total_secs <= 0.0 {
            return 100;
        }
        let pct = (100.0 * clamp_elapsed(elapsed_secs) / self.total_secs).round();
        pct.clamp(0.0, 100.0) as u8
    }

    // A zero-length leg never reaches here: en_route and returning windows are empty.
    fn leg_fraction(&self, into_leg_secs: f64) -> f64 {
        if self.travel_secs > 0.0 {
            into_leg_secs / self.travel_secs
        } else {
            1.0
        }
    }
}

fn clamp_elapsed(elapsed_secs: f64) -> f64 {
    if elapsed_secs.is_nan() || elapsed_secs < 0.0 {
        0.0
    } else {
        elapsed_secs
    }
}

/// Point-in-time view of one delivery, ready for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub delivery_id: DeliveryId,
    pub package_id: String,
    pub destination: Destination,
    pub phase: TripPhase,
    pub coordinate: Coordinate,
    /// Dispatcher-facing description.
    pub status_label: String,
    /// Driver-facing description.
    pub driver_label: String,
    /// Countdown for the current phase.
    pub eta: String,
    pub eta_to_destination: String,
    pub eta_to_depot: String,
    pub progress_pct: u8,
    pub distance_km: f64,
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
    pub assigned_at: DateTime<Utc>,
}

/// Derive the snapshot of `delivery` at `now`.
///
/// `now` earlier than the assignment time (clock skew between writers) is treated as
/// the moment of assignment and logged; it is never an error.
pub fn compute_position(
    delivery: &Delivery,
    depot: &Depot,
    speed_kmh: f64,
    dwell_secs: f64,
    now: DateTime<Utc>,
) -> Snapshot {
    let plan = TripPlan::new(
        depot.coordinate,
        delivery.destination.coordinate,
        speed_kmh,
        dwell_secs,
    );
    let elapsed = seconds_between(delivery.assigned_at, now);
    if elapsed < 0.0 {
        tracing::warn!(
            delivery_id = %delivery.id,
            skew_secs = -elapsed,
            "poll time precedes assignment; treating as just assigned"
        );
    }
    snapshot_from_plan(&plan, delivery, depot, elapsed)
}

pub fn snapshot_from_plan(
    plan: &TripPlan,
    delivery: &Delivery,
    depot: &Depot,
    elapsed_secs: f64,
) -> Snapshot {
    let position = plan.position_at(elapsed_secs);
    let dest_name = delivery.destination.name.as_str();
    let to_depot = plan.remaining_total_secs(position.elapsed_secs);

    let (status_label, driver_label, eta, eta_to_destination, eta_to_depot) = match position.phase
    {
        TripPhase::EnRoute => (
            format!("En route to {dest_name}"),
            format!("En route → {dest_name}"),
            format_hms(position.remaining_secs),
            format_hms(position.remaining_secs),
            format_hms(to_depot),
        ),
        TripPhase::AtDestination => (
            format!("At {dest_name}"),
            format!("📦 Delivering at {dest_name}"),
            format!("Returning in {}s", position.remaining_secs as u64),
            "Arrived!".to_string(),
            format_hms(to_depot),
        ),
        TripPhase::Returning => (
            format!("Returning to {}", depot.name),
            format!("Returning → {}", depot.name),
            format_hms(position.remaining_secs),
            "Delivered ✓".to_string(),
            format_hms(to_depot),
        ),
        TripPhase::Completed => (
            IDLE_AT_WAREHOUSE.to_string(),
            "Back at Warehouse".to_string(),
            "Arrived".to_string(),
            "Delivered ✓".to_string(),
            "Arrived ✓".to_string(),
        ),
    };

    Snapshot {
        delivery_id: delivery.id,
        package_id: delivery.package_id.clone(),
        destination: delivery.destination.clone(),
        phase: position.phase,
        coordinate: position.coordinate,
        status_label,
        driver_label,
        eta,
        eta_to_destination,
        eta_to_depot,
        progress_pct: plan.progress_pct(position.elapsed_secs),
        distance_km: plan.distance_km,
        elapsed_secs: position.elapsed_secs,
        remaining_secs: position.remaining_secs,
        assigned_at: delivery.assigned_at,
    }
}

/// Dispatcher label for a vehicle parked at the depot.
pub const IDLE_AT_WAREHOUSE: &str = "Idle at Warehouse";

/// Driver label when there is nothing assigned.
pub const WAITING_FOR_ASSIGNMENT: &str = "Waiting for assignment";

/// `H:MM:SS` countdown of whole seconds (fraction truncated), with a day prefix past 24h.
pub fn format_hms(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    match days {
        0 => format!("{hours}:{minutes:02}:{seconds:02}"),
        1 => format!("1 day, {hours}:{minutes:02}:{seconds:02}"),
        n => format!("{n} days, {hours}:{minutes:02}:{seconds:02}"),
    }
}
