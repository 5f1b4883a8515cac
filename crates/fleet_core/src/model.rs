//! Persisted records and the status vocabulary shared by the simulator and the store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Driver availability. Always mirrors "has an active delivery".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Idle,
    Busy,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Idle => "idle",
            DriverStatus::Busy => "busy",
        }
    }
}

/// The four time-driven trip phases, in the order a trip passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    EnRoute,
    AtDestination,
    Returning,
    Completed,
}

impl TripPhase {
    pub fn as_str(&self) -> &'static str {
        DeliveryStatus::from(*self).as_str()
    }
}

/// Persisted delivery status: a cached projection of [`TripPhase`] plus terminal `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    EnRoute,
    AtDestination,
    Returning,
    Completed,
    Cancelled,
}

impl DeliveryStatus {
    pub const ACTIVE: [DeliveryStatus; 3] = [
        DeliveryStatus::EnRoute,
        DeliveryStatus::AtDestination,
        DeliveryStatus::Returning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::EnRoute => "en_route",
            DeliveryStatus::AtDestination => "at_destination",
            DeliveryStatus::Returning => "returning",
            DeliveryStatus::Completed => "completed",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// The trip phase this status caches, if any.
    pub fn phase(&self) -> Option<TripPhase> {
        match self {
            DeliveryStatus::EnRoute => Some(TripPhase::EnRoute),
            DeliveryStatus::AtDestination => Some(TripPhase::AtDestination),
            DeliveryStatus::Returning => Some(TripPhase::Returning),
            DeliveryStatus::Completed => Some(TripPhase::Completed),
            DeliveryStatus::Cancelled => None,
        }
    }

    /// Forward-only: a later phase, or cancellation of an active delivery.
    /// Terminal statuses never move.
    pub fn can_advance_to(&self, next: DeliveryStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.phase(), next.phase()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

impl From<TripPhase> for DeliveryStatus {
    fn from(phase: TripPhase) -> Self {
        match phase {
            TripPhase::EnRoute => DeliveryStatus::EnRoute,
            TripPhase::AtDestination => DeliveryStatus::AtDestination,
            TripPhase::Returning => DeliveryStatus::Returning,
            TripPhase::Completed => DeliveryStatus::Completed,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "en_route" => Ok(DeliveryStatus::EnRoute),
            "at_destination" => Ok(DeliveryStatus::AtDestination),
            "returning" => Ok(DeliveryStatus::Returning),
            "completed" => Ok(DeliveryStatus::Completed),
            "cancelled" => Ok(DeliveryStatus::Cancelled),
            other => Err(format!("unknown delivery status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub username: String,
    pub name: String,
    pub phone: String,
    pub vehicle: String,
    pub status: DriverStatus,
}

/// Named drop-off point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub driver_id: DriverId,
    pub package_id: String,
    pub destination: Destination,
    /// When the trip began; the only time input to the simulator.
    pub assigned_at: DateTime<Utc>,
    /// Set iff `status` is `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
}

/// Input for registering a driver profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDriver {
    pub username: String,
    pub name: String,
    pub phone: String,
    pub vehicle: String,
}

/// Input for a new assignment; the store stamps id and initial status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub driver_id: DriverId,
    pub package_id: String,
    pub destination: Destination,
    pub assigned_at: DateTime<Utc>,
}
