//! Persistence seam for drivers and deliveries.
//!
//! The tracker only talks to storage through [`FleetStore`]. Implementations must be
//! `Send + Sync` so one store can serve concurrent pollers, and every method is its own
//! atomic unit: in particular [`FleetStore::assign_delivery`] cancels, inserts and marks
//! the driver busy in one step, [`FleetStore::complete_delivery`] completes a trip and
//! frees its driver in one step, and [`FleetStore::update_delivery_status`] is a
//! compare-and-set that only ever moves a delivery forward.
//!
//! [`MemoryStore`] is the in-process implementation used by the CLI and tests.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{
    Delivery, DeliveryId, DeliveryStatus, Driver, DriverId, DriverStatus, NewDelivery, NewDriver,
};
use crate::telemetry::DeliveryRecord;

pub use memory::MemoryStore;

/// Outcome of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusWrite {
    /// The status moved forward to the requested value.
    Applied,
    /// The delivery already had the requested status; nothing was written.
    Unchanged,
    /// The move would go backward or leave a terminal status; nothing was written.
    Rejected,
}

/// Result of an atomic assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub delivery: Delivery,
    /// Previously active deliveries of the same driver, now `cancelled`.
    pub cancelled: Vec<DeliveryId>,
}

pub trait FleetStore: Send + Sync {
    fn register_driver(&self, driver: NewDriver) -> Result<Driver, StoreError>;

    fn driver(&self, driver_id: DriverId) -> Result<Option<Driver>, StoreError>;

    /// All drivers in id order.
    fn drivers(&self) -> Result<Vec<Driver>, StoreError>;

    /// The driver's most recently assigned delivery still in an active status.
    fn get_active_delivery(&self, driver_id: DriverId) -> Result<Option<Delivery>, StoreError>;

    /// Move a delivery to `status`. `completed_at` must be present iff `status` is
    /// `Completed`; anything else is a [`StoreError::Invariant`].
    fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusWrite, StoreError>;

    fn set_driver_status(&self, driver_id: DriverId, status: DriverStatus)
        -> Result<(), StoreError>;

    /// Mark a delivery `completed` at `completed_at` and, in the same step, idle its
    /// driver unless the driver already holds another active delivery. Same
    /// `Applied`/`Unchanged`/`Rejected` semantics as [`FleetStore::update_delivery_status`].
    fn complete_delivery(
        &self,
        delivery_id: DeliveryId,
        completed_at: DateTime<Utc>,
    ) -> Result<StatusWrite, StoreError>;

    /// Cancel the driver's active deliveries, insert `delivery` as `en_route` and mark
    /// the driver busy, all or nothing.
    fn assign_delivery(&self, delivery: NewDelivery) -> Result<Assignment, StoreError>;

    /// Newest deliveries first, at most `limit` rows.
    fn recent_deliveries(&self, limit: usize) -> Result<Vec<DeliveryRecord>, StoreError>;
}

impl<S: FleetStore + ?Sized> FleetStore for std::sync::Arc<S> {
    fn register_driver(&self, driver: NewDriver) -> Result<Driver, StoreError> {
        (**self).register_driver(driver)
    }

    fn driver(&self, driver_id: DriverId) -> Result<Option<Driver>, StoreError> {
        (**self).driver(driver_id)
    }

    fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        (**self).drivers()
    }

    fn get_active_delivery(&self, driver_id: DriverId) -> Result<Option<Delivery>, StoreError> {
        (**self).get_active_delivery(driver_id)
    }

    fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusWrite, StoreError> {
        (**self).update_delivery_status(delivery_id, status, completed_at)
    }

    fn set_driver_status(
        &self,
        driver_id: DriverId,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        (**self).set_driver_status(driver_id, status)
    }

    fn complete_delivery(
        &self,
        delivery_id: DeliveryId,
        completed_at: DateTime<Utc>,
    ) -> Result<StatusWrite, StoreError> {
        (**self).complete_delivery(delivery_id, completed_at)
    }

    fn assign_delivery(&self, delivery: NewDelivery) -> Result<Assignment, StoreError> {
        (**self).assign_delivery(delivery)
    }

    fn recent_deliveries(&self, limit: usize) -> Result<Vec<DeliveryRecord>, StoreError> {
        (**self).recent_deliveries(limit)
    }
}

/// Shared check used by implementations before any status write.
pub fn check_completion_invariant(
    status: DeliveryStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<(), StoreError> {
    match (status, completed_at) {
        (DeliveryStatus::Completed, None) => Err(StoreError::Invariant(
            "completed status requires completed_at".to_string(),
        )),
        (other, Some(_)) if other != DeliveryStatus::Completed => Err(StoreError::Invariant(
            format!("completed_at set for status {other}"),
        )),
        _ => Ok(()),
    }
}
