use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{check_completion_invariant, Assignment, FleetStore, StatusWrite};
use crate::error::StoreError;
use crate::model::{
    Delivery, DeliveryId, DeliveryStatus, Driver, DriverId, DriverStatus, NewDelivery, NewDriver,
};
use crate::telemetry::DeliveryRecord;

/// Default driver profile every fresh deployment starts with.
pub const DEFAULT_DRIVER_USERNAME: &str = "driver";
pub const DEFAULT_DRIVER_NAME: &str = "Alex Driver";
pub const DEFAULT_DRIVER_PHONE: &str = "+1-416-555-0101";
pub const DEFAULT_DRIVER_VEHICLE: &str = "Cargo Van";

#[derive(Debug, Default)]
struct Tables {
    drivers: BTreeMap<DriverId, Driver>,
    deliveries: BTreeMap<DeliveryId, Delivery>,
    next_driver_id: u64,
    next_delivery_id: u64,
}

impl Tables {
    fn active_delivery(&self, driver_id: DriverId) -> Option<&Delivery> {
        self.deliveries
            .values()
            .filter(|d| d.driver_id == driver_id && d.status.is_active())
            .max_by_key(|d| (d.assigned_at, d.id))
    }
}

/// In-process store. One mutex guards both tables, so every trait method runs as a
/// single transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the default driver profile.
    pub fn seeded() -> Result<Self, StoreError> {
        let store = Self::new();
        store.register_driver(NewDriver {
            username: DEFAULT_DRIVER_USERNAME.to_string(),
            name: DEFAULT_DRIVER_NAME.to_string(),
            phone: DEFAULT_DRIVER_PHONE.to_string(),
            vehicle: DEFAULT_DRIVER_VEHICLE.to_string(),
        })?;
        Ok(store)
    }

    /// Every delivery, in id order (test and export helper).
    pub fn deliveries(&self) -> Result<Vec<Delivery>, StoreError> {
        Ok(self.lock()?.deliveries.values().cloned().collect())
    }

    pub fn delivery(&self, delivery_id: DeliveryId) -> Result<Option<Delivery>, StoreError> {
        Ok(self.lock()?.deliveries.get(&delivery_id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl FleetStore for MemoryStore {
    fn register_driver(&self, driver: NewDriver) -> Result<Driver, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .drivers
            .values()
            .any(|existing| existing.username == driver.username)
        {
            return Err(StoreError::Conflict("Username already exists".to_string()));
        }
        tables.next_driver_id += 1;
        let record = Driver {
            id: DriverId(tables.next_driver_id),
            username: driver.username,
            name: driver.name,
            phone: driver.phone,
            vehicle: driver.vehicle,
            status: DriverStatus::Idle,
        };
        tables.drivers.insert(record.id, record.clone());
        Ok(record)
    }

    fn driver(&self, driver_id: DriverId) -> Result<Option<Driver>, StoreError> {
        Ok(self.lock()?.drivers.get(&driver_id).cloned())
    }

    fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        Ok(self.lock()?.drivers.values().cloned().collect())
    }

    fn get_active_delivery(&self, driver_id: DriverId) -> Result<Option<Delivery>, StoreError> {
        Ok(self.lock()?.active_delivery(driver_id).cloned())
    }

    fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusWrite, StoreError> {
        check_completion_invariant(status, completed_at)?;
        let mut tables = self.lock()?;
        let delivery = tables
            .deliveries
            .get_mut(&delivery_id)
            .ok_or(StoreError::DeliveryNotFound(delivery_id))?;

        if delivery.status == status {
            return Ok(StatusWrite::Unchanged);
        }
        if !delivery.status.can_advance_to(status) {
            return Ok(StatusWrite::Rejected);
        }
        delivery.status = status;
        delivery.completed_at = completed_at;
        Ok(StatusWrite::Applied)
    }

    fn set_driver_status(
        &self,
        driver_id: DriverId,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let driver = tables
            .drivers
            .get_mut(&driver_id)
            .ok_or(StoreError::DriverNotFound(driver_id))?;
        driver.status = status;
        Ok(())
    }

    fn complete_delivery(
        &self,
        delivery_id: DeliveryId,
        completed_at: DateTime<Utc>,
    ) -> Result<StatusWrite, StoreError> {
        let mut tables = self.lock()?;
        let delivery = tables
            .deliveries
            .get_mut(&delivery_id)
            .ok_or(StoreError::DeliveryNotFound(delivery_id))?;

        if delivery.status == DeliveryStatus::Completed {
            return Ok(StatusWrite::Unchanged);
        }
        if !delivery.status.can_advance_to(DeliveryStatus::Completed) {
            return Ok(StatusWrite::Rejected);
        }
        delivery.status = DeliveryStatus::Completed;
        delivery.completed_at = Some(completed_at);
        let driver_id = delivery.driver_id;

        if tables.active_delivery(driver_id).is_none() {
            if let Some(driver) = tables.drivers.get_mut(&driver_id) {
                driver.status = DriverStatus::Idle;
            }
        }
        Ok(StatusWrite::Applied)
    }

    fn assign_delivery(&self, delivery: NewDelivery) -> Result<Assignment, StoreError> {
        let mut tables = self.lock()?;
        if !tables.drivers.contains_key(&delivery.driver_id) {
            return Err(StoreError::DriverNotFound(delivery.driver_id));
        }

        let mut cancelled = Vec::new();
        for existing in tables.deliveries.values_mut() {
            if existing.driver_id == delivery.driver_id && existing.status.is_active() {
                existing.status = DeliveryStatus::Cancelled;
                cancelled.push(existing.id);
            }
        }

        tables.next_delivery_id += 1;
        let record = Delivery {
            id: DeliveryId(tables.next_delivery_id),
            driver_id: delivery.driver_id,
            package_id: delivery.package_id,
            destination: delivery.destination,
            assigned_at: delivery.assigned_at,
            completed_at: None,
            status: DeliveryStatus::EnRoute,
        };
        tables.deliveries.insert(record.id, record.clone());
        if let Some(driver) = tables.drivers.get_mut(&record.driver_id) {
            driver.status = DriverStatus::Busy;
        }

        Ok(Assignment {
            delivery: record,
            cancelled,
        })
    }

    fn recent_deliveries(&self, limit: usize) -> Result<Vec<DeliveryRecord>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<&Delivery> = tables.deliveries.values().collect();
        rows.sort_by(|a, b| (b.assigned_at, b.id).cmp(&(a.assigned_at, a.id)));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|delivery| {
                let driver_name = tables
                    .drivers
                    .get(&delivery.driver_id)
                    .map(|driver| driver.name.as_str())
                    .unwrap_or_default();
                DeliveryRecord::from_delivery(delivery, driver_name)
            })
            .collect())
    }
}
