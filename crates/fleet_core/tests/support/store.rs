use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fleet_core::error::StoreError;
use fleet_core::model::{
    Delivery, DeliveryId, DeliveryStatus, Driver, DriverId, DriverStatus, NewDelivery, NewDriver,
};
use fleet_core::store::{Assignment, FleetStore, MemoryStore, StatusWrite};
use fleet_core::telemetry::DeliveryRecord;

/// Memory store that counts status writes reaching storage.
///
/// An assignment queued with [`CountingStore::assign_after_completion`] is committed
/// straight after the next completing write returns, ahead of anything the caller
/// does next.
#[derive(Debug)]
pub struct CountingStore {
    pub inner: MemoryStore,
    status_writes: AtomicUsize,
    driver_writes: AtomicUsize,
    after_completion: Mutex<Option<NewDelivery>>,
}

impl CountingStore {
    pub fn seeded() -> Self {
        Self {
            inner: MemoryStore::seeded().expect("seed"),
            status_writes: AtomicUsize::new(0),
            driver_writes: AtomicUsize::new(0),
            after_completion: Mutex::new(None),
        }
    }

    pub fn assign_after_completion(&self, delivery: NewDelivery) {
        *self.after_completion.lock().expect("hook lock") = Some(delivery);
    }

    fn run_completion_hook(&self) {
        let pending = self.after_completion.lock().expect("hook lock").take();
        if let Some(delivery) = pending {
            self.inner
                .assign_delivery(delivery)
                .expect("interleaved assignment");
        }
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn driver_writes(&self) -> usize {
        self.driver_writes.load(Ordering::SeqCst)
    }
}

impl FleetStore for CountingStore {
    fn register_driver(&self, driver: NewDriver) -> Result<Driver, StoreError> {
        self.inner.register_driver(driver)
    }

    fn driver(&self, driver_id: DriverId) -> Result<Option<Driver>, StoreError> {
        self.inner.driver(driver_id)
    }

    fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        self.inner.drivers()
    }

    fn get_active_delivery(&self, driver_id: DriverId) -> Result<Option<Delivery>, StoreError> {
        self.inner.get_active_delivery(driver_id)
    }

    fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<StatusWrite, StoreError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        let write = self
            .inner
            .update_delivery_status(delivery_id, status, completed_at);
        if status == DeliveryStatus::Completed {
            self.run_completion_hook();
        }
        write
    }

    fn complete_delivery(
        &self,
        delivery_id: DeliveryId,
        completed_at: DateTime<Utc>,
    ) -> Result<StatusWrite, StoreError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        let write = self.inner.complete_delivery(delivery_id, completed_at);
        self.run_completion_hook();
        write
    }

    fn set_driver_status(
        &self,
        driver_id: DriverId,
        status: DriverStatus,
    ) -> Result<(), StoreError> {
        self.driver_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_driver_status(driver_id, status)
    }

    fn assign_delivery(&self, delivery: NewDelivery) -> Result<Assignment, StoreError> {
        self.inner.assign_delivery(delivery)
    }

    fn recent_deliveries(&self, limit: usize) -> Result<Vec<DeliveryRecord>, StoreError> {
        self.inner.recent_deliveries(limit)
    }
}
