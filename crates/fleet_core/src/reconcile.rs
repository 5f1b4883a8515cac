//! Bring persisted delivery/driver status in line with a freshly derived phase.
//!
//! Stored status is a cache of [`TripPhase`], which is a pure function of time. Each
//! poll compares the two and writes only on divergence. Completion goes through
//! [`FleetStore::complete_delivery`] so the driver is freed in the same store step.
//! The store's forward-only compare-and-set makes racing pollers harmless: both target the same phase, one
//! applies it, the other sees `Unchanged`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::model::{Delivery, DeliveryStatus, TripPhase};
use crate::store::{FleetStore, StatusWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Stored status already matched; nothing written.
    InSync,
    /// This poll moved the delivery forward.
    Advanced {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    /// Another writer got there first (same phase written, or the delivery was cancelled).
    Superseded,
}

impl Reconciliation {
    pub fn wrote(&self) -> bool {
        matches!(self, Reconciliation::Advanced { .. })
    }
}

pub fn reconcile<S: FleetStore + ?Sized>(
    store: &S,
    delivery: &Delivery,
    derived: TripPhase,
    now: DateTime<Utc>,
) -> Result<Reconciliation, TrackerError> {
    let target = DeliveryStatus::from(derived);
    if delivery.status == target {
        return Ok(Reconciliation::InSync);
    }

    let write = match derived {
        TripPhase::Completed => store.complete_delivery(delivery.id, now)?,
        _ => store.update_delivery_status(delivery.id, target, None)?,
    };
    match write {
        StatusWrite::Applied => {
            tracing::debug!(
                delivery_id = %delivery.id,
                driver_id = %delivery.driver_id,
                from = %delivery.status,
                to = %target,
                "delivery status reconciled"
            );
            Ok(Reconciliation::Advanced {
                from: delivery.status,
                to: target,
            })
        }
        StatusWrite::Unchanged | StatusWrite::Rejected => {
            tracing::debug!(
                delivery_id = %delivery.id,
                to = %target,
                ?write,
                "reconciliation superseded by a concurrent write"
            );
            Ok(Reconciliation::Superseded)
        }
    }
}
