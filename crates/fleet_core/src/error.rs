use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{DeliveryId, DriverId};

/// Failures reported by a [`crate::store::FleetStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("driver {0} not found")]
    DriverNotFound(DriverId),
    #[error("delivery {0} not found")]
    DeliveryNotFound(DeliveryId),
    #[error("{0}")]
    Conflict(String),
    /// A write would break `completed_at` ⇔ `completed`.
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// Bad or missing caller input; rejected before the simulator runs.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Fatal to the current operation only.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("store failure: {0}")]
    Store(String),
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation(message.into())
    }

    /// Stable machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "validation_error",
            TrackerError::NotFound(_) => "not_found",
            TrackerError::Conflict(_) => "conflict",
            TrackerError::InvariantViolation(_) => "invariant_violation",
            TrackerError::Config(_) => "misconfiguration",
            TrackerError::Store(_) => "store_error",
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DriverNotFound(_) | StoreError::DeliveryNotFound(_) => {
                TrackerError::NotFound(error.to_string())
            }
            StoreError::Conflict(message) => TrackerError::Conflict(message),
            StoreError::Invariant(message) => TrackerError::InvariantViolation(message),
            StoreError::Unavailable(_) => TrackerError::Store(error.to_string()),
        }
    }
}
