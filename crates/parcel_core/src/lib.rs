//! Core persistence and lifecycle rules for the parcel tracker.
//! This crate is the single source of truth for parcel invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{default_log_level, ConfigError, LogConfig, TrackerConfig};
pub use logging::{init_logging, logging_status};
pub use model::parcel::{
    is_utc_rfc3339, now_rfc3339, ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelStatusError,
    ParcelValidationError,
};
pub use repo::parcel_repo::{ParcelStore, SqliteParcelStore, StoreError, StoreResult};
pub use service::parcel_service::ParcelService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
