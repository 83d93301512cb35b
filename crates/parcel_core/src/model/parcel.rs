//! Parcel domain model.
//!
//! # Responsibility
//! - Define the shipment record persisted by the parcel store.
//! - Provide status parsing and workflow helpers.
//!
//! # Invariants
//! - `created_at` is an RFC-3339 UTC timestamp, set once at creation.
//! - `address` may change only while status is `registered`.
//! - `number == 0` means "not yet assigned by storage".

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Lifecycle state of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted, not yet handed to the carrier. Address is still editable.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
}

/// Persisted string value for `ParcelStatus::Registered`.
pub const PARCEL_STATUS_REGISTERED: &str = "registered";
/// Persisted string value for `ParcelStatus::Sent`.
pub const PARCEL_STATUS_SENT: &str = "sent";
/// Persisted string value for `ParcelStatus::Delivered`.
pub const PARCEL_STATUS_DELIVERED: &str = "delivered";

impl ParcelStatus {
    /// Stable string id used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => PARCEL_STATUS_REGISTERED,
            Self::Sent => PARCEL_STATUS_SENT,
            Self::Delivered => PARCEL_STATUS_DELIVERED,
        }
    }

    /// Parses a persisted status value. Matching is exact: padded or
    /// differently cased values are rejected.
    pub fn parse(value: &str) -> Result<Self, ParcelStatusError> {
        if value.is_empty() {
            return Err(ParcelStatusError::Empty);
        }

        match value {
            PARCEL_STATUS_REGISTERED => Ok(Self::Registered),
            PARCEL_STATUS_SENT => Ok(Self::Sent),
            PARCEL_STATUS_DELIVERED => Ok(Self::Delivered),
            other => Err(ParcelStatusError::Unsupported(other.to_string())),
        }
    }

    /// Returns the workflow successor, or `None` for the terminal status.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelStatusError {
    Empty,
    Unsupported(String),
}

impl Display for ParcelStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "parcel status must not be empty"),
            Self::Unsupported(value) => write!(
                f,
                "unsupported parcel status `{value}`; expected registered|sent|delivered"
            ),
        }
    }
}

impl Error for ParcelStatusError {}

/// Validation failures for parcel records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelValidationError {
    /// `created_at` is not an RFC-3339 UTC timestamp.
    InvalidCreatedAt(String),
}

impl Display for ParcelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCreatedAt(value) => {
                write!(f, "created_at `{value}` is not an RFC-3339 UTC timestamp")
            }
        }
    }
}

impl Error for ParcelValidationError {}

/// Shipment record tracked by the parcel store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Assigned by storage on insert; `0` before that.
    pub number: ParcelNumber,
    /// Owning client. Immutable after creation.
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Free-text delivery address.
    pub address: String,
    /// RFC-3339 UTC creation timestamp.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: now_rfc3339(),
        }
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ParcelValidationError> {
        if !is_utc_rfc3339(&self.created_at) {
            return Err(ParcelValidationError::InvalidCreatedAt(
                self.created_at.clone(),
            ));
        }
        Ok(())
    }

    /// Returns whether the delivery address may still be edited.
    pub fn is_address_mutable(&self) -> bool {
        self.status == ParcelStatus::Registered
    }
}

/// Current UTC time as RFC-3339 with second precision, e.g. `2024-01-02T03:04:05Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Returns whether `value` is an RFC-3339 timestamp with a zero UTC offset.
pub fn is_utc_rfc3339(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.offset().local_minus_utc() == 0)
        .unwrap_or(false)
}
