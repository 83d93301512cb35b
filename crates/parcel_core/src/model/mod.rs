//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the parcel record and its closed status set.
//! - Keep lifecycle rules (address mutability, workflow order) next to data.
//!
//! # Invariants
//! - `Parcel::number` is assigned by storage and never reused.
//! - Status values are a closed enum, persisted as lowercase names.

pub mod parcel;
