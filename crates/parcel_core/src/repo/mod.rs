//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the parcel store contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store APIs return a semantic `NotFound` in addition to DB transport
//!   errors.
//! - Status-gated mutations are filtered in SQL and are silent no-ops for
//!   parcels that left `registered`.

pub mod parcel_repo;
