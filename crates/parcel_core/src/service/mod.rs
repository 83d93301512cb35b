//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parcel store calls into tracker use-cases.
//! - Keep CLI callers decoupled from storage details.

pub mod parcel_service;
