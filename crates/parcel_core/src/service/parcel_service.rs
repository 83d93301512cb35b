//! Parcel tracking use-case service.
//!
//! # Responsibility
//! - Register parcels and walk them through `registered -> sent -> delivered`.
//! - Delegate persistence to a `ParcelStore` implementation.
//!
//! # Invariants
//! - Store errors are returned unchanged.
//! - Address edits and deletes keep the store's silent no-op policy.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelStore, StoreResult};

/// Use-case service wrapper for parcel tracking.
pub struct ParcelService<S: ParcelStore> {
    store: S,
}

impl<S: ParcelStore> ParcelService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new parcel for `client` and returns it with its number set.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> StoreResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.store.add(&parcel)?;
        Ok(parcel)
    }

    /// Returns every parcel of one client.
    pub fn client_parcels(&self, client: ClientId) -> StoreResult<Vec<Parcel>> {
        self.store.get_by_client(client)
    }

    /// Advances a parcel one workflow step and returns the resulting status.
    ///
    /// # Contract
    /// - `registered` becomes `sent`, `sent` becomes `delivered`.
    /// - A delivered parcel is left untouched.
    pub fn next_status(&self, number: ParcelNumber) -> StoreResult<ParcelStatus> {
        let parcel = self.store.get(number)?;
        match parcel.status.next() {
            Some(next) => {
                self.store.set_status(number, next)?;
                Ok(next)
            }
            None => Ok(parcel.status),
        }
    }

    /// Changes the delivery address; no effect once the parcel was sent.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()> {
        self.store.set_address(number, address)
    }

    /// Deletes a parcel; no effect once the parcel was sent.
    pub fn delete(&self, number: ParcelNumber) -> StoreResult<()> {
        self.store.delete(number)
    }
}
