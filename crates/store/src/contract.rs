//! The data-store contract consumed by the booking core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use tripbook_catalog::{Capacity, Client, ClientTripView, Pesel, TripView};
use tripbook_core::{ClientId, TripId};

/// A constraint the store enforces on write, mirroring the relational schema.
///
/// These fire only when a violation races past the service's own precondition
/// checks; the service re-maps them to the corresponding booking outcome.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Primary key on `(client_id, trip_id)`: one registration per pair.
    DuplicateRegistration,
    /// Per-trip registration count must stay within the trip's capacity.
    CapacityExceeded,
    /// Unique index on the client's PESEL.
    DuplicatePesel,
}

impl core::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ConstraintKind::DuplicateRegistration => "duplicate registration",
            ConstraintKind::CapacityExceeded => "capacity exceeded",
            ConstraintKind::DuplicatePesel => "duplicate pesel",
        };
        f.write_str(name)
    }
}

/// Storage operation error.
///
/// `Constraint` is the only variant with business meaning; everything else is
/// infrastructure failure surfaced as-is.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violated: {0}")]
    Constraint(ConstraintKind),

    #[error("storage backend failure in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Durable storage for trips, clients, and registrations.
///
/// ## Atomicity contract
///
/// Each method is individually atomic. The read-then-write sequence of a
/// registration (`count_registrations` then `insert_registration`) is made
/// indivisible per trip by the booking ledger's per-trip lease, which callers
/// hold across the sequence. Implementations must additionally enforce the
/// uniqueness and capacity constraints on `insert_registration` itself, so a
/// writer outside the lease cannot break the invariants; it only observes
/// `StoreError::Constraint`.
///
/// ## Consistency
///
/// Read projections (`list_trips`, `list_client_trips`) must return data
/// consistent with some committed state; snapshot isolation is sufficient.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn client_exists(&self, client_id: ClientId) -> Result<bool, StoreError>;

    /// Capacity of the trip, or `None` if the trip does not exist.
    async fn trip_capacity(&self, trip_id: TripId) -> Result<Option<Capacity>, StoreError>;

    async fn registration_exists(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<bool, StoreError>;

    /// Current number of registrations for the trip.
    async fn count_registrations(&self, trip_id: TripId) -> Result<u64, StoreError>;

    /// Insert one registration row.
    ///
    /// Fails with `Constraint(DuplicateRegistration)` or
    /// `Constraint(CapacityExceeded)` when the corresponding store-level
    /// constraint is violated concurrently.
    async fn insert_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Delete one registration row. Returns the number of rows affected.
    async fn delete_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<u64, StoreError>;

    async fn pesel_exists(&self, pesel: &Pesel) -> Result<bool, StoreError>;

    /// Insert a new client. Fails with `Constraint(DuplicatePesel)` when the
    /// PESEL unique index is violated concurrently.
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError>;

    /// All trips, ordered by `date_from` ascending, countries nested.
    async fn list_trips(&self) -> Result<Vec<TripView>, StoreError>;

    /// The client's booked trips, ordered by `registered_at` descending.
    async fn list_client_trips(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientTripView>, StoreError>;
}

#[async_trait]
impl<S> BookingStore for Arc<S>
where
    S: BookingStore + ?Sized,
{
    async fn client_exists(&self, client_id: ClientId) -> Result<bool, StoreError> {
        (**self).client_exists(client_id).await
    }

    async fn trip_capacity(&self, trip_id: TripId) -> Result<Option<Capacity>, StoreError> {
        (**self).trip_capacity(trip_id).await
    }

    async fn registration_exists(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<bool, StoreError> {
        (**self).registration_exists(client_id, trip_id).await
    }

    async fn count_registrations(&self, trip_id: TripId) -> Result<u64, StoreError> {
        (**self).count_registrations(trip_id).await
    }

    async fn insert_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self)
            .insert_registration(client_id, trip_id, registered_at)
            .await
    }

    async fn delete_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<u64, StoreError> {
        (**self).delete_registration(client_id, trip_id).await
    }

    async fn pesel_exists(&self, pesel: &Pesel) -> Result<bool, StoreError> {
        (**self).pesel_exists(pesel).await
    }

    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        (**self).insert_client(client).await
    }

    async fn list_trips(&self) -> Result<Vec<TripView>, StoreError> {
        (**self).list_trips().await
    }

    async fn list_client_trips(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientTripView>, StoreError> {
        (**self).list_client_trips(client_id).await
    }
}
