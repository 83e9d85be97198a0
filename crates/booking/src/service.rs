//! Registration orchestration.
//!
//! `RegistrationService` owns the admission decision end to end: it acquires
//! the trip's lease, checks the preconditions against the store in order
//! (client exists, trip exists, no duplicate, room available), and commits the
//! registration, all before the lease is released. The store's own unique
//! and capacity constraints remain as a second line of defense and are
//! re-mapped to their booking outcomes when they fire.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use tripbook_catalog::admission::{self, Admission};
use tripbook_catalog::{Client, NewClient};
use tripbook_core::{ClientId, TripId};
use tripbook_store::BookingStore;

use crate::error::BookingError;
use crate::ledger::TripLedger;

/// Receipt for a successful registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Registered {
    pub registered_at: DateTime<Utc>,
}

/// The booking core's write surface.
pub struct RegistrationService {
    store: Arc<dyn BookingStore>,
    ledger: Arc<TripLedger>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn BookingStore>, ledger: Arc<TripLedger>) -> Self {
        Self { store, ledger }
    }

    /// Register `client_id` onto `trip_id`.
    ///
    /// The whole check-then-insert sequence runs under the trip's lease, so
    /// two concurrent calls that both observe "room available" cannot both
    /// commit when only one slot remains.
    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id), err)]
    pub async fn register(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<Registered, BookingError> {
        let _lease = self
            .ledger
            .acquire(trip_id)
            .await
            .map_err(|_| BookingError::Unavailable)?;

        if !self
            .store
            .client_exists(client_id)
            .await
            .map_err(BookingError::from_store)?
        {
            return Err(BookingError::ClientNotFound);
        }

        let Some(capacity) = self
            .store
            .trip_capacity(trip_id)
            .await
            .map_err(BookingError::from_store)?
        else {
            return Err(BookingError::TripNotFound);
        };

        let already_registered = self
            .store
            .registration_exists(client_id, trip_id)
            .await
            .map_err(BookingError::from_store)?;
        let registered = self
            .store
            .count_registrations(trip_id)
            .await
            .map_err(BookingError::from_store)?;

        match admission::decide(capacity, registered, already_registered) {
            Admission::AlreadyRegistered => Err(BookingError::AlreadyRegistered),
            Admission::Full => Err(BookingError::CapacityExceeded),
            Admission::Admit => {
                // Timestamp taken inside the lease: registered_at order
                // matches admission order per trip.
                let registered_at = Utc::now();
                self.store
                    .insert_registration(client_id, trip_id, registered_at)
                    .await
                    .map_err(BookingError::from_store)?;

                tracing::info!(
                    occupancy = registered + 1,
                    capacity = capacity.get(),
                    "registration admitted"
                );
                Ok(Registered { registered_at })
            }
        }
    }

    /// Cancel the registration of `client_id` on `trip_id`.
    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id), err)]
    pub async fn cancel(&self, client_id: ClientId, trip_id: TripId) -> Result<(), BookingError> {
        let _lease = self
            .ledger
            .acquire(trip_id)
            .await
            .map_err(|_| BookingError::Unavailable)?;

        let rows = self
            .store
            .delete_registration(client_id, trip_id)
            .await
            .map_err(BookingError::from_store)?;

        if rows == 0 {
            return Err(BookingError::RegistrationNotFound);
        }

        tracing::info!("registration cancelled");
        Ok(())
    }

    /// Onboard a new client, enforcing PESEL uniqueness.
    ///
    /// No trip lease is involved; the store's unique index is the backstop
    /// against a concurrently raced duplicate.
    #[instrument(skip(self, new), err)]
    pub async fn create_client(&self, new: NewClient) -> Result<ClientId, BookingError> {
        let client = Client::onboard(ClientId::new(), new)?;

        if self
            .store
            .pesel_exists(&client.pesel)
            .await
            .map_err(BookingError::from_store)?
        {
            return Err(BookingError::DuplicatePesel);
        }

        self.store
            .insert_client(&client)
            .await
            .map_err(BookingError::from_store)?;

        tracing::info!(client_id = %client.id, "client onboarded");
        Ok(client.id)
    }
}
