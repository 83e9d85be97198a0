//! Read projections: trip listing and per-client trip listing.
//!
//! Pure reads; no invariants beyond returning a consistent committed
//! snapshot. Ordering is part of the contract (trips by start date ascending,
//! client trips by registration time descending) and is delegated to the
//! store's projection queries.

use std::sync::Arc;

use tracing::instrument;

use tripbook_catalog::{ClientTripView, TripView};
use tripbook_core::ClientId;
use tripbook_store::BookingStore;

use crate::error::BookingError;

/// The booking core's read surface.
pub struct QueryService {
    store: Arc<dyn BookingStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// All trips, ordered by `date_from` ascending, countries nested.
    #[instrument(skip(self), err)]
    pub async fn list_trips(&self) -> Result<Vec<TripView>, BookingError> {
        self.store.list_trips().await.map_err(BookingError::from_store)
    }

    /// The client's booked trips, newest registration first.
    #[instrument(skip(self), fields(client_id = %client_id), err)]
    pub async fn list_client_trips(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientTripView>, BookingError> {
        if !self
            .store
            .client_exists(client_id)
            .await
            .map_err(BookingError::from_store)?
        {
            return Err(BookingError::ClientNotFound);
        }

        self.store
            .list_client_trips(client_id)
            .await
            .map_err(BookingError::from_store)
    }
}
