//! Registration relation and the admission decision.
//!
//! A `Registration` records that a client is booked onto a trip. It is a
//! first-class relation entity: created by a successful booking, deleted by an
//! explicit cancellation, never otherwise mutated (payment marking is outside
//! this core).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripbook_core::{ClientId, TripId};

/// The client-trip relation. Composite identity `(client_id, trip_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub client_id: ClientId,
    pub trip_id: TripId,
    pub registered_at: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn new(client_id: ClientId, trip_id: TripId, registered_at: DateTime<Utc>) -> Self {
        Self {
            client_id,
            trip_id,
            registered_at,
            payment_date: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_date.is_some()
    }
}

/// Admission control: the pure decision of whether a registration attempt may
/// be admitted given the current state of a trip.
///
/// The caller is responsible for evaluating this inside an atomic unit (see
/// the booking crate's ledger) so that the observed `registered` count cannot
/// move between decision and commit.
pub mod admission {
    use crate::trip::Capacity;

    /// Outcome of an admission check.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum Admission {
        /// Room available and the client is not yet registered.
        Admit,
        /// The client already holds a registration for this trip.
        AlreadyRegistered,
        /// The trip is at capacity.
        Full,
    }

    /// Decide whether a registration attempt is admissible.
    ///
    /// Duplicate registration is reported before capacity, so an existing
    /// registrant on a full trip sees `AlreadyRegistered`, not `Full`.
    pub fn decide(capacity: Capacity, registered: u64, already_registered: bool) -> Admission {
        if already_registered {
            return Admission::AlreadyRegistered;
        }
        if registered >= u64::from(capacity.get()) {
            return Admission::Full;
        }
        Admission::Admit
    }
}
