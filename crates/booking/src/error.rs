//! Booking outcome taxonomy.

use thiserror::Error;

use tripbook_core::DomainError;
use tripbook_store::{ConstraintKind, StoreError};

/// Outcome of a booking operation that did not succeed.
///
/// Every precondition failure is a distinct variant the transport layer can
/// map deterministically. Only genuinely unexpected store failures surface as
/// `Store`; capacity and uniqueness violations are never masked behind it.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("client not found")]
    ClientNotFound,

    #[error("trip not found")]
    TripNotFound,

    #[error("registration not found")]
    RegistrationNotFound,

    #[error("client is already registered for this trip")]
    AlreadyRegistered,

    #[error("trip is at maximum capacity")]
    CapacityExceeded,

    #[error("a client with this PESEL already exists")]
    DuplicatePesel,

    /// Input failed domain validation (maps to a caller error).
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The admission critical section could not be entered within the bounded
    /// wait. Transient; the caller may retry with backoff.
    #[error("booking is temporarily unavailable, retry later")]
    Unavailable,

    /// Unexpected storage failure, surfaced as-is.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl BookingError {
    /// Map a store error, translating constraint violations raced in
    /// concurrently to their booking outcome.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(ConstraintKind::DuplicateRegistration) => {
                Self::AlreadyRegistered
            }
            StoreError::Constraint(ConstraintKind::CapacityExceeded) => Self::CapacityExceeded,
            StoreError::Constraint(ConstraintKind::DuplicatePesel) => Self::DuplicatePesel,
            other => Self::Store(other),
        }
    }

    /// Whether a retry (with backoff) may succeed without any state change.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
