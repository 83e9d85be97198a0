//! Booking core: admission control and registration orchestration.
//!
//! - `ledger`: the per-trip admission-control critical section
//! - `service`: register/cancel/onboarding orchestration
//! - `query`: read projections (trip listing, client-trip listing)
//! - `error`: the booking outcome taxonomy

pub mod error;
pub mod ledger;
pub mod query;
pub mod service;

pub use error::BookingError;
pub use ledger::{LeaseTimeout, TripLease, TripLedger};
pub use query::QueryService;
pub use service::{Registered, RegistrationService};
