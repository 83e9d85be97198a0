//! Storage layer: the booking store contract and its backends.
//!
//! - `contract`: the [`BookingStore`] trait and storage error model
//! - `in_memory`: hash-map backed store for tests and development
//! - `postgres`: sqlx-backed store for production

pub mod contract;
pub mod in_memory;
pub mod postgres;

pub use contract::{BookingStore, ConstraintKind, StoreError};
pub use in_memory::InMemoryBookingStore;
pub use postgres::PostgresBookingStore;
