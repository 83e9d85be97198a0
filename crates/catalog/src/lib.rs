//! Trip catalog domain module.
//!
//! This crate contains the business rules for trips, clients, and
//! registrations, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). The admission decision that enforces the per-trip
//! capacity limit lives in [`registration::admission`].

pub mod client;
pub mod registration;
pub mod trip;
pub mod view;

pub use client::{Client, NewClient, Pesel};
pub use registration::{admission, Registration};
pub use trip::{Capacity, Country, DateRange, Trip};
pub use view::{ClientTripView, RegistrationDetail, TripView};
