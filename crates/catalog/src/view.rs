//! Read projections returned by the query surface.
//!
//! The client-trip view is composition (a trip projection plus a registration
//! detail), not subtyping: the caller's query selects which parts it wants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripbook_core::TripId;

use crate::trip::{Capacity, Country, Trip};

/// Trip projection with nested countries, as exposed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripView {
    pub id: TripId,
    pub name: String,
    pub description: String,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub max_people: Capacity,
    pub countries: Vec<Country>,
}

impl From<&Trip> for TripView {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id,
            name: trip.name.clone(),
            description: trip.description.clone(),
            date_from: trip.dates.from(),
            date_to: trip.dates.to(),
            max_people: trip.capacity,
            countries: trip.countries.clone(),
        }
    }
}

/// The registration-specific part of a client-trip projection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetail {
    pub registered_at: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// One of a client's booked trips: the trip projection plus its registration
/// detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTripView {
    pub trip: TripView,
    pub registration: RegistrationDetail,
}
