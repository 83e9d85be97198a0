//! Trip entity and its value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tripbook_core::{CountryId, DomainError, DomainResult, Entity, TripId, ValueObject};

/// A destination country referenced by trips (many-to-many, order-irrelevant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
}

impl Country {
    pub fn new(id: CountryId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("country name cannot be empty"));
        }
        Ok(Self { id, name })
    }
}

impl Entity for Country {
    type Id = CountryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Closed date interval of a trip. Invariant: `from <= to`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::invariant("date range start is after its end"));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

impl ValueObject for DateRange {}

/// Maximum participant count of a trip. Invariant: positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capacity(u32);

impl Capacity {
    pub fn new(max_people: u32) -> DomainResult<Self> {
        if max_people == 0 {
            return Err(DomainError::validation("capacity must be positive"));
        }
        Ok(Self(max_people))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl ValueObject for Capacity {}

impl core::fmt::Display for Capacity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A bookable travel offering.
///
/// Trips are created and updated by an external trip-management process; the
/// registration core treats them as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub description: String,
    pub dates: DateRange,
    pub capacity: Capacity,
    pub countries: Vec<Country>,
}

impl Trip {
    pub fn new(
        id: TripId,
        name: impl Into<String>,
        description: impl Into<String>,
        dates: DateRange,
        capacity: Capacity,
        countries: Vec<Country>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("trip name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            dates,
            capacity,
            countries,
        })
    }
}

impl Entity for Trip {
    type Id = TripId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_dates() -> DateRange {
        let from = Utc::now();
        DateRange::new(from, from + Duration::days(7)).unwrap()
    }

    #[test]
    fn date_range_rejects_inverted_interval() {
        let from = Utc::now();
        let err = DateRange::new(from, from - Duration::days(1)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn date_range_allows_single_day() {
        let day = Utc::now();
        assert!(DateRange::new(day, day).is_ok());
    }

    #[test]
    fn capacity_must_be_positive() {
        assert!(matches!(
            Capacity::new(0).unwrap_err(),
            DomainError::Validation(_)
        ));
        assert_eq!(Capacity::new(15).unwrap().get(), 15);
    }

    #[test]
    fn trip_rejects_blank_name() {
        let err = Trip::new(
            TripId::new(),
            "   ",
            "desc",
            test_dates(),
            Capacity::new(10).unwrap(),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn country_requires_name() {
        assert!(Country::new(CountryId::new(), "").is_err());
        assert!(Country::new(CountryId::new(), "Portugal").is_ok());
    }
}
