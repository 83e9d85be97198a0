//! In-memory booking store.
//!
//! Intended for tests/dev. Enforces the same unique and capacity constraints
//! a relational schema would, so the service's constraint re-mapping can be
//! exercised without a database.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tripbook_catalog::{
    Capacity, Client, ClientTripView, Pesel, Registration, RegistrationDetail, Trip, TripView,
};
use tripbook_core::{ClientId, TripId};

use crate::contract::{BookingStore, ConstraintKind, StoreError};

#[derive(Debug, Default)]
struct Tables {
    trips: HashMap<TripId, Trip>,
    clients: HashMap<ClientId, Client>,
    pesels: HashSet<Pesel>,
    // BTreeMap keyed by the composite identity keeps iteration deterministic.
    registrations: BTreeMap<(ClientId, TripId), Registration>,
}

impl Tables {
    fn count_for_trip(&self, trip_id: TripId) -> u64 {
        self.registrations
            .values()
            .filter(|r| r.trip_id == trip_id)
            .count() as u64
    }
}

/// Hash-map backed [`BookingStore`].
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    tables: RwLock<Tables>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a trip (with its nested countries).
    ///
    /// Trip management is outside the booking core; this stands in for the
    /// external process that owns the trip catalog.
    pub fn seed_trip(&self, trip: Trip) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.trips.insert(trip.id, trip);
    }

    /// Seed a client directly, bypassing onboarding. Test helper.
    pub fn seed_client(&self, client: Client) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.pesels.insert(client.pesel.clone());
        tables.clients.insert(client.id, client);
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("read", "lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("write", "lock poisoned"))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn client_exists(&self, client_id: ClientId) -> Result<bool, StoreError> {
        Ok(self.read()?.clients.contains_key(&client_id))
    }

    async fn trip_capacity(&self, trip_id: TripId) -> Result<Option<Capacity>, StoreError> {
        Ok(self.read()?.trips.get(&trip_id).map(|t| t.capacity))
    }

    async fn registration_exists(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .registrations
            .contains_key(&(client_id, trip_id)))
    }

    async fn count_registrations(&self, trip_id: TripId) -> Result<u64, StoreError> {
        Ok(self.read()?.count_for_trip(trip_id))
    }

    async fn insert_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;

        let capacity = tables
            .trips
            .get(&trip_id)
            .map(|t| t.capacity)
            .ok_or_else(|| {
                StoreError::backend("insert_registration", "trip foreign key violation")
            })?;

        if tables.registrations.contains_key(&(client_id, trip_id)) {
            return Err(StoreError::Constraint(ConstraintKind::DuplicateRegistration));
        }
        if tables.count_for_trip(trip_id) >= u64::from(capacity.get()) {
            return Err(StoreError::Constraint(ConstraintKind::CapacityExceeded));
        }

        tables.registrations.insert(
            (client_id, trip_id),
            Registration::new(client_id, trip_id, registered_at),
        );
        Ok(())
    }

    async fn delete_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<u64, StoreError> {
        let removed = self.write()?.registrations.remove(&(client_id, trip_id));
        Ok(u64::from(removed.is_some()))
    }

    async fn pesel_exists(&self, pesel: &Pesel) -> Result<bool, StoreError> {
        Ok(self.read()?.pesels.contains(pesel))
    }

    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.pesels.contains(&client.pesel) {
            return Err(StoreError::Constraint(ConstraintKind::DuplicatePesel));
        }
        tables.pesels.insert(client.pesel.clone());
        tables.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<TripView>, StoreError> {
        let tables = self.read()?;
        let mut views: Vec<TripView> = tables.trips.values().map(TripView::from).collect();
        views.sort_by_key(|v| (v.date_from, v.id));
        Ok(views)
    }

    async fn list_client_trips(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientTripView>, StoreError> {
        let tables = self.read()?;

        let mut views: Vec<ClientTripView> = tables
            .registrations
            .values()
            .filter(|r| r.client_id == client_id)
            .filter_map(|r| {
                tables.trips.get(&r.trip_id).map(|trip| ClientTripView {
                    trip: TripView::from(trip),
                    registration: RegistrationDetail {
                        registered_at: r.registered_at,
                        payment_date: r.payment_date,
                    },
                })
            })
            .collect();

        views.sort_by(|a, b| {
            b.registration
                .registered_at
                .cmp(&a.registration.registered_at)
        });
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tripbook_catalog::{Country, DateRange, NewClient};
    use tripbook_core::CountryId;

    fn test_trip(capacity: u32, days_from_now: i64) -> Trip {
        let from = Utc::now() + Duration::days(days_from_now);
        Trip::new(
            TripId::new(),
            "Lisbon getaway",
            "A week on the coast",
            DateRange::new(from, from + Duration::days(7)).unwrap(),
            Capacity::new(capacity).unwrap(),
            vec![Country::new(CountryId::new(), "Portugal").unwrap()],
        )
        .unwrap()
    }

    fn test_client(pesel: &str) -> Client {
        Client::onboard(
            ClientId::new(),
            NewClient {
                first_name: "Jan".to_string(),
                last_name: "Kowalski".to_string(),
                email: "jan@example.com".to_string(),
                telephone: "+48123456789".to_string(),
                pesel: pesel.to_string(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_count_registrations() {
        let store = InMemoryBookingStore::new();
        let trip = test_trip(3, 1);
        let trip_id = trip.id;
        store.seed_trip(trip);
        let client = test_client("90010112345");
        let client_id = client.id;
        store.seed_client(client);

        assert_eq!(store.count_registrations(trip_id).await.unwrap(), 0);
        store
            .insert_registration(client_id, trip_id, Utc::now())
            .await
            .unwrap();
        assert_eq!(store.count_registrations(trip_id).await.unwrap(), 1);
        assert!(store
            .registration_exists(client_id, trip_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn duplicate_registration_hits_constraint() {
        let store = InMemoryBookingStore::new();
        let trip = test_trip(3, 1);
        let trip_id = trip.id;
        store.seed_trip(trip);
        let client_id = ClientId::new();

        store
            .insert_registration(client_id, trip_id, Utc::now())
            .await
            .unwrap();
        let err = store
            .insert_registration(client_id, trip_id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Constraint(ConstraintKind::DuplicateRegistration)
        ));
    }

    #[tokio::test]
    async fn capacity_constraint_blocks_overfill() {
        let store = InMemoryBookingStore::new();
        let trip = test_trip(1, 1);
        let trip_id = trip.id;
        store.seed_trip(trip);

        store
            .insert_registration(ClientId::new(), trip_id, Utc::now())
            .await
            .unwrap();
        let err = store
            .insert_registration(ClientId::new(), trip_id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Constraint(ConstraintKind::CapacityExceeded)
        ));
        assert_eq!(store.count_registrations(trip_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_registration_reports_rows_affected() {
        let store = InMemoryBookingStore::new();
        let trip = test_trip(2, 1);
        let trip_id = trip.id;
        store.seed_trip(trip);
        let client_id = ClientId::new();

        assert_eq!(
            store
                .delete_registration(client_id, trip_id)
                .await
                .unwrap(),
            0
        );
        store
            .insert_registration(client_id, trip_id, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            store
                .delete_registration(client_id, trip_id)
                .await
                .unwrap(),
            1
        );
        assert!(!store
            .registration_exists(client_id, trip_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn pesel_uniqueness_is_enforced() {
        let store = InMemoryBookingStore::new();
        let first = test_client("90010112345");
        store.insert_client(&first).await.unwrap();

        let second = test_client("90010112345");
        let err = store.insert_client(&second).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Constraint(ConstraintKind::DuplicatePesel)
        ));
        assert!(store.pesel_exists(&first.pesel).await.unwrap());
    }

    #[tokio::test]
    async fn list_trips_is_ordered_by_start_date() {
        let store = InMemoryBookingStore::new();
        let later = test_trip(5, 30);
        let sooner = test_trip(5, 2);
        let sooner_id = sooner.id;
        store.seed_trip(later);
        store.seed_trip(sooner);

        let trips = store.list_trips().await.unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].id, sooner_id);
        assert_eq!(trips[0].countries.len(), 1);
    }

    #[tokio::test]
    async fn list_client_trips_is_newest_first() {
        let store = InMemoryBookingStore::new();
        let trip_a = test_trip(5, 1);
        let trip_b = test_trip(5, 2);
        let (a, b) = (trip_a.id, trip_b.id);
        store.seed_trip(trip_a);
        store.seed_trip(trip_b);
        let client_id = ClientId::new();

        let earlier = Utc::now() - Duration::hours(1);
        store
            .insert_registration(client_id, a, earlier)
            .await
            .unwrap();
        store
            .insert_registration(client_id, b, Utc::now())
            .await
            .unwrap();

        let views = store.list_client_trips(client_id).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].trip.id, b);
        assert_eq!(views[1].trip.id, a);
        assert!(views[0].registration.payment_date.is_none());
    }
}
