//! Postgres-backed booking store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` on client_trip | `Constraint(DuplicateRegistration)` | concurrent duplicate registration |
//! | `23505` on client.pesel | `Constraint(DuplicatePesel)` | concurrent duplicate client |
//! | anything else | `Backend` | network/storage failure |
//!
//! Capacity is enforced inside `insert_registration` itself: the trip row is
//! locked with `FOR UPDATE` before the count check, so concurrent inserters
//! for the same trip serialize at the database even when the in-process
//! ledger is bypassed (a second service instance, a manual write).
//!
//! ## Thread Safety
//!
//! `PostgresBookingStore` is `Send + Sync`; all operations go through the
//! SQLx connection pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use tripbook_catalog::{
    Capacity, Client, ClientTripView, Country, Pesel, RegistrationDetail, TripView,
};
use tripbook_core::{ClientId, CountryId, TripId};

use crate::contract::{BookingStore, ConstraintKind, StoreError};

/// Postgres-backed [`BookingStore`].
///
/// The per-trip serialization of check-then-insert is owned by the booking
/// ledger; this store enforces the uniqueness and capacity constraints as the
/// backstop:
/// - `PRIMARY KEY (client_id, trip_id)` on `client_trip`
/// - `UNIQUE` on `client.pesel`
/// - `insert_registration` runs in a transaction that row-locks the trip
///   before counting, refusing to insert past the trip's `max_people`
#[derive(Debug, Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the schema if it is not there yet.
    ///
    /// Trip/country rows are populated out of band by the trip-management
    /// process; only clients and registrations are written through this store.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trip (
                id          UUID PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                date_from   TIMESTAMPTZ NOT NULL,
                date_to     TIMESTAMPTZ NOT NULL,
                max_people  INTEGER NOT NULL CHECK (max_people > 0),
                CHECK (date_from <= date_to)
            );

            CREATE TABLE IF NOT EXISTS country (
                id   UUID PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS country_trip (
                country_id UUID NOT NULL REFERENCES country(id),
                trip_id    UUID NOT NULL REFERENCES trip(id),
                PRIMARY KEY (country_id, trip_id)
            );

            CREATE TABLE IF NOT EXISTS client (
                id         UUID PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name  TEXT NOT NULL,
                email      TEXT NOT NULL,
                telephone  TEXT NOT NULL,
                pesel      TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS client_trip (
                client_id     UUID NOT NULL REFERENCES client(id),
                trip_id       UUID NOT NULL REFERENCES trip(id),
                registered_at TIMESTAMPTZ NOT NULL,
                payment_date  TIMESTAMPTZ NULL,
                PRIMARY KEY (client_id, trip_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn countries_for_trips(
        &self,
        trip_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Country>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT ct.trip_id, c.id, c.name
            FROM country c
            JOIN country_trip ct ON c.id = ct.country_id
            WHERE ct.trip_id = ANY($1)
            "#,
        )
        .bind(trip_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("countries_for_trips", e))?;

        let mut by_trip: HashMap<Uuid, Vec<Country>> = HashMap::new();
        for row in rows {
            let trip_id: Uuid = row.get(0);
            let country = Country {
                id: CountryId::from_uuid(row.get(1)),
                name: row.get(2),
            };
            by_trip.entry(trip_id).or_default().push(country);
        }
        Ok(by_trip)
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    #[instrument(skip(self), fields(client_id = %client_id), err)]
    async fn client_exists(&self, client_id: ClientId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM client WHERE id = $1)")
            .bind(client_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("client_exists", e))?;
        Ok(row.get(0))
    }

    #[instrument(skip(self), fields(trip_id = %trip_id), err)]
    async fn trip_capacity(&self, trip_id: TripId) -> Result<Option<Capacity>, StoreError> {
        let row = sqlx::query("SELECT max_people FROM trip WHERE id = $1")
            .bind(trip_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("trip_capacity", e))?;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(decode_capacity("trip_capacity", row.get(0))?)),
        }
    }

    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id), err)]
    async fn registration_exists(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM client_trip WHERE client_id = $1 AND trip_id = $2)",
        )
        .bind(client_id.as_uuid())
        .bind(trip_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("registration_exists", e))?;
        Ok(row.get(0))
    }

    #[instrument(skip(self), fields(trip_id = %trip_id), err)]
    async fn count_registrations(&self, trip_id: TripId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) FROM client_trip WHERE trip_id = $1")
            .bind(trip_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_registrations", e))?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id), err)]
    async fn insert_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_registration", e))?;

        // Row-lock the trip so concurrent inserters for it serialize here.
        // Under READ COMMITTED a plain conditional insert is not enough: two
        // statements can each count the pre-insert occupancy and both pass.
        let trip_row = sqlx::query("SELECT max_people FROM trip WHERE id = $1 FOR UPDATE")
            .bind(trip_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_registration", e))?;

        let Some(trip_row) = trip_row else {
            return Err(StoreError::backend(
                "insert_registration",
                "trip foreign key violation",
            ));
        };
        let capacity = decode_capacity("insert_registration", trip_row.get(0))?;

        let count_row = sqlx::query("SELECT COUNT(*) FROM client_trip WHERE trip_id = $1")
            .bind(trip_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_registration", e))?;
        let occupancy: i64 = count_row.get(0);

        if occupancy.max(0) as u64 >= u64::from(capacity.get()) {
            return Err(StoreError::Constraint(ConstraintKind::CapacityExceeded));
        }

        sqlx::query(
            r#"
            INSERT INTO client_trip (client_id, trip_id, registered_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(client_id.as_uuid())
        .bind(trip_id.as_uuid())
        .bind(registered_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Constraint(ConstraintKind::DuplicateRegistration)
            } else {
                map_sqlx_error("insert_registration", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_registration", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(client_id = %client_id, trip_id = %trip_id), err)]
    async fn delete_registration(
        &self,
        client_id: ClientId,
        trip_id: TripId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM client_trip WHERE client_id = $1 AND trip_id = $2")
            .bind(client_id.as_uuid())
            .bind(trip_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_registration", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, pesel), err)]
    async fn pesel_exists(&self, pesel: &Pesel) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM client WHERE pesel = $1)")
            .bind(pesel.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("pesel_exists", e))?;
        Ok(row.get(0))
    }

    #[instrument(skip(self, client), fields(client_id = %client.id), err)]
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO client (id, first_name, last_name, email, telephone, pesel)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .bind(&client.telephone)
        .bind(client.pesel.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Constraint(ConstraintKind::DuplicatePesel)
            } else {
                map_sqlx_error("insert_client", e)
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_trips(&self) -> Result<Vec<TripView>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, date_from, date_to, max_people
            FROM trip
            ORDER BY date_from ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_trips", e))?;

        let trip_ids: Vec<Uuid> = rows.iter().map(|r| r.get(0)).collect();
        let mut countries = self.countries_for_trips(&trip_ids).await?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get(0);
            views.push(TripView {
                id: TripId::from_uuid(id),
                name: row.get(1),
                description: row.get(2),
                date_from: row.get(3),
                date_to: row.get(4),
                max_people: decode_capacity("list_trips", row.get(5))?,
                countries: countries.remove(&id).unwrap_or_default(),
            });
        }
        Ok(views)
    }

    #[instrument(skip(self), fields(client_id = %client_id), err)]
    async fn list_client_trips(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ClientTripView>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.description, t.date_from, t.date_to, t.max_people,
                   ct.registered_at, ct.payment_date
            FROM trip t
            JOIN client_trip ct ON t.id = ct.trip_id
            WHERE ct.client_id = $1
            ORDER BY ct.registered_at DESC
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_client_trips", e))?;

        let trip_ids: Vec<Uuid> = rows.iter().map(|r| r.get(0)).collect();
        let mut countries = self.countries_for_trips(&trip_ids).await?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get(0);
            views.push(ClientTripView {
                trip: TripView {
                    id: TripId::from_uuid(id),
                    name: row.get(1),
                    description: row.get(2),
                    date_from: row.get(3),
                    date_to: row.get(4),
                    max_people: decode_capacity("list_client_trips", row.get(5))?,
                    countries: countries.remove(&id).unwrap_or_default(),
                },
                registration: RegistrationDetail {
                    registered_at: row.get(6),
                    payment_date: row.get(7),
                },
            });
        }
        Ok(views)
    }
}

fn decode_capacity(operation: &'static str, max_people: i32) -> Result<Capacity, StoreError> {
    Capacity::new(max_people.max(0) as u32)
        .map_err(|e| StoreError::backend(operation, format!("corrupt capacity row: {e}")))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::backend(
            operation,
            format!("database error in {}: {}", operation, db_err.message()),
        ),
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

// Run with a live database: DATABASE_URL=... cargo test -p tripbook-store -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    async fn connect() -> Option<PostgresBookingStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(
            PostgresBookingStore::connect(&url)
                .await
                .expect("connect test database"),
        )
    }

    async fn seed_trip(store: &PostgresBookingStore, capacity: i32) -> TripId {
        let id = TripId::new();
        let from = Utc::now() + Duration::days(30);
        sqlx::query(
            r#"
            INSERT INTO trip (id, name, description, date_from, date_to, max_people)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind("Concurrency check trip")
        .bind("")
        .bind(from)
        .bind(from + Duration::days(7))
        .bind(capacity)
        .execute(&store.pool)
        .await
        .unwrap();
        id
    }

    async fn seed_client(store: &PostgresBookingStore) -> ClientId {
        let id = ClientId::new();
        // Unique 11-digit pesel derived from the fresh uuid.
        let pesel = format!("{:011}", id.as_uuid().as_u128() % 100_000_000_000);
        sqlx::query(
            r#"
            INSERT INTO client (id, first_name, last_name, email, telephone, pesel)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind("Test")
        .bind("Client")
        .bind("test@example.com")
        .bind("+48000000000")
        .bind(pesel)
        .execute(&store.pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore]
    async fn concurrent_inserts_cannot_overfill_trip() {
        let Some(store) = connect().await else { return };
        let trip_id = seed_trip(&store, 1).await;
        let first = seed_client(&store).await;
        let second = seed_client(&store).await;

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = Vec::new();
        for client_id in [first, second] {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                store
                    .insert_registration(client_id, trip_id, Utc::now())
                    .await
            }));
        }

        let mut admitted = 0;
        let mut rejected_full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(StoreError::Constraint(ConstraintKind::CapacityExceeded)) => {
                    rejected_full += 1
                }
                Err(other) => panic!("unexpected outcome: {other:?}"),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(rejected_full, 1);
        assert_eq!(store.count_registrations(trip_id).await.unwrap(), 1);
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_registration_hits_primary_key() {
        let Some(store) = connect().await else { return };
        let trip_id = seed_trip(&store, 5).await;
        let client_id = seed_client(&store).await;

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
}
