//! Store selection and booking-service wiring.

use std::sync::Arc;
use std::time::Duration;

use tripbook_booking::{ledger::DEFAULT_LEASE_WAIT, QueryService, RegistrationService, TripLedger};
use tripbook_store::{BookingStore, InMemoryBookingStore, PostgresBookingStore};

/// The services handed to route handlers.
pub struct AppServices {
    pub registration: RegistrationService,
    pub queries: QueryService,
}

/// Wire the booking services on top of a store.
pub fn build_services(store: Arc<dyn BookingStore>, ledger_wait: Duration) -> AppServices {
    let ledger = Arc::new(TripLedger::new(ledger_wait));
    AppServices {
        registration: RegistrationService::new(Arc::clone(&store), ledger),
        queries: QueryService::new(store),
    }
}

/// Bounded wait for the per-trip admission lease, from `LEDGER_WAIT_MS`.
pub fn ledger_wait_from_env() -> Duration {
    std::env::var("LEDGER_WAIT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_LEASE_WAIT)
}

/// Pick the store backend from the environment.
///
/// `DATABASE_URL` set selects Postgres (and bootstraps the schema); otherwise
/// the in-memory store is used, which is fine for dev but loses state on
/// restart.
pub async fn store_from_env() -> Arc<dyn BookingStore> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresBookingStore::connect(&url)
                .await
                .expect("failed to connect postgres booking store");
            tracing::info!("using postgres booking store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory booking store");
            Arc::new(InMemoryBookingStore::new())
        }
    }
}
