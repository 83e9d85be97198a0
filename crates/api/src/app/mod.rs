//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: store selection and booking-service wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use tripbook_store::BookingStore;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Picks the store backend from the environment: `DATABASE_URL` set means
/// Postgres, otherwise the in-memory store.
pub async fn build_app() -> Router {
    let store = services::store_from_env().await;
    app_with_store(store)
}

/// Build the router on top of a given store (used by tests and embedding).
pub fn app_with_store(store: Arc<dyn BookingStore>) -> Router {
    let services = Arc::new(services::build_services(
        store,
        services::ledger_wait_from_env(),
    ));

    routes::router()
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
