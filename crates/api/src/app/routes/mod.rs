use axum::{routing::get, Router};

pub mod clients;
pub mod registrations;
pub mod system;
pub mod trips;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(trips::router())
        .merge(clients::router())
        .merge(registrations::router())
}
