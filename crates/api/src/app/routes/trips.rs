use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/trips", get(list_trips))
}

/// `GET /trips`: every trip, start date ascending, countries nested.
pub async fn list_trips(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.queries.list_trips().await {
        Ok(trips) => Json(trips).into_response(),
        Err(err) => errors::booking_error_to_response(err),
    }
}
