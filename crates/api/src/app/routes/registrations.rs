use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
    Json, Router,
};

use tripbook_core::{ClientId, TripId};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/clients/:id/trips/:trip_id", put(register).delete(cancel))
}

/// `PUT /clients/{id}/trips/{trip_id}`: register the client onto the trip.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, trip_id)): Path<(String, String)>,
) -> axum::response::Response {
    let Some((client_id, trip_id)) = parse_ids(&id, &trip_id) else {
        return invalid_id();
    };

    match services.registration.register(client_id, trip_id).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(serde_json::json!({ "registered_at": receipt.registered_at })),
        )
            .into_response(),
        Err(err) => errors::booking_error_to_response(err),
    }
}

/// `DELETE /clients/{id}/trips/{trip_id}`: cancel the registration.
pub async fn cancel(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, trip_id)): Path<(String, String)>,
) -> axum::response::Response {
    let Some((client_id, trip_id)) = parse_ids(&id, &trip_id) else {
        return invalid_id();
    };

    match services.registration.cancel(client_id, trip_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => errors::booking_error_to_response(err),
    }
}

fn parse_ids(id: &str, trip_id: &str) -> Option<(ClientId, TripId)> {
    Some((id.parse().ok()?, trip_id.parse().ok()?))
}

fn invalid_id() -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "malformed id in path")
}
