use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tripbook_core::ClientId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/clients", post(create_client))
        .route("/clients/:id/trips", get(list_client_trips))
}

/// `POST /clients`: onboard a client, 201 with the new id.
pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateClientRequest>,
) -> axum::response::Response {
    match services.registration.create_client(body.into()).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string() })),
        )
            .into_response(),
        Err(err) => errors::booking_error_to_response(err),
    }
}

/// `GET /clients/{id}/trips`: the client's booked trips, newest first.
pub async fn list_client_trips(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(client_id) = id.parse::<ClientId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "malformed client id");
    };

    match services.queries.list_client_trips(client_id).await {
        Ok(views) => Json(views).into_response(),
        Err(err) => errors::booking_error_to_response(err),
    }
}
