use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tripbook_booking::BookingError;

/// Deterministic mapping from booking outcomes to HTTP responses.
pub fn booking_error_to_response(err: BookingError) -> axum::response::Response {
    match err {
        BookingError::ClientNotFound => {
            json_error(StatusCode::NOT_FOUND, "client_not_found", "client not found")
        }
        BookingError::TripNotFound => {
            json_error(StatusCode::NOT_FOUND, "trip_not_found", "trip not found")
        }
        BookingError::RegistrationNotFound => json_error(
            StatusCode::NOT_FOUND,
            "registration_not_found",
            "registration not found",
        ),
        BookingError::AlreadyRegistered => json_error(
            StatusCode::CONFLICT,
            "already_registered",
            "client is already registered for this trip",
        ),
        BookingError::CapacityExceeded => json_error(
            StatusCode::CONFLICT,
            "capacity_exceeded",
            "trip is at maximum capacity",
        ),
        BookingError::DuplicatePesel => json_error(
            StatusCode::CONFLICT,
            "duplicate_pesel",
            "a client with this PESEL already exists",
        ),
        BookingError::Invalid(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        BookingError::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "booking is temporarily unavailable, retry later",
        ),
        BookingError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
