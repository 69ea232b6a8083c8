//! The outcome envelope as HTTP responses.
//!
//! Every route answers with the same body shape: `{"success":true,"data":..}`
//! or `{"success":false,"error":{"kind":..,"message":..}}`, with the status
//! code derived from the failure kind.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use bazaar_actions::{ActionError, ErrorKind, Outcome};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorKind::RepositoryFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn failure(err: ActionError) -> axum::response::Response {
    let status = status_for(err.kind);
    (status, Json(Outcome::<serde_json::Value>::Failure(err))).into_response()
}

pub fn success<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (status, Json(Outcome::Success(data))).into_response()
}

/// Map an action result straight onto the wire.
pub fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, ActionError>,
) -> axum::response::Response {
    match result {
        Ok(data) => success(status, data),
        Err(err) => failure(err),
    }
}
