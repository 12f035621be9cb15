use axum::http::StatusCode;

use crate::routing_utils::Envelope;

pub mod auth;
pub mod swagger_main;
pub mod todo;

#[cfg(test)]
pub mod test_util;

/// Liveness route at the root of the API
pub async fn health() -> Envelope<()> {
    Envelope::message(StatusCode::OK, "OK")
}

/// Catch-all for requests no route matched
pub async fn not_found() -> Envelope<()> {
    Envelope::message(StatusCode::NOT_FOUND, "not found")
}
