use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::auth::driving_ports::LoginError;

/// The uniform response wrapper every endpoint answers with. `status` mirrors
/// the HTTP status code, `message` is human-readable, and `payload` is only
/// serialized for responses that carry content.
#[derive(Serialize, Debug)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct Envelope<T = ()> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl Envelope<()> {
    /// An envelope with no payload, e.g. for the root route and error bodies
    pub fn message(status: StatusCode, message: impl Into<String>) -> Envelope<()> {
        Envelope {
            status: status.as_u16(),
            message: message.into(),
            payload: None,
        }
    }
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, payload: T) -> Envelope<T> {
        Envelope {
            status: status.as_u16(),
            message: message.into(),
            payload: Some(payload),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

/// Every failure the API can report, as a kind plus optional detail. Whether
/// the detail ends up in the response body is decided here at rendering time,
/// not by whoever raised the error.
#[derive(Debug)]
pub enum ApiError {
    /// A required request body (or body field) was absent. Carries the
    /// route-specific message ("no content provided" / "no credentials provided").
    MissingContent(&'static str),
    /// The request body was present but violated a field constraint
    InvalidContent,
    /// No bearer token on a protected route
    AuthRequired,
    /// A bearer token that failed signature or expiry verification
    InvalidToken,
    /// Credentials that did not match any known principal
    LoginFailed,
    /// Missing resource, or an id that can't name one
    NotFound(&'static str),
    /// Server-side failure. The cause's string representation is appended to
    /// the message, which leaks internal detail on purpose - that is the
    /// documented contract of this API.
    Internal(Option<anyhow::Error>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = match self {
            Self::MissingContent(message) => Envelope::message(StatusCode::BAD_REQUEST, message),
            Self::InvalidContent => {
                Envelope::message(StatusCode::BAD_REQUEST, "invalid content provided")
            }
            Self::AuthRequired => {
                Envelope::message(StatusCode::UNAUTHORIZED, "authentication required")
            }
            Self::InvalidToken => Envelope::message(
                StatusCode::FORBIDDEN,
                "authentication failed (invalid token)",
            ),
            Self::LoginFailed => Envelope::message(
                StatusCode::UNAUTHORIZED,
                "login failed due to invalid username and/or password",
            ),
            Self::NotFound(message) => Envelope::message(StatusCode::NOT_FOUND, message),
            Self::Internal(None) => {
                Envelope::message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            Self::Internal(Some(cause)) => Envelope::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("internal server error: {cause}"),
            ),
        };

        envelope.into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(Some(value))
    }
}

impl From<LoginError> for ApiError {
    fn from(value: LoginError) -> Self {
        match value {
            LoginError::BadCredentials => Self::LoginFailed,
            LoginError::PortError(cause) => Self::Internal(Some(cause)),
        }
    }
}
