use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials payload for the login endpoint. Fields are optional at the
/// serde level so their absence maps to a 400 rather than a parse failure.
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct LoginRequest {
    #[schema(example = "test@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Payload carrying a freshly issued session token
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TokenPayload {
    pub token: String,
}
