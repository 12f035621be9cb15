use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use tracing::{error, info, warn};
use utoipa::OpenApi;

use crate::domain::auth::Credentials;
use crate::domain::auth::driven_ports::{CredentialVerifier, TokenAuthority};
use crate::domain::auth::driving_ports::{LoginError, LoginPort};
use crate::routing_utils::{ApiError, Envelope};
use crate::{AppState, SharedData, domain, dto, security};

#[derive(OpenApi)]
#[openapi(paths(login))]
/// OpenAPI documentation for the authentication endpoints
pub struct AuthApi;
/// Constant used to group authentication endpoints in OpenAPI documentation
pub const AUTH_API_GROUP: &str = "Authentication";

/// Builds a router for the login route
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/login",
        post(
            |State(app_state): AppState, body: Option<axum::Json<dto::auth::LoginRequest>>| async move {
                let auth_service = domain::auth::AuthService {};
                let cred_check = security::FixedCredentialChecker::development();

                login(
                    body.map(|axum::Json(credentials)| credentials),
                    app_state.token_authority.as_ref(),
                    &auth_service,
                    &cred_check,
                )
                .await
            },
        ),
    )
}

#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::LoginRequest,
    responses(
        (status = 200, description = "Login succeeded, payload carries the session token", body = dto::auth::TokenPayload),
        (status = 400, description = "No credentials in the request"),
        (status = 401, description = "Credentials not recognized"),
        (status = 500, description = "Signing secret unconfigured, or the identity check failed"),
    ),
)]
/// Verifies submitted credentials and issues a signed session token
async fn login(
    credentials: Option<dto::auth::LoginRequest>,
    token_authority: Option<&impl TokenAuthority>,
    auth_service: &impl LoginPort,
    cred_check: &impl CredentialVerifier,
) -> Result<Envelope<dto::auth::TokenPayload>, ApiError> {
    let Some(tokens) = token_authority else {
        error!("no token signing secret provided in env variables");
        return Err(ApiError::Internal(None));
    };
    let Some(body) = credentials else {
        return Err(ApiError::MissingContent("no credentials provided"));
    };
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::MissingContent("no credentials provided"));
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::MissingContent("no credentials provided"));
    }

    let submitted = Credentials { email, password };
    info!("Login attempt for {submitted}");

    let login_result = auth_service.login(&submitted, cred_check, tokens).await;
    if let Err(ref login_err) = login_result {
        match login_err {
            LoginError::BadCredentials => info!("Login rejected for {submitted}"),
            LoginError::PortError(cause) => error!("Login failure: {cause}"),
        }
    }
    let issued = login_result?;

    Ok(Envelope::new(
        StatusCode::OK,
        "login success",
        dto::auth::TokenPayload {
            token: issued.token,
        },
    ))
}

/// Middleware guarding the todo routes. Requests proceed only with a verified
/// bearer token, whose decoded principal is attached to the request for
/// downstream handlers.
pub async fn require_auth(State(app_state): AppState, mut request: Request, next: Next) -> Response {
    let Some(ref token_authority) = app_state.token_authority else {
        error!("no token signing secret provided in env variables");
        return ApiError::Internal(None).into_response();
    };

    let bearer_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|header_text| header_text.strip_prefix("Bearer "));
    let Some(bearer_token) = bearer_token else {
        return ApiError::AuthRequired.into_response();
    };

    match token_authority.verify(bearer_token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(verify_err) => {
            warn!("rejected a bearer token: {verify_err}");
            ApiError::InvalidToken.into_response()
        }
    }
}
