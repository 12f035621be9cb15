use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::routing::get;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

mod api;
mod app_env;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;
mod security;

#[cfg(test)]
mod integration_test;

/// State shared by every route: the store handle, the token authority (absent
/// when no signing secret is configured, making protected routes answer 500),
/// and the base address used to derive todo URLs.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub token_authority: Option<security::HmacTokenAuthority>,
    pub base_url: String,
}

pub type AppState = State<Arc<SharedData>>;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::setup_logging(logging::init_env_filter());

    let port = match env::var(app_env::PORT) {
        Ok(raw_port) => raw_port
            .parse::<u16>()
            .with_context(|| format!("{} must be a port number", app_env::PORT))?,
        Err(_) => DEFAULT_PORT,
    };
    let base_url =
        env::var(app_env::BASE_URL).unwrap_or_else(|_| format!("http://localhost:{port}"));

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("{} must be provided in the environment", app_env::DB_URL))?;
    // An unreachable store at startup is fatal: the ? exits the process
    let db_pool = persistence::connect_sqlx(&db_url).await?;
    persistence::ensure_todos_table(&db_pool).await?;

    let token_authority = env::var(app_env::JWT_SECRET)
        .ok()
        .map(|secret| security::HmacTokenAuthority::new(secret.as_bytes()));
    if token_authority.is_none() {
        warn!(
            "{} is not set - protected routes will answer 500 until it is",
            app_env::JWT_SECRET
        );
    }

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
        token_authority,
        base_url,
    });
    let app = app_router(shared_data);

    info!("api running on port {port}");
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    axum::serve(listener, app).await.context("server crashed")?;

    Ok(())
}

/// Assembles the application router: the public root and login routes, the
/// token-guarded todo routes, Swagger UI, and the catch-all 404. Integration
/// tests go through this too, so they exercise exactly what production serves.
pub fn app_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .merge(api::swagger_main::build_documentation())
        .route("/", get(api::health))
        .merge(api::auth::auth_routes())
        .nest(
            "/todos",
            api::todo::todo_routes().route_layer(middleware::from_fn_with_state(
                shared_data.clone(),
                api::auth::require_auth,
            )),
        )
        .fallback(api::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
