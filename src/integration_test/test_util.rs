use crate::{SharedData, app_env, persistence, security};
use axum::Router;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::future::Future;
use std::sync::Arc;
use std::env;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// Secret used to sign session tokens during integration tests
pub const TEST_JWT_SECRET: &[u8] = b"integration-test-secret";

/// Creates a randomly named throwaway database for one test run
async fn provision_test_db(base_url: &str) -> String {
    let mut conn = PgConnection::connect(base_url)
        .await
        .expect("could not create initial connection to provision a test database");

    let schema_id: u32 = thread_rng().gen_range(10_000..99_999);
    let db_name = format!("todos_test_{schema_id}");
    sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
        .execute(&mut conn)
        .await
        .expect("failed to create the test database");
    conn.close().await.ok();

    db_name
}

/// Provisions a fresh database, applies the todos schema, then hands a pool
/// for it to the test body.
///
/// Expects the TEST_DB_URL environment variable to hold a base PostgreSQL
/// connection string without a database name in the path.
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let pg_connection_base_url = env::var(app_env::test::TEST_DB_URL)
            .expect("You must provide the TEST_DB_URL environment variable as the base postgres connection string");
        let db_name = provision_test_db(&pg_connection_base_url).await;

        let sqlx_pool =
            persistence::connect_sqlx(format!("{pg_connection_base_url}/{db_name}").as_str())
                .await
                .expect("could not connect to the provisioned test database");
        persistence::ensure_todos_table(&sqlx_pool)
            .await
            .expect("could not create the todos table");

        test_fn(sqlx_pool.clone()).await;
    });
}

/// Builds the production router over the given pool, signing tokens with
/// [TEST_JWT_SECRET]
pub fn test_router(db_pool: PgPool) -> Router {
    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
        token_authority: Some(security::HmacTokenAuthority::new(TEST_JWT_SECRET)),
        base_url: "http://localhost:3000".to_owned(),
    });

    crate::app_router(shared_data)
}
