pub mod db_todo_driven_ports;

use crate::external_connections;
use anyhow::Context;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres};

/// Bootstrap DDL for the todos table, applied once at startup so a fresh
/// database works without manual setup
const TODOS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos ( \
        id SERIAL PRIMARY KEY, \
        text VARCHAR(255) NOT NULL, \
        done BOOLEAN NOT NULL DEFAULT FALSE \
    )";

/// Owns the database pool used to reach external systems. Constructed exactly
/// once by the composition root and handed to the service layer through
/// [crate::external_connections::ExternalConnectivity], so business logic
/// never touches process-global connection state.
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: PgPool,
}

impl ExternalConnectivity {
    pub fn new(db: PgPool) -> Self {
        ExternalConnectivity { db }
    }
}

/// A handle from ExternalConnectivity which can connect to a database
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Postgres>,
}

impl external_connections::ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self.db.acquire().await?,
        };

        Ok(handle)
    }
}

/// Builds the connection pool backing [ExternalConnectivity]. A failure here
/// is fatal: the caller propagates it out of main rather than starting
/// degraded.
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connecting to the todos database")?;

    Ok(pool)
}

/// Applies the todos DDL
pub async fn ensure_todos_table(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::query(TODOS_SCHEMA)
        .execute(pool)
        .await
        .context("creating the todos table")?;

    Ok(())
}
