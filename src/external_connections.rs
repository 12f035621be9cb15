use sqlx::PgConnection;

/// A borrowed database connection produced by an [ExternalConnectivity]
/// implementation. Driven adapters go through this to run queries without
/// knowing whether the connection came from a pool, a test harness, or
/// anywhere else.
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Owns the clients used to talk to external systems so business logic can
/// stay agnostic of the concrete adapters behind it. The single implementation
/// used at runtime lives in [crate::persistence] and is constructed once by
/// the composition root.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

#[cfg(test)]
pub mod test_util {
    use super::*;

    /// Stand-in connectivity for logic tests. Any attempt to actually reach a
    /// database through it panics, which keeps pure-logic tests honest about
    /// never touching a store.
    pub struct FakeExternalConnectivity {}

    impl FakeExternalConnectivity {
        pub fn new() -> FakeExternalConnectivity {
            FakeExternalConnectivity {}
        }
    }

    pub struct NoDatabaseHandle {}

    impl ConnectionHandle for NoDatabaseHandle {
        fn borrow_connection(&mut self) -> &mut PgConnection {
            panic!("tests using FakeExternalConnectivity cannot access a real database")
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type DbHandle<'cxn_borrow> = NoDatabaseHandle;

        async fn database_cxn(&mut self) -> Result<NoDatabaseHandle, anyhow::Error> {
            panic!("tests using FakeExternalConnectivity cannot access a real database")
        }
    }
}
