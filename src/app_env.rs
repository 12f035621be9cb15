/// URL for accessing the PostgreSQL database holding the todos table
pub const DB_URL: &str = "DATABASE_URL";
/// Secret used to sign and verify session tokens. Protected routes answer 500
/// while this is unset, as that's a deployment misconfiguration rather than a
/// client error.
pub const JWT_SECRET: &str = "JWT_SECRET";
/// Port the API listens on. Defaults to 3000.
pub const PORT: &str = "PORT";
/// Base address used when deriving the `url` field of returned todos.
/// Defaults to `http://localhost:{PORT}`.
pub const BASE_URL: &str = "BASE_URL";
/// Log level configuration for the application. For formatting info, see
/// [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
