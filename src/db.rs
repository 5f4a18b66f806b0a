//! Database connection pool and migration management.

use sqlx::{Pool, Postgres};

/// PostgreSQL connection pool shared by all handlers.
pub type DbPool = Pool<Postgres>;

/// Create the connection pool.
///
/// # Configuration
///
/// - Maximum connections: 5
/// - Connections are reused across requests
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the server
/// cannot be reached.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply pending migrations from `migrations/`.
///
/// Applied migrations are tracked in `_sqlx_migrations`, so each runs once.
/// The schema covers profiles, role assignments, invitations, widget
/// configurations, demo settings and the chat transcript.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
