//! Startup error types.

use thiserror::Error;

/// Errors that stop the front end before or while it runs.
#[derive(Debug, Error)]
pub enum CliError {
    /// `INVOICE_STORAGE` names no known adapter.
    #[error("unknown storage \"{0}\"")]
    UnknownStorage(String),

    /// PostgreSQL storage was selected without a connection string.
    #[error("DATABASE_URL must be set for postgres storage")]
    MissingDatabaseUrl,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
