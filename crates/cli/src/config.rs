//! Application configuration loaded from environment variables.

use invoice_store::RemoteConfig;

/// Front-end configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `INVOICE_STORAGE`: `memory`, `local` or `postgres` (default: `"memory"`)
/// - `INVOICE_TABLE`: table used by remote storage (default: `"invoices"`)
/// - `DATABASE_URL`: PostgreSQL connection string, required for `postgres`
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: String,
    pub table: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage: std::env::var("INVOICE_STORAGE").unwrap_or(defaults.storage),
            table: std::env::var("INVOICE_TABLE").unwrap_or(defaults.table),
            database_url: std::env::var("DATABASE_URL").ok(),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_connections),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Returns the remote adapter configuration.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig::new(self.table.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            table: "invoices".to_string(),
            database_url: None,
            max_connections: 5,
            log_level: "info".to_string(),
        }
    }
}
