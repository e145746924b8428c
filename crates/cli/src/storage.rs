//! Storage selection.

use std::sync::Arc;

use domain::InvoiceStorage;
use invoice_store::{InMemoryTable, MemoryStorage, PostgresTable, RemoteStorage};

use crate::config::Config;
use crate::error::CliError;

/// Builds the storage adapter named by `config.storage`.
///
/// - `memory`: process-local map
/// - `local`: conditional-write adapter over an in-process table
/// - `postgres`: conditional-write adapter over PostgreSQL; migrations are
///   applied before the adapter is returned
pub async fn storage_factory(config: &Config) -> Result<Arc<dyn InvoiceStorage>, CliError> {
    let storage: Arc<dyn InvoiceStorage> = match config.storage.as_str() {
        "memory" => Arc::new(MemoryStorage::new()),
        "local" => Arc::new(RemoteStorage::new(
            InMemoryTable::new(),
            config.remote_config(),
        )),
        "postgres" => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(CliError::MissingDatabaseUrl)?;
            let table = PostgresTable::connect(url, config.max_connections).await?;
            table.run_migrations().await?;
            Arc::new(RemoteStorage::new(table, config.remote_config()))
        }
        other => return Err(CliError::UnknownStorage(other.to_string())),
    };

    tracing::info!(storage = %config.storage, table = %config.table, "storage ready");
    Ok(storage)
}
