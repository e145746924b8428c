//! Client port of a keyed store that supports conditional writes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::storage::BoxError;
use thiserror::Error;
use tokio::sync::Mutex;

use super::condition::Condition;
use super::record::Attributes;

/// Errors returned by a [`ConditionalStore`] client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The write condition did not hold; nothing was written.
    #[error("conditional check failed")]
    ConditionalCheckFailed,

    /// Transport or backend failure.
    #[error("client error: {0}")]
    Backend(#[source] BoxError),
}

impl ClientError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        ClientError::Backend(err.into())
    }
}

/// A put request: the full item stored under `key` in `table`, guarded by an
/// optional condition on the item currently stored there.
#[derive(Debug, Clone, PartialEq)]
pub struct PutItem {
    pub table: String,
    pub key: String,
    pub item: Attributes,
    pub condition: Option<Condition>,
}

/// A keyed item store without uniqueness constraints.
///
/// `put_item` replaces whatever is stored under the key. When a condition is
/// attached, the store checks it against the current item and writes in one
/// atomic step, failing with [`ClientError::ConditionalCheckFailed`] if it
/// does not hold.
#[async_trait]
pub trait ConditionalStore: Send + Sync {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Attributes>, ClientError>;

    async fn put_item(&self, request: PutItem) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: ConditionalStore + ?Sized> ConditionalStore for Arc<T> {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Attributes>, ClientError> {
        (**self).get_item(table, key).await
    }

    async fn put_item(&self, request: PutItem) -> Result<(), ClientError> {
        (**self).put_item(request).await
    }
}

/// Process-local [`ConditionalStore`].
///
/// Condition check and write happen under one lock.
#[derive(Clone, Default)]
pub struct InMemoryTable {
    tables: Arc<Mutex<HashMap<String, HashMap<String, Attributes>>>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of items stored in `table`.
    pub async fn item_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .await
            .get(table)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl ConditionalStore for InMemoryTable {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Attributes>, ClientError> {
        let tables = self.tables.lock().await;
        Ok(tables.get(table).and_then(|items| items.get(key)).cloned())
    }

    async fn put_item(&self, request: PutItem) -> Result<(), ClientError> {
        let mut tables = self.tables.lock().await;
        let items = tables.entry(request.table).or_default();

        if let Some(condition) = &request.condition
            && !condition.evaluate(items.get(&request.key))
        {
            return Err(ClientError::ConditionalCheckFailed);
        }

        items.insert(request.key, request.item);
        Ok(())
    }
}
