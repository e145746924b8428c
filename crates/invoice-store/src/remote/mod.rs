//! Invoice storage over a keyed store with conditional writes.
//!
//! The backing store has no uniqueness constraints of its own. Creation is
//! guarded by "no stored item has this ID" and update by "the stored item has
//! this ID", both checked atomically with the write.

mod client;
mod condition;
mod postgres;
mod record;

use async_trait::async_trait;
use common::InvoiceId;
use domain::{Invoice, InvoiceStorage, StorageError, storage::Result};

pub use client::{ClientError, ConditionalStore, InMemoryTable, PutItem};
pub use condition::{Condition, ConditionExpression};
pub use postgres::PostgresTable;
pub use record::{
    Attributes, ID_ATTRIBUTE, INVOICE_KEY_PREFIX, InvoiceRecord, ItemRecord, KEY_DELIMITER,
    PARTITION_KEY_ATTRIBUTE, invoice_partition_key,
};

/// Default name of the invoice table.
pub const DEFAULT_TABLE: &str = "invoices";

/// Configuration for [`RemoteStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Table holding invoice records.
    pub table: String,
}

impl RemoteConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

/// Invoice storage backed by a [`ConditionalStore`] client.
///
/// Timestamps are persisted as supplied by the caller; the adapter never
/// reads before it writes.
#[derive(Clone)]
pub struct RemoteStorage<C: ConditionalStore> {
    client: C,
    config: RemoteConfig,
}

impl<C: ConditionalStore> RemoteStorage<C> {
    pub fn new(client: C, config: RemoteConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    async fn put_invoice(
        &self,
        invoice: &Invoice,
        condition: Condition,
    ) -> std::result::Result<(), PutFailure> {
        let record = InvoiceRecord::from(invoice);
        let request = PutItem {
            table: self.config.table.clone(),
            key: record.pk.clone(),
            item: record.to_attributes().map_err(PutFailure::Encode)?,
            condition: Some(condition),
        };

        self.client
            .put_item(request)
            .await
            .map_err(PutFailure::Client)
    }
}

enum PutFailure {
    Encode(serde_json::Error),
    Client(ClientError),
}

impl PutFailure {
    /// Maps the failure to a storage error, using `on_condition` for a
    /// failed write condition.
    fn into_storage_error(self, id: &InvoiceId, on_condition: StorageError) -> StorageError {
        match self {
            PutFailure::Encode(err) => StorageError::Serialization(err),
            PutFailure::Client(ClientError::ConditionalCheckFailed) => {
                let kind = match on_condition {
                    StorageError::DuplicateId(_) => "duplicate_id",
                    _ => "not_found",
                };
                metrics::counter!("invoice_storage_conflicts_total", "kind" => kind).increment(1);
                tracing::debug!(invoice_id = %id, kind, "Conditional write rejected");
                on_condition
            }
            PutFailure::Client(ClientError::Backend(err)) => {
                tracing::warn!(invoice_id = %id, error = %err, "Storage backend failed");
                StorageError::Backend(err)
            }
        }
    }
}

#[async_trait]
impl<C: ConditionalStore> InvoiceStorage for RemoteStorage<C> {
    async fn add_invoice(&self, invoice: Invoice) -> Result<()> {
        let id = invoice.id();
        let condition = Condition::attribute_not_equals(ID_ATTRIBUTE, id.as_str());

        self.put_invoice(&invoice, condition)
            .await
            .map_err(|failure| failure.into_storage_error(id, StorageError::DuplicateId(id.clone())))
    }

    async fn find_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>> {
        let key = invoice_partition_key(id);
        let attributes = match self.client.get_item(&self.config.table, &key).await {
            Ok(attributes) => attributes,
            Err(ClientError::Backend(err)) => {
                tracing::warn!(invoice_id = %id, error = %err, "Storage backend failed");
                return Err(StorageError::Backend(err));
            }
            Err(err @ ClientError::ConditionalCheckFailed) => {
                return Err(StorageError::backend(err));
            }
        };

        match attributes {
            Some(attributes) => Ok(Some(InvoiceRecord::from_attributes(attributes)?.into_invoice())),
            None => Ok(None),
        }
    }

    async fn update_invoice(&self, invoice: Invoice) -> Result<()> {
        let id = invoice.id();
        let condition = Condition::attribute_equals(ID_ATTRIBUTE, id.as_str());

        self.put_invoice(&invoice, condition)
            .await
            .map_err(|failure| failure.into_storage_error(id, StorageError::NotFound(id.clone())))
    }
}
