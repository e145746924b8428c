use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::InvoiceId;
use domain::{Invoice, InvoiceStorage, StorageError, storage::Result};
use tokio::sync::RwLock;

/// In-memory invoice storage.
///
/// Invoices are held by value in a map guarded by a single reader/writer
/// lock. Values go in and come out as copies, so nothing outside the store
/// can mutate what it holds.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
}

impl MemoryStorage {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored invoices.
    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }

    /// Removes every stored invoice.
    pub async fn clear(&self) {
        self.invoices.write().await.clear();
    }
}

#[async_trait]
impl InvoiceStorage for MemoryStorage {
    async fn add_invoice(&self, invoice: Invoice) -> Result<()> {
        let mut invoices = self.invoices.write().await;

        if invoices.contains_key(invoice.id()) {
            metrics::counter!("invoice_storage_conflicts_total", "kind" => "duplicate_id")
                .increment(1);
            tracing::debug!(invoice_id = %invoice.id(), "Rejected duplicate invoice");
            return Err(StorageError::DuplicateId(invoice.id().clone()));
        }

        invoices.insert(invoice.id().clone(), invoice);
        Ok(())
    }

    async fn find_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>> {
        Ok(self.invoices.read().await.get(id).cloned())
    }

    async fn update_invoice(&self, mut invoice: Invoice) -> Result<()> {
        let mut invoices = self.invoices.write().await;

        let Some(stored) = invoices.get(invoice.id()) else {
            metrics::counter!("invoice_storage_conflicts_total", "kind" => "not_found")
                .increment(1);
            tracing::debug!(invoice_id = %invoice.id(), "Rejected update of missing invoice");
            return Err(StorageError::NotFound(invoice.id().clone()));
        };

        invoice.restamp_from(stored);
        invoices.insert(invoice.id().clone(), invoice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use domain::{InvoiceStatus, Item};

    use super::*;

    #[tokio::test]
    async fn add_then_find_returns_equal_copy() {
        let store = MemoryStorage::new();
        let invoice = Invoice::builder()
            .item(Item::new("Pen", 123, 2).unwrap())
            .build();

        store.add_invoice(invoice.clone()).await.unwrap();

        let found = store.find_invoice(invoice.id()).await.unwrap();
        assert_eq!(found, Some(invoice));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        let store = MemoryStorage::new();
        let found = store.find_invoice(&InvoiceId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_and_first_value_kept() {
        let store = MemoryStorage::new();
        let first = Invoice::builder().id("inv-1").customer_name("First").build();
        let second = Invoice::builder().id("inv-1").customer_name("Second").build();

        store.add_invoice(first).await.unwrap();
        let err = store.add_invoice(second).await.unwrap_err();

        assert!(matches!(err, StorageError::DuplicateId(ref id) if id.as_str() == "inv-1"));
        assert_eq!(err.to_string(), "invoice ID \"inv-1\" exists");

        let stored = store.find_invoice(&"inv-1".into()).await.unwrap().unwrap();
        assert_eq!(stored.customer_name(), "First");
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStorage::new();
        let invoice = Invoice::builder().id("ghost").build();

        let err = store.update_invoice(invoice).await.unwrap_err();

        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(err.to_string(), "invoice \"ghost\" not found");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_advances_updated_at() {
        let store = MemoryStorage::new();
        let created = Utc::now() - Duration::hours(1);
        let invoice = Invoice::builder().created_at(created).build();
        store.add_invoice(invoice.clone()).await.unwrap();

        let forged = Invoice::builder()
            .id(invoice.id().clone())
            .status(InvoiceStatus::Issued)
            .issue_date(Some(Utc::now()))
            .created_at(Utc::now() + Duration::days(1))
            .build();
        store.update_invoice(forged).await.unwrap();

        let stored = store.find_invoice(invoice.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), InvoiceStatus::Issued);
        assert_eq!(stored.created_at(), created);
        assert!(stored.updated_at() > invoice.updated_at());
    }

    #[tokio::test]
    async fn returned_copies_are_independent() {
        let store = MemoryStorage::new();
        let invoice = Invoice::builder().build();
        store.add_invoice(invoice.clone()).await.unwrap();

        let mut copy = store.find_invoice(invoice.id()).await.unwrap().unwrap();
        copy.update_customer_name("Changed").unwrap();

        let stored = store.find_invoice(invoice.id()).await.unwrap().unwrap();
        assert_eq!(stored.customer_name(), "John Doe");
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = MemoryStorage::new();
        store.add_invoice(Invoice::builder().build()).await.unwrap();
        store.add_invoice(Invoice::builder().build()).await.unwrap();
        assert_eq!(store.len().await, 2);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
