//! Storage port for invoice persistence.

use std::sync::Arc;

use async_trait::async_trait;
use common::InvoiceId;
use thiserror::Error;

use crate::invoice::Invoice;

/// Boxed error produced by a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when interacting with invoice storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An invoice with this ID is already stored.
    #[error("invoice ID \"{0}\" exists")]
    DuplicateId(InvoiceId),

    /// No invoice with this ID is stored.
    #[error("invoice \"{0}\" not found")]
    NotFound(InvoiceId),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend itself failed (connection, query, infrastructure).
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StorageError {
    /// Wraps any backend error.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StorageError::Backend(err.into())
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence contract the invoice service depends on.
///
/// Implementations hand out independent copies: no caller ever holds a
/// reference into the store, and every read returns a fresh value.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait InvoiceStorage: Send + Sync {
    /// Stores a new invoice.
    ///
    /// Fails with [`StorageError::DuplicateId`] if the ID is already taken.
    async fn add_invoice(&self, invoice: Invoice) -> Result<()>;

    /// Looks up an invoice by ID.
    ///
    /// Returns `Ok(None)` when no such invoice exists; errors are reserved
    /// for backend failures.
    async fn find_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>>;

    /// Replaces a stored invoice.
    ///
    /// Fails with [`StorageError::NotFound`] if the ID is not stored.
    async fn update_invoice(&self, invoice: Invoice) -> Result<()>;
}

#[async_trait]
impl<T: InvoiceStorage + ?Sized> InvoiceStorage for Arc<T> {
    async fn add_invoice(&self, invoice: Invoice) -> Result<()> {
        (**self).add_invoice(invoice).await
    }

    async fn find_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>> {
        (**self).find_invoice(id).await
    }

    async fn update_invoice(&self, invoice: Invoice) -> Result<()> {
        (**self).update_invoice(invoice).await
    }
}
