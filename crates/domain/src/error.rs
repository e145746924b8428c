//! Domain error types.

use common::InvoiceId;
use thiserror::Error;

use crate::invoice::InvoiceError;
use crate::storage::StorageError;

/// Errors returned by the invoice service.
///
/// State machine and validation errors pass through unchanged; storage
/// failures are wrapped with the operation that hit them, so a caller can
/// tell a failed lookup from a failed write.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The invoice does not exist.
    #[error("invoice \"{0}\" not found")]
    NotFound(InvoiceId),

    /// The invoice refused the operation in its current state, or the
    /// operation's input was invalid.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Storing a newly created invoice failed.
    #[error("create invoice failed: {0}")]
    CreateFailed(#[source] StorageError),

    /// Looking up an invoice failed.
    #[error("find invoice \"{id}\" failed: {source}")]
    FindFailed {
        id: InvoiceId,
        #[source]
        source: StorageError,
    },

    /// Persisting a mutated invoice failed.
    #[error("update invoice \"{id}\" failed: {source}")]
    UpdateFailed {
        id: InvoiceId,
        #[source]
        source: StorageError,
    },
}

impl DomainError {
    /// Returns true if the invoice does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    /// Returns the state machine or validation error, if that is what this is.
    pub fn invoice_error(&self) -> Option<&InvoiceError> {
        match self {
            DomainError::Invoice(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the underlying storage error, if this is a storage failure.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            DomainError::CreateFailed(source)
            | DomainError::FindFailed { source, .. }
            | DomainError::UpdateFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
