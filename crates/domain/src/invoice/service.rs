//! Invoice service orchestrating lookup, state transitions and persistence.

use common::{InvoiceId, ItemId};

use crate::error::DomainError;
use crate::storage::InvoiceStorage;

use super::{Invoice, InvoiceError, Item};

/// Outcome of a guarded mutation.
enum Applied<T> {
    /// The invoice changed and must be persisted.
    Changed(T),
    /// The operation was legal but left the invoice as it was.
    Unchanged(T),
}

/// Service for managing invoices.
///
/// The single entry point for front ends. Every mutating operation follows
/// the same sequence: find the invoice, let the invoice's state machine
/// accept or refuse the change, and persist only legal changes. The service
/// holds no state of its own besides the storage handle.
pub struct InvoiceService<S: InvoiceStorage> {
    storage: S,
}

impl<S: InvoiceStorage> InvoiceService<S> {
    /// Creates a new invoice service backed by the given storage.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Creates and stores a new open invoice for a customer.
    #[tracing::instrument(skip(self))]
    pub async fn create_invoice(&self, customer_name: &str) -> Result<Invoice, DomainError> {
        let invoice = Invoice::new(InvoiceId::new(), customer_name);

        self.storage
            .add_invoice(invoice.clone())
            .await
            .map_err(DomainError::CreateFailed)?;

        metrics::counter!("invoices_created_total").increment(1);
        tracing::info!(invoice_id = %invoice.id(), "invoice created");
        Ok(invoice)
    }

    /// Loads an invoice by ID.
    ///
    /// Returns None if the invoice doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn view_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        self.find(id).await
    }

    /// Changes the customer name of an open invoice.
    #[tracing::instrument(skip(self))]
    pub async fn update_invoice_customer(
        &self,
        id: &InvoiceId,
        name: &str,
    ) -> Result<(), DomainError> {
        self.execute(id, "update_customer", |invoice| {
            invoice.update_customer_name(name)?;
            Ok(Applied::Changed(()))
        })
        .await
    }

    /// Validates and adds a new item to an open invoice.
    #[tracing::instrument(skip(self))]
    pub async fn add_invoice_item(
        &self,
        id: &InvoiceId,
        product_name: &str,
        price: i64,
        qty: i64,
    ) -> Result<Item, DomainError> {
        self.execute(id, "add_item", |invoice| {
            let item = invoice.add_new_item(product_name, price, qty)?;
            Ok(Applied::Changed(item))
        })
        .await
    }

    /// Deletes an item from an open invoice.
    ///
    /// Deleting an item that is not on the invoice succeeds and does not
    /// touch storage, so repeating a delete is idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn delete_invoice_item(
        &self,
        id: &InvoiceId,
        item_id: &ItemId,
    ) -> Result<(), DomainError> {
        self.execute(id, "delete_item", |invoice| {
            if invoice.delete_item(item_id)? {
                Ok(Applied::Changed(()))
            } else {
                Ok(Applied::Unchanged(()))
            }
        })
        .await
    }

    /// Issues an open invoice.
    #[tracing::instrument(skip(self))]
    pub async fn issue_invoice(&self, id: &InvoiceId) -> Result<(), DomainError> {
        self.execute(id, "issue", |invoice| {
            invoice.issue()?;
            Ok(Applied::Changed(()))
        })
        .await
    }

    /// Marks an issued invoice as paid.
    #[tracing::instrument(skip(self))]
    pub async fn pay_invoice(&self, id: &InvoiceId) -> Result<(), DomainError> {
        self.execute(id, "pay", |invoice| {
            invoice.pay()?;
            Ok(Applied::Changed(()))
        })
        .await
    }

    /// Cancels an open or issued invoice.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_invoice(&self, id: &InvoiceId) -> Result<(), DomainError> {
        self.execute(id, "cancel", |invoice| {
            invoice.cancel()?;
            Ok(Applied::Changed(()))
        })
        .await
    }

    async fn find(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        self.storage
            .find_invoice(id)
            .await
            .map_err(|source| DomainError::FindFailed {
                id: id.clone(),
                source,
            })
    }

    /// Runs a guarded mutation against a stored invoice and persists the
    /// result if it changed anything.
    async fn execute<T, F>(
        &self,
        id: &InvoiceId,
        operation: &'static str,
        command: F,
    ) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Invoice) -> Result<Applied<T>, InvoiceError>,
    {
        let mut invoice = self
            .find(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(id.clone()))?;

        let value = match command(&mut invoice)? {
            Applied::Unchanged(value) => {
                tracing::debug!(invoice_id = %id, operation, "nothing to persist");
                return Ok(value);
            }
            Applied::Changed(value) => value,
        };

        invoice.touch();
        let status = invoice.status();
        self.storage
            .update_invoice(invoice)
            .await
            .map_err(|source| DomainError::UpdateFailed {
                id: id.clone(),
                source,
            })?;

        metrics::counter!("invoice_transitions_total", "transition" => operation).increment(1);
        tracing::info!(invoice_id = %id, operation, %status, "invoice updated");
        Ok(value)
    }
}
