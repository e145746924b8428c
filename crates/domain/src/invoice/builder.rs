//! Builder for assembling invoices field by field.

use chrono::{DateTime, Utc};
use common::InvoiceId;

use super::{Invoice, InvoiceStatus, Item};

/// Builder for constructing invoices in any state.
///
/// Used by storage adapters to reconstitute stored invoices and by tests to
/// set up fixtures. Unset fields fall back to the values of a freshly
/// created invoice: a random ID, customer `"John Doe"`, no issue date,
/// `Open` status, no items, and `created_at == updated_at == now`.
#[derive(Debug, Default)]
pub struct InvoiceBuilder {
    id: Option<InvoiceId>,
    customer_name: Option<String>,
    issue_date: Option<DateTime<Utc>>,
    status: Option<InvoiceStatus>,
    items: Vec<Item>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl InvoiceBuilder {
    /// Creates a builder with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the invoice ID. If not set, a new ID will be generated.
    pub fn id(mut self, id: impl Into<InvoiceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn issue_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.issue_date = date;
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the item list.
    pub fn items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Appends a single item.
    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the last update time. If not set, it equals `created_at`.
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the invoice.
    pub fn build(self) -> Invoice {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Invoice::from_parts(
            self.id.unwrap_or_default(),
            self.customer_name.unwrap_or_else(|| "John Doe".to_string()),
            self.issue_date,
            self.status.unwrap_or_default(),
            self.items,
            created_at,
            self.updated_at.unwrap_or(created_at),
        )
    }
}
