//! Invoice aggregate implementation.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use common::{InvoiceId, ItemId};
use serde::{Deserialize, Serialize};

use super::{InvoiceBuilder, InvoiceError, InvoiceStatus, Item};

/// Invoice aggregate root.
///
/// Represents a bill to a customer with its lifecycle from drafting to
/// payment or cancellation. Every mutation goes through a guarded method
/// that consults [`InvoiceStatus`] first and leaves the invoice untouched
/// when the transition is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    customer_name: String,

    /// Set once the invoice is issued, never cleared afterwards.
    issue_date: Option<DateTime<Utc>>,

    status: InvoiceStatus,
    items: Vec<Item>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new open invoice with no items.
    pub fn new(id: InvoiceId, customer_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_name: customer_name.into(),
            issue_date: None,
            status: InvoiceStatus::Open,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a builder for reconstituting an invoice from stored fields.
    pub fn builder() -> InvoiceBuilder {
        InvoiceBuilder::new()
    }

    pub(super) fn from_parts(
        id: InvoiceId,
        customer_name: String,
        issue_date: Option<DateTime<Utc>>,
        status: InvoiceStatus,
        items: Vec<Item>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_name,
            issue_date,
            status,
            items,
            created_at,
            updated_at,
        }
    }
}

// Query methods
impl Invoice {
    pub fn id(&self) -> &InvoiceId {
        &self.id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn issue_date(&self) -> Option<DateTime<Utc>> {
        self.issue_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns an item by ID.
    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the invoice total in cents, or `None` if it does not fit in
    /// an `i64`.
    pub fn total(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |sum, item| sum.checked_add(item.total()?))
    }

    /// Returns true if the invoice is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Guarded mutations
impl Invoice {
    /// Changes the customer name of an open invoice.
    pub fn update_customer_name(&mut self, name: impl Into<String>) -> Result<(), InvoiceError> {
        if !self.status.can_update() {
            return Err(InvoiceError::CannotUpdate {
                status: self.status,
            });
        }

        self.customer_name = name.into();
        Ok(())
    }

    /// Appends an item to an open invoice.
    ///
    /// Item IDs are unique within an invoice; an item whose ID is already
    /// present is refused.
    pub fn add_item(&mut self, item: Item) -> Result<(), InvoiceError> {
        if !self.status.can_update() {
            return Err(InvoiceError::CannotAddItem {
                status: self.status,
            });
        }
        if self.item(&item.id).is_some() {
            return Err(InvoiceError::DuplicateItem { id: item.id });
        }

        self.items.push(item);
        Ok(())
    }

    /// Validates the item fields and appends a new item to an open invoice.
    ///
    /// The status guard runs before validation, so a closed invoice reports
    /// the refused transition rather than field errors.
    pub fn add_new_item(
        &mut self,
        product_name: impl Into<String>,
        price: i64,
        qty: i64,
    ) -> Result<Item, InvoiceError> {
        if !self.status.can_update() {
            return Err(InvoiceError::CannotAddItem {
                status: self.status,
            });
        }

        let item = Item::new(product_name, price, qty)?;
        self.items.push(item.clone());
        Ok(item)
    }

    /// Removes the first item with the given ID from an open invoice.
    ///
    /// Deleting an absent item succeeds without changing anything; the
    /// returned flag tells whether an item was actually removed.
    pub fn delete_item(&mut self, item_id: &ItemId) -> Result<bool, InvoiceError> {
        if !self.status.can_update() {
            return Err(InvoiceError::CannotDeleteItem {
                status: self.status,
            });
        }

        match self.items.iter().position(|item| &item.id == item_id) {
            Some(idx) => {
                self.items.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Issues an open invoice, stamping the issue date.
    pub fn issue(&mut self) -> Result<(), InvoiceError> {
        if !self.status.can_issue() {
            return Err(InvoiceError::CannotIssue {
                status: self.status,
            });
        }

        self.status = InvoiceStatus::Issued;
        self.issue_date = Some(Utc::now());
        Ok(())
    }

    /// Marks an issued invoice as paid.
    pub fn pay(&mut self) -> Result<(), InvoiceError> {
        if !self.status.can_pay() {
            return Err(InvoiceError::CannotPay {
                status: self.status,
            });
        }

        self.status = InvoiceStatus::Paid;
        Ok(())
    }

    /// Cancels an open or issued invoice. The issue date, if any, is kept.
    pub fn cancel(&mut self) -> Result<(), InvoiceError> {
        if !self.status.can_cancel() {
            return Err(InvoiceError::CannotCancel {
                status: self.status,
            });
        }

        self.status = InvoiceStatus::Canceled;
        Ok(())
    }
}

// Timestamp bookkeeping
impl Invoice {
    /// Advances `updated_at` to now.
    ///
    /// If the clock has not moved past the current value, `updated_at` is
    /// bumped by one microsecond so it strictly increases on every call.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// Takes the timestamps of record from a previously stored copy of this
    /// invoice: `created_at` is restored and `updated_at` advances past the
    /// stored value.
    pub fn restamp_from(&mut self, stored: &Invoice) {
        self.created_at = stored.created_at;
        self.updated_at = stored.updated_at;
        self.touch();
    }
}

impl PartialEq for Invoice {
    /// Items are compared as a multiset, so item order is not significant.
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id
            || self.customer_name != other.customer_name
            || self.issue_date != other.issue_date
            || self.status != other.status
            || self.created_at != other.created_at
            || self.updated_at != other.updated_at
            || self.items.len() != other.items.len()
        {
            return false;
        }

        let mut ours: Vec<&Item> = self.items.iter().collect();
        let mut theirs: Vec<&Item> = other.items.iter().collect();
        ours.sort_by(|a, b| item_order(a, b));
        theirs.sort_by(|a, b| item_order(a, b));
        ours == theirs
    }
}

/// Total order over every item field.
fn item_order(a: &Item, b: &Item) -> Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.product_name.cmp(&b.product_name))
        .then_with(|| a.price.cmp(&b.price))
        .then_with(|| a.qty.cmp(&b.qty))
}

impl Eq for Invoice {}
