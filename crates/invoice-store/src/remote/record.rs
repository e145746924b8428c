//! Flat attribute records for invoices.

use chrono::{DateTime, Utc};
use common::{InvoiceId, ItemId};
use domain::{Invoice, InvoiceStatus, Item};
use serde::{Deserialize, Serialize};

/// A stored item: attribute name to attribute value.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Prefix of every invoice partition key.
pub const INVOICE_KEY_PREFIX: &str = "INVOICE";

/// Separator between key prefix and invoice ID.
pub const KEY_DELIMITER: &str = "#";

/// Name of the partition key attribute.
pub const PARTITION_KEY_ATTRIBUTE: &str = "pk";

/// Name of the invoice ID attribute, used in write conditions.
pub const ID_ATTRIBUTE: &str = "id";

/// Builds the partition key of an invoice: `INVOICE#<id>`.
pub fn invoice_partition_key(id: &InvoiceId) -> String {
    format!("{INVOICE_KEY_PREFIX}{KEY_DELIMITER}{id}")
}

/// The stored form of an [`Invoice`].
///
/// Timestamps are RFC 3339 strings with sub-second precision and the status
/// is its lowercase name, so a record read back decodes to an invoice equal
/// to the one written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub pk: String,
    pub id: InvoiceId,
    pub customer_name: String,
    #[serde(default)]
    pub issue_date: Option<DateTime<Utc>>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stored form of an [`Item`], nested inside its invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub product_name: String,
    pub price: i64,
    pub qty: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceRecord {
    fn from(invoice: &Invoice) -> Self {
        Self {
            pk: invoice_partition_key(invoice.id()),
            id: invoice.id().clone(),
            customer_name: invoice.customer_name().to_string(),
            issue_date: invoice.issue_date(),
            status: invoice.status(),
            items: invoice.items().iter().map(ItemRecord::from).collect(),
            created_at: invoice.created_at(),
            updated_at: invoice.updated_at(),
        }
    }
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            product_name: item.product_name.clone(),
            price: item.price,
            qty: item.qty,
            created_at: item.created_at,
        }
    }
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Item {
            id: record.id,
            product_name: record.product_name,
            price: record.price,
            qty: record.qty,
            created_at: record.created_at,
        }
    }
}

impl InvoiceRecord {
    /// Converts the record back into an invoice.
    pub fn into_invoice(self) -> Invoice {
        Invoice::builder()
            .id(self.id)
            .customer_name(self.customer_name)
            .issue_date(self.issue_date)
            .status(self.status)
            .items(self.items.into_iter().map(Item::from).collect())
            .created_at(self.created_at)
            .updated_at(self.updated_at)
            .build()
    }

    /// Encodes the record as a flat attribute map.
    pub fn to_attributes(&self) -> Result<Attributes, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }

    /// Decodes a record from an attribute map.
    pub fn from_attributes(attributes: Attributes) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(attributes))
    }
}
