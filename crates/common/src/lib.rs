//! Identifier types shared by every layer of the invoicing system.

mod types;

pub use types::{InvoiceId, ItemId};
