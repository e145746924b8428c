//! Domain layer for the invoicing system.
//!
//! This crate provides:
//! - the Invoice aggregate with its status state machine and line items
//! - the storage port that persistence adapters implement
//! - the invoice service, the only entry point front ends talk to

pub mod error;
pub mod invoice;
pub mod storage;

pub use common::{InvoiceId, ItemId};
pub use error::DomainError;
pub use invoice::{
    Invoice, InvoiceBuilder, InvoiceError, InvoiceService, InvoiceStatus, Item,
    ItemValidationError, ItemViolation, ParseStatusError,
};
pub use storage::{InvoiceStorage, StorageError};
