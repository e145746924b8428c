//! Invoice aggregate and related types.

mod aggregate;
mod builder;
mod item;
mod service;
mod status;

pub use aggregate::Invoice;
pub use builder::InvoiceBuilder;
pub use item::{Item, ItemValidationError, ItemViolation};
pub use service::InvoiceService;
pub use status::{InvoiceStatus, ParseStatusError};

use common::ItemId;
use thiserror::Error;

/// Errors raised by the invoice state machine and item validation.
///
/// Transition errors carry the status the invoice was in when the operation
/// was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    #[error("{status} invoice cannot be updated")]
    CannotUpdate { status: InvoiceStatus },

    #[error("item cannot be added to {status} invoice")]
    CannotAddItem { status: InvoiceStatus },

    #[error("item cannot be deleted from {status} invoice")]
    CannotDeleteItem { status: InvoiceStatus },

    #[error("{status} invoice cannot be issued")]
    CannotIssue { status: InvoiceStatus },

    #[error("{status} invoice cannot be paid")]
    CannotPay { status: InvoiceStatus },

    #[error("{status} invoice cannot be canceled")]
    CannotCancel { status: InvoiceStatus },

    /// An item with this ID is already on the invoice.
    #[error("item \"{id}\" is already on the invoice")]
    DuplicateItem { id: ItemId },

    /// One or more item fields violate domain constraints.
    #[error(transparent)]
    InvalidItem(#[from] ItemValidationError),
}

impl InvoiceError {
    /// Returns the status that refused the transition, if this is a
    /// transition error.
    pub fn status(&self) -> Option<InvoiceStatus> {
        match self {
            InvoiceError::CannotUpdate { status }
            | InvoiceError::CannotAddItem { status }
            | InvoiceError::CannotDeleteItem { status }
            | InvoiceError::CannotIssue { status }
            | InvoiceError::CannotPay { status }
            | InvoiceError::CannotCancel { status } => Some(*status),
            InvoiceError::DuplicateItem { .. } | InvoiceError::InvalidItem(_) => None,
        }
    }
}
