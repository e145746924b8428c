//! Invoice state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle stage of an invoice.
///
/// State transitions:
/// ```text
/// Open ──────► Issued ──────► Paid
///   │            │
///   └────────────┴──────────► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice is being drafted, customer and items can be changed.
    #[default]
    Open,

    /// Invoice has been sent to the customer, awaiting payment.
    Issued,

    /// Invoice has been paid (terminal state).
    Paid,

    /// Invoice was canceled (terminal state).
    Canceled,
}

impl InvoiceStatus {
    /// Returns true if the customer and items can be modified in this state.
    pub fn can_update(&self) -> bool {
        matches!(self, InvoiceStatus::Open)
    }

    /// Returns true if the invoice can be issued in this state.
    pub fn can_issue(&self) -> bool {
        matches!(self, InvoiceStatus::Open)
    }

    /// Returns true if the invoice can be paid in this state.
    pub fn can_pay(&self) -> bool {
        matches!(self, InvoiceStatus::Issued)
    }

    /// Returns true if the invoice can be canceled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, InvoiceStatus::Open | InvoiceStatus::Issued)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Canceled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invoice status {0:?}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for InvoiceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(InvoiceStatus::Open),
            "issued" => Ok(InvoiceStatus::Issued),
            "paid" => Ok(InvoiceStatus::Paid),
            "canceled" => Ok(InvoiceStatus::Canceled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
