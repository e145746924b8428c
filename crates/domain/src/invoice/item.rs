//! Invoice line items.

use chrono::{DateTime, Utc};
use common::ItemId;
use serde::{Deserialize, Serialize};

/// A line entry on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub product_name: String,
    /// Unit price in cents.
    pub price: i64,
    pub qty: i64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Validates the fields and creates a new item with a fresh ID.
    ///
    /// Every violated constraint is reported, not just the first one.
    pub fn new(
        product_name: impl Into<String>,
        price: i64,
        qty: i64,
    ) -> Result<Self, ItemValidationError> {
        let product_name = product_name.into();
        validate(&product_name, price, qty)?;

        Ok(Self {
            id: ItemId::new(),
            product_name,
            price,
            qty,
            created_at: Utc::now(),
        })
    }

    /// Returns price multiplied by quantity, in cents, or `None` if the
    /// product does not fit in an `i64`.
    pub fn total(&self) -> Option<i64> {
        self.price.checked_mul(self.qty)
    }
}

fn validate(product_name: &str, price: i64, qty: i64) -> Result<(), ItemValidationError> {
    let mut violations = Vec::new();

    if product_name.trim().is_empty() {
        violations.push(ItemViolation::BlankProductName);
    }
    if price < 1 {
        violations.push(ItemViolation::PriceTooLow { price });
    }
    if qty < 1 {
        violations.push(ItemViolation::QtyTooLow { qty });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ItemValidationError { violations })
    }
}

/// A single failed constraint on an item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemViolation {
    BlankProductName,
    PriceTooLow { price: i64 },
    QtyTooLow { qty: i64 },
}

impl std::fmt::Display for ItemViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemViolation::BlankProductName => write!(f, "product name cannot be blank"),
            ItemViolation::PriceTooLow { .. } => write!(f, "price must be at least 1"),
            ItemViolation::QtyTooLow { .. } => write!(f, "qty must be at least 1"),
        }
    }
}

/// All constraint violations found while constructing an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemValidationError {
    pub violations: Vec<ItemViolation>,
}

impl std::fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid item: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item() {
        let item = Item::new("Pen", 123, 2).unwrap();
        assert_eq!(item.product_name, "Pen");
        assert_eq!(item.price, 123);
        assert_eq!(item.qty, 2);
        assert_eq!(item.total(), Some(246));
    }

    #[test]
    fn test_total_overflow_is_none() {
        let item = Item::new("Pen", i64::MAX, 2).unwrap();
        assert_eq!(item.total(), None);

        let item = Item::new("Pen", i64::MAX, 1).unwrap();
        assert_eq!(item.total(), Some(i64::MAX));
    }

    #[test]
    fn test_new_items_get_distinct_ids() {
        let a = Item::new("Pen", 1, 1).unwrap();
        let b = Item::new("Pen", 1, 1).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = Item::new("   ", 10, 1).unwrap_err();
        assert_eq!(err.violations, vec![ItemViolation::BlankProductName]);
        assert_eq!(err.to_string(), "invalid item: product name cannot be blank");
    }

    #[test]
    fn test_negative_qty_is_rejected() {
        let err = Item::new("Pen", 10, -3).unwrap_err();
        assert_eq!(err.violations, vec![ItemViolation::QtyTooLow { qty: -3 }]);
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let err = Item::new("", 0, 0).unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert_eq!(
            err.to_string(),
            "invalid item: product name cannot be blank, price must be at least 1, qty must be at least 1"
        );
    }
}
