//! Write conditions evaluated atomically with a put.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::record::Attributes;

/// A predicate over the currently stored item, checked by the store in the
/// same atomic step as the write it guards.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The named attribute exists and equals `value`.
    AttributeEquals { name: String, value: Value },
    /// The named attribute is absent or differs from `value`.
    AttributeNotEquals { name: String, value: Value },
}

/// A condition rendered as an expression with placeholder maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionExpression {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, Value>,
}

impl Condition {
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn attribute_not_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::AttributeNotEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn attribute_name(&self) -> &str {
        match self {
            Condition::AttributeEquals { name, .. } | Condition::AttributeNotEquals { name, .. } => {
                name
            }
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Condition::AttributeEquals { value, .. }
            | Condition::AttributeNotEquals { value, .. } => value,
        }
    }

    /// Evaluates the condition against the stored item, if any.
    ///
    /// An absent item has no attributes, so `AttributeEquals` fails and
    /// `AttributeNotEquals` holds.
    pub fn evaluate(&self, existing: Option<&Attributes>) -> bool {
        let current = existing.and_then(|item| item.get(self.attribute_name()));
        match self {
            Condition::AttributeEquals { value, .. } => current == Some(value),
            Condition::AttributeNotEquals { value, .. } => current != Some(value),
        }
    }

    /// Renders the condition as `#0 = :0` / `#0 <> :0` with its name and
    /// value placeholders.
    pub fn expression(&self) -> ConditionExpression {
        let operator = match self {
            Condition::AttributeEquals { .. } => "=",
            Condition::AttributeNotEquals { .. } => "<>",
        };
        ConditionExpression {
            expression: format!("#0 {operator} :0"),
            names: BTreeMap::from([("#0".to_string(), self.attribute_name().to_string())]),
            values: BTreeMap::from([(":0".to_string(), self.value().clone())]),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AttributeEquals { name, value } => write!(f, "{name} = {value}"),
            Condition::AttributeNotEquals { name, value } => write!(f, "{name} <> {value}"),
        }
    }
}
