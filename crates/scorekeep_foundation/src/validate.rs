//! Write-boundary validation of instance values.
//!
//! Values are checked against their definition before they are stored.
//! Rejected values never reach the engine.

use thiserror::Error;

use crate::ids::ElementId;
use crate::model::{Definition, SetShape, ValueKind};
use crate::set::SetValue;
use crate::types::Type;
use crate::value::Value;

/// Why a value was rejected for a definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The value's type does not match the definition.
    #[error("expected {expected}, got {actual}")]
    WrongKind {
        /// Type the definition holds.
        expected: Type,
        /// Type that was written.
        actual: Type,
    },

    /// NaN or infinite number.
    #[error("number must be finite")]
    NotFinite,

    /// Below the definition's minimum.
    #[error("{value} is below the minimum {min}")]
    BelowMin {
        /// Written value.
        value: f64,
        /// Minimum allowed.
        min: f64,
    },

    /// Above the definition's maximum.
    #[error("{value} is above the maximum {max}")]
    AboveMax {
        /// Written value.
        value: f64,
        /// Maximum allowed.
        max: f64,
    },

    /// Set value of the other shape (count vs. elements).
    #[error("set value does not match the declared set shape")]
    WrongSetShape,

    /// Element not declared on the definition.
    #[error("unknown set element: {0}")]
    UnknownElement(ElementId),

    /// Element listed more than once.
    #[error("set element listed twice: {0}")]
    DuplicateElement(ElementId),

    /// Quantity below zero in user input.
    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(i64),
}

/// Checks that `value` may be stored on an instance of `definition`.
///
/// # Errors
/// Returns the first rule the value breaks.
pub fn validate_value(definition: &Definition, value: &Value) -> Result<(), ValidationError> {
    match (&definition.kind, value) {
        (ValueKind::Number, Value::Number(n)) => validate_number(definition, *n),
        (ValueKind::Boolean, Value::Bool(_)) | (ValueKind::Text, Value::Text(_)) => Ok(()),
        (ValueKind::Set { shape }, Value::Set(set)) => validate_set(shape, set),
        (kind, other) => Err(ValidationError::WrongKind {
            expected: kind_type(kind),
            actual: other.value_type(),
        }),
    }
}

/// Converts a user-entered signed quantity into a stored one.
///
/// # Errors
/// Returns [`ValidationError::NegativeQuantity`] below zero.
pub fn quantity_from_input(quantity: i64) -> Result<u64, ValidationError> {
    u64::try_from(quantity).map_err(|_| ValidationError::NegativeQuantity(quantity))
}

fn validate_number(definition: &Definition, n: f64) -> Result<(), ValidationError> {
    if !n.is_finite() {
        return Err(ValidationError::NotFinite);
    }
    if let Some(min) = definition.min {
        if n < min {
            return Err(ValidationError::BelowMin { value: n, min });
        }
    }
    if let Some(max) = definition.max {
        if n > max {
            return Err(ValidationError::AboveMax { value: n, max });
        }
    }
    Ok(())
}

fn validate_set(shape: &SetShape, set: &SetValue) -> Result<(), ValidationError> {
    match (shape, set) {
        (SetShape::Identical, SetValue::Count(_)) => Ok(()),
        (SetShape::Elements { elements }, SetValue::Elements(items)) => {
            let mut seen: Vec<&ElementId> = Vec::with_capacity(items.len());
            for item in items {
                if !elements.iter().any(|spec| spec.id == item.element_id) {
                    return Err(ValidationError::UnknownElement(item.element_id.clone()));
                }
                if seen.contains(&&item.element_id) {
                    return Err(ValidationError::DuplicateElement(item.element_id.clone()));
                }
                seen.push(&item.element_id);
            }
            Ok(())
        }
        _ => Err(ValidationError::WrongSetShape),
    }
}

const fn kind_type(kind: &ValueKind) -> Type {
    match kind {
        ValueKind::Number => Type::Number,
        ValueKind::Boolean => Type::Bool,
        ValueKind::Text => Type::Text,
        ValueKind::Set { .. } => Type::Set,
    }
}
