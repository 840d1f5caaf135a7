//! Tagged value type flowing through formula evaluation.
//!
//! # Coercion table
//!
//! | from \ to | number                                   | boolean                           |
//! |-----------|------------------------------------------|-----------------------------------|
//! | Number    | itself                                   | `!= 0` and not NaN                |
//! | Bool      | `1` / `0`                                | itself                            |
//! | Text      | parsed number, `active`/`owned` → 1, `inactive` → 0, otherwise a type mismatch | non-empty and not `inactive`, `false`, `0` |
//! | Set       | count (identical) or total quantity (elements) | coerced number `!= 0`      |

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::set::SetValue;
use crate::types::Type;

/// A value produced or consumed by formulas and instances.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "value", rename_all = "camelCase")
)]
pub enum Value {
    /// 64-bit floating point number.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// Text (state tags, player ids, free text variables).
    Text(Arc<str>),
    /// Collection value.
    Set(SetValue),
}

impl Value {
    /// Creates a text value.
    #[must_use]
    pub fn text(s: impl AsRef<str>) -> Self {
        Self::Text(Arc::from(s.as_ref()))
    }

    /// Returns the type of this value.
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Self::Number(_) => Type::Number,
            Self::Bool(_) => Type::Bool,
            Self::Text(_) => Type::Text,
            Self::Set(_) => Type::Set,
        }
    }

    /// Attempts to extract a number without coercion.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a set reference.
    #[must_use]
    pub const fn as_set(&self) -> Option<&SetValue> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces this value to a number following the coercion table.
    ///
    /// # Errors
    /// Returns a type mismatch for text that is neither numeric nor a state tag.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_number(&self) -> crate::Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Set(set) => Ok(set.total() as f64),
            Self::Text(text) => {
                let trimmed = text.trim();
                if let Ok(n) = trimmed.parse::<f64>() {
                    return Ok(n);
                }
                match trimmed.to_ascii_lowercase().as_str() {
                    "active" | "owned" => Ok(1.0),
                    "inactive" => Ok(0.0),
                    _ => Err(Error::type_mismatch(Type::Number, Type::Text)),
                }
            }
        }
    }

    /// Returns true if this value counts as true in a condition.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Set(set) => set.total() != 0,
            Self::Text(text) => {
                let trimmed = text.trim();
                !(trimmed.is_empty()
                    || trimmed.eq_ignore_ascii_case("inactive")
                    || trimmed.eq_ignore_ascii_case("false")
                    || trimmed == "0")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<SetValue> for Value {
    fn from(set: SetValue) -> Self {
        Self::Set(set)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Set(SetValue::Count(n)) => write!(f, "#{{{n}}}"),
            Self::Set(SetValue::Elements(items)) => {
                let parts: Vec<_> = items
                    .iter()
                    .map(|e| format!("{} x{}", e.element_id, e.quantity))
                    .collect();
                write!(f, "#{{{}}}", parts.join(", "))
            }
        }
    }
}
