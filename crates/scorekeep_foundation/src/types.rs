//! Type descriptors for values.

use std::fmt;

/// The runtime type of a [`crate::Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// 64-bit float.
    Number,
    /// Boolean.
    Bool,
    /// Text, including state tags.
    Text,
    /// Collection value (identical or distinct elements).
    Set,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Text => "text",
            Self::Set => "set",
        };
        f.write_str(name)
    }
}
