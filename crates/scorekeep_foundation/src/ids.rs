//! Typed identifiers for every entity kind.
//!
//! Records reference each other by id, never by pointer. Each id kind is its
//! own type so a category id cannot be passed where a definition id is
//! expected. Ids are cheap to clone (`Arc<str>`).

use std::fmt;
use std::sync::Arc;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Arc<str>);

        impl $name {
            /// Creates an id from any string-like value.
            #[must_use]
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(Arc::from(value.as_ref()))
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a scoring category.
    CategoryId
);
string_id!(
    /// Identifies a player in a session.
    PlayerId
);
string_id!(
    /// Identifies a variable/object definition.
    DefinitionId
);
string_id!(
    /// Identifies a materialized instance of a definition.
    InstanceId
);
string_id!(
    /// Identifies a score entry in the ledger.
    EntryId
);
string_id!(
    /// Identifies a round.
    RoundId
);
string_id!(
    /// Identifies a scoring rule.
    RuleId
);
string_id!(
    /// Identifies an element declared on a distinct-element set definition.
    ElementId
);

/// Bucket key for category totals.
///
/// Entries without a category land in the [`CategoryKey::Uncategorized`]
/// sentinel bucket, which still counts toward the grand total.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    /// A real category.
    Category(CategoryId),
    /// The sentinel bucket for uncategorized entries.
    Uncategorized,
}

impl CategoryKey {
    /// Returns the category id, or None for the sentinel bucket.
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryId> {
        match self {
            Self::Category(id) => Some(id),
            Self::Uncategorized => None,
        }
    }

    /// Returns true if this is the sentinel bucket.
    #[must_use]
    pub const fn is_uncategorized(&self) -> bool {
        matches!(self, Self::Uncategorized)
    }
}

impl From<Option<CategoryId>> for CategoryKey {
    fn from(id: Option<CategoryId>) -> Self {
        id.map_or(Self::Uncategorized, Self::Category)
    }
}

impl From<CategoryId> for CategoryKey {
    fn from(id: CategoryId) -> Self {
        Self::Category(id)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "{id}"),
            Self::Uncategorized => f.write_str("<uncategorized>"),
        }
    }
}
