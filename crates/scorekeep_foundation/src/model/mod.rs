//! The scoring data model.
//!
//! All records are plain data. Cross references are typed ids resolved
//! through [`crate::Tables`].

mod category;
mod definition;
mod entry;
mod rule;
mod session;

pub use category::{Category, DisplayType};
pub use definition::{
    ActiveWindow, Definition, ElementSpec, Instance, InstanceState, Ownership, RoundBinding,
    SetShape, ValueKind,
};
pub use entry::{EntrySource, ScoreEntry};
pub use rule::{Comparison, RuleAction, RuleActionKind, RuleCondition, RuleScope, ScoringRule};
pub use session::{Round, SessionSettings};
