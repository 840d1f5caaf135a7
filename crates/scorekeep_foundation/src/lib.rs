//! Core values, typed ids, data model, and errors for Scorekeep.
//!
//! This crate provides:
//! - [`Value`] - The tagged value type flowing through formula evaluation
//! - Typed identifiers ([`CategoryId`], [`DefinitionId`], [`PlayerId`], ...)
//! - The scoring data model ([`Category`], [`Definition`], [`Instance`], [`ScoreEntry`], [`ScoringRule`])
//! - [`Tables`] and [`Snapshot`] - Arena-of-tables storage for one session
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod model;
pub mod set;
pub mod snapshot;
pub mod tables;
pub mod types;
pub mod validate;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind};
pub use ids::{
    CategoryId, CategoryKey, DefinitionId, ElementId, EntryId, InstanceId, PlayerId, RoundId,
    RuleId,
};
pub use model::{
    ActiveWindow, Category, Comparison, Definition, DisplayType, ElementSpec, EntrySource,
    Instance, InstanceState, Ownership, Round, RoundBinding, RuleAction, RuleActionKind,
    RuleCondition, RuleScope, ScoreEntry, ScoringRule, SessionSettings, SetShape, ValueKind,
};
pub use set::{ElementQuantity, SetValue};
pub use snapshot::Snapshot;
pub use tables::Tables;
pub use types::Type;
pub use validate::{ValidationError, quantity_from_input, validate_value};
pub use value::Value;

/// Result type alias using Scorekeep's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
