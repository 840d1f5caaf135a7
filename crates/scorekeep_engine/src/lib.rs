//! Category totals, object evaluation, and scoring rules for Scorekeep.
//!
//! This crate provides:
//! - [`EvaluationContext`] - Reference resolution over one session's tables
//! - [`compute_category_totals`] - Bucket, roll up, formulas, weights
//! - [`derive_state`] and [`evaluate_objects`] - Ownership, windows, computed values, score impacts
//! - [`evaluate_rules`] - Conditional rules minting corrective entries
//! - [`Engine`] - One evaluation pass over a [`Snapshot`](scorekeep_foundation::Snapshot)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod mint;
pub mod objects;
pub mod pass;
pub mod resolver;
pub mod rule;
pub mod totals;

pub use config::{EngineConfig, GrandTotalPolicy};
pub use mint::Minter;
pub use objects::{
    ObjectOutcome, Owner, derive_state, evaluate_formula, evaluate_objects, materialize_instances,
    resolve_owner, set_instance_value, window_active,
};
pub use pass::{Engine, PassOutcome};
pub use resolver::{EvaluationContext, Target};
pub use rule::evaluate_rules;
pub use totals::{CategoryTotals, PlayerTotals, compute_category_totals, grand_total, player_totals};
