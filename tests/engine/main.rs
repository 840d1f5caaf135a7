//! Integration tests for Layer 2: Engine
//!
//! End-to-end scoring scenarios: category totals, objects, rules, and
//! repeated passes.

mod objects;
mod passes;
mod totals;

use chrono::{DateTime, Utc};
use scorekeep_foundation::ScoreEntry;

/// A fixed clock value `seconds` after the epoch.
pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap()
}

/// A manual entry at the epoch.
pub fn entry(id: &str, player: &str, value: f64) -> ScoreEntry {
    ScoreEntry::new(id, player, value, at(0))
}
