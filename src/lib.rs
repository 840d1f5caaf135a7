//! Scorekeep - Scoring calculation engine
//!
//! This crate re-exports all layers of the Scorekeep system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: scorekeep_runtime    - Template documents, snapshots, formula REPL
//! Layer 2: scorekeep_engine     - Category totals, object context, scoring rules
//! Layer 1: scorekeep_formula    - Lexer, parser, evaluator, lint
//! Layer 0: scorekeep_foundation - Core types (Value, ids, data model, Error)
//! ```

pub use scorekeep_engine as engine;
pub use scorekeep_formula as formula;
pub use scorekeep_foundation as foundation;
pub use scorekeep_runtime as runtime;
