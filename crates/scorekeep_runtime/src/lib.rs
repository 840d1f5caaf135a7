//! Template documents, snapshot serialization, and the formula REPL for Scorekeep.
//!
//! This crate provides:
//! - [`TemplateDocument`] - Canonical JSON templates with formula checks
//! - [`to_bytes`] / [`from_bytes`] - `MessagePack` session snapshots
//! - [`Repl`] - Interactive formula read-eval-print loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document;
pub mod editor;
pub mod highlight;
pub mod repl;
pub mod serialize;

pub use document::{FORMAT_VERSION, FormulaIssue, Problem, TemplateDocument, check_formula};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use highlight::FormulaHighlighter;
pub use repl::{Reply, Repl};
pub use serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
