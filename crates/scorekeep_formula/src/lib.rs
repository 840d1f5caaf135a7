//! Lexer, parser, and evaluator for Scorekeep formula strings.
//!
//! Formulas are small infix expressions stored verbatim in templates:
//!
//! ```text
//! {Territories} * 2
//! max({Gold}, {Silver}) + if(owns({Crown}), 5, 0)
//! ```
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of formula text
//! - [`Parser`] - Parsing tokens into an [`Expr`] tree
//! - [`Formula`] - A parsed formula that keeps its source text
//! - [`Resolver`] - The seam through which references and context functions are answered
//! - [`validate`], [`lint`], [`references`] - Editor-time checks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod check;
pub mod eval;
pub mod lexer;
mod native;
pub mod parser;
pub mod resolve;
pub mod span;
pub mod token;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use check::{Validation, Warning, WarningKind, lint, references, validate};
pub use eval::{Formula, evaluate, evaluate_value};
pub use lexer::Lexer;
pub use parser::{Parser, parse};
pub use resolve::{NoContext, Resolver, StaticResolver};
pub use span::Span;
pub use token::{Token, TokenKind};

/// Names of the built-in functions, for completion and documentation.
pub fn function_names() -> impl Iterator<Item = &'static str> {
    native::names()
}
