//! Error types for the Scorekeep system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::Type;
use crate::validate::ValidationError;

/// The main error type for Scorekeep operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a syntax error at a 1-based position.
    #[must_use]
    pub fn syntax(message: impl Into<String>, line: u32, column: u32, context: String) -> Self {
        Self::new(ErrorKind::Syntax {
            message: message.into(),
            line,
            column,
            context,
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown function error.
    #[must_use]
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFunction(name.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(function: impl Into<String>, expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            function: function.into(),
            expected: expected.into(),
            actual,
        })
    }

    /// Creates a reference cycle error.
    #[must_use]
    pub fn reference_cycle(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceCycle(name.into()))
    }

    /// Creates a depth exceeded error.
    #[must_use]
    pub fn depth_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::DepthExceeded(limit))
    }

    /// Returns true if this error came from a malformed formula.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax { .. })
    }

    /// Returns true if this error was raised while evaluating a well-formed formula.
    #[must_use]
    pub const fn is_evaluation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnknownFunction(_)
                | ErrorKind::ArityMismatch { .. }
                | ErrorKind::TypeMismatch { .. }
                | ErrorKind::ReferenceCycle(_)
                | ErrorKind::DepthExceeded(_)
        )
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::new(ErrorKind::Validation(err))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed formula text.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        /// Description of the syntax error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The formula line where the error occurred.
        context: String,
    },

    /// Call to a function the evaluator does not know.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments to a function.
    #[error("arity mismatch in {function}: expected {expected}, got {actual}")]
    ArityMismatch {
        /// The function that was called.
        function: String,
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// A value could not be coerced to the type an operation needs.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// A formula reached itself through references.
    #[error("reference cycle through {0}")]
    ReferenceCycle(String),

    /// Formula nesting exceeded the configured limit.
    #[error("nesting depth limit ({0}) exceeded")]
    DepthExceeded(usize),

    /// A write to an instance value was rejected.
    #[error("invalid value: {0}")]
    Validation(ValidationError),

    /// Encoding or decoding a document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File system access failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Category, definition, or rule being computed.
    pub source: Option<String>,
    /// The formula text involved, if any.
    pub formula: Option<String>,
    /// Chain of references followed before the failure.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source (what was being computed).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the formula text.
    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        if let Some(formula) = &self.formula {
            write!(f, " `{formula}`")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  via {frame}")?;
            }
        }
        Ok(())
    }
}
