//! Editor-time checks: syntax validation, lint warnings, and reference
//! extraction.

use std::fmt;

use scorekeep_foundation::Result;

use crate::ast::Expr;
use crate::eval::Formula;
use crate::native;
use crate::span::Span;

/// Reference names that always resolve.
const RESERVED: &[&str] = &["total"];

/// Outcome of a syntax check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// True if the formula parses.
    pub valid: bool,
    /// The syntax error, with its position, when invalid.
    pub error: Option<String>,
}

impl Validation {
    /// A passing validation.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }
}

/// Checks formula syntax only. References and functions are not resolved.
#[must_use]
pub fn validate(formula: &str) -> Validation {
    match Formula::parse(formula) {
        Ok(_) => Validation::ok(),
        Err(err) => Validation {
            valid: false,
            error: Some(err.to_string()),
        },
    }
}

/// Something suspicious in a formula that still parses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// `{name}` matches no known category or definition; it will read as 0.
    UnknownReference(String),
    /// The function does not exist; evaluation will fail.
    UnknownFunction(String),
    /// Wrong number of arguments; evaluation will fail.
    WrongArity {
        /// The function called.
        function: String,
        /// Accepted counts.
        expected: String,
        /// Arguments given.
        actual: usize,
    },
}

/// A lint warning and where it applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// What was found.
    pub kind: WarningKind,
    /// Where it was found.
    pub span: Span,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.span)?;
        match &self.kind {
            WarningKind::UnknownReference(name) => {
                write!(f, "unknown reference {{{name}}} reads as 0")
            }
            WarningKind::UnknownFunction(name) => write!(f, "unknown function {name}"),
            WarningKind::WrongArity {
                function,
                expected,
                actual,
            } => write!(f, "{function} takes {expected} arguments, got {actual}"),
        }
    }
}

/// Reports unknown references, unknown functions, and arity problems.
///
/// `known` answers whether a reference name resolves; `total` is always
/// known.
///
/// # Errors
/// Returns a syntax error if the formula does not parse.
pub fn lint(formula: &str, known: impl Fn(&str) -> bool) -> Result<Vec<Warning>> {
    let parsed = Formula::parse(formula)?;
    let mut warnings = Vec::new();
    let Some(expr) = parsed.expr() else {
        return Ok(warnings);
    };

    for (name, span) in referenced(expr) {
        let reserved = RESERVED.iter().any(|r| r.eq_ignore_ascii_case(&name));
        if !reserved && !known(&name) {
            warnings.push(Warning {
                kind: WarningKind::UnknownReference(name),
                span,
            });
        }
    }

    expr.walk(&mut |node| {
        if let Expr::Call { name, args, span } = node {
            match native::lookup(name) {
                None => warnings.push(Warning {
                    kind: WarningKind::UnknownFunction(name.clone()),
                    span: *span,
                }),
                Some(native) if !native.accepts(args.len()) => warnings.push(Warning {
                    kind: WarningKind::WrongArity {
                        function: native.name.to_string(),
                        expected: native.expected(),
                        actual: args.len(),
                    },
                    span: *span,
                }),
                Some(_) => {}
            }
        }
    });

    warnings.sort_by_key(|w| w.span.start);
    Ok(warnings)
}

/// Names the formula references, first spelling wins, in source order.
///
/// String literals passed to `state` or `owns` count as references.
///
/// # Errors
/// Returns a syntax error if the formula does not parse.
pub fn references(formula: &str) -> Result<Vec<String>> {
    let parsed = Formula::parse(formula)?;
    Ok(parsed
        .expr()
        .map(|expr| referenced(expr).into_iter().map(|(name, _)| name).collect())
        .unwrap_or_default())
}

/// Distinct reference names with the span of their first use.
fn referenced(expr: &Expr) -> Vec<(String, Span)> {
    let mut found: Vec<(String, Span)> = Vec::new();
    let mut note = |name: &str, span: Span| {
        if !found.iter().any(|(seen, _)| seen.eq_ignore_ascii_case(name)) {
            found.push((name.to_string(), span));
        }
    };
    expr.walk(&mut |node| match node {
        Expr::Reference(name, span) => note(name, *span),
        Expr::Call { name, args, .. }
            if name.eq_ignore_ascii_case("state") || name.eq_ignore_ascii_case("owns") =>
        {
            if let Some(Expr::Text(target, span)) = args.first() {
                note(target, *span);
            }
        }
        _ => {}
    });
    found
}
