//! Formula evaluation.
//!
//! A [`Formula`] keeps the text it was parsed from, so templates round-trip
//! verbatim. Formulas that are a single optionally signed number skip the
//! grammar entirely.

use std::cmp::Ordering;

use scorekeep_foundation::{Error, InstanceState, Result, Type, Value};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::native::{self, NativeKind};
use crate::parser::Parser;
use crate::resolve::Resolver;

/// Limit on evaluator recursion for trees not built by the parser.
pub const MAX_EVAL_DEPTH: usize = 256;

/// A parsed formula.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    source: String,
    compiled: Compiled,
}

#[derive(Clone, Debug, PartialEq)]
enum Compiled {
    Constant(f64),
    Tree(Expr),
}

impl Formula {
    /// Parses formula text.
    ///
    /// # Errors
    /// Returns a syntax error if the text is not a valid formula.
    pub fn parse(source: &str) -> Result<Self> {
        let compiled = match constant(source) {
            Some(n) => Compiled::Constant(n),
            None => Compiled::Tree(Parser::new(source).parse()?),
        };
        Ok(Self {
            source: source.to_string(),
            compiled,
        })
    }

    /// The text this formula was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The value of a constant formula like `"5"` or `"-2.5"`.
    #[must_use]
    pub const fn constant(&self) -> Option<f64> {
        match self.compiled {
            Compiled::Constant(n) => Some(n),
            Compiled::Tree(_) => None,
        }
    }

    /// The expression tree, unless this formula is a constant.
    #[must_use]
    pub const fn expr(&self) -> Option<&Expr> {
        match &self.compiled {
            Compiled::Tree(expr) => Some(expr),
            Compiled::Constant(_) => None,
        }
    }

    /// Evaluates to a value without final coercion.
    ///
    /// # Errors
    /// Returns an evaluation error for unknown functions, wrong arity, type
    /// mismatches, reference cycles, or excessive depth.
    pub fn evaluate_value(&self, resolver: &mut dyn Resolver) -> Result<Value> {
        match &self.compiled {
            Compiled::Constant(n) => Ok(Value::Number(*n)),
            Compiled::Tree(expr) => Evaluator::new(resolver).eval(expr),
        }
    }

    /// Evaluates to a number.
    ///
    /// # Errors
    /// As [`Self::evaluate_value`], plus a type mismatch if the result does
    /// not coerce to a number.
    pub fn evaluate(&self, resolver: &mut dyn Resolver) -> Result<f64> {
        self.evaluate_value(resolver)?.to_number()
    }
}

/// Parses and evaluates formula text to a number.
///
/// # Errors
/// Returns a syntax error or an evaluation error.
pub fn evaluate(formula: &str, resolver: &mut dyn Resolver) -> Result<f64> {
    Formula::parse(formula)?.evaluate(resolver)
}

/// Parses and evaluates formula text to a value.
///
/// # Errors
/// Returns a syntax error or an evaluation error.
pub fn evaluate_value(formula: &str, resolver: &mut dyn Resolver) -> Result<Value> {
    Formula::parse(formula)?.evaluate_value(resolver)
}

/// Returns the number if the whole text is an optionally signed decimal.
fn constant(source: &str) -> Option<f64> {
    let trimmed = source.trim();
    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if well_formed {
        trimmed.parse().ok()
    } else {
        None
    }
}

/// Tree-walking evaluator over one resolver.
struct Evaluator<'r> {
    resolver: &'r mut dyn Resolver,
    depth: usize,
}

impl<'r> Evaluator<'r> {
    fn new(resolver: &'r mut dyn Resolver) -> Self {
        Self { resolver, depth: 0 }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        self.depth += 1;
        if self.depth > MAX_EVAL_DEPTH {
            return Err(Error::depth_exceeded(MAX_EVAL_DEPTH));
        }
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::Text(s, _) => Ok(Value::text(s)),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Reference(name, _) => self.reference(name),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
                ..
            } => Ok(Value::Number(-self.eval_number(operand)?)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            Expr::Call { name, args, .. } => self.call(name, args),
        }
    }

    fn eval_number(&mut self, expr: &Expr) -> Result<f64> {
        self.eval(expr)?.to_number()
    }

    fn reference(&mut self, name: &str) -> Result<Value> {
        if let Some(value) = self.resolver.resolve(name)? {
            return Ok(value);
        }
        self.resolver.unknown_reference(name);
        Ok(Value::Number(0.0))
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value> {
        let native = native::lookup(name).ok_or_else(|| Error::unknown_function(name))?;
        if !native.accepts(args.len()) {
            return Err(Error::arity_mismatch(
                native.name,
                native.expected(),
                args.len(),
            ));
        }

        match native.kind {
            NativeKind::Numeric(f) => {
                let numbers = args
                    .iter()
                    .map(|arg| self.eval_number(arg))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Number(f(&numbers)))
            }
            NativeKind::Round => match args {
                [] => Ok(Value::Number(self.resolver.round().map_or(0.0, f64::from))),
                [x] => Ok(Value::Number(self.eval_number(x)?.round())),
                [x, digits, ..] => {
                    let x = self.eval_number(x)?;
                    let digits = self.eval_number(digits)?;
                    Ok(Value::Number(native::round_to(x, digits)))
                }
            },
            NativeKind::If => {
                let branch = if self.eval(&args[0])?.is_truthy() {
                    &args[1]
                } else {
                    &args[2]
                };
                self.eval(branch)
            }
            NativeKind::State => {
                let target = self.reference_name(&args[0])?;
                let state = self
                    .resolver
                    .state(&target)?
                    .unwrap_or(InstanceState::Inactive);
                Ok(Value::text(state.tag()))
            }
            NativeKind::Owns => {
                let target = self.reference_name(&args[0])?;
                let player = match args.get(1) {
                    Some(arg) => Some(display_text(&self.eval(arg)?)),
                    None => None,
                };
                Ok(Value::Bool(self.resolver.owns(&target, player.as_deref())?))
            }
            NativeKind::Phase => Ok(Value::Number(
                self.resolver.phase().map_or(0.0, f64::from),
            )),
        }
    }

    /// The name an argument of `state` or `owns` points at.
    ///
    /// `{Dragon}` and `"Dragon"` name the reference directly; any other
    /// expression must evaluate to text.
    fn reference_name(&mut self, arg: &Expr) -> Result<String> {
        match arg {
            Expr::Reference(name, _) | Expr::Text(name, _) => Ok(name.clone()),
            other => match self.eval(other)? {
                Value::Text(name) => Ok(name.to_string()),
                value => Err(Error::type_mismatch(Type::Text, value.value_type())),
            },
        }
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let arithmetic: fn(f64, f64) -> f64 = match op {
        BinaryOp::Add => |a, b| a + b,
        BinaryOp::Sub => |a, b| a - b,
        BinaryOp::Mul => |a, b| a * b,
        BinaryOp::Div => |a, b| a / b,
        BinaryOp::Pow => f64::powf,
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge => return compare(op, left, right).map(Value::Bool),
    };
    Ok(Value::Number(arithmetic(left.to_number()?, right.to_number()?)))
}

/// Text compares with text case-insensitively; anything else compares as
/// numbers. NaN is unordered and equal to nothing.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool> {
    let ordering = if let (Value::Text(a), Value::Text(b)) = (left, right) {
        Some(a.trim().to_lowercase().cmp(&b.trim().to_lowercase()))
    } else {
        left.to_number()?.partial_cmp(&right.to_number()?)
    };
    Ok(match op {
        BinaryOp::Eq => ordering == Some(Ordering::Equal),
        BinaryOp::Ne => ordering != Some(Ordering::Equal),
        BinaryOp::Lt => ordering == Some(Ordering::Less),
        BinaryOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ordering == Some(Ordering::Greater),
        BinaryOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => false,
    })
}
