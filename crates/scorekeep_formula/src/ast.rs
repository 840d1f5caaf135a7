//! Expression tree for parsed formulas.

use std::fmt;

use crate::span::Span;

/// A formula expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Number literal like `42`
    Number(f64, Span),
    /// String literal like `"owned"`
    Text(String, Span),
    /// `true` or `false`
    Bool(bool, Span),
    /// Reference like `{Gold}`
    Reference(String, Span),
    /// Prefix operation like `-x`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Infix operation like `a + b` or `a >= b`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Function call like `max(a, b)`
    Call {
        /// Function name as written.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
}

impl Expr {
    /// Returns the source span of this node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Number(_, s) | Self::Text(_, s) | Self::Bool(_, s) | Self::Reference(_, s) => *s,
            Self::Unary { span, .. } | Self::Binary { span, .. } | Self::Call { span, .. } => {
                *span
            }
        }
    }

    /// Returns the number if this is a number literal.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n, _) => Some(*n),
            _ => None,
        }
    }

    /// Returns the name if this is a reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::Reference(name, _) => Some(name),
            _ => None,
        }
    }

    /// Visits this node and every descendant in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Self::Unary { operand, .. } => operand.walk(visit),
            Self::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Call { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            Self::Number(..) | Self::Text(..) | Self::Bool(..) | Self::Reference(..) => {}
        }
    }
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
}

/// Infix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// Returns true for the comparison operators.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// The operator as written.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Expr {
    /// Fully parenthesized form, used to show how a formula was grouped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n, _) => write!(f, "{n}"),
            Self::Text(s, _) => write!(f, "{s:?}"),
            Self::Bool(b, _) => write!(f, "{b}"),
            Self::Reference(name, _) => write!(f, "{{{name}}}"),
            Self::Unary { operand, .. } => write!(f, "(-{operand})"),
            Self::Binary {
                op, left, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Call { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
