//! Parser for formula text.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! formula    := comparison EOF
//! comparison := additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)?
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := "-" unary | power
//! power      := primary ("^" unary)?
//! primary    := number | string | true | false | reference
//!             | ident "(" (comparison ("," comparison)*)? ")"
//!             | "(" comparison ")"
//! ```
//!
//! `^` binds tighter than unary minus and is right-associative, so `-2^2`
//! is `-4` and `2^3^2` is `512`. Comparisons do not chain.

use scorekeep_foundation::{Error, Result};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Default limit on expression nesting.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Parser for formula text.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error messages).
    source: &'src str,
    /// Current nesting depth.
    depth: usize,
    /// Nesting limit.
    max_nesting: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
            depth: 0,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Parses the whole source as one expression.
    ///
    /// # Errors
    /// Returns a syntax error if the source is empty, malformed, or has
    /// trailing input.
    pub fn parse(&mut self) -> Result<Expr> {
        if self.current.kind == TokenKind::Eof {
            return Err(self.error("empty formula"));
        }
        let expr = self.parse_comparison()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.error(&format!("unexpected {}", self.describe_current())));
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.enter()?;
        let left = self.parse_additive()?;
        let result = if let Some(op) = comparison_op(&self.current.kind) {
            self.advance();
            let right = self.parse_additive()?;
            if comparison_op(&self.current.kind).is_some() {
                return Err(self.error("comparisons cannot be chained"));
            }
            Ok(binary(op, left, right))
        } else {
            Ok(left)
        };
        self.leave();
        result
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.current.kind == TokenKind::Minus {
            let start = self.current.span;
            self.advance();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.leave();
            let span = start.to(operand.span());
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if self.current.kind == TokenKind::Caret {
            self.advance();
            self.enter()?;
            let exponent = self.parse_unary()?;
            self.leave();
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.current.span;
        match &self.current.kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Expr::Number(n, span))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::Text(s, span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true, span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false, span))
            }
            TokenKind::Reference(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::Reference(name, span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                self.parse_call(name, span)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_comparison()?;
                if self.current.kind != TokenKind::RParen {
                    return Err(self.error_at(span, "unclosed '('"));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Eof => Err(self.error("unexpected end of formula")),
            TokenKind::Error(msg) => Err(self.error(msg)),
            _ => Err(self.error(&format!("unexpected {}", self.describe_current()))),
        }
    }

    /// Parses the argument list after a function name.
    fn parse_call(&mut self, name: String, start: Span) -> Result<Expr> {
        if self.current.kind != TokenKind::LParen {
            return Err(self.error_at(
                start,
                &format!("unexpected identifier '{name}'; references are written {{{name}}}"),
            ));
        }
        self.advance();

        let mut args = Vec::new();
        if self.current.kind != TokenKind::RParen {
            loop {
                args.push(self.parse_comparison()?);
                match self.current.kind {
                    TokenKind::Comma => self.advance(),
                    TokenKind::RParen => break,
                    TokenKind::Eof => {
                        return Err(self.error_at(start, &format!("unclosed call to {name}")));
                    }
                    _ => {
                        return Err(self.error(&format!(
                            "expected ',' or ')', found {}",
                            self.describe_current()
                        )));
                    }
                }
            }
        }

        let end = self.current.span;
        self.advance(); // consume ')'
        Ok(Expr::Call {
            name,
            args,
            span: start.to(end),
        })
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            return Err(self.error(&format!(
                "formula nested deeper than {} levels",
                self.max_nesting
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn describe_current(&self) -> String {
        match &self.current.kind {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Reference(name) => format!("reference {{{name}}}"),
            kind => kind.name().to_string(),
        }
    }

    /// Creates a syntax error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a syntax error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::syntax(message, span.line, span.column, self.context_at(span))
    }

    /// The source line containing a span.
    fn context_at(&self, span: Span) -> String {
        span.source_line(self.source).to_string()
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        _ => return None,
    })
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

/// Parses formula text into an expression tree.
///
/// # Errors
/// Returns a syntax error if the formula is malformed.
pub fn parse(source: &str) -> Result<Expr> {
    Parser::new(source).parse()
}
