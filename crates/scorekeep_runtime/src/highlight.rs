//! Syntax highlighting for the REPL.

use std::borrow::Cow;

use scorekeep_formula::{Lexer, TokenKind};

const RESET: &str = "\x1b[0m";

/// Highlighter for formula syntax and REPL commands.
pub struct FormulaHighlighter {}

impl FormulaHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Highlight a line of input.
    ///
    /// A leading `:command` is colored as a command; `:check` and `:refs`
    /// arguments are highlighted as formulas, other arguments are left alone.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }
        let Some(command) = line.strip_prefix(':') else {
            return Cow::Owned(highlight_formula(line));
        };

        let split = command.find(char::is_whitespace).unwrap_or(command.len());
        let (name, rest) = command.split_at(split);
        let mut result = String::with_capacity(line.len() * 2);
        result.push_str("\x1b[36m:"); // cyan
        result.push_str(name);
        result.push_str(RESET);
        match name {
            "check" | "refs" => result.push_str(&highlight_formula(rest)),
            _ => result.push_str(rest),
        }
        Cow::Owned(result)
    }
}

impl Default for FormulaHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors each token of `source`, copying the text between tokens verbatim.
fn highlight_formula(source: &str) -> String {
    let mut result = String::with_capacity(source.len() * 2);
    let mut copied = 0;

    for token in Lexer::tokenize_all(source) {
        if token.kind == TokenKind::Eof {
            break;
        }
        let text = token.span.text(source);
        let start = token.span.start.min(source.len());
        let end = start + text.len();
        result.push_str(&source[copied.min(start)..start]);

        match color(&token.kind) {
            Some(color) => {
                result.push_str(color);
                result.push_str(text);
                result.push_str(RESET);
            }
            None => result.push_str(text),
        }
        copied = end;
    }
    result.push_str(&source[copied.min(source.len())..]);
    result
}

const fn color(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Reference(_) => Some("\x1b[34m"),      // blue
        TokenKind::Number(_) => Some("\x1b[35m"),         // magenta
        TokenKind::String(_) => Some("\x1b[33m"),         // yellow
        TokenKind::True | TokenKind::False => Some("\x1b[34m"),
        TokenKind::Ident(_) => Some("\x1b[32m"),          // green
        TokenKind::Error(_) => Some("\x1b[31m"),          // red
        TokenKind::LParen | TokenKind::RParen => Some("\x1b[1m"),
        _ => None,
    }
}
