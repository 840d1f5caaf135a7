//! Line editor abstraction for the REPL.
//!
//! The REPL talks to a [`LineEditor`]; [`RustylineEditor`] is the terminal
//! implementation, tests drive the REPL with scripted input instead.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};
use scorekeep_foundation::{Error, ErrorKind, Result};

use crate::highlight::FormulaHighlighter;

/// REPL commands offered for completion.
pub const COMMANDS: &[&str] = &[":load", ":check", ":refs", ":lint", ":help", ":quit"];

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a continuation line (for input with open brackets).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);

    /// Set the reference names offered for completion, without braces.
    fn set_references(&mut self, names: Vec<String>);
}

/// Helper for rustyline that provides completion, hints, highlighting, and validation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct FormulaHelper {
    #[rustyline(Completer)]
    completer: FormulaCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
    highlighter: FormulaHighlighter,
}

impl Highlighter for FormulaHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completer for commands, built-in functions, references, and file paths.
struct FormulaCompleter {
    file_completer: FilenameCompleter,
    functions: Vec<String>,
    references: Vec<String>,
}

impl FormulaCompleter {
    fn new() -> Self {
        Self {
            file_completer: FilenameCompleter::new(),
            functions: scorekeep_formula::function_names()
                .map(|name| format!("{name}("))
                .collect(),
            references: Vec::new(),
        }
    }

    /// Candidates for the word under the cursor.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let before = &line[..pos];

        // Inside an open reference: complete the name and close the brace.
        if let Some(open) = before.rfind('{') {
            if !before[open..].contains('}') {
                let partial = before[open + 1..].to_lowercase();
                let found = self
                    .references
                    .iter()
                    .filter(|name| name.to_lowercase().starts_with(&partial))
                    .map(|name| format!("{{{name}}}"))
                    .collect();
                return (open, found);
            }
        }

        let start = before
            .rfind(|c: char| c.is_whitespace() || "(),+-*/^<>=!".contains(c))
            .map_or(0, |i| i + 1);
        let word = &before[start..];

        let pool: Vec<&str> = if start == 0 && word.starts_with(':') {
            COMMANDS.to_vec()
        } else {
            self.functions.iter().map(String::as_str).collect()
        };
        let found = pool
            .into_iter()
            .filter(|candidate| !word.is_empty() && candidate.starts_with(word))
            .map(str::to_string)
            .collect();
        (start, found)
    }
}

impl Completer for FormulaCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // File paths after :load
        if line.starts_with(":load ") && pos > ":load".len() {
            return self.file_completer.complete(line, pos, ctx);
        }

        let (start, found) = self.candidates(line, pos);
        let pairs = found
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Validator for bracket matching (enables multi-line input).
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Returns true unless the input has an open parenthesis, an open
/// reference brace, or an unterminated string.
#[must_use]
pub fn is_complete(input: &str) -> bool {
    if input.trim_start().starts_with(':') && !input.trim_start().starts_with(":check") {
        return true;
    }

    let mut parens = 0i32;
    let mut in_reference = false;
    let mut in_string = false;

    for c in input.chars() {
        match c {
            '"' if !in_reference => in_string = !in_string,
            '{' if !in_string => in_reference = true,
            '}' if !in_string => in_reference = false,
            '(' if !in_string && !in_reference => parens += 1,
            ')' if !in_string && !in_reference => parens -= 1,
            _ => {}
        }
    }

    parens <= 0 && !in_reference && !in_string
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<FormulaHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = FormulaHelper {
            completer: FormulaCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
            highlighter: FormulaHighlighter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Internal(e.to_string()))),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_references(&mut self, names: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.references = names;
        }
    }
}
