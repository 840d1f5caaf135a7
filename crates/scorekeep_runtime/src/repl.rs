//! The formula REPL.
//!
//! Bare lines are formulas, evaluated against the loaded template with empty
//! totals. Lines starting with `:` are commands.

use std::io::{self, Write};
use std::path::Path;

use im::Vector;
use scorekeep_engine::{EngineConfig, EvaluationContext, Target, evaluate_formula, player_totals};
use scorekeep_formula::{lint, references, validate};
use scorekeep_foundation::{Error, ErrorKind, Result, SessionSettings, Tables, Value};

use crate::document::{TemplateDocument, resolves};
use crate::editor::{LineEditor, ReadResult, RustylineEditor, is_complete};

/// What one line of input produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// A formula result.
    Value(Value),
    /// Command output.
    Message(String),
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The loaded template, if any.
    template: Option<TemplateDocument>,

    /// Tables built from the loaded template.
    tables: Tables,

    /// Session settings formulas are evaluated under.
    settings: SessionSettings,

    /// Engine configuration used for evaluation.
    config: EngineConfig,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for input with open brackets).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            template: None,
            tables: Tables::new(),
            settings: SessionSettings::default(),
            config: EngineConfig::default(),
            show_banner: true,
            prompt: "score> ".to_string(),
            continuation_prompt: "   .. ".to_string(),
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the session settings (players, rounds, phase) for evaluation.
    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The loaded template.
    #[must_use]
    pub const fn template(&self) -> Option<&TemplateDocument> {
        self.template.as_ref()
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => self.print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false);
        };

        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Reply::Value(value)) => println!("\x1b[1m{value}\x1b[0m"),
            Ok(Reply::Message(text)) => println!("{text}"),
            Ok(Reply::Quit) => return Ok(false),
            Err(e) => self.print_error(&e),
        }
        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let read = if first_line {
                self.editor.read_line(&self.prompt)?
            } else {
                self.editor.read_continuation(&self.continuation_prompt)?
            };

            match read {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);
                    if is_complete(&input) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in multi-line input".to_string(),
                    )));
                }
            }
        }
    }

    /// Evaluates one line of input.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands, unreadable templates, and
    /// formulas that fail to parse or evaluate.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        let input = input.trim();
        let Some(command) = input.strip_prefix(':') else {
            return self.evaluate(input).map(Reply::Value);
        };

        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));

        match name {
            "load" => {
                if argument.is_empty() {
                    return Err(usage(":load <template.json>"));
                }
                self.load_template(argument).map(Reply::Message)
            }
            "check" => {
                if argument.is_empty() {
                    return Err(usage(":check <formula>"));
                }
                Ok(Reply::Message(self.check(argument)))
            }
            "refs" => {
                if argument.is_empty() {
                    return Err(usage(":refs <formula>"));
                }
                self.refs(argument).map(Reply::Message)
            }
            "lint" => Ok(Reply::Message(self.lint_template())),
            "help" | "h" => Ok(Reply::Message(HELP.trim().to_string())),
            "quit" | "q" | "exit" => Ok(Reply::Quit),
            other => Err(Error::new(ErrorKind::Internal(format!(
                "unknown command :{other}, try :help"
            )))),
        }
    }

    /// Loads a JSON template and makes its names available to formulas.
    ///
    /// Returns a one-line summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    pub fn load_template<P: AsRef<Path>>(&mut self, path: P) -> Result<String> {
        let document = TemplateDocument::load(path.as_ref())?;
        self.tables = document.to_tables();

        let names = document
            .categories
            .iter()
            .map(|c| c.name.clone())
            .chain(document.definitions.iter().map(|d| d.name.clone()))
            .collect();
        self.editor.set_references(names);

        let summary = format!(
            "loaded {}: {} categories, {} definitions, {} rules",
            document.name,
            document.categories.len(),
            document.definitions.len(),
            document.rules.len()
        );
        let issues = document.check().len();
        tracing::info!(template = %document.name, issues, "template loaded");
        self.template = Some(document);

        Ok(if issues == 0 {
            summary
        } else {
            format!("{summary} ({issues} formula issues, see :lint)")
        })
    }

    /// Evaluates a formula with empty totals.
    fn evaluate(&self, formula: &str) -> Result<Value> {
        let ctx = EvaluationContext::new(&self.tables, &self.settings, &self.config);
        let totals = player_totals(&Vector::new(), &ctx);
        evaluate_formula(&ctx, Some(&totals), formula)
    }

    /// Syntax check plus lint against the loaded names.
    fn check(&self, formula: &str) -> String {
        let validation = validate(formula);
        if let Some(error) = validation.error {
            return format!("syntax error: {error}");
        }
        match lint(formula, |name| resolves(&self.tables, name)) {
            Ok(warnings) if warnings.is_empty() => "ok".to_string(),
            Ok(warnings) => warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("syntax error: {e}"),
        }
    }

    /// Lists referenced names and what each resolves to.
    fn refs(&self, formula: &str) -> Result<String> {
        let names = references(formula)?;
        if names.is_empty() {
            return Ok("no references".to_string());
        }
        let ctx = EvaluationContext::new(&self.tables, &self.settings, &self.config);
        let lines: Vec<String> = names
            .iter()
            .map(|name| {
                let target = match ctx.lookup(name) {
                    Some(Target::Category(c)) => format!("category {}", c.id),
                    Some(Target::Definition(d)) => format!("definition {}", d.id),
                    Some(Target::Total) => "grand total".to_string(),
                    None => "unknown (reads as 0)".to_string(),
                };
                format!("{{{name}}} -> {target}")
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Every formula issue in the loaded template.
    fn lint_template(&self) -> String {
        let Some(template) = &self.template else {
            return "no template loaded".to_string();
        };
        let issues = template.check();
        if issues.is_empty() {
            return "ok".to_string();
        }
        issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mScorekeep formula REPL v{}\x1b[0m", env!("CARGO_PKG_VERSION"));
        println!("Type a formula to evaluate it, :help for commands, Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

fn usage(text: &str) -> Error {
    Error::new(ErrorKind::Internal(format!("usage: {text}")))
}

const HELP: &str = "
:load <template.json>   Load a template; its names become references
:check <formula>        Check syntax and references
:refs <formula>         List references and what they resolve to
:lint                   Check every formula in the loaded template
:help                   Show this help
:quit                   Exit (also Ctrl+D)
<formula>               Evaluate, e.g. max({Gold}, 3) * 2
";
