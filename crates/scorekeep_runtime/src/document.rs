//! Template documents: the durable JSON form of a scoring template.
//!
//! A template carries categories, object definitions, and scoring rules.
//! Formula strings are stored verbatim. Documents written by [`TemplateDocument::export`]
//! are canonical: importing and exporting again yields the same text.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use scorekeep_engine::{EngineConfig, EvaluationContext};
use scorekeep_foundation::{
    Category, Definition, Error, ErrorKind, Result, ScoringRule, SessionSettings, Tables,
};
use scorekeep_formula::{Warning, lint, validate};
use serde::{Deserialize, Serialize};

/// The newest template format this crate reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

/// A scoring template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    /// Format version the document was written with.
    pub format_version: u32,
    /// Display name of the template.
    pub name: String,
    /// Score categories.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Object/variable definitions.
    #[serde(default)]
    pub definitions: Vec<Definition>,
    /// Scoring rules, in evaluation order.
    #[serde(default)]
    pub rules: Vec<ScoringRule>,
}

impl TemplateDocument {
    /// Creates an empty template.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: name.into(),
            categories: Vec::new(),
            definitions: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Builds a template from the template-level parts of `tables`.
    ///
    /// Instances are session data and are left out.
    #[must_use]
    pub fn from_tables(name: impl Into<String>, tables: &Tables) -> Self {
        Self {
            categories: tables.categories().into_iter().cloned().collect(),
            definitions: tables.definitions().cloned().collect(),
            rules: tables.rules().cloned().collect(),
            ..Self::new(name)
        }
    }

    /// Tables holding this template's categories, definitions, and rules.
    #[must_use]
    pub fn to_tables(&self) -> Tables {
        let mut tables = Tables::new();
        for category in &self.categories {
            tables.insert_category(category.clone());
        }
        for definition in &self.definitions {
            tables.insert_definition(definition.clone());
        }
        for rule in &self.rules {
            tables.push_rule(rule.clone());
        }
        tables
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a valid template or
    /// was written by a newer format version.
    pub fn import(text: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(text)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
        if document.format_version > FORMAT_VERSION {
            return Err(Error::new(ErrorKind::Serialization(format!(
                "template format version {} is newer than supported version {FORMAT_VERSION}",
                document.format_version
            ))));
        }
        Ok(document)
    }

    /// Encodes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    /// Writes the document to a JSON file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or encoding fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.export()?;
        let file = File::create(path).map_err(|e| io_error("create", path, &e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .map_err(|e| io_error("write to", path, &e))?;
        writer.flush().map_err(|e| io_error("flush", path, &e))?;
        Ok(())
    }

    /// Reads a document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| io_error("open", path, &e))?;
        let mut text = String::new();
        BufReader::new(file)
            .read_to_string(&mut text)
            .map_err(|e| io_error("read", path, &e))?;
        Self::import(&text)
    }

    /// Checks every formula in the template.
    ///
    /// Reports syntax errors, unknown references, unknown functions, and
    /// arity problems, in document order.
    #[must_use]
    pub fn check(&self) -> Vec<FormulaIssue> {
        let tables = self.to_tables();
        let mut issues = Vec::new();

        for category in &self.categories {
            if let Some(formula) = &category.formula {
                let owner = format!("category {}", category.name);
                issues.extend(check_formula(&tables, &owner, formula));
            }
        }
        for definition in &self.definitions {
            if let Some(formula) = &definition.calculation {
                let owner = format!("calculation of {}", definition.name);
                issues.extend(check_formula(&tables, &owner, formula));
            }
            if let Some(formula) = &definition.score_impact {
                let owner = format!("score impact of {}", definition.name);
                issues.extend(check_formula(&tables, &owner, formula));
            }
        }
        issues
    }
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {action} file '{}': {err}",
        path.display()
    )))
}

// =============================================================================
// Formula Checks
// =============================================================================

/// What is wrong with one formula.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Problem {
    /// The formula does not parse.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The formula parses but will misbehave.
    #[error("{0}")]
    Lint(Warning),
}

/// A problem found in one of a template's formulas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaIssue {
    /// Which formula, e.g. `category Victory Points`.
    pub owner: String,
    /// The formula text.
    pub formula: String,
    /// What was found.
    pub problem: Problem,
}

impl std::fmt::Display for FormulaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.owner, self.problem)
    }
}

/// Returns true if `name` resolves against `tables`.
#[must_use]
pub fn resolves(tables: &Tables, name: &str) -> bool {
    let settings = SessionSettings::default();
    let config = EngineConfig::default();
    EvaluationContext::new(tables, &settings, &config)
        .lookup(name)
        .is_some()
}

/// Checks one formula against the names in `tables`.
#[must_use]
pub fn check_formula(tables: &Tables, owner: &str, formula: &str) -> Vec<FormulaIssue> {
    let issue = |problem| FormulaIssue {
        owner: owner.to_string(),
        formula: formula.to_string(),
        problem,
    };

    let validation = validate(formula);
    if !validation.valid {
        let message = validation.error.unwrap_or_default();
        return vec![issue(Problem::Syntax(message))];
    }
    match lint(formula, |name| resolves(tables, name)) {
        Ok(warnings) => warnings
            .into_iter()
            .map(|w| issue(Problem::Lint(w)))
            .collect(),
        Err(err) => vec![issue(Problem::Syntax(err.to_string()))],
    }
}
