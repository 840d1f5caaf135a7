//! The REPL driven end to end by a scripted editor

use scorekeep_foundation::{Result, SessionSettings, Value};
use scorekeep_runtime::{LineEditor, ReadResult, Reply, Repl};

use crate::{scratch, territories};

/// Replays fixed lines, then reports end of input.
#[derive(Default)]
struct Script {
    lines: Vec<String>,
    next: usize,
    history: Vec<String>,
    references: Vec<String>,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }
}

impl LineEditor for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        let line = self.lines.get(self.next).cloned();
        self.next += 1;
        Ok(line.map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_references(&mut self, names: Vec<String>) {
        self.references = names;
    }
}

impl LineEditor for &mut Script {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        (**self).read_line(prompt)
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        (**self).read_continuation(prompt)
    }

    fn add_history(&mut self, line: &str) {
        (**self).add_history(line);
    }

    fn set_references(&mut self, names: Vec<String>) {
        (**self).set_references(names);
    }
}

fn message(reply: Reply) -> String {
    match reply {
        Reply::Message(text) => text,
        other => panic!("expected a message, got {other:?}"),
    }
}

#[test]
fn loading_a_template_exposes_its_names() {
    let path = scratch("repl_template.json");
    territories().save(&path).unwrap();

    let mut repl = Repl::with_editor(Script::default()).without_banner();
    let summary = message(repl.eval(&format!(":load {}", path.display())).unwrap());
    let _ = std::fs::remove_file(&path);

    assert_eq!(summary, "loaded Territories: 4 categories, 1 definitions, 1 rules");
    assert_eq!(repl.template().map(|t| t.name.as_str()), Some("Territories"));

    // Formula categories evaluate against an empty ledger.
    assert_eq!(repl.eval("{Victory Points} + 1").unwrap(), Reply::Value(Value::Number(1.0)));
    assert_eq!(repl.eval("{fort} == 0").unwrap(), Reply::Value(Value::Bool(true)));
    assert_eq!(message(repl.eval(":lint").unwrap()), "ok");

    let refs = message(repl.eval(":refs {Area} + {Moat} + {total}").unwrap());
    assert_eq!(
        refs.lines().collect::<Vec<_>>(),
        vec![
            "{Area} -> category area",
            "{Moat} -> unknown (reads as 0)",
            "{total} -> grand total",
        ]
    );
    assert!(message(repl.eval(":check {Moat} * 2").unwrap()).contains("{Moat}"));
}

#[test]
fn round_and_phase_come_from_the_session() {
    let settings = SessionSettings::with_players(["p1"])
        .with_rounds(4)
        .at_round("r3")
        .with_phase(Some(2));
    let mut repl = Repl::with_editor(Script::default()).with_settings(settings);
    assert_eq!(repl.eval("round() * 10 + phase()").unwrap(), Reply::Value(Value::Number(22.0)));
}

#[test]
fn bad_input_is_an_error_not_a_crash() {
    let mut repl = Repl::with_editor(Script::default());
    assert!(repl.eval("max(1,").unwrap_err().is_syntax());
    assert!(repl.eval(":frobnicate").is_err());
    assert!(repl.eval(":load").is_err());
    assert!(repl.eval(&format!(":load {}", scratch("absent.json").display())).is_err());
    assert_eq!(message(repl.eval(":lint").unwrap()), "no template loaded");
}

#[test]
fn scripted_session_runs_until_quit() {
    let mut script = Script::new(&["1 + 1", "nope(1)", "", "max(1,", "2)", ":quit", "never read"]);
    Repl::with_editor(&mut script).without_banner().run().unwrap();

    assert_eq!(script.next, 6);
    // Blank lines stay out of history; continuation lines join.
    assert_eq!(script.history, vec!["1 + 1", "nope(1)", "max(1,\n2)", ":quit"]);
}

#[test]
fn loading_from_the_loop_hands_names_to_the_editor() {
    let path = scratch("repl_names.json");
    territories().save(&path).unwrap();
    let load = format!(":load {}", path.display());

    let mut script = Script::new(&[load.as_str()]);
    Repl::with_editor(&mut script).without_banner().run().unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(script.references.contains(&"Victory Points".to_string()));
    assert!(script.references.contains(&"Fort".to_string()));
}
