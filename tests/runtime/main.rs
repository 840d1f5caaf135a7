//! Integration tests for Layer 3: Runtime
//!
//! Tests templates on disk, snapshot persistence, and the REPL driven by a
//! scripted editor.

mod persistence;
mod repl;

use scorekeep_foundation::{
    Category, Comparison, Definition, Ownership, RuleAction, RuleActionKind, RuleCondition,
    RuleScope, ScoringRule, Tables, ValueKind,
};
use scorekeep_runtime::TemplateDocument;

/// A small area-control template.
pub fn territories() -> TemplateDocument {
    let tables = Tables::new()
        .with_category(Category::new("territories", "Territories").with_sort_order(1))
        .with_category(Category::new("area", "Area").with_formula("{Territories} * 2"))
        .with_category(Category::new("bonus", "Bonus"))
        .with_category(Category::new("vp", "Victory Points").with_formula("{Area} + {Bonus}"))
        .with_definition(
            Definition::new("fort", "Fort", ValueKind::Number)
                .with_ownership(Ownership::PerPlayer)
                .with_default(0.0)
                .with_score_impact("{Fort} * 3")
                .with_impact_category("bonus"),
        )
        .with_rule(ScoringRule::new(
            "cap",
            "Cap",
            RuleCondition {
                scope: RuleScope::Total,
                operator: Comparison::Gte,
                threshold: 40.0,
                category_id: None,
            },
            RuleAction {
                kind: RuleActionKind::Set,
                amount: 40.0,
                target_category_id: None,
            },
        ));
    TemplateDocument::from_tables("Territories", &tables)
}

/// A scratch path unique to one test.
pub fn scratch(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("scorekeep_it_{}_{name}", std::process::id()))
}
