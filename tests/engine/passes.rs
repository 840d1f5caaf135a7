//! Multi-pass scenarios: rules, impacts, and convergence

use scorekeep_engine::{Engine, PassOutcome};
use scorekeep_foundation::{
    Category, CategoryId, Comparison, Definition, EntrySource, Instance, Ownership, PlayerId, RoundId,
    RuleAction, RuleActionKind, RuleCondition, RuleScope, ScoringRule, SessionSettings, Snapshot,
    Tables, ValueKind,
};

use crate::{at, entry};

fn rule(id: &str, condition: RuleCondition, kind: RuleActionKind, amount: f64) -> ScoringRule {
    ScoringRule::new(
        id,
        id.to_uppercase(),
        condition,
        RuleAction {
            kind,
            amount,
            target_category_id: None,
        },
    )
}

fn total_at_least(threshold: f64) -> RuleCondition {
    RuleCondition {
        scope: RuleScope::Total,
        operator: Comparison::Gte,
        threshold,
        category_id: None,
    }
}

fn grand_total(outcome: &PassOutcome, player: &str) -> Option<f64> {
    outcome.player(&PlayerId::new(player)).map(|t| t.grand_total)
}

// =============================================================================
// Rules
// =============================================================================

#[test]
fn cap_rule_corrects_then_settles() {
    let tables = Tables::new().with_rule(rule("cap", total_at_least(50.0), RuleActionKind::Set, 50.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 40.0))
        .with_entry(entry("e2", "p1", 23.0));
    let engine = Engine::new();

    let first = engine.evaluate(&snapshot, at(10));
    assert_eq!(grand_total(&first, "p1"), Some(63.0));
    let [correction] = first.entries.as_slice() else {
        panic!("expected one correction, got {:?}", first.entries);
    };
    assert_eq!(correction.value, -13.0);
    assert_eq!(correction.id.as_str(), "rule:cap:2");
    assert_eq!(correction.source, EntrySource::RuleEngine);
    assert_eq!(correction.note.as_deref(), Some("rule:CAP"));
    assert_eq!(correction.created_at, at(10));

    let next = first.apply(&snapshot);
    assert_eq!(next.entries.len(), 3);
    let second = engine.evaluate(&next, at(11));
    assert_eq!(grand_total(&second, "p1"), Some(50.0));
    assert!(second.is_quiescent());
}

#[test]
fn round_rules_see_only_the_current_round() {
    let condition = RuleCondition {
        scope: RuleScope::Round,
        operator: Comparison::Gte,
        threshold: 5.0,
        category_id: None,
    };
    let tables = Tables::new().with_rule(rule("streak", condition, RuleActionKind::Add, 3.0));
    let settings = SessionSettings::with_players(["p1", "p2"]).with_rounds(2).at_round("r2");
    let snapshot = Snapshot::new(tables, settings)
        .with_entry(entry("e1", "p1", 10.0).in_round("r1"))
        .with_entry(entry("e2", "p2", 10.0).in_round("r1"))
        .with_entry(entry("e3", "p1", 6.0).in_round("r2"))
        .with_entry(entry("e4", "p2", 2.0).in_round("r2"));

    let outcome = Engine::new().evaluate(&snapshot, at(1));
    assert_eq!(
        outcome.player(&PlayerId::new("p1")).and_then(|t| t.round_total),
        Some(6.0)
    );
    let [bonus] = outcome.entries.as_slice() else {
        panic!("expected only p1's bonus, got {:?}", outcome.entries);
    };
    assert_eq!(bonus.player_id, PlayerId::new("p1"));
    assert_eq!(bonus.value, 3.0);
    assert_eq!(bonus.round_id, Some(RoundId::new("r2")));
}

#[test]
fn round_rules_are_silent_without_a_current_round() {
    let condition = RuleCondition {
        scope: RuleScope::Round,
        operator: Comparison::Gte,
        threshold: 0.0,
        category_id: None,
    };
    let tables = Tables::new().with_rule(rule("streak", condition, RuleActionKind::Add, 3.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 10.0));
    assert!(Engine::new().evaluate(&snapshot, at(1)).entries.is_empty());
}

#[test]
fn category_rules_book_to_their_target() {
    let condition = RuleCondition {
        scope: RuleScope::Category,
        operator: Comparison::Gt,
        threshold: 10.0,
        category_id: Some(CategoryId::new("gold")),
    };
    let mut doubling = rule("hoard", condition, RuleActionKind::Multiply, 2.0);
    doubling.action.target_category_id = Some(CategoryId::new("gold"));
    let tables = Tables::new()
        .with_category(Category::new("gold", "Gold"))
        .with_rule(doubling)
        .with_rule(rule("off", total_at_least(0.0), RuleActionKind::Add, 100.0).with_enabled(false));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 12.0).in_category("gold"))
        .with_entry(entry("e2", "p1", 5.0));

    let outcome = Engine::new().evaluate(&snapshot, at(1));
    let [bonus] = outcome.entries.as_slice() else {
        panic!("expected one entry, got {:?}", outcome.entries);
    };
    assert_eq!(bonus.value, 12.0);
    assert_eq!(bonus.category_id, Some(CategoryId::new("gold")));
}

fn set_category(id: &str, amount: f64) -> ScoringRule {
    let mut set = rule(&format!("set-{id}"), total_at_least(0.0), RuleActionKind::Set, amount);
    set.action.target_category_id = Some(CategoryId::new(id));
    set
}

#[test]
fn set_rules_settle_on_weighted_targets() {
    let tables = Tables::new()
        .with_category(Category::new("gold", "Gold").weighted(2.0))
        .with_rule(set_category("gold", 10.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 4.0).in_category("gold"));
    let engine = Engine::new();
    let gold = CategoryId::new("gold");

    let first = engine.evaluate(&snapshot, at(1));
    assert_eq!(first.player(&PlayerId::new("p1")).map(|t| t.category(&gold)), Some(8.0));
    let [correction] = first.entries.as_slice() else {
        panic!("expected one correction, got {:?}", first.entries);
    };
    // One raw point is two weighted points.
    assert_eq!(correction.value, 1.0);

    let second = engine.evaluate(&first.apply(&snapshot), at(2));
    assert_eq!(second.player(&PlayerId::new("p1")).map(|t| t.category(&gold)), Some(10.0));
    assert!(second.is_quiescent());
}

#[test]
fn rules_never_book_to_parent_or_formula_categories() {
    let tables = Tables::new()
        .with_category(Category::new("vp", "VP"))
        .with_category(Category::new("terr", "Terr").with_parent("vp"))
        .with_category(Category::new("area", "Area").with_formula("{Terr} * 2"))
        .with_rule(set_category("vp", 10.0))
        .with_rule(set_category("area", 10.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 4.0).in_category("terr"));

    let outcome = Engine::new().evaluate(&snapshot, at(1));
    assert!(outcome.is_quiescent(), "dead entries minted: {:?}", outcome.entries);
    let totals = outcome.player(&PlayerId::new("p1"));
    assert_eq!(totals.map(|t| t.category(&CategoryId::new("vp"))), Some(4.0));
    assert_eq!(totals.map(|t| t.category(&CategoryId::new("area"))), Some(8.0));
}

// =============================================================================
// Impacts and ordering
// =============================================================================

#[test]
fn impacts_come_before_rules_and_lag_one_pass() {
    let tables = Tables::new()
        .with_category(Category::new("vp", "VP"))
        .with_definition(
            Definition::new("dragon", "Dragon", ValueKind::Number)
                .with_ownership(Ownership::PerPlayer)
                .with_score_impact("{Dragon} * 10")
                .with_impact_category("vp"),
        )
        .with_instance(Instance::new("dragon@p1", "dragon", Some(PlayerId::new("p1"))).with_value(2.0))
        .with_rule(rule("cap", total_at_least(30.0), RuleActionKind::Set, 30.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 35.0));

    let first = Engine::new().evaluate(&snapshot, at(1));
    let ids: Vec<_> = first.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["impact:dragon:1", "rule:cap:2"]);
    // The rule saw totals from before the impact.
    assert_eq!(first.entries[1].value, -5.0);
    assert_eq!(first.entries[0].category_id, Some(CategoryId::new("vp")));

    let next = first.apply(&snapshot);
    let second = Engine::new().evaluate(&next, at(2));
    assert_eq!(grand_total(&second, "p1"), Some(50.0));
}

#[test]
fn repeated_passes_reach_quiescence() {
    let tables = Tables::new()
        .with_category(Category::new("gold", "Gold").weighted(2.0))
        .with_category(Category::new("vp", "VP").with_formula("{Gold} + 1"))
        .with_rule(rule("cap", total_at_least(20.0), RuleActionKind::Set, 20.0));
    let mut snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1", "p2"]))
        .with_entry(entry("e1", "p1", 9.0).in_category("gold"))
        .with_entry(entry("e2", "p2", 2.0).in_category("gold"));
    let engine = Engine::new();

    let mut passes = 0;
    loop {
        let outcome = engine.evaluate(&snapshot, at(passes));
        if outcome.is_quiescent() {
            // Formulas read gold before its weight: p1 had 18 + 10.
            assert_eq!(grand_total(&outcome, "p1"), Some(20.0));
            assert_eq!(grand_total(&outcome, "p2"), Some(7.0));
            break;
        }
        snapshot = outcome.apply(&snapshot);
        passes += 1;
        assert!(passes < 5, "no quiescence after {passes} passes");
    }
    assert_eq!(passes, 1);
}
