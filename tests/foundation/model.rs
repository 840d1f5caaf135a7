//! Integration tests for the data model: tables, settings, rules, validation

use chrono::{DateTime, Utc};
use scorekeep_foundation::{
    Category, CategoryId, CategoryKey, Comparison, Definition, DefinitionId, ElementId, ElementQuantity,
    ElementSpec, Instance, PlayerId, RuleAction, RuleActionKind, ScoreEntry, SessionSettings, SetShape,
    SetValue, Snapshot, Tables, ValidationError, Value, ValueKind, quantity_from_input, validate_value,
};

// =============================================================================
// Tables
// =============================================================================

#[test]
fn names_resolve_case_insensitively_first_wins() {
    let tables = Tables::new()
        .with_category(Category::new("vp", "Victory Points"))
        .with_category(Category::new("vp2", "victory points"))
        .with_definition(Definition::new("dragon", "Dragon", ValueKind::Number));

    assert_eq!(
        tables.category_by_name("  VICTORY POINTS ").map(|c| c.id.as_str()),
        Some("vp")
    );
    assert!(tables.definition_by_name("dragon").is_some());
    assert!(tables.category_by_name("Dragon").is_none());
}

#[test]
fn tree_queries() {
    let tables = Tables::new()
        .with_category(Category::new("vp", "VP"))
        .with_category(Category::new("b", "B").with_parent("vp").with_sort_order(2))
        .with_category(Category::new("a", "A").with_parent("vp").with_sort_order(1))
        .with_category(Category::new("orphan", "Orphan").with_parent("missing"));

    let children: Vec<_> = tables
        .children_of(&CategoryId::new("vp"))
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(children, vec!["a", "b"]);

    let roots: Vec<_> = tables
        .categories()
        .into_iter()
        .filter(|c| tables.is_root(c))
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(roots, vec!["orphan", "vp"]);
}

#[test]
fn instances_are_indexed_by_scope() {
    let p1 = PlayerId::new("p1");
    let dragon = DefinitionId::new("dragon");
    let tables = Tables::new()
        .with_instance(Instance::new(Instance::id_for(&dragon, Some(&p1)), "dragon", Some(p1.clone())))
        .with_instance(Instance::new(Instance::id_for(&dragon, None), "dragon", None));

    assert_eq!(
        tables.instance_for(&dragon, Some(&p1)).map(|i| i.id.as_str()),
        Some("dragon@p1")
    );
    assert_eq!(
        tables.instance_for(&dragon, None).map(|i| i.id.as_str()),
        Some("dragon@global")
    );
    assert_eq!(tables.instances_of(&dragon).count(), 2);
}

#[test]
fn uncategorized_entries_use_the_sentinel_bucket() {
    let at = DateTime::<Utc>::UNIX_EPOCH;
    let plain = ScoreEntry::new("e1", "p1", 1.0, at);
    let booked = ScoreEntry::new("e2", "p1", 1.0, at).in_category("gold");
    assert_eq!(plain.bucket(), CategoryKey::Uncategorized);
    assert_eq!(booked.bucket(), CategoryKey::Category(CategoryId::new("gold")));
}

#[test]
fn snapshot_players_include_unseated() {
    let snapshot = Snapshot::new(Tables::new(), SessionSettings::with_players(["p1"]))
        .with_entry(ScoreEntry::new("e1", "p3", 2.0, DateTime::<Utc>::UNIX_EPOCH));
    assert_eq!(snapshot.players(), vec![PlayerId::new("p1"), PlayerId::new("p3")]);
}

// =============================================================================
// Settings and Rules
// =============================================================================

#[test]
fn rounds_are_numbered_from_zero() {
    let settings = SessionSettings::with_players(["p1"]).with_rounds(3).at_round("r3");
    assert_eq!(settings.current_round_index(), Some(2));
    let unknown = settings.clone().at_round("r9");
    assert_eq!(unknown.current_round_index(), None);
}

#[test]
fn comparisons_use_epsilon_for_equality() {
    assert!(Comparison::Eq.holds(50.0, 50.000_5, 0.001));
    assert!(!Comparison::Ne.holds(50.0, 50.000_5, 0.001));
    assert!(Comparison::Gte.holds(50.0, 50.0, 0.001));
    assert!(!Comparison::Lt.holds(50.0, 50.0, 0.001));
    assert_eq!(Comparison::Lte.symbol(), "<=");
}

#[test]
fn actions_produce_additive_deltas() {
    let action = |kind, amount| RuleAction {
        kind,
        amount,
        target_category_id: None,
    };
    assert_eq!(action(RuleActionKind::Set, 50.0).delta(63.0), -13.0);
    assert_eq!(action(RuleActionKind::Add, 5.0).delta(63.0), 5.0);
    assert_eq!(action(RuleActionKind::Multiply, 2.0).delta(10.0), 10.0);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn numbers_respect_bounds() {
    let hp = Definition::new("hp", "HP", ValueKind::Number).with_bounds(Some(0.0), Some(10.0));
    assert!(validate_value(&hp, &Value::Number(10.0)).is_ok());
    assert!(matches!(
        validate_value(&hp, &Value::Number(-1.0)),
        Err(ValidationError::BelowMin { .. })
    ));
    assert!(matches!(
        validate_value(&hp, &Value::Number(f64::INFINITY)),
        Err(ValidationError::NotFinite)
    ));
    assert!(matches!(
        validate_value(&hp, &Value::text("3")),
        Err(ValidationError::WrongKind { .. })
    ));
}

#[test]
fn sets_must_match_their_shape() {
    let treasure = Definition::new(
        "treasure",
        "Treasure",
        ValueKind::Set {
            shape: SetShape::Elements {
                elements: vec![ElementSpec::new("gold", "Gold")],
            },
        },
    );
    let gold = |quantity| ElementQuantity {
        element_id: ElementId::new("gold"),
        quantity,
    };

    assert!(validate_value(&treasure, &Value::Set(SetValue::Elements(vec![gold(2)]))).is_ok());
    assert_eq!(
        validate_value(&treasure, &Value::Set(SetValue::Count(2))),
        Err(ValidationError::WrongSetShape)
    );
    assert_eq!(
        validate_value(&treasure, &Value::Set(SetValue::Elements(vec![gold(1), gold(1)]))),
        Err(ValidationError::DuplicateElement(ElementId::new("gold")))
    );
}

#[test]
fn negative_quantities_are_rejected() {
    assert_eq!(quantity_from_input(3), Ok(3));
    assert_eq!(quantity_from_input(-1), Err(ValidationError::NegativeQuantity(-1)));
}
