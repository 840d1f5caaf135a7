//! Object context scenarios: ownership, windows, calculations, writes

use scorekeep_engine::{
    Engine, EngineConfig, EvaluationContext, Owner, derive_state, materialize_instances,
    resolve_owner, set_instance_value,
};
use scorekeep_foundation::{
    ActiveWindow, Category, Definition, ErrorKind, Instance, InstanceId, InstanceState, Ownership,
    PlayerId, RoundBinding, SessionSettings, Snapshot, Tables, Value, ValueKind,
};

use crate::{at, entry};

fn session_tables() -> Tables {
    Tables::new()
        .with_category(Category::new("gold", "Gold"))
        .with_definition(
            Definition::new("crown", "Crown", ValueKind::Boolean)
                .with_ownership(Ownership::PerPlayer)
                .with_default(false),
        )
        .with_definition(
            Definition::new("scepter", "Scepter", ValueKind::Number)
                .with_ownership(Ownership::RefersTo("crown".into()))
                .with_default(1.0),
        )
        .with_definition(
            Definition::new("wealth", "Wealth", ValueKind::Number)
                .with_ownership(Ownership::PerPlayer)
                .with_default(0.0)
                .with_calculation("{Gold} * 2"),
        )
        .with_definition(
            Definition::new("market", "Market", ValueKind::Number)
                .with_window(ActiveWindow::BoundToRound(RoundBinding::Id("r2".into())))
                .with_default(1.0),
        )
}

fn materialized(tables: Tables, players: &[PlayerId]) -> Tables {
    materialize_instances(&tables, players)
        .into_iter()
        .fold(tables, Tables::with_instance)
}

// =============================================================================
// Materialization and writes
// =============================================================================

#[test]
fn materialization_fills_missing_scopes_once() {
    let players = [PlayerId::new("p1"), PlayerId::new("p2")];
    let tables = materialized(session_tables(), &players);

    // Three per-player definitions and one global.
    assert_eq!(tables.instances().count(), 7);
    assert!(tables.instance(&InstanceId::new("market@global")).is_some());
    assert!(materialize_instances(&tables, &players).is_empty());
}

#[test]
fn writes_are_validated() {
    let mut tables = materialized(session_tables(), &[PlayerId::new("p1")]);
    let crown = InstanceId::new("crown@p1");

    set_instance_value(&mut tables, &crown, Value::Bool(true)).unwrap();
    assert_eq!(tables.instance(&crown).and_then(|i| i.value.clone()), Some(Value::Bool(true)));

    let err = set_instance_value(&mut tables, &crown, Value::Number(1.0)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation(_)));

    let err = set_instance_value(&mut tables, &InstanceId::new("nope"), Value::Number(1.0)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
}

// =============================================================================
// Ownership and windows
// =============================================================================

#[test]
fn refers_to_follows_the_referenced_owner() {
    let p1 = PlayerId::new("p1");
    let config = EngineConfig::default();
    let settings = SessionSettings::with_players(["p1"]);
    let mut tables = materialized(session_tables(), std::slice::from_ref(&p1));
    let scepter = tables.definition(&"scepter".into()).cloned().unwrap();

    // The crown has a value, so it is owned, and the scepter follows it.
    let ctx = EvaluationContext::new(&tables, &settings, &config).for_player(Some(&p1));
    assert_eq!(resolve_owner(&ctx, &scepter), Owner::Player(p1.clone()));
    assert_eq!(derive_state(&ctx, &scepter), InstanceState::Owned);

    // Pinning the crown inactive takes the scepter out of play.
    let pinned = tables
        .instance(&InstanceId::new("crown@p1"))
        .cloned()
        .unwrap()
        .with_state(InstanceState::Inactive);
    tables.insert_instance(pinned);
    let ctx = EvaluationContext::new(&tables, &settings, &config).for_player(Some(&p1));
    assert_eq!(resolve_owner(&ctx, &scepter), Owner::Inactive);
    assert_eq!(derive_state(&ctx, &scepter), InstanceState::Inactive);
}

#[test]
fn round_windows_follow_the_current_round() {
    let config = EngineConfig::default();
    let tables = materialized(session_tables(), &[]);
    let market = tables.definition(&"market".into()).cloned().unwrap();

    let early = SessionSettings::with_players(["p1"]).with_rounds(3).at_round("r1");
    let ctx = EvaluationContext::new(&tables, &early, &config);
    assert_eq!(derive_state(&ctx, &market), InstanceState::Inactive);

    let later = early.clone().at_round("r2");
    let ctx = EvaluationContext::new(&tables, &later, &config);
    assert_eq!(derive_state(&ctx, &market), InstanceState::Active);
}

// =============================================================================
// Calculations in a pass
// =============================================================================

#[test]
fn calculations_read_category_totals_and_are_stamped() {
    let players = [PlayerId::new("p1")];
    let tables = materialized(session_tables(), &players);
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 4.0).in_category("gold"));

    let outcome = Engine::new().evaluate(&snapshot, at(7));
    let wealth = outcome
        .instances
        .iter()
        .find(|i| i.id.as_str() == "wealth@p1")
        .unwrap();
    assert_eq!(wealth.computed_value, Some(8.0));
    assert_eq!(wealth.last_computed_at, Some(at(7)));
    assert_eq!(wealth.derived_state, Some(InstanceState::Owned));

    // Applying the pass makes the next one report no instance changes.
    let next = outcome.apply(&snapshot);
    let again = Engine::new().evaluate(&next, at(7));
    assert!(again.instances.is_empty());
}

#[test]
fn values_without_instances_are_inactive() {
    let p1 = PlayerId::new("p1");
    let config = EngineConfig::default();
    let settings = SessionSettings::with_players(["p1"]);
    let tables = session_tables();
    let crown = tables.definition(&"crown".into()).cloned().unwrap();
    let ctx = EvaluationContext::new(&tables, &settings, &config).for_player(Some(&p1));
    assert_eq!(derive_state(&ctx, &crown), InstanceState::Inactive);

    let tables = tables.with_instance(Instance::new("crown@p1", "crown", Some(p1.clone())).with_value(true));
    let ctx = EvaluationContext::new(&tables, &settings, &config).for_player(Some(&p1));
    assert_eq!(derive_state(&ctx, &crown), InstanceState::Owned);
}
