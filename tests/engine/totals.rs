//! Category total scenarios

use scorekeep_engine::{Engine, EngineConfig};
use scorekeep_foundation::{
    Category, CategoryId, CategoryKey, Definition, ElementId, ElementQuantity, ElementSpec, Instance,
    PlayerId, SessionSettings, SetShape, SetValue, Snapshot, Tables, ValueKind,
};

use crate::entry;

fn category_total(snapshot: &Snapshot, engine: &Engine, player: &str, category: &str) -> f64 {
    engine.totals(snapshot)[&PlayerId::new(player)].category(&CategoryId::new(category))
}

#[test]
fn formulas_chain_through_other_categories() {
    let tables = Tables::new()
        .with_category(Category::new("territories", "Territories"))
        .with_category(Category::new("area", "Area").with_formula("{Territories} * 2"))
        .with_category(Category::new("bonus", "Bonus"))
        .with_category(Category::new("vp", "Victory Points").with_formula("{Area} + {Bonus}"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 3.0).in_category("territories"))
        .with_entry(entry("e2", "p1", 2.0).in_category("territories"))
        .with_entry(entry("e3", "p1", 1.0).in_category("bonus"));
    let engine = Engine::new();

    assert_eq!(category_total(&snapshot, &engine, "p1", "territories"), 5.0);
    assert_eq!(category_total(&snapshot, &engine, "p1", "area"), 10.0);
    assert_eq!(category_total(&snapshot, &engine, "p1", "vp"), 11.0);
}

#[test]
fn weights_apply_after_summing() {
    let tables = Tables::new().with_category(Category::new("gold", "Gold").weighted(2.0));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 1.5).in_category("gold"))
        .with_entry(entry("e2", "p1", 2.5).in_category("gold"));

    assert_eq!(category_total(&snapshot, &Engine::new(), "p1", "gold"), 8.0);
}

#[test]
fn sets_enter_formulas_as_their_total_quantity() {
    let treasure = Definition::new(
        "treasure",
        "Treasure",
        ValueKind::Set {
            shape: SetShape::Elements {
                elements: vec![ElementSpec::new("gold", "Gold"), ElementSpec::new("ruby", "Ruby")],
            },
        },
    );
    let hoard = SetValue::Elements(vec![
        ElementQuantity {
            element_id: ElementId::new("gold"),
            quantity: 2,
        },
        ElementQuantity {
            element_id: ElementId::new("ruby"),
            quantity: 1,
        },
    ]);
    let tables = Tables::new()
        .with_definition(treasure)
        .with_instance(Instance::new("treasure@global", "treasure", None).with_value(hoard))
        .with_category(Category::new("loot", "Loot").with_formula("{Treasure}"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]));

    assert_eq!(category_total(&snapshot, &Engine::new(), "p1", "loot"), 3.0);
}

#[test]
fn constant_formulas_need_no_entries() {
    let tables = Tables::new().with_category(Category::new("base", "Base").with_formula("5"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]));
    let totals = Engine::new().totals(&snapshot);
    assert_eq!(totals[&PlayerId::new("p1")].grand_total, 5.0);
}

#[test]
fn uncategorized_entries_count_toward_the_grand_total() {
    let tables = Tables::new().with_category(Category::new("vp", "VP"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1", "p2"]))
        .with_entry(entry("e1", "p1", 4.0).in_category("vp"))
        .with_entry(entry("e2", "p1", 3.0))
        .with_entry(entry("e3", "p2", 9.0));
    let totals = Engine::new().totals(&snapshot);

    let p1 = &totals[&PlayerId::new("p1")];
    assert_eq!(p1.get(&CategoryKey::Uncategorized), Some(3.0));
    assert_eq!(p1.grand_total, 7.0);
    assert_eq!(totals[&PlayerId::new("p2")].grand_total, 9.0);
}

#[test]
fn nested_trees_count_once_under_roots_only() {
    let tables = Tables::new()
        .with_category(Category::new("vp", "VP"))
        .with_category(Category::new("cities", "Cities").with_parent("vp"))
        .with_category(Category::new("roads", "Roads").with_parent("vp"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 4.0).in_category("cities"))
        .with_entry(entry("e2", "p1", 2.0).in_category("roads"))
        // Booked directly to a parent: ignored by the roll-up.
        .with_entry(entry("e3", "p1", 100.0).in_category("vp"));
    let p1 = PlayerId::new("p1");

    let flat = Engine::new().totals(&snapshot);
    assert_eq!(flat[&p1].category(&CategoryId::new("vp")), 6.0);
    assert_eq!(flat[&p1].grand_total, 12.0);

    let nested = Engine::with_config(EngineConfig::nested()).totals(&snapshot);
    assert_eq!(nested[&p1].grand_total, 6.0);
}

#[test]
fn failing_formulas_keep_the_rolled_up_total() {
    let tables = Tables::new()
        .with_category(Category::new("c", "C").with_formula("frobnicate()"))
        .with_category(Category::new("d", "D").with_formula("{D} + 1"));
    let snapshot = Snapshot::new(tables, SessionSettings::with_players(["p1"]))
        .with_entry(entry("e1", "p1", 2.0).in_category("c"));
    let engine = Engine::with_config(EngineConfig::quiet());
    let totals = engine.totals(&snapshot);
    let p1 = &totals[&PlayerId::new("p1")];

    assert_eq!(p1.category(&CategoryId::new("c")), 2.0);
    // A self-reference has no rolled-up total to fall back to.
    assert_eq!(p1.get(&CategoryKey::Category(CategoryId::new("d"))), None);
    assert_eq!(p1.grand_total, 2.0);
}
