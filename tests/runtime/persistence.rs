//! Templates on disk and snapshots through a full session

use chrono::{DateTime, Utc};
use scorekeep_engine::{Engine, materialize_instances, set_instance_value};
use scorekeep_foundation::{CategoryId, ErrorKind, InstanceId, PlayerId, ScoreEntry, SessionSettings, Snapshot, Value};
use scorekeep_runtime::{TemplateDocument, from_bytes, load_from_file, save_to_file, to_bytes};

use crate::{scratch, territories};

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap()
}

#[test]
fn templates_survive_disk_and_reexport_identically() {
    let path = scratch("template.json");
    let document = territories();
    document.save(&path).unwrap();

    let loaded = TemplateDocument::load(&path).unwrap();
    assert_eq!(loaded, document);
    assert_eq!(loaded.export().unwrap(), document.export().unwrap());
    assert!(loaded.check().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn session_state_survives_persistence() {
    let players = [PlayerId::new("p1"), PlayerId::new("p2")];
    let mut tables = territories().to_tables();
    for instance in materialize_instances(&tables, &players) {
        tables.insert_instance(instance);
    }
    set_instance_value(&mut tables, &InstanceId::new("fort@p1"), Value::Number(2.0)).unwrap();

    let snapshot = Snapshot::new(tables, SessionSettings::with_players(players.iter().cloned()))
        .with_entry(ScoreEntry::new("e1", "p1", 3.0, at(0)).in_category("territories"))
        .with_entry(ScoreEntry::new("e2", "p2", 25.0, at(0)).in_category("territories"));

    let engine = Engine::new();
    let session = engine.evaluate(&snapshot, at(1)).apply(&snapshot);

    let restored = from_bytes(&to_bytes(&session).unwrap()).unwrap();
    assert_eq!(restored, session);

    let path = scratch("session.msgpack");
    save_to_file(&session, &path).unwrap();
    let reloaded = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(reloaded, session);

    // The fort impact booked on pass one now counts; p2 was capped.
    let totals = engine.totals(&reloaded);
    let p1 = &totals[&PlayerId::new("p1")];
    assert_eq!(p1.category(&CategoryId::new("bonus")), 6.0);
    assert_eq!(p1.category(&CategoryId::new("vp")), 12.0);
    assert_eq!(totals[&PlayerId::new("p2")].grand_total, 40.0);
}

#[test]
fn corrupt_inputs_are_reported() {
    assert!(matches!(
        from_bytes(b"\xc1not msgpack").unwrap_err().kind,
        ErrorKind::Serialization(_)
    ));
    assert!(matches!(
        TemplateDocument::load(scratch("missing.json")).unwrap_err().kind,
        ErrorKind::Io(_)
    ));
}
