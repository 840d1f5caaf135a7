//! Integration tests for formula evaluation
//!
//! Tests operator precedence, built-ins, and resolver-backed lookups.

use proptest::prelude::*;
use scorekeep_formula::{NoContext, StaticResolver, evaluate, evaluate_value};
use scorekeep_foundation::{ErrorKind, InstanceState, Value};

fn eval(source: &str) -> f64 {
    evaluate(source, &mut NoContext).unwrap()
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn precedence_and_grouping() {
    assert_eq!(eval("1 + 2 * 3"), 7.0);
    assert_eq!(eval("(1 + 2) * 3"), 9.0);
    assert_eq!(eval("10 - 4 - 3"), 3.0);
    assert_eq!(eval("12 / 3 / 2"), 2.0);
    assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
    assert_eq!(eval("-2 ^ 2"), -4.0);
    assert_eq!(eval("2 * -3"), -6.0);
}

#[test]
fn division_by_zero_is_not_an_error() {
    assert!(eval("1 / 0").is_infinite());
    assert!(eval("0 / 0").is_nan());
}

#[test]
fn comparisons_yield_booleans() {
    let value = |s| evaluate_value(s, &mut NoContext).unwrap();
    assert_eq!(value("3 > 2"), Value::Bool(true));
    assert_eq!(value("2 <= 1"), Value::Bool(false));
    assert_eq!(value("\"Red\" == \" red \""), Value::Bool(true));
    assert_eq!(value("1 != 1"), Value::Bool(false));
    // Booleans count as 0 or 1 in arithmetic.
    assert_eq!(eval("(3 > 2) + (1 > 2) + true"), 2.0);
}

// =============================================================================
// Built-ins
// =============================================================================

#[test]
fn aggregate_functions() {
    assert_eq!(eval("max(1, 7, 3)"), 7.0);
    assert_eq!(eval("min(4, -2)"), -2.0);
    assert_eq!(eval("sum()"), 0.0);
    assert_eq!(eval("sum(1, 2, 3)"), 6.0);
    assert_eq!(eval("avg(2, 4, 9)"), 5.0);
    assert_eq!(eval("abs(-3) + floor(2.7) + ceil(2.1)"), 8.0);
    assert_eq!(eval("MAX(1, 2)"), 2.0);
}

#[test]
fn rounding() {
    assert_eq!(eval("round(2.5)"), 3.0);
    assert_eq!(eval("round(3.14159, 2)"), 3.14);
    assert_eq!(evaluate("round()", &mut StaticResolver::new().at_round(4)).unwrap(), 4.0);
    assert_eq!(eval("round()"), 0.0);
    assert_eq!(evaluate("phase()", &mut StaticResolver::new().at_phase(2)).unwrap(), 2.0);
}

#[test]
fn conditionals_only_evaluate_the_taken_branch() {
    assert_eq!(eval("if(1 > 0, 10, 20)"), 10.0);
    assert_eq!(eval("if(0, 10, 20)"), 20.0);
    // The untaken branch would fail with an unknown function.
    assert_eq!(eval("if(true, 1, nope())"), 1.0);
}

#[test]
fn state_and_ownership() {
    let mut resolver = StaticResolver::new()
        .with_state("Dragon", InstanceState::Active)
        .with_state("Crown", InstanceState::Owned)
        .with_owner("Crown", "p1")
        .for_player("p1");

    let value = evaluate_value("state({Dragon})", &mut resolver).unwrap();
    assert_eq!(value, Value::text("active"));
    assert_eq!(
        evaluate_value("state(\"Wyvern\")", &mut resolver).unwrap(),
        Value::text("inactive")
    );
    assert_eq!(evaluate("if(state({Crown}) == \"owned\", 5, 0)", &mut resolver).unwrap(), 5.0);
    assert_eq!(evaluate("owns({Crown})", &mut resolver).unwrap(), 1.0);
    assert_eq!(evaluate("owns({Crown}, \"p2\")", &mut resolver).unwrap(), 0.0);
}

// =============================================================================
// References
// =============================================================================

#[test]
fn references_resolve_case_insensitively() {
    let mut resolver = StaticResolver::new().with("Victory Points", 12.0).with("Gold", 3.0);
    assert_eq!(evaluate("{victory points} + {GOLD} * 2", &mut resolver).unwrap(), 18.0);
}

#[test]
fn unknown_references_read_as_zero() {
    let mut resolver = StaticResolver::new().with("Gold", 3.0);
    assert_eq!(evaluate("{Gold} + {Silver}", &mut resolver).unwrap(), 3.0);
}

#[test]
fn text_that_is_not_numeric_does_not_coerce() {
    let err = evaluate("\"abc\" + 1", &mut NoContext).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(eval("\"4\" + 1"), 5.0);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn evaluation_errors() {
    let err = evaluate("frobnicate(1)", &mut NoContext).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(ref name) if name == "frobnicate"));

    let err = evaluate("abs(1, 2)", &mut NoContext).unwrap_err();
    assert!(err.is_evaluation());

    let err = evaluate("max(1,", &mut NoContext).unwrap_err();
    assert!(err.is_syntax());
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn linear_expressions_match_direct_computation(
        a in -1000i32..1000,
        b in -1000i32..1000,
        c in -1000i32..1000,
    ) {
        let (a, b, c) = (f64::from(a), f64::from(b), f64::from(c));
        let source = format!("{a} + {b} * {c} - ({a} - {c})");
        prop_assert_eq!(eval(&source), a + b * c - (a - c));
    }

    #[test]
    fn resolved_values_flow_through(gold in -1.0e6f64..1.0e6) {
        let mut resolver = StaticResolver::new().with("Gold", gold);
        prop_assert_eq!(evaluate("{Gold} * 2", &mut resolver).unwrap(), gold * 2.0);
    }
}
