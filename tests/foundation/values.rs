//! Integration tests for Value coercions and set values

use proptest::prelude::*;
use scorekeep_foundation::{
    ElementId, ElementQuantity, ElementSpec, ErrorKind, SetShape, SetValue, Type, Value,
};

// =============================================================================
// Coercions
// =============================================================================

#[test]
fn numbers_pass_through() {
    assert_eq!(Value::Number(-2.5).to_number().unwrap(), -2.5);
    assert_eq!(Value::from(3.0).value_type(), Type::Number);
}

#[test]
fn booleans_are_zero_or_one() {
    assert_eq!(Value::Bool(true).to_number().unwrap(), 1.0);
    assert_eq!(Value::Bool(false).to_number().unwrap(), 0.0);
}

#[test]
fn state_words_coerce() {
    for (text, expected) in [("owned", 1.0), ("Active", 1.0), ("inactive", 0.0), (" 7 ", 7.0)] {
        assert_eq!(Value::text(text).to_number().unwrap(), expected, "{text}");
    }
    let err = Value::text("castle").to_number().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn sets_coerce_to_their_total() {
    let treasure = Value::Set(SetValue::Elements(vec![
        ElementQuantity {
            element_id: ElementId::new("gold"),
            quantity: 2,
        },
        ElementQuantity {
            element_id: ElementId::new("ruby"),
            quantity: 1,
        },
    ]));
    assert_eq!(treasure.to_number().unwrap(), 3.0);
    assert_eq!(Value::Set(SetValue::Count(4)).to_number().unwrap(), 4.0);
    assert!(treasure.is_truthy());
    assert!(!Value::Set(SetValue::Count(0)).is_truthy());
}

#[test]
fn display_forms() {
    assert_eq!(Value::Number(5.0).to_string(), "5");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::text("owned").to_string(), "\"owned\"");
    assert_eq!(Value::Set(SetValue::Count(2)).to_string(), "#{2}");
}

// =============================================================================
// Set Operations
// =============================================================================

fn treasure() -> SetShape {
    SetShape::Elements {
        elements: vec![ElementSpec::new("gold", "Gold"), ElementSpec::new("ruby", "Ruby")],
    }
}

#[test]
fn elements_adjust_and_drop_at_zero() {
    let shape = treasure();
    let gold = ElementId::new("gold");
    let ruby = ElementId::new("ruby");
    let mut set = SetValue::empty(&shape);

    set.add_element(&shape, &gold, 2).unwrap();
    set.add_element(&shape, &ruby, 1).unwrap();
    assert_eq!(set.total(), 3);

    set.remove_element(&shape, &ruby, 5).unwrap();
    assert_eq!(set.quantity_of(&ruby), 0);
    assert_eq!(set, SetValue::Elements(vec![ElementQuantity {
        element_id: gold,
        quantity: 2,
    }]));

    assert!(set.add_element(&shape, &ElementId::new("opal"), 1).is_err());
}

#[test]
fn identical_sets_reject_element_operations() {
    let mut count = SetValue::empty(&SetShape::Identical);
    assert!(count.add_element(&treasure(), &ElementId::new("gold"), 1).is_err());
    count.increment(2).unwrap();
    assert_eq!(count, SetValue::Count(2));
}

proptest! {
    #[test]
    fn identical_count_never_goes_below_zero(
        start in 0u64..1_000,
        ops in prop::collection::vec((any::<bool>(), 0u64..500), 0..30),
    ) {
        let mut set = SetValue::Count(start);
        let mut model: i128 = i128::from(start);
        for (add, by) in ops {
            if add {
                set.increment(by).unwrap();
                model += i128::from(by);
            } else {
                set.decrement(by).unwrap();
                model = (model - i128::from(by)).max(0);
            }
            prop_assert_eq!(i128::from(set.total()), model);
        }
    }
}
