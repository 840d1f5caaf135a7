//! Integration tests for Error types
//!
//! Tests error construction, display, and classification.

use scorekeep_foundation::{Error, ErrorContext, ErrorKind, Type, ValidationError};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn syntax_errors_carry_position() {
    let err = Error::syntax("expected ')'", 1, 7, "max(1, 2".to_string());
    assert!(err.is_syntax());
    assert!(!err.is_evaluation());
    assert_eq!(err.to_string(), "syntax error at 1:7: expected ')'");
}

#[test]
fn evaluation_errors() {
    let cases = [
        Error::unknown_function("frobnicate"),
        Error::arity_mismatch("round", "0 to 2", 3),
        Error::type_mismatch(Type::Number, Type::Text),
        Error::reference_cycle("Victory Points"),
        Error::depth_exceeded(64),
    ];
    for err in &cases {
        assert!(err.is_evaluation(), "{err}");
    }
    assert!(cases[0].to_string().contains("frobnicate"));
    assert!(cases[1].to_string().contains("expected 0 to 2, got 3"));
    assert_eq!(cases[2].to_string(), "type mismatch: expected number, got text");
    assert!(cases[3].to_string().contains("Victory Points"));
    assert!(cases[4].to_string().contains("64"));
}

#[test]
fn validation_errors_convert() {
    let err: Error = ValidationError::NotFinite.into();
    assert!(matches!(err.kind, ErrorKind::Validation(ValidationError::NotFinite)));
    assert_eq!(err.to_string(), "invalid value: number must be finite");
}

#[test]
fn context_is_attached() {
    let err = Error::reference_cycle("A").with_context(
        ErrorContext::new()
            .with_source("category A")
            .with_formula("{B} + 1")
            .with_frame("B"),
    );
    let context = err.context.unwrap();
    assert_eq!(context.source.as_deref(), Some("category A"));
    assert_eq!(context.formula.as_deref(), Some("{B} + 1"));
    assert_eq!(context.stack, vec!["B".to_string()]);
}
