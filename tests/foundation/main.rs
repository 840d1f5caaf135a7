//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value coercions, sets, validation, tables, and errors.

mod errors;
mod model;
mod values;
