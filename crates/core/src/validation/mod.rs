//! Form validation engine.
//!
//! Rule strings such as `type=number required min=4 max=17` are parsed once
//! into typed constraints, then evaluated against submitted form records by a
//! pure evaluator. Invalid data yields violations; invalid rule strings yield
//! a [`RuleError`] at construction time.

pub mod evaluator;
pub mod record;
pub mod rules;
pub mod schema;

pub use evaluator::{evaluate, validate};
pub use record::Record;
pub use rules::{
    Bound, Constraint, ConstraintKind, FieldRules, FieldType, FieldViolation, RuleError, RuleSet,
    ValidationResult,
};
pub use schema::FormSchemas;
