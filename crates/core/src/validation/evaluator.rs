//! Rule evaluator: pure logic, no I/O.
//!
//! Each field passes through two gates before its remaining constraints run:
//!
//! 1. presence: an absent or blank value fails `required`, or skips the field
//!    entirely when it is optional;
//! 2. type: a value that does not parse as the field's `type=` fails the type
//!    check and disables `min`/`max` for that field.
//!
//! Messages are then emitted in token order, the type failure included.

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use super::record::Record;
use super::rules::{
    parse_date, parse_number, Bound, Constraint, FieldRules, FieldType, FieldViolation, RuleSet,
    ValidationResult,
};

/// Evaluate every field of `rules` against `record`, in declaration order.
pub fn evaluate<R: Record + ?Sized>(record: &R, rules: &RuleSet) -> ValidationResult {
    let mut errors = Vec::new();

    for (field, field_rules) in rules.iter() {
        let raw = record.field(field);
        evaluate_field(field, field_rules, raw.as_deref(), &mut errors);
    }

    ValidationResult::from_violations(errors)
}

/// Validate `record` and return only the human-readable messages.
///
/// # Examples
///
/// ```
/// use whistle_core::validation::{validate, RuleSet};
///
/// let rules = RuleSet::parse([("age", "type=number required min=4 max=17")]).unwrap();
/// assert_eq!(validate(&[("age", "nine")], &rules), vec!["“age” must be a number"]);
/// assert!(validate(&[("age", "9")], &rules).is_empty());
/// ```
pub fn validate<R: Record + ?Sized>(record: &R, rules: &RuleSet) -> Vec<String> {
    evaluate(record, rules).into_messages()
}

/// A field value after the type gate.
enum Parsed {
    Text,
    Number(f64),
    Date(NaiveDate),
    /// The value failed its type check; bounds are not compared.
    Invalid,
}

fn evaluate_field(
    field: &str,
    rules: &FieldRules,
    raw: Option<&str>,
    errors: &mut Vec<FieldViolation>,
) {
    let value = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            if rules.is_required() {
                errors.push(violation(field, &Constraint::Required));
            }
            return;
        }
    };

    let parsed = match rules.field_type() {
        FieldType::Text => Parsed::Text,
        FieldType::Number => parse_number(value).map_or(Parsed::Invalid, Parsed::Number),
        FieldType::Date => parse_date(value).map_or(Parsed::Invalid, Parsed::Date),
    };

    // Messages follow token order; the type failure is reported where
    // `type=` was declared.
    for constraint in rules.constraints() {
        let violated = match constraint {
            Constraint::Required => false,
            Constraint::Type(_) => matches!(parsed, Parsed::Invalid),
            Constraint::Min(bound) => below(&parsed, bound),
            Constraint::Max(bound) => above(&parsed, bound),
            Constraint::MinLength(min) => char_length(value) < *min,
            Constraint::MaxLength(max) => char_length(value) > *max,
        };
        if violated {
            errors.push(violation(field, constraint));
        }
    }
}

fn below(parsed: &Parsed, bound: &Bound) -> bool {
    match (parsed, bound) {
        (Parsed::Number(n), Bound::Number { value, .. }) => n < value,
        (Parsed::Date(d), Bound::Date { value, .. }) => d < value,
        _ => false,
    }
}

fn above(parsed: &Parsed, bound: &Bound) -> bool {
    match (parsed, bound) {
        (Parsed::Number(n), Bound::Number { value, .. }) => n > value,
        (Parsed::Date(d), Bound::Date { value, .. }) => d > value,
        _ => false,
    }
}

/// Length in characters after NFC composition, so a decomposed `è` counts once.
fn char_length(value: &str) -> usize {
    value.nfc().count()
}

fn violation(field: &str, constraint: &Constraint) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        constraint: constraint.kind(),
        message: message(field, constraint),
    }
}

fn message(field: &str, constraint: &Constraint) -> String {
    match constraint {
        Constraint::Required => format!("“{field}” is required"),
        Constraint::Type(FieldType::Number) => format!("“{field}” must be a number"),
        Constraint::Type(FieldType::Date) => format!("“{field}” must be a valid date"),
        // Text values always pass the type gate, so this message is never emitted.
        Constraint::Type(FieldType::Text) => format!("“{field}” must be text"),
        Constraint::Min(bound) => {
            format!("“{field}” must have a minimum value of {}", bound.literal())
        }
        Constraint::Max(bound) => {
            format!("“{field}” must have a maximum value of {}", bound.literal())
        }
        Constraint::MinLength(n) => format!("“{field}” must have a minimum length of {n}"),
        Constraint::MaxLength(n) => format!("“{field}” must have a maximum length of {n}"),
    }
}
