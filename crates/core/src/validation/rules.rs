//! Validation rule and result types.
//!
//! A field's rules are written as whitespace-separated tokens, either bare
//! keywords (`required`) or `key=value` pairs (`type=date`, `min=2001-01-01`,
//! `minlength=6`). [`FieldRules::parse`] turns them into [`Constraint`]s and
//! rejects anything it does not understand.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The value type a field is parsed as before bounds are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
}

impl FieldType {
    /// Stable string representation matching the `type=` token value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
        }
    }

    fn from_token(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of constraint a token or violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Required,
    Type,
    Min,
    Max,
    MinLength,
    MaxLength,
}

impl ConstraintKind {
    /// Stable string representation matching the rule token key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::Min => "min",
            Self::Max => "max",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "required" => Some(Self::Required),
            "type" => Some(Self::Type),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "minlength" => Some(Self::MinLength),
            "maxlength" => Some(Self::MaxLength),
            _ => None,
        }
    }

    fn takes_value(&self) -> bool {
        !matches!(self, Self::Required)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `min`/`max` bound.
///
/// The literal text from the rule is kept so messages echo it unchanged
/// (`min=2001-01-01` reports `2001-01-01`, not a reformatted date).
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Number { value: f64, literal: String },
    Date { value: NaiveDate, literal: String },
}

impl Bound {
    pub fn literal(&self) -> &str {
        match self {
            Self::Number { literal, .. } | Self::Date { literal, .. } => literal,
        }
    }
}

/// A single parsed constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Required,
    Type(FieldType),
    Min(Bound),
    Max(Bound),
    MinLength(usize),
    MaxLength(usize),
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Required => ConstraintKind::Required,
            Self::Type(_) => ConstraintKind::Type,
            Self::Min(_) => ConstraintKind::Min,
            Self::Max(_) => ConstraintKind::Max,
            Self::MinLength(_) => ConstraintKind::MinLength,
            Self::MaxLength(_) => ConstraintKind::MaxLength,
        }
    }
}

/// A malformed rule string. Always a schema-authoring bug, never bad input data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("field \"{field}\": unknown constraint \"{token}\"")]
    UnknownConstraint { field: String, token: String },

    #[error("field \"{field}\": \"{key}\" requires a value")]
    MissingValue { field: String, key: ConstraintKind },

    #[error("field \"{field}\": \"{key}\" does not take a value")]
    UnexpectedValue { field: String, key: ConstraintKind },

    #[error("field \"{field}\": unknown type \"{value}\"")]
    UnknownType { field: String, value: String },

    #[error("field \"{field}\": invalid {key} value \"{value}\" for a {field_type} field")]
    InvalidBound {
        field: String,
        key: ConstraintKind,
        value: String,
        field_type: FieldType,
    },

    #[error("field \"{field}\": \"{key}\" is not supported on a {field_type} field")]
    UnsupportedConstraint {
        field: String,
        key: ConstraintKind,
        field_type: FieldType,
    },

    #[error("field \"{field}\": \"{key}\" given more than once")]
    DuplicateConstraint { field: String, key: ConstraintKind },

    #[error("field \"{field}\" declared more than once")]
    DuplicateField { field: String },
}

/// One token split into its key and optional value.
struct Token<'a> {
    kind: ConstraintKind,
    value: Option<&'a str>,
}

impl<'a> Token<'a> {
    fn split(field: &str, raw: &'a str) -> Result<Self, RuleError> {
        let (key, value) = match raw.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (raw, None),
        };

        let kind = ConstraintKind::from_key(key).ok_or_else(|| RuleError::UnknownConstraint {
            field: field.to_string(),
            token: raw.to_string(),
        })?;

        match (kind.takes_value(), value) {
            (false, Some(_)) => Err(RuleError::UnexpectedValue {
                field: field.to_string(),
                key: kind,
            }),
            (true, None) | (true, Some("")) => Err(RuleError::MissingValue {
                field: field.to_string(),
                key: kind,
            }),
            _ => Ok(Self { kind, value }),
        }
    }

    fn value(&self) -> &'a str {
        self.value.unwrap_or_default()
    }
}

/// The parsed constraints of one field, in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    constraints: Vec<Constraint>,
    field_type: FieldType,
}

impl FieldRules {
    /// Parse a rule string for `field`.
    ///
    /// `type=` may appear anywhere in the string; `min`/`max` bounds are read
    /// as numbers or ISO dates according to it. Bounds on a text field are
    /// rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use whistle_core::validation::{FieldRules, FieldType};
    ///
    /// let rules = FieldRules::parse("age", "type=number required min=4 max=17").unwrap();
    /// assert!(rules.is_required());
    /// assert_eq!(rules.field_type(), FieldType::Number);
    /// assert!(FieldRules::parse("age", "min=4").is_err());
    /// ```
    pub fn parse(field: &str, spec: &str) -> Result<Self, RuleError> {
        let tokens = spec
            .split_whitespace()
            .map(|raw| Token::split(field, raw))
            .collect::<Result<Vec<_>, _>>()?;

        // First pass: reject duplicates and settle the field type, so bounds
        // declared before `type=` are still read correctly.
        let mut seen: Vec<ConstraintKind> = Vec::with_capacity(tokens.len());
        let mut field_type = FieldType::Text;
        for token in &tokens {
            if seen.contains(&token.kind) {
                return Err(RuleError::DuplicateConstraint {
                    field: field.to_string(),
                    key: token.kind,
                });
            }
            seen.push(token.kind);

            if token.kind == ConstraintKind::Type {
                field_type =
                    FieldType::from_token(token.value()).ok_or_else(|| RuleError::UnknownType {
                        field: field.to_string(),
                        value: token.value().to_string(),
                    })?;
            }
        }

        let constraints = tokens
            .iter()
            .map(|token| build_constraint(field, field_type, token))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            constraints,
            field_type,
        })
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required))
    }
}

fn build_constraint(
    field: &str,
    field_type: FieldType,
    token: &Token<'_>,
) -> Result<Constraint, RuleError> {
    let invalid = || RuleError::InvalidBound {
        field: field.to_string(),
        key: token.kind,
        value: token.value().to_string(),
        field_type,
    };

    match token.kind {
        ConstraintKind::Required => Ok(Constraint::Required),
        ConstraintKind::Type => Ok(Constraint::Type(field_type)),
        ConstraintKind::Min | ConstraintKind::Max => {
            let bound = parse_bound(field, field_type, token)?.ok_or_else(invalid)?;
            Ok(if token.kind == ConstraintKind::Min {
                Constraint::Min(bound)
            } else {
                Constraint::Max(bound)
            })
        }
        ConstraintKind::MinLength | ConstraintKind::MaxLength => {
            let length: usize = token.value().parse().map_err(|_| invalid())?;
            Ok(if token.kind == ConstraintKind::MinLength {
                Constraint::MinLength(length)
            } else {
                Constraint::MaxLength(length)
            })
        }
    }
}

/// `Ok(None)` means the bound text did not parse for the field type.
fn parse_bound(
    field: &str,
    field_type: FieldType,
    token: &Token<'_>,
) -> Result<Option<Bound>, RuleError> {
    let literal = token.value();
    match field_type {
        FieldType::Text => Err(RuleError::UnsupportedConstraint {
            field: field.to_string(),
            key: token.kind,
            field_type,
        }),
        FieldType::Number => Ok(parse_number(literal).map(|value| Bound::Number {
            value,
            literal: literal.to_string(),
        })),
        FieldType::Date => Ok(parse_date(literal).map(|value| Bound::Date {
            value,
            literal: literal.to_string(),
        })),
    }
}

/// Parse a finite decimal number, ignoring surrounding whitespace.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Parse a calendar-valid `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let iso_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !iso_shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Field name → rules, evaluated in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<String, String>")]
pub struct RuleSet {
    fields: IndexMap<String, FieldRules>,
}

impl RuleSet {
    /// Build a rule set from `(field, rule string)` pairs, keeping their order.
    pub fn parse<I, K, V>(pairs: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut fields = IndexMap::new();
        for (field, spec) in pairs {
            let field = field.into();
            let rules = FieldRules::parse(&field, spec.as_ref())?;
            if fields.contains_key(&field) {
                return Err(RuleError::DuplicateField { field });
            }
            fields.insert(field, rules);
        }
        Ok(Self { fields })
    }

    /// Parse a JSON object of `field → rule string`. Key order is kept.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let raw: IndexMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::parse(raw)?)
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<IndexMap<String, String>> for RuleSet {
    type Error = RuleError;

    fn try_from(raw: IndexMap<String, String>) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

/// Aggregated result of evaluating a rule set against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationResult {
    pub fn from_violations(errors: Vec<FieldViolation>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Human-readable messages, in evaluation order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|v| v.message.clone()).collect()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.errors.into_iter().map(|v| v.message).collect()
    }

    /// Violations reported for a single field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldViolation> {
        self.errors.iter().filter(move |v| v.field == field)
    }
}

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub constraint: ConstraintKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_tokens_in_declared_order() {
        let rules = FieldRules::parse("age", "type=number required min=4 max=17").unwrap();
        let kinds: Vec<_> = rules.constraints().iter().map(Constraint::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::Type,
                ConstraintKind::Required,
                ConstraintKind::Min,
                ConstraintKind::Max,
            ]
        );
        assert_eq!(rules.field_type(), FieldType::Number);
        assert!(rules.is_required());
    }

    #[test]
    fn bound_before_type_uses_declared_type() {
        let rules = FieldRules::parse("reported", "min=2001-01-01 type=date").unwrap();
        assert_matches!(
            &rules.constraints()[0],
            Constraint::Min(Bound::Date { literal, .. }) if literal == "2001-01-01"
        );
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        let rules = FieldRules::parse("name", "  required \t minlength=2  ").unwrap();
        assert_eq!(rules.constraints().len(), 2);
    }

    #[test]
    fn empty_spec_has_no_constraints() {
        let rules = FieldRules::parse("notes", "").unwrap();
        assert!(rules.constraints().is_empty());
        assert_eq!(rules.field_type(), FieldType::Text);
    }

    #[test]
    fn rejects_unknown_keyword() {
        let err = FieldRules::parse("age", "mandatory").unwrap_err();
        assert_matches!(err, RuleError::UnknownConstraint { token, .. } if token == "mandatory");
    }

    #[test]
    fn rejects_unknown_key() {
        let err = FieldRules::parse("age", "type=number step=2").unwrap_err();
        assert_matches!(err, RuleError::UnknownConstraint { token, .. } if token == "step=2");
    }

    #[test]
    fn rejects_missing_value() {
        assert_matches!(
            FieldRules::parse("age", "type=number min").unwrap_err(),
            RuleError::MissingValue { key: ConstraintKind::Min, .. }
        );
        assert_matches!(
            FieldRules::parse("age", "type=").unwrap_err(),
            RuleError::MissingValue { key: ConstraintKind::Type, .. }
        );
    }

    #[test]
    fn rejects_value_on_required() {
        assert_matches!(
            FieldRules::parse("age", "required=true").unwrap_err(),
            RuleError::UnexpectedValue { key: ConstraintKind::Required, .. }
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert_matches!(
            FieldRules::parse("age", "type=integer").unwrap_err(),
            RuleError::UnknownType { value, .. } if value == "integer"
        );
    }

    #[test]
    fn rejects_bounds_on_text_fields() {
        assert_matches!(
            FieldRules::parse("name", "required min=4").unwrap_err(),
            RuleError::UnsupportedConstraint {
                key: ConstraintKind::Min,
                field_type: FieldType::Text,
                ..
            }
        );
    }

    #[test]
    fn rejects_unparseable_bounds() {
        assert_matches!(
            FieldRules::parse("age", "type=number min=four").unwrap_err(),
            RuleError::InvalidBound { key: ConstraintKind::Min, .. }
        );
        assert_matches!(
            FieldRules::parse("reported", "type=date min=2001-02-30").unwrap_err(),
            RuleError::InvalidBound { field_type: FieldType::Date, .. }
        );
        assert_matches!(
            FieldRules::parse("name", "minlength=-1").unwrap_err(),
            RuleError::InvalidBound { key: ConstraintKind::MinLength, .. }
        );
    }

    #[test]
    fn rejects_duplicate_constraints() {
        assert_matches!(
            FieldRules::parse("age", "type=number type=date").unwrap_err(),
            RuleError::DuplicateConstraint { key: ConstraintKind::Type, .. }
        );
    }

    #[test]
    fn rule_set_keeps_declaration_order() {
        let set = RuleSet::parse([
            ("zeta", "required"),
            ("alpha", "type=number"),
            ("mid", "minlength=3"),
        ])
        .unwrap();
        let names: Vec<_> = set.field_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rule_set_rejects_duplicate_fields() {
        let err = RuleSet::parse([("age", "required"), ("age", "type=number")]).unwrap_err();
        assert_eq!(
            err,
            RuleError::DuplicateField {
                field: "age".to_string()
            }
        );
    }

    #[test]
    fn rule_set_from_json_keeps_document_order() {
        let set = RuleSet::from_json(r#"{"b": "required", "a": "type=date min=2001-01-01"}"#)
            .unwrap();
        let names: Vec<_> = set.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.get("a").unwrap().field_type(), FieldType::Date);
    }

    #[test]
    fn rule_set_from_json_reports_bad_rules_as_configuration_errors() {
        let err = RuleSet::from_json(r#"{"age": "type=number min"}"#).unwrap_err();
        assert_matches!(err, CoreError::Configuration(RuleError::MissingValue { .. }));
    }

    #[test]
    fn rule_set_deserializes_in_document_order() {
        let set: RuleSet =
            serde_json::from_str(r#"{"b": "required", "a": "type=number min=4"}"#).unwrap();
        let names: Vec<_> = set.field_names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.get("a").unwrap().field_type(), FieldType::Number);
    }

    #[test]
    fn rule_set_deserialization_rejects_bad_rules() {
        let err = serde_json::from_str::<RuleSet>(r#"{"b": "required", "a": "type=number min"}"#)
            .unwrap_err();
        assert!(
            err.to_string().contains("field \"a\": \"min\" requires a value"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn error_messages_name_field_and_token() {
        let err = FieldRules::parse("age", "type=number min=four").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field \"age\": invalid min value \"four\" for a number field"
        );
    }

    #[test]
    fn number_parsing_rejects_non_finite_values() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("nine"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn date_parsing_requires_iso_calendar_dates() {
        assert_eq!(
            parse_date("2001-01-01"),
            NaiveDate::from_ymd_opt(2001, 1, 1)
        );
        assert_eq!(parse_date("2001-1-1"), None);
        assert_eq!(parse_date("2001-02-30"), None);
        assert_eq!(parse_date("01/01/2001"), None);
    }
}
