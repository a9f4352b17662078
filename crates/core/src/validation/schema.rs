//! Named form schemas.
//!
//! A schema document groups the rule sets of every form the application
//! accepts, keyed by form name:
//!
//! ```json
//! { "forms": { "report-details": { "reported": "type=date required min=2001-01-01" } } }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use super::rules::RuleSet;
use crate::error::CoreError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    forms: IndexMap<String, IndexMap<String, String>>,
}

/// Parsed rule sets for every form, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchemas {
    forms: IndexMap<String, RuleSet>,
}

impl FormSchemas {
    /// Parse a schema document. A bad rule string in any form fails the load.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let document: SchemaDocument = serde_json::from_str(json)?;

        let mut forms = IndexMap::with_capacity(document.forms.len());
        for (name, raw_rules) in document.forms {
            let rules = RuleSet::parse(raw_rules).map_err(|source| CoreError::InvalidForm {
                form: name.clone(),
                source,
            })?;
            forms.insert(name, rules);
        }

        Ok(Self { forms })
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.forms.get(name)
    }

    /// Like [`get`](Self::get), but a missing form is an error.
    pub fn require(&self, name: &str) -> Result<&RuleSet, CoreError> {
        self.get(name)
            .ok_or_else(|| CoreError::UnknownForm(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::validation::rules::{ConstraintKind, RuleError};
    use crate::validation::validate;

    const DOCUMENT: &str = r#"{
        "forms": {
            "report-details": {
                "reported": "type=date required min=2001-01-01",
                "summary": "required minlength=10"
            },
            "reporter": {
                "age": "type=number required min=4 max=17",
                "guardian": "required minlength=6"
            }
        }
    }"#;

    #[test]
    fn loads_forms_in_document_order() {
        let schemas = FormSchemas::from_json(DOCUMENT).unwrap();
        assert_eq!(schemas.len(), 2);
        let names: Vec<_> = schemas.names().collect();
        assert_eq!(names, vec!["report-details", "reporter"]);
    }

    #[test]
    fn forms_validate_records() {
        let schemas = FormSchemas::from_json(DOCUMENT).unwrap();
        let reporter = schemas.require("reporter").unwrap();
        assert_eq!(
            validate(&[("age", "nine"), ("guardian", "–")], reporter),
            vec![
                "“age” must be a number",
                "“guardian” must have a minimum length of 6",
            ]
        );
    }

    #[test]
    fn unknown_form_is_an_error() {
        let schemas = FormSchemas::from_json(DOCUMENT).unwrap();
        assert!(schemas.get("sms").is_none());
        assert_matches!(
            schemas.require("sms"),
            Err(CoreError::UnknownForm(name)) if name == "sms"
        );
    }

    #[test]
    fn bad_rule_names_its_form() {
        let err = FormSchemas::from_json(
            r#"{"forms": {"reporter": {"age": "type=number min"}}}"#,
        )
        .unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidForm {
                form,
                source: RuleError::MissingValue { key: ConstraintKind::Min, .. },
            } if form == "reporter"
        );
    }

    #[test]
    fn malformed_document_is_a_schema_error() {
        assert_matches!(
            FormSchemas::from_json(r#"{"forms": ["reporter"]}"#),
            Err(CoreError::Schema(_))
        );
        assert_matches!(
            FormSchemas::from_json(r#"{"forms": {}, "version": 2}"#),
            Err(CoreError::Schema(_))
        );
    }
}
