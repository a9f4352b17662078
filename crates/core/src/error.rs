use crate::validation::rules::RuleError;

/// Configuration-level failures raised while building rule sets and schemas.
///
/// Invalid form *data* never produces a `CoreError`; it is reported as
/// violations in a [`ValidationResult`](crate::validation::ValidationResult).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid rule configuration: {0}")]
    Configuration(#[from] RuleError),

    #[error("Invalid schema document: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Invalid rules in form \"{form}\": {source}")]
    InvalidForm { form: String, source: RuleError },

    #[error("Unknown form: {0}")]
    UnknownForm(String),
}
