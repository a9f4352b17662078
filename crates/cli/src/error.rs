use std::io;
use std::path::PathBuf;

use whistle_core::error::CoreError;

/// Failures that stop a validation run. Invalid submissions are not errors;
/// they are counted in the run summary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Schema or form configuration problem from `whistle_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to read submissions: {0}")]
    Input(#[source] io::Error),

    #[error("Failed to write report: {0}")]
    Output(#[source] io::Error),

    #[error("Line {line}: invalid JSON: {source}")]
    Record {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Line {line}: submission is not a JSON object")]
    NotAnObject { line: usize },

    #[error("--form is required unless --list-forms is given")]
    MissingForm,
}
