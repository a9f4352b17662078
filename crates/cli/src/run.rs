use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use whistle_core::validation::{evaluate, FormSchemas, RuleSet, ValidationResult};

use crate::config::{OutputFormat, RunConfig, Task};
use crate::error::CliError;

/// Counts for one validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub checked: usize,
    pub invalid: usize,
}

impl Summary {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Listed,
    Validated(Summary),
}

impl Outcome {
    /// Process exit code: `0` when everything checked was valid, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Listed => 0,
            Self::Validated(summary) if summary.all_valid() => 0,
            Self::Validated(_) => 1,
        }
    }
}

/// Report line for one submission in JSON output.
#[derive(Debug, Serialize)]
struct SubmissionReport<'a> {
    line: usize,
    valid: bool,
    errors: Vec<&'a str>,
}

/// Execute `config`, writing the report to `out`.
pub fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<Outcome, CliError> {
    let schemas = load_schemas(&config.schema_path)?;

    match &config.task {
        Task::ListForms => {
            for name in schemas.names() {
                writeln!(out, "{name}").map_err(CliError::Output)?;
            }
            Ok(Outcome::Listed)
        }
        Task::Validate { form, input } => {
            let rules = schemas.require(form)?;
            tracing::info!(form = %form, fields = rules.len(), "Validating submissions");

            let summary = match input {
                Some(path) => {
                    let file = File::open(path).map_err(|source| CliError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    validate_stream(rules, BufReader::new(file), out, config.format)?
                }
                None => validate_stream(rules, io::stdin().lock(), out, config.format)?,
            };

            tracing::info!(
                checked = summary.checked,
                invalid = summary.invalid,
                "Validation finished"
            );
            Ok(Outcome::Validated(summary))
        }
    }
}

/// Read and parse a schema document from disk.
pub fn load_schemas(path: &Path) -> Result<FormSchemas, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schemas = FormSchemas::from_json(&text)?;
    tracing::info!(path = %path.display(), forms = schemas.len(), "Loaded form schemas");
    Ok(schemas)
}

/// Validate every submission in `input` (one JSON object per line) against
/// `rules`. Blank lines are skipped; line numbers in the report are 1-based.
///
/// Submission values are never logged; only line numbers and counts are.
pub fn validate_stream<R: BufRead, W: Write>(
    rules: &RuleSet,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<Summary, CliError> {
    let mut summary = Summary::default();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(CliError::Input)?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line).map_err(|source| CliError::Record {
            line: line_no,
            source,
        })?;
        let Value::Object(record) = value else {
            return Err(CliError::NotAnObject { line: line_no });
        };

        let result = evaluate(&record, rules);
        summary.checked += 1;
        if !result.is_valid {
            summary.invalid += 1;
            tracing::debug!(
                line = line_no,
                violations = result.errors.len(),
                "Submission failed validation"
            );
        }

        write_result(out, format, line_no, &result).map_err(CliError::Output)?;
    }

    if format == OutputFormat::Text {
        writeln!(
            out,
            "{} checked, {} invalid",
            summary.checked, summary.invalid
        )
        .map_err(CliError::Output)?;
    }

    Ok(summary)
}

fn write_result<W: Write>(
    out: &mut W,
    format: OutputFormat,
    line: usize,
    result: &ValidationResult,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for violation in &result.errors {
                writeln!(out, "line {line}: {}", violation.message)?;
            }
        }
        OutputFormat::Json => {
            let report = SubmissionReport {
                line,
                valid: result.is_valid,
                errors: result.errors.iter().map(|v| v.message.as_str()).collect(),
            };
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
