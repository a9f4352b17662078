use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::CliError;

/// Command-line arguments. Every option can also come from the environment
/// (or a `.env` file, loaded before parsing).
///
/// | Flag             | Env Var                  | Default |
/// |------------------|--------------------------|---------|
/// | `--schema`       | `WHISTLE_SCHEMA`         | required|
/// | `--form`         | `WHISTLE_FORM`           | required|
/// | `--input`        | `WHISTLE_INPUT`          | stdin   |
/// | `--format`       | `WHISTLE_OUTPUT_FORMAT`  | `text`  |
/// | `--log-json`     | `WHISTLE_LOG_JSON`       | `false` |
#[derive(Debug, Parser)]
#[command(
    name = "whistle-validate",
    version,
    about = "Validate recorded report submissions against a form schema"
)]
pub struct Cli {
    /// JSON schema document holding the rule sets of every form.
    #[arg(long, env = "WHISTLE_SCHEMA", value_name = "PATH")]
    pub schema: PathBuf,

    /// Name of the form the submissions belong to.
    #[arg(long, env = "WHISTLE_FORM", required_unless_present = "list_forms")]
    pub form: Option<String>,

    /// JSON-lines file of submissions (one object per line). Reads stdin when omitted.
    #[arg(long, env = "WHISTLE_INPUT", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Report format written to stdout.
    #[arg(long, value_enum, env = "WHISTLE_OUTPUT_FORMAT", default_value = "text")]
    pub format: OutputFormat,

    /// Print the form names in the schema and exit.
    #[arg(long)]
    pub list_forms: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, env = "WHISTLE_LOG_JSON")]
    pub log_json: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `line <n>: <message>` per error, then a summary line.
    #[default]
    Text,
    /// One JSON object per submission.
    Json,
}

/// What a run should do once the schema is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    ListForms,
    Validate {
        form: String,
        input: Option<PathBuf>,
    },
}

/// Resolved run configuration, independent of how it was collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub schema_path: PathBuf,
    pub task: Task,
    pub format: OutputFormat,
}

impl TryFrom<Cli> for RunConfig {
    type Error = CliError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let task = if cli.list_forms {
            Task::ListForms
        } else {
            Task::Validate {
                form: cli.form.ok_or(CliError::MissingForm)?,
                input: cli.input,
            }
        };

        Ok(Self {
            schema_path: cli.schema,
            task,
            format: cli.format,
        })
    }
}
