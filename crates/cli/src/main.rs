use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use whistle_cli::config::{Cli, RunConfig};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // --- Tracing (stderr, so stdout carries only the report) ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "whistle_cli=info,whistle_validate=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    // --- Configuration ---
    let config = match RunConfig::try_from(cli) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(schema = %config.schema_path.display(), "Loaded configuration");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match whistle_cli::run(&config, &mut out) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::error!(error = %err, "Validation run failed");
            ExitCode::from(2)
        }
    }
}
