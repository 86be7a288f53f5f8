//! aim CLI
//!
//! Citation metadata and input field tooling for AI weather models.

use std::process::ExitCode;

use aim_cli::cli::{CitationAction, Cli, Command, InputAction};
use aim_cli::commands::{citation, input};
use aim_cli::config::{AimConfig, log_filter};
use aim_cli::config_handlers::handle_config_command;
use aim_core::ConfigManager;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AimConfig::load(cli.config.as_deref())?;

    let default_filter = log_filter(cli.verbose, &config.logging);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "Starting aim");

    match cli.command {
        Command::Citation { action } => match action {
            CitationAction::Validate {
                paths,
                json,
                schema_only,
            } => {
                let valid =
                    citation::cmd_citation_validate(paths, json, schema_only, &config.citation)
                        .await?;
                if !valid {
                    return Ok(ExitCode::FAILURE);
                }
            }
            CitationAction::Show { path, format } => {
                citation::cmd_citation_show(path.as_deref(), format, &config.citation)?;
            }
        },
        Command::Input { action } => match action {
            InputAction::List => input::cmd_input_list(),
            InputAction::Inspect { opts } => input::cmd_input_inspect(opts, &config.inputs)?,
            InputAction::Derive {
                opts,
                output,
                output_kind,
            } => input::cmd_input_derive(opts, output, output_kind, &config.inputs)?,
        },
        Command::Config { action } => handle_config_command(cli.config.as_deref(), action)?,
    }

    Ok(ExitCode::SUCCESS)
}
