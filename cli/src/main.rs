// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Vigil CLI
//!
//! The `vigil` binary runs the alert triage HTTP service and manages its
//! configuration.
//!
//! ## Commands
//!
//! - `vigil serve` - Run the HTTP API in the foreground
//! - `vigil config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use vigil_cli::commands::{self, ConfigCommand, ServeArgs};
use vigil_core::domain::service_config::ServiceConfigManifest;

/// Vigil - security event ingestion and alert triage
#[derive(Parser)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "VIGIL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides config)
    #[arg(long, global = true, env = "VIGIL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: text or json (overrides config)
    #[arg(long, global = true, env = "VIGIL_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { args }) => {
            let config = ServiceConfigManifest::load_or_default(cli.config.clone())
                .context("Failed to load configuration")?;
            let logging = &config.spec.observability.logging;
            init_logging(
                cli.log_level.as_deref().unwrap_or(&logging.level),
                cli.log_format.as_deref().unwrap_or(&logging.format),
            )?;
            commands::serve::handle_command(args, config).await
        }
        Some(Commands::Config { command }) => {
            init_logging(
                cli.log_level.as_deref().unwrap_or("warn"),
                cli.log_format.as_deref().unwrap_or("text"),
            )?;
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().with_current_span(false).init(),
        _ => builder.with_target(false).compact().init(),
    }

    Ok(())
}
