// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vigil config` subcommands

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use vigil_core::domain::service_config::{ServiceConfigManifest, StorageKind};

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const ANNOTATED_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration and where it came from
    Show,

    /// Check a configuration file without starting the server
    Validate {
        /// File to check (default: the discovered one)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Write a starter configuration file
    Generate {
        #[arg(short, long, default_value = "./vigil-config.yaml")]
        output: PathBuf,

        /// Annotated template with a PostgreSQL example
        #[arg(long)]
        examples: bool,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show => show(config_override),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, examples, force } => generate(&output, examples, force),
    }
}

/// Secrets are only printed when they are `env:` references.
fn describe_secret(value: &str) -> String {
    if value.starts_with("env:") {
        value.to_string()
    } else {
        "(inline, hidden)".to_string()
    }
}

fn source_of(config_override: Option<&Path>) -> String {
    match config_override
        .map(Path::to_path_buf)
        .or_else(ServiceConfigManifest::discover_config)
    {
        Some(path) => path.display().to_string(),
        None => "built-in defaults".to_string(),
    }
}

fn show(config_override: Option<PathBuf>) -> Result<()> {
    let source = source_of(config_override.as_deref());
    let config = ServiceConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    let spec = &config.spec;

    println!("{} {}", "Source:".bold(), source);
    println!("{} {}", "Node:".bold(), config.metadata.name);
    println!(
        "{} http://{}:{}",
        "Listen:".bold(),
        spec.network.bind_address,
        spec.network.port
    );

    match spec.storage.backend {
        StorageKind::InMemory => {
            println!("{} in-memory {}", "Storage:".bold(), "(not persistent)".dimmed())
        }
        StorageKind::Postgres => {
            let connection = spec
                .storage
                .connection_string
                .as_deref()
                .map(describe_secret)
                .unwrap_or_else(|| "(missing)".red().to_string());
            println!(
                "{} postgres, {} (max {} connections)",
                "Storage:".bold(),
                connection,
                spec.storage.max_connections
            );
        }
    }

    println!(
        "{} secret {}, leeway {}s",
        "JWT:".bold(),
        describe_secret(&spec.auth.jwt_secret),
        spec.auth.leeway_seconds
    );
    println!(
        "{} {} ({})",
        "Logging:".bold(),
        spec.observability.logging.level,
        spec.observability.logging.format
    );

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    let source = source_of(config_path.as_deref());
    let config = ServiceConfigManifest::load_or_default(config_path)
        .with_context(|| format!("Failed to load configuration from {}", source))?;
    config
        .validate()
        .with_context(|| format!("{} is not a valid configuration", source))?;

    println!("{} {}", "✓".green(), format!("{} is valid", source).green());
    Ok(())
}

fn generate(output: &Path, annotated: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", output.display());
    }

    let template = if annotated { ANNOTATED_TEMPLATE } else { MINIMAL_TEMPLATE };
    std::fs::write(output, template)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} wrote {}", "✓".green(), output.display());
    Ok(())
}
