// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vigil serve` - run the HTTP API in the foreground

use anyhow::{Context, Result};
use clap::Args;

use vigil_core::domain::service_config::ServiceConfigManifest;

use crate::server;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind address (overrides spec.network.bind_address)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// HTTP API port (overrides spec.network.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Flags win over the configuration file and its environment overrides.
    pub fn apply(&self, config: &mut ServiceConfigManifest) {
        if let Some(bind) = &self.bind {
            config.spec.network.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.spec.network.port = port;
        }
    }
}

pub async fn handle_command(args: ServeArgs, mut config: ServiceConfigManifest) -> Result<()> {
    args.apply(&mut config);
    config.validate().context("Configuration validation failed")?;
    server::start_server(config).await
}
