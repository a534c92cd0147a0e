// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server bootstrap

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use vigil_core::application::repository_factory::create_repositories;
use vigil_core::domain::service_config::ServiceConfigManifest;
use vigil_core::infrastructure::auth::JwtAuthenticator;
use vigil_core::presentation::{app, AppState};

pub async fn start_server(config: ServiceConfigManifest) -> Result<()> {
    info!(
        "Vigil starting (node: {}, PID: {})",
        config.metadata.name,
        std::process::id()
    );

    let backend = config
        .spec
        .storage
        .to_backend()
        .context("Invalid storage configuration")?;
    let repositories = create_repositories(&backend)
        .await
        .context("Failed to initialize storage")?;

    let secret = config
        .spec
        .auth
        .resolve_secret()
        .context("Failed to resolve JWT secret")?;
    let authenticator = JwtAuthenticator::new(secret.as_bytes(), config.spec.auth.leeway_seconds);

    let router = app(AppState::new(repositories, authenticator));

    let addr = format!("{}:{}", config.spec.network.bind_address, config.spec.network.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Vigil shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
