// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on storage backend
//! configuration, keeping the domain layer free of infrastructure types.

use anyhow::Result;
use std::sync::Arc;

use crate::domain::repository::{AlertRepository, SecurityEventRepository, StorageBackend};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::{
    InMemorySecurityStore, PostgresAlertRepository, PostgresSecurityEventRepository,
};

/// Both repository handles over one shared backend.
#[derive(Clone)]
pub struct Repositories {
    pub events: Arc<dyn SecurityEventRepository>,
    pub alerts: Arc<dyn AlertRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = InMemorySecurityStore::new();
        Self {
            events: Arc::new(store.clone()),
            alerts: Arc::new(store),
        }
    }
}

/// Connects (and migrates) when the backend is PostgreSQL.
pub async fn create_repositories(backend: &StorageBackend) -> Result<Repositories> {
    match backend {
        StorageBackend::InMemory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Repositories::in_memory())
        }
        StorageBackend::PostgreSQL(config) => {
            let database = Database::new(config).await?;
            database.migrate().await?;
            let pool = database.get_pool().clone();
            Ok(Repositories {
                events: Arc::new(PostgresSecurityEventRepository::new(pool.clone())),
                alerts: Arc::new(PostgresAlertRepository::new(pool)),
            })
        }
    }
}
