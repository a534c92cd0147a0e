// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the two aggregates, defined here and implemented
//! in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `SecurityEventRepository` | `SecurityEvent` (+ derived `Alert`) | `InMemorySecurityStore`, `PostgresSecurityEventRepository` |
//! | `AlertRepository` | `Alert` | `InMemorySecurityStore`, `PostgresAlertRepository` |
//!
//! ## Storage Backend Abstraction
//!
//! The backend is selected at startup from the service configuration.
//! In-memory storage serves development and tests; PostgreSQL serves
//! production.

use async_trait::async_trait;

use crate::domain::alert::{Alert, AlertId, AlertStatus, AlertView};
use crate::domain::derivation::DerivedAlert;
use crate::domain::event::{EventId, NewSecurityEvent, SecurityEvent};
use crate::domain::query::{AlertPage, AlertQuery};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

#[async_trait]
pub trait SecurityEventRepository: Send + Sync {
    /// Persist a new event and, when the derivation rule fired, its alert.
    ///
    /// Both writes commit as one unit: no reader can observe the event
    /// without its alert or the alert without its event.
    async fn insert(
        &self,
        event: NewSecurityEvent,
        derived: Option<DerivedAlert>,
    ) -> Result<(SecurityEvent, Option<Alert>), RepositoryError>;

    async fn find_by_id(&self, id: EventId) -> Result<Option<SecurityEvent>, RepositoryError>;

    /// Remove an event together with every alert raised for it.
    async fn delete(&self, id: EventId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn find_view(&self, id: AlertId) -> Result<Option<AlertView>, RepositoryError>;

    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<Alert>, RepositoryError>;

    /// Evaluate a complete query specification and return one page.
    async fn query(&self, query: &AlertQuery) -> Result<AlertPage, RepositoryError>;

    /// Atomically set the status of one alert. `None` if the id is unknown.
    async fn update_status(&self, id: AlertId, status: AlertStatus) -> Result<Option<AlertView>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
