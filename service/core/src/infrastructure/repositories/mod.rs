// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository contracts defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve security events and alerts
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresSecurityEventRepository** - event + derived alert in one transaction
//! - **PostgresAlertRepository** - alert queries compiled to a single SQL statement
//!
//! ## In-Memory Store
//!
//! - **InMemorySecurityStore** - both contracts over one lock, so event and
//!   alert writes are atomic and alert views always find their event

pub mod postgres_event;
pub mod postgres_alert;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::alert::{Alert, AlertId, AlertStatus, AlertView};
use crate::domain::derivation::DerivedAlert;
use crate::domain::event::{EventId, NewSecurityEvent, SecurityEvent};
use crate::domain::query::{AlertPage, AlertQuery};
use crate::domain::repository::{AlertRepository, RepositoryError, SecurityEventRepository};

pub use postgres_alert::PostgresAlertRepository;
pub use postgres_event::PostgresSecurityEventRepository;

#[derive(Default)]
struct StoreState {
    events: BTreeMap<EventId, SecurityEvent>,
    alerts: BTreeMap<AlertId, Alert>,
    last_event_id: i64,
    last_alert_id: i64,
}

impl StoreState {
    fn view(&self, alert: &Alert) -> Result<AlertView, RepositoryError> {
        let event = self.events.get(&alert.event_id()).ok_or_else(|| {
            RepositoryError::Corrupt(format!("alert {} references missing event {}", alert.id(), alert.event_id()))
        })?;
        Ok(AlertView::new(alert, event.clone()))
    }
}

#[derive(Clone, Default)]
pub struct InMemorySecurityStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemorySecurityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.state.read().events.len()
    }

    pub fn alert_count(&self) -> usize {
        self.state.read().alerts.len()
    }
}

#[async_trait]
impl SecurityEventRepository for InMemorySecurityStore {
    async fn insert(
        &self,
        event: NewSecurityEvent,
        derived: Option<DerivedAlert>,
    ) -> Result<(SecurityEvent, Option<Alert>), RepositoryError> {
        let mut state = self.state.write();
        let now = Utc::now();

        state.last_event_id += 1;
        let event = event.into_event(EventId(state.last_event_id), now);

        let alert = derived.map(|derived| {
            state.last_alert_id += 1;
            derived.into_alert(AlertId(state.last_alert_id), event.id, now)
        });

        state.events.insert(event.id, event.clone());
        if let Some(alert) = &alert {
            state.alerts.insert(alert.id(), alert.clone());
        }
        Ok((event, alert))
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<SecurityEvent>, RepositoryError> {
        Ok(self.state.read().events.get(&id).cloned())
    }

    async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        let mut state = self.state.write();
        state.events.remove(&id);
        state.alerts.retain(|_, alert| alert.event_id() != id);
        Ok(())
    }
}

#[async_trait]
impl AlertRepository for InMemorySecurityStore {
    async fn find_view(&self, id: AlertId) -> Result<Option<AlertView>, RepositoryError> {
        let state = self.state.read();
        state.alerts.get(&id).map(|alert| state.view(alert)).transpose()
    }

    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<Alert>, RepositoryError> {
        let state = self.state.read();
        Ok(state
            .alerts
            .values()
            .filter(|alert| alert.event_id() == event_id)
            .cloned()
            .collect())
    }

    async fn query(&self, query: &AlertQuery) -> Result<AlertPage, RepositoryError> {
        let state = self.state.read();
        let views = state
            .alerts
            .values()
            .map(|alert| state.view(alert))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(query.apply(views))
    }

    async fn update_status(&self, id: AlertId, status: AlertStatus) -> Result<Option<AlertView>, RepositoryError> {
        let mut state = self.state.write();
        let Some(alert) = state.alerts.get_mut(&id) else {
            return Ok(None);
        };
        let transition = alert.transition_to(status);
        let alert = alert.clone();
        tracing::debug!(alert_id = %id, from = %transition.from, to = %transition.to, "Applied alert status transition");
        state.view(&alert).map(Some)
    }
}
