// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Alert Lifecycle Use Case
//!
//! Applies a partial status update to one alert. Every status may move to
//! every status; the alert's event reference is never changed here even when
//! the request body carries one.
//!
//! Checks run in this order so that an ANALYST learns nothing about which ids
//! exist:
//!
//! 1. Authorize `UpdateAlertStatus` (ADMIN only)
//! 2. Look the alert up, or report `NotFound`
//! 3. Validate the requested status
//! 4. Apply

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::error::AlertServiceError;
use crate::domain::access::{AccessPolicy, Caller, Operation};
use crate::domain::alert::{AlertId, AlertStatus, AlertView};
use crate::domain::repository::AlertRepository;
use crate::domain::validation::{self, ValidationError};

/// PATCH body for a status change. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusPatch {
    #[serde(default)]
    pub status: Option<Value>,
    /// Accepted and discarded: an alert's event is fixed at creation.
    #[serde(default)]
    pub event: Option<Value>,
}

impl StatusPatch {
    pub fn to(status: AlertStatus) -> Self {
        Self {
            status: Some(Value::String(status.as_str().to_string())),
            event: None,
        }
    }

    /// `Ok(None)` when the body does not mention a status at all.
    fn requested_status(&self) -> Result<Option<AlertStatus>, ValidationError> {
        match &self.status {
            None => Ok(None),
            Some(Value::Null) => Err(ValidationError::single("status", validation::NULL)),
            Some(Value::String(raw)) => raw
                .parse::<AlertStatus>()
                .map(Some)
                .map_err(|message| ValidationError::single("status", message)),
            Some(other) => Err(ValidationError::single("status", validation::invalid_choice(&other.to_string()))),
        }
    }
}

#[async_trait]
pub trait AlertLifecycleService: Send + Sync {
    async fn update_status(&self, caller: &Caller, id: AlertId, patch: StatusPatch) -> Result<AlertView, AlertServiceError>;
}

pub struct StandardAlertLifecycleService {
    alerts: Arc<dyn AlertRepository>,
}

impl StandardAlertLifecycleService {
    pub fn new(alerts: Arc<dyn AlertRepository>) -> Self {
        Self { alerts }
    }
}

#[async_trait]
impl AlertLifecycleService for StandardAlertLifecycleService {
    async fn update_status(&self, caller: &Caller, id: AlertId, patch: StatusPatch) -> Result<AlertView, AlertServiceError> {
        let principal = AccessPolicy::authorize(caller, Operation::UpdateAlertStatus).inspect_err(|denied| {
            warn!(alert_id = %id, reason = %denied, "Alert status update denied");
        })?;

        let current = self.alerts.find_view(id).await?.ok_or_else(AlertServiceError::not_found)?;

        let requested = patch.requested_status()?;
        if patch.event.is_some() {
            tracing::debug!(alert_id = %id, "Ignoring event reference in status update");
        }

        let Some(status) = requested else {
            return Ok(current);
        };

        let view = self
            .alerts
            .update_status(id, status)
            .await?
            .ok_or_else(AlertServiceError::not_found)?;

        info!(
            alert_id = %id,
            status = %view.status,
            subject = principal.subject(),
            "Alert status updated"
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::{AccessDenied, Principal, Role};
    use crate::domain::derivation::derive_alert;
    use crate::domain::event::{EventId, EventSubmission};
    use crate::domain::repository::SecurityEventRepository;
    use crate::infrastructure::repositories::InMemorySecurityStore;
    use serde_json::json;

    fn caller(role: Role) -> Caller {
        Caller::Authenticated(Principal::new("someone", role, false))
    }

    async fn setup() -> (InMemorySecurityStore, StandardAlertLifecycleService, AlertId) {
        let store = InMemorySecurityStore::new();
        let event = EventSubmission::new("IDS", "Probe", "CRITICAL", "d").validate().unwrap();
        let derived = derive_alert(&event);
        let (_, alert) = store.insert(event, derived).await.unwrap();
        let service = StandardAlertLifecycleService::new(Arc::new(store.clone()));
        (store, service, alert.unwrap().id())
    }

    #[tokio::test]
    async fn test_admin_moves_through_every_status() {
        let (_, service, id) = setup().await;
        let admin = caller(Role::Admin);
        for status in [AlertStatus::Resolved, AlertStatus::Open, AlertStatus::Acknowledged, AlertStatus::Acknowledged] {
            let view = service.update_status(&admin, id, StatusPatch::to(status)).await.unwrap();
            assert_eq!(view.status, status);
        }
    }

    #[tokio::test]
    async fn test_analyst_forbidden_even_for_unknown_id() {
        let (store, service, id) = setup().await;
        let analyst = caller(Role::Analyst);

        for target in [id, AlertId(404)] {
            let err = service
                .update_status(&analyst, target, StatusPatch::to(AlertStatus::Resolved))
                .await
                .unwrap_err();
            assert!(matches!(err, AlertServiceError::Access(AccessDenied::Forbidden { .. })));
        }
        assert_eq!(store.find_view(id).await.unwrap().unwrap().status, AlertStatus::Open);
    }

    #[tokio::test]
    async fn test_invalid_status_names_field() {
        let (_, service, id) = setup().await;
        for body in [json!({"status": "CLOSED"}), json!({"status": null}), json!({"status": 3})] {
            let patch: StatusPatch = serde_json::from_value(body).unwrap();
            match service.update_status(&caller(Role::Admin), id, patch).await.unwrap_err() {
                AlertServiceError::Validation(errors) => assert_eq!(errors.messages("status").len(), 1),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_id_reported_before_bad_status() {
        let (_, service, _) = setup().await;
        let patch: StatusPatch = serde_json::from_value(json!({"status": "CLOSED"})).unwrap();
        let err = service
            .update_status(&caller(Role::Admin), AlertId(404), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AlertServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_event_reference_is_ignored() {
        let (_, service, id) = setup().await;
        let patch: StatusPatch = serde_json::from_value(json!({"status": "ACKNOWLEDGED", "event": 999})).unwrap();
        let view = service.update_status(&caller(Role::Admin), id, patch).await.unwrap();
        assert_eq!(view.status, AlertStatus::Acknowledged);
        assert_eq!(view.event, EventId(1));
    }

    #[tokio::test]
    async fn test_patch_without_status_returns_current_view() {
        let (_, service, id) = setup().await;
        let view = service
            .update_status(&caller(Role::Admin), id, StatusPatch::default())
            .await
            .unwrap();
        assert_eq!(view.status, AlertStatus::Open);

        let err = service
            .update_status(&caller(Role::Admin), AlertId(77), StatusPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertServiceError::NotFound(_)));
    }
}
