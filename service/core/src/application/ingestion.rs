// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Event Ingestion Use Case
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Accept a sensor submission and persist it together
//!   with any alert it warrants
//! - **Collaborators:**
//!   - Domain: `EventSubmission` (validation), `derive_alert` (derivation rule)
//!   - Infrastructure: `SecurityEventRepository`
//!
//! # Flow
//!
//! 1. Authorize the caller for `IngestEvent`
//! 2. Validate the submission into a `NewSecurityEvent`
//! 3. Evaluate the derivation rule
//! 4. Persist event and derived alert in one repository call

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::error::AlertServiceError;
use crate::domain::access::{AccessPolicy, Caller, Operation};
use crate::domain::alert::Alert;
use crate::domain::derivation::derive_alert;
use crate::domain::event::{EventSubmission, SecurityEvent};
use crate::domain::repository::SecurityEventRepository;

/// Stored event plus the alert raised for it, if any.
#[derive(Debug, Clone)]
pub struct IngestionReceipt {
    pub event: SecurityEvent,
    pub alert: Option<Alert>,
}

#[async_trait]
pub trait EventIngestionService: Send + Sync {
    async fn ingest(&self, caller: &Caller, submission: EventSubmission) -> Result<IngestionReceipt, AlertServiceError>;
}

pub struct StandardEventIngestionService {
    events: Arc<dyn SecurityEventRepository>,
}

impl StandardEventIngestionService {
    pub fn new(events: Arc<dyn SecurityEventRepository>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventIngestionService for StandardEventIngestionService {
    async fn ingest(&self, caller: &Caller, submission: EventSubmission) -> Result<IngestionReceipt, AlertServiceError> {
        let principal = AccessPolicy::authorize(caller, Operation::IngestEvent).inspect_err(|denied| {
            warn!(operation = %Operation::IngestEvent, reason = %denied, "Event ingestion denied");
        })?;

        let event = submission.validate()?;
        let derived = derive_alert(&event);

        let (event, alert) = self.events.insert(event, derived).await?;

        info!(
            event_id = %event.id,
            severity = %event.severity,
            source = %event.source,
            subject = principal.subject(),
            alert_id = alert.as_ref().map(|a| a.id().0),
            "Security event ingested"
        );

        Ok(IngestionReceipt { event, alert })
    }
}
