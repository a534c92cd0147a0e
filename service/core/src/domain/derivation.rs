// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Alert derivation rule.
//!
//! Decides, for a freshly ingested event, whether exactly one alert must be
//! raised alongside it. The ingestion service calls [`derive_alert`] before
//! persisting and hands the decision to the repository, which commits the
//! event and its alert together.

use chrono::{DateTime, Utc};

use crate::domain::alert::{Alert, AlertId};
use crate::domain::event::{EventId, NewSecurityEvent, Severity};

/// Alert to be created together with the event that triggered it.
///
/// Only [`derive_alert`] can produce one, so callers never choose the
/// initial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAlert {
    _rule: (),
}

impl DerivedAlert {
    pub fn into_alert(self, id: AlertId, event_id: EventId, created_at: DateTime<Utc>) -> Alert {
        Alert::raise(id, event_id, created_at)
    }
}

impl Severity {
    pub fn warrants_alert(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

pub fn derive_alert(event: &NewSecurityEvent) -> Option<DerivedAlert> {
    event.severity.warrants_alert().then_some(DerivedAlert { _rule: () })
}
