// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Alert Aggregate
//!
//! An `Alert` is the triage record raised for one qualifying
//! [`SecurityEvent`]. Only its status is mutable; the event reference, id and
//! creation time are fixed when the alert is created and have no setters.
//!
//! ## Status lifecycle
//!
//! ```text
//!        ┌────────────── any ──────────────┐
//!        ▼                                 │
//!      OPEN ◄──► ACKNOWLEDGED ◄──► RESOLVED ┘
//! ```
//!
//! Every state may move to every state, itself included. `RESOLVED` is
//! terminal in practice only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::event::{EventId, SecurityEvent};
use crate::domain::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub i64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlertId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(AlertId)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    #[default]
    Open,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [AlertStatus::Open, AlertStatus::Acknowledged, AlertStatus::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "OPEN",
            AlertStatus::Acknowledged => "ACKNOWLEDGED",
            AlertStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| validation::invalid_choice(s))
    }
}

/// Outcome of applying a status change, kept for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: AlertStatus,
    pub to: AlertStatus,
}

impl StatusTransition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    id: AlertId,
    event_id: EventId,
    status: AlertStatus,
    created_at: DateTime<Utc>,
}

impl Alert {
    /// New alerts always start `OPEN`.
    pub fn raise(id: AlertId, event_id: EventId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            event_id,
            status: AlertStatus::Open,
            created_at,
        }
    }

    /// Rehydrate a stored alert.
    pub fn restore(id: AlertId, event_id: EventId, status: AlertStatus, created_at: DateTime<Utc>) -> Self {
        Self { id, event_id, status, created_at }
    }

    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn status(&self) -> AlertStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The only mutation an alert supports. No transition is refused.
    pub fn transition_to(&mut self, next: AlertStatus) -> StatusTransition {
        let transition = StatusTransition { from: self.status, to: next };
        self.status = next;
        transition
    }
}

/// Read model: the alert's own fields plus its full event under
/// `event_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub id: AlertId,
    pub event: EventId,
    pub event_details: SecurityEvent,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

impl AlertView {
    pub fn new(alert: &Alert, event: SecurityEvent) -> Self {
        debug_assert_eq!(alert.event_id(), event.id);
        Self {
            id: alert.id(),
            event: alert.event_id(),
            event_details: event,
            status: alert.status(),
            created_at: alert.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_starts_open() {
        let alert = Alert::raise(AlertId(1), EventId(9), Utc::now());
        assert_eq!(alert.status(), AlertStatus::Open);
        assert_eq!(alert.event_id(), EventId(9));
    }

    #[test]
    fn test_every_transition_allowed() {
        let created_at = Utc::now();
        for from in AlertStatus::ALL {
            for to in AlertStatus::ALL {
                let mut alert = Alert::restore(AlertId(3), EventId(4), from, created_at);
                let transition = alert.transition_to(to);
                assert_eq!(alert.status(), to);
                assert_eq!(transition.is_noop(), from == to);
                assert_eq!(alert.id(), AlertId(3));
                assert_eq!(alert.event_id(), EventId(4));
                assert_eq!(alert.created_at(), created_at);
            }
        }
    }

    #[test]
    fn test_status_parsing_is_exact() {
        assert_eq!("ACKNOWLEDGED".parse::<AlertStatus>().unwrap(), AlertStatus::Acknowledged);
        assert_eq!("CLOSED".parse::<AlertStatus>().unwrap_err(), "\"CLOSED\" is not a valid choice.");
        assert!("open".parse::<AlertStatus>().is_err());
    }
}
