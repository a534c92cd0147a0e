// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Policy
//!
//! Static two-tier authorization. Callers arrive either anonymous or as an
//! authenticated [`Principal`] carrying one [`Role`].
//!
//! | Operation | Anonymous | ANALYST | ADMIN |
//! |-----------|-----------|---------|-------|
//! | `IngestEvent` | authentication required | allow | allow |
//! | `ListAlerts` | authentication required | allow | allow |
//! | `ViewAlert` | authentication required | allow | allow |
//! | `UpdateAlertStatus` | authentication required | forbidden | allow |
//!
//! There are no per-object ownership checks and no delegation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Analyst,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Analyst => "ANALYST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "ANALYST" => Ok(Role::Analyst),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// An authenticated identity whose role has already been normalized.
///
/// The only constructor applies the superuser rule, so a `Principal` with a
/// superuser flag and a non-ADMIN role cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, requested_role: Role, is_superuser: bool) -> Self {
        let role = if is_superuser { Role::Admin } else { requested_role };
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(principal) => Some(principal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    IngestEvent,
    ListAlerts,
    ViewAlert,
    UpdateAlertStatus,
}

impl Operation {
    fn minimum_role(&self) -> Role {
        match self {
            Operation::IngestEvent | Operation::ListAlerts | Operation::ViewAlert => Role::Analyst,
            Operation::UpdateAlertStatus => Role::Admin,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::IngestEvent => "ingest_event",
            Operation::ListAlerts => "list_alerts",
            Operation::ViewAlert => "view_alert",
            Operation::UpdateAlertStatus => "update_alert_status",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    #[error("You do not have permission to perform this action.")]
    Forbidden { role: Role, operation: Operation },
}

pub struct AccessPolicy;

impl AccessPolicy {
    /// Returns the acting principal when the operation is allowed.
    pub fn authorize(caller: &Caller, operation: Operation) -> Result<&Principal, AccessDenied> {
        let principal = caller.principal().ok_or(AccessDenied::AuthenticationRequired)?;
        let allowed = match operation.minimum_role() {
            Role::Analyst => true,
            Role::Admin => principal.role() == Role::Admin,
        };
        if allowed {
            Ok(principal)
        } else {
            Err(AccessDenied::Forbidden {
                role: principal.role(),
                operation,
            })
        }
    }
}
