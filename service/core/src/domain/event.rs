// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::domain::validation::{self, ValidationError};

/// Upper bound, in characters, for `source` and `event_type`.
pub const MAX_LABEL_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Exact, case-sensitive match on the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| validation::invalid_choice(s))
    }
}

/// A persisted security event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: EventId,
    pub source: String,
    pub event_type: String,
    pub severity: Severity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// A validated event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSecurityEvent {
    pub source: String,
    pub event_type: String,
    pub severity: Severity,
    pub description: String,
}

impl NewSecurityEvent {
    /// Assigns identity and creation time. Only repositories call this.
    pub fn into_event(self, id: EventId, timestamp: DateTime<Utc>) -> SecurityEvent {
        SecurityEvent {
            id,
            source: self.source,
            event_type: self.event_type,
            severity: self.severity,
            description: self.description,
            timestamp,
        }
    }
}

/// Raw ingestion payload as submitted by a sensor.
///
/// Fields stay untyped until [`EventSubmission::validate`] so that every
/// problem is reported against the field that caused it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSubmission {
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub event_type: Option<Value>,
    #[serde(default)]
    pub severity: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

impl EventSubmission {
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        severity: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(Value::String(source.into())),
            event_type: Some(Value::String(event_type.into())),
            severity: Some(Value::String(severity.into())),
            description: Some(Value::String(description.into())),
        }
    }

    pub fn validate(self) -> Result<NewSecurityEvent, ValidationError> {
        let mut errors = ValidationError::new();

        let source = label("source", self.source, &mut errors);
        let event_type = label("event_type", self.event_type, &mut errors);
        let description = text("description", self.description, None, &mut errors);
        let severity = severity(self.severity, &mut errors);

        match (source, event_type, severity, description) {
            (Some(source), Some(event_type), Some(severity), Some(description)) if errors.is_empty() => {
                Ok(NewSecurityEvent { source, event_type, severity, description })
            }
            _ => Err(errors),
        }
    }
}

/// Common handling for free-text fields. Numbers are taken in their string
/// form; the value is trimmed before the blank check and stored trimmed.
fn text(field: &str, value: Option<Value>, max_chars: Option<usize>, errors: &mut ValidationError) -> Option<String> {
    let raw = match value {
        None | Some(Value::Null) => {
            errors.add(field, validation::REQUIRED);
            return None;
        }
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add(field, validation::NOT_A_STRING);
            return None;
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, validation::BLANK);
        return None;
    }

    let mut valid = true;
    if let Some(max) = max_chars {
        if trimmed.chars().count() > max {
            errors.add(field, validation::too_long(max));
            valid = false;
        }
    }
    // PostgreSQL TEXT cannot hold NUL
    if trimmed.contains('\0') {
        errors.add(field, validation::NULL_CHARACTERS);
        valid = false;
    }
    valid.then(|| trimmed.to_string())
}

fn label(field: &str, value: Option<Value>, errors: &mut ValidationError) -> Option<String> {
    text(field, value, Some(MAX_LABEL_CHARS), errors)
}

/// Choice fields match the exact wire name and are never trimmed.
fn severity(value: Option<Value>, errors: &mut ValidationError) -> Option<Severity> {
    let raw = match value {
        None | Some(Value::Null) => {
            errors.add("severity", validation::REQUIRED);
            return None;
        }
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add("severity", validation::NOT_A_STRING);
            return None;
        }
    };
    raw.parse::<Severity>()
        .map_err(|message| errors.add("severity", message))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_submission() {
        let event = EventSubmission::new("IDS", "Ransomware", "CRITICAL", "Encrypted files detected")
            .validate()
            .unwrap();
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.source, "IDS");
    }

    #[test]
    fn test_rejects_unknown_severity() {
        for bad in ["EXTREME", "high", "", " ", "Critical"] {
            let err = EventSubmission::new("IDS", "Scan", bad, "d").validate().unwrap_err();
            assert!(!err.messages("severity").is_empty(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_missing_fields_reported_individually() {
        let submission: EventSubmission = serde_json::from_value(json!({ "severity": "LOW" })).unwrap();
        let err = submission.validate().unwrap_err();
        assert_eq!(err.messages("source"), [validation::REQUIRED.to_string()]);
        assert_eq!(err.messages("event_type"), [validation::REQUIRED.to_string()]);
        assert_eq!(err.messages("description"), [validation::REQUIRED.to_string()]);
        assert!(err.messages("severity").is_empty());
    }

    #[test]
    fn test_label_length_counts_characters() {
        let at_limit = "é".repeat(MAX_LABEL_CHARS);
        assert!(EventSubmission::new(at_limit.clone(), "t", "LOW", "d").validate().is_ok());

        let over = format!("{}x", at_limit);
        let err = EventSubmission::new("s", over, "LOW", "d").validate().unwrap_err();
        assert_eq!(err.messages("event_type"), [validation::too_long(MAX_LABEL_CHARS)]);
    }

    #[test]
    fn test_description_is_unbounded() {
        let huge = "A".repeat(64 * 1024);
        let event = EventSubmission::new("Scanner", "Test", "LOW", huge.clone()).validate().unwrap();
        assert_eq!(event.description.len(), huge.len());
    }

    #[test]
    fn test_non_string_values_rejected() {
        let submission: EventSubmission = serde_json::from_value(json!({
            "source": true, "event_type": {"k": 1}, "severity": ["HIGH"], "description": "d"
        }))
        .unwrap();
        let err = submission.validate().unwrap_err();
        assert_eq!(err.messages("source"), [validation::NOT_A_STRING.to_string()]);
        assert_eq!(err.messages("event_type"), [validation::NOT_A_STRING.to_string()]);
        assert_eq!(err.messages("severity"), [validation::NOT_A_STRING.to_string()]);
    }

    #[test]
    fn test_numbers_taken_as_strings() {
        let submission: EventSubmission = serde_json::from_value(json!({
            "source": 12, "event_type": 1.5, "severity": "LOW", "description": 0
        }))
        .unwrap();
        let event = submission.validate().unwrap();
        assert_eq!(event.source, "12");
        assert_eq!(event.event_type, "1.5");
        assert_eq!(event.description, "0");

        let err = EventSubmission {
            severity: Some(json!(3)),
            ..EventSubmission::new("s", "t", "LOW", "d")
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.messages("severity"), [validation::invalid_choice("3")]);
    }

    #[test]
    fn test_text_fields_trimmed_before_checks() {
        let padded = format!("  {}  ", "x".repeat(MAX_LABEL_CHARS - 1));
        let event = EventSubmission::new(padded, "  Port Scan\n", "HIGH", "\t detail ")
            .validate()
            .unwrap();
        assert_eq!(event.source, "x".repeat(MAX_LABEL_CHARS - 1));
        assert_eq!(event.event_type, "Port Scan");
        assert_eq!(event.description, "detail");

        let err = EventSubmission::new(" \t ", "t", " HIGH ", "d").validate().unwrap_err();
        assert_eq!(err.messages("source"), [validation::BLANK.to_string()]);
        assert_eq!(err.messages("severity"), [validation::invalid_choice(" HIGH ")]);
    }

    #[test]
    fn test_null_characters_rejected() {
        let err = EventSubmission::new("IDS\0", "t", "LOW", "before\0after")
            .validate()
            .unwrap_err();
        assert_eq!(err.messages("source"), [validation::NULL_CHARACTERS.to_string()]);
        assert_eq!(err.messages("description"), [validation::NULL_CHARACTERS.to_string()]);
        assert!(err.messages("event_type").is_empty());
    }
}
