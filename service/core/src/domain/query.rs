// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Alert Query Specification
//!
//! An [`AlertQuery`] is the complete, explicit description of one alert
//! listing request:
//!
//! | Part | Semantics |
//! |------|-----------|
//! | [`AlertFilter`] | exact match on alert status and event severity, AND-composed |
//! | search | case-insensitive substring over event `source`, `description`, `event_type` |
//! | [`AlertOrdering`] | `created_at` / `status`, `-` prefix for descending, ties by id ascending |
//! | [`PageRequest`] | 1-indexed window of [`PAGE_SIZE`] records |
//!
//! Repositories either evaluate the query in memory through
//! [`AlertQuery::apply`] or compile it to SQL; both must agree on the rules
//! above.

use serde::Deserialize;
use std::cmp::Ordering;
use thiserror::Error;

use crate::domain::alert::{AlertStatus, AlertView};
use crate::domain::event::Severity;
use crate::domain::validation::ValidationError;

pub const PAGE_SIZE: usize = 10;

/// Query string parameters of the alert listing, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AlertQueryParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "event__severity")]
    pub event_severity: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid page.")]
    InvalidPage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
}

impl AlertFilter {
    pub fn matches(&self, view: &AlertView) -> bool {
        self.status.is_none_or(|status| view.status == status)
            && self.severity.is_none_or(|severity| view.event_details.severity == severity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Status,
}

impl SortKey {
    pub fn field(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Status => "status",
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        match field {
            "created_at" => Some(SortKey::CreatedAt),
            "status" => Some(SortKey::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    fn compare(&self, a: &AlertView, b: &AlertView) -> Ordering {
        let ordering = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            // byte order of the wire names, as COLLATE "C" in SQL
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Sort keys in priority order. Always ends with an implicit `id ASC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertOrdering(Vec<SortSpec>);

impl Default for AlertOrdering {
    fn default() -> Self {
        Self(vec![SortSpec {
            key: SortKey::CreatedAt,
            direction: SortDirection::Ascending,
        }])
    }
}

impl AlertOrdering {
    /// Parses `created_at,-status`. Unknown fields are ignored; if nothing
    /// usable remains the default ordering applies.
    pub fn parse(raw: &str) -> Self {
        let mut specs: Vec<SortSpec> = Vec::new();
        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (direction, field) = match term.strip_prefix('-') {
                Some(field) => (SortDirection::Descending, field),
                None => (SortDirection::Ascending, term),
            };
            let Some(key) = SortKey::from_field(field) else {
                continue;
            };
            if specs.iter().any(|spec| spec.key == key) {
                continue;
            }
            specs.push(SortSpec { key, direction });
        }

        if specs.is_empty() {
            Self::default()
        } else {
            Self(specs)
        }
    }

    pub fn specs(&self) -> &[SortSpec] {
        &self.0
    }

    pub fn compare(&self, a: &AlertView, b: &AlertView) -> Ordering {
        self.0
            .iter()
            .map(|spec| spec.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { number: 1 }
    }
}

impl PageRequest {
    pub fn new(number: u32) -> Result<Self, QueryError> {
        if number == 0 {
            return Err(QueryError::InvalidPage);
        }
        Ok(Self { number })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn offset(&self) -> usize {
        (self.number as usize - 1) * PAGE_SIZE
    }

    pub fn limit(&self) -> usize {
        PAGE_SIZE
    }
}

/// Requested page: an explicit number, or `last` which is only known once
/// the matching rows have been counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSelector {
    #[default]
    First,
    Number(PageRequest),
    Last,
}

impl PageSelector {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        if raw == "last" {
            return Ok(Self::Last);
        }
        let number = raw.parse::<u32>().map_err(|_| QueryError::InvalidPage)?;
        PageRequest::new(number).map(Self::Number)
    }

    pub fn resolve(self, count: usize) -> PageRequest {
        match self {
            Self::First => PageRequest::default(),
            Self::Number(page) => page,
            Self::Last => {
                let pages = count.div_ceil(PAGE_SIZE).max(1);
                PageRequest {
                    number: u32::try_from(pages).unwrap_or(u32::MAX),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    pub filter: AlertFilter,
    pub search: Option<String>,
    pub ordering: AlertOrdering,
    pub page: PageSelector,
}

impl AlertQuery {
    pub fn from_params(params: &AlertQueryParams) -> Result<Self, QueryError> {
        let mut errors = ValidationError::new();

        let status = non_blank(&params.status).and_then(|raw| {
            raw.parse::<AlertStatus>()
                .map_err(|_| errors.add("status", select_valid_choice(raw)))
                .ok()
        });
        let severity = non_blank(&params.event_severity).and_then(|raw| {
            raw.parse::<Severity>()
                .map_err(|_| errors.add("event__severity", select_valid_choice(raw)))
                .ok()
        });
        if !errors.is_empty() {
            return Err(QueryError::Validation(errors));
        }

        let page = match non_blank(&params.page) {
            Some(raw) => PageSelector::parse(raw)?,
            None => PageSelector::First,
        };

        Ok(Self {
            filter: AlertFilter { status, severity },
            search: non_blank(&params.search).map(str::to_string),
            ordering: params
                .ordering
                .as_deref()
                .map(AlertOrdering::parse)
                .unwrap_or_default(),
            page,
        })
    }

    pub fn matches(&self, view: &AlertView) -> bool {
        self.filter.matches(view) && self.matches_search(view)
    }

    fn matches_search(&self, view: &AlertView) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        let term = term.to_lowercase();
        let event = &view.event_details;
        [&event.source, &event.description, &event.event_type]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Filters, sorts and windows a full candidate set.
    pub fn apply(&self, candidates: impl IntoIterator<Item = AlertView>) -> AlertPage {
        let mut matching: Vec<AlertView> = candidates
            .into_iter()
            .filter(|view| self.matches(view))
            .collect();
        matching.sort_by(|a, b| self.ordering.compare(a, b));

        let count = matching.len();
        let page = self.page.resolve(count);
        let results = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();

        AlertPage { count, page, results }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPage {
    pub count: usize,
    pub page: PageRequest,
    pub results: Vec<AlertView>,
}

impl AlertPage {
    pub fn has_next(&self) -> bool {
        self.page.offset() + self.results.len() < self.count
    }

    pub fn has_previous(&self) -> bool {
        self.page.number() > 1
    }

    /// Page 1 always exists, even for an empty result set.
    pub fn is_out_of_range(&self) -> bool {
        self.page.number() > 1 && self.page.offset() >= self.count
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn select_valid_choice(value: &str) -> String {
    format!("Select a valid choice. {} is not one of the available choices.", value)
}
