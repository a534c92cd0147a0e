// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and rules of the triage service. Nothing in here touches a
//! database, a socket or a clock other than `chrono::Utc::now`.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`event`] | Immutable `SecurityEvent` records and submission validation |
//! | [`alert`] | `Alert` aggregate and its status lifecycle |
//! | [`derivation`] | Severity rule deciding whether an event raises an alert |
//! | [`query`] | Explicit alert query specification (filter, search, order, page) |
//! | [`access`] | Caller identity and the two-tier access policy |
//! | [`repository`] | Persistence contracts implemented in `crate::infrastructure` |

pub mod event;
pub mod alert;
pub mod derivation;
pub mod query;
pub mod access;
pub mod validation;
pub mod repository;
pub mod service_config;
