// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod api;
pub mod error;
pub mod extract;

pub use api::{app, AppState};
pub use error::ApiError;
