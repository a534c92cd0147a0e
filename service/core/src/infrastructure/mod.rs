// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod repositories;
pub mod db;
pub mod auth;

pub use auth::{AccessClaims, JwtAuthenticator};
