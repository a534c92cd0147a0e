// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application-level error taxonomy shared by every use case.

use thiserror::Error;

use crate::domain::access::AccessDenied;
use crate::domain::query::QueryError;
use crate::domain::repository::RepositoryError;
use crate::domain::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AlertServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error("{0}")]
    NotFound(String),

    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl AlertServiceError {
    pub fn not_found() -> Self {
        AlertServiceError::NotFound("Not found.".to_string())
    }
}

impl From<QueryError> for AlertServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(errors) => AlertServiceError::Validation(errors),
            QueryError::InvalidPage => AlertServiceError::NotFound(QueryError::InvalidPage.to_string()),
        }
    }
}
