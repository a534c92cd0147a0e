// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP error mapping.
//!
//! | Variant | Status | Body |
//! |---------|--------|------|
//! | `Validation` | 400 | `{"field": ["message", ...]}` |
//! | `BadRequest` | 400 | `{"detail": ...}` |
//! | `AuthenticationRequired` | 401 | `{"detail": ...}` + `WWW-Authenticate` |
//! | `Forbidden` | 403 | `{"detail": ...}` |
//! | `NotFound` | 404 | `{"detail": ...}` |
//! | `MethodNotAllowed` | 405 | `{"detail": "Method \"X\" not allowed."}` |
//! | `UnsupportedMediaType` | 415 | `{"detail": ...}` |
//! | `Internal` | 500 | generic `{"detail": ...}`, cause logged |

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::application::error::AlertServiceError;
use crate::domain::access::AccessDenied;
use crate::domain::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(Method),

    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::AuthenticationRequired => ApiError::AuthenticationRequired,
            AccessDenied::Forbidden { .. } => ApiError::Forbidden,
        }
    }
}

impl From<AlertServiceError> for ApiError {
    fn from(err: AlertServiceError) -> Self {
        match err {
            AlertServiceError::Validation(errors) => ApiError::Validation(errors),
            AlertServiceError::Access(denied) => denied.into(),
            AlertServiceError::NotFound(message) => ApiError::NotFound(message),
            AlertServiceError::Repository(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "Request failed with an internal error");
                json!({ "detail": "A server error occurred." })
            }
            other => json!({ "detail": other.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer realm=\"api\""));
        }
        response
    }
}
