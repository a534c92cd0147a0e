// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this module only checks an HS256 signature and
//! expiry and turns the claims into a [`Caller`]. A missing, malformed,
//! expired or otherwise unverifiable token yields [`Caller::Anonymous`].

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::access::{Caller, Principal, Role};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("authorization header is not a bearer token")]
    NotBearer,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("unknown role claim '{0}'")]
    UnknownRole(String),
}

pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8], leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = leeway_seconds;
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a raw token and build the normalized principal.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?.claims;
        let role = match claims.role.as_deref() {
            None => Role::default(),
            Some(raw) => raw.parse::<Role>().map_err(|_| TokenError::UnknownRole(raw.to_string()))?,
        };
        Ok(Principal::new(claims.sub, role, claims.is_superuser))
    }

    /// Resolve the caller from an `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Caller {
        let Some(header) = authorization else {
            return Caller::Anonymous;
        };
        let result = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(TokenError::NotBearer)
            .and_then(|token| self.verify(token.trim()));

        match result {
            Ok(principal) => Caller::Authenticated(principal),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer credentials; treating caller as anonymous");
                Caller::Anonymous
            }
        }
    }
}
