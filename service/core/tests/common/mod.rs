// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared helpers for HTTP-level tests: an in-memory app, token minting and
//! request plumbing.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

use vigil_core::application::repository_factory::Repositories;
use vigil_core::infrastructure::auth::{AccessClaims, JwtAuthenticator};
use vigil_core::infrastructure::repositories::InMemorySecurityStore;
use vigil_core::presentation::{app, AppState};

pub const SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: InMemorySecurityStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemorySecurityStore::new();
        let repositories = Repositories {
            events: std::sync::Arc::new(store.clone()),
            alerts: std::sync::Arc::new(store.clone()),
        };
        let state = AppState::new(repositories, JwtAuthenticator::new(SECRET, 0));
        Self { router: app(state), store }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn ingest(&self, token: &str, severity: &str, description: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "source": "IDS",
            "event_type": "Intrusion",
            "severity": severity,
            "description": description,
        });
        self.send(json_request(Method::POST, "/api/events/", Some(token), &body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token)).await
    }

    pub async fn patch_status(&self, id: i64, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let uri = format!("/api/alerts/{}/status/", id);
        self.send(json_request(Method::PATCH, &uri, token, body)).await
    }
}

pub fn token(role: Option<&str>, is_superuser: bool) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let claims = AccessClaims {
        sub: "tester".to_string(),
        role: role.map(str::to_string),
        is_superuser,
        exp: now + 3600,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

pub fn admin() -> String {
    token(Some("ADMIN"), false)
}

pub fn analyst() -> String {
    token(Some("ANALYST"), false)
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}
