// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface.
//!
//! | Method & path | Handler |
//! |---------------|---------|
//! | `POST /api/events/` | [`ingest_event_handler`] |
//! | `GET /api/alerts/` | [`list_alerts_handler`] |
//! | `GET /api/alerts/{id}/` | [`get_alert_handler`] |
//! | `PATCH /api/alerts/{id}/status/` | [`update_status_handler`] |
//! | `GET /health` | [`health_handler`] |
//!
//! Handlers authorize before touching the path id or the body, so an
//! unauthenticated or under-privileged caller never learns whether an id
//! exists or a payload was well formed.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use url::form_urlencoded;

use crate::application::alerts::{AlertQueryService, StandardAlertQueryService};
use crate::application::ingestion::{EventIngestionService, StandardEventIngestionService};
use crate::application::lifecycle::{AlertLifecycleService, StandardAlertLifecycleService, StatusPatch};
use crate::application::repository_factory::Repositories;
use crate::domain::access::{AccessPolicy, Caller, Operation};
use crate::domain::alert::{AlertId, AlertView};
use crate::domain::event::{EventSubmission, SecurityEvent};
use crate::domain::query::{AlertPage, AlertQueryParams};
use crate::infrastructure::auth::JwtAuthenticator;
use crate::presentation::error::ApiError;
use crate::presentation::extract::JsonBody;

const ALERTS_PATH: &str = "/api/alerts/";

pub struct AppState {
    pub ingestion: Arc<dyn EventIngestionService>,
    pub alerts: Arc<dyn AlertQueryService>,
    pub lifecycle: Arc<dyn AlertLifecycleService>,
    pub authenticator: JwtAuthenticator,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(repositories: Repositories, authenticator: JwtAuthenticator) -> Self {
        Self {
            ingestion: Arc::new(StandardEventIngestionService::new(repositories.events)),
            alerts: Arc::new(StandardAlertQueryService::new(repositories.alerts.clone())),
            lifecycle: Arc::new(StandardAlertLifecycleService::new(repositories.alerts)),
            authenticator,
            start_time: Instant::now(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler).fallback(method_not_allowed))
        .route("/api/events/", post(ingest_event_handler).fallback(method_not_allowed))
        .route(ALERTS_PATH, get(list_alerts_handler).fallback(method_not_allowed))
        .route("/api/alerts/{id}/", get(get_alert_handler).fallback(method_not_allowed))
        .route(
            "/api/alerts/{id}/status/",
            patch(update_status_handler).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn ingest_event_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    body: Result<JsonBody<EventSubmission>, ApiError>,
) -> Result<(StatusCode, Json<SecurityEvent>), ApiError> {
    AccessPolicy::authorize(&caller, Operation::IngestEvent)?;
    let JsonBody(submission) = body?;

    let receipt = state.ingestion.ingest(&caller, submission).await?;
    Ok((StatusCode::CREATED, Json(receipt.event)))
}

#[derive(Debug, Serialize)]
struct AlertPageBody {
    count: usize,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<AlertView>,
}

impl AlertPageBody {
    fn new(page: AlertPage, raw_query: Option<&str>) -> Self {
        let number = page.page.number();
        let next = page.has_next().then(|| page_link(raw_query, Some(number + 1)));
        // page 1 is addressed without a page parameter
        let previous = page
            .has_previous()
            .then(|| page_link(raw_query, (number > 2).then_some(number - 1)));
        Self {
            count: page.count,
            next,
            previous,
            results: page.results,
        }
    }
}

/// Rebuilds the listing URL keeping every parameter except `page`.
fn page_link(raw_query: Option<&str>, page: Option<u32>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes()) {
        if key != "page" {
            serializer.append_pair(&key, &value);
        }
    }
    if let Some(page) = page {
        serializer.append_pair("page", &page.to_string());
    }

    let query = serializer.finish();
    if query.is_empty() {
        ALERTS_PATH.to_string()
    } else {
        format!("{}?{}", ALERTS_PATH, query)
    }
}

fn parse_alert_id(raw: &str) -> Result<AlertId, ApiError> {
    raw.parse::<AlertId>().map_err(|_| ApiError::not_found())
}

async fn list_alerts_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    uri: Uri,
    query: Result<Query<AlertQueryParams>, QueryRejection>,
) -> Result<Json<AlertPageBody>, ApiError> {
    AccessPolicy::authorize(&caller, Operation::ListAlerts)?;
    let Query(params) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let page = state.alerts.list(&caller, &params).await?;
    Ok(Json(AlertPageBody::new(page, uri.query())))
}

async fn get_alert_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<AlertView>, ApiError> {
    AccessPolicy::authorize(&caller, Operation::ViewAlert)?;
    let id = parse_alert_id(&id)?;

    Ok(Json(state.alerts.get(&caller, id).await?))
}

async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<JsonBody<StatusPatch>, ApiError>,
) -> Result<Json<AlertView>, ApiError> {
    AccessPolicy::authorize(&caller, Operation::UpdateAlertStatus)?;
    let id = parse_alert_id(&id)?;
    let JsonBody(patch) = body?;

    Ok(Json(state.lifecycle.update_status(&caller, id, patch).await?))
}
