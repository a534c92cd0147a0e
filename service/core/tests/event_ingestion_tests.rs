// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP tests for `POST /api/events/`: validation, derivation and media
//! type handling.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{analyst, json_request, request, TestApp};

#[tokio::test]
async fn test_ransomware_scenario_raises_open_alert() {
    let app = TestApp::new();
    let token = analyst();

    let body = json!({
        "source": "IDS",
        "event_type": "Ransomware",
        "severity": "CRITICAL",
        "description": "Encrypted files detected",
    });
    let (status, event) = app.send(json_request(Method::POST, "/api/events/", Some(&token), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["severity"], "CRITICAL");
    assert!(event["id"].is_i64());
    assert!(event["timestamp"].is_string());

    let (status, page) = app.get("/api/alerts/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    let alert = &page["results"][0];
    assert_eq!(alert["status"], "OPEN");
    assert_eq!(alert["event"], event["id"]);
    assert_eq!(alert["event_details"]["description"], "Encrypted files detected");
}

#[tokio::test]
async fn test_only_high_and_critical_raise_alerts() {
    let app = TestApp::new();
    let token = analyst();

    for severity in ["LOW", "MEDIUM", "HIGH", "CRITICAL"] {
        let (status, _) = app.ingest(&token, severity, "probe").await;
        assert_eq!(status, StatusCode::CREATED);
    }

    assert_eq!(app.store.event_count(), 4);
    assert_eq!(app.store.alert_count(), 2);

    let (_, page) = app.get("/api/alerts/", Some(&token)).await;
    let severities: Vec<&str> = page["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|alert| alert["event_details"]["severity"].as_str().unwrap())
        .collect();
    assert_eq!(severities, vec!["HIGH", "CRITICAL"]);
}

#[tokio::test]
async fn test_invalid_severity_changes_nothing() {
    let app = TestApp::new();
    let token = analyst();

    for severity in ["SEVERE", "high", "", "URGENT"] {
        let (status, body) = app.ingest(&token, severity, "probe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["severity"].is_array(), "no severity error for {:?}: {}", severity, body);
    }

    assert_eq!(app.store.event_count(), 0);
    assert_eq!(app.store.alert_count(), 0);
}

#[tokio::test]
async fn test_missing_and_oversized_fields_reported_per_field() {
    let app = TestApp::new();
    let token = analyst();

    let body = json!({ "source": "x".repeat(101), "severity": "LOW" });
    let (status, errors) = app.send(json_request(Method::POST, "/api/events/", Some(&token), &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors["source"][0], "Ensure this field has no more than 100 characters.");
    assert_eq!(errors["event_type"][0], "This field is required.");
    assert_eq!(errors["description"][0], "This field is required.");
    assert!(errors.get("severity").is_none());
    assert_eq!(app.store.event_count(), 0);
}

#[tokio::test]
async fn test_text_fields_trimmed_and_numbers_accepted() {
    let app = TestApp::new();
    let token = analyst();

    let body = json!({
        "source": format!("  {}  ", "x".repeat(99)),
        "event_type": 12,
        "severity": "HIGH",
        "description": "  Port scan from 10.0.0.5 ",
    });
    let (status, event) = app.send(json_request(Method::POST, "/api/events/", Some(&token), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["source"], "x".repeat(99));
    assert_eq!(event["event_type"], "12");
    assert_eq!(event["description"], "Port scan from 10.0.0.5");
}

#[tokio::test]
async fn test_null_characters_rejected() {
    let app = TestApp::new();
    let token = analyst();

    let body = json!({
        "source": "IDS",
        "event_type": "Probe",
        "severity": "CRITICAL",
        "description": "payload\u{0}tail",
    });
    let (status, errors) = app.send(json_request(Method::POST, "/api/events/", Some(&token), &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors["description"][0], "Null characters are not allowed.");
    assert_eq!(app.store.event_count(), 0);
    assert_eq!(app.store.alert_count(), 0);
}

#[tokio::test]
async fn test_large_and_markup_descriptions_stored_verbatim() {
    let app = TestApp::new();
    let token = analyst();

    let large = "A".repeat(10 * 1024);
    let (status, event) = app.ingest(&token, "LOW", &large).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["description"].as_str().unwrap().len(), large.len());

    let markup = "<script>alert('xss')</script>";
    let (status, event) = app.ingest(&token, "HIGH", markup).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["description"], markup);
}

#[tokio::test]
async fn test_anonymous_ingest_is_unauthorized() {
    let app = TestApp::new();
    let body = json!({ "source": "IDS", "event_type": "Probe", "severity": "HIGH", "description": "d" });

    let (status, error) = app.send(json_request(Method::POST, "/api/events/", None, &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["detail"], "Authentication credentials were not provided.");
    assert_eq!(app.store.event_count(), 0);
}

#[tokio::test]
async fn test_garbage_token_is_anonymous() {
    let app = TestApp::new();
    let (status, _) = app.ingest("not-a-token", "HIGH", "d").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_xml_payload_is_unsupported_media_type() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/events/")
        .header(header::AUTHORIZATION, format!("Bearer {}", analyst()))
        .header(header::CONTENT_TYPE, "application/xml")
        .body(Body::from("<event><severity>HIGH</severity></event>"))
        .unwrap();

    let (status, error) = app.send(request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error["detail"], "Unsupported media type \"application/xml\" in request.");
    assert_eq!(app.store.event_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/events/")
        .header(header::AUTHORIZATION, format!("Bearer {}", analyst()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"source\": "))
        .unwrap();

    let (status, error) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["detail"].is_string());
}

#[tokio::test]
async fn test_get_on_ingest_endpoint_not_allowed() {
    let app = TestApp::new();
    let (status, error) = app.send(request(Method::GET, "/api/events/", Some(&analyst()))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error["detail"], "Method \"GET\" not allowed.");
}
