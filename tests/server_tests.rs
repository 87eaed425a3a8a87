//! Job server tests: router driven in-process, backend mocked over HTTP.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_job_adapter::adapter::Adapter;
use ollama_job_adapter::config::BackendConfig;
use ollama_job_adapter::server::api::{build_router, AppState, HealthResponse, JobOutput};

fn router_for(base_url: String) -> Router {
    let config = BackendConfig {
        base_url,
        request_timeout_secs: Some(5),
    };
    let adapter = Adapter::from_config(&config).expect("adapter");
    build_router(Arc::new(AppState::new(adapter)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_runsync_collects_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let app = router_for(server.uri());
    let response = app
        .oneshot(post_json(
            "/runsync",
            json!({"id": "job-1", "input": {"route": "/v1/models"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let output: JobOutput = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(output.id, "job-1");
    assert_eq!(output.output.len(), 1);
    assert_eq!(output.output[0].as_value(), &json!({"models": []}));
}

#[tokio::test]
async fn test_runsync_assigns_id_and_reports_errors_in_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let app = router_for(server.uri());
    let response = app
        .oneshot(post_json("/runsync", json!({"input": {}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let output: JobOutput = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(!output.id.is_empty());
    assert_eq!(output.output[0].as_value(), &json!({"error": "HTTP 500: boom"}));
}

#[tokio::test]
async fn test_run_streams_sse_events_then_done() {
    let server = MockServer::start().await;
    let body = "{\"response\":\"a\",\"done\":false}\n{\"response\":\"b\",\"done\":true}\n";
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let app = router_for(server.uri());
    let response = app
        .oneshot(post_json(
            "/run",
            json!({"input": {"route": "/v1/completions", "input": {"model": "x", "prompt": "hi"}}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let text = body_text(response).await;
    let events: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .collect();

    assert_eq!(events.len(), 3);
    let first: Value = serde_json::from_str(events[0]).unwrap();
    let second: Value = serde_json::from_str(events[1]).unwrap();
    assert_eq!(first, json!({"response": "a", "done": false}));
    assert_eq!(second, json!({"response": "b", "done": true}));
    assert_eq!(events[2], "[DONE]");
}

#[tokio::test]
async fn test_malformed_job_rejected() {
    let app = router_for("http://127.0.0.1:9".to_string());
    let response = app
        .oneshot(post_json("/runsync", json!({"input": {"input": [1, 2, 3]}})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = router_for("http://localhost:11434/".to_string());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.backend, "http://localhost:11434");
}
