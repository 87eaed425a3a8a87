//! Job endpoints in the shape of a serverless worker.
//!
//! - POST /run      (SSE stream of result items)
//! - POST /runsync  (all result items in one JSON body)
//! - GET /health

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapter::backend::Backend;
use crate::adapter::{Adapter, JobInput, ResultItem};
use crate::server::streaming::results_to_sse_stream;

/// Application state shared across handlers.
pub struct AppState {
    pub adapter: Adapter,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(adapter: Adapter) -> Self {
        Self {
            adapter,
            start_time: Instant::now(),
        }
    }
}

/// Build the axum router with all job routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run", post(run))
        .route("/runsync", post(run_sync))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Job envelope: the adapter only ever sees `input`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub input: JobInput,
}

impl JobRequest {
    fn job_id(&mut self) -> String {
        self.id
            .take()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// Collected results of a synchronous job.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobOutput {
    pub id: String,
    pub output: Vec<ResultItem>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub backend: String,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn run(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<JobRequest>,
) -> impl IntoResponse {
    let job_id = req.job_id();
    info!(job_id, route = req.input.route(), stream = true, "Job received");

    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut results = state.adapter.generate(&req.input);
        let mut sent = 0usize;
        while let Some(item) = results.next().await {
            if tx.send(item).await.is_err() {
                // Client went away; dropping the stream cancels the backend call.
                debug!(job_id, sent, "Receiver dropped, abandoning job");
                return;
            }
            sent += 1;
        }
        info!(job_id, items = sent, "Job complete");
    });

    Sse::new(results_to_sse_stream(rx)).keep_alive(KeepAlive::default())
}

async fn run_sync(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<JobRequest>,
) -> Json<JobOutput> {
    let job_id = req.job_id();
    info!(job_id, route = req.input.route(), stream = false, "Job received");

    let output: Vec<ResultItem> = state.adapter.generate(&req.input).collect().await;

    info!(
        job_id,
        items = output.len(),
        errors = output.iter().filter(|item| item.is_error()).count(),
        "Job complete"
    );

    Json(JobOutput { id: job_id, output })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        backend: state.adapter.backend().base_url().to_string(),
    })
}
