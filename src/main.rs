//! ollama-job-adapter binary.
//!
//! Serves the HTTP job API by default; with `--job` runs a single job and
//! prints its results as JSON lines.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing::info;

use ollama_job_adapter::adapter::{Adapter, JobInput};
use ollama_job_adapter::config::{Cli, Config};
use ollama_job_adapter::server::api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging. Stdout is reserved for job output.
    let filter = if cli.verbose {
        "ollama_job_adapter=debug,tower_http=debug"
    } else {
        "ollama_job_adapter=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("ollama-job-adapter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::resolve(&cli)?;

    info!(
        backend = %config.backend.base_url,
        request_timeout_secs = ?config.backend.request_timeout_secs,
        "Configuration loaded"
    );

    let adapter = Adapter::from_config(&config.backend)?;

    if let Some(path) = &cli.job {
        return run_once(&adapter, path).await;
    }

    // Build application state and router.
    let state = Arc::new(AppState::new(adapter));
    let app = build_router(state);

    // Start the server.
    let listen_addr = config.server.listen;
    info!(addr = listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run one job from a file (or stdin for "-") and print each result as a JSON line.
async fn run_once(adapter: &Adapter, path: &Path) -> anyhow::Result<()> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading job file {}", path.display()))?
    };

    let job: JobInput = serde_json::from_str(&raw).context("parsing job")?;
    info!(route = job.route(), "Running job");

    let mut results = adapter.generate(&job);
    let mut count = 0usize;
    while let Some(item) = results.next().await {
        println!("{}", serde_json::to_string(&item)?);
        count += 1;
    }

    info!(items = count, "Job complete");
    Ok(())
}
