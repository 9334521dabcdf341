//! goose webhook endpoint - receives GitHub events and routes them to the
//! status pipeline.
//!
//! This is a thin boundary: it extracts the event name header and JSON body,
//! hands them to the dispatch table, and always answers 200 with a
//! `did-process` header saying whether a handler ran. Processing failures are
//! logged here, never surfaced to the webhook sender.

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use clap::Parser;
use goose_core::{Credentials, EventProcessor, GithubClient};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const GITHUB_EVENT_NAME_HEADER: &str = "x-github-event";
const FOUND_WEBHOOK_HEADER: &str = "did-process";

/// goose webhook endpoint
#[derive(Parser, Debug)]
#[command(name = "goose-webhook")]
#[command(about = "Receives GitHub webhook events and reports commit statuses")]
#[command(version)]
struct Args {
    /// Path to the service configuration file
    #[arg(long, value_name = "PATH", default_value = "./service-config.yaml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

struct AppState {
    processor: EventProcessor,
    commit_info: Option<String>,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/webhook", post(webhook))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> String {
    info!("index");
    format!(
        "works: {}",
        state.commit_info.as_deref().unwrap_or("unknown")
    )
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let event = headers
        .get(GITHUB_EVENT_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    info!("incoming event: {event}");

    let processed = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(payload) => {
            debug!("payload: {payload}");
            let processor = state.processor.clone();
            // Handlers do blocking outbound I/O; keep them off the runtime.
            match tokio::task::spawn_blocking(move || processor.dispatch(&event, &payload)).await {
                Ok(Ok(outcome)) => outcome.processed(),
                Ok(Err(err)) => {
                    error!("event processing failed: {err}");
                    false
                }
                Err(err) => {
                    error!("event processing panicked: {err}");
                    false
                }
            }
        }
        Err(err) => {
            warn!("webhook body is not JSON: {err}");
            false
        }
    };

    (
        [(FOUND_WEBHOOK_HEADER, if processed { "yes" } else { "no" })],
        "ok",
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        goose_core::logging::init();
    }

    info!("goose webhook endpoint starting...");

    // Build info dropped in by the image build, if any.
    let commit_info = std::fs::read_to_string("./git-info.txt")
        .ok()
        .map(|s| s.trim().to_string());

    let entries = goose_core::load_service_config(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    info!(
        "loaded {} config entries: {:?}",
        entries.len(),
        entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
    );

    let credentials = Credentials::resolve();
    if credentials.is_none() {
        warn!("no github credentials resolved; outbound calls will be unauthenticated");
    }

    let processor = EventProcessor::new(entries, GithubClient::new(credentials));
    let state = Arc::new(AppState {
        processor,
        commit_info,
    });

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("listening on {}", args.bind);

    axum::serve(listener, app(state))
        .await
        .context("server exited")?;
    Ok(())
}
