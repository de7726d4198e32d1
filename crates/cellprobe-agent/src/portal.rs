//! HTTP portal — exposes the probe to hosts that speak HTTP.
//!
//! Every `GET /api/cell` is an independent one-shot probe run on a blocking
//! worker. Nothing is cached between requests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use cellprobe::bridge;
use cellprobe::protocol::{ProbeOutcome, ProbeReply};
use tokio::sync::watch;

use crate::AgentState;

pub fn router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route("/api/cell", get(cell))
        .route("/api/health", get(health))
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(
    state: Arc<AgentState>,
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let app = router(state);

    tracing::info!("portal on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;
    Ok(())
}

/// Run one probe on a blocking worker and wrap the outcome.
pub async fn probe_once(state: Arc<AgentState>) -> ProbeReply {
    let outcome = tokio::task::spawn_blocking(move || bridge::query_outcome(&state.probe))
        .await
        .unwrap_or_else(|e| ProbeOutcome::Failure {
            error: format!("probe task failed: {e}"),
        });
    ProbeReply::new(outcome)
}

async fn cell(State(state): State<Arc<AgentState>>) -> (StatusCode, Json<ProbeReply>) {
    let reply = probe_once(state).await;
    let status = match &reply.outcome {
        ProbeOutcome::Success { info } => {
            tracing::debug!(cell_id = info.cell_id, dbm = info.signal_strength, "served cell");
            StatusCode::OK
        }
        ProbeOutcome::Failure { error } => {
            tracing::debug!(error = %error, "probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(reply))
}

async fn health(State(state): State<Arc<AgentState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "backend": state.backend,
        "module": bridge::MODULE_NAME,
        "operation": bridge::OPERATION,
    }))
}
