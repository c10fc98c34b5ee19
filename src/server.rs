// src/server.rs
//
// HTTP front end: accepts a target over JSON, runs the scanner and returns
// the report.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::models::ScanTarget;
use crate::core::report::ScanReport;
use crate::core::scanner::Scanner;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: missing or invalid target.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ApiErrorBody { message })).into_response()
            }
        }
    }
}

/// Build the axum Router (useful for testing).
pub fn build_router(scanner: Arc<Scanner>) -> Router {
    Router::new()
        .route("/run_scan", post(run_scan))
        .route("/health", get(health))
        .with_state(scanner)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn run_scan(
    State(scanner): State<Arc<Scanner>>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let raw = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL is required".to_string()))?;

    // Validate before touching the network.
    let target = ScanTarget::parse(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(target = %target, "Scan requested over HTTP.");
    let findings = scanner.execute(&target).await;
    Ok(Json(ScanReport::new(&target, findings)))
}

/// Serve the HTTP front end until Ctrl+C.
pub async fn start_server(listen_addr: SocketAddr, scanner: Arc<Scanner>) -> std::io::Result<()> {
    let app = build_router(scanner);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP front end listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP front end shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler, serving until killed.");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
