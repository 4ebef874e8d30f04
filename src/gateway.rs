//! HTTP gateway: JSON chat endpoint plus health, help and metrics.

use crate::bot::{help_text, ForestBot};
use crate::error::{BotError, Result};
use crate::lang::Lang;
use crate::metrics;
use crate::sessions::DEFAULT_SESSION;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<ForestBot>,
}

impl AppState {
    pub fn new(bot: ForestBot) -> Self {
        Self { bot: Arc::new(bot) }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMeta {
    /// Footprint of this reply
    pub carbon_offset: f64,
    pub total_carbon_offset: f64,
    pub lang: Lang,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub meta: ChatMeta,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .route("/api/help", get(help))
        .route("/api/metrics", get(metrics_json))
        .route("/metrics", get(metrics_prometheus))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| BotError::BadRequest(e.body_text()))?;
    let session = request
        .session_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(DEFAULT_SESSION);

    let span = info_span!("chat", request_id = %Uuid::new_v4(), session);
    let reply = state
        .bot
        .process_query(session, &request.message)
        .instrument(span)
        .await?;

    Ok(Json(ChatResponse {
        meta: ChatMeta {
            carbon_offset: reply.footprint,
            total_carbon_offset: reply.total_offset,
            lang: reply.lang,
        },
        text: reply.text,
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": state.bot.model_name(),
        "sessions": state.bot.sessions().len(),
    }))
}

async fn help() -> impl IntoResponse {
    Json(json!({ "text": help_text() }))
}

async fn metrics_json() -> impl IntoResponse {
    Json(metrics::snapshot())
}

async fn metrics_prometheus() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::prometheus(),
    )
}
