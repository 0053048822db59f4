//! System endpoints: health check, card deck.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::CardDto;
use crate::app_state::AppState;
use crate::domain::standard_deck;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/deck`: Cards offered to clients.
#[utoipa::path(
    get,
    path = "/config/deck",
    tag = "System",
    summary = "Card deck",
    description = "Returns the labels clients can send in `estimate` messages, in display order.",
    responses(
        (status = 200, description = "Card deck", body = Vec<CardDto>),
    )
)]
pub async fn deck_handler() -> impl IntoResponse {
    let deck: Vec<CardDto> = standard_deck().iter().map(CardDto::from).collect();
    (StatusCode::OK, Json(deck))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/deck", get(deck_handler))
}
