//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Room endpoints are mounted under `/api/v1`; system endpoints live at
//! the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "planning-poker",
        description = "Planning poker rooms over REST and WebSocket"
    ),
    paths(
        handlers::room::get_room,
        handlers::room::reveal_room,
        handlers::room::reset_room,
        handlers::system::health_handler,
        handlers::system::deck_handler,
    ),
    components(schemas(
        dto::RoomResponse,
        dto::ParticipantDto,
        dto::EstimateDto,
        dto::ParticipantsView,
        dto::EstimatesView,
        dto::CardDto,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Rooms", description = "Room snapshot and round control"),
        (name = "System", description = "Health and client configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
