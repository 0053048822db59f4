//! Room handlers: snapshot, reveal, reset.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::RoomResponse;
use crate::app_state::AppState;
use crate::domain::RoomId;
use crate::error::{ErrorResponse, PokerError};

/// `GET /rooms/{room_id}`: Current state of a room.
///
/// Cards are only included once the room has been revealed.
///
/// # Errors
///
/// Returns [`PokerError`] if the identifier is invalid, the room does not
/// exist, or the repository is unavailable.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    summary = "Get room",
    description = "Returns the participants of a room and, once revealed, every card.",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room state", body = RoomResponse),
        (status = 400, description = "Invalid room identifier", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Repository unavailable", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, PokerError> {
    let room_id = RoomId::new(&room_id)?;
    let room = state.session_service.get(&room_id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// `POST /rooms/{room_id}/reveal`: Reveal every card.
///
/// # Errors
///
/// Returns [`PokerError`] if the room does not exist or cannot be saved.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/reveal",
    tag = "Rooms",
    summary = "Reveal estimates",
    description = "Moves the room to the estimated state and stamps the reveal time. Revealing a room where nobody played is allowed.",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Revealed room", body = RoomResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Repository unavailable", body = ErrorResponse),
    )
)]
pub async fn reveal_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, PokerError> {
    let room_id = RoomId::new(&room_id)?;
    let room = state.session_service.reveal(&room_id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// `POST /rooms/{room_id}/reset`: Clear every card.
///
/// The round state is left as it is.
///
/// # Errors
///
/// Returns [`PokerError`] if the room does not exist or cannot be saved.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/reset",
    tag = "Rooms",
    summary = "Reset estimates",
    description = "Clears every participant's card without changing the round state.",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Reset room", body = RoomResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Repository unavailable", body = ErrorResponse),
    )
)]
pub async fn reset_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, PokerError> {
    let room_id = RoomId::new(&room_id)?;
    let room = state.session_service.reset(&room_id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// Room routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{room_id}", get(get_room))
        .route("/rooms/{room_id}/reveal", post(reveal_room))
        .route("/rooms/{room_id}/reset", post(reset_room))
}
