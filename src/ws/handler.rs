//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::RoomId;
use crate::error::PokerError;

/// Query parameters of the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Room the connection attaches to.
    #[serde(default)]
    pub room: String,
}

/// `GET /ws?room=<id>`: Upgrade HTTP connection to WebSocket.
///
/// # Errors
///
/// Returns [`PokerError::InvalidRequest`] before upgrading if the room
/// identifier is missing or invalid.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, PokerError> {
    let room_id = RoomId::new(&query.room)?;
    let service = Arc::clone(&state.session_service);
    let shutdown = state.shutdown.clone();

    Ok(ws.on_upgrade(move |socket| run_connection(socket, room_id, service, shutdown)))
}
