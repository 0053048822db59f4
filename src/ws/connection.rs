//! WebSocket connection state machine.
//!
//! Handles the read loop for a single WebSocket connection, dispatching
//! client intents to the [`SessionService`] and forwarding room changes.
//! Every outbound frame goes through one `mpsc` channel drained by a
//! dedicated writer task, so replies and change pushes never interleave.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use super::session::ConnectionSession;
use crate::domain::{Point, RoomId};
use crate::error::PokerError;
use crate::service::SessionService;

/// Capacity of the per-connection outbound queue.
const OUTBOUND_CAPACITY: usize = 32;

/// Runs a single WebSocket connection attached to `room_id` until the
/// client goes away or `shutdown` is cancelled.
///
/// - Reads intents from the client and replies through the writer task.
/// - Forwards room changes observed by the change stream.
/// - On exit, leaves the room under every name the connection joined with.
pub async fn run_connection(
    socket: WebSocket,
    room_id: RoomId,
    service: Arc<SessionService>,
    shutdown: CancellationToken,
) {
    let conn_id = Uuid::new_v4();
    let (ws_tx, mut ws_rx) = socket.split();
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let writer = tokio::spawn(write_loop(ws_tx, out_rx, conn_id));

    let cancel = shutdown.child_token();
    let mut changes = service.change_stream(room_id.clone(), cancel.clone());
    let mut session = ConnectionSession::new(room_id);

    tracing::info!(%conn_id, room_id = %session.room_id(), "ws connection opened");

    loop {
        let outbound = tokio::select! {
            () = cancel.cancelled() => break,
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    handle_text_message(text.as_str(), &service, &mut session).await
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
            changed = changes.next() => match changed {
                Some(room) => session.messages_for_change(&room),
                None => break,
            },
        };

        if !enqueue(&out_tx, outbound).await {
            break;
        }
    }

    changes.cancel();
    drop(out_tx);

    for user_name in session.joined_as() {
        match service.leave(session.room_id(), user_name).await {
            Ok(_) | Err(PokerError::RoomNotFound(_) | PokerError::UserNotFound(_)) => {}
            Err(err) => {
                tracing::warn!(%conn_id, %user_name, error = %err, "leave on disconnect failed");
            }
        }
    }

    if writer.await.is_err() {
        tracing::warn!(%conn_id, "ws writer task panicked");
    }
    tracing::debug!(%conn_id, "ws connection closed");
}

/// Queues messages for the writer task. Returns `false` once the writer
/// has gone away.
async fn enqueue(out_tx: &mpsc::Sender<ServerMessage>, messages: Vec<ServerMessage>) -> bool {
    for message in messages {
        if out_tx.send(message).await.is_err() {
            return false;
        }
    }
    true
}

/// Drains the outbound queue into the socket sink.
async fn write_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerMessage>,
    conn_id: Uuid,
) {
    while let Some(message) = out_rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(%conn_id, error = %err, "failed to encode ws message");
                continue;
            }
        };
        if ws_tx.send(Message::text(json)).await.is_err() {
            tracing::debug!(%conn_id, "ws send failed");
            break;
        }
    }
    let _ = ws_tx.close().await;
}

/// Handles a text frame from the client, returning the replies to send.
async fn handle_text_message(
    text: &str,
    service: &SessionService,
    session: &mut ConnectionSession,
) -> Vec<ServerMessage> {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(error = %err, "malformed ws message");
            return vec![ServerMessage::error(format!("malformed message: {err}"))];
        }
    };

    match dispatch(msg, service, session).await {
        Ok(replies) => replies,
        Err(err) => {
            if err.is_fatal() {
                tracing::error!(room_id = %session.room_id(), error = %err, "ws request failed");
            }
            vec![ServerMessage::error(err.to_string())]
        }
    }
}

async fn dispatch(
    msg: ClientMessage,
    service: &SessionService,
    session: &mut ConnectionSession,
) -> Result<Vec<ServerMessage>, PokerError> {
    let room_id = session.room_id().clone();
    match msg {
        ClientMessage::Get => {
            let room = service.get(&room_id).await?;
            Ok(vec![ServerMessage::participants(&room)])
        }
        ClientMessage::Join { user_name } => {
            let room = service.join(&room_id, &user_name).await?;
            let user_name = user_name.trim().to_string();
            session.record_join(&user_name);
            Ok(vec![
                ServerMessage::Joined { user_name },
                ServerMessage::participants(&room),
            ])
        }
        ClientMessage::Estimate { user_name, point } => {
            let point = Point::parse(&point)?;
            let room = service.set_estimate(&room_id, &user_name, point).await?;
            Ok(vec![ServerMessage::participants(&room)])
        }
        ClientMessage::Reset => {
            let room = service.reset(&room_id).await?;
            Ok(vec![ServerMessage::participants(&room)])
        }
        ClientMessage::Reveal => {
            let room = service.reveal(&room_id).await?;
            session.record_estimates_sent(&room);
            Ok(ServerMessage::estimates(&room).into_iter().collect())
        }
    }
}
