//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::service::SessionService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session service for all room operations.
    pub session_service: Arc<SessionService>,
    /// Root token; cancelling it closes every WebSocket connection.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates the state with a fresh shutdown token.
    #[must_use]
    pub fn new(session_service: Arc<SessionService>) -> Self {
        Self {
            session_service,
            shutdown: CancellationToken::new(),
        }
    }
}
