//! # planning-poker
//!
//! Real-time planning poker server: participants join a room, privately
//! play estimate cards, and reveal them together.
//!
//! Rooms live in a process-wide cache-aside repository backed by a durable
//! document store. Every mutation runs as an exclusive find, mutate and
//! save transaction. Connected clients learn about changes through a
//! per-connection poller that watches the room's modification time.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── SessionService + RoomChangeStream (service/)
//!     │
//!     ├── RoomRepository (repository/)
//!     ├── Room, Point (domain/)
//!     │
//!     └── RoomStore: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod repository;
pub mod service;
pub mod ws;

use std::path::PathBuf;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application router: REST endpoints, the `/ws`
/// endpoint, Swagger UI (with the `swagger-ui` feature) and, if given, a
/// static front-end served as the fallback.
pub fn build_app(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        );
    }

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
