//! Test server bootstrap shared by the integration suites.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use planning_poker::app_state::AppState;
use planning_poker::domain::RoomId;
use planning_poker::persistence::{MemoryRoomStore, RoomStore};
use planning_poker::repository::RoomRepository;
use planning_poker::service::{ChangeStreamConfig, SessionService};

/// A server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub service: Arc<SessionService>,
    pub store: Arc<MemoryRoomStore>,
    pub shutdown: CancellationToken,
}

impl TestServer {
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws(&self, room: &str) -> String {
        format!("ws://{}/ws?room={room}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub async fn spawn_server() -> TestServer {
    let store = Arc::new(MemoryRoomStore::new());
    let repository = Arc::new(RoomRepository::new(
        Arc::clone(&store) as Arc<dyn RoomStore>
    ));
    let config = ChangeStreamConfig {
        poll_interval: Duration::from_millis(20),
        error_backoff: Duration::from_millis(50),
    };
    let service = Arc::new(SessionService::new(repository, config));
    let state = AppState::new(Arc::clone(&service));
    let shutdown = state.shutdown.clone();
    let app = planning_poker::build_app(state, None);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    let stop = shutdown.clone();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await;
    });

    TestServer {
        addr,
        service,
        store,
        shutdown,
    }
}

pub fn room_id(raw: &str) -> RoomId {
    let Ok(id) = RoomId::new(raw) else {
        panic!("valid room id");
    };
    id
}
