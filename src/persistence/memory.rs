//! In-process room store.
//!
//! Used when persistence is disabled and as the durable-store double in
//! tests: it counts reads and writes and can be switched into a failing
//! mode to exercise the repository's error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::RoomStore;
use super::models::RoomDocument;
use crate::domain::RoomId;
use crate::error::PokerError;

/// Room store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    documents: RwLock<HashMap<RoomId, RoomDocument>>,
    loads: AtomicUsize,
    stores: AtomicUsize,
    fail_loads: AtomicBool,
    fail_stores: AtomicBool,
}

impl MemoryRoomStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `load` calls served so far, including failed ones.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of successful `store` calls so far.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `load` fail (or succeed again).
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `store` fail (or succeed again).
    pub fn set_fail_stores(&self, fail: bool) {
        self.fail_stores.store(fail, Ordering::SeqCst);
    }

    /// Returns the raw stored document, bypassing expiry and counters.
    pub async fn peek(&self, room_id: &RoomId) -> Option<RoomDocument> {
        self.documents.read().await.get(room_id).cloned()
    }

    /// Writes a document directly, bypassing counters and failure mode.
    pub async fn insert(&self, document: RoomDocument) {
        self.documents
            .write()
            .await
            .insert(document.room_id().clone(), document);
    }

    /// Drops every expired document, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|_, doc| !doc.is_expired(now));
        before - documents.len()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn load(&self, room_id: &RoomId) -> Result<Option<RoomDocument>, PokerError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PokerError::RepositoryUnavailable(
                "memory store is failing loads".to_string(),
            ));
        }
        let documents = self.documents.read().await;
        Ok(documents
            .get(room_id)
            .filter(|doc| !doc.is_expired(Utc::now()))
            .cloned())
    }

    async fn store(&self, document: &RoomDocument) -> Result<(), PokerError> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(PokerError::RepositoryUnavailable(
                "memory store is failing stores".to_string(),
            ));
        }
        self.documents
            .write()
            .await
            .insert(document.room_id().clone(), document.clone());
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
