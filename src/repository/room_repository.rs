//! Cache-aside room repository with a global transaction lock.
//!
//! [`RoomRepository`] keeps every room it has seen in a `HashMap` behind a
//! [`tokio::sync::RwLock`]. Reads are served from the map; a miss hydrates
//! from the durable [`RoomStore`]. Saves write the durable document first
//! and only then publish the room to the map, so a failed save leaves the
//! cache as it was.
//!
//! # Concurrency
//!
//! - Cached reads never wait on durable-store I/O.
//! - Saves are serialized by a dedicated lock held across the durable
//!   write and the cache update.
//! - [`RoomRepository::with_exclusive_transaction`] runs one
//!   read-modify-write at a time across *all* rooms. This caps throughput
//!   at one transaction in flight per process; it is not needed for room
//!   integrity, which the checked-out copy already guarantees.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Room, RoomId};
use crate::error::PokerError;
use crate::persistence::{RoomDocument, RoomStore};

/// Default time-to-live hint attached to stored rooms.
pub const DEFAULT_ROOM_TTL_HOURS: i64 = 24;

/// Process-wide owner of every room.
///
/// [`RoomRepository::find`] hands out owned copies; callers mutate their
/// copy and publish it with [`RoomRepository::save`]. No reference to the
/// cached room ever leaves the repository.
#[derive(Debug)]
pub struct RoomRepository {
    rooms: RwLock<HashMap<RoomId, Room>>,
    store: Arc<dyn RoomStore>,
    save_lock: Mutex<()>,
    transaction_lock: Mutex<()>,
    ttl: Duration,
}

impl RoomRepository {
    /// Creates a repository over `store` with the default 24 hour TTL hint.
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self::with_ttl(store, Duration::hours(DEFAULT_ROOM_TTL_HOURS))
    }

    /// Creates a repository over `store` attaching `ttl` to every write.
    #[must_use]
    pub fn with_ttl(store: Arc<dyn RoomStore>, ttl: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            store,
            save_lock: Mutex::new(()),
            transaction_lock: Mutex::new(()),
            ttl,
        }
    }

    /// Returns the room, from memory if cached, otherwise from the store.
    ///
    /// `Ok(None)` means neither holds the room; callers that may create
    /// rooms construct a fresh one. A successful hydration is cached
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RepositoryUnavailable`] if the store fails or
    /// holds a document that does not decode to a valid room.
    pub async fn find(&self, room_id: &RoomId) -> Result<Option<Room>, PokerError> {
        if let Some(room) = self.rooms.read().await.get(room_id) {
            return Ok(Some(room.clone()));
        }

        let Some(document) = self.store.load(room_id).await? else {
            tracing::debug!(%room_id, "room not in store");
            return Ok(None);
        };
        let hydrated = Room::from_record(document.room).map_err(|e| {
            PokerError::RepositoryUnavailable(format!("corrupt document for room {room_id}: {e}"))
        })?;

        // A save may have published a newer copy while we were loading.
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.clone()).or_insert(hydrated).clone();
        tracing::debug!(%room_id, "room hydrated from store");
        Ok(Some(room))
    }

    /// Writes the room to the store, then publishes it to the cache.
    ///
    /// Once this returns `Ok`, every `find` sees the saved room without
    /// touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RepositoryUnavailable`] if the durable write
    /// fails. The cache is not updated in that case.
    pub async fn save(&self, room: &Room) -> Result<(), PokerError> {
        let document = RoomDocument::new(room.to_record(), Utc::now() + self.ttl);

        let _guard = self.save_lock.lock().await;
        self.store.store(&document).await?;
        self.rooms
            .write()
            .await
            .insert(room.id().clone(), room.clone());

        tracing::info!(
            room_id = %room.id(),
            last_modified = %room.last_modified_at(),
            "room saved"
        );
        Ok(())
    }

    /// Runs `f` while no other transaction runs on this repository.
    ///
    /// `f` typically finds a room, mutates its copy and saves it. If `f`
    /// fails before saving, nothing is published.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub async fn with_exclusive_transaction<F, Fut, T>(&self, f: F) -> Result<T, PokerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PokerError>>,
    {
        let _guard = self.transaction_lock.lock().await;
        let result = f().await;
        if let Err(err) = &result
            && err.is_fatal()
        {
            tracing::error!(error = %err, "transaction aborted");
        }
        result
    }

    /// Returns the number of cached rooms.
    pub async fn cached_len(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Returns `true` if the room is cached in memory.
    pub async fn is_cached(&self, room_id: &RoomId) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }
}
