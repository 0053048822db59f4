//! Session service: the planning poker use cases as repository
//! transactions.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::change_stream::{ChangeStreamConfig, RoomChangeStream};
use crate::domain::{Point, Room, RoomId};
use crate::error::PokerError;
use crate::repository::RoomRepository;

/// Orchestration layer for every room operation.
///
/// Stateless coordinator over a shared [`RoomRepository`]. Every mutation
/// follows the same pattern inside one exclusive transaction: find the
/// room → mutate the checked-out copy → save → return the saved room.
#[derive(Debug, Clone)]
pub struct SessionService {
    repository: Arc<RoomRepository>,
    change_config: ChangeStreamConfig,
}

impl SessionService {
    /// Creates a new `SessionService`.
    #[must_use]
    pub fn new(repository: Arc<RoomRepository>, change_config: ChangeStreamConfig) -> Self {
        Self {
            repository,
            change_config,
        }
    }

    /// Returns the current state of a room.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RoomNotFound`] if the room does not exist, or
    /// [`PokerError::RepositoryUnavailable`] if it cannot be loaded.
    pub async fn get(&self, room_id: &RoomId) -> Result<Room, PokerError> {
        self.repository
            .find(room_id)
            .await?
            .ok_or_else(|| PokerError::RoomNotFound(room_id.clone()))
    }

    /// Joins a room, creating it on first reference. Joining under a name
    /// that is already present refreshes that participant.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::InvalidRequest`] for a blank name, or
    /// [`PokerError::RepositoryUnavailable`] if the room cannot be loaded
    /// or saved.
    pub async fn join(&self, room_id: &RoomId, user_name: &str) -> Result<Room, PokerError> {
        let user_name = normalize_user_name(user_name)?;
        let repository = &*self.repository;
        let room = repository
            .with_exclusive_transaction(move || async move {
                let mut room = repository
                    .find(room_id)
                    .await?
                    .unwrap_or_else(|| Room::new(room_id.clone()));
                match room.add_user(user_name) {
                    Ok(()) | Err(PokerError::UserAlreadyExists(_)) => {}
                    Err(err) => return Err(err),
                }
                repository.save(&room).await?;
                Ok(room)
            })
            .await?;

        tracing::info!(%room_id, user_name, "user joined");
        Ok(room)
    }

    /// Leaves a room.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::InvalidRequest`] for a blank name,
    /// [`PokerError::RoomNotFound`] or [`PokerError::UserNotFound`] if
    /// there is nothing to leave, or [`PokerError::RepositoryUnavailable`]
    /// on storage failure.
    pub async fn leave(&self, room_id: &RoomId, user_name: &str) -> Result<Room, PokerError> {
        let user_name = normalize_user_name(user_name)?;
        let room = self
            .mutate(room_id, |room| room.remove_user(user_name))
            .await?;
        tracing::info!(%room_id, user_name, "user left");
        Ok(room)
    }

    /// Plays a card. The first card after a reveal starts a new round.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::InvalidRequest`] for a blank name,
    /// [`PokerError::RoomNotFound`] or [`PokerError::UserNotFound`] if the
    /// room or participant is missing, or
    /// [`PokerError::RepositoryUnavailable`] on storage failure.
    pub async fn set_estimate(
        &self,
        room_id: &RoomId,
        user_name: &str,
        point: Point,
    ) -> Result<Room, PokerError> {
        let user_name = normalize_user_name(user_name)?;
        self.mutate(room_id, move |room| room.set_estimate(user_name, point))
            .await
    }

    /// Reveals every card in the room.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RoomNotFound`] if the room is missing, or
    /// [`PokerError::RepositoryUnavailable`] on storage failure.
    pub async fn reveal(&self, room_id: &RoomId) -> Result<Room, PokerError> {
        let room = self
            .mutate(room_id, |room| {
                room.reveal_estimates();
                Ok(())
            })
            .await?;
        tracing::info!(%room_id, participants = room.len(), "estimates revealed");
        Ok(room)
    }

    /// Clears every card in the room without changing its round state.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RoomNotFound`] if the room is missing, or
    /// [`PokerError::RepositoryUnavailable`] on storage failure.
    pub async fn reset(&self, room_id: &RoomId) -> Result<Room, PokerError> {
        let room = self
            .mutate(room_id, |room| {
                room.reset_estimates();
                Ok(())
            })
            .await?;
        tracing::info!(%room_id, "estimates reset");
        Ok(room)
    }

    /// Subscribes to changes of a room. The poller stops when `cancel` is
    /// cancelled or the returned stream is dropped.
    #[must_use]
    pub fn change_stream(&self, room_id: RoomId, cancel: CancellationToken) -> RoomChangeStream {
        RoomChangeStream::spawn(
            Arc::clone(&self.repository),
            room_id,
            self.change_config,
            cancel,
        )
    }

    /// Runs `apply` on an existing room inside one transaction and saves
    /// the result.
    async fn mutate<F>(&self, room_id: &RoomId, apply: F) -> Result<Room, PokerError>
    where
        F: FnOnce(&mut Room) -> Result<(), PokerError>,
    {
        let repository = &*self.repository;
        repository
            .with_exclusive_transaction(move || async move {
                let mut room = repository
                    .find(room_id)
                    .await?
                    .ok_or_else(|| PokerError::RoomNotFound(room_id.clone()))?;
                apply(&mut room)?;
                repository.save(&room).await?;
                Ok(room)
            })
            .await
    }
}

/// Trims a user name, rejecting blank ones.
fn normalize_user_name(user_name: &str) -> Result<&str, PokerError> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(PokerError::InvalidRequest(
            "user name must not be empty".to_string(),
        ));
    }
    Ok(user_name)
}
