//! Polling change stream for one room.
//!
//! Each subscriber gets its own poller task that samples the room through
//! the repository on a fixed interval and forwards the room whenever its
//! `last_modified_at` has advanced. Several mutations between two samples
//! surface as a single change.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::domain::{Room, RoomId};
use crate::repository::RoomRepository;

/// Default interval between two samples of a room.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default pause after a failed repository read.
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(10);

/// Tuning knobs of the change stream.
#[derive(Debug, Clone, Copy)]
pub struct ChangeStreamConfig {
    /// Interval between two samples. Trades update latency for
    /// repository reads.
    pub poll_interval: Duration,
    /// Pause after the repository failed to answer a sample. A room
    /// that does not exist yet is re-sampled at `poll_interval`.
    pub error_backoff: Duration,
}

impl Default for ChangeStreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }
}

/// Decides whether a sampled room is a change worth forwarding.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    last_seen: DateTime<Utc>,
}

impl ChangeDetector {
    /// Creates a detector that ignores modifications up to `baseline`.
    #[must_use]
    pub const fn new(baseline: DateTime<Utc>) -> Self {
        Self { last_seen: baseline }
    }

    /// Returns `true` if `room` was modified after the last observed
    /// change, and remembers its modification time.
    pub fn observe(&mut self, room: &Room) -> bool {
        if room.last_modified_at() > self.last_seen {
            self.last_seen = room.last_modified_at();
            true
        } else {
            false
        }
    }

    /// Returns the modification time of the last observed change.
    #[must_use]
    pub const fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }
}

/// Receiving end of a room's change stream.
///
/// The poller stops when the token passed to
/// [`RoomChangeStream::spawn`] is cancelled or when the stream is dropped.
#[derive(Debug)]
pub struct RoomChangeStream {
    receiver: mpsc::Receiver<Room>,
    cancel: CancellationToken,
}

impl RoomChangeStream {
    /// Starts polling `room_id`. Only modifications made after this call
    /// are reported.
    #[must_use]
    pub fn spawn(
        repository: Arc<RoomRepository>,
        room_id: RoomId,
        config: ChangeStreamConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(1);
        let detector = ChangeDetector::new(Utc::now());
        tokio::spawn(poll_room(
            repository,
            room_id,
            config,
            detector,
            sender,
            cancel.clone(),
        ));
        Self { receiver, cancel }
    }

    /// Waits for the next changed room. Returns `None` once the poller
    /// has stopped.
    pub async fn next(&mut self) -> Option<Room> {
        self.receiver.recv().await
    }

    /// Stops the poller.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RoomChangeStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_room(
    repository: Arc<RoomRepository>,
    room_id: RoomId,
    config: ChangeStreamConfig,
    mut detector: ChangeDetector,
    sender: mpsc::Sender<Room>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match repository.find(&room_id).await {
            Ok(Some(room)) => {
                if detector.observe(&room) {
                    tracing::debug!(%room_id, last_modified = %room.last_modified_at(), "room changed");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        sent = sender.send(room) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            // Not created yet; the first join is picked up on a later tick.
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%room_id, error = %err, "room poll failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(config.error_backoff) => {}
                }
            }
        }
    }

    tracing::debug!(%room_id, "change stream stopped");
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Point;
    use crate::persistence::{MemoryRoomStore, RoomStore};

    fn room_id(raw: &str) -> RoomId {
        let Ok(id) = RoomId::new(raw) else {
            panic!("valid room id");
        };
        id
    }

    fn fast_config() -> ChangeStreamConfig {
        ChangeStreamConfig {
            poll_interval: Duration::from_millis(10),
            error_backoff: Duration::from_millis(10),
        }
    }

    fn make_repository() -> Arc<RoomRepository> {
        let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new());
        Arc::new(RoomRepository::new(store))
    }

    #[test]
    fn detector_ignores_modifications_before_baseline() {
        let room = Room::new(room_id("r1"));
        let mut detector = ChangeDetector::new(Utc::now());
        assert!(!detector.observe(&room));
    }

    #[test]
    fn detector_coalesces_mutations_between_samples() {
        let mut room = Room::new(room_id("r1"));
        let mut detector = ChangeDetector::new(room.last_modified_at());
        assert!(!detector.observe(&room));

        assert!(room.add_user("alice").is_ok());
        assert!(room.set_estimate("alice", Point::numeric(3)).is_ok());
        room.reveal_estimates();

        assert!(detector.observe(&room));
        assert_eq!(detector.last_seen(), room.last_modified_at());
        assert!(!detector.observe(&room));
    }

    #[tokio::test]
    async fn stream_reports_one_change_per_advance() {
        let repository = make_repository();
        let id = room_id("r1");
        let mut room = Room::new(id.clone());
        assert!(repository.save(&room).await.is_ok());

        let mut stream = RoomChangeStream::spawn(
            Arc::clone(&repository),
            id.clone(),
            fast_config(),
            CancellationToken::new(),
        );

        // Nothing changed since subscribing.
        let quiet = tokio::time::timeout(Duration::from_millis(60), stream.next()).await;
        assert!(quiet.is_err());

        assert!(room.add_user("alice").is_ok());
        assert!(room.add_user("bob").is_ok());
        assert!(repository.save(&room).await.is_ok());

        let changed = tokio::time::timeout(Duration::from_secs(2), stream.next()).await;
        let Ok(Some(changed)) = changed else {
            panic!("expected a change");
        };
        assert_eq!(changed.len(), 2);

        let again = tokio::time::timeout(Duration::from_millis(60), stream.next()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn cancellation_ends_stream() {
        let repository = make_repository();
        let cancel = CancellationToken::new();
        let mut stream = RoomChangeStream::spawn(
            repository,
            room_id("missing"),
            fast_config(),
            cancel.clone(),
        );

        cancel.cancel();
        let ended = tokio::time::timeout(Duration::from_secs(2), stream.next()).await;
        assert!(matches!(ended, Ok(None)));
    }

    #[tokio::test]
    async fn room_created_after_subscribing_is_seen_promptly() {
        let repository = make_repository();
        let id = room_id("fresh");
        let mut stream = RoomChangeStream::spawn(
            Arc::clone(&repository),
            id.clone(),
            ChangeStreamConfig::default(),
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        let mut room = Room::new(id);
        assert!(room.add_user("alice").is_ok());
        assert!(room.add_user("bob").is_ok());
        assert!(repository.save(&room).await.is_ok());

        let changed = tokio::time::timeout(Duration::from_secs(1), stream.next()).await;
        let Ok(Some(changed)) = changed else {
            panic!("new room not reported within a second");
        };
        assert_eq!(changed.len(), 2);
    }

    #[tokio::test]
    async fn failed_reads_back_off_then_recover() {
        let store = Arc::new(MemoryRoomStore::new());
        let repository = Arc::new(RoomRepository::new(
            Arc::clone(&store) as Arc<dyn RoomStore>
        ));
        let id = room_id("flaky");
        store.set_fail_loads(true);

        let mut stream = RoomChangeStream::spawn(
            Arc::clone(&repository),
            id.clone(),
            ChangeStreamConfig {
                poll_interval: Duration::from_millis(10),
                error_backoff: Duration::from_millis(200),
            },
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        // One read, then the poller is still backing off.
        assert_eq!(store.load_count(), 1);

        store.set_fail_loads(false);
        let mut room = Room::new(id);
        assert!(room.add_user("carol").is_ok());
        assert!(repository.save(&room).await.is_ok());

        let changed = tokio::time::timeout(Duration::from_secs(2), stream.next()).await;
        assert!(matches!(changed, Ok(Some(_))));
    }

    #[tokio::test]
    async fn stream_waits_for_room_to_appear() {
        let repository = make_repository();
        let id = room_id("later");
        let mut stream = RoomChangeStream::spawn(
            Arc::clone(&repository),
            id.clone(),
            fast_config(),
            CancellationToken::new(),
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        let mut room = Room::new(id);
        assert!(room.add_user("carol").is_ok());
        assert!(repository.save(&room).await.is_ok());

        let changed = tokio::time::timeout(Duration::from_secs(2), stream.next()).await;
        let Ok(Some(changed)) = changed else {
            panic!("expected the new room");
        };
        assert!(changed.participant("carol").is_some());
    }
}
