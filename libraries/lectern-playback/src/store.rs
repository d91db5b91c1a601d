//! Remote progress store port

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{LectureId, ProgressAck, ProgressRecord, SavedProgress};

/// Persists playback position to the remote store and reads it back.
///
/// Save round trips are fire-and-forget at the protocol level: the engine
/// logs a failed save and retries with the same delta on the next eligible
/// tick, and discards an acknowledgement that loses the race against a
/// session switch.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Persist a progress record, returning the server's derived fields.
    async fn save(&self, record: &ProgressRecord) -> Result<ProgressAck>;

    /// Last known position for a lecture, `None` when the store has none.
    async fn fetch(&self, id: LectureId) -> Result<Option<SavedProgress>>;

    /// Announce which lecture the listener is on. Acknowledgement only.
    async fn set_current(&self, id: LectureId) -> Result<()>;
}
