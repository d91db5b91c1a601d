//! Player events
//!
//! Notification port toward UI collaborators (playlist cards, markers,
//! favorites). Events are queued in the facade and drained by the host;
//! the engine never talks to a UI framework directly.

use serde::{Deserialize, Serialize};

use crate::types::{LectureId, ProgressAck, SessionState};

/// Events emitted by the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Session state changed
    StateChanged {
        state: SessionState,
    },

    /// A different lecture became current
    LectureChanged {
        lecture_id: LectureId,
        previous_lecture_id: Option<LectureId>,
    },

    /// Download progress for the current lecture's audio asset.
    /// A cache hit produces a single synthetic 100% event.
    LoadProgress {
        lecture_id: LectureId,
        percent: f64,
        bytes_loaded: u64,
        bytes_total: Option<u64>,
    },

    /// Periodic position update while playing
    PositionUpdate {
        position_secs: f64,
        duration_secs: f64,
    },

    /// The remote store acknowledged a progress save; carries the
    /// server's derived fields for playlist card updates.
    ProgressSaved {
        lecture_id: LectureId,
        ack: ProgressAck,
    },

    /// The current lecture played to the end
    LectureEnded {
        lecture_id: LectureId,
    },

    /// A failure surfaced to the user, once per fault
    Error {
        message: String,
    },
}
