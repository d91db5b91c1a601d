//! Error types for the playback engine

use thiserror::Error;

use crate::types::LectureId;

/// Playback engine errors
///
/// Stale asynchronous completions are not represented here: a completion
/// that no longer refers to the current session is a normal race outcome
/// and is discarded silently, never surfaced.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Transport-level failure while fetching an asset or saving progress
    #[error("network failure: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// Transfer or device confirmation stalled beyond the bound
    #[error("request timed out")]
    Timeout,

    /// Browser media decode or playback failure
    #[error("audio device failure: {0}")]
    Device(String),

    /// The load was superseded by a newer request or an explicit abort
    #[error("load aborted")]
    LoadAborted,

    /// Operation requires an active playback session
    #[error("no active playback session")]
    NoSession,

    /// Lecture id not present in the current playlist
    #[error("unknown lecture: {0}")]
    UnknownLecture(LectureId),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;
