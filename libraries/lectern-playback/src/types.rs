//! Core types for the lecture playback engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique lecture identifier from the catalog.
pub type LectureId = u64;

/// Playlist entry for playback and display.
///
/// Eagerly loaded from the lecture catalog so the engine never has to
/// query metadata mid-playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    /// Unique lecture identifier
    pub id: LectureId,

    /// Lecture title
    pub title: String,

    /// Source URL for the audio asset
    pub audio_url: String,

    /// Duration known ahead of playback (seconds), if the catalog has it.
    /// The device reports the authoritative duration once metadata decodes.
    pub duration_hint: Option<f64>,
}

/// Playback session state
///
/// One explicit machine replacing the scattered readiness booleans the
/// engine would otherwise need. `Ready` is only reachable once both the
/// loader has resolved and the device has signalled playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No lecture selected
    Idle,

    /// Asset loading or device not yet playable
    Loading,

    /// Bound and playable, not playing
    Ready,

    /// Audio running
    Playing,

    /// Paused mid-lecture
    Paused,

    /// User seek issued, device confirmation pending
    Seeking,

    /// Reached end of stream
    Ended,

    /// Device or loader failure; user must re-trigger playback
    Failed,
}

/// Unit exchanged with the remote progress store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub lecture_id: LectureId,
    /// Playback position in seconds
    pub current_time: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// Whether the lecture was listened to completion
    pub completed: bool,
}

/// Server acknowledgement of a progress save, with derived fields the UI
/// relays to playlist cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAck {
    pub progress_percentage: f64,
    pub completed: bool,
    pub listen_count: u32,
}

/// Last known position as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub current_time: f64,
    pub completed: bool,
}

/// Byte-level download progress.
///
/// A cache hit still produces one synthetic 100% event so loading UI
/// resolves consistently regardless of asset origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProgress {
    /// 0.0 to 100.0; 0.0 when the total size is unknown
    pub percent: f64,
    pub bytes_loaded: u64,
    pub bytes_total: Option<u64>,
}

impl LoadProgress {
    /// Progress event for a payload that is already fully available.
    pub fn complete(size_bytes: u64) -> Self {
        Self {
            percent: 100.0,
            bytes_loaded: size_bytes,
            bytes_total: Some(size_bytes),
        }
    }
}

/// Configuration for the lecture player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Maximum number of decoded audio assets kept in memory (default: 3)
    pub cache_capacity: usize,

    /// Repeating progress-save period while playing (default: 5s)
    pub save_interval: Duration,

    /// Minimum position delta below which an unforced save is skipped,
    /// in seconds (default: 2.0)
    pub save_suppression_secs: f64,

    /// How long to wait for the device to confirm a seek before forcing
    /// resolution (default: 1.5s)
    pub seek_fallback: Duration,

    /// Step for relative skip operations, in seconds (default: 15.0)
    pub skip_seconds: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 3,
            save_interval: Duration::from_secs(5),
            save_suppression_secs: 2.0,
            seek_fallback: Duration::from_millis(1500),
            skip_seconds: 15.0,
        }
    }
}
