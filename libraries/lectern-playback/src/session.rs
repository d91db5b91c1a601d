//! Per-lecture playback session state machine
//!
//! `Idle → Loading → (Ready | Failed)`; `Ready ⇄ Playing ⇄ Paused`;
//! `Playing|Paused → Seeking → Ready`; `Playing → Ended`; any state is
//! abandoned when the session is superseded.
//!
//! The machine is pure: transitions mutate session state and return small
//! typed actions describing what the facade must do to the device. This
//! keeps every guard unit-testable without a device or a network.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::types::{LectureId, SessionState};

/// What the facade must do to the device after the session became ready.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReadyActions {
    /// Restore position to apply, already clamped to `[0, duration - 1]`
    pub apply_seek: Option<f64>,

    /// Honor a deferred play intent now
    pub start_playback: bool,
}

/// Outcome of a `request_play` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    /// Start the device now
    Start,

    /// Not ready yet; the intent was deferred and will be honored once,
    /// the instant the session reaches `Ready`
    Deferred,

    /// Nothing to do (already playing, or the session has failed)
    Ignored,
}

/// Outcome of a `request_pause` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    /// Pause the device now
    Pause,

    /// Nothing to do
    Ignored,
}

/// Outcome of a `begin_seek` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekAction {
    /// Start a device seek to this clamped position
    Seek(f64),

    /// Rejected: not in a seekable state, a seek is already pending, or
    /// the duration is still unknown
    Ignored,
}

/// Result of a seek reaching resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekResolution {
    /// Playback runs after resolution: the session was playing when the
    /// seek started, or play was requested mid-seek. Otherwise it
    /// settles in `Ready`.
    pub resume_playback: bool,
}

/// State for one selected lecture, layered on the shared audio device.
///
/// Created when a lecture is selected, superseded when a different one is;
/// the facade assigns a monotonic version so stale asynchronous
/// completions can be detected and dropped.
#[derive(Debug)]
pub struct PlaybackSession {
    lecture_id: LectureId,
    version: u64,
    state: SessionState,
    fully_loaded: bool,
    device_ready: bool,
    pending_play: bool,
    target_seek_time: Option<f64>,
    restore_applied: bool,
    resume_after_seek: bool,
    seek_deadline: Option<Instant>,
    duration: Option<f64>,
}

impl PlaybackSession {
    /// New session in `Loading`, readiness flags reset.
    pub fn new(lecture_id: LectureId, version: u64) -> Self {
        Self {
            lecture_id,
            version,
            state: SessionState::Loading,
            fully_loaded: false,
            device_ready: false,
            pending_play: false,
            target_seek_time: None,
            restore_applied: false,
            resume_after_seek: false,
            seek_deadline: None,
            duration: None,
        }
    }

    pub fn lecture_id(&self) -> LectureId {
        self.lecture_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Duration as currently known (device-reported, else catalog hint).
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Whether the session is bound to a usable source.
    pub fn is_ready(&self) -> bool {
        matches!(
            self.state,
            SessionState::Ready
                | SessionState::Playing
                | SessionState::Paused
                | SessionState::Seeking
                | SessionState::Ended
        )
    }

    /// Seed the duration from the catalog before the device reports one.
    pub fn set_duration_hint(&mut self, duration: Option<f64>) {
        if self.duration.is_none() {
            self.duration = duration.filter(|d| *d > 0.0);
        }
    }

    /// Request that playback resume from a saved position once ready.
    /// Only meaningful before `Ready`; applied at most once per session.
    pub fn set_restore_position(&mut self, seconds: f64) {
        if !self.restore_applied && seconds > 0.0 {
            self.target_seek_time = Some(seconds);
        }
    }

    /// Arm the deferred play intent without requiring `Ready` first.
    pub fn defer_play(&mut self) {
        self.pending_play = true;
    }

    /// The loader resolved for this session. Returns ready actions when
    /// this was the last missing readiness signal.
    pub fn mark_fully_loaded(&mut self) -> Option<ReadyActions> {
        self.fully_loaded = true;
        self.try_ready()
    }

    /// The device signalled playable. A cache hit still requires this:
    /// decode and attachment latency is real even without network latency.
    pub fn mark_device_ready(&mut self, device_duration: Option<f64>) -> Option<ReadyActions> {
        if let Some(duration) = device_duration.filter(|d| *d > 0.0) {
            self.duration = Some(duration);
        }
        self.device_ready = true;
        self.try_ready()
    }

    fn try_ready(&mut self) -> Option<ReadyActions> {
        if self.state != SessionState::Loading || !self.fully_loaded || !self.device_ready {
            return None;
        }
        Some(self.enter_ready())
    }

    fn enter_ready(&mut self) -> ReadyActions {
        self.state = SessionState::Ready;
        let mut actions = ReadyActions::default();

        if !self.restore_applied {
            self.restore_applied = true;
            if let (Some(target), Some(duration)) = (self.target_seek_time.take(), self.duration) {
                actions.apply_seek = Some(clamp_position(target, duration));
            }
        }

        if self.pending_play {
            self.pending_play = false;
            self.state = SessionState::Playing;
            actions.start_playback = true;
        }

        actions
    }

    pub fn request_play(&mut self) -> PlayAction {
        match self.state {
            SessionState::Ready | SessionState::Paused | SessionState::Ended => {
                self.state = SessionState::Playing;
                PlayAction::Start
            }
            SessionState::Playing => PlayAction::Ignored,
            SessionState::Seeking => {
                // Honor the intent once the pending seek resolves.
                self.resume_after_seek = true;
                PlayAction::Ignored
            }
            SessionState::Idle | SessionState::Loading => {
                self.pending_play = true;
                PlayAction::Deferred
            }
            SessionState::Failed => PlayAction::Ignored,
        }
    }

    pub fn request_pause(&mut self) -> PauseAction {
        self.pending_play = false;
        match self.state {
            SessionState::Playing | SessionState::Ready => {
                self.state = SessionState::Paused;
                PauseAction::Pause
            }
            SessionState::Seeking => {
                // The device must fall silent now, not when the seek
                // resolves; the session settles in `Ready` afterwards.
                self.resume_after_seek = false;
                PauseAction::Pause
            }
            _ => PauseAction::Ignored,
        }
    }

    /// Begin a user seek. Rejected while a previous seek is unresolved.
    pub fn begin_seek(&mut self, target: f64, now: Instant, fallback: Duration) -> SeekAction {
        let Some(duration) = self.duration else {
            return SeekAction::Ignored;
        };
        match self.state {
            SessionState::Ready | SessionState::Playing | SessionState::Paused => {
                self.resume_after_seek = self.state == SessionState::Playing;
                self.state = SessionState::Seeking;
                self.seek_deadline = Some(now + fallback);
                SeekAction::Seek(clamp_position(target, duration))
            }
            _ => SeekAction::Ignored,
        }
    }

    /// Resolve the pending seek, from the device confirmation or from the
    /// fallback deadline. No-op outside `Seeking`.
    pub fn complete_seek(&mut self) -> Option<SeekResolution> {
        if self.state != SessionState::Seeking {
            return None;
        }
        self.seek_deadline = None;
        let resume_playback = self.resume_after_seek;
        self.resume_after_seek = false;
        self.state = if resume_playback {
            SessionState::Playing
        } else {
            SessionState::Ready
        };
        Some(SeekResolution { resume_playback })
    }

    /// Whether the seek fallback deadline has passed without the device
    /// confirming. Guarantees the machine cannot wedge in `Seeking`.
    pub fn seek_deadline_due(&self, now: Instant) -> bool {
        self.state == SessionState::Seeking && self.seek_deadline.is_some_and(|d| now >= d)
    }

    /// End of stream reached.
    pub fn mark_ended(&mut self) {
        self.pending_play = false;
        self.seek_deadline = None;
        self.state = SessionState::Ended;
    }

    /// Device or loader failure. Resets readiness flags and pending
    /// intents; the user must re-trigger playback.
    pub fn mark_failed(&mut self) {
        trace!(lecture_id = self.lecture_id, "session failed");
        self.fully_loaded = false;
        self.device_ready = false;
        self.pending_play = false;
        self.resume_after_seek = false;
        self.seek_deadline = None;
        self.state = SessionState::Failed;
    }
}

/// Clamp a seek target to `[0, duration - 1]` so restoring a position at
/// or past end-of-stream never seeks out of range.
fn clamp_position(target: f64, duration: f64) -> f64 {
    target.min((duration - 1.0).max(0.0)).max(0.0)
}
