//! Audio output device port
//!
//! Models the single shared audio element the engine plays through. The
//! device is exclusively owned by the current playback session; switching
//! lectures stops and rebinds it, never shares it across two sessions.

use crate::cache::AssetHandle;
use crate::error::Result;

/// Platform audio output (a browser audio element, or a fake in tests).
///
/// Readiness, seek confirmation and end-of-stream arrive asynchronously as
/// [`DeviceEvent`]s delivered by the host, not as return values here.
pub trait AudioDevice {
    /// Attach a cached asset as the device source.
    fn bind(&mut self, handle: AssetHandle) -> Result<()>;

    /// Stop playback and detach the current source.
    fn unbind(&mut self);

    /// Start or resume playback of the bound source.
    fn play(&mut self) -> Result<()>;

    /// Pause playback.
    fn pause(&mut self);

    /// Begin seeking to a position in seconds. Completion is signalled
    /// via [`DeviceEvent::Seeked`].
    fn seek(&mut self, seconds: f64) -> Result<()>;

    /// Current playback position in seconds.
    fn position(&self) -> f64;

    /// Duration in seconds once the device has decoded metadata.
    fn duration(&self) -> Option<f64>;
}

/// Device-originated events, delivered by the host event loop.
///
/// These are not cancellable; the engine guards every one with an identity
/// check against the current session before mutating state.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The bound source is decoded far enough to play
    Ready,

    /// A requested seek completed
    Seeked,

    /// Periodic position update while playing
    TimeUpdate,

    /// Playback reached end of stream
    Ended,

    /// Media decode or playback failure
    Error(String),
}
