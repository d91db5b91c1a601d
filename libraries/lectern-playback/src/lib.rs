//! Lectern - Playback Engine
//!
//! Platform-agnostic lecture playback for Lectern.
//!
//! This crate provides:
//! - Bounded in-memory audio asset cache (LRU, handle revocation)
//! - Single-flight asset loading with cancellation on lecture switch
//! - Playback session state machine (load, restore, play, seek, end)
//! - Deferred play intent honored when a session becomes ready
//! - Debounced progress persistence with forced flushes
//! - Playlist navigation (next / previous, auto-advance on end)
//!
//! # Architecture
//!
//! `lectern-playback` is completely platform-agnostic:
//! - No dependency on a UI framework
//! - No dependency on a concrete HTTP client
//! - Works in a desktop shell, a server-side renderer, or tests
//!
//! Platform-specific code (audio output, asset download, the progress
//! store) is provided via traits. The engine queues [`PlayerEvent`]s and
//! the host drains them after each operation; it never calls back into
//! the UI.
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! use lectern_playback::{
//!     AssetFetcher, AssetHandle, AudioDevice, Lecture, LecturePlayer, PlayerConfig,
//!     ProgressStore, Result,
//! };
//!
//! // Implement AudioDevice for your platform
//! struct MyAudioOutput {
//!     // ... platform-specific audio element
//! }
//!
//! impl AudioDevice for MyAudioOutput {
//!     fn bind(&mut self, _handle: AssetHandle) -> Result<()> {
//!         Ok(())
//!     }
//!     fn unbind(&mut self) {}
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _seconds: f64) -> Result<()> {
//!         Ok(())
//!     }
//!     fn position(&self) -> f64 {
//!         0.0
//!     }
//!     fn duration(&self) -> Option<f64> {
//!         Some(180.0)
//!     }
//! }
//!
//! # async fn run(
//! #     fetcher: Arc<dyn AssetFetcher>,
//! #     store: Arc<dyn ProgressStore>,
//! # ) -> Result<()> {
//! let device = MyAudioOutput { /* ... */ };
//! let mut player = LecturePlayer::new(device, fetcher, store, PlayerConfig::default());
//!
//! player.set_playlist(vec![Lecture {
//!     id: 1,
//!     title: "Introduction".to_string(),
//!     audio_url: "https://lectures.example.org/media/1.mp3".to_string(),
//!     duration_hint: None,
//! }]);
//!
//! player.play_lecture(1).await?;
//!
//! // Drive timers from the host event loop
//! player.tick(Instant::now()).await?;
//!
//! // Dispatch queued events to the UI
//! for event in player.drain_events() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod device;
mod error;
mod events;
mod fetch;
mod loader;
mod player;
mod progress;
mod session;
mod store;
pub mod types;

// Public exports
pub use cache::{AssetCache, AssetHandle};
pub use device::{AudioDevice, DeviceEvent};
pub use error::{PlayerError, Result};
pub use events::PlayerEvent;
pub use fetch::AssetFetcher;
pub use loader::AssetLoader;
pub use player::LecturePlayer;
pub use progress::ProgressSynchronizer;
pub use session::{
    PauseAction, PlayAction, PlaybackSession, ReadyActions, SeekAction, SeekResolution,
};
pub use store::ProgressStore;
pub use types::{
    Lecture, LectureId, LoadProgress, PlayerConfig, ProgressAck, ProgressRecord, SavedProgress,
    SessionState,
};
