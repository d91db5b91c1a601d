//! Lecture player - composition root
//!
//! Owns one asset cache, one loader, the current playback session and the
//! progress synchronizer, and exposes the consumer-facing operations.
//! Single-threaded cooperative scheduling: overlapping asynchronous
//! completions are resolved by identity checks (session version and
//! lecture id), never by locking across suspension points.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::cache::AssetCache;
use crate::device::{AudioDevice, DeviceEvent};
use crate::error::{PlayerError, Result};
use crate::events::PlayerEvent;
use crate::fetch::AssetFetcher;
use crate::loader::AssetLoader;
use crate::progress::ProgressSynchronizer;
use crate::session::{PauseAction, PlayAction, PlaybackSession, ReadyActions, SeekAction};
use crate::store::ProgressStore;
use crate::types::{Lecture, LectureId, LoadProgress, PlayerConfig, ProgressRecord, SessionState};

/// Central playback orchestration over a single shared audio device.
pub struct LecturePlayer<D: AudioDevice> {
    device: D,
    cache: Arc<Mutex<AssetCache>>,
    loader: AssetLoader,
    store: Arc<dyn ProgressStore>,
    sync: ProgressSynchronizer,
    session: Option<PlaybackSession>,
    next_version: u64,
    playlist: Vec<Lecture>,
    pending_events: Vec<PlayerEvent>,
    config: PlayerConfig,
}

impl<D: AudioDevice> LecturePlayer<D> {
    pub fn new(
        device: D,
        fetcher: Arc<dyn AssetFetcher>,
        store: Arc<dyn ProgressStore>,
        config: PlayerConfig,
    ) -> Self {
        let cache = Arc::new(Mutex::new(AssetCache::new(config.cache_capacity)));
        let loader = AssetLoader::new(Arc::clone(&cache), fetcher);
        let sync = ProgressSynchronizer::new(config.save_interval, config.save_suppression_secs);
        Self {
            device,
            cache,
            loader,
            store,
            sync,
            session: None,
            next_version: 0,
            playlist: Vec::new(),
            pending_events: Vec::new(),
            config,
        }
    }

    // ===== Playlist =====

    pub fn set_playlist(&mut self, lectures: Vec<Lecture>) {
        self.playlist = lectures;
    }

    pub fn playlist(&self) -> &[Lecture] {
        &self.playlist
    }

    // ===== Lecture selection =====

    /// Select a lecture for playback.
    ///
    /// Flushes the outgoing session's progress, cancels its network
    /// activity, builds the new session, restores the last known position
    /// from the store, loads the asset (cache or network) and binds the
    /// device. Selection carries a play intent, honored the instant the
    /// session reaches `Ready`.
    pub async fn play_lecture(&mut self, id: LectureId) -> Result<()> {
        let lecture = self
            .playlist
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(PlayerError::UnknownLecture(id))?;

        let previous = self.session.as_ref().map(|s| s.lecture_id());
        self.teardown_session().await;

        self.next_version += 1;
        let version = self.next_version;
        let mut session = PlaybackSession::new(id, version);
        session.set_duration_hint(lecture.duration_hint);
        session.defer_play();
        self.session = Some(session);
        self.sync.reset(0.0);
        debug!(lecture_id = id, version, "lecture selected");
        self.emit_state_changed(SessionState::Loading);
        self.emit(PlayerEvent::LectureChanged {
            lecture_id: id,
            previous_lecture_id: previous,
        });

        // Fire-and-forget announce; failure never blocks playback.
        if let Err(err) = self.store.set_current(id).await {
            warn!(lecture_id = id, error = %err, "set-current announce failed");
        }

        match self.store.fetch(id).await {
            Ok(Some(saved)) if !saved.completed && saved.current_time > 0.0 => {
                if let Some(session) = self.session.as_mut() {
                    session.set_restore_position(saved.current_time);
                }
                self.sync.reset(saved.current_time);
            }
            Ok(_) => {}
            Err(err) => warn!(lecture_id = id, error = %err, "progress fetch failed"),
        }

        let loader = &self.loader;
        let events = &mut self.pending_events;
        let outcome = loader
            .load(id, &lecture.audio_url, &mut |p: LoadProgress| {
                events.push(PlayerEvent::LoadProgress {
                    lecture_id: id,
                    percent: p.percent,
                    bytes_loaded: p.bytes_loaded,
                    bytes_total: p.bytes_total,
                });
            })
            .await;

        // The session may have been superseded while the download was in
        // flight; a stale completion must not touch the new session.
        if self.session.as_ref().map(|s| s.version()) != Some(version) {
            trace!(lecture_id = id, "stale load completion discarded");
            return Ok(());
        }

        match outcome {
            Ok(handle) => {
                if let Err(err) = self.device.bind(handle) {
                    self.fail_session(err.to_string());
                    return Err(err);
                }
                if let Some(actions) = self.session.as_mut().and_then(|s| s.mark_fully_loaded()) {
                    self.apply_ready_actions(actions)?;
                }
                Ok(())
            }
            Err(PlayerError::LoadAborted) => {
                trace!(lecture_id = id, "load aborted");
                Ok(())
            }
            Err(err) => {
                self.fail_session(err.to_string());
                Err(err)
            }
        }
    }

    /// Advance to the next playlist entry, if any.
    pub async fn play_next(&mut self) -> Result<()> {
        match self.neighbor_lecture(1) {
            Some(next) => self.play_lecture(next).await,
            None => {
                debug!("end of playlist");
                Ok(())
            }
        }
    }

    /// Go back to the previous playlist entry, if any.
    pub async fn play_previous(&mut self) -> Result<()> {
        match self.neighbor_lecture(-1) {
            Some(prev) => self.play_lecture(prev).await,
            None => Ok(()),
        }
    }

    fn neighbor_lecture(&self, offset: i64) -> Option<LectureId> {
        let current = self.session.as_ref().map(|s| s.lecture_id())?;
        let index = self.playlist.iter().position(|l| l.id == current)? as i64 + offset;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.playlist.get(i))
            .map(|l| l.id)
    }

    // ===== Playback control =====

    pub fn request_play(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        match session.request_play() {
            PlayAction::Start => self.start_playback(),
            PlayAction::Deferred => {
                trace!("play deferred until session is ready");
                Ok(())
            }
            PlayAction::Ignored => Ok(()),
        }
    }

    pub async fn request_pause(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        match session.request_pause() {
            PauseAction::Pause => {
                self.device.pause();
                self.sync.disarm();
                // Pausing mid-seek leaves the session in `Seeking`; the
                // settled state is announced when the seek resolves.
                if self.state() == SessionState::Paused {
                    self.emit_state_changed(SessionState::Paused);
                }
                self.save_progress(false, true).await;
                Ok(())
            }
            PauseAction::Ignored => Ok(()),
        }
    }

    /// User seek to an absolute position. Ignored while a previous seek
    /// is still unresolved.
    pub fn seek_to(&mut self, seconds: f64) -> Result<()> {
        let fallback = self.config.seek_fallback;
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        match session.begin_seek(seconds, Instant::now(), fallback) {
            SeekAction::Seek(target) => {
                self.emit_state_changed(SessionState::Seeking);
                if let Err(err) = self.device.seek(target) {
                    self.fail_session(err.to_string());
                    return Err(err);
                }
                // Optimistic update before the device confirms.
                self.emit_position_update();
                Ok(())
            }
            SeekAction::Ignored => Ok(()),
        }
    }

    /// Relative seek by `delta_seconds`, clamped to the lecture bounds.
    pub fn skip(&mut self, delta_seconds: f64) -> Result<()> {
        let Some(duration) = self.known_duration() else {
            return Ok(());
        };
        let target = (self.device.position() + delta_seconds).clamp(0.0, duration);
        self.seek_to(target)
    }

    pub fn skip_forward(&mut self) -> Result<()> {
        self.skip(self.config.skip_seconds)
    }

    pub fn skip_back(&mut self) -> Result<()> {
        self.skip(-self.config.skip_seconds)
    }

    // ===== Device events =====

    /// Entry point for host-delivered device events.
    ///
    /// `lecture_id` names the lecture the device was bound to when the
    /// event fired; an event for a superseded session is a no-op.
    pub async fn handle_device_event(
        &mut self,
        lecture_id: LectureId,
        event: DeviceEvent,
    ) -> Result<()> {
        if self.session.as_ref().map(|s| s.lecture_id()) != Some(lecture_id) {
            trace!(lecture_id, ?event, "stale device event discarded");
            return Ok(());
        }
        match event {
            DeviceEvent::Ready => {
                let duration = self.device.duration();
                if let Some(actions) = self
                    .session
                    .as_mut()
                    .and_then(|s| s.mark_device_ready(duration))
                {
                    self.apply_ready_actions(actions)?;
                }
                Ok(())
            }
            DeviceEvent::Seeked => self.resolve_seek().await,
            DeviceEvent::TimeUpdate => {
                self.emit_position_update();
                Ok(())
            }
            DeviceEvent::Ended => self.handle_ended().await,
            DeviceEvent::Error(message) => {
                self.fail_session(message);
                Ok(())
            }
        }
    }

    /// Drive the periodic save timer and the seek fallback deadline.
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        if self.session.as_ref().is_some_and(|s| s.seek_deadline_due(now)) {
            warn!("device never confirmed seek, forcing resolution");
            self.resolve_seek().await?;
        }
        if self.state() == SessionState::Playing && self.sync.timer_due(now) {
            self.sync.rearm(now);
            self.save_progress(false, false).await;
        }
        Ok(())
    }

    // ===== Teardown =====

    /// Force a progress write for the current session, if it has one
    /// worth writing. Called by hosts on page hide/unload.
    pub async fn flush(&mut self) {
        let eligible = self
            .session
            .as_ref()
            // A completed save already flushed when the lecture ended.
            .is_some_and(|s| s.is_ready() && s.state() != SessionState::Ended);
        if eligible {
            self.save_progress(false, true).await;
        }
    }

    /// Flush progress, drop the session and release every cached asset.
    pub async fn shutdown(&mut self) {
        self.flush().await;
        self.loader.abort();
        self.sync.disarm();
        self.device.pause();
        self.device.unbind();
        self.session = None;
        self.cache.lock().unwrap().evict_all();
        debug!("player shut down");
    }

    // ===== Queries =====

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, |s| s.state())
    }

    pub fn current_lecture(&self) -> Option<LectureId> {
        self.session.as_ref().map(|s| s.lecture_id())
    }

    pub fn position(&self) -> f64 {
        self.device.position()
    }

    pub fn is_ready(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_ready())
    }

    /// Whether a lecture's asset is cached, used to skip loading UI.
    pub fn is_loaded(&self, id: LectureId) -> bool {
        self.loader.is_loaded(id)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ===== Events =====

    /// Take all queued events for the host to dispatch.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    fn apply_ready_actions(&mut self, actions: ReadyActions) -> Result<()> {
        if let Some(target) = actions.apply_seek {
            debug!(target, "restoring saved position");
            if let Err(err) = self.device.seek(target) {
                warn!(error = %err, "restore seek failed");
            }
            self.emit_position_update();
        }
        if actions.start_playback {
            self.start_playback()
        } else {
            self.emit_state_changed(SessionState::Ready);
            Ok(())
        }
    }

    fn start_playback(&mut self) -> Result<()> {
        if let Err(err) = self.device.play() {
            self.fail_session(err.to_string());
            return Err(err);
        }
        self.sync.arm(Instant::now());
        self.emit_state_changed(SessionState::Playing);
        Ok(())
    }

    async fn resolve_seek(&mut self) -> Result<()> {
        let Some(resolution) = self.session.as_mut().and_then(|s| s.complete_seek()) else {
            return Ok(());
        };
        if resolution.resume_playback {
            // Covers play requested mid-seek: the device may still be
            // stopped, so it is started here, not just reported started.
            self.start_playback()?;
        } else {
            self.sync.disarm();
            self.emit_state_changed(SessionState::Ready);
        }
        self.emit_position_update();
        self.save_progress(false, true).await;
        Ok(())
    }

    async fn handle_ended(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let lecture_id = session.lecture_id();
        session.mark_ended();
        self.sync.disarm();
        self.emit_state_changed(SessionState::Ended);
        self.save_progress(true, true).await;
        self.emit(PlayerEvent::LectureEnded { lecture_id });
        self.play_next().await
    }

    async fn save_progress(&mut self, completed: bool, forced: bool) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let lecture_id = session.lecture_id();
        let version = session.version();
        let duration = session
            .duration()
            .or_else(|| self.device.duration())
            .unwrap_or(0.0);
        let current_time = self.device.position();

        if !self.sync.should_save(current_time, duration, forced) {
            return;
        }

        debug!(lecture_id, current_time, duration, completed, "saving progress");
        let record = ProgressRecord {
            lecture_id,
            current_time,
            duration,
            completed,
        };
        match self.store.save(&record).await {
            Ok(ack) => {
                // Discard an acknowledgement that lost the race against a
                // session switch.
                if self.session.as_ref().map(|s| s.version()) != Some(version) {
                    trace!(lecture_id, "discarding progress ack for superseded session");
                    return;
                }
                self.sync.record_saved(current_time);
                self.emit(PlayerEvent::ProgressSaved { lecture_id, ack });
            }
            Err(err) => {
                warn!(lecture_id, error = %err, "progress save failed, retrying on next eligible tick");
            }
        }
    }

    async fn teardown_session(&mut self) {
        self.loader.abort();
        if self.session.is_some() {
            self.flush().await;
            if let Some(session) = self.session.as_ref() {
                debug!(lecture_id = session.lecture_id(), "session superseded");
            }
        }
        self.sync.disarm();
        self.device.pause();
        self.device.unbind();
        self.session = None;
    }

    fn fail_session(&mut self, message: String) {
        warn!(message = %message, "playback failure");
        self.loader.abort();
        self.sync.disarm();
        if let Some(session) = self.session.as_mut() {
            session.mark_failed();
        }
        self.device.pause();
        self.emit_state_changed(SessionState::Failed);
        self.emit(PlayerEvent::Error { message });
    }

    fn known_duration(&self) -> Option<f64> {
        self.session
            .as_ref()
            .and_then(|s| s.duration())
            .or_else(|| self.device.duration())
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    fn emit_state_changed(&mut self, state: SessionState) {
        self.emit(PlayerEvent::StateChanged { state });
    }

    fn emit_position_update(&mut self) {
        let duration_secs = self.known_duration().unwrap_or(0.0);
        let position_secs = self.device.position();
        self.emit(PlayerEvent::PositionUpdate {
            position_secs,
            duration_secs,
        });
    }
}
