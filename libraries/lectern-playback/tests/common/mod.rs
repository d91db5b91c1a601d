//! Shared fakes for integration tests: an audio device, a fetcher and a
//! progress store, all deterministic and fully inspectable.

// Not every test binary uses every fake.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use lectern_playback::{
    AssetFetcher, AssetHandle, AudioDevice, Lecture, LectureId, LoadProgress, PlayerError,
    ProgressAck, ProgressRecord, ProgressStore, Result, SavedProgress,
};

pub fn lecture(id: LectureId) -> Lecture {
    Lecture {
        id,
        title: format!("Lecture {id}"),
        audio_url: format!("https://lectures.test/media/{id}.mp3"),
        duration_hint: None,
    }
}

// ===== Device =====

/// Audio device whose readiness and clock are driven by the test.
#[derive(Default)]
pub struct FakeDevice {
    pub bound: Option<AssetHandle>,
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seek_calls: Vec<f64>,
    pub fail_play: bool,
}

impl AudioDevice for FakeDevice {
    fn bind(&mut self, handle: AssetHandle) -> Result<()> {
        self.bound = Some(handle);
        self.position = 0.0;
        Ok(())
    }

    fn unbind(&mut self) {
        self.bound = None;
        self.playing = false;
    }

    fn play(&mut self) -> Result<()> {
        if self.fail_play {
            return Err(PlayerError::Device("play rejected".into()));
        }
        self.playing = true;
        self.play_calls += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        self.pause_calls += 1;
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        self.seek_calls.push(seconds);
        self.position = seconds;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

// ===== Fetcher =====

/// In-memory fetcher serving fixed payloads in small chunks.
///
/// Ids added to the stall set never resolve, which lets tests exercise
/// cancellation without timing.
pub struct FakeFetcher {
    payloads: Mutex<HashMap<LectureId, Bytes>>,
    stalled: Mutex<HashSet<LectureId>>,
    pub fetch_count: AtomicUsize,
    chunk_size: usize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            payloads: Mutex::new(HashMap::new()),
            stalled: Mutex::new(HashSet::new()),
            fetch_count: AtomicUsize::new(0),
            chunk_size: 4,
        }
    }

    pub fn with_payload(self, id: LectureId, payload: impl Into<Bytes>) -> Self {
        self.payloads.lock().unwrap().insert(id, payload.into());
        self
    }

    pub fn stall(&self, id: LectureId) {
        self.stalled.lock().unwrap().insert(id);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch_audio(
        &self,
        id: LectureId,
        _url: &str,
        on_chunk: &mut (dyn FnMut(LoadProgress) + Send),
    ) -> Result<Bytes> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if self.stalled.lock().unwrap().contains(&id) {
            std::future::pending::<()>().await;
            unreachable!("stalled fetch resolved");
        }

        let payload = self
            .payloads
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(PlayerError::HttpStatus(404))?;

        let total = payload.len() as u64;
        let mut loaded = 0u64;
        for chunk in payload.chunks(self.chunk_size) {
            loaded += chunk.len() as u64;
            on_chunk(LoadProgress {
                percent: (loaded as f64 / total as f64) * 100.0,
                bytes_loaded: loaded,
                bytes_total: Some(total),
            });
        }

        Ok(payload)
    }
}

// ===== Store =====

/// Progress store recording every save attempt; acks are derived the way
/// the server derives them.
pub struct FakeStore {
    pub saves: Mutex<Vec<ProgressRecord>>,
    pub attempts: AtomicUsize,
    saved: Mutex<HashMap<LectureId, SavedProgress>>,
    listen_counts: Mutex<HashMap<LectureId, u32>>,
    pub fail_saves: AtomicBool,
    pub set_current_calls: Mutex<Vec<LectureId>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            saves: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            saved: Mutex::new(HashMap::new()),
            listen_counts: Mutex::new(HashMap::new()),
            fail_saves: AtomicBool::new(false),
            set_current_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_saved(self, id: LectureId, current_time: f64, completed: bool) -> Self {
        self.saved.lock().unwrap().insert(
            id,
            SavedProgress {
                current_time,
                completed,
            },
        );
        self
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<ProgressRecord> {
        self.saves.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ProgressStore for FakeStore {
    async fn save(&self, record: &ProgressRecord) -> Result<ProgressAck> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PlayerError::Network("store unavailable".into()));
        }

        let mut counts = self.listen_counts.lock().unwrap();
        let listen_count = counts.entry(record.lecture_id).or_insert(0);
        if record.completed {
            *listen_count += 1;
        }

        self.saves.lock().unwrap().push(record.clone());
        self.saved.lock().unwrap().insert(
            record.lecture_id,
            SavedProgress {
                current_time: record.current_time,
                completed: record.completed,
            },
        );

        let progress_percentage = if record.duration > 0.0 {
            (record.current_time / record.duration) * 100.0
        } else {
            0.0
        };
        Ok(ProgressAck {
            progress_percentage,
            completed: record.completed,
            listen_count: *listen_count,
        })
    }

    async fn fetch(&self, id: LectureId) -> Result<Option<SavedProgress>> {
        Ok(self.saved.lock().unwrap().get(&id).cloned())
    }

    async fn set_current(&self, id: LectureId) -> Result<()> {
        self.set_current_calls.lock().unwrap().push(id);
        Ok(())
    }
}
