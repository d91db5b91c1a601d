//! Configuration and wire types for the Lectern server API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lectern_playback::{Lecture, LectureId, ProgressAck, SavedProgress};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Lectern server, e.g. `https://lectures.example.org`
    pub base_url: String,

    /// Anti-forgery token attached to state-changing requests
    pub csrf_token: Option<String>,

    /// Overall per-request timeout
    pub request_timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            csrf_token: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}

/// Catalog entry as served by the lecture listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureRecord {
    pub id: LectureId,
    pub title: String,
    pub audio_url: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl From<LectureRecord> for Lecture {
    fn from(record: LectureRecord) -> Self {
        Lecture {
            id: record.id,
            title: record.title,
            audio_url: record.audio_url,
            duration_hint: record.duration,
        }
    }
}

/// Request body for a progress save.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressBody {
    pub current_time: f64,
    pub completed: bool,
}

/// Progress endpoint response, shared by the save acknowledgement and the
/// restore fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressResponse {
    pub current_time: f64,
    pub progress_percentage: f64,
    pub completed: bool,
    pub listen_count: u32,
}

impl From<ProgressResponse> for ProgressAck {
    fn from(response: ProgressResponse) -> Self {
        ProgressAck {
            progress_percentage: response.progress_percentage,
            completed: response.completed,
            listen_count: response.listen_count,
        }
    }
}

impl From<ProgressResponse> for SavedProgress {
    fn from(response: ProgressResponse) -> Self {
        SavedProgress {
            current_time: response.current_time,
            completed: response.completed,
        }
    }
}
