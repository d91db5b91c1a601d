//! Progress persistence against the Lectern server.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use lectern_playback::{
    LectureId, PlayerError, ProgressAck, ProgressRecord, ProgressStore, SavedProgress,
};

use crate::client::LecternClient;
use crate::error::{ClientError, Result};
use crate::types::{ProgressBody, ProgressResponse};

impl LecternClient {
    /// Save a playback position; returns the server's derived fields.
    pub async fn save_progress(&self, record: &ProgressRecord) -> Result<ProgressAck> {
        let url = self.progress_url(record.lecture_id);
        let body = ProgressBody {
            current_time: record.current_time,
            completed: record.completed,
        };
        debug!(
            lecture_id = record.lecture_id,
            current_time = record.current_time,
            completed = record.completed,
            "Saving progress"
        );

        let response = self
            .with_csrf(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ProgressResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("Failed to parse progress ack: {}", e)))?;
        Ok(parsed.into())
    }

    /// Fetch the last saved position. A lecture never listened to yields
    /// `None`.
    pub async fn fetch_progress(&self, id: LectureId) -> Result<Option<SavedProgress>> {
        let url = self.progress_url(id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ProgressResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("Failed to parse saved progress: {}", e)))?;
        Ok(Some(parsed.into()))
    }

    /// Announce the lecture now current for this user. Acknowledgement
    /// only; the body is ignored.
    pub async fn set_current_lecture(&self, id: LectureId) -> Result<()> {
        let url = self.set_current_url(id);

        let response = self
            .with_csrf(self.http.post(&url))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for LecternClient {
    async fn save(&self, record: &ProgressRecord) -> lectern_playback::Result<ProgressAck> {
        self.save_progress(record).await.map_err(PlayerError::from)
    }

    async fn fetch(&self, id: LectureId) -> lectern_playback::Result<Option<SavedProgress>> {
        self.fetch_progress(id).await.map_err(PlayerError::from)
    }

    async fn set_current(&self, id: LectureId) -> lectern_playback::Result<()> {
        self.set_current_lecture(id).await.map_err(PlayerError::from)
    }
}
