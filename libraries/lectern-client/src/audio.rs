//! Audio asset download for the Lectern server.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::{debug, info};

use lectern_playback::{AssetFetcher, LectureId, LoadProgress, PlayerError};

use crate::client::LecternClient;
use crate::error::{ClientError, Result};

impl LecternClient {
    /// Download a lecture's audio asset into memory.
    ///
    /// # Arguments
    /// * `id` - The lecture ID, used for logging only
    /// * `url` - The asset URL (usually from the catalog)
    /// * `progress_callback` - Called per received chunk with byte counts
    ///
    /// # Returns
    /// The complete asset bytes on success, error otherwise.
    pub async fn download_audio<F>(
        &self,
        id: LectureId,
        url: &str,
        mut progress_callback: F,
    ) -> Result<Bytes>
    where
        F: FnMut(LoadProgress),
    {
        debug!(url = %url, lecture_id = id, "Downloading audio asset");

        let response = self
            .http
            .get(url)
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

        let total_size = response.content_length();
        let mut buffer = match total_size {
            Some(total) => BytesMut::with_capacity(total as usize),
            None => BytesMut::new(),
        };

        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(ClientError::from_transport)?;
            buffer.extend_from_slice(&chunk);

            let bytes_loaded = buffer.len() as u64;
            let percent = total_size
                .map(|total| (bytes_loaded as f64 / total as f64) * 100.0)
                .unwrap_or(0.0);

            progress_callback(LoadProgress {
                percent,
                bytes_loaded,
                bytes_total: total_size,
            });
        }

        info!(
            lecture_id = id,
            size = buffer.len(),
            "Audio asset downloaded"
        );

        Ok(buffer.freeze())
    }
}

#[async_trait]
impl AssetFetcher for LecternClient {
    async fn fetch_audio(
        &self,
        id: LectureId,
        url: &str,
        on_chunk: &mut (dyn FnMut(LoadProgress) + Send),
    ) -> lectern_playback::Result<Bytes> {
        self.download_audio(id, url, |p| on_chunk(p))
            .await
            .map_err(PlayerError::from)
    }
}
