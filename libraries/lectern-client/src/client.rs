//! Main Lectern server client.

use reqwest::{Client, RequestBuilder};
use tracing::debug;

use lectern_playback::LectureId;

use crate::error::{ClientError, Result};
use crate::types::{ClientConfig, LectureRecord};

pub(crate) const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP client for a Lectern server.
///
/// One instance serves all endpoints: the audio asset download, the
/// per-lecture progress save/restore, and the current-lecture announce.
/// The playback engine talks to it through the `AssetFetcher` and
/// `ProgressStore` traits.
///
/// # Example
///
/// ```ignore
/// use lectern_client::{LecternClient, ClientConfig};
///
/// let config = ClientConfig::new("https://lectures.example.org")
///     .with_csrf_token("token-from-the-page");
/// let client = LecternClient::new(config)?;
///
/// let lectures = client.fetch_lectures().await?;
/// println!("Found {} lectures", lectures.len());
/// ```
pub struct LecternClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) csrf_token: Option<String>,
}

impl LecternClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Lectern/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            base_url,
            csrf_token: config.csrf_token,
        })
    }

    /// Base URL of the server, normalized without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the lecture catalog for playlist construction.
    pub async fn fetch_lectures(&self) -> Result<Vec<LectureRecord>> {
        let url = format!("{}/lectures", self.base_url);
        debug!(url = %url, "Fetching lecture catalog");

        let response = self
            .http
            .get(&url)
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

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("Failed to parse lecture list: {}", e)))
    }

    pub(crate) fn audio_url(&self, id: LectureId) -> String {
        format!("{}/lectures/{}/audio", self.base_url, id)
    }

    pub(crate) fn progress_url(&self, id: LectureId) -> String {
        format!("{}/lectures/{}/progress", self.base_url, id)
    }

    pub(crate) fn set_current_url(&self, id: LectureId) -> String {
        format!("{}/lectures/{}/set-current", self.base_url, id)
    }

    /// Attach the anti-forgery header to a state-changing request.
    pub(crate) fn with_csrf(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.csrf_token {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }
}
