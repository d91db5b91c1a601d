//! Lectern Server Client
//!
//! HTTP client library for the Lectern lecture server API.
//!
//! # Features
//!
//! - **Catalog**: Fetch the lecture list for playlist construction
//! - **Audio**: Stream audio assets into memory with progress reporting
//! - **Progress**: Save and restore per-lecture playback positions
//! - **Current lecture**: Announce the lecture now playing
//!
//! The client implements the playback engine's `AssetFetcher` and
//! `ProgressStore` ports, so wiring it up is one `Arc::new` per role.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use lectern_client::{ClientConfig, LecternClient};
//! use lectern_playback::{LecturePlayer, PlayerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://lectures.example.org")
//!         .with_csrf_token("token-from-the-page");
//!     let client = Arc::new(LecternClient::new(config)?);
//!
//!     let lectures = client.fetch_lectures().await?;
//!
//!     let mut player = LecturePlayer::new(
//!         my_audio_device(),
//!         Arc::clone(&client) as _,
//!         client as _,
//!         PlayerConfig::default(),
//!     );
//!     player.set_playlist(lectures.into_iter().map(Into::into).collect());
//!     player.play_lecture(1).await?;
//!     Ok(())
//! }
//! ```

mod audio;
mod client;
mod error;
mod progress;
mod types;

// Re-export main types
pub use client::LecternClient;
pub use error::{ClientError, Result};
pub use types::{ClientConfig, LectureRecord, ProgressBody, ProgressResponse};
