//! Network port for audio asset downloads
//!
//! Abstracts the transport so the engine can be tested headlessly with a
//! fake network. The production implementation lives in `lectern-client`.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{LectureId, LoadProgress};

/// Downloads a lecture's audio as a single binary payload.
///
/// Implementors stream the response and invoke `on_chunk` with running
/// byte counts as data arrives; progress events must be delivered in
/// order. Cancellation is handled by the caller, which stops polling the
/// returned future and drops it.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the full audio payload for `id` from `url`.
    ///
    /// # Errors
    /// `Network` on transport failure, `HttpStatus` on a non-success
    /// response, `Timeout` on a stalled transfer.
    async fn fetch_audio(
        &self,
        id: LectureId,
        url: &str,
        on_chunk: &mut (dyn FnMut(LoadProgress) + Send),
    ) -> Result<Bytes>;
}
