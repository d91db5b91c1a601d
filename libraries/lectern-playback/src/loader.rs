//! Asset loader - one cancellable download at a time
//!
//! Sits between the network port and the cache: resolves cache hits
//! without touching the network, cancels any outstanding request when a
//! new one starts, and guarantees a cancelled request never mutates cache
//! state even if its transfer later resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::cache::{AssetCache, AssetHandle};
use crate::error::{PlayerError, Result};
use crate::fetch::AssetFetcher;
use crate::types::{LectureId, LoadProgress};

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Performs one cancellable network download at a time, delegating storage
/// to the shared [`AssetCache`].
pub struct AssetLoader {
    cache: Arc<Mutex<AssetCache>>,
    fetcher: Arc<dyn AssetFetcher>,
    current: Mutex<Option<InFlight>>,
    generation: AtomicU64,
}

impl AssetLoader {
    pub fn new(cache: Arc<Mutex<AssetCache>>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve a playable handle for `id`.
    ///
    /// A cache hit returns immediately and still reports one synthetic
    /// 100% progress event so loading UI resolves consistently. Otherwise
    /// any outstanding request on this loader is cancelled and a new
    /// download is opened against `url`, forwarding ordered progress
    /// events as data arrives.
    ///
    /// # Errors
    /// `LoadAborted` when this request was superseded or explicitly
    /// aborted; transport errors pass through from the fetcher.
    pub async fn load(
        &self,
        id: LectureId,
        url: &str,
        on_progress: &mut (dyn FnMut(LoadProgress) + Send),
    ) -> Result<AssetHandle> {
        if let Some(handle) = self.lock_cache().get(id) {
            trace!(lecture_id = id, "cache hit, skipping network");
            on_progress(LoadProgress::complete(handle.size_bytes()));
            return Ok(handle);
        }

        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slot = self.lock_current();
            if let Some(previous) = slot.replace(InFlight {
                generation,
                token: token.clone(),
            }) {
                debug!(lecture_id = id, "cancelling superseded download");
                previous.token.cancel();
            }
        }

        debug!(lecture_id = id, url, "starting audio download");
        let fetch = self.fetcher.fetch_audio(id, url, on_progress);
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(PlayerError::LoadAborted),
            res = fetch => res,
        };

        {
            let mut slot = self.lock_current();
            if slot.as_ref().is_some_and(|f| f.generation == generation) {
                *slot = None;
            }
        }

        // A cancelled request must not reach the cache even if its
        // transfer resolved first.
        if token.is_cancelled() {
            trace!(lecture_id = id, "download cancelled, result discarded");
            return Err(PlayerError::LoadAborted);
        }

        let payload = outcome?;
        let handle = self.lock_cache().put(id, payload);
        debug!(
            lecture_id = id,
            size_bytes = handle.size_bytes(),
            "audio asset cached"
        );
        Ok(handle)
    }

    /// Cancel the current request, if any. Idempotent.
    pub fn abort(&self) {
        if let Some(inflight) = self.lock_current().take() {
            debug!("aborting in-flight download");
            inflight.token.cancel();
        }
    }

    /// Pure cache membership check, used by callers to skip loading UI.
    pub fn is_loaded(&self, id: LectureId) -> bool {
        self.lock_cache().has(id)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AssetCache> {
        self.cache.lock().unwrap()
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        self.current.lock().unwrap()
    }
}
