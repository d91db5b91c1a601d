//! Bounded in-memory store of decoded audio assets
//!
//! Strict LRU by touch time, not by size or TTL. Memory is bounded to at
//! most `capacity` full lecture payloads regardless of file size, at the
//! cost of churn for rapid back-and-forth navigation beyond that window.

use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::types::LectureId;

/// Transient reference that lets the playback device address cached audio
/// without renewed network access.
///
/// Handles are cheap to clone and share the backing payload. Every handle
/// issued for an asset is invalidated the instant that asset is evicted;
/// `payload()` returns `None` from then on.
#[derive(Debug, Clone)]
pub struct AssetHandle {
    lecture_id: LectureId,
    payload: Bytes,
    revoked: Arc<AtomicBool>,
}

impl AssetHandle {
    /// Lecture this handle addresses.
    pub fn lecture_id(&self) -> LectureId {
        self.lecture_id
    }

    /// The audio payload, or `None` once the backing cache entry is gone.
    pub fn payload(&self) -> Option<Bytes> {
        if self.is_revoked() {
            None
        } else {
            Some(self.payload.clone())
        }
    }

    /// Whether the backing asset has been evicted.
    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    /// Payload size in bytes. Valid even after revocation, for display.
    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }
}

/// A cached audio payload and the revocation flag shared with every handle
/// issued for it.
#[derive(Debug)]
struct AudioAsset {
    payload: Bytes,
    revoked: Arc<AtomicBool>,
}

impl AudioAsset {
    fn new(payload: Bytes) -> Self {
        Self {
            payload,
            revoked: Arc::new(AtomicBool::new(false)),
        }
    }

    fn issue_handle(&self, lecture_id: LectureId) -> AssetHandle {
        AssetHandle {
            lecture_id,
            payload: self.payload.clone(),
            revoked: Arc::clone(&self.revoked),
        }
    }

    /// Revoke all outstanding handles. Returns false if already revoked,
    /// so revocation happens exactly once per asset.
    fn revoke(&self) -> bool {
        !self.revoked.swap(true, Ordering::AcqRel)
    }
}

/// Bounded LRU store of audio payloads keyed by lecture id.
pub struct AssetCache {
    entries: LruCache<LectureId, AudioAsset>,
}

impl AssetCache {
    /// Create a cache bounded to `capacity` assets (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Issue a fresh handle for a cached payload, marking the entry
    /// most-recently-used. Never fetches.
    pub fn get(&mut self, id: LectureId) -> Option<AssetHandle> {
        self.entries.get(&id).map(|asset| asset.issue_handle(id))
    }

    /// Insert a payload, evicting the least-recently-used entry first when
    /// at capacity. Replacing an existing id revokes the old asset's
    /// handles and treats the entry as most-recently-used.
    pub fn put(&mut self, id: LectureId, payload: Bytes) -> AssetHandle {
        if let Some(replaced) = self.entries.pop(&id) {
            replaced.revoke();
            debug!(lecture_id = id, "replacing cached audio asset");
        }

        if self.entries.len() == usize::from(self.entries.cap()) {
            // Revoke before removal so no handle can outlive its entry.
            if let Some((evicted_id, evicted)) = self.entries.pop_lru() {
                evicted.revoke();
                debug!(
                    lecture_id = evicted_id,
                    size_bytes = evicted.payload.len(),
                    "evicted least-recently-used audio asset"
                );
            }
        }

        let asset = AudioAsset::new(payload);
        let handle = asset.issue_handle(id);
        self.entries.put(id, asset);
        handle
    }

    /// Pure membership check; does not touch recency.
    pub fn has(&self, id: LectureId) -> bool {
        self.entries.contains(&id)
    }

    /// Number of cached assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Revoke every outstanding handle and clear the store.
    ///
    /// Called on player teardown so no local reference leaks past the
    /// engine's lifetime.
    pub fn evict_all(&mut self) {
        for (_, asset) in self.entries.iter() {
            asset.revoke();
        }
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, "audio cache cleared");
    }
}
