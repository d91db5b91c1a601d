//! Loader integration tests: cache delegation, ordered progress and
//! cancellation semantics.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use common::FakeFetcher;
use lectern_playback::{
    AssetCache, AssetFetcher, AssetLoader, LectureId, LoadProgress, PlayerError, Result,
};

fn new_loader(fetcher: FakeFetcher) -> (AssetLoader, Arc<Mutex<AssetCache>>) {
    let cache = Arc::new(Mutex::new(AssetCache::new(3)));
    let loader = AssetLoader::new(Arc::clone(&cache), Arc::new(fetcher));
    (loader, cache)
}

#[tokio::test]
async fn cache_hit_skips_network_and_reports_synthetic_progress() {
    let fetcher = FakeFetcher::new().with_payload(1, vec![7u8; 32]);
    let (loader, cache) = new_loader(fetcher);
    cache.lock().unwrap().put(1, Bytes::from(vec![7u8; 32]));

    let mut events: Vec<LoadProgress> = Vec::new();
    let handle = loader
        .load(1, "https://lectures.test/media/1.mp3", &mut |p| {
            events.push(p);
        })
        .await
        .unwrap();

    assert_eq!(handle.lecture_id(), 1);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].percent, 100.0);
    assert_eq!(events[0].bytes_loaded, 32);
}

#[tokio::test]
async fn progress_is_ordered_and_ends_at_full() {
    let fetcher = FakeFetcher::new().with_payload(1, vec![0u8; 10]);
    let (loader, _cache) = new_loader(fetcher);

    let mut events: Vec<LoadProgress> = Vec::new();
    loader
        .load(1, "https://lectures.test/media/1.mp3", &mut |p| {
            events.push(p);
        })
        .await
        .unwrap();

    let loaded: Vec<u64> = events.iter().map(|p| p.bytes_loaded).collect();
    assert_eq!(loaded, vec![4, 8, 10]);
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(events.last().unwrap().percent, 100.0);
}

#[tokio::test]
async fn new_load_cancels_the_previous_one() {
    let fetcher = FakeFetcher::new().with_payload(2, vec![2u8; 8]);
    fetcher.stall(1);
    let (loader, cache) = new_loader(fetcher);

    let mut first_events = Vec::new();
    let mut second_events = Vec::new();
    let mut on_first = |p| {
        first_events.push(p);
    };
    let mut on_second = |p| {
        second_events.push(p);
    };
    let (first, second) = tokio::join!(
        loader.load(1, "https://lectures.test/media/1.mp3", &mut on_first),
        loader.load(2, "https://lectures.test/media/2.mp3", &mut on_second),
    );

    assert!(matches!(first, Err(PlayerError::LoadAborted)));
    assert!(second.is_ok());

    let cache = cache.lock().unwrap();
    assert!(!cache.has(1));
    assert!(cache.has(2));
}

#[tokio::test]
async fn abort_cancels_and_is_idempotent() {
    let fetcher = FakeFetcher::new();
    fetcher.stall(1);
    let (loader, cache) = new_loader(fetcher);
    let loader = Arc::new(loader);

    let task = {
        let loader = Arc::clone(&loader);
        tokio::spawn(async move {
            loader
                .load(1, "https://lectures.test/media/1.mp3", &mut |_| {})
                .await
        })
    };

    // Let the download register as in-flight before aborting.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    loader.abort();
    loader.abort();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(PlayerError::LoadAborted)));
    assert!(cache.lock().unwrap().is_empty());
}

/// Fetcher that blocks until the test opens its gate, so cancellation can
/// be interleaved with a transfer that would otherwise resolve.
struct GatedFetcher {
    gate: Arc<Notify>,
    payload: Bytes,
}

#[async_trait]
impl AssetFetcher for GatedFetcher {
    async fn fetch_audio(
        &self,
        _id: LectureId,
        _url: &str,
        _on_chunk: &mut (dyn FnMut(LoadProgress) + Send),
    ) -> Result<Bytes> {
        self.gate.notified().await;
        Ok(self.payload.clone())
    }
}

#[tokio::test]
async fn cancelled_transfer_never_mutates_the_cache() {
    let gate = Arc::new(Notify::new());
    let fetcher = GatedFetcher {
        gate: Arc::clone(&gate),
        payload: Bytes::from(vec![1u8; 16]),
    };
    let cache = Arc::new(Mutex::new(AssetCache::new(3)));
    let loader = Arc::new(AssetLoader::new(Arc::clone(&cache), Arc::new(fetcher)));

    let task = {
        let loader = Arc::clone(&loader);
        tokio::spawn(async move {
            loader
                .load(1, "https://lectures.test/media/1.mp3", &mut |_| {})
                .await
        })
    };

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // Cancel first, then let the transfer resolve anyway.
    loader.abort();
    gate.notify_one();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(PlayerError::LoadAborted)));
    assert!(cache.lock().unwrap().is_empty());
    assert!(!loader.is_loaded(1));
}
