//! In-memory narration cache keyed by voice and sanitized text.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use readaloud_core::{Narration, NarrationError, NarrationSource, sanitize_for_speech};
use tokio::sync::Mutex;

type CacheKey = (String, String);

#[derive(Default)]
struct Entries {
    map: HashMap<CacheKey, Narration>,
    order: VecDeque<CacheKey>,
}

/// Memoizing wrapper around any [`NarrationSource`].
///
/// Keys are `(voice, sanitize_for_speech(text))`, so texts that differ only
/// in glosses or whitespace share an entry. Failures are never cached. The
/// oldest entry is evicted once `capacity` is reached.
///
/// Concurrent misses for the same key both reach the inner source; the
/// second result overwrites the first.
pub struct CachedSource<S> {
    inner: S,
    capacity: usize,
    entries: Mutex<Entries>,
}

impl<S: NarrationSource> CachedSource<S> {
    /// Default number of narrations kept.
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Number of cached narrations.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every cached narration.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.map.clear();
        entries.order.clear();
    }
}

#[async_trait]
impl<S: NarrationSource> NarrationSource for CachedSource<S> {
    async fn fetch(&self, text: &str, voice: &str) -> Result<Narration, NarrationError> {
        let key = (voice.to_string(), sanitize_for_speech(text));

        if let Some(hit) = self.entries.lock().await.map.get(&key) {
            tracing::debug!(voice, "Narration cache hit");
            return Ok(hit.clone());
        }

        let narration = self.inner.fetch(text, voice).await?;

        let mut entries = self.entries.lock().await;
        if !entries.map.contains_key(&key) {
            while entries.order.len() >= self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.map.remove(&oldest);
                }
            }
            entries.order.push_back(key.clone());
        }
        entries.map.insert(key, narration.clone());
        Ok(narration)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use readaloud_core::{Caption, NarrationAudio};

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl NarrationSource for CountingSource {
        async fn fetch(&self, text: &str, _voice: &str) -> Result<Narration, NarrationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NarrationError::fetch_failed("offline"));
            }
            Ok(Narration::new(
                NarrationAudio {
                    bytes: text.as_bytes().to_vec(),
                    content_type: "audio/mpeg".to_string(),
                },
                vec![Caption::new(0.0, 1.0, text)],
                None,
            ))
        }
    }

    #[test]
    fn test_identical_text_hits_cache() {
        tokio_test::block_on(async {
            let cache = CachedSource::new(CountingSource::new(false));
            cache.fetch("안녕하세요", "v").await.unwrap();
            cache.fetch("안녕하세요", "v").await.unwrap();
            assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
            assert_eq!(cache.len().await, 1);
        });
    }

    #[test]
    fn test_key_uses_sanitized_text() {
        tokio_test::block_on(async {
            let cache = CachedSource::new(CountingSource::new(false));
            cache.fetch("안녕하세요\n\n你好 오늘은", "v").await.unwrap();
            cache.fetch("안녕하세요 오늘은", "v").await.unwrap();
            assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_voice_is_part_of_key() {
        tokio_test::block_on(async {
            let cache = CachedSource::new(CountingSource::new(false));
            cache.fetch("안녕하세요", "a").await.unwrap();
            cache.fetch("안녕하세요", "b").await.unwrap();
            assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn test_failures_are_not_cached() {
        tokio_test::block_on(async {
            let cache = CachedSource::new(CountingSource::new(true));
            assert!(cache.fetch("안녕하세요", "v").await.is_err());
            assert!(cache.fetch("안녕하세요", "v").await.is_err());
            assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
            assert!(cache.is_empty().await);
        });
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        tokio_test::block_on(async {
            let cache = CachedSource::with_capacity(CountingSource::new(false), 2);
            cache.fetch("첫째 문장", "v").await.unwrap();
            cache.fetch("둘째 문장", "v").await.unwrap();
            cache.fetch("셋째 문장", "v").await.unwrap();
            assert_eq!(cache.len().await, 2);

            // The first entry was evicted, so this is a miss.
            cache.fetch("첫째 문장", "v").await.unwrap();
            assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 4);

            cache.clear().await;
            assert!(cache.is_empty().await);
        });
    }
}
