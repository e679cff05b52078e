use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Thread-safe LRU cache of fetched page text, keyed by URL
///
/// Several nodes often point at the same page (or the same top search hit);
/// this keeps one run from downloading it twice. `None` records a fetch that
/// produced no text, so dead links are not retried either.
pub struct PageCache {
    cache: Mutex<LruCache<String, Option<String>>>,
}

impl PageCache {
    /// Create a new page cache holding at most `capacity` pages (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1))
            .expect("Cache capacity must be at least 1");

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Cached result for `url`; the outer `None` means "never fetched"
    pub fn get(&self, url: &str) -> Option<Option<String>> {
        self.cache
            .lock()
            .unwrap()
            .get(url)
            .cloned()
    }

    pub fn put(&self, url: String, text: Option<String>) {
        self.cache
            .lock()
            .unwrap()
            .put(url, text);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }
}
