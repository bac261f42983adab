use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub type TypeSamples = BTreeMap<String, Vec<String>>;

/// Bounded memo of entity-type samples keyed by namespace set.
pub struct TypeSampleCache {
    cache: Mutex<LruCache<String, TypeSamples>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TypeSampleCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Order- and duplicate-insensitive digest of the namespace identifiers.
    fn cache_key(namespaces: &[String]) -> String {
        let mut parts: Vec<String> = namespaces.iter().map(|ns| ns.trim().to_lowercase()).collect();
        parts.sort();
        parts.dedup();
        let hash = blake3::hash(parts.join("\u{1f}").as_bytes());
        hash.to_hex().to_string()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, TypeSamples>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, namespaces: &[String]) -> Option<TypeSamples> {
        let key = Self::cache_key(namespaces);
        let mut cache = self.lock();
        if let Some(samples) = cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(samples.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn put(&self, namespaces: &[String], samples: TypeSamples) {
        let key = Self::cache_key(namespaces);
        self.lock().put(key, samples);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: cache.len(),
            capacity: cache.cap().get(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}
