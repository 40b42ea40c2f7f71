//! Process-lifetime embedding cache.
//!
//! Keyed by the exact (already templated) text. Entries are never
//! invalidated: a fallback vector cached while the model was unavailable
//! stays cached after the model comes up. By default the cache is
//! unbounded; a maximum entry count turns it into an LRU.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::model::Embedding;

/// Where a cached vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingOrigin {
    /// Produced by the embedding resource
    Model,
    /// Produced by the deterministic fallback
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedEmbedding {
    pub embedding: Embedding,
    pub origin: EmbeddingOrigin,
}

/// Memo table from text to embedding.
///
/// Thread-safe; the LRU is protected by a Mutex (critical sections are a
/// single map operation).
pub struct EmbeddingCache {
    entries: Mutex<LruCache<String, CachedEmbedding>>,
    bound: Option<NonZeroUsize>,
}

static GLOBAL: OnceLock<Arc<EmbeddingCache>> = OnceLock::new();

impl EmbeddingCache {
    /// Create a cache, bounded to `max_entries` when given.
    pub fn new(max_entries: Option<usize>) -> Self {
        let bound = max_entries.and_then(NonZeroUsize::new);
        let entries = match bound {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(entries),
            bound,
        }
    }

    /// Create an unbounded cache.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// The process-wide cache. Created unbounded on first use.
    pub fn global() -> Arc<EmbeddingCache> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::unbounded())))
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CachedEmbedding>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, text: &str) -> Option<CachedEmbedding> {
        self.lock().get(text).cloned()
    }

    /// Insert or overwrite the entry for `text`.
    pub fn put(&self, text: impl Into<String>, entry: CachedEmbedding) {
        self.lock().put(text.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of entries, `None` when unbounded.
    pub fn bound(&self) -> Option<usize> {
        self.bound.map(NonZeroUsize::get)
    }

    /// Drop every entry. Not used by the provider itself.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::unbounded()
    }
}
