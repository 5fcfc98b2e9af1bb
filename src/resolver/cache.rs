//! Generation-stamped cache of resolved type metadata.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;

use crate::resolver::{config::CacheConfig, metadata::TypeMetadata};

struct CacheEntry {
    metadata: Arc<TypeMetadata>,
    stamp: AtomicU64,
}

/// Concurrent cache from exact qualified name to metadata.
///
/// Keys are compared exactly; callers that want case-insensitive resolution normalise
/// names before calling. Only successful resolutions are stored.
///
/// # Generations
///
/// Each [`TypeCache::get`] and [`TypeCache::insert`] advances the generation by one.
/// Inserts stamp the entry with the new generation; hits re-stamp it when
/// [`CacheConfig::refresh_on_read`] is set. When the generation reaches a multiple of
/// [`CacheConfig::generations_before_cleanup`], the operation first sweeps every entry
/// stamped before `generation - eviction_threshold`.
pub struct TypeCache {
    entries: DashMap<String, CacheEntry>,
    generation: AtomicU64,
    config: CacheConfig,
}

impl TypeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        TypeCache {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// Returns the cached metadata for `qualified_name`.
    pub fn get(&self, qualified_name: &str) -> Option<Arc<TypeMetadata>> {
        let generation = self.tick();
        let entry = self.entries.get(qualified_name)?;
        if self.config.refresh_on_read {
            // racing hits may finish out of order; a stamp never moves backwards
            entry.stamp.fetch_max(generation, Ordering::Relaxed);
        }
        Some(entry.metadata.clone())
    }

    /// Stores metadata under `qualified_name`, replacing any previous entry.
    pub fn insert(&self, qualified_name: impl Into<String>, metadata: Arc<TypeMetadata>) {
        let generation = self.tick();
        self.entries.insert(
            qualified_name.into(),
            CacheEntry {
                metadata,
                stamp: AtomicU64::new(generation),
            },
        );
    }

    /// Returns `true` if `qualified_name` is cached. Does not advance the generation.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }

    /// Sweeps stale entries at the current generation and returns how many were evicted.
    pub fn evict_now(&self) -> usize {
        self.sweep(self.generation())
    }

    /// Drops every entry and resets the generation to `0`.
    pub fn clear(&self) {
        self.entries.clear();
        self.generation.store(0, Ordering::Release);
        tracing::debug!("type cache cleared");
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn tick(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if self.config.sweeps_enabled() && generation % self.config.generations_before_cleanup == 0 {
            self.sweep(generation);
        }
        generation
    }

    fn sweep(&self, generation: u64) -> usize {
        let cutoff = generation.saturating_sub(self.config.eviction_threshold);
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stamp.load(Ordering::Relaxed) >= cutoff);
        let evicted = before.saturating_sub(self.entries.len());

        tracing::debug!(
            generation,
            cutoff,
            evicted,
            remaining = self.entries.len(),
            "type cache sweep"
        );
        evicted
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
