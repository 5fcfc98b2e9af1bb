//! Cache configuration for the type metadata resolver.

/// Configuration of a [`crate::resolver::TypeCache`].
///
/// Every cache read and insert advances a generation counter. Each time the counter
/// reaches a multiple of `generations_before_cleanup`, entries not stamped within the
/// last `eviction_threshold` generations are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Sweep interval in generations, `0` disables automatic sweeps (default: 5000)
    pub generations_before_cleanup: u64,

    /// Age in generations after which an entry is swept (default: 2500)
    pub eviction_threshold: u64,

    /// Re-stamp entries on every hit, keeping hot entries alive (default: true)
    pub refresh_on_read: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generations_before_cleanup: 5000,
            eviction_threshold: 2500,
            refresh_on_read: true,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration that never sweeps automatically.
    ///
    /// Entries live until [`crate::resolver::TypeCache::clear`] or an explicit
    /// [`crate::resolver::TypeCache::evict_now`].
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            generations_before_cleanup: 0,
            ..Self::default()
        }
    }

    /// Creates a configuration for memory-constrained hosts with frequent, short-lived sweeps.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            generations_before_cleanup: 500,
            eviction_threshold: 250,
            refresh_on_read: true,
        }
    }

    /// Returns `true` if automatic sweeps are enabled.
    #[must_use]
    pub fn sweeps_enabled(&self) -> bool {
        self.generations_before_cleanup != 0
    }
}
