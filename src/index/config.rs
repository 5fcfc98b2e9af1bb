//! Writer configuration for catalog images.

use crate::{index::header::TableLayout, Error, Result};

/// Load factor used when none is configured.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.3;

/// Highest accepted load factor.
pub const MAX_LOAD_FACTOR: f64 = 0.9;

/// Configuration of a [`crate::index::HashTableWriter`].
///
/// The load factor trades file size for probe length. Table sizes are always rounded up
/// to a prime, which keeps linear probe sequences short even for clustered hashes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterConfig {
    /// Target ratio of items to slots, in `(0, 0.9]` (default: 0.3)
    pub load_factor: f64,

    /// Header layout to emit (default: versioned)
    pub layout: TableLayout,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
            layout: TableLayout::Versioned,
        }
    }
}

impl WriterConfig {
    /// Creates a configuration for small files at the cost of longer probe sequences.
    ///
    /// At a load factor of 0.7, random key sets of a few hundred names regularly produce
    /// clusters whose longest probe exceeds 10 slots (50 and more have been observed).
    /// Use the default configuration where lookups must stay within that bound.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            load_factor: 0.7,
            ..Self::default()
        }
    }

    /// Creates a configuration emitting the legacy header for older readers.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            layout: TableLayout::Legacy,
            ..Self::default()
        }
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfig`] if the load factor is outside `(0, 0.9]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.load_factor > 0.0 && self.load_factor <= MAX_LOAD_FACTOR) {
            return Err(Error::InvalidConfig(format!(
                "load factor {} is outside of (0, {}]",
                self.load_factor, MAX_LOAD_FACTOR
            )));
        }
        Ok(())
    }

    /// Number of slots allocated for `count` items.
    ///
    /// Empty tables get no slots. Otherwise the size is the smallest prime that is at
    /// least `count / load_factor` and leaves at least one slot empty.
    #[must_use]
    pub fn table_size_for(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }

        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let scaled = (count as f64 / self.load_factor).ceil() as usize;
        next_prime(scaled.max(count + 1))
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}
