//! Read-only memory-mapped backend for catalog files on disk.
//!
//! Loading a catalog costs one `mmap` call; lookups only fault in the pages they probe.
//! The mapping is never written through, which is what lets
//! [`crate::index::HashTableReader`] be shared across threads without locking.

use std::{fs, path::Path};

use memmap2::Mmap;

use super::Backend;
use crate::{Error, Result};

/// A catalog file mapped read-only into the address space.
#[derive(Debug)]
pub struct Physical {
    mmap: Mmap,
}

impl Physical {
    /// Opens and maps the catalog at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if it cannot be mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;

        // Catalog files are replaced, never modified in place, while readers hold them.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|error| Error::Error(format!("Failed to map '{}': {error}", path.display())))?;

        Ok(Physical { mmap })
    }
}

impl Backend for Physical {
    fn data(&self) -> &[u8] {
        &self.mmap
    }
}
