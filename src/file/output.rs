//! Memory-mapped output for catalog images.
//!
//! [`write_image`] is how [`crate::index::HashTableWriter::write_to_file`] and
//! [`crate::catalog::CatalogBuilder::write_to_file`] put a finished image on disk. The
//! target is sized up front, mapped writable and flushed before it counts as written.
//! An [`Output`] dropped before [`Output::finalize`] removes its file again, so readers
//! never map a half-written catalog.

use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::{Error, Result};

/// Writes `image` to `path`, replacing any existing file.
///
/// # Errors
/// Returns [`crate::Error::WriteMmapFailed`] if the file cannot be created or mapped and
/// [`crate::Error::WriteFinalizationFailed`] if the final flush fails. The file is
/// removed in both cases.
pub fn write_image(path: impl AsRef<Path>, image: &[u8]) -> Result<()> {
    let mut output = Output::create(path, image.len())?;
    output.write_at(0, image)?;
    output.finalize()
}

/// A writable mapping of a catalog file that is removed unless finalized.
pub struct Output {
    mmap: MmapMut,
    path: PathBuf,
    finalized: bool,
}

impl Output {
    /// Creates `path` with exactly `len` zero bytes and maps it.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the file cannot be created, sized,
    /// or mapped.
    pub fn create(path: impl AsRef<Path>, len: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mmap_failed = |what: &str, error: std::io::Error| Error::WriteMmapFailed {
            message: format!("{what} '{}': {error}", path.display()),
        };

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|error| mmap_failed("Failed to create", error))?;

        file.set_len(len as u64)
            .map_err(|error| mmap_failed("Failed to size", error))?;

        let mmap = unsafe { MmapOptions::new().map_mut(&file) }
            .map_err(|error| mmap_failed("Failed to map", error))?;

        Ok(Self {
            mmap,
            path,
            finalized: false,
        })
    }

    /// Copies `bytes` into the file starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the bytes do not fit in the file.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let Some(target) = offset
            .checked_add(bytes.len())
            .and_then(|end| self.mmap.get_mut(offset..end))
        else {
            return Err(Error::WriteMmapFailed {
                message: format!(
                    "Write of {} bytes at {offset} exceeds '{}' ({} bytes)",
                    bytes.len(),
                    self.path.display(),
                    self.mmap.len()
                ),
            });
        };

        target.copy_from_slice(bytes);
        Ok(())
    }

    /// Flushes the mapping and keeps the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFinalizationFailed`] if the flush fails; the file is
    /// then removed.
    pub fn finalize(mut self) -> Result<()> {
        self.mmap
            .flush()
            .map_err(|error| Error::WriteFinalizationFailed {
                message: format!("Failed to flush '{}': {error}", self.path.display()),
            })?;

        self.finalized = true;
        Ok(())
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        if !self.finalized {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
