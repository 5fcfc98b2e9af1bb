//! Binary access to catalog images.
//!
//! This module contains everything below the index engine: where catalog bytes come
//! from ([`Backend`], with memory-mapped [`physical::Physical`] and owned
//! [`memory::Memory`] implementations), how they are read ([`parser::Parser`] over
//! [`io`] primitives), and how new images are produced ([`buffer::ByteBuffer`] and
//! [`output::write_image`]).
//!
//! # Architecture
//!
//! A loaded catalog owns exactly one `Box<dyn Backend>`. The index engine parses the
//! header and entry array out of the backend once, then hands zero-copy sub-slices of
//! the data section to payload decoders on every lookup. Backends are `Send + Sync`
//! and never mutated after construction.

pub mod buffer;
pub mod io;
pub mod memory;
pub mod output;
pub mod parser;
pub mod physical;

/// Immutable bytes of one catalog image.
///
/// Implementations only hand out the whole image; bounds checks happen in
/// [`parser::Parser`] as the image is read.
pub trait Backend: Send + Sync {
    /// The complete image.
    fn data(&self) -> &[u8];

    /// Size of the image in bytes.
    fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the image has no bytes at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
