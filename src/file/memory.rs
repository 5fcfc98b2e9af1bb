//! In-memory backend for catalog images built or received at runtime.

use super::Backend;

/// A catalog image owned as a byte vector, e.g. the output of
/// [`crate::catalog::CatalogBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct Memory {
    image: Vec<u8>,
}

impl Memory {
    /// Takes ownership of `image`.
    #[must_use]
    pub fn new(image: Vec<u8>) -> Memory {
        Memory { image }
    }
}

impl From<Vec<u8>> for Memory {
    fn from(image: Vec<u8>) -> Self {
        Memory::new(image)
    }
}

impl Backend for Memory {
    fn data(&self) -> &[u8] {
        &self.image
    }
}
