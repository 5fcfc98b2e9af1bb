//! Growable little-endian output buffer.
//!
//! [`crate::file::buffer::ByteBuffer`] is the write-side counterpart of
//! [`crate::file::parser::Parser`]: every encoding it produces can be read back by the
//! matching parser method (`write_le` / `read_le`, `write_prefixed_string_utf8` /
//! `read_prefixed_string_utf8`).

use crate::{
    file::io::{write_le_at, CatalogIO},
    Result,
};

/// An append-only byte buffer with little-endian primitive encoding.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        ByteBuffer { data: Vec::new() }
    }

    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return the written bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Append a primitive in little-endian byte order.
    pub fn write_le<T: CatalogIO>(&mut self, value: T) {
        self.data.extend_from_slice(value.to_le_bytes().as_ref());
    }

    /// Overwrite a previously written primitive at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value does not fit inside the
    /// already written range.
    pub fn patch_le<T: CatalogIO>(&mut self, offset: usize, value: T) -> Result<()> {
        let mut offset = offset;
        write_le_at(&mut self.data, &mut offset, value)
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        self.data.resize(self.data.len() + count, 0);
    }

    /// Append a 7-bit encoded variable-length unsigned integer.
    pub fn write_7bit_encoded_int(&mut self, value: u32) {
        let mut value = value;
        while value >= 0x80 {
            self.data.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.data.push(value as u8);
    }

    /// Append a 7-bit length-prefixed UTF-8 string.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the string is longer than `u32::MAX` bytes.
    pub fn write_prefixed_string_utf8(&mut self, value: &str) -> Result<()> {
        let length = u32::try_from(value.len()).map_err(|_| {
            crate::Error::Error(format!("String of {} bytes is too long", value.len()))
        })?;
        self.write_7bit_encoded_int(length);
        self.data.extend_from_slice(value.as_bytes());
        Ok(())
    }
}
