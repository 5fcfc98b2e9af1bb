//! Cursor-based binary parser for catalog images.
//!
//! [`crate::file::parser::Parser`] walks a byte slice with bounds checking on every read.
//! It is used for the catalog header, the name table, entry records and every payload
//! decoder. Payload decoders receive a parser over a zero-copy sub-slice of the data
//! section, so no intermediate buffers are allocated on the lookup path.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::transactional`] - Speculative parsing with rollback
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a raw byte range
//!
//! ## String Methods
//! - [`crate::file::parser::Parser::read_7bit_encoded_int`] - Read 7-bit encoded integers
//! - [`crate::file::parser::Parser::read_prefixed_string_utf8`] - Read length-prefixed UTF-8 strings
//!
//! # Usage Examples
//!
//! ```rust
//! use pcmeta::Parser;
//!
//! let data = [0x01, 0x00, 0x00, 0x00, 0x03, b'f', b'o', b'o'];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_le::<u32>()?, 1);
//! assert_eq!(parser.read_prefixed_string_utf8()?, "foo");
//! assert!(!parser.has_more_data());
//! # Ok::<(), pcmeta::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CatalogIO},
    Result,
};

/// A generic binary data parser for reading catalog structures.
///
/// `Parser` provides a cursor-based interface for reading little-endian binary data.
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated catalogs.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.position = self.calc_end_position(step)?;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Execute a closure transactionally, rolling back on failure.
    ///
    /// This method saves the current parser position, executes the provided closure,
    /// and only commits the position change if the closure succeeds. If the closure
    /// returns `Err`, the parser position is restored to its original value.
    ///
    /// # Errors
    /// Returns any error produced by the closure `f`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pcmeta::Parser;
    ///
    /// let mut parser = Parser::new(&[0x01]);
    /// let result: Result<u32, _> = parser.transactional(|p| p.read_le());
    /// assert!(result.is_err());
    /// assert_eq!(parser.pos(), 0);
    /// ```
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: CatalogIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a 7-bit encoded variable-length unsigned integer.
    ///
    /// Each byte contributes 7 bits of value; the high bit signals that another byte
    /// follows. This is the length prefix used for every string and count in a catalog.
    /// The fifth byte may only carry the top four bits of a `u32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for encodings that do not fit a `u32`.
    pub fn read_7bit_encoded_int(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;

        loop {
            let Some(&byte) = self.data.get(self.position) else {
                return Err(out_of_bounds_error!());
            };
            self.position += 1;

            if shift == 28 && byte & 0xF0 != 0 {
                return Err(malformed_error!(
                    "7-bit encoded integer overflow: final byte 0x{:02X} exceeds u32 capacity",
                    byte
                ));
            }

            value |= u32::from(byte & 0x7F) << shift;
            if (byte & 0x80) == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// The string length is encoded as a 7-bit encoded integer, followed by that many
    /// UTF-8 bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid UTF-8 encoding.
    pub fn read_prefixed_string_utf8(&mut self) -> Result<String> {
        self.read_prefixed_string_utf8_ref().map(str::to_string)
    }

    fn read_prefixed_string_utf8_ref(&mut self) -> Result<&'a str> {
        let length = self.read_7bit_encoded_int()? as usize;
        let start = self.position;
        let string_data = self.read_bytes(length)?;

        std::str::from_utf8(string_data).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                start + length,
                e
            )
        })
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Ensures that at least `needed` bytes are available from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(out_of_bounds_error!());
        }
        Ok(())
    }

    fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}
