//! Payload strategies of the index engine.
//!
//! The engine itself only knows slots, hashes and probe sequences. How a slot's payload
//! is laid out is decided by a strategy:
//!
//! - [`crate::index::strategy::FixedSizeStrategy`] stores a payload of exactly
//!   [`crate::index::strategy::FixedPayload::SIZE`] bytes inline in every record.
//! - [`crate::index::strategy::VariableSizeStrategy`] stores a `u32` offset into a
//!   trailing data section and decodes the payload from there on demand.
//!
//! Both are parameterised by a payload codec. A codec implements
//! [`crate::index::strategy::PayloadEncoder`] to be written and
//! [`crate::index::strategy::PayloadDecoder`] to be read; the two item types may differ,
//! so a builder can accept definitions while a reader hands out decoded views.
//!
//! # Record Layout
//!
//! ```text
//! fixed-size     hash u32 | payload [u8; SIZE]   (empty slot: hash 0, SIZE zero bytes)
//! variable-size  hash u32 | offset u32           (empty slot: hash 0, offset 0)
//! ```

use std::marker::PhantomData;

use crate::{
    file::buffer::ByteBuffer,
    index::{entry::HashTableEntry, hash::name_hash, header::storage_kind},
    Error, Parser, Result,
};

/// Encodes writer items into payload bytes.
pub trait PayloadEncoder {
    /// Item accepted by the writer
    type Item;

    /// Logical key of an item; its [`crate::name_hash`] is the slot hash.
    fn key(item: &Self::Item) -> &str;

    /// Appends the payload of `item` to `buffer`.
    ///
    /// # Errors
    /// Returns an error if the item cannot be represented in the catalog format.
    fn encode(item: &Self::Item, buffer: &mut ByteBuffer) -> Result<()>;
}

/// Decodes payload bytes into reader items.
pub trait PayloadDecoder {
    /// Item produced by the reader
    type Item;

    /// Decodes one payload starting at the parser's position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] for broken payloads.
    fn decode(parser: &mut Parser<'_>) -> Result<Self::Item>;
}

/// Marks a codec whose payloads all have the same encoded size.
pub trait FixedPayload {
    /// Encoded payload size in bytes
    const SIZE: usize;
}

/// Read side of a payload strategy.
pub trait ReadStrategy: Send + Sync {
    /// Item returned by lookups
    type Item;

    /// Whether payloads are stored inline in the entry records.
    fn is_fixed_size(&self) -> bool;

    /// Size of one entry record in bytes.
    fn record_size(&self) -> usize;

    /// Reads one entry record.
    ///
    /// # Errors
    /// Returns an error if the record is truncated or its inline payload is malformed.
    fn read_entry(&self, parser: &mut Parser<'_>) -> Result<HashTableEntry<Self::Item>>;

    /// Decodes the payload at `offset` of the data section.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the offset lies outside of the data section or
    /// the payload cannot be decoded.
    fn read_data(&self, data_section: &[u8], offset: u32) -> Result<Self::Item>;
}

/// Write side of a payload strategy.
pub trait WriteStrategy {
    /// Item accepted by the writer
    type Item;

    /// Whether payloads are stored inline in the entry records.
    fn is_fixed_size(&self) -> bool;

    /// Inline payload size, `0` for variable-size strategies.
    fn fixed_size(&self) -> usize;

    /// Logical key of an item.
    fn key<'a>(&self, item: &'a Self::Item) -> &'a str;

    /// Slot hash of an item.
    fn hash(&self, item: &Self::Item) -> u32 {
        name_hash(self.key(item))
    }

    /// Appends the payload of `item` to `buffer`.
    ///
    /// # Errors
    /// Returns an error if encoding fails or a fixed-size payload has the wrong length.
    fn write_data(&self, buffer: &mut ByteBuffer, item: &Self::Item) -> Result<()>;
}

/// Strategy storing payloads of a fixed size inline in each entry record.
pub struct FixedSizeStrategy<C>(PhantomData<fn() -> C>);

/// Strategy storing payloads in a trailing data section referenced by offset.
pub struct VariableSizeStrategy<C>(PhantomData<fn() -> C>);

macro_rules! impl_strategy_common {
    ($name:ident) => {
        impl<C> $name<C> {
            /// Creates the strategy for codec `C`.
            #[must_use]
            pub const fn new() -> Self {
                $name(PhantomData)
            }
        }

        impl<C> Default for $name<C> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<C> Clone for $name<C> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<C> Copy for $name<C> {}

        impl<C> std::fmt::Debug for $name<C> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

impl_strategy_common!(FixedSizeStrategy);
impl_strategy_common!(VariableSizeStrategy);

impl<C> ReadStrategy for FixedSizeStrategy<C>
where
    C: PayloadDecoder + FixedPayload,
{
    type Item = C::Item;

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn record_size(&self) -> usize {
        4 + C::SIZE
    }

    fn read_entry(&self, parser: &mut Parser<'_>) -> Result<HashTableEntry<Self::Item>> {
        let hash = parser.read_le::<u32>()?;
        let payload = parser.read_bytes(C::SIZE)?;
        if hash == 0 {
            return Ok(HashTableEntry::Empty);
        }

        let data = C::decode(&mut Parser::new(payload))?;
        Ok(HashTableEntry::Inline { hash, data })
    }

    fn read_data(&self, _data_section: &[u8], _offset: u32) -> Result<Self::Item> {
        Err(Error::StrategyMismatch {
            expected: storage_kind(false),
            found: storage_kind(true),
        })
    }
}

impl<C> WriteStrategy for FixedSizeStrategy<C>
where
    C: PayloadEncoder + FixedPayload,
{
    type Item = C::Item;

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn fixed_size(&self) -> usize {
        C::SIZE
    }

    fn key<'a>(&self, item: &'a Self::Item) -> &'a str {
        C::key(item)
    }

    fn write_data(&self, buffer: &mut ByteBuffer, item: &Self::Item) -> Result<()> {
        let start = buffer.len();
        C::encode(item, buffer)?;

        let written = buffer.len() - start;
        if written != C::SIZE {
            return Err(malformed_error!(
                "Fixed-size payload for '{}' is {} bytes, expected {}",
                C::key(item),
                written,
                C::SIZE
            ));
        }
        Ok(())
    }
}

impl<C> ReadStrategy for VariableSizeStrategy<C>
where
    C: PayloadDecoder,
{
    type Item = C::Item;

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn record_size(&self) -> usize {
        8
    }

    fn read_entry(&self, parser: &mut Parser<'_>) -> Result<HashTableEntry<Self::Item>> {
        let hash = parser.read_le::<u32>()?;
        let offset = parser.read_le::<u32>()?;
        if hash == 0 {
            return Ok(HashTableEntry::Empty);
        }

        Ok(HashTableEntry::AtOffset { hash, offset })
    }

    fn read_data(&self, data_section: &[u8], offset: u32) -> Result<Self::Item> {
        let start = offset as usize;
        if start >= data_section.len() {
            return Err(malformed_error!(
                "Payload offset {} is outside of the {} byte data section",
                offset,
                data_section.len()
            ));
        }

        C::decode(&mut Parser::new(&data_section[start..]))
    }
}

impl<C> WriteStrategy for VariableSizeStrategy<C>
where
    C: PayloadEncoder,
{
    type Item = C::Item;

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn fixed_size(&self) -> usize {
        0
    }

    fn key<'a>(&self, item: &'a Self::Item) -> &'a str {
        C::key(item)
    }

    fn write_data(&self, buffer: &mut ByteBuffer, item: &Self::Item) -> Result<()> {
        C::encode(item, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{U32Codec, WordCodec};

    #[test]
    fn fixed_entry_roundtrip() {
        let strategy = FixedSizeStrategy::<U32Codec>::new();
        assert_eq!(strategy.record_size(), 8);

        let item = ("answer".to_string(), 42u32);
        let mut buffer = ByteBuffer::new();
        buffer.write_le(WriteStrategy::hash(&strategy, &item));
        strategy.write_data(&mut buffer, &item).unwrap();
        buffer.write_le(0u32);
        buffer.write_zeros(4);

        let bytes = buffer.into_inner();
        let mut parser = Parser::new(&bytes);
        assert_eq!(
            strategy.read_entry(&mut parser).unwrap(),
            HashTableEntry::Inline {
                hash: name_hash("answer"),
                data: 42
            }
        );
        assert_eq!(strategy.read_entry(&mut parser).unwrap(), HashTableEntry::Empty);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn fixed_rejects_wrong_payload_size() {
        struct Short;
        impl PayloadEncoder for Short {
            type Item = String;
            fn key(item: &String) -> &str {
                item
            }
            fn encode(_item: &String, buffer: &mut ByteBuffer) -> Result<()> {
                buffer.write_le(1u16);
                Ok(())
            }
        }
        impl FixedPayload for Short {
            const SIZE: usize = 4;
        }

        let strategy = FixedSizeStrategy::<Short>::new();
        let mut buffer = ByteBuffer::new();
        assert!(strategy
            .write_data(&mut buffer, &"x".to_string())
            .is_err());
    }

    #[test]
    fn variable_read_data() {
        let strategy = VariableSizeStrategy::<WordCodec>::new();
        let mut data = ByteBuffer::new();
        let first = ("a".to_string(), "alpha".to_string());
        let second = ("b".to_string(), "beta".to_string());
        strategy.write_data(&mut data, &first).unwrap();
        let offset = data.len() as u32;
        strategy.write_data(&mut data, &second).unwrap();

        let data = data.into_inner();
        assert_eq!(strategy.read_data(&data, 0).unwrap(), "alpha");
        assert_eq!(strategy.read_data(&data, offset).unwrap(), "beta");
        assert!(matches!(
            strategy.read_data(&data, data.len() as u32),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn variable_entry() {
        let strategy = VariableSizeStrategy::<WordCodec>::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 8]);

        let mut parser = Parser::new(&bytes);
        assert_eq!(
            strategy.read_entry(&mut parser).unwrap(),
            HashTableEntry::AtOffset { hash: 9, offset: 16 }
        );
        assert!(strategy.read_entry(&mut parser).unwrap().is_empty());
    }
}
