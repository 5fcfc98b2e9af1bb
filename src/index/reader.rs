//! Read side of the index engine.
//!
//! A [`crate::index::HashTableReader`] owns the catalog image through a
//! [`crate::file::Backend`], parses the header and entry array once, and keeps the data
//! section in place. Lookups hash-probe the entry array and decode variable-size payloads
//! straight out of the backend without copying.

use std::path::Path;

use crate::{
    file::{memory::Memory, physical::Physical, Backend},
    index::{
        entry::HashTableEntry,
        hash::EMPTY_HASH,
        header::{TableHeader, TableLayout},
        strategy::ReadStrategy,
    },
    Error, Parser, Result,
};

/// Probe statistics of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    /// Number of occupied slots
    pub item_count: usize,
    /// Number of slots
    pub table_size: usize,
    /// `item_count / table_size`, `0.0` for a table without slots
    pub load_factor: f64,
    /// Longest distance between an item's ideal slot and its actual slot
    pub max_probe_distance: usize,
    /// Mean distance between ideal and actual slots over all items
    pub avg_probe_distance: f64,
}

/// Immutable open-addressing table over a catalog image.
///
/// # Thread Safety
///
/// The reader is never mutated after loading and is `Send + Sync` whenever the strategy's
/// items are. Concurrent lookups need no synchronisation.
///
/// # Examples
///
/// ```rust,no_run
/// use pcmeta::index::HashTableReader;
/// use pcmeta::catalog::codec::SystemVariableCodec;
/// use pcmeta::index::strategy::FixedSizeStrategy;
///
/// let table = HashTableReader::load_from_file(
///     "sysvars.pcix",
///     FixedSizeStrategy::<SystemVariableCodec>::new(),
/// )?;
/// if let Some(info) = table.lookup(pcmeta::name_hash("%Date"))? {
///     println!("{:?}", info);
/// }
/// # Ok::<(), pcmeta::Error>(())
/// ```
pub struct HashTableReader<S: ReadStrategy> {
    backend: Box<dyn Backend>,
    strategy: S,
    header: TableHeader,
    entries: Vec<HashTableEntry<S::Item>>,
    data_offset: usize,
    item_count: usize,
}

impl<S: ReadStrategy> HashTableReader<S> {
    /// Memory-maps a catalog file and parses its table.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or any header and
    /// entry parsing error listed on [`crate::index::header::TableHeader::parse`].
    pub fn load_from_file(path: impl AsRef<Path>, strategy: S) -> Result<Self> {
        let path = path.as_ref();
        let backend = Physical::new(path).inspect_err(|error| {
            tracing::error!(path = %path.display(), %error, "failed to open catalog file");
        })?;
        Self::from_backend(Box::new(backend), strategy)
    }

    /// Parses a table from an owned in-memory image.
    ///
    /// # Errors
    /// Returns any header and entry parsing error listed on
    /// [`crate::index::header::TableHeader::parse`].
    pub fn from_bytes(data: Vec<u8>, strategy: S) -> Result<Self> {
        Self::from_backend(Box::new(Memory::new(data)), strategy)
    }

    /// Parses a table from an arbitrary backend.
    ///
    /// # Errors
    /// Returns any header and entry parsing error listed on
    /// [`crate::index::header::TableHeader::parse`].
    pub fn from_backend(backend: Box<dyn Backend>, strategy: S) -> Result<Self> {
        let mut parser = Parser::new(backend.data());
        let header = TableHeader::parse(&mut parser, strategy.record_size(), strategy.is_fixed_size())
            .inspect_err(|error| tracing::warn!(%error, "rejected catalog header"))?;

        let mut entries = Vec::with_capacity(header.table_size);
        for _ in 0..header.table_size {
            entries.push(strategy.read_entry(&mut parser)?);
        }

        let data_offset = parser.pos();
        let item_count = entries.iter().filter(|entry| !entry.is_empty()).count();

        tracing::debug!(
            layout = %header.layout,
            table_size = header.table_size,
            items = item_count,
            names = header.names.len(),
            data_bytes = backend.len() - data_offset,
            "loaded catalog table"
        );

        Ok(HashTableReader {
            backend,
            strategy,
            header,
            entries,
            data_offset,
            item_count,
        })
    }

    /// Looks up the payload stored under `hash`.
    ///
    /// Returns `Ok(None)` if no slot carries the hash, including for the reserved hash `0`
    /// and for tables without slots.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingDataSection`] if a variable-size table has no data
    /// section, or [`crate::Error::Malformed`] if the payload cannot be decoded.
    pub fn lookup(&self, hash: u32) -> Result<Option<S::Item>>
    where
        S::Item: Clone,
    {
        match self.find_slot(hash) {
            Some(index) => self.decode(&self.entries[index]).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `true` if some slot carries `hash`.
    #[must_use]
    pub fn contains(&self, hash: u32) -> bool {
        self.find_slot(hash).is_some()
    }

    /// Decodes every stored payload in slot order.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn values(&self) -> Result<Vec<S::Item>>
    where
        S::Item: Clone,
    {
        self.entries
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| self.decode(entry))
            .collect()
    }

    /// Slot hashes of every stored item in slot order.
    pub fn hashes(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(HashTableEntry::hash)
    }

    /// Computes probe statistics over all occupied slots.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        let table_size = self.entries.len();
        let mut max_probe_distance = 0;
        let mut total_distance = 0usize;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.is_empty() {
                continue;
            }

            let ideal = entry.hash() as usize % table_size;
            let distance = (index + table_size - ideal) % table_size;
            max_probe_distance = max_probe_distance.max(distance);
            total_distance += distance;
        }

        #[allow(clippy::cast_precision_loss)]
        let (load_factor, avg_probe_distance) = (
            if table_size == 0 {
                0.0
            } else {
                self.item_count as f64 / table_size as f64
            },
            if self.item_count == 0 {
                0.0
            } else {
                total_distance as f64 / self.item_count as f64
            },
        );

        TableStats {
            item_count: self.item_count,
            table_size,
            load_factor,
            max_probe_distance,
            avg_probe_distance,
        }
    }

    /// Names listed in the image's name table.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.header.names
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.item_count
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Number of slots.
    #[must_use]
    pub fn table_size(&self) -> usize {
        self.entries.len()
    }

    /// Whether payloads are stored inline.
    #[must_use]
    pub fn is_fixed_size(&self) -> bool {
        self.strategy.is_fixed_size()
    }

    /// Header layout the image was written in.
    #[must_use]
    pub fn format(&self) -> TableLayout {
        self.header.layout
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    /// The payload bytes following the entry array.
    #[must_use]
    pub fn data_section(&self) -> &[u8] {
        &self.backend.data()[self.data_offset..]
    }

    fn find_slot(&self, hash: u32) -> Option<usize> {
        let table_size = self.entries.len();
        if hash == EMPTY_HASH || table_size == 0 {
            return None;
        }

        let start = hash as usize % table_size;
        for step in 0..table_size {
            let index = (start + step) % table_size;
            let entry = &self.entries[index];
            if entry.is_empty() {
                return None;
            }
            if entry.hash() == hash {
                return Some(index);
            }
        }
        None
    }

    fn decode(&self, entry: &HashTableEntry<S::Item>) -> Result<S::Item>
    where
        S::Item: Clone,
    {
        match entry {
            HashTableEntry::Inline { data, .. } => Ok(data.clone()),
            HashTableEntry::AtOffset { offset, .. } => {
                let data_section = self.data_section();
                if data_section.is_empty() {
                    return Err(Error::MissingDataSection);
                }
                self.strategy.read_data(data_section, *offset)
            }
            HashTableEntry::Empty => Err(malformed_error!("Attempted to decode an empty slot")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        index::{
            hash::name_hash,
            strategy::{FixedSizeStrategy, VariableSizeStrategy},
        },
        test::{U32Codec, WordCodec},
    };

    /// Builds a variable-size image by hand: 3 slots, one item at its ideal slot.
    fn handmade_variable(with_data: bool) -> Vec<u8> {
        let hash = name_hash("alpha");
        let slot = hash as usize % 3;

        let mut bytes = b"PCIX".to_vec();
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        for index in 0..3 {
            let record_hash = if index == slot { hash } else { 0 };
            bytes.extend_from_slice(&record_hash.to_le_bytes());
            bytes.extend_from_slice(&0u32.to_le_bytes());
        }
        if with_data {
            bytes.push(3);
            bytes.extend_from_slice(b"one");
        }
        bytes
    }

    #[test]
    fn handmade_lookup() {
        let table =
            HashTableReader::from_bytes(handmade_variable(true), VariableSizeStrategy::<WordCodec>::new())
                .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.table_size(), 3);
        assert_eq!(table.format(), TableLayout::Versioned);
        assert_eq!(table.lookup(name_hash("alpha")).unwrap().as_deref(), Some("one"));
        assert_eq!(table.lookup(name_hash("beta")).unwrap(), None);
        assert_eq!(table.lookup(0).unwrap(), None);
        assert!(table.contains(name_hash("ALPHA")));
    }

    #[test]
    fn missing_data_section() {
        let table = HashTableReader::from_bytes(
            handmade_variable(false),
            VariableSizeStrategy::<WordCodec>::new(),
        )
        .unwrap();
        assert!(table.data_section().is_empty());
        assert!(matches!(
            table.lookup(name_hash("alpha")),
            Err(Error::MissingDataSection)
        ));
        assert_eq!(table.lookup(name_hash("beta")).unwrap(), None);
    }

    #[test]
    fn zero_sized_table() {
        let mut bytes = b"PCIX".to_vec();
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());

        let table = HashTableReader::from_bytes(bytes, FixedSizeStrategy::<U32Codec>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.lookup(name_hash("anything")).unwrap(), None);

        let stats = table.stats();
        assert_eq!(stats.table_size, 0);
        assert_eq!(stats.load_factor, 0.0);
        assert_eq!(stats.avg_probe_distance, 0.0);
    }

    #[test]
    fn wrapped_probe_distance() {
        // Two items whose ideal slot is the last one; the second wraps to slot 0
        let table_size = 5u32;
        let first = 4u32;
        let second = 9u32;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(table_size as i32).to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        for index in 0..table_size {
            let (hash, value) = match index {
                4 => (first, 40u32),
                0 => (second, 90u32),
                _ => (0, 0),
            };
            bytes.extend_from_slice(&hash.to_le_bytes());
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let table = HashTableReader::from_bytes(bytes, FixedSizeStrategy::<U32Codec>::new()).unwrap();
        assert_eq!(table.format(), TableLayout::Legacy);
        assert_eq!(table.lookup(first).unwrap(), Some(40));
        assert_eq!(table.lookup(second).unwrap(), Some(90));
        assert_eq!(table.lookup(14).unwrap(), None);

        let stats = table.stats();
        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.max_probe_distance, 1);
        assert_eq!(stats.avg_probe_distance, 0.5);
        assert_eq!(table.values().unwrap(), vec![90, 40]);
    }

    #[test]
    fn full_table_without_match() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        for hash in [2u32, 3u32] {
            bytes.extend_from_slice(&hash.to_le_bytes());
            bytes.extend_from_slice(&hash.to_le_bytes());
        }

        let table = HashTableReader::from_bytes(bytes, FixedSizeStrategy::<U32Codec>::new()).unwrap();
        assert_eq!(table.lookup(5).unwrap(), None);
        assert_eq!(table.lookup(3).unwrap(), Some(3));
    }
}
