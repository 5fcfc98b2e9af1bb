//! Write side of the index engine.
//!
//! [`crate::index::HashTableWriter`] collects items, places them by linear probing into a
//! prime-sized table and serialises header, name table, entry array and data section in
//! the layout chosen by [`crate::index::config::WriterConfig`]. Everything it writes can be
//! read back by a [`crate::index::HashTableReader`] opened with the matching strategy.

use std::path::Path;

use crate::{
    file::{buffer::ByteBuffer, output},
    index::{
        config::WriterConfig,
        hash::EMPTY_HASH,
        header::TableHeader,
        strategy::WriteStrategy,
    },
    Error, Result,
};

/// Builder for catalog images.
///
/// # Examples
///
/// ```rust
/// use pcmeta::catalog::codec::SystemVariableCodec;
/// use pcmeta::catalog::types::{SystemVariableDefinition, TypeInfo, PrimitiveType};
/// use pcmeta::index::{HashTableReader, HashTableWriter};
/// use pcmeta::index::strategy::FixedSizeStrategy;
///
/// let mut writer = HashTableWriter::new(FixedSizeStrategy::<SystemVariableCodec>::new());
/// writer.add(SystemVariableDefinition::new("%Date", TypeInfo::Primitive(PrimitiveType::Date)))?;
///
/// let reader = HashTableReader::from_bytes(
///     writer.to_bytes()?,
///     FixedSizeStrategy::<SystemVariableCodec>::new(),
/// )?;
/// assert!(reader.contains(pcmeta::name_hash("%date")));
/// # Ok::<(), pcmeta::Error>(())
/// ```
pub struct HashTableWriter<S: WriteStrategy> {
    strategy: S,
    config: WriterConfig,
    items: Vec<(u32, S::Item)>,
    names: Vec<String>,
}

impl<S: WriteStrategy> HashTableWriter<S> {
    /// Creates a writer with the default configuration.
    pub fn new(strategy: S) -> Self {
        HashTableWriter {
            strategy,
            config: WriterConfig::default(),
            items: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Creates a writer with a custom configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is out of range.
    pub fn with_config(strategy: S, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(HashTableWriter {
            config,
            ..Self::new(strategy)
        })
    }

    /// Adds an item under the hash of its key.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReservedHash`] if the key hashes to the empty-slot value.
    pub fn add(&mut self, item: S::Item) -> Result<()> {
        let hash = self.strategy.hash(&item);
        if hash == EMPTY_HASH {
            return Err(Error::ReservedHash(self.strategy.key(&item).to_string()));
        }

        self.items.push((hash, item));
        Ok(())
    }

    /// Adds every item of `items`, stopping at the first rejected one.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReservedHash`] for the first key hashing to `0`.
    pub fn extend(&mut self, items: impl IntoIterator<Item = S::Item>) -> Result<()> {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Sets the name table emitted with the image.
    pub fn set_names<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
    }

    /// Number of items added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no items were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Serialises the table into a new buffer.
    ///
    /// Items whose hash is already taken by an earlier item are dropped with a warning.
    ///
    /// # Errors
    /// Returns an error if a payload cannot be encoded or the image exceeds the limits of
    /// the format's `i32`/`u32` fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let table_size = self.config.table_size_for(self.items.len());
        let slots = self.place(table_size);

        let payload_size = self.strategy.fixed_size();
        let record_size = if self.strategy.is_fixed_size() {
            4 + payload_size
        } else {
            8
        };

        let mut buffer = ByteBuffer::with_capacity(64 + table_size * record_size);
        TableHeader::write(
            &mut buffer,
            self.config.layout,
            self.strategy.is_fixed_size(),
            table_size,
            &self.names,
        )?;

        if self.strategy.is_fixed_size() {
            for slot in &slots {
                match slot {
                    Some(index) => {
                        let (hash, item) = &self.items[*index];
                        buffer.write_le(*hash);
                        self.strategy.write_data(&mut buffer, item)?;
                    }
                    None => {
                        buffer.write_le(EMPTY_HASH);
                        buffer.write_zeros(payload_size);
                    }
                }
            }
        } else {
            let mut data = ByteBuffer::new();
            for slot in &slots {
                match slot {
                    Some(index) => {
                        let (hash, item) = &self.items[*index];
                        let offset = u32::try_from(data.len()).map_err(|_| {
                            Error::Error(format!("Data section exceeds {} bytes", u32::MAX))
                        })?;
                        self.strategy.write_data(&mut data, item)?;
                        buffer.write_le(*hash);
                        buffer.write_le(offset);
                    }
                    None => {
                        buffer.write_le(EMPTY_HASH);
                        buffer.write_le(0u32);
                    }
                }
            }
            buffer.write_bytes(data.as_slice());
        }

        Ok(buffer.into_inner())
    }

    /// Serialises the table into a file, replacing any existing file.
    ///
    /// The file is only left behind once it has been written completely.
    ///
    /// # Errors
    /// Returns the errors of [`HashTableWriter::to_bytes`] and
    /// [`crate::Error::WriteMmapFailed`] / [`crate::Error::WriteFinalizationFailed`] for
    /// output failures.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;

        output::write_image(path.as_ref(), &bytes)?;

        tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "wrote catalog file");
        Ok(())
    }

    /// Assigns every item a slot; `None` marks an empty slot.
    fn place(&self, table_size: usize) -> Vec<Option<usize>> {
        let mut slots = vec![None; table_size];
        if table_size == 0 {
            return slots;
        }

        let mut placed = 0usize;
        let mut max_probe = 0usize;
        'items: for (index, (hash, item)) in self.items.iter().enumerate() {
            let start = *hash as usize % table_size;
            for step in 0..table_size {
                let slot = (start + step) % table_size;
                match slots[slot] {
                    None => {
                        slots[slot] = Some(index);
                        placed += 1;
                        max_probe = max_probe.max(step);
                        continue 'items;
                    }
                    Some(existing) if self.items[existing].0 == *hash => {
                        tracing::warn!(
                            key = self.strategy.key(item),
                            kept = self.strategy.key(&self.items[existing].1),
                            hash = *hash,
                            "hash collision, later key dropped"
                        );
                        continue 'items;
                    }
                    Some(_) => {}
                }
            }
        }

        tracing::debug!(
            items = placed,
            table_size,
            max_probe,
            load_factor = self.config.load_factor,
            "placed catalog table"
        );
        slots
    }
}
