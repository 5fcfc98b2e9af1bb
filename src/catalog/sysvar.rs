//! Fixed-size table of PeopleCode system variables (`%Date`, `%UserId`, ...).

use std::path::Path;

use crate::{
    catalog::{
        codec::SystemVariableCodec,
        types::{SystemVariableDefinition, SystemVariableInfo},
    },
    index::{
        config::WriterConfig,
        hash::name_hash,
        reader::{HashTableReader, TableStats},
        strategy::FixedSizeStrategy,
        writer::HashTableWriter,
    },
    Result,
};

type Strategy = FixedSizeStrategy<SystemVariableCodec>;

/// Case-insensitive lookup of system variable types.
///
/// Payloads are stored inline and decoded once at load time, so lookups never fail on
/// a table that loaded successfully.
pub struct SystemVariableTable {
    table: HashTableReader<Strategy>,
}

impl SystemVariableTable {
    /// Memory-maps a system variable table file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not a fixed-size table.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(SystemVariableTable {
            table: HashTableReader::load_from_file(path, Strategy::new())?,
        })
    }

    /// Parses a system variable table from memory.
    ///
    /// # Errors
    /// Returns an error if the image is not a fixed-size table.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(SystemVariableTable {
            table: HashTableReader::from_bytes(data, Strategy::new())?,
        })
    }

    /// Encodes definitions into a table image listing their names.
    ///
    /// # Errors
    /// Returns an error for non-primitive types, reserved hashes or an invalid config.
    pub fn encode(
        definitions: impl IntoIterator<Item = SystemVariableDefinition>,
        config: WriterConfig,
    ) -> Result<Vec<u8>> {
        let mut writer = HashTableWriter::with_config(Strategy::new(), config)?;
        let definitions: Vec<_> = definitions.into_iter().collect();
        writer.set_names(definitions.iter().map(|definition| definition.name.as_str()));
        writer.extend(definitions)?;
        writer.to_bytes()
    }

    /// Looks up a variable by name, ignoring case. The leading `%` is part of the name.
    ///
    /// # Errors
    /// Never fails for fixed-size tables; the signature matches the other lookups.
    pub fn lookup(&self, name: &str) -> Result<Option<SystemVariableInfo>> {
        self.table.lookup(name_hash(name))
    }

    /// Returns `true` if a variable of that name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name_hash(name))
    }

    /// Names listed in the table.
    #[must_use]
    pub fn names(&self) -> &[String] {
        self.table.names()
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Probe statistics.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }
}
