//! Built-in object catalog.
//!
//! The catalog answers "does built-in object X have a member named Y, and what is its
//! signature?" from an immutable binary image. It is a variable-size index of object
//! records keyed by [`crate::name_hash`] of the object name; every record embeds two
//! nested index images for the object's methods and properties.
//!
//! # Key Components
//!
//! - [`ObjectCatalog`] - Loaded catalog with memoised object decoding
//! - [`ObjectInfo`] / [`BuiltinObject`] - Member lookup on one object
//! - [`CatalogBuilder`] - Produces catalog images from [`ObjectDefinition`]s
//! - [`SystemVariableTable`] - Fixed-size table of system variable types
//! - [`types`] / [`codec`] - Payload data and its encoding
//!
//! # Examples
//!
//! ```rust,no_run
//! use pcmeta::catalog::{ObjectCatalog, ObjectInfo};
//!
//! let catalog = ObjectCatalog::load_from_file("objects.pcix")?;
//! if let Some(rowset) = catalog.lookup_object("Rowset")? {
//!     if let Some(property) = rowset.lookup_property("ActiveRowCount")? {
//!         println!("{}: {}", property.name, property.ty);
//!     }
//! }
//! # Ok::<(), pcmeta::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`ObjectCatalog`] is `Send + Sync`. Decoded objects are shared as `Arc<BuiltinObject>`;
//! two threads missing the memo for the same object may both decode it, the first
//! stored instance wins.

pub mod builder;
pub mod codec;
pub mod object;
pub mod sysvar;
pub mod types;

pub use builder::{CatalogBuilder, ObjectDefinition};
pub use object::{BuiltinObject, ObjectInfo};
pub use sysvar::SystemVariableTable;

use std::{path::Path, sync::Arc};

use dashmap::DashMap;

use crate::{
    catalog::codec::ObjectRecordCodec,
    index::{
        hash::name_hash,
        header::TableLayout,
        reader::{HashTableReader, TableStats},
        strategy::VariableSizeStrategy,
    },
    Result,
};

type Strategy = VariableSizeStrategy<ObjectRecordCodec>;

/// A loaded built-in object catalog.
pub struct ObjectCatalog {
    table: HashTableReader<Strategy>,
    objects: DashMap<u32, Arc<BuiltinObject>>,
}

impl ObjectCatalog {
    /// Memory-maps a catalog file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not an object catalog.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(HashTableReader::load_from_file(path, Strategy::new())?))
    }

    /// Parses a catalog from memory.
    ///
    /// # Errors
    /// Returns an error if the image is not an object catalog.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::new(HashTableReader::from_bytes(data, Strategy::new())?))
    }

    fn new(table: HashTableReader<Strategy>) -> Self {
        ObjectCatalog {
            table,
            objects: DashMap::new(),
        }
    }

    /// Looks up an object by name, ignoring case.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingDataSection`] or [`crate::Error::Malformed`] for a
    /// damaged catalog.
    pub fn lookup_object(&self, name: &str) -> Result<Option<Arc<BuiltinObject>>> {
        self.lookup_object_by_hash(name_hash(name))
    }

    /// Looks up an object by [`crate::name_hash`] of its name.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingDataSection`] or [`crate::Error::Malformed`] for a
    /// damaged catalog.
    pub fn lookup_object_by_hash(&self, hash: u32) -> Result<Option<Arc<BuiltinObject>>> {
        if let Some(object) = self.objects.get(&hash) {
            return Ok(Some(object.clone()));
        }

        let Some(object) = self.table.lookup(hash)? else {
            return Ok(None);
        };

        tracing::trace!(object = object.name(), "decoded catalog object");
        Ok(Some(self.objects.entry(hash).or_insert(object).clone()))
    }

    /// Names of all objects, as listed in the catalog's name table.
    #[must_use]
    pub fn object_names(&self) -> &[String] {
        self.table.names()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the catalog holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Probe statistics of the object table.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }

    /// Header layout of the catalog file.
    #[must_use]
    pub fn format(&self) -> TableLayout {
        self.table.format()
    }
}
