//! Assembles built-in object definitions into an object catalog image.

use std::path::Path;

use rayon::prelude::*;

use crate::{
    catalog::{
        codec::{FunctionCodec, ObjectRecord, ObjectRecordCodec, PropertyCodec},
        types::{FunctionInfo, ObjectKind, PropertyInfo},
        ObjectCatalog,
    },
    file::output,
    index::{config::WriterConfig, strategy::VariableSizeStrategy, writer::HashTableWriter},
    Result,
};

/// Source definition of one built-in object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDefinition {
    /// Object name as declared
    pub name: String,
    /// Classification
    pub kind: ObjectKind,
    /// Method signatures
    pub methods: Vec<FunctionInfo>,
    /// Properties
    pub properties: Vec<PropertyInfo>,
}

impl ObjectDefinition {
    /// Creates an object without members.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        ObjectDefinition {
            name: name.into(),
            kind,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: FunctionInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.properties.push(property);
        self
    }

    fn encode(&self, config: WriterConfig) -> Result<ObjectRecord> {
        let mut methods =
            HashTableWriter::with_config(VariableSizeStrategy::<FunctionCodec>::new(), config)?;
        methods.extend(self.methods.iter().cloned())?;

        let mut properties =
            HashTableWriter::with_config(VariableSizeStrategy::<PropertyCodec>::new(), config)?;
        properties.extend(self.properties.iter().cloned())?;

        Ok(ObjectRecord {
            name: self.name.clone(),
            kind: self.kind,
            methods: methods.to_bytes()?,
            properties: properties.to_bytes()?,
        })
    }
}

/// Builder for [`crate::catalog::ObjectCatalog`] images.
///
/// Member tables of all objects are encoded in parallel; the outer table lists every
/// object name in its name table, in insertion order.
///
/// # Examples
///
/// ```rust
/// use pcmeta::catalog::{CatalogBuilder, ObjectDefinition, ObjectInfo};
/// use pcmeta::catalog::types::{ObjectKind, PropertyInfo, TypeInfo, PrimitiveType};
///
/// let mut builder = CatalogBuilder::new();
/// builder.add(
///     ObjectDefinition::new("Rowset", ObjectKind::DataBuffer).with_property(
///         PropertyInfo::read_only("ActiveRowCount", TypeInfo::Primitive(PrimitiveType::Integer)),
///     ),
/// );
///
/// let catalog = builder.build_catalog()?;
/// let rowset = catalog.lookup_object("ROWSET")?.unwrap();
/// assert!(rowset.lookup_property("activerowcount")?.is_some());
/// # Ok::<(), pcmeta::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    config: WriterConfig,
    objects: Vec<ObjectDefinition>,
}

impl CatalogBuilder {
    /// Creates a builder with the default writer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with a custom writer configuration, used for every table.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is out of range.
    pub fn with_config(config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(CatalogBuilder {
            config,
            objects: Vec::new(),
        })
    }

    /// Adds an object definition.
    pub fn add(&mut self, object: ObjectDefinition) -> &mut Self {
        self.objects.push(object);
        self
    }

    /// Number of objects added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no objects were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Encodes the catalog image.
    ///
    /// # Errors
    /// Returns [`crate::Error::ReservedHash`] for unrepresentable names and any payload
    /// encoding error.
    pub fn build(&self) -> Result<Vec<u8>> {
        let records = self
            .objects
            .par_iter()
            .map(|object| object.encode(self.config))
            .collect::<Result<Vec<_>>>()?;

        let mut writer =
            HashTableWriter::with_config(VariableSizeStrategy::<ObjectRecordCodec>::new(), self.config)?;
        writer.set_names(self.objects.iter().map(|object| object.name.as_str()));
        writer.extend(records)?;

        let bytes = writer.to_bytes()?;
        tracing::debug!(objects = self.objects.len(), bytes = bytes.len(), "built object catalog");
        Ok(bytes)
    }

    /// Encodes the catalog image and opens it.
    ///
    /// # Errors
    /// Returns the errors of [`CatalogBuilder::build`] and [`ObjectCatalog::from_bytes`].
    pub fn build_catalog(&self) -> Result<ObjectCatalog> {
        ObjectCatalog::from_bytes(self.build()?)
    }

    /// Encodes the catalog image into a file.
    ///
    /// # Errors
    /// Returns the errors of [`CatalogBuilder::build`] and output file failures.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.build()?;

        output::write_image(path, &bytes)
    }
}
