//! Built-in object view over catalog records.

use crate::{
    catalog::{
        codec::{FunctionCodec, PropertyCodec},
        types::{FunctionInfo, ObjectKind, PropertyInfo},
    },
    index::{hash::name_hash, reader::HashTableReader, strategy::VariableSizeStrategy},
    Result,
};

/// Member lookup on a built-in PeopleCode object.
///
/// Name-based lookups are case-insensitive: they hash the name with
/// [`crate::name_hash`] and delegate to the `_by_hash` methods. Callers that probe the
/// same name against many objects can hash once and use the `_by_hash` variants.
///
/// A missing member is `Ok(None)`; errors are reserved for damaged catalog data.
pub trait ObjectInfo: Send + Sync {
    /// Object name as declared, e.g. `Rowset`.
    fn name(&self) -> &str;

    /// Coarse classification.
    fn kind(&self) -> ObjectKind;

    /// Number of methods.
    fn method_count(&self) -> usize;

    /// Number of properties.
    fn property_count(&self) -> usize;

    /// Looks up a method by [`crate::name_hash`] of its name.
    ///
    /// # Errors
    /// Returns an error if the method record is damaged.
    fn lookup_method_by_hash(&self, hash: u32) -> Result<Option<FunctionInfo>>;

    /// Looks up a property by [`crate::name_hash`] of its name.
    ///
    /// # Errors
    /// Returns an error if the property record is damaged.
    fn lookup_property_by_hash(&self, hash: u32) -> Result<Option<PropertyInfo>>;

    /// Decodes every method.
    ///
    /// # Errors
    /// Returns an error if any method record is damaged.
    fn all_methods(&self) -> Result<Vec<FunctionInfo>>;

    /// Decodes every property.
    ///
    /// # Errors
    /// Returns an error if any property record is damaged.
    fn all_properties(&self) -> Result<Vec<PropertyInfo>>;

    /// Looks up a method by name, ignoring case.
    ///
    /// # Errors
    /// Returns an error if the method record is damaged.
    fn lookup_method(&self, name: &str) -> Result<Option<FunctionInfo>> {
        self.lookup_method_by_hash(name_hash(name))
    }

    /// Looks up a property by name, ignoring case.
    ///
    /// # Errors
    /// Returns an error if the property record is damaged.
    fn lookup_property(&self, name: &str) -> Result<Option<PropertyInfo>> {
        self.lookup_property_by_hash(name_hash(name))
    }
}

type MethodTable = HashTableReader<VariableSizeStrategy<FunctionCodec>>;
type PropertyTable = HashTableReader<VariableSizeStrategy<PropertyCodec>>;

/// A built-in object decoded from an [`crate::catalog::ObjectCatalog`] record.
///
/// Holds its own method and property tables; member payloads are decoded on each lookup.
pub struct BuiltinObject {
    name: String,
    kind: ObjectKind,
    methods: MethodTable,
    properties: PropertyTable,
}

impl BuiltinObject {
    /// Builds an object from its encoded member tables.
    ///
    /// # Errors
    /// Returns an error if either table image is malformed.
    pub fn from_tables(
        name: String,
        kind: ObjectKind,
        methods: &[u8],
        properties: &[u8],
    ) -> Result<Self> {
        let methods = HashTableReader::from_bytes(methods.to_vec(), VariableSizeStrategy::new())?;
        let properties =
            HashTableReader::from_bytes(properties.to_vec(), VariableSizeStrategy::new())?;

        Ok(BuiltinObject {
            name,
            kind,
            methods,
            properties,
        })
    }
}

impl ObjectInfo for BuiltinObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn method_count(&self) -> usize {
        self.methods.len()
    }

    fn property_count(&self) -> usize {
        self.properties.len()
    }

    fn lookup_method_by_hash(&self, hash: u32) -> Result<Option<FunctionInfo>> {
        self.methods.lookup(hash)
    }

    fn lookup_property_by_hash(&self, hash: u32) -> Result<Option<PropertyInfo>> {
        self.properties.lookup(hash)
    }

    fn all_methods(&self) -> Result<Vec<FunctionInfo>> {
        self.methods.values()
    }

    fn all_properties(&self) -> Result<Vec<PropertyInfo>> {
        self.properties.values()
    }
}

impl std::fmt::Debug for BuiltinObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinObject")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .finish()
    }
}
