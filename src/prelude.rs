//! # pcmeta Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the pcmeta library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all pcmeta operations
pub use crate::Error;

/// The result type used throughout pcmeta
pub use crate::Result;

/// Case-insensitive catalog name hash
pub use crate::name_hash;

// ================================================================================================
// Built-in Object Catalog
// ================================================================================================

/// Catalog loading, lookup and building
pub use crate::catalog::{
    BuiltinObject, CatalogBuilder, ObjectCatalog, ObjectDefinition, ObjectInfo,
    SystemVariableTable,
};

/// Catalog payload types
pub use crate::catalog::types::{
    FunctionInfo, ObjectKind, ParameterFlags, ParameterInfo, PrimitiveType, PropertyFlags,
    PropertyInfo, SystemVariableDefinition, SystemVariableFlags, SystemVariableInfo, TypeInfo,
};

// ================================================================================================
// Index Engine
// ================================================================================================

/// Generic table reader and writer
pub use crate::index::{HashTableReader, HashTableWriter, TableLayout, TableStats, WriterConfig};

// ================================================================================================
// Type Resolution
// ================================================================================================

/// Resolver, cache and host hooks
pub use crate::resolver::{
    CacheConfig, FnSource, MetadataKind, MetadataSource, NullMetadataSource, ProgramSourceProvider,
    TypeMetadata, TypeMetadataResolver,
};
