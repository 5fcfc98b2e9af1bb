//! Program source access for metadata sources that parse PeopleCode themselves.
//!
//! A host that keeps PeopleCode programs in a database or on disk implements
//! [`ProgramSourceProvider`]. [`SourceMetadataSource`] combines such a provider with a
//! parse hook into a [`crate::resolver::MetadataSource`], so the resolver can derive
//! metadata from source text without knowing how the text is parsed.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    catalog::types::TypeInfo,
    resolver::{metadata::TypeMetadata, MetadataSource},
    Result,
};

/// Supplies the source text of PeopleCode programs by qualified name.
#[async_trait]
pub trait ProgramSourceProvider: Send + Sync {
    /// Returns the source of `qualified_name`, `None` if no such program exists.
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] or [`crate::Error::FileError`] if the host
    /// storage fails.
    fn get_source(&self, qualified_name: &str) -> Result<Option<String>>;

    /// Asynchronous variant of [`ProgramSourceProvider::get_source`].
    ///
    /// Defaults to calling the blocking variant.
    ///
    /// # Errors
    /// See [`ProgramSourceProvider::get_source`].
    async fn get_source_async(&self, qualified_name: &str) -> Result<Option<String>> {
        self.get_source(qualified_name)
    }
}

/// Provider without any programs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgramSourceProvider;

impl ProgramSourceProvider for NullProgramSourceProvider {
    fn get_source(&self, _qualified_name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Provider serving programs from memory, keyed by exact qualified name.
#[derive(Debug, Default)]
pub struct MemorySourceProvider {
    sources: DashMap<String, String>,
}

impl MemorySourceProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces the source of a program.
    pub fn insert(&self, qualified_name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(qualified_name.into(), source.into());
    }

    /// Removes a program, returning its source.
    pub fn remove(&self, qualified_name: &str) -> Option<String> {
        self.sources.remove(qualified_name).map(|(_, source)| source)
    }

    /// Number of stored programs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no programs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ProgramSourceProvider for MemorySourceProvider {
    fn get_source(&self, qualified_name: &str) -> Result<Option<String>> {
        Ok(self
            .sources
            .get(qualified_name)
            .map(|source| source.value().clone()))
    }
}

/// A [`MetadataSource`] that parses program source fetched from a provider.
///
/// The parse hook receives the qualified name and the source text. Field types are not
/// derivable from program source and resolve to [`TypeInfo::Unknown`].
///
/// # Examples
///
/// ```rust
/// use pcmeta::resolver::{
///     MemorySourceProvider, MetadataKind, SourceMetadataSource, TypeMetadata,
///     TypeMetadataResolver,
/// };
///
/// let provider = MemorySourceProvider::new();
/// provider.insert("PKG:Widget", "class Widget\nend-class;");
///
/// let source = SourceMetadataSource::new(provider, |name: &str, text: &str| {
///     let kind = if text.starts_with("interface") {
///         MetadataKind::Interface
///     } else {
///         MetadataKind::Class
///     };
///     Ok(Some(TypeMetadata::new(name, kind)))
/// });
///
/// let resolver = TypeMetadataResolver::new(source);
/// let widget = resolver.get_type_metadata("PKG:Widget")?.unwrap();
/// assert_eq!(widget.kind, MetadataKind::Class);
/// assert!(resolver.get_type_metadata("PKG:Missing")?.is_none());
/// # Ok::<(), pcmeta::Error>(())
/// ```
pub struct SourceMetadataSource<P, F> {
    provider: P,
    parse: F,
}

impl<P, F> SourceMetadataSource<P, F>
where
    P: ProgramSourceProvider,
    F: Fn(&str, &str) -> Result<Option<TypeMetadata>> + Send + Sync,
{
    /// Combines a provider with a parse hook.
    pub fn new(provider: P, parse: F) -> Self {
        SourceMetadataSource { provider, parse }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P, F> MetadataSource for SourceMetadataSource<P, F>
where
    P: ProgramSourceProvider,
    F: Fn(&str, &str) -> Result<Option<TypeMetadata>> + Send + Sync,
{
    fn resolve_type(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        match self.provider.get_source(qualified_name)? {
            Some(source) => (self.parse)(qualified_name, &source),
            None => Ok(None),
        }
    }

    async fn resolve_type_async(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        match self.provider.get_source_async(qualified_name).await? {
            Some(source) => (self.parse)(qualified_name, &source),
            None => Ok(None),
        }
    }

    fn field_type(&self, _field: &str) -> Result<TypeInfo> {
        Ok(TypeInfo::Unknown)
    }
}
