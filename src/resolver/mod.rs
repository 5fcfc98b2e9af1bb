//! Resolution of user-defined type metadata.
//!
//! Application classes, interfaces and function libraries live in the host's program
//! store, not in the built-in catalog. The host exposes them through a
//! [`MetadataSource`]; [`TypeMetadataResolver`] puts a generation-stamped [`TypeCache`]
//! in front of it so repeated lookups during semantic analysis stay cheap.
//!
//! # Key Components
//!
//! - [`MetadataSource`] - Host hook resolving qualified names and record fields
//! - [`TypeMetadataResolver`] - Caching front of a source
//! - [`TypeCache`] / [`CacheConfig`] - Generational eviction
//! - [`NullMetadataSource`] - Source that knows nothing, used when no host is attached
//! - [`ProgramSourceProvider`] / [`SourceMetadataSource`] - Source-text based resolution
//!
//! # Semantics
//!
//! - Only successful resolutions are cached; a miss asks the source again next time.
//! - Source errors propagate unchanged and leave the cache untouched.
//! - Field types are never cached.
//! - Concurrent misses for the same name may each call the source; the last insert wins.
//!
//! # Examples
//!
//! ```rust
//! use pcmeta::resolver::{FnSource, MetadataKind, TypeMetadata, TypeMetadataResolver};
//!
//! let resolver = TypeMetadataResolver::new(FnSource::new(|name: &str| {
//!     Ok(name.starts_with("PKG:").then(|| TypeMetadata::new(name, MetadataKind::Class)))
//! }));
//!
//! let first = resolver.get_type_metadata("PKG:Widget")?.unwrap();
//! let second = resolver.get_type_metadata("PKG:Widget")?.unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! # Ok::<(), pcmeta::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod metadata;
pub mod source;

pub use cache::TypeCache;
pub use config::CacheConfig;
pub use metadata::{MetadataKind, TypeMetadata};
pub use source::{
    MemorySourceProvider, NullProgramSourceProvider, ProgramSourceProvider, SourceMetadataSource,
};

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{catalog::types::TypeInfo, Error, Result};

/// Host hook resolving user-defined types and record fields.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Resolves a qualified type name, `None` if the host does not know it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] (or any other error) if the host fails.
    fn resolve_type(&self, qualified_name: &str) -> Result<Option<TypeMetadata>>;

    /// Asynchronous variant of [`MetadataSource::resolve_type`].
    ///
    /// Defaults to calling the blocking variant.
    ///
    /// # Errors
    /// See [`MetadataSource::resolve_type`].
    async fn resolve_type_async(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        self.resolve_type(qualified_name)
    }

    /// Resolves the type of a `RECORD.FIELD` reference.
    ///
    /// # Errors
    /// Returns an error if the host fails.
    fn field_type(&self, field: &str) -> Result<TypeInfo>;

    /// Asynchronous variant of [`MetadataSource::field_type`].
    ///
    /// # Errors
    /// See [`MetadataSource::field_type`].
    async fn field_type_async(&self, field: &str) -> Result<TypeInfo> {
        self.field_type(field)
    }
}

#[async_trait]
impl<S: MetadataSource + ?Sized> MetadataSource for Box<S> {
    fn resolve_type(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        (**self).resolve_type(qualified_name)
    }

    async fn resolve_type_async(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        (**self).resolve_type_async(qualified_name).await
    }

    fn field_type(&self, field: &str) -> Result<TypeInfo> {
        (**self).field_type(field)
    }

    async fn field_type_async(&self, field: &str) -> Result<TypeInfo> {
        (**self).field_type_async(field).await
    }
}

#[async_trait]
impl<S: MetadataSource + ?Sized> MetadataSource for Arc<S> {
    fn resolve_type(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        (**self).resolve_type(qualified_name)
    }

    async fn resolve_type_async(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        (**self).resolve_type_async(qualified_name).await
    }

    fn field_type(&self, field: &str) -> Result<TypeInfo> {
        (**self).field_type(field)
    }

    async fn field_type_async(&self, field: &str) -> Result<TypeInfo> {
        (**self).field_type_async(field).await
    }
}

/// Source that resolves nothing; every field is [`TypeInfo::Any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetadataSource;

impl MetadataSource for NullMetadataSource {
    fn resolve_type(&self, _qualified_name: &str) -> Result<Option<TypeMetadata>> {
        Ok(None)
    }

    fn field_type(&self, _field: &str) -> Result<TypeInfo> {
        Ok(TypeInfo::Any)
    }
}

type FieldHook = Box<dyn Fn(&str) -> Result<TypeInfo> + Send + Sync>;

/// Source backed by closures.
pub struct FnSource<F> {
    resolve: F,
    field: Option<FieldHook>,
}

impl<F> FnSource<F>
where
    F: Fn(&str) -> Result<Option<TypeMetadata>> + Send + Sync,
{
    /// Creates a source from a type resolution closure; fields resolve to
    /// [`TypeInfo::Unknown`].
    pub fn new(resolve: F) -> Self {
        FnSource {
            resolve,
            field: None,
        }
    }

    /// Adds a field type closure.
    #[must_use]
    pub fn with_field_type(
        mut self,
        field: impl Fn(&str) -> Result<TypeInfo> + Send + Sync + 'static,
    ) -> Self {
        self.field = Some(Box::new(field));
        self
    }
}

impl<F> MetadataSource for FnSource<F>
where
    F: Fn(&str) -> Result<Option<TypeMetadata>> + Send + Sync,
{
    fn resolve_type(&self, qualified_name: &str) -> Result<Option<TypeMetadata>> {
        (self.resolve)(qualified_name)
    }

    fn field_type(&self, field: &str) -> Result<TypeInfo> {
        match &self.field {
            Some(hook) => hook(field),
            None => Ok(TypeInfo::Unknown),
        }
    }
}

/// Caching resolver over a [`MetadataSource`].
///
/// # Thread Safety
///
/// All methods take `&self`; the resolver can be shared across threads behind an `Arc`.
pub struct TypeMetadataResolver<S> {
    source: S,
    cache: TypeCache,
}

impl<S: MetadataSource> TypeMetadataResolver<S> {
    /// Creates a resolver with the default cache configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    /// Creates a resolver with a custom cache configuration.
    pub fn with_config(source: S, config: CacheConfig) -> Self {
        TypeMetadataResolver {
            source,
            cache: TypeCache::new(config),
        }
    }

    /// Returns the metadata of `qualified_name`, consulting the source on a cache miss.
    ///
    /// # Errors
    /// Propagates source failures; nothing is cached in that case.
    pub fn get_type_metadata(&self, qualified_name: &str) -> Result<Option<Arc<TypeMetadata>>> {
        if let Some(metadata) = self.cache.get(qualified_name) {
            return Ok(Some(metadata));
        }

        let resolved = self
            .source
            .resolve_type(qualified_name)
            .inspect_err(|error| {
                tracing::debug!(name = qualified_name, %error, "metadata source failed");
            })?;
        Ok(self.store(qualified_name, resolved))
    }

    /// Asynchronous variant of [`TypeMetadataResolver::get_type_metadata`].
    ///
    /// The source call races against `cancel`; a fired token wins ties.
    ///
    /// # Errors
    /// Returns [`crate::Error::Cancelled`] if `cancel` fires first, otherwise propagates
    /// source failures. Nothing is cached in either case.
    pub async fn get_type_metadata_async(
        &self,
        qualified_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Arc<TypeMetadata>>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(metadata) = self.cache.get(qualified_name) {
            return Ok(Some(metadata));
        }

        let resolved = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::trace!(name = qualified_name, "metadata resolution cancelled");
                return Err(Error::Cancelled);
            }
            resolved = self.source.resolve_type_async(qualified_name) => resolved?,
        };
        Ok(self.store(qualified_name, resolved))
    }

    /// Resolves the type of a `RECORD.FIELD` reference. Never cached.
    ///
    /// # Errors
    /// Propagates source failures.
    pub fn get_field_type(&self, field: &str) -> Result<TypeInfo> {
        self.source.field_type(field)
    }

    /// Asynchronous, cancellable variant of [`TypeMetadataResolver::get_field_type`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Cancelled`] if `cancel` fires first, otherwise propagates
    /// source failures.
    pub async fn get_field_type_async(
        &self,
        field: &str,
        cancel: &CancellationToken,
    ) -> Result<TypeInfo> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            ty = self.source.field_type_async(field) => ty,
        }
    }

    fn store(
        &self,
        qualified_name: &str,
        resolved: Option<TypeMetadata>,
    ) -> Option<Arc<TypeMetadata>> {
        match resolved {
            Some(metadata) => {
                let metadata = Arc::new(metadata);
                self.cache.insert(qualified_name, metadata.clone());
                Some(metadata)
            }
            None => {
                tracing::trace!(name = qualified_name, "type not known to metadata source");
                None
            }
        }
    }
}

impl<S> TypeMetadataResolver<S> {
    /// Sweeps stale cache entries now and returns how many were evicted.
    pub fn evict_now(&self) -> usize {
        self.cache.evict_now()
    }

    /// Drops every cached entry and resets the generation.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cache.len()
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl TypeMetadataResolver<NullMetadataSource> {
    /// Shared resolver that resolves nothing.
    ///
    /// Used when no host is attached: every type lookup misses and every field is
    /// [`TypeInfo::Any`], so analysis degrades to untyped checking instead of failing.
    #[must_use]
    pub fn null() -> &'static TypeMetadataResolver<NullMetadataSource> {
        static NULL: OnceLock<TypeMetadataResolver<NullMetadataSource>> = OnceLock::new();
        NULL.get_or_init(|| TypeMetadataResolver::new(NullMetadataSource))
    }
}
