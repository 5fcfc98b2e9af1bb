// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' and 'file/output.rs' use mmap to map files into memory

//! # pcmeta
//!
//! Type metadata for PeopleCode tooling: an immutable, hash-indexed binary catalog of
//! built-in objects and a caching resolver for user-defined types.
//!
//! Semantic analysis of PeopleCode asks two questions over and over, at interactive
//! speed: "does built-in object `X` have a member named `Y`, and what is its
//! signature?" and "what does application class `PKG:Z` look like?". The first is
//! answered from a memory-mapped catalog file, the second from the host's program store
//! behind a generation-stamped cache.
//!
//! ## Features
//!
//! - **Memory-mapped catalogs** - Open-addressing tables probed in place, payloads decoded from zero-copy slices
//! - **Case-insensitive lookups** - FNV-1a over lower-cased names, stable across releases
//! - **Versioned format** - Explicit header with flags, legacy layout still readable
//! - **Host decoupling** - Types resolved through a pluggable [`resolver::MetadataSource`]
//! - **Bounded caching** - Generational eviction keeps the resolver cache small without locks on the hot path
//!
//! ## Quick Start
//!
//! ```rust
//! use pcmeta::prelude::*;
//!
//! let mut builder = CatalogBuilder::new();
//! builder.add(
//!     ObjectDefinition::new("Rowset", ObjectKind::DataBuffer)
//!         .with_property(PropertyInfo::read_only(
//!             "ActiveRowCount",
//!             TypeInfo::Primitive(PrimitiveType::Integer),
//!         )),
//! );
//! let catalog = ObjectCatalog::from_bytes(builder.build()?)?;
//!
//! let rowset = catalog.lookup_object("rowset")?.expect("Rowset is a built-in");
//! let count = rowset.lookup_property("ACTIVEROWCOUNT")?.expect("declared above");
//! assert_eq!(count.ty, TypeInfo::Primitive(PrimitiveType::Integer));
//! # Ok::<(), pcmeta::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte-level access: parser, output buffer, memory and mmap backends
//! - [`index`] - The hash table engine: header, strategies, reader, writer
//! - [`catalog`] - Built-in objects and system variables on top of the engine
//! - [`resolver`] - User-defined type resolution and its cache
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (table loads, writer collisions, cache sweeps) and
//! never installs a subscriber itself.
//!
//! ## Error Handling
//!
//! A name that does not exist is `Ok(None)`. Errors are reserved for broken catalogs,
//! failing hosts and misuse:
//!
//! ```rust,no_run
//! use pcmeta::{Error, catalog::ObjectCatalog};
//!
//! match ObjectCatalog::load_from_file("objects.pcix") {
//!     Ok(catalog) => println!("{} objects", catalog.len()),
//!     Err(Error::NotSupported(version)) => println!("Catalog version {} is too new", version),
//!     Err(Error::Malformed { message, .. }) => println!("Broken catalog: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench lookup
//! cargo +nightly fuzz run catalog --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

pub mod catalog;
pub mod file;
pub mod index;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use pcmeta::prelude::*;
///
/// let catalog = ObjectCatalog::load_from_file("objects.pcix")?;
/// let resolver = TypeMetadataResolver::null();
/// # Ok::<(), pcmeta::Error>(())
/// ```
pub mod prelude;
pub mod resolver;

/// `pcmeta` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `pcmeta` Error type
///
/// The single error type of the crate, carrying source locations for malformed catalogs.
pub use error::Error;

/// Case-insensitive FNV-1a hash used as the key of every catalog table.
pub use index::hash::name_hash;

/// Cursor-based little-endian parser used by all payload decoders.
pub use file::parser::Parser;
