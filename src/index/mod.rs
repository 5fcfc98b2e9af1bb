//! Hash-indexed binary tables.
//!
//! This module implements the engine behind every catalog image: an immutable
//! open-addressing table keyed by 32-bit [`hash::name_hash`] values, probed linearly with
//! wrap-around. An empty slot ends a probe sequence, so a miss costs at most the length
//! of the cluster the key falls into.
//!
//! # Architecture
//!
//! - [`hash`] - FNV-1a hashing, `0` reserved for empty slots
//! - [`entry`] - Slot model shared by both storage kinds
//! - [`header`] - Versioned and legacy header layouts, name table
//! - [`strategy`] - Fixed-size (inline) and variable-size (offset) payload storage
//! - [`config`] - Writer load factor and layout selection
//! - [`reader`] / [`writer`] - The engine itself
//!
//! The engine is generic over its strategy; payload formats are supplied by codecs in
//! [`crate::catalog::codec`].

pub mod config;
pub mod entry;
pub mod hash;
pub mod header;
pub mod reader;
pub mod strategy;
pub mod writer;

pub use config::WriterConfig;
pub use entry::HashTableEntry;
pub use header::{FormatFlags, TableLayout, FORMAT_MAGIC, FORMAT_VERSION, LEGACY_NAME_COUNT_LIMIT};
pub use reader::{HashTableReader, TableStats};
pub use strategy::{FixedSizeStrategy, ReadStrategy, VariableSizeStrategy, WriteStrategy};
pub use writer::HashTableWriter;
