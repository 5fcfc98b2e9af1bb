//! Catalog image header: versioned layout, legacy detection and the name table.
//!
//! A catalog image starts with one of two headers:
//!
//! ```text
//! Versioned                              Legacy
//! magic      [u8; 4] = "PCIX"            table_size i32
//! version    u16     = 1                 [names]    heuristically detected
//! flags      u16
//! table_size i32
//! [names]    if NAME_TABLE
//! ```
//!
//! The name table is an `i32` count followed by that many 7-bit length-prefixed UTF-8
//! strings. The legacy layout has no flag for it, so its presence is guessed: the next
//! `i32` is accepted as a count if it lies within `[0, LEGACY_NAME_COUNT_LIMIT]` and the
//! entry array still fits after the names have been consumed. Otherwise the parser
//! rolls back and treats the bytes as the entry array.

use bitflags::bitflags;
use strum::{Display, EnumString};

use crate::{file::buffer::ByteBuffer, Error, Parser, Result};

/// Magic bytes opening a versioned catalog image.
pub const FORMAT_MAGIC: [u8; 4] = *b"PCIX";

/// Current versioned format revision.
pub const FORMAT_VERSION: u16 = 1;

/// Largest `i32` accepted as a name count by the legacy layout heuristic.
pub const LEGACY_NAME_COUNT_LIMIT: i32 = 10_000;

/// Size of the versioned header without the name table.
pub const VERSIONED_HEADER_SIZE: usize = 12;

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Header flags of a versioned catalog image
    pub struct FormatFlags: u16 {
        /// A name table follows the header
        const NAME_TABLE = 0x0001;
        /// Entries reference payloads in a trailing data section
        const VARIABLE_SIZE = 0x0002;
    }
}

/// On-disk header layout of a catalog image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TableLayout {
    /// Magic, version and flags precede the table size
    #[default]
    Versioned,
    /// Bare table size with a heuristically detected name table
    Legacy,
}

/// Storage kind name used in [`crate::Error::StrategyMismatch`].
pub(crate) fn storage_kind(fixed_size: bool) -> &'static str {
    if fixed_size {
        "fixed-size"
    } else {
        "variable-size"
    }
}

/// Parsed catalog header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    /// Layout the image was written in
    pub layout: TableLayout,
    /// Flags of the image; synthesised for legacy images
    pub flags: FormatFlags,
    /// Number of slots in the entry array
    pub table_size: usize,
    /// Names listed in the name table, empty if absent
    pub names: Vec<String>,
}

impl TableHeader {
    /// Parses the header and name table, leaving `parser` at the first entry record.
    ///
    /// # Arguments
    /// * `parser` - Parser positioned at the start of the image
    /// * `record_size` - Size of one entry record for the opening strategy
    /// * `fixed_size` - Whether the opening strategy stores payloads inline
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty image, [`crate::Error::NotSupported`]
    /// for an unknown version, [`crate::Error::StrategyMismatch`] if the storage kind
    /// disagrees with the strategy, and [`crate::Error::Malformed`] or
    /// [`crate::Error::OutOfBounds`] for truncated or inconsistent data.
    pub fn parse(parser: &mut Parser<'_>, record_size: usize, fixed_size: bool) -> Result<Self> {
        if parser.is_empty() {
            return Err(Error::Empty);
        }

        if parser.remaining() >= FORMAT_MAGIC.len()
            && parser.data()[parser.pos()..parser.pos() + FORMAT_MAGIC.len()] == FORMAT_MAGIC
        {
            Self::parse_versioned(parser, record_size, fixed_size)
        } else {
            Self::parse_legacy(parser, record_size, fixed_size)
        }
    }

    fn parse_versioned(
        parser: &mut Parser<'_>,
        record_size: usize,
        fixed_size: bool,
    ) -> Result<Self> {
        parser.advance_by(FORMAT_MAGIC.len())?;

        let version = parser.read_le::<u16>()?;
        if version != FORMAT_VERSION {
            return Err(Error::NotSupported(version));
        }

        let raw_flags = parser.read_le::<u16>()?;
        let Some(flags) = FormatFlags::from_bits(raw_flags) else {
            return Err(malformed_error!("Unknown header flags - 0x{:04X}", raw_flags));
        };

        let stored_fixed = !flags.contains(FormatFlags::VARIABLE_SIZE);
        if stored_fixed != fixed_size {
            return Err(Error::StrategyMismatch {
                expected: storage_kind(fixed_size),
                found: storage_kind(stored_fixed),
            });
        }

        let table_size = read_table_size(parser)?;
        let names = if flags.contains(FormatFlags::NAME_TABLE) {
            let count = parser.read_le::<i32>()?;
            let Ok(count) = usize::try_from(count) else {
                return Err(malformed_error!("Negative name count - {}", count));
            };
            read_names(parser, count)?
        } else {
            Vec::new()
        };

        ensure_entries_fit(parser, table_size, record_size)?;

        Ok(TableHeader {
            layout: TableLayout::Versioned,
            flags,
            table_size,
            names,
        })
    }

    fn parse_legacy(parser: &mut Parser<'_>, record_size: usize, fixed_size: bool) -> Result<Self> {
        let table_size = read_table_size(parser)?;
        let entries_len = entries_len(table_size, record_size)?;

        let names = parser
            .transactional(|p| {
                let count = p.read_le::<i32>()?;
                if !(0..=LEGACY_NAME_COUNT_LIMIT).contains(&count) {
                    return Err(malformed_error!("Not a name count - {}", count));
                }

                #[allow(clippy::cast_sign_loss)]
                let names = read_names(p, count as usize)?;
                p.ensure_remaining(entries_len)?;
                Ok(names)
            })
            .ok();

        let has_names = names.is_some();
        tracing::trace!(table_size, has_names, "legacy catalog header detected");

        ensure_entries_fit(parser, table_size, record_size)?;

        let mut flags = if fixed_size {
            FormatFlags::empty()
        } else {
            FormatFlags::VARIABLE_SIZE
        };
        if has_names {
            flags |= FormatFlags::NAME_TABLE;
        }

        Ok(TableHeader {
            layout: TableLayout::Legacy,
            flags,
            table_size,
            names: names.unwrap_or_default(),
        })
    }

    /// Serialises a header and name table in the requested layout.
    ///
    /// Legacy images always carry a name table, possibly empty, so that a reader never
    /// mistakes the first entry record for a name count.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfig`] if `table_size` or the name count does not
    /// fit the on-disk `i32` fields.
    pub fn write(
        buffer: &mut ByteBuffer,
        layout: TableLayout,
        fixed_size: bool,
        table_size: usize,
        names: &[String],
    ) -> Result<()> {
        let table_size = i32::try_from(table_size)
            .map_err(|_| Error::InvalidConfig(format!("Table size {table_size} exceeds i32")))?;
        let name_count = i32::try_from(names.len()).map_err(|_| {
            Error::InvalidConfig(format!("Name count {} exceeds i32", names.len()))
        })?;

        let with_names = match layout {
            TableLayout::Versioned => {
                let mut flags = FormatFlags::empty();
                if !fixed_size {
                    flags |= FormatFlags::VARIABLE_SIZE;
                }
                if !names.is_empty() {
                    flags |= FormatFlags::NAME_TABLE;
                }

                buffer.write_bytes(&FORMAT_MAGIC);
                buffer.write_le(FORMAT_VERSION);
                buffer.write_le(flags.bits());
                buffer.write_le(table_size);
                flags.contains(FormatFlags::NAME_TABLE)
            }
            TableLayout::Legacy => {
                buffer.write_le(table_size);
                true
            }
        };

        if with_names {
            buffer.write_le(name_count);
            for name in names {
                buffer.write_prefixed_string_utf8(name)?;
            }
        }

        Ok(())
    }
}

fn read_table_size(parser: &mut Parser<'_>) -> Result<usize> {
    let table_size = parser.read_le::<i32>()?;
    usize::try_from(table_size).map_err(|_| malformed_error!("Negative table size - {}", table_size))
}

fn read_names(parser: &mut Parser<'_>, count: usize) -> Result<Vec<String>> {
    // Every name takes at least its one-byte length prefix
    parser.ensure_remaining(count)?;

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        names.push(parser.read_prefixed_string_utf8()?);
    }
    Ok(names)
}

fn entries_len(table_size: usize, record_size: usize) -> Result<usize> {
    table_size
        .checked_mul(record_size)
        .ok_or_else(|| malformed_error!("Entry array of {} slots overflows", table_size))
}

fn ensure_entries_fit(parser: &Parser<'_>, table_size: usize, record_size: usize) -> Result<()> {
    let needed = entries_len(table_size, record_size)?;
    if parser.remaining() < needed {
        return Err(malformed_error!(
            "Entry array of {} slots needs {} bytes, only {} remain",
            table_size,
            needed,
            parser.remaining()
        ));
    }
    Ok(())
}
