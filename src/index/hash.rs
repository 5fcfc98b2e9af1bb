//! 32-bit FNV-1a name hashing.
//!
//! Every key in a catalog is identified by its FNV-1a hash. The value is part of the
//! on-disk format and must stay byte-for-byte stable: catalogs written by one release
//! are probed with hashes computed by another.
//!
//! `0` is reserved as the empty-slot sentinel of the index engine. A name that hashes
//! to `0` cannot be stored; see [`crate::Error::ReservedHash`].

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Hash value reserved for empty table slots.
pub const EMPTY_HASH: u32 = 0;

/// Computes the 32-bit FNV-1a hash of `bytes`.
///
/// # Examples
///
/// ```rust
/// use pcmeta::index::hash::fnv1a;
///
/// assert_eq!(fnv1a(b""), 0x811C_9DC5);
/// assert_eq!(fnv1a(b"a"), 0xE40C_292C);
/// ```
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Computes the case-insensitive catalog hash of a member or object name.
///
/// The name is lower-cased before hashing, so `ActiveRowCount`, `activerowcount` and
/// `ACTIVEROWCOUNT` all map to the same value. ASCII names are folded byte by byte
/// without allocating; anything else goes through Unicode lower-casing.
///
/// # Examples
///
/// ```rust
/// use pcmeta::name_hash;
///
/// assert_eq!(name_hash("ActiveRowCount"), name_hash("activerowcount"));
/// assert_ne!(name_hash("Rowset"), name_hash("Row"));
/// ```
#[must_use]
pub fn name_hash(name: &str) -> u32 {
    if name.is_ascii() {
        name.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u32::from(byte.to_ascii_lowercase())).wrapping_mul(FNV_PRIME)
        })
    } else {
        fnv1a(name.to_lowercase().as_bytes())
    }
}
