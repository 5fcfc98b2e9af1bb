//! Little-endian primitives shared by [`crate::file::parser::Parser`] and
//! [`crate::file::buffer::ByteBuffer`].
//!
//! Catalog images only ever store `u8` tags and flags, `u16` header fields, `u32` hashes
//! and offsets, and `i32` counts. [`CatalogIO`] is implemented for exactly those widths.
//!
//! Both helpers check bounds before touching the buffer and leave the offset unchanged
//! on failure, reporting [`crate::Error::OutOfBounds`].

use crate::Result;

/// A fixed-width integer stored little-endian in a catalog image.
pub trait CatalogIO: Sized + Copy {
    /// Byte array holding the encoded value, e.g. `[u8; 4]` for `u32`.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Decodes the value from its little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Encodes the value as little-endian bytes.
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_catalog_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CatalogIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_catalog_io!(u8, u16, u32, i32);

/// Reads a `T` at `offset` and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: CatalogIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let end = offset
        .checked_add(std::mem::size_of::<T>())
        .filter(|end| *end <= data.len())
        .ok_or(out_of_bounds_error!())?;

    let Ok(bytes) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(bytes))
}

/// Writes `value` at `offset` and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit before the end of `data`.
pub fn write_le_at<T: CatalogIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    let end = offset
        .checked_add(bytes.len())
        .filter(|end| *end <= data.len())
        .ok_or(out_of_bounds_error!())?;

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}
