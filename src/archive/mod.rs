//! Primitive reads and writes over Unreal archive bytes.
//!
//! Raw data blobs are written by the game with a sequence of `FArchive <<`
//! operators, so every field is a plain little endian primitive, a length
//! prefixed string, a guid, or a composite of those. [`ArchiveReader`] and
//! [`ArchiveWriter`] expose these primitives and the [`Archive`] trait ties
//! them to Rust types so records can be composed (or derived) field by field.

mod reader;
mod types;
mod writer;

pub use self::reader::ArchiveReader;
pub use self::types::{Guid, LinearColor, ParseGuidError, Quat, Transform, Vector};
pub use self::writer::ArchiveWriter;

use crate::Error;

/// A value with a fixed binary layout inside a raw data blob.
///
/// Implement it by hand for values with variant dependent layouts, otherwise
/// prefer `#[derive(Archive)]` which reads and writes fields in declaration
/// order.
pub trait Archive: Sized {
    /// Decode the value from the reader's current position
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error>;

    /// Append the value's encoding to the writer
    fn write(&self, writer: &mut ArchiveWriter);
}

impl Archive for u8 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_u8()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_u8(*self)
    }
}

impl Archive for i32 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_i32()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_i32(*self)
    }
}

impl Archive for u32 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_u32()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_u32(*self)
    }
}

impl Archive for i64 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_i64()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_i64(*self)
    }
}

impl Archive for u64 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_u64()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_u64(*self)
    }
}

impl Archive for f32 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_f32()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_f32(*self)
    }
}

impl Archive for f64 {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_f64()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_f64(*self)
    }
}

/// `FArchive` serializes `bool` as a 32 bit integer. Any non-zero value
/// decodes as true and true is written back as 1.
impl Archive for bool {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_bool()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_u32(u32::from(*self))
    }
}

impl Archive for String {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_fstring()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_fstring(self)
    }
}

impl Archive for Guid {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_guid()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_guid(self)
    }
}

impl<const N: usize> Archive for [u8; N] {
    #[inline]
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_array::<N>()
    }

    #[inline]
    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_bytes(self)
    }
}

/// `TArray<T>`: a u32 element count followed by the elements
impl<T: Archive> Archive for Vec<T> {
    fn read(reader: &mut ArchiveReader<'_>) -> Result<Self, Error> {
        reader.read_tarray(T::read)
    }

    fn write(&self, writer: &mut ArchiveWriter) {
        writer.write_tarray(self, |w, x| x.write(w))
    }
}
