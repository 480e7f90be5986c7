//! The tagged GVAS property tree that raw data blobs are embedded in.
//!
//! Each property is serialized as its name, its type name, a u64 body size,
//! a type specific header (which ends with an optional guid), and the body.
//! The body size never covers the header. [`PropertyReader`] walks this
//! format and asks the [`Registry`](crate::Registry) at every path whether a
//! codec wants to take over. [`PropertyWriter`] mirrors it.

mod reader;
mod value;
mod writer;

pub use self::reader::PropertyReader;
pub use self::value::{
    ArrayValue, ByteValue, ElementValue, MapEntry, MapValue, Property, PropertyMap,
    PropertyValue, StructArray, StructValue,
};
pub use self::writer::PropertyWriter;
