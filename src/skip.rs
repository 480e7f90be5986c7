//! Deferred decoding of large subtrees.
//!
//! The skip codec reads only a property's envelope (the type specific header)
//! and keeps the body as raw bytes in a [`ShadowRecord`]. Writing a shadow
//! copies the envelope and bytes back out unchanged. When the contents are
//! needed, [`force_decode`] reads the bytes a second time with a regular
//! registry, producing exactly what a direct read would have.

use crate::{
    rawdata::expect_type, ArchiveReader, ArchiveWriter, ArrayValue, ElementValue, Error,
    ErrorKind, Guid, Property, PropertyMap, PropertyReader, PropertyValue, PropertyWriter,
    Registry, StructValue,
};
use std::convert::TryFrom;
use tracing::debug;

/// The header of a deferred property
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Envelope {
    Array {
        array_type: String,
    },
    Map {
        key_type: String,
        value_type: String,
    },
    Struct {
        struct_type: String,
        struct_id: Guid,
    },
}

impl Envelope {
    pub fn type_name(&self) -> &'static str {
        match self {
            Envelope::Array { .. } => "ArrayProperty",
            Envelope::Map { .. } => "MapProperty",
            Envelope::Struct { .. } => "StructProperty",
        }
    }

    fn read(
        reader: &mut ArchiveReader<'_>,
        type_name: &str,
    ) -> Result<(Envelope, Option<Guid>), Error> {
        let envelope = match type_name {
            "ArrayProperty" => Envelope::Array {
                array_type: reader.read_fstring()?,
            },
            "MapProperty" => Envelope::Map {
                key_type: reader.read_fstring()?,
                value_type: reader.read_fstring()?,
            },
            "StructProperty" => Envelope::Struct {
                struct_type: reader.read_fstring()?,
                struct_id: reader.read_guid()?,
            },
            _ => {
                return Err(Error::unexpected(
                    "ArrayProperty, MapProperty, or StructProperty",
                    type_name,
                ))
            }
        };

        let id = reader.read_optional_guid()?;
        Ok((envelope, id))
    }

    fn write(&self, writer: &mut ArchiveWriter, id: Option<&Guid>) {
        match self {
            Envelope::Array { array_type } => writer.write_fstring(array_type),
            Envelope::Map {
                key_type,
                value_type,
            } => {
                writer.write_fstring(key_type);
                writer.write_fstring(value_type);
            }
            Envelope::Struct {
                struct_type,
                struct_id,
            } => {
                writer.write_fstring(struct_type);
                writer.write_guid(struct_id);
            }
        }
        writer.write_optional_guid(id);
    }
}

/// A property whose body has not been decoded yet. The record owns the body
/// bytes until it is forced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowRecord {
    pub envelope: Envelope,
    pub raw: Vec<u8>,
}

/// Reads a property's envelope and keeps its body verbatim
pub fn decode(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
) -> Result<Property, Error> {
    let r = reader.archive();
    let (envelope, id) = Envelope::read(r, type_name)?;
    let offset = r.position();
    let len = usize::try_from(size).map_err(|_| {
        Error::new(ErrorKind::InvalidLength {
            offset,
            len: size as i64,
        })
    })?;

    let raw = r.read_bytes(len)?.to_vec();
    debug!(path, type_name, len, "deferring property");
    Ok(Property {
        id,
        value: PropertyValue::Shadow(ShadowRecord { envelope, raw }),
        custom_type: None,
    })
}

/// Writes a shadow back unchanged. A property that has since been forced is
/// handed to the codec the skip binding displaced, if any.
pub fn encode(
    writer: &mut PropertyWriter<'_>,
    type_name: &str,
    property: &Property,
) -> Result<u64, Error> {
    if let PropertyValue::Shadow(shadow) = &property.value {
        expect_type(type_name, shadow.envelope.type_name())?;
        return Ok(write_shadow(writer.archive(), property.id.as_ref(), shadow));
    }

    let registry = writer.registry();
    let displaced = property
        .custom_type
        .as_deref()
        .and_then(|path| registry.displaced(path));

    match displaced {
        Some(entry) => entry.encode(writer, type_name, property),
        None => writer.write_property_generic(property),
    }
}

pub(crate) fn write_shadow(
    writer: &mut ArchiveWriter,
    id: Option<&Guid>,
    shadow: &ShadowRecord,
) -> u64 {
    shadow.envelope.write(writer, id);
    writer.write_bytes(&shadow.raw);
    shadow.raw.len() as u64
}

/// Decodes a shadow property in place as if it had been read directly at
/// `path` with `registry`. Returns false when the property wasn't a shadow.
///
/// Nested paths that `registry` defers stay deferred, so forcing with a lazy
/// registry only peels off one level.
pub fn force_decode(
    property: &mut Property,
    path: &str,
    registry: &Registry,
) -> Result<bool, Error> {
    let shadow = match &property.value {
        PropertyValue::Shadow(x) => x,
        _ => return Ok(false),
    };

    let type_name = shadow.envelope.type_name();
    debug!(path, type_name, len = shadow.raw.len(), "forcing deferred property");
    let forced = match registry.full_codec(path) {
        Some(entry) => {
            // codecs read their own header
            let mut writer = ArchiveWriter::with_capacity(shadow.raw.len() + 64);
            let size = write_shadow(&mut writer, property.id.as_ref(), shadow);
            let data = writer.into_inner();
            let mut reader = PropertyReader::new(&data, registry);
            let mut forced = entry.decode(&mut reader, type_name, size, path)?;
            reader.archive().finish(path)?;
            forced.custom_type = Some(String::from(path));
            forced
        }
        None => {
            let mut reader = PropertyReader::new(&shadow.raw, registry);
            let value = match &shadow.envelope {
                Envelope::Array { array_type } => {
                    let size = (shadow.raw.len() as u64).saturating_sub(4);
                    PropertyValue::Array {
                        array_type: array_type.clone(),
                        value: reader.read_array_body(array_type, size, path)?,
                    }
                }
                Envelope::Struct {
                    struct_type,
                    struct_id,
                } => PropertyValue::Struct {
                    struct_type: struct_type.clone(),
                    struct_id: *struct_id,
                    value: reader.read_struct_value(struct_type, path)?,
                },
                Envelope::Map {
                    key_type,
                    value_type,
                } => PropertyValue::Map(reader.read_map_body(
                    key_type.clone(),
                    value_type.clone(),
                    path,
                )?),
            };

            reader.archive().finish(path)?;
            Property {
                id: property.id,
                value,
                custom_type: None,
            }
        }
    };

    *property = forced;
    Ok(true)
}

/// Forces every shadow in a decoded subtree, including shadows uncovered by
/// forcing. `path` is the path of the struct that owns `properties`. Returns
/// how many properties were forced.
pub fn force_all(
    properties: &mut PropertyMap,
    path: &str,
    registry: &Registry,
) -> Result<usize, Error> {
    let mut forced = 0;
    for (name, property) in properties.iter_mut() {
        let child = format!("{}.{}", path, name);
        forced += force_property(property, &child, registry)?;
    }
    Ok(forced)
}

fn force_property(property: &mut Property, path: &str, registry: &Registry) -> Result<usize, Error> {
    let mut forced = usize::from(force_decode(property, path, registry)?);
    match &mut property.value {
        PropertyValue::Struct { value, .. } => forced += force_struct(value, path, registry)?,
        PropertyValue::Array {
            value: ArrayValue::Structs(array),
            ..
        } => {
            let child = format!("{}.{}", path, array.prop_name);
            for value in array.values.iter_mut() {
                forced += force_struct(value, &child, registry)?;
            }
        }
        PropertyValue::Map(map) => {
            let key_path = format!("{}.Key", path);
            let value_path = format!("{}.Value", path);
            for entry in map.entries.iter_mut() {
                if let ElementValue::Struct(key) = &mut entry.key {
                    forced += force_struct(key, &key_path, registry)?;
                }
                if let ElementValue::Struct(value) = &mut entry.value {
                    forced += force_struct(value, &value_path, registry)?;
                }
            }
        }
        _ => {}
    }
    Ok(forced)
}

fn force_struct(value: &mut StructValue, path: &str, registry: &Registry) -> Result<usize, Error> {
    match value {
        StructValue::Properties(properties) => force_all(properties, path, registry),
        _ => Ok(0),
    }
}
