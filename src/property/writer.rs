use super::{
    ArrayValue, ByteValue, ElementValue, MapValue, Property, PropertyMap, PropertyValue,
    StructValue,
};
use crate::{skip, Archive, ArchiveWriter, Error, Registry};

/// Serializes a property tree, routing properties that were produced by a
/// registered codec back through that codec's encoder.
#[derive(Debug)]
pub struct PropertyWriter<'r> {
    writer: ArchiveWriter,
    registry: &'r Registry,
}

impl<'r> PropertyWriter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        PropertyWriter {
            writer: ArchiveWriter::new(),
            registry,
        }
    }

    /// The underlying primitive writer
    #[inline]
    pub fn archive(&mut self) -> &mut ArchiveWriter {
        &mut self.writer
    }

    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.writer.position()
    }

    /// Consumes the writer, returning the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Writes named properties followed by the `None` terminator
    pub fn write_properties(&mut self, properties: &PropertyMap) -> Result<(), Error> {
        for (name, property) in properties.iter() {
            self.write_named(name, property)?;
        }
        self.writer.write_fstring("None");
        Ok(())
    }

    /// Writes a property's name, type, and size tag followed by its header and
    /// body
    pub fn write_named(&mut self, name: &str, property: &Property) -> Result<(), Error> {
        self.writer.write_fstring(name);
        self.writer.write_fstring(property.type_name());
        let at = self.writer.reserve_u64();
        let size = self.write_property(property)?;
        self.writer.patch_u64(at, size);
        Ok(())
    }

    /// Writes a property's header and body, returning the body size. The
    /// codec registered under the property's `custom_type` is used when
    /// present.
    pub fn write_property(&mut self, property: &Property) -> Result<u64, Error> {
        let registry = self.registry;
        let entry = property
            .custom_type
            .as_deref()
            .and_then(|path| registry.lookup(path));

        match entry {
            Some(entry) => entry.encode(self, property.type_name(), property),
            None => self.write_property_generic(property),
        }
    }

    /// Writes a property's header and body without consulting the registry
    /// for this property
    pub fn write_property_generic(&mut self, property: &Property) -> Result<u64, Error> {
        let id = property.id.as_ref();
        let w = &mut self.writer;
        let start = match &property.value {
            PropertyValue::Bool(x) => {
                w.write_u8(u8::from(*x));
                w.write_optional_guid(id);
                return Ok(0);
            }
            PropertyValue::Enum { enum_type, .. } | PropertyValue::Byte { enum_type, .. } => {
                w.write_fstring(enum_type);
                w.write_optional_guid(id);
                w.position()
            }
            PropertyValue::Struct {
                struct_type,
                struct_id,
                ..
            } => {
                w.write_fstring(struct_type);
                w.write_guid(struct_id);
                w.write_optional_guid(id);
                w.position()
            }
            PropertyValue::Array { array_type, .. } => {
                w.write_fstring(array_type);
                w.write_optional_guid(id);
                w.position()
            }
            PropertyValue::Map(map) => {
                w.write_fstring(&map.key_type);
                w.write_fstring(&map.value_type);
                w.write_optional_guid(id);
                w.position()
            }
            PropertyValue::Shadow(shadow) => return Ok(skip::write_shadow(w, id, shadow)),
            _ => {
                w.write_optional_guid(id);
                w.position()
            }
        };

        match &property.value {
            PropertyValue::Int(x) => w.write_i32(*x),
            PropertyValue::UInt32(x) => w.write_u32(*x),
            PropertyValue::Int64(x) => w.write_i64(*x),
            PropertyValue::UInt64(x) => w.write_u64(*x),
            PropertyValue::Float(x) => w.write_f32(*x),
            PropertyValue::Double(x) => w.write_f64(*x),
            PropertyValue::Str(x) | PropertyValue::Name(x) => w.write_fstring(x),
            PropertyValue::Enum { value, .. } => w.write_fstring(value),
            PropertyValue::Byte { value, .. } => match value {
                ByteValue::Byte(x) => w.write_u8(*x),
                ByteValue::Label(x) => w.write_fstring(x),
            },
            PropertyValue::Struct { value, .. } => self.write_struct_value(value)?,
            PropertyValue::Array { value, .. } => self.write_array_body(value)?,
            PropertyValue::Map(map) => self.write_map_body(map)?,
            PropertyValue::Bool(_) | PropertyValue::Shadow(_) => {}
        }

        Ok((self.writer.position() - start) as u64)
    }

    pub fn write_struct_value(&mut self, value: &StructValue) -> Result<(), Error> {
        match value {
            StructValue::Vector(x) => x.write(&mut self.writer),
            StructValue::Quat(x) => x.write(&mut self.writer),
            StructValue::Guid(x) => self.writer.write_guid(x),
            StructValue::DateTime(x) => self.writer.write_u64(*x),
            StructValue::LinearColor(x) => x.write(&mut self.writer),
            StructValue::Properties(x) => self.write_properties(x)?,
        }
        Ok(())
    }

    /// Writes an array body: the element count followed by the elements
    pub fn write_array_body(&mut self, value: &ArrayValue) -> Result<(), Error> {
        let w = &mut self.writer;
        match value {
            ArrayValue::Bytes(x) => {
                w.write_u32(x.len() as u32);
                w.write_bytes(x);
            }
            ArrayValue::Record(record) => {
                let data = record.encode()?;
                w.write_u32(data.len() as u32);
                w.write_bytes(&data);
            }
            ArrayValue::Ints(x) => w.write_tarray(x, |w, x| w.write_i32(*x)),
            ArrayValue::UInt32s(x) => w.write_tarray(x, |w, x| w.write_u32(*x)),
            ArrayValue::Int64s(x) => w.write_tarray(x, |w, x| w.write_i64(*x)),
            ArrayValue::Floats(x) => w.write_tarray(x, |w, x| w.write_f32(*x)),
            ArrayValue::Bools(x) => w.write_tarray(x, |w, x| w.write_u8(u8::from(*x))),
            ArrayValue::Strings(x) => w.write_tarray(x, |w, x| w.write_fstring(x)),
            ArrayValue::Structs(x) => {
                w.write_u32(x.values.len() as u32);
                w.write_fstring(&x.prop_name);
                w.write_fstring(&x.prop_type);
                let at = w.reserve_u64();
                w.write_fstring(&x.type_name);
                w.write_guid(&x.id);
                w.write_u8(0);
                let start = w.position();
                for value in &x.values {
                    self.write_struct_value(value)?;
                }
                let size = (self.writer.position() - start) as u64;
                self.writer.patch_u64(at, size);
            }
        }
        Ok(())
    }

    /// Writes a map body: the reserved word, the entry count, then the entries
    pub fn write_map_body(&mut self, map: &MapValue) -> Result<(), Error> {
        self.writer.write_u32(0);
        self.writer.write_u32(map.entries.len() as u32);
        for entry in &map.entries {
            self.write_element(&entry.key)?;
            self.write_element(&entry.value)?;
        }
        Ok(())
    }

    pub fn write_element(&mut self, value: &ElementValue) -> Result<(), Error> {
        let w = &mut self.writer;
        match value {
            ElementValue::Struct(x) => self.write_struct_value(x)?,
            ElementValue::Int(x) => w.write_i32(*x),
            ElementValue::UInt32(x) => w.write_u32(*x),
            ElementValue::Int64(x) => w.write_i64(*x),
            ElementValue::Float(x) => w.write_f32(*x),
            ElementValue::Bool(x) => w.write_u8(u8::from(*x)),
            ElementValue::Byte(x) => w.write_u8(*x),
            ElementValue::Str(x) => w.write_fstring(x),
        }
        Ok(())
    }
}
