use super::{
    ArrayValue, ByteValue, ElementValue, MapEntry, MapValue, Property, PropertyMap,
    PropertyValue, StructArray, StructValue,
};
use crate::{Archive, ArchiveReader, Error, LinearColor, Quat, Registry, Vector};

/// Walks tagged GVAS properties, handing off to the registry's codecs at
/// registered paths.
///
/// Paths are the dot joined property names from the root (eg:
/// `.worldSaveData.GroupSaveDataMap`). Elements of a struct array extend the
/// path with the array's inner property name and map entries extend it with
/// `Key` or `Value`.
#[derive(Debug)]
pub struct PropertyReader<'a, 'r> {
    reader: ArchiveReader<'a>,
    registry: &'r Registry,
}

impl<'a, 'r> PropertyReader<'a, 'r> {
    pub fn new(data: &'a [u8], registry: &'r Registry) -> Self {
        PropertyReader {
            reader: ArchiveReader::new(data),
            registry,
        }
    }

    /// The underlying primitive reader
    #[inline]
    pub fn archive(&mut self) -> &mut ArchiveReader<'a> {
        &mut self.reader
    }

    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    /// Reads named properties until the `None` terminator
    pub fn read_properties(&mut self, path: &str) -> Result<PropertyMap, Error> {
        let mut result = PropertyMap::new();
        loop {
            let name = self.reader.read_fstring()?;
            if name == "None" {
                return Ok(result);
            }

            let type_name = self.reader.read_fstring()?;
            let size = self.reader.read_u64()?;
            let child = format!("{}.{}", path, name);
            let property = self.read_property(&type_name, size, &child)?;
            result.push(name, property);
        }
    }

    /// Reads a property's header and body, using the registered codec when
    /// one is bound to the path.
    pub fn read_property(
        &mut self,
        type_name: &str,
        size: u64,
        path: &str,
    ) -> Result<Property, Error> {
        let registry = self.registry;
        match registry.lookup(path) {
            Some(entry) => {
                let mut property = entry.decode(self, type_name, size, path)?;
                property.custom_type = Some(String::from(path));
                Ok(property)
            }
            None => self.read_property_generic(type_name, size, path),
        }
    }

    /// Reads a property without consulting the registry at this path. Nested
    /// paths are still dispatched.
    pub fn read_property_generic(
        &mut self,
        type_name: &str,
        size: u64,
        path: &str,
    ) -> Result<Property, Error> {
        let r = &mut self.reader;
        let (id, value) = match type_name {
            "IntProperty" => (r.read_optional_guid()?, PropertyValue::Int(r.read_i32()?)),
            "UInt32Property" => (r.read_optional_guid()?, PropertyValue::UInt32(r.read_u32()?)),
            "Int64Property" => (r.read_optional_guid()?, PropertyValue::Int64(r.read_i64()?)),
            "UInt64Property" => (r.read_optional_guid()?, PropertyValue::UInt64(r.read_u64()?)),
            "FloatProperty" => (r.read_optional_guid()?, PropertyValue::Float(r.read_f32()?)),
            "DoubleProperty" => (r.read_optional_guid()?, PropertyValue::Double(r.read_f64()?)),
            "StrProperty" => (r.read_optional_guid()?, PropertyValue::Str(r.read_fstring()?)),
            "NameProperty" => (r.read_optional_guid()?, PropertyValue::Name(r.read_fstring()?)),
            "BoolProperty" => {
                let value = r.read_u8()? != 0;
                (r.read_optional_guid()?, PropertyValue::Bool(value))
            }
            "EnumProperty" => {
                let enum_type = r.read_fstring()?;
                let id = r.read_optional_guid()?;
                let value = r.read_fstring()?;
                (id, PropertyValue::Enum { enum_type, value })
            }
            "ByteProperty" => {
                let enum_type = r.read_fstring()?;
                let id = r.read_optional_guid()?;
                let value = if enum_type == "None" {
                    ByteValue::Byte(r.read_u8()?)
                } else {
                    ByteValue::Label(r.read_fstring()?)
                };
                (id, PropertyValue::Byte { enum_type, value })
            }
            "StructProperty" => {
                let struct_type = r.read_fstring()?;
                let struct_id = r.read_guid()?;
                let id = r.read_optional_guid()?;
                let value = self.read_struct_value(&struct_type, path)?;
                let value = PropertyValue::Struct {
                    struct_type,
                    struct_id,
                    value,
                };
                (id, value)
            }
            "ArrayProperty" => {
                let array_type = r.read_fstring()?;
                let id = r.read_optional_guid()?;
                let value = self.read_array_body(&array_type, size.saturating_sub(4), path)?;
                (id, PropertyValue::Array { array_type, value })
            }
            "MapProperty" => {
                let key_type = r.read_fstring()?;
                let value_type = r.read_fstring()?;
                let id = r.read_optional_guid()?;
                let value = self.read_map_body(key_type, value_type, path)?;
                (id, PropertyValue::Map(value))
            }
            _ => return Err(Error::unsupported(type_name, path)),
        };

        Ok(Property {
            id,
            value,
            custom_type: None,
        })
    }

    /// Reads the body of a struct of the given type
    pub fn read_struct_value(
        &mut self,
        struct_type: &str,
        path: &str,
    ) -> Result<StructValue, Error> {
        let r = &mut self.reader;
        match struct_type {
            "Vector" => Vector::read(r).map(StructValue::Vector),
            "Quat" => Quat::read(r).map(StructValue::Quat),
            "Guid" => r.read_guid().map(StructValue::Guid),
            "DateTime" => r.read_u64().map(StructValue::DateTime),
            "LinearColor" => LinearColor::read(r).map(StructValue::LinearColor),
            _ => self.read_properties(path).map(StructValue::Properties),
        }
    }

    /// Reads the body of an array after its header. `size` excludes the
    /// element count.
    pub fn read_array_body(
        &mut self,
        array_type: &str,
        size: u64,
        path: &str,
    ) -> Result<ArrayValue, Error> {
        let r = &mut self.reader;
        let count = r.read_len()?;
        let value = match array_type {
            "ByteProperty" if size == count as u64 => {
                ArrayValue::Bytes(r.read_bytes(count)?.to_vec())
            }
            "StrProperty" | "NameProperty" | "EnumProperty" => {
                ArrayValue::Strings(r.read_elements(count, |r| r.read_fstring())?)
            }
            "IntProperty" => ArrayValue::Ints(r.read_elements(count, |r| r.read_i32())?),
            "UInt32Property" => {
                ArrayValue::UInt32s(r.read_elements(count, |r| r.read_u32())?)
            }
            "Int64Property" => {
                ArrayValue::Int64s(r.read_elements(count, |r| r.read_i64())?)
            }
            "FloatProperty" => {
                ArrayValue::Floats(r.read_elements(count, |r| r.read_f32())?)
            }
            "BoolProperty" => {
                ArrayValue::Bools(r.read_elements(count, |r| r.read_u8().map(|x| x != 0))?)
            }
            "StructProperty" => {
                let prop_name = r.read_fstring()?;
                let prop_type = r.read_fstring()?;
                let _size = r.read_u64()?;
                let type_name = r.read_fstring()?;
                let id = r.read_guid()?;
                let _padding = r.read_u8()?;

                let child = format!("{}.{}", path, prop_name);
                let mut values = Vec::with_capacity(count.min(r.remaining()));
                for _ in 0..count {
                    values.push(self.read_struct_value(&type_name, &child)?);
                }

                ArrayValue::Structs(StructArray {
                    prop_name,
                    prop_type,
                    type_name,
                    id,
                    values,
                })
            }
            _ => return Err(Error::unsupported(format!("{} array", array_type), path)),
        };

        Ok(value)
    }

    /// Reads the body of a map after its header. Struct key and value types
    /// are resolved once for the whole map.
    pub fn read_map_body(
        &mut self,
        key_type: String,
        value_type: String,
        path: &str,
    ) -> Result<MapValue, Error> {
        let hints = self.registry.hints();
        let key_path = format!("{}.Key", path);
        let value_path = format!("{}.Value", path);
        let key_struct_type = (key_type == "StructProperty")
            .then(|| String::from(hints.get_type_or(&key_path, "Guid")));
        let value_struct_type = (value_type == "StructProperty")
            .then(|| String::from(hints.get_type_or(&value_path, "StructProperty")));

        let _reserved = self.reader.read_u32()?;
        let count = self.reader.read_len()?;
        let mut entries = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            let key = self.read_element(&key_type, key_struct_type.as_deref(), &key_path)?;
            let value =
                self.read_element(&value_type, value_struct_type.as_deref(), &value_path)?;
            entries.push(MapEntry { key, value });
        }

        Ok(MapValue {
            key_type,
            value_type,
            key_struct_type,
            value_struct_type,
            entries,
        })
    }

    /// Reads an untagged map key or value
    pub fn read_element(
        &mut self,
        type_name: &str,
        struct_type: Option<&str>,
        path: &str,
    ) -> Result<ElementValue, Error> {
        let r = &mut self.reader;
        match type_name {
            "StructProperty" => {
                let struct_type = struct_type.unwrap_or("StructProperty");
                self.read_struct_value(struct_type, path).map(ElementValue::Struct)
            }
            "StrProperty" | "NameProperty" | "EnumProperty" => {
                r.read_fstring().map(ElementValue::Str)
            }
            "IntProperty" => r.read_i32().map(ElementValue::Int),
            "UInt32Property" => r.read_u32().map(ElementValue::UInt32),
            "Int64Property" => r.read_i64().map(ElementValue::Int64),
            "FloatProperty" => r.read_f32().map(ElementValue::Float),
            "BoolProperty" => r.read_u8().map(|x| ElementValue::Bool(x != 0)),
            "ByteProperty" => r.read_u8().map(ElementValue::Byte),
            _ => Err(Error::unsupported(type_name, path)),
        }
    }
}
