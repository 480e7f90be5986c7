use crate::{skip::ShadowRecord, Guid, LinearColor, Quat, RawData, Vector};
use std::iter::FromIterator;

/// A node of the GVAS property tree.
///
/// `custom_type` records the registry path whose codec produced the value. It
/// only exists to route the value back to the same codec when writing and is
/// never serialized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub id: Option<Guid>,
    pub value: PropertyValue,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub custom_type: Option<String>,
}

impl Property {
    pub fn new(value: PropertyValue) -> Self {
        Property {
            id: None,
            value,
            custom_type: None,
        }
    }

    /// The property's type tag (eg: `ArrayProperty`)
    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    /// Returns true if the value is still an unparsed shadow record
    pub fn is_shadow(&self) -> bool {
        matches!(self.value, PropertyValue::Shadow(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Int(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Name(String),
    Enum {
        enum_type: String,
        value: String,
    },
    Byte {
        enum_type: String,
        value: ByteValue,
    },
    Struct {
        struct_type: String,
        struct_id: Guid,
        value: StructValue,
    },
    Array {
        array_type: String,
        value: ArrayValue,
    },
    Map(MapValue),

    /// Envelope and raw body of a property whose decoding was deferred
    Shadow(ShadowRecord),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Int(_) => "IntProperty",
            PropertyValue::UInt32(_) => "UInt32Property",
            PropertyValue::Int64(_) => "Int64Property",
            PropertyValue::UInt64(_) => "UInt64Property",
            PropertyValue::Float(_) => "FloatProperty",
            PropertyValue::Double(_) => "DoubleProperty",
            PropertyValue::Bool(_) => "BoolProperty",
            PropertyValue::Str(_) => "StrProperty",
            PropertyValue::Name(_) => "NameProperty",
            PropertyValue::Enum { .. } => "EnumProperty",
            PropertyValue::Byte { .. } => "ByteProperty",
            PropertyValue::Struct { .. } => "StructProperty",
            PropertyValue::Array { .. } => "ArrayProperty",
            PropertyValue::Map(_) => "MapProperty",
            PropertyValue::Shadow(x) => x.envelope.type_name(),
        }
    }

    /// The value of an enum property (eg: `EPalGroupType::Guild`)
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            PropertyValue::Enum { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_properties(&self) -> Option<&PropertyMap> {
        match self {
            PropertyValue::Struct { value, .. } => value.as_properties(),
            _ => None,
        }
    }

    pub fn as_properties_mut(&mut self) -> Option<&mut PropertyMap> {
        match self {
            PropertyValue::Struct { value, .. } => value.as_properties_mut(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            PropertyValue::Array { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayValue> {
        match self {
            PropertyValue::Array { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            PropertyValue::Map(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MapValue> {
        match self {
            PropertyValue::Map(x) => Some(x),
            _ => None,
        }
    }
}

/// A `ByteProperty` is either a raw byte or, when it names an enum type, the
/// enum's value as text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteValue {
    Byte(u8),
    Label(String),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructValue {
    Vector(Vector),
    Quat(Quat),
    Guid(Guid),
    DateTime(u64),
    LinearColor(LinearColor),
    Properties(PropertyMap),
}

impl StructValue {
    pub fn as_properties(&self) -> Option<&PropertyMap> {
        match self {
            StructValue::Properties(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_properties_mut(&mut self) -> Option<&mut PropertyMap> {
        match self {
            StructValue::Properties(x) => Some(x),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrayValue {
    /// `ByteProperty` elements kept as the raw blob
    Bytes(Vec<u8>),

    /// `ByteProperty` elements interpreted by a raw data codec
    Record(Box<RawData>),

    Ints(Vec<i32>),
    UInt32s(Vec<u32>),
    Int64s(Vec<i64>),
    Floats(Vec<f32>),
    Bools(Vec<bool>),

    /// `StrProperty`, `NameProperty`, and `EnumProperty` elements
    Strings(Vec<String>),

    Structs(StructArray),
}

impl ArrayValue {
    pub fn as_record(&self) -> Option<&RawData> {
        match self {
            ArrayValue::Record(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RawData> {
        match self {
            ArrayValue::Record(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_structs(&self) -> Option<&StructArray> {
        match self {
            ArrayValue::Structs(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_structs_mut(&mut self) -> Option<&mut StructArray> {
        match self {
            ArrayValue::Structs(x) => Some(x),
            _ => None,
        }
    }
}

/// An array of structs carries an inner tag describing its elements
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructArray {
    pub prop_name: String,
    pub prop_type: String,
    pub type_name: String,
    pub id: Guid,
    pub values: Vec<StructValue>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapValue {
    pub key_type: String,
    pub value_type: String,

    /// Struct type of the keys, resolved once from the type hints
    pub key_struct_type: Option<String>,

    /// Struct type of the values, resolved once from the type hints
    pub value_struct_type: Option<String>,

    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapEntry {
    pub key: ElementValue,
    pub value: ElementValue,
}

/// An untagged value as it appears inside a map
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementValue {
    Struct(StructValue),
    Int(i32),
    UInt32(u32),
    Int64(i64),
    Float(f32),
    Bool(bool),
    Byte(u8),
    Str(String),
}

impl ElementValue {
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            ElementValue::Struct(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            ElementValue::Struct(x) => Some(x),
            _ => None,
        }
    }
}

/// Properties of a struct in the order they were read
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyMap(Vec<(String, Property)>);

impl PropertyMap {
    pub fn new() -> Self {
        PropertyMap::default()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.0.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Appends a property, keeping insertion order
    pub fn push(&mut self, name: impl Into<String>, property: Property) {
        self.0.push((name.into(), property));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Property)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Property)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, Property)>>(iter: T) -> Self {
        PropertyMap(iter.into_iter().collect())
    }
}
