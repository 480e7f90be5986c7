//! The worker director blob of a base camp
//! (`.worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData`).

use super::{expect_type, RawData};
use crate::{
    Archive, ArchiveReader, ArchiveWriter, ArrayValue, Error, Guid, Property, PropertyReader,
    PropertyValue, PropertyWriter, Transform,
};

#[derive(Archive, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseCampWorkerData {
    pub id: Guid,
    pub name: String,
    pub state: u8,
    pub transform: Transform,
    pub area_range: f32,
    pub group_id_belong_to: Guid,
    pub owner_map_object_instance_id: Guid,
}

impl BaseCampWorkerData {
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut reader = ArchiveReader::new(data);
        let result = BaseCampWorkerData::read(&mut reader)?;
        reader.finish("BaseCampWorkerData")?;
        Ok(result)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ArchiveWriter::new();
        self.write(&mut writer);
        writer.into_inner()
    }
}

pub fn decode_array(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
) -> Result<Property, Error> {
    expect_type(type_name, "ArrayProperty")?;
    let mut property = reader.read_property_generic(type_name, size, path)?;
    match &mut property.value {
        PropertyValue::Array { array_type, value } => {
            let record = match value {
                ArrayValue::Bytes(data) => BaseCampWorkerData::decode(data)?,
                _ => return Err(Error::unexpected("ByteProperty", array_type.as_str())),
            };
            *value = ArrayValue::Record(Box::new(RawData::BaseCampWorker(record)));
        }
        x => return Err(Error::unexpected("ArrayProperty", x.type_name())),
    }

    Ok(property)
}

pub fn encode_array(
    writer: &mut PropertyWriter<'_>,
    type_name: &str,
    property: &Property,
) -> Result<u64, Error> {
    expect_type(type_name, "ArrayProperty")?;
    if let Some(ArrayValue::Record(record)) = property.value.as_array() {
        if !matches!(**record, RawData::BaseCampWorker(_)) {
            return Err(Error::unexpected("BaseCampWorkerData", record.name()));
        }
    }

    writer.write_property_generic(property)
}
