//! Work elements stored under `.worldSaveData.WorkSaveData`.
//!
//! Each element of the work array is a struct with a `WorkableType` enum, a
//! `RawData` blob, and a `WorkAssignMap` whose values carry their own
//! `RawData` blob. The workable type selects one of two disjoint layouts and
//! every known layout ends in a tagged transform.

use super::{decode_keyed, expect_type, raw_data_mut, verify_keyed, IndividualId, RawData};
use crate::{
    util::hex, Archive, ArchiveReader, ArchiveWriter, ArrayValue, Error, Guid, Property,
    PropertyReader, PropertyValue, PropertyWriter, Quat, StructValue, Vector,
};
use tracing::{trace, warn};

macro_rules! workable_types {
    ($($variant:ident),* $(,)?) => {
        /// The `EPalWorkableType` a work element was saved as
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum WorkableType {
            $($variant,)*

            /// A value this crate does not know the layout of
            Other(String),
        }

        impl WorkableType {
            /// Parses the enum value as written in the save
            /// (eg: `EPalWorkableType::Repair`)
            pub fn parse(s: &str) -> WorkableType {
                match s.strip_prefix("EPalWorkableType::") {
                    $(Some(stringify!($variant)) => WorkableType::$variant,)*
                    _ => WorkableType::Other(String::from(s)),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(WorkableType::$variant => concat!("EPalWorkableType::", stringify!($variant)),)*
                    WorkableType::Other(x) => x.as_str(),
                }
            }
        }
    };
}

workable_types!(
    Progress,
    TransportItemInBaseCamp,
    ReviveCharacter,
    Repair,
    Defense,
    BootUp,
    OnlyJoin,
    OnlyJoinAndWalkAround,
    RemoveMapObjectEffect,
    MonsterFarm,
    Assign,
    LevelObject,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Standard,
    Assign,
    Unknown,
}

impl WorkableType {
    fn layout(&self) -> Layout {
        match self {
            WorkableType::Progress
            | WorkableType::TransportItemInBaseCamp
            | WorkableType::ReviveCharacter
            | WorkableType::Repair
            | WorkableType::Defense
            | WorkableType::BootUp
            | WorkableType::OnlyJoin
            | WorkableType::OnlyJoinAndWalkAround
            | WorkableType::RemoveMapObjectEffect
            | WorkableType::MonsterFarm => Layout::Standard,
            WorkableType::Assign | WorkableType::LevelObject => Layout::Assign,
            WorkableType::Other(_) => Layout::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkElement {
    pub workable_type: WorkableType,
    pub body: WorkBody,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkBody {
    Standard(StandardWork),
    Assign(AssignWork),

    /// The blob of a workable type without a known layout, kept verbatim
    Opaque(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardWork {
    pub base: WorkBase,
    pub extension: WorkExtension,
    pub transform: WorkTransform,
}

#[derive(Archive, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkBase {
    pub id: Guid,
    pub workable_bounds: WorkableBounds,
    pub base_camp_id_belong_to: Guid,
    pub owner_map_object_model_id: Guid,
    pub owner_map_object_concrete_model_id: Guid,
    pub current_state: u8,
    pub assign_locations: Vec<AssignLocation>,
    pub behaviour_type: u8,
    pub assign_define_data_id: String,
    pub override_work_type: u8,
    pub assignable_fixed_type: u8,
    pub assignable_otomo: bool,
    pub can_trigger_worker_event: bool,
    pub can_steal_assign: bool,
}

#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkableBounds {
    pub location: Vector,
    pub rotation: Quat,
    pub box_sphere_bounds: BoxSphereBounds,
}

#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxSphereBounds {
    pub origin: Vector,
    pub box_extent: Vector,
    pub sphere_radius: f64,
}

#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignLocation {
    pub location: Vector,
    pub facing_direction: Vector,
}

/// Trailing fields only present for some workable types
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkExtension {
    None,
    Defense { defense_combat_type: u8 },
    Progress(WorkProgress),
    ReviveCharacter { target_individual_id: IndividualId },
}

#[derive(Archive, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkProgress {
    pub required_work_amount: f32,
    pub work_exp: i32,
    pub current_work_amount: f32,
    pub auto_work_self_amount_by_sec: f32,
}

impl WorkExtension {
    fn read(reader: &mut ArchiveReader<'_>, workable_type: &WorkableType) -> Result<Self, Error> {
        let result = match workable_type {
            WorkableType::Defense => WorkExtension::Defense {
                defense_combat_type: reader.read_u8()?,
            },
            WorkableType::Progress => WorkExtension::Progress(WorkProgress::read(reader)?),
            WorkableType::ReviveCharacter => WorkExtension::ReviveCharacter {
                target_individual_id: IndividualId::read(reader)?,
            },
            _ => WorkExtension::None,
        };
        Ok(result)
    }

    fn write(&self, writer: &mut ArchiveWriter) {
        match self {
            WorkExtension::None => {}
            WorkExtension::Defense {
                defense_combat_type,
            } => writer.write_u8(*defense_combat_type),
            WorkExtension::Progress(x) => x.write(writer),
            WorkExtension::ReviveCharacter {
                target_individual_id,
            } => target_individual_id.write(writer),
        }
    }

    fn fits(&self, workable_type: &WorkableType) -> bool {
        matches!(
            (self, workable_type),
            (WorkExtension::Defense { .. }, WorkableType::Defense)
                | (WorkExtension::Progress(_), WorkableType::Progress)
                | (
                    WorkExtension::ReviveCharacter { .. },
                    WorkableType::ReviveCharacter
                )
                | (
                    WorkExtension::None,
                    WorkableType::TransportItemInBaseCamp
                        | WorkableType::Repair
                        | WorkableType::BootUp
                        | WorkableType::OnlyJoin
                        | WorkableType::OnlyJoinAndWalkAround
                        | WorkableType::RemoveMapObjectEffect
                        | WorkableType::MonsterFarm
                )
        )
    }
}

/// The short layout shared by `Assign` and `LevelObject`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignWork {
    pub handle_id: Guid,
    pub location_index: i32,
    pub assign_type: u8,
    pub assigned_individual_id: IndividualId,
    pub state: u8,
    pub fixed: u32,

    /// Only written for `LevelObject`
    pub target_map_object_model_id: Option<Guid>,
    pub transform: WorkTransform,
}

/// Where the work takes place, keyed by a leading tag byte
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkTransform {
    Full(FullTransform),
    MapObject { map_object_instance_id: Guid },
    Instance { guid: Guid, instance_id: Guid },

    /// An unrecognized tag followed by the rest of the blob
    Unknown { tag: u8, raw: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FullTransform {
    pub rotation: Quat,
    pub translation: Vector,
    pub scale3d: Vector,
    pub order: TransformOrder,
}

/// Field order of a full transform on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformOrder {
    /// Rotation, translation, scale
    #[default]
    Current,

    /// Translation, rotation, scale. Only ever written, never decoded.
    PreV2,
}

impl WorkTransform {
    fn read(reader: &mut ArchiveReader<'_>, workable_type: &str) -> Result<Self, Error> {
        let tag = reader.read_u8()?;
        let result = match tag {
            1 => WorkTransform::Full(FullTransform {
                rotation: Quat::read(reader)?,
                translation: Vector::read(reader)?,
                scale3d: Vector::read(reader)?,
                order: TransformOrder::Current,
            }),
            2 => WorkTransform::MapObject {
                map_object_instance_id: reader.read_guid()?,
            },
            3 => WorkTransform::Instance {
                guid: reader.read_guid()?,
                instance_id: reader.read_guid()?,
            },
            _ => {
                let raw = reader.read_to_end().to_vec();
                warn!(
                    tag,
                    workable_type,
                    tail = %hex(&raw),
                    "unknown work transform type, keeping raw bytes"
                );
                WorkTransform::Unknown { tag, raw }
            }
        };
        Ok(result)
    }

    fn write(&self, writer: &mut ArchiveWriter) -> Result<(), Error> {
        match self {
            WorkTransform::Full(x) => {
                writer.write_u8(1);
                match x.order {
                    TransformOrder::Current => {
                        x.rotation.write(writer);
                        x.translation.write(writer);
                    }
                    TransformOrder::PreV2 => {
                        x.translation.write(writer);
                        x.rotation.write(writer);
                    }
                }
                x.scale3d.write(writer);
            }
            WorkTransform::MapObject {
                map_object_instance_id,
            } => {
                writer.write_u8(2);
                writer.write_guid(map_object_instance_id);
            }
            WorkTransform::Instance { guid, instance_id } => {
                writer.write_u8(3);
                writer.write_guid(guid);
                writer.write_guid(instance_id);
            }
            WorkTransform::Unknown { tag, raw } => {
                if matches!(tag, 1..=3) {
                    return Err(Error::unexpected("an unknown transform tag", tag.to_string()));
                }
                writer.write_u8(*tag);
                writer.write_bytes(raw);
            }
        }
        Ok(())
    }
}

impl WorkElement {
    /// Decodes a work blob under the `WorkableType` discriminator. Unknown
    /// workable types decode to [`WorkBody::Opaque`].
    pub fn decode(data: &[u8], discriminator: &str) -> Result<Self, Error> {
        trace!(workable_type = discriminator, len = data.len(), "decoding work element");
        let mut reader = ArchiveReader::new(data);
        let result = WorkElement::read_from(&mut reader, discriminator)?;
        reader.finish(discriminator)?;
        Ok(result)
    }

    /// Reads an element from the cursor. Unknown workable types take
    /// everything that is left.
    pub fn read_from(reader: &mut ArchiveReader<'_>, discriminator: &str) -> Result<Self, Error> {
        let workable_type = WorkableType::parse(discriminator);
        let body = match workable_type.layout() {
            Layout::Standard => {
                let base = WorkBase::read(reader)?;
                let extension = WorkExtension::read(reader, &workable_type)?;
                let transform = WorkTransform::read(reader, discriminator)?;
                WorkBody::Standard(StandardWork {
                    base,
                    extension,
                    transform,
                })
            }
            Layout::Assign => {
                let handle_id = reader.read_guid()?;
                let location_index = reader.read_i32()?;
                let assign_type = reader.read_u8()?;
                let assigned_individual_id = IndividualId::read(reader)?;
                let state = reader.read_u8()?;
                let fixed = reader.read_u32()?;
                let target_map_object_model_id = match workable_type {
                    WorkableType::LevelObject => Some(reader.read_guid()?),
                    _ => None,
                };
                let transform = WorkTransform::read(reader, discriminator)?;
                WorkBody::Assign(AssignWork {
                    handle_id,
                    location_index,
                    assign_type,
                    assigned_individual_id,
                    state,
                    fixed,
                    target_map_object_model_id,
                    transform,
                })
            }
            Layout::Unknown => {
                warn!(
                    workable_type = discriminator,
                    len = reader.remaining(),
                    "unable to parse work element, keeping raw bytes"
                );
                WorkBody::Opaque(reader.read_to_end().to_vec())
            }
        };

        Ok(WorkElement {
            workable_type,
            body,
        })
    }

    /// Serializes the element. Fails when the body doesn't match the layout
    /// of the workable type.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let discriminator = self.workable_type.as_str();
        let layout = self.workable_type.layout();
        let mut writer = ArchiveWriter::new();
        match &self.body {
            WorkBody::Standard(x) => {
                if layout != Layout::Standard || !x.extension.fits(&self.workable_type) {
                    return Err(Error::unexpected(discriminator, "standard work body"));
                }

                x.base.write(&mut writer);
                x.extension.write(&mut writer);
                x.transform.write(&mut writer)?;
            }
            WorkBody::Assign(x) => {
                let level_object = self.workable_type == WorkableType::LevelObject;
                if layout != Layout::Assign
                    || level_object != x.target_map_object_model_id.is_some()
                {
                    return Err(Error::unexpected(discriminator, "assign work body"));
                }

                writer.write_guid(&x.handle_id);
                writer.write_i32(x.location_index);
                writer.write_u8(x.assign_type);
                x.assigned_individual_id.write(&mut writer);
                writer.write_u8(x.state);
                writer.write_u32(x.fixed);
                if let Some(target) = &x.target_map_object_model_id {
                    writer.write_guid(target);
                }
                x.transform.write(&mut writer)?;
            }
            WorkBody::Opaque(data) => {
                if layout != Layout::Unknown {
                    return Err(Error::unexpected(discriminator, "opaque work body"));
                }

                writer.write_bytes(data);
            }
        }

        Ok(writer.into_inner())
    }
}

/// A worker's assignment to a work element
#[derive(Archive, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkAssignment {
    pub id: Guid,
    pub location_index: i32,
    pub assign_type: u8,
    pub assigned_individual_id: IndividualId,
    pub state: u8,
    pub fixed: bool,
}

impl WorkAssignment {
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut reader = ArchiveReader::new(data);
        let result = WorkAssignment::read(&mut reader)?;
        reader.finish("WorkAssignment")?;
        Ok(result)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ArchiveWriter::with_capacity(58);
        self.write(&mut writer);
        writer.into_inner()
    }
}

/// Decodes the work array: every element's blob and every assignment blob
/// in its `WorkAssignMap`
pub fn decode_array(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
) -> Result<Property, Error> {
    expect_type(type_name, "ArrayProperty")?;
    let mut property = reader.read_property_generic(type_name, size, path)?;
    let elements = match &mut property.value {
        PropertyValue::Array {
            value: ArrayValue::Structs(x),
            ..
        } => x,
        PropertyValue::Array { array_type, .. } => {
            return Err(Error::unexpected("StructProperty", array_type.as_str()))
        }
        x => return Err(Error::unexpected("ArrayProperty", x.type_name())),
    };

    let element_path = format!("{}.{}", path, elements.prop_name);
    let assign_path = format!("{}.WorkAssignMap.Value", element_path);
    for element in elements.values.iter_mut() {
        let properties = match element.as_properties_mut() {
            Some(x) => x,
            None => continue,
        };

        decode_keyed(properties, "WorkableType", &element_path, |data, discriminator| {
            WorkElement::decode(data, discriminator).map(RawData::Work)
        })?;

        let assignments = properties
            .get_mut("WorkAssignMap")
            .and_then(|x| x.value.as_map_mut());

        for entry in assignments.into_iter().flat_map(|x| x.entries.iter_mut()) {
            let assignment = match entry.value.as_struct_mut().and_then(StructValue::as_properties_mut)
            {
                Some(x) => x,
                None => continue,
            };

            let raw = raw_data_mut(assignment, &assign_path)?;
            if let ArrayValue::Bytes(data) = raw {
                let record = WorkAssignment::decode(data)?;
                *raw = ArrayValue::Record(Box::new(RawData::WorkAssignment(record)));
            }
        }
    }

    Ok(property)
}

/// Encodes the work array. Elements whose blob was never decoded are written
/// back as is.
pub fn encode_array(
    writer: &mut PropertyWriter<'_>,
    type_name: &str,
    property: &Property,
) -> Result<u64, Error> {
    expect_type(type_name, "ArrayProperty")?;
    if let Some(ArrayValue::Structs(elements)) = property.value.as_array() {
        let path = property.custom_type.as_deref().unwrap_or_default();
        let element_path = format!("{}.{}", path, elements.prop_name);
        for element in &elements.values {
            if let Some(properties) = element.as_properties() {
                verify_keyed(properties, "WorkableType", &element_path)?;
            }
        }
    }

    writer.write_property_generic(property)
}
