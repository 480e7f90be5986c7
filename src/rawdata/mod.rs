//! Typed records for the opaque `RawData` byte arrays of a level save.
//!
//! The game stores several records as a `ByteProperty` array whose bytes were
//! produced by `FArchive` serialization. Which layout the bytes follow is
//! decided by a sibling enum property (`GroupType`, `WorkableType`), never by
//! the bytes themselves. Every record must consume its blob exactly: leftover
//! bytes are reported as [`ErrorKind::TrailingBytes`](crate::ErrorKind).
//!
//! The tree level codecs (`decode_map`, `decode_array`, and their encoders)
//! are what a [`Registry`](crate::Registry) binds to paths. They read the
//! property generically and then swap each blob for an
//! [`ArrayValue::Record`].

pub mod base_camp;
pub mod group;
pub mod work;

pub use self::base_camp::BaseCampWorkerData;
pub use self::group::{
    GroupKind, GroupRecord, GuildInfo, GuildLayout, GuildLegacy, GuildMembers, GuildPlayer,
    IndependentOwner, Organization,
};
pub use self::work::{
    AssignLocation, AssignWork, BoxSphereBounds, FullTransform, StandardWork, TransformOrder,
    WorkAssignment, WorkBase, WorkBody, WorkElement, WorkExtension, WorkProgress,
    WorkTransform, WorkableBounds, WorkableType,
};

use crate::{Archive, ArrayValue, Error, Guid, PropertyMap};

/// Reference to a character: the owning player and the character instance
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndividualId {
    pub player_uid: Guid,
    pub instance_id: Guid,
}

/// A group member's character handle
#[derive(Archive, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterHandle {
    pub guid: Guid,
    pub instance_id: Guid,
}

#[derive(Archive, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerInfo {
    /// Last time the player was online, in game ticks
    pub last_online_real_time: i64,
    pub player_name: String,
}

/// A decoded raw data blob
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawData {
    Group(GroupRecord),
    Work(WorkElement),
    WorkAssignment(WorkAssignment),
    BaseCampWorker(BaseCampWorkerData),
}

impl RawData {
    /// Serializes the record back into the blob it was decoded from
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        match self {
            RawData::Group(x) => x.encode(),
            RawData::Work(x) => x.encode(),
            RawData::WorkAssignment(x) => Ok(x.encode()),
            RawData::BaseCampWorker(x) => Ok(x.encode()),
        }
    }

    /// Name of the record type
    pub fn name(&self) -> &'static str {
        match self {
            RawData::Group(_) => "GroupRecord",
            RawData::Work(_) => "WorkElement",
            RawData::WorkAssignment(_) => "WorkAssignment",
            RawData::BaseCampWorker(_) => "BaseCampWorkerData",
        }
    }

    /// The sibling enum value that selects this record's layout, if the
    /// record has one
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            RawData::Group(x) => Some(x.discriminator()),
            RawData::Work(x) => Some(x.workable_type.as_str()),
            RawData::WorkAssignment(_) | RawData::BaseCampWorker(_) => None,
        }
    }
}

pub(crate) fn expect_type(type_name: &str, expected: &str) -> Result<(), Error> {
    if type_name == expected {
        Ok(())
    } else {
        Err(Error::unexpected(expected, type_name))
    }
}

/// The `RawData` byte array of a struct
pub(crate) fn raw_data_mut<'a>(
    properties: &'a mut PropertyMap,
    path: &str,
) -> Result<&'a mut ArrayValue, Error> {
    properties
        .get_mut("RawData")
        .and_then(|x| x.value.as_array_mut())
        .ok_or_else(|| Error::missing("RawData", path))
}

fn sibling_enum<'a>(properties: &'a PropertyMap, field: &str, path: &str) -> Result<&'a str, Error> {
    properties
        .get(field)
        .and_then(|x| x.value.as_enum())
        .ok_or_else(|| Error::missing(field, path))
}

/// Replaces a struct's `RawData` bytes with the record decoded under the
/// discriminator found in `field`. Already decoded records are left alone.
pub(crate) fn decode_keyed<F>(
    properties: &mut PropertyMap,
    field: &str,
    path: &str,
    decode: F,
) -> Result<(), Error>
where
    F: FnOnce(&[u8], &str) -> Result<RawData, Error>,
{
    let discriminator = String::from(sibling_enum(properties, field, path)?);
    let raw = raw_data_mut(properties, path)?;
    if let ArrayValue::Bytes(data) = raw {
        let record = decode(data, &discriminator)?;
        *raw = ArrayValue::Record(Box::new(record));
    }
    Ok(())
}

/// Ensures that a struct's decoded `RawData` agrees with the discriminator in
/// `field`. Raw bytes pass through unchecked.
pub(crate) fn verify_keyed(properties: &PropertyMap, field: &str, path: &str) -> Result<(), Error> {
    let record = match properties.get("RawData").and_then(|x| x.value.as_array()) {
        Some(ArrayValue::Record(record)) => record,
        _ => return Ok(()),
    };

    let sibling = sibling_enum(properties, field, path)?;
    match record.discriminator() {
        Some(discriminator) if discriminator == sibling => Ok(()),
        Some(discriminator) => Err(Error::unexpected(discriminator, sibling)),
        None => Err(Error::unexpected(sibling, record.name())),
    }
}
