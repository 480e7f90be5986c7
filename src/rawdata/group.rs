//! Group records stored under `.worldSaveData.GroupSaveDataMap`.
//!
//! Every group starts with the same header. The `GroupType` sibling then
//! layers on more fields: organizations add an org block, guilds add guild
//! info, and independent guilds and guilds each add their own tail.

use super::{decode_keyed, expect_type, verify_keyed, CharacterHandle, PlayerInfo, RawData};
use crate::{
    Archive, ArchiveReader, ArchiveWriter, Error, Guid, Property, PropertyReader, PropertyWriter,
};
use tracing::trace;

pub const GUILD: &str = "EPalGroupType::Guild";
pub const INDEPENDENT_GUILD: &str = "EPalGroupType::IndependentGuild";
pub const ORGANIZATION: &str = "EPalGroupType::Organization";

/// Which on-disk shape a guild's tail takes. Nothing in the bytes tells the
/// two apart, so the caller decides by registering the matching decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuildLayout {
    /// Two legacy i64 words precede the admin
    #[default]
    Current,

    /// An uninterpreted 16 byte prefix precedes the admin
    Prefixed,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupRecord {
    pub group_id: Guid,
    pub group_name: String,
    pub individual_character_handle_ids: Vec<CharacterHandle>,
    pub kind: GroupKind,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupKind {
    Guild {
        organization: Organization,
        guild: GuildInfo,
        members: GuildMembers,
    },
    IndependentGuild {
        organization: Organization,
        guild: GuildInfo,
        owner: IndependentOwner,
    },
    Organization(Organization),

    /// Any other group type carries only the common header. The
    /// discriminator is kept so the record can be written back.
    Other(String),
}

#[derive(Archive, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Organization {
    pub org_type: u8,
    pub base_ids: Vec<Guid>,
}

#[derive(Archive, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuildInfo {
    pub base_camp_level: i32,
    pub map_object_instance_ids_base_camp_points: Vec<Guid>,
    pub guild_name: String,
}

#[derive(Archive, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndependentOwner {
    pub player_uid: Guid,
    pub guild_name_2: String,
    pub player_info: PlayerInfo,
}

#[derive(Archive, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuildPlayer {
    pub player_uid: Guid,
    pub player_info: PlayerInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuildMembers {
    pub legacy: GuildLegacy,
    pub admin_player_uid: Guid,
    pub players: Vec<GuildPlayer>,
}

/// The 16 bytes between the guild info and the admin. Their meaning is
/// unknown and they are only preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuildLegacy {
    Words { u1: i64, u2: i64 },
    Prefix([u8; 16]),
}

impl GuildMembers {
    fn read(reader: &mut ArchiveReader<'_>, layout: GuildLayout) -> Result<Self, Error> {
        let legacy = match layout {
            GuildLayout::Current => GuildLegacy::Words {
                u1: reader.read_i64()?,
                u2: reader.read_i64()?,
            },
            GuildLayout::Prefixed => GuildLegacy::Prefix(reader.read_array::<16>()?),
        };

        let admin_player_uid = reader.read_guid()?;
        let count = reader.read_signed_len()?;
        let players = reader.read_elements(count, GuildPlayer::read)?;
        Ok(GuildMembers {
            legacy,
            admin_player_uid,
            players,
        })
    }

    fn write(&self, writer: &mut ArchiveWriter) {
        match &self.legacy {
            GuildLegacy::Words { u1, u2 } => {
                writer.write_i64(*u1);
                writer.write_i64(*u2);
            }
            GuildLegacy::Prefix(data) => writer.write_bytes(data),
        }

        writer.write_guid(&self.admin_player_uid);
        writer.write_i32(self.players.len() as i32);
        for player in &self.players {
            player.write(writer);
        }
    }
}

impl GroupRecord {
    /// Decodes a group blob under the `GroupType` discriminator
    pub fn decode(data: &[u8], discriminator: &str, layout: GuildLayout) -> Result<Self, Error> {
        trace!(group_type = discriminator, len = data.len(), "decoding group");
        let mut reader = ArchiveReader::new(data);
        let result = GroupRecord::read_from(&mut reader, discriminator, layout)?;
        reader.finish(discriminator)?;
        Ok(result)
    }

    /// Reads a group's fields from the cursor without requiring it to be
    /// exhausted afterwards
    pub fn read_from(
        reader: &mut ArchiveReader<'_>,
        discriminator: &str,
        layout: GuildLayout,
    ) -> Result<Self, Error> {
        let group_id = reader.read_guid()?;
        let group_name = reader.read_fstring()?;
        let individual_character_handle_ids = Vec::<CharacterHandle>::read(reader)?;

        let kind = match discriminator {
            GUILD => GroupKind::Guild {
                organization: Organization::read(reader)?,
                guild: GuildInfo::read(reader)?,
                members: GuildMembers::read(reader, layout)?,
            },
            INDEPENDENT_GUILD => GroupKind::IndependentGuild {
                organization: Organization::read(reader)?,
                guild: GuildInfo::read(reader)?,
                owner: IndependentOwner::read(reader)?,
            },
            ORGANIZATION => GroupKind::Organization(Organization::read(reader)?),
            _ => GroupKind::Other(String::from(discriminator)),
        };

        Ok(GroupRecord {
            group_id,
            group_name,
            individual_character_handle_ids,
            kind,
        })
    }

    /// The `GroupType` value this record is laid out for
    pub fn discriminator(&self) -> &str {
        match &self.kind {
            GroupKind::Guild { .. } => GUILD,
            GroupKind::IndependentGuild { .. } => INDEPENDENT_GUILD,
            GroupKind::Organization(_) => ORGANIZATION,
            GroupKind::Other(x) => x.as_str(),
        }
    }

    /// The on-disk shape of a guild's tail, if the record is a guild
    pub fn guild_layout(&self) -> Option<GuildLayout> {
        match &self.kind {
            GroupKind::Guild { members, .. } => Some(match members.legacy {
                GuildLegacy::Words { .. } => GuildLayout::Current,
                GuildLegacy::Prefix(_) => GuildLayout::Prefixed,
            }),
            _ => None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut writer = ArchiveWriter::new();
        writer.write_guid(&self.group_id);
        writer.write_fstring(&self.group_name);
        self.individual_character_handle_ids.write(&mut writer);

        match &self.kind {
            GroupKind::Guild {
                organization,
                guild,
                members,
            } => {
                organization.write(&mut writer);
                guild.write(&mut writer);
                members.write(&mut writer);
            }
            GroupKind::IndependentGuild {
                organization,
                guild,
                owner,
            } => {
                organization.write(&mut writer);
                guild.write(&mut writer);
                owner.write(&mut writer);
            }
            GroupKind::Organization(organization) => organization.write(&mut writer),
            GroupKind::Other(discriminator) => {
                if matches!(discriminator.as_str(), GUILD | INDEPENDENT_GUILD | ORGANIZATION) {
                    return Err(Error::unexpected("an unlisted group type", discriminator));
                }
            }
        }

        Ok(writer.into_inner())
    }
}

/// Decodes the group map, reading guilds in the current layout
pub fn decode_map(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
) -> Result<Property, Error> {
    decode_map_with(reader, type_name, size, path, GuildLayout::Current)
}

/// Decodes the group map, reading guilds in the historical prefixed layout
pub fn decode_map_prefixed(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
) -> Result<Property, Error> {
    decode_map_with(reader, type_name, size, path, GuildLayout::Prefixed)
}

fn decode_map_with(
    reader: &mut PropertyReader<'_, '_>,
    type_name: &str,
    size: u64,
    path: &str,
    layout: GuildLayout,
) -> Result<Property, Error> {
    expect_type(type_name, "MapProperty")?;
    let mut property = reader.read_property_generic(type_name, size, path)?;
    let value_path = format!("{}.Value", path);
    if let Some(map) = property.value.as_map_mut() {
        for entry in map.entries.iter_mut() {
            let group = entry
                .value
                .as_struct_mut()
                .and_then(|x| x.as_properties_mut())
                .ok_or_else(|| Error::missing("RawData", value_path.as_str()))?;

            decode_keyed(group, "GroupType", &value_path, |data, discriminator| {
                GroupRecord::decode(data, discriminator, layout).map(RawData::Group)
            })?;
        }
    }

    Ok(property)
}

/// Encodes the group map. Every decoded group must still agree with its
/// `GroupType` sibling.
pub fn encode_map(
    writer: &mut PropertyWriter<'_>,
    type_name: &str,
    property: &Property,
) -> Result<u64, Error> {
    expect_type(type_name, "MapProperty")?;
    if let Some(map) = property.value.as_map() {
        let path = property.custom_type.as_deref().unwrap_or_default();
        let value_path = format!("{}.Value", path);
        for entry in &map.entries {
            if let Some(group) = entry.value.as_struct().and_then(|x| x.as_properties()) {
                verify_keyed(group, "GroupType", &value_path)?;
            }
        }
    }

    writer.write_property_generic(property)
}
