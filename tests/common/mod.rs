#![allow(dead_code)]

use palsave::rawdata::group::{GUILD, INDEPENDENT_GUILD, ORGANIZATION};
use palsave::rawdata::{
    AssignWork, FullTransform, GuildInfo, GuildLegacy, GuildMembers, GuildPlayer,
    IndependentOwner, Organization, StandardWork, TransformOrder, WorkBase, WorkExtension,
    WorkProgress,
};
use palsave::{
    ArrayValue, CharacterHandle, ElementValue, GroupKind, GroupRecord, Guid, IndividualId,
    MapEntry, MapValue, PlayerInfo, Property, PropertyMap, PropertyValue, PropertyWriter, Quat,
    Registry, StructArray, StructValue, Vector, WorkAssignment, WorkBody, WorkElement,
    WorkTransform, WorkableType,
};

/// Routes library diagnostics to the test output (filter with `RUST_LOG`)
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn guid(n: u8) -> Guid {
    Guid::from_bytes([n; 16])
}

pub fn enum_property(enum_type: &str, value: &str) -> Property {
    Property::new(PropertyValue::Enum {
        enum_type: String::from(enum_type),
        value: String::from(value),
    })
}

pub fn bytes_property(data: Vec<u8>) -> Property {
    Property::new(PropertyValue::Array {
        array_type: String::from("ByteProperty"),
        value: ArrayValue::Bytes(data),
    })
}

pub fn struct_property(struct_type: &str, properties: PropertyMap) -> Property {
    Property::new(PropertyValue::Struct {
        struct_type: String::from(struct_type),
        struct_id: Guid::nil(),
        value: StructValue::Properties(properties),
    })
}

pub fn struct_array(prop_name: &str, type_name: &str, values: Vec<PropertyMap>) -> Property {
    Property::new(PropertyValue::Array {
        array_type: String::from("StructProperty"),
        value: ArrayValue::Structs(StructArray {
            prop_name: String::from(prop_name),
            prop_type: String::from("StructProperty"),
            type_name: String::from(type_name),
            id: Guid::nil(),
            values: values.into_iter().map(StructValue::Properties).collect(),
        }),
    })
}

pub fn struct_map(
    key_type: &str,
    key_struct_type: Option<&str>,
    entries: Vec<(ElementValue, PropertyMap)>,
) -> Property {
    Property::new(PropertyValue::Map(MapValue {
        key_type: String::from(key_type),
        value_type: String::from("StructProperty"),
        key_struct_type: key_struct_type.map(String::from),
        value_struct_type: Some(String::from("StructProperty")),
        entries: entries
            .into_iter()
            .map(|(key, value)| MapEntry {
                key,
                value: ElementValue::Struct(StructValue::Properties(value)),
            })
            .collect(),
    }))
}

pub fn properties(items: Vec<(&str, Property)>) -> PropertyMap {
    items
        .into_iter()
        .map(|(name, property)| (String::from(name), property))
        .collect()
}

pub fn player(n: u8, name: &str) -> GuildPlayer {
    GuildPlayer {
        player_uid: guid(n),
        player_info: PlayerInfo {
            last_online_real_time: 638_400_000_000_000_000 + i64::from(n),
            player_name: String::from(name),
        },
    }
}

pub fn guild_record(players: Vec<GuildPlayer>, legacy: GuildLegacy) -> GroupRecord {
    GroupRecord {
        group_id: guid(0x10),
        group_name: String::from("Night Shift"),
        individual_character_handle_ids: vec![CharacterHandle {
            guid: guid(0x11),
            instance_id: guid(0x12),
        }],
        kind: GroupKind::Guild {
            organization: Organization {
                org_type: 1,
                base_ids: vec![guid(0x13)],
            },
            guild: GuildInfo {
                base_camp_level: 7,
                map_object_instance_ids_base_camp_points: vec![guid(0x14), guid(0x15)],
                guild_name: String::from("Grünwald"),
            },
            members: GuildMembers {
                legacy,
                admin_player_uid: guid(0x16),
                players,
            },
        },
    }
}

pub fn group_records() -> Vec<GroupRecord> {
    let guild = guild_record(
        vec![player(0x20, "Aiko"), player(0x21, "Боря")],
        GuildLegacy::Words { u1: 3, u2: -4 },
    );

    let independent = GroupRecord {
        group_id: guid(0x30),
        group_name: String::from("Loner"),
        individual_character_handle_ids: Vec::new(),
        kind: GroupKind::IndependentGuild {
            organization: Organization::default(),
            guild: GuildInfo {
                base_camp_level: 1,
                map_object_instance_ids_base_camp_points: Vec::new(),
                guild_name: String::from("Solo"),
            },
            owner: IndependentOwner {
                player_uid: guid(0x31),
                guild_name_2: String::from("Solo"),
                player_info: PlayerInfo {
                    last_online_real_time: 42,
                    player_name: String::from("Quinn"),
                },
            },
        },
    };

    let organization = GroupRecord {
        group_id: guid(0x40),
        group_name: String::from("Syndicate"),
        individual_character_handle_ids: vec![CharacterHandle {
            guid: guid(0x41),
            instance_id: guid(0x42),
        }],
        kind: GroupKind::Organization(Organization {
            org_type: 3,
            base_ids: Vec::new(),
        }),
    };

    let neutral = GroupRecord {
        group_id: guid(0x50),
        group_name: String::from("Wildlife"),
        individual_character_handle_ids: Vec::new(),
        kind: GroupKind::Other(String::from("EPalGroupType::Neutral")),
    };

    assert_eq!(guild.discriminator(), GUILD);
    assert_eq!(independent.discriminator(), INDEPENDENT_GUILD);
    assert_eq!(organization.discriminator(), ORGANIZATION);
    vec![guild, independent, organization, neutral]
}

pub fn full_transform() -> WorkTransform {
    WorkTransform::Full(FullTransform {
        rotation: Quat::new(0.0, 0.0, 0.5, 0.75),
        translation: Vector::new(-1200.5, 300.25, 8.0),
        scale3d: Vector::new(1.0, 1.0, 1.0),
        order: TransformOrder::Current,
    })
}

pub fn work_base() -> WorkBase {
    WorkBase {
        id: guid(0x60),
        base_camp_id_belong_to: guid(0x61),
        owner_map_object_model_id: guid(0x62),
        owner_map_object_concrete_model_id: guid(0x63),
        current_state: 1,
        behaviour_type: 2,
        assign_define_data_id: String::from("Default"),
        assignable_otomo: true,
        can_steal_assign: true,
        ..WorkBase::default()
    }
}

pub fn individual(n: u8) -> IndividualId {
    IndividualId {
        player_uid: guid(n),
        instance_id: guid(n.wrapping_add(1)),
    }
}

pub fn standard_work(workable_type: WorkableType, transform: WorkTransform) -> WorkElement {
    let extension = match workable_type {
        WorkableType::Defense => WorkExtension::Defense {
            defense_combat_type: 2,
        },
        WorkableType::Progress => WorkExtension::Progress(WorkProgress {
            required_work_amount: 100.0,
            work_exp: 12,
            current_work_amount: 37.5,
            auto_work_self_amount_by_sec: 0.5,
        }),
        WorkableType::ReviveCharacter => WorkExtension::ReviveCharacter {
            target_individual_id: individual(0x70),
        },
        _ => WorkExtension::None,
    };

    WorkElement {
        workable_type,
        body: WorkBody::Standard(StandardWork {
            base: work_base(),
            extension,
            transform,
        }),
    }
}

pub fn assign_work(workable_type: WorkableType, transform: WorkTransform) -> WorkElement {
    let target_map_object_model_id = match workable_type {
        WorkableType::LevelObject => Some(guid(0x80)),
        _ => None,
    };

    WorkElement {
        workable_type,
        body: WorkBody::Assign(AssignWork {
            handle_id: guid(0x81),
            location_index: 2,
            assign_type: 1,
            assigned_individual_id: individual(0x82),
            state: 1,
            fixed: 0,
            target_map_object_model_id,
            transform,
        }),
    }
}

/// One element of every known workable type
pub fn work_elements() -> Vec<WorkElement> {
    let standard = [
        WorkableType::Progress,
        WorkableType::TransportItemInBaseCamp,
        WorkableType::ReviveCharacter,
        WorkableType::Repair,
        WorkableType::Defense,
        WorkableType::BootUp,
        WorkableType::OnlyJoin,
        WorkableType::OnlyJoinAndWalkAround,
        WorkableType::RemoveMapObjectEffect,
        WorkableType::MonsterFarm,
    ];

    let mut result: Vec<_> = standard
        .iter()
        .cloned()
        .map(|x| standard_work(x, full_transform()))
        .collect();

    result.push(assign_work(
        WorkableType::Assign,
        WorkTransform::MapObject {
            map_object_instance_id: guid(0x90),
        },
    ));
    result.push(assign_work(
        WorkableType::LevelObject,
        WorkTransform::Instance {
            guid: guid(0x91),
            instance_id: guid(0x92),
        },
    ));
    result
}

pub fn work_assignment(n: u8) -> WorkAssignment {
    WorkAssignment {
        id: guid(n),
        location_index: i32::from(n),
        assign_type: 1,
        assigned_individual_id: individual(n.wrapping_add(1)),
        state: 2,
        fixed: n % 2 == 0,
    }
}

fn group_map() -> Property {
    let entries = group_records()
        .into_iter()
        .map(|record| {
            let value = properties(vec![
                ("GroupType", enum_property("EPalGroupType", record.discriminator())),
                ("RawData", bytes_property(record.encode().unwrap())),
            ]);
            (ElementValue::Struct(StructValue::Guid(record.group_id)), value)
        })
        .collect();

    struct_map("StructProperty", Some("Guid"), entries)
}

fn work_array() -> Property {
    let mut elements: Vec<PropertyMap> = work_elements()
        .into_iter()
        .enumerate()
        .map(|(i, element)| {
            let assignments = (0..2u8)
                .map(|j| {
                    let record = work_assignment(i as u8 * 4 + j);
                    let value = properties(vec![("RawData", bytes_property(record.encode()))]);
                    (ElementValue::Int(i32::from(j)), value)
                })
                .collect();

            properties(vec![
                (
                    "WorkableType",
                    enum_property("EPalWorkableType", element.workable_type.as_str()),
                ),
                ("RawData", bytes_property(element.encode().unwrap())),
                ("WorkAssignMap", struct_map("IntProperty", None, assignments)),
            ])
        })
        .collect();

    // a layout this crate doesn't know survives untouched
    elements.push(properties(vec![
        (
            "WorkableType",
            enum_property("EPalWorkableType", "EPalWorkableType::CollectItem"),
        ),
        ("RawData", bytes_property(vec![9, 8, 7, 6, 5])),
        ("WorkAssignMap", struct_map("IntProperty", None, Vec::new())),
    ]));

    struct_array("WorkSaveData", "PalWorkSaveData", elements)
}

pub fn base_camp_worker() -> palsave::BaseCampWorkerData {
    palsave::BaseCampWorkerData {
        id: guid(0xa0),
        name: String::from("Riverside"),
        state: 1,
        transform: palsave::Transform {
            rotation: Quat::identity(),
            translation: Vector::new(10.0, 20.0, 30.0),
            scale3d: Vector::new(1.0, 1.0, 1.0),
        },
        area_range: 3500.0,
        group_id_belong_to: guid(0x10),
        owner_map_object_instance_id: guid(0xa1),
    }
}

fn base_camp_map() -> Property {
    let director = properties(vec![(
        "RawData",
        bytes_property(base_camp_worker().encode()),
    )]);
    let camp = properties(vec![
        (
            "WorkerDirector",
            struct_property("PalBaseCampSaveData_WorkerDirector", director),
        ),
        ("AreaRange", Property::new(PropertyValue::Float(3500.0))),
    ]);

    struct_map(
        "StructProperty",
        Some("Guid"),
        vec![(ElementValue::Struct(StructValue::Guid(guid(0xa0))), camp)],
    )
}

fn map_objects() -> Property {
    let objects = (0..3)
        .map(|i| {
            properties(vec![
                (
                    "MapObjectId",
                    Property::new(PropertyValue::Name(format!("PalBoxV{}", i))),
                ),
                ("Level", Property::new(PropertyValue::Int(i))),
                (
                    "Location",
                    Property::new(PropertyValue::Struct {
                        struct_type: String::from("Vector"),
                        struct_id: Guid::nil(),
                        value: StructValue::Vector(Vector::new(f64::from(i), 0.0, -1.0)),
                    }),
                ),
            ])
        })
        .collect();

    struct_array("MapObjectSaveData", "PalMapObjectSaveData", objects)
}

fn character_containers() -> Property {
    let entries = (0..2u8)
        .map(|i| {
            let key = properties(vec![(
                "ID",
                Property::new(PropertyValue::Struct {
                    struct_type: String::from("Guid"),
                    struct_id: Guid::nil(),
                    value: StructValue::Guid(guid(0xb0 + i)),
                }),
            )]);

            let slots = (0..2)
                .map(|slot| {
                    properties(vec![
                        ("SlotIndex", Property::new(PropertyValue::Int(slot))),
                        ("RawData", bytes_property(vec![i, slot as u8, 0xee])),
                    ])
                })
                .collect();

            let value = properties(vec![
                ("Slots", struct_array("Slots", "CharacterContainerSlotData", slots)),
                ("RawData", bytes_property(vec![0xcc; 5])),
            ]);
            (ElementValue::Struct(StructValue::Properties(key)), value)
        })
        .collect();

    struct_map("StructProperty", Some("StructProperty"), entries)
}

fn randomizer() -> Property {
    struct_property(
        "PalRandomizerSaveData",
        properties(vec![
            ("Seed", Property::new(PropertyValue::Int64(-99))),
            ("Name", Property::new(PropertyValue::Str(String::from("seedless")))),
        ]),
    )
}

/// A small level save covering every registered path
pub fn world() -> PropertyMap {
    let world = properties(vec![
        ("GroupSaveDataMap", group_map()),
        ("WorkSaveData", work_array()),
        ("BaseCampSaveData", base_camp_map()),
        ("MapObjectSaveData", map_objects()),
        ("CharacterContainerSaveData", character_containers()),
        ("RandomizerSaveData", randomizer()),
    ]);

    properties(vec![("worldSaveData", struct_property("PalWorldSaveData", world))])
}

/// Serializes a tree without any codecs
pub fn world_bytes() -> Vec<u8> {
    let registry = Registry::new();
    let mut writer = PropertyWriter::new(&registry);
    writer.write_properties(&world()).unwrap();
    writer.into_inner()
}

pub fn world_save_data(tree: &PropertyMap) -> &PropertyMap {
    tree.get("worldSaveData")
        .and_then(|x| x.value.as_properties())
        .unwrap()
}

pub fn world_save_data_mut(tree: &mut PropertyMap) -> &mut PropertyMap {
    tree.get_mut("worldSaveData")
        .and_then(|x| x.value.as_properties_mut())
        .unwrap()
}
