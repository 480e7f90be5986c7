mod common;

use common::*;
use palsave::rawdata::group::GUILD;
use palsave::rawdata::{FullTransform, GuildLegacy, TransformOrder};
use palsave::{
    Archive, ArchiveReader, ArrayValue, BaseCampWorkerData, ErrorKind, GroupKind, GroupRecord, GuildLayout, Property,
    PropertyMap, PropertyReader, PropertyWriter, Quat, RawData, Registry, StructValue, Vector,
    WorkAssignment, WorkBody, WorkElement, WorkTransform, WorkableType,
    BASE_CAMP_WORKER_DIRECTOR, GROUP_SAVE_DATA_MAP, WORK_SAVE_DATA,
};
use rstest::*;

fn assert_trailing(err: palsave::Error, discriminator: &str) {
    assert_eq!(
        err.kind(),
        &ErrorKind::TrailingBytes {
            discriminator: String::from(discriminator),
            remaining: 1,
        }
    );
}

const NEUTRAL: &str = "EPalGroupType::Neutral";

/// A neutral group blob: id, the given encoded name, no character handles
fn neutral_group(name: &[u8]) -> Vec<u8> {
    let mut data = vec![0x11; 16];
    data.extend_from_slice(name);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data
}

#[test]
fn test_group_round_trip() {
    for record in group_records() {
        let data = record.encode().unwrap();
        let decoded = GroupRecord::decode(&data, record.discriminator(), GuildLayout::Current)
            .unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.encode().unwrap(), data);
    }
}

#[test]
fn test_group_trailing_byte() {
    for record in group_records() {
        let mut data = record.encode().unwrap();
        data.push(0);
        let err = GroupRecord::decode(&data, record.discriminator(), GuildLayout::Current)
            .unwrap_err();
        assert_trailing(err, record.discriminator());
    }
}

#[test]
fn test_group_truncated() {
    for record in group_records() {
        let data = record.encode().unwrap();
        let err = GroupRecord::decode(
            &data[..data.len() - 1],
            record.discriminator(),
            GuildLayout::Current,
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Eof { .. }));
    }
}

#[rstest]
#[case(&[0x05, 0x00, 0x00, 0x00, b'J', b'o', b's', b'e', 0x00], "Jose")]
#[case(
    &[0xfb, 0xff, 0xff, 0xff, 0x4a, 0x00, 0x6f, 0x00, 0x73, 0x00, 0xe9, 0x00, 0x00, 0x00],
    "Jos\u{e9}"
)]
#[case(&[0xfd, 0xff, 0xff, 0xff, 0x42, 0x30, 0x44, 0x30, 0x00, 0x00], "\u{3042}\u{3044}")]
#[case(&[0x00, 0x00, 0x00, 0x00], "")]
fn test_group_name_written_as_stored(#[case] name: &[u8], #[case] expected: &str) {
    let data = neutral_group(name);
    let mut reader = ArchiveReader::new(&data);
    let record = GroupRecord::read_from(&mut reader, NEUTRAL, GuildLayout::Current).unwrap();
    assert!(reader.is_empty());
    assert!(reader.is_canonical());
    assert_eq!(record.group_name, expected);
    assert_eq!(record.encode().unwrap(), data);
}

#[rstest]
// empty string that keeps its terminator
#[case(&[0x01, 0x00, 0x00, 0x00, 0x00], &[0x00, 0x00, 0x00, 0x00])]
// narrow string missing its terminator
#[case(&[0x02, 0x00, 0x00, 0x00, b'h', b'i'], &[0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00])]
// ascii stored wide
#[case(
    &[0xfd, 0xff, 0xff, 0xff, b'h', 0x00, b'i', 0x00, 0x00, 0x00],
    &[0x03, 0x00, 0x00, 0x00, b'h', b'i', 0x00]
)]
// latin-1 stored narrow
#[case(
    &[0x02, 0x00, 0x00, 0x00, 0xe9, 0x00],
    &[0xfe, 0xff, 0xff, 0xff, 0xe9, 0x00, 0x00, 0x00]
)]
fn test_group_name_normalized(#[case] name: &[u8], #[case] normalized: &[u8]) {
    let data = neutral_group(name);
    let mut reader = ArchiveReader::new(&data);
    let record = GroupRecord::read_from(&mut reader, NEUTRAL, GuildLayout::Current).unwrap();
    assert!(reader.is_empty());
    assert!(!reader.is_canonical());

    let out = record.encode().unwrap();
    assert_eq!(out, neutral_group(normalized));
    assert_eq!(GroupRecord::decode(&out, NEUTRAL, GuildLayout::Current).unwrap(), record);
}

#[test]
fn test_guild_without_players() {
    let record = guild_record(Vec::new(), GuildLegacy::Words { u1: 0, u2: 0 });
    let data = record.encode().unwrap();

    // admin guid and then an explicit zero count close the record
    assert_eq!(&data[data.len() - 4..], &[0, 0, 0, 0]);
    let decoded = GroupRecord::decode(&data, GUILD, GuildLayout::Current).unwrap();
    match &decoded.kind {
        GroupKind::Guild { members, .. } => {
            assert!(members.players.is_empty());
            assert_eq!(members.admin_player_uid, guid(0x16));
        }
        x => panic!("expected a guild, got {:?}", x),
    }
    assert_eq!(decoded, record);
}

#[test]
fn test_guild_prefixed_layout() {
    let prefix = [
        0xde, 0xad, 0xbe, 0xef, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    ];
    let record = guild_record(vec![player(0x20, "Aiko")], GuildLegacy::Prefix(prefix));
    assert_eq!(record.guild_layout(), Some(GuildLayout::Prefixed));

    let data = record.encode().unwrap();
    let decoded = GroupRecord::decode(&data, GUILD, GuildLayout::Prefixed).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(decoded.encode().unwrap(), data);

    // the same bytes read in the current layout only differ in interpretation
    let current = GroupRecord::decode(&data, GUILD, GuildLayout::Current).unwrap();
    match &current.kind {
        GroupKind::Guild { members, .. } => assert_eq!(
            members.legacy,
            GuildLegacy::Words {
                u1: i64::from_le_bytes([0xde, 0xad, 0xbe, 0xef, 1, 2, 3, 4]),
                u2: i64::from_le_bytes([5, 6, 7, 8, 9, 10, 11, 12]),
            }
        ),
        x => panic!("expected a guild, got {:?}", x),
    }
    assert_eq!(current.encode().unwrap(), data);
}

#[test]
fn test_group_discriminator_decides_layout() {
    let record = &group_records()[0];
    let data = record.encode().unwrap();

    // an unlisted type only reads the header and so leaves bytes behind
    let err = GroupRecord::decode(&data, "EPalGroupType::Neutral", GuildLayout::Current)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TrailingBytes { .. }));
}

#[test]
fn test_work_round_trip() {
    for element in work_elements() {
        let data = element.encode().unwrap();
        let decoded = WorkElement::decode(&data, element.workable_type.as_str()).unwrap();
        assert_eq!(decoded, element);
        assert_eq!(decoded.encode().unwrap(), data);
    }
}

#[test]
fn test_work_trailing_byte() {
    for element in work_elements() {
        let mut data = element.encode().unwrap();
        data.push(0);
        let discriminator = element.workable_type.as_str();
        let err = WorkElement::decode(&data, discriminator).unwrap_err();
        assert_trailing(err, discriminator);
    }
}

#[rstest]
#[case("EPalWorkableType::CollectItem", vec![])]
#[case("EPalWorkableType::CollectItem", vec![1, 2, 3])]
#[case("Repair", vec![0xff; 40])]
fn test_unknown_workable_type(#[case] discriminator: &str, #[case] data: Vec<u8>) {
    init_logging();
    let element = WorkElement::decode(&data, discriminator).unwrap();
    assert_eq!(
        element.workable_type,
        WorkableType::Other(String::from(discriminator))
    );
    assert_eq!(element.body, WorkBody::Opaque(data.clone()));
    assert_eq!(element.encode().unwrap(), data);
}

#[test]
fn test_opaque_body_cannot_claim_known_type() {
    let element = WorkElement {
        workable_type: WorkableType::Repair,
        body: WorkBody::Opaque(vec![1, 2, 3]),
    };

    let err = element.encode().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnexpectedDiscriminator {
            expected: String::from("EPalWorkableType::Repair"),
            found: String::from("opaque work body"),
        }
    );
}

#[rstest]
#[case(full_transform(), 1 + 32 + 24 + 24)]
#[case(WorkTransform::MapObject { map_object_instance_id: guid(0x33) }, 1 + 16)]
#[case(WorkTransform::Instance { guid: guid(0x34), instance_id: guid(0x35) }, 1 + 32)]
#[case(WorkTransform::Unknown { tag: 99, raw: vec![0xaa, 0xbb, 0xcc] }, 1 + 3)]
#[case(WorkTransform::Unknown { tag: 0, raw: Vec::new() }, 1)]
fn test_transform_tags(#[case] transform: WorkTransform, #[case] len: usize) {
    let standard = standard_work(WorkableType::Repair, transform.clone());
    let assign = assign_work(WorkableType::Assign, transform.clone());
    let bare = WorkTransform::Unknown {
        tag: 0,
        raw: Vec::new(),
    };
    let without_transform = standard_work(WorkableType::Repair, bare).encode().unwrap().len() - 1;

    let data = standard.encode().unwrap();
    assert_eq!(data.len(), without_transform + len);
    let decoded = WorkElement::decode(&data, "EPalWorkableType::Repair").unwrap();
    assert_eq!(decoded, standard);

    let data = assign.encode().unwrap();
    let decoded = WorkElement::decode(&data, "EPalWorkableType::Assign").unwrap();
    assert_eq!(decoded, assign);
}

#[test]
fn test_unknown_transform_tag_keeps_tail() {
    init_logging();
    let element = assign_work(
        WorkableType::Assign,
        WorkTransform::MapObject {
            map_object_instance_id: guid(0x33),
        },
    );
    let mut data = element.encode().unwrap();
    let tag_at = data.len() - 17;
    assert_eq!(data[tag_at], 2);
    data[tag_at] = 99;

    let decoded = WorkElement::decode(&data, "EPalWorkableType::Assign").unwrap();
    match &decoded.body {
        WorkBody::Assign(x) => assert_eq!(
            x.transform,
            WorkTransform::Unknown {
                tag: 99,
                raw: vec![0x33; 16],
            }
        ),
        x => panic!("expected an assign body, got {:?}", x),
    }
    assert_eq!(decoded.encode().unwrap(), data);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn test_unknown_transform_cannot_use_known_tag(#[case] tag: u8) {
    let transform = WorkTransform::Unknown {
        tag,
        raw: Vec::new(),
    };
    let element = standard_work(WorkableType::Repair, transform);
    let err = element.encode().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedDiscriminator { .. }));
}

#[test]
fn test_pre_v2_transform_normalizes() {
    let legacy = standard_work(
        WorkableType::Repair,
        WorkTransform::Full(FullTransform {
            rotation: Quat::new(0.0, 0.0, 0.0, 1.0),
            translation: Vector::new(1.0, 2.0, 3.0),
            scale3d: Vector::new(2.0, 2.0, 2.0),
            order: TransformOrder::PreV2,
        }),
    );

    let data = legacy.encode().unwrap();
    let decoded = WorkElement::decode(&data, "EPalWorkableType::Repair").unwrap();
    assert_ne!(decoded, legacy);

    // decoding reads rotation first, so the historical bytes shift
    let transform = match &decoded.body {
        WorkBody::Standard(x) => x.transform.clone(),
        x => panic!("expected a standard body, got {:?}", x),
    };
    assert_eq!(
        transform,
        WorkTransform::Full(FullTransform {
            rotation: Quat::new(1.0, 2.0, 3.0, 0.0),
            translation: Vector::new(0.0, 0.0, 1.0),
            scale3d: Vector::new(2.0, 2.0, 2.0),
            order: TransformOrder::Current,
        })
    );

    // and the normalized record writes the same bytes back
    assert_eq!(decoded.encode().unwrap(), data);
}

#[test]
fn test_work_assignment_round_trip() {
    for n in [0u8, 1, 200] {
        let assignment = work_assignment(n);
        let data = assignment.encode();
        assert_eq!(data.len(), 58);
        assert_eq!(WorkAssignment::decode(&data).unwrap(), assignment);

        let mut extra = data.clone();
        extra.push(0);
        assert_trailing(WorkAssignment::decode(&extra).unwrap_err(), "WorkAssignment");
    }
}

#[test]
fn test_base_camp_round_trip() {
    let worker = base_camp_worker();
    let data = worker.encode();
    assert_eq!(BaseCampWorkerData::decode(&data).unwrap(), worker);

    let mut extra = data.clone();
    extra.push(0);
    assert_trailing(
        BaseCampWorkerData::decode(&extra).unwrap_err(),
        "BaseCampWorkerData",
    );
}

fn decode_world(registry: &Registry) -> (PropertyMap, Vec<u8>) {
    let data = world_bytes();
    let mut reader = PropertyReader::new(&data, registry);
    let tree = reader.read_properties("").unwrap();
    assert!(reader.is_empty());
    (tree, data)
}

fn encode_tree(tree: &PropertyMap, registry: &Registry) -> Vec<u8> {
    let mut writer = PropertyWriter::new(registry);
    writer.write_properties(tree).unwrap();
    writer.into_inner()
}

fn record_of<'a>(properties: &'a PropertyMap) -> &'a RawData {
    properties
        .get("RawData")
        .and_then(|x| x.value.as_array())
        .and_then(ArrayValue::as_record)
        .unwrap()
}

#[test]
fn test_standard_registry_decodes_records() {
    let registry = Registry::standard();
    let (tree, data) = decode_world(&registry);
    let world = world_save_data(&tree);

    let groups = world.get("GroupSaveDataMap").unwrap();
    assert_eq!(groups.custom_type.as_deref(), Some(GROUP_SAVE_DATA_MAP));
    let decoded: Vec<_> = groups
        .value
        .as_map()
        .unwrap()
        .entries
        .iter()
        .map(|entry| {
            let properties = entry.value.as_struct().and_then(StructValue::as_properties);
            match record_of(properties.unwrap()) {
                RawData::Group(x) => x.clone(),
                x => panic!("expected a group, got {:?}", x),
            }
        })
        .collect();
    assert_eq!(decoded, group_records());

    let work = world.get("WorkSaveData").unwrap();
    assert_eq!(work.custom_type.as_deref(), Some(WORK_SAVE_DATA));
    let elements = work.value.as_array().and_then(ArrayValue::as_structs).unwrap();
    let mut expected = work_elements();
    expected.push(WorkElement {
        workable_type: WorkableType::parse("EPalWorkableType::CollectItem"),
        body: WorkBody::Opaque(vec![9, 8, 7, 6, 5]),
    });

    assert_eq!(elements.values.len(), expected.len());
    for (value, expected) in elements.values.iter().zip(expected) {
        let properties = value.as_properties().unwrap();
        assert_eq!(record_of(properties), &RawData::Work(expected));

        let assignments = properties
            .get("WorkAssignMap")
            .and_then(|x| x.value.as_map())
            .unwrap();
        for entry in &assignments.entries {
            let properties = entry.value.as_struct().and_then(StructValue::as_properties);
            assert!(matches!(
                record_of(properties.unwrap()),
                RawData::WorkAssignment(_)
            ));
        }
    }

    let camps = world.get("BaseCampSaveData").and_then(|x| x.value.as_map()).unwrap();
    let director = camps.entries[0]
        .value
        .as_struct()
        .and_then(StructValue::as_properties)
        .and_then(|x| x.get("WorkerDirector"))
        .and_then(|x| x.value.as_properties())
        .unwrap();
    assert_eq!(
        director.get("RawData").unwrap().custom_type.as_deref(),
        Some(BASE_CAMP_WORKER_DIRECTOR)
    );
    assert_eq!(record_of(director), &RawData::BaseCampWorker(base_camp_worker()));

    assert_eq!(encode_tree(&tree, &registry), data);
}

#[test]
fn test_prefixed_registry_reads_guild_prefix() {
    let registry = palsave::CodecOptions::new()
        .with_guild_layout(GuildLayout::Prefixed)
        .registry();
    let (tree, data) = decode_world(&registry);
    let groups = world_save_data(&tree)
        .get("GroupSaveDataMap")
        .and_then(|x| x.value.as_map())
        .unwrap();

    let properties = groups.entries[0]
        .value
        .as_struct()
        .and_then(StructValue::as_properties)
        .unwrap();
    match record_of(properties) {
        RawData::Group(x) => assert_eq!(x.guild_layout(), Some(GuildLayout::Prefixed)),
        x => panic!("expected a group, got {:?}", x),
    }
    assert_eq!(encode_tree(&tree, &registry), data);
}

#[test]
fn test_encode_rejects_mismatched_sibling() {
    let registry = Registry::standard();
    let (mut tree, _) = decode_world(&registry);
    let groups = world_save_data_mut(&mut tree)
        .get_mut("GroupSaveDataMap")
        .and_then(|x| x.value.as_map_mut())
        .unwrap();

    let properties = groups.entries[0]
        .value
        .as_struct_mut()
        .and_then(StructValue::as_properties_mut)
        .unwrap();
    *properties.get_mut("GroupType").unwrap() =
        enum_property("EPalGroupType", "EPalGroupType::Organization");

    let mut writer = PropertyWriter::new(&registry);
    let err = writer.write_properties(&tree).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnexpectedDiscriminator {
            expected: String::from(GUILD),
            found: String::from("EPalGroupType::Organization"),
        }
    );
}

#[test]
fn test_codec_checks_declared_type() {
    let registry = Registry::standard();
    let mut reader = PropertyReader::new(&[], &registry);
    let err = palsave::rawdata::work::decode_array(&mut reader, "MapProperty", 0, WORK_SAVE_DATA)
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::UnexpectedDiscriminator {
            expected: String::from("ArrayProperty"),
            found: String::from("MapProperty"),
        }
    );

    let property = Property::new(palsave::PropertyValue::Int(1));
    let mut writer = PropertyWriter::new(&registry);
    let err = palsave::rawdata::group::encode_map(&mut writer, "IntProperty", &property)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedDiscriminator { .. }));
}

#[test]
fn test_missing_discriminator() {
    let mut registry = Registry::new();
    registry.register(
        WORK_SAVE_DATA,
        palsave::rawdata::work::decode_array,
        palsave::rawdata::work::encode_array,
    );

    let tree = properties(vec![(
        "worldSaveData",
        struct_property(
            "PalWorldSaveData",
            properties(vec![(
                "WorkSaveData",
                struct_array(
                    "WorkSaveData",
                    "PalWorkSaveData",
                    vec![properties(vec![("RawData", bytes_property(vec![1]))])],
                ),
            )]),
        ),
    )]);

    let data = encode_tree(&tree, &Registry::new());
    let mut reader = PropertyReader::new(&data, &registry);
    let err = reader.read_properties("").unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::MissingProperty {
            name: String::from("WorkableType"),
            path: String::from(".worldSaveData.WorkSaveData.WorkSaveData"),
        }
    );
}

#[rstest]
#[case(2)]
#[case(0xffff_ffff)]
fn test_assignment_flag_normalized(#[case] flag: u32) {
    let mut data = work_assignment(2).encode();
    let at = data.len() - 4;
    data[at..].copy_from_slice(&flag.to_le_bytes());

    let mut reader = ArchiveReader::new(&data);
    let assignment = WorkAssignment::read(&mut reader).unwrap();
    assert!(reader.is_empty());
    assert!(assignment.fixed);
    assert!(!reader.is_canonical());

    let out = assignment.encode();
    assert_eq!(out[..at], data[..at]);
    assert_eq!(out[at..], [1, 0, 0, 0]);
    assert_eq!(WorkAssignment::decode(&data).unwrap(), assignment);
}
