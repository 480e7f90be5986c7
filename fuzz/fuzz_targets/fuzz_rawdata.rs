#![no_main]
use libfuzzer_sys::fuzz_target;
use palsave::{
    Archive, ArchiveReader, BaseCampWorkerData, GroupRecord, GuildLayout, WorkAssignment,
    WorkElement,
};

const GROUP_TYPES: &[&str] = &[
    "EPalGroupType::Guild",
    "EPalGroupType::IndependentGuild",
    "EPalGroupType::Organization",
    "EPalGroupType::Neutral",
];

const WORKABLE_TYPES: &[&str] = &[
    "EPalWorkableType::Progress",
    "EPalWorkableType::Defense",
    "EPalWorkableType::ReviveCharacter",
    "EPalWorkableType::Assign",
    "EPalWorkableType::LevelObject",
    "EPalWorkableType::CollectItem",
];

/// Anything that decodes with nothing left over must re-encode to the input,
/// unless the reader saw a value it stores differently
fn check(data: &[u8], reader: &ArchiveReader<'_>, out: Vec<u8>) {
    if !reader.is_empty() {
        return;
    }

    if reader.is_canonical() {
        assert_eq!(out, data);
    } else {
        assert_ne!(out, data);
    }
}

fuzz_target!(|data: &[u8]| {
    let (selector, data) = match data.split_first() {
        Some(x) => x,
        None => return,
    };

    match selector % 4 {
        0 => {
            let discriminator = GROUP_TYPES[usize::from(*selector / 4) % GROUP_TYPES.len()];
            for layout in [GuildLayout::Current, GuildLayout::Prefixed] {
                let mut reader = ArchiveReader::new(data);
                if let Ok(record) = GroupRecord::read_from(&mut reader, discriminator, layout) {
                    check(data, &reader, record.encode().unwrap());
                }
            }
        }
        1 => {
            let discriminator = WORKABLE_TYPES[usize::from(*selector / 4) % WORKABLE_TYPES.len()];
            let mut reader = ArchiveReader::new(data);
            if let Ok(element) = WorkElement::read_from(&mut reader, discriminator) {
                check(data, &reader, element.encode().unwrap());
            }
        }
        2 => {
            let mut reader = ArchiveReader::new(data);
            if let Ok(assignment) = WorkAssignment::read(&mut reader) {
                check(data, &reader, assignment.encode());
            }
        }
        _ => {
            let mut reader = ArchiveReader::new(data);
            if let Ok(worker) = BaseCampWorkerData::read(&mut reader) {
                check(data, &reader, worker.encode());
            }
        }
    }
});
