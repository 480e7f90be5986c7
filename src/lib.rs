/*!

Byte-exact codecs for the opaque raw data blobs inside
[Palworld](https://en.wikipedia.org/wiki/Palworld) level saves.

A level save is an Unreal GVAS property tree. Most of it is self describing,
but a few properties hold `RawData` byte arrays whose layout depends on a
sibling enum (`GroupType`, `WorkableType`) and is known only to the game.
This crate decodes those blobs into typed records and writes them back
bit for bit.

## Features

- ✔ Exact: every record consumes its blob completely and canonical input re-encodes to the same bytes
- ✔ Typed: guilds, work elements and base camp workers are plain Rust enums and structs
- ✔ Lazy: large subtrees can be kept as raw bytes and decoded only when asked for
- ✔ Shareable: codec registries are immutable values, no global state
- ✔ Ergonomic: fixed layout records are `#[derive(Archive)]`

## Quick Start

Records with a single layout decode straight from their bytes.

```rust
use palsave::{BaseCampWorkerData, Guid};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let worker = BaseCampWorkerData {
    id: Guid::from_bytes([1; 16]),
    name: String::from("Hillside"),
    area_range: 3500.0,
    ..Default::default()
};

let data = worker.encode();
assert_eq!(BaseCampWorkerData::decode(&data)?, worker);

// Leftover bytes mean the layout was misread
let mut extra = data.clone();
extra.push(0);
assert!(BaseCampWorkerData::decode(&extra).is_err());
# Ok(())
# }
```

Records with several layouts take the discriminator that the surrounding
property tree stored next to them.

```rust
use palsave::rawdata::{AssignWork, WorkTransform};
use palsave::{Guid, IndividualId, WorkBody, WorkElement, WorkableType};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let assign = WorkElement {
    workable_type: WorkableType::Assign,
    body: WorkBody::Assign(AssignWork {
        handle_id: Guid::from_bytes([2; 16]),
        location_index: 0,
        assign_type: 1,
        assigned_individual_id: IndividualId::default(),
        state: 0,
        fixed: 0,
        target_map_object_model_id: None,
        transform: WorkTransform::MapObject {
            map_object_instance_id: Guid::from_bytes([3; 16]),
        },
    }),
};

let data = assign.encode()?;
let work = WorkElement::decode(&data, "EPalWorkableType::Assign")?;
assert_eq!(work, assign);
# Ok(())
# }
```

## Property trees

Inside a save these blobs are reached by walking the property tree. A
[`Registry`] maps property paths to the codecs that understand them and the
[`PropertyReader`] and [`PropertyWriter`] consult it at every path.

```rust
use palsave::{CodecOptions, PropertyReader, PropertyWriter, PropertyMap};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let registries = CodecOptions::new().registries();

let mut writer = PropertyWriter::new(registries.standard());
writer.write_properties(&PropertyMap::new())?;
let data = writer.into_inner();

let mut reader = PropertyReader::new(&data, registries.lazy());
let mut tree = reader.read_properties("")?;
registries.force_all(&mut tree, "")?;
assert!(tree.is_empty());
# Ok(())
# }
```

A lazy registry leaves the largest subtrees as [`ShadowRecord`]s. Forcing a
shadow yields exactly what a standard registry would have decoded, and
writing an unforced shadow reproduces the original bytes.

## Logging

Diagnostics are emitted through [`tracing`](https://docs.rs/tracing). Unknown
work variants and transform tags are not errors: they are preserved as raw
bytes and reported at the `warn` level.

*/

extern crate self as palsave;

mod archive;
mod errors;
mod hints;
mod property;
pub mod rawdata;
mod registry;
pub mod skip;
pub(crate) mod util;

pub use self::archive::{
    Archive, ArchiveReader, ArchiveWriter, Guid, LinearColor, ParseGuidError, Quat, Transform,
    Vector,
};
pub use self::errors::*;
pub use self::hints::{TypeHints, PALWORLD_TYPE_HINTS};
pub use self::property::{
    ArrayValue, ByteValue, ElementValue, MapEntry, MapValue, Property, PropertyMap,
    PropertyReader, PropertyValue, PropertyWriter, StructArray, StructValue,
};
pub use self::rawdata::{
    BaseCampWorkerData, CharacterHandle, GroupKind, GroupRecord, GuildLayout, IndividualId,
    PlayerInfo, RawData, WorkAssignment, WorkBody, WorkElement, WorkTransform, WorkableType,
};
pub use self::registry::{
    CodecOptions, DecodeFn, DispatchEntry, EncodeFn, Registries, Registry,
    BASE_CAMP_WORKER_DIRECTOR, GROUP_SAVE_DATA_MAP, LAZY_PATHS, WORK_SAVE_DATA,
};
pub use self::skip::{Envelope, ShadowRecord};

pub use palsave_derive::Archive;
