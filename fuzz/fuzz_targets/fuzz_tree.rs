#![no_main]
use libfuzzer_sys::fuzz_target;
use palsave::{PropertyMap, PropertyReader, PropertyWriter, Registries, Registry};

fn encode(tree: &PropertyMap, registry: &Registry) -> Vec<u8> {
    let mut writer = PropertyWriter::new(registry);
    writer.write_properties(tree).unwrap();
    writer.into_inner()
}

fuzz_target!(|data: &[u8]| {
    let registries = Registries::default();

    let standard = PropertyReader::new(data, registries.standard()).read_properties("");
    let lazy = PropertyReader::new(data, registries.lazy()).read_properties("");

    if let (Ok(standard), Ok(mut lazy)) = (standard, lazy) {
        if registries.force_all(&mut lazy, "").is_ok() {
            assert_eq!(
                encode(&lazy, registries.standard()),
                encode(&standard, registries.standard())
            );
        }
    }
});
