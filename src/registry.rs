use crate::{
    rawdata::{base_camp, group, work, GuildLayout},
    skip, Error, Property, PropertyMap, PropertyReader, PropertyWriter, TypeHints,
};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// The group save map
pub const GROUP_SAVE_DATA_MAP: &str = ".worldSaveData.GroupSaveDataMap";

/// The raw data of a base camp's worker director
pub const BASE_CAMP_WORKER_DIRECTOR: &str =
    ".worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData";

/// The work element array
pub const WORK_SAVE_DATA: &str = ".worldSaveData.WorkSaveData";

/// Paths that a lazy registry leaves undecoded until forced
pub const LAZY_PATHS: &[&str] = &[
    ".worldSaveData.MapObjectSaveData",
    ".worldSaveData.FoliageGridSaveDataMap",
    ".worldSaveData.MapObjectSpawnerInStageSaveData",
    ".worldSaveData.DynamicItemSaveData",
    ".worldSaveData.CharacterContainerSaveData",
    ".worldSaveData.CharacterContainerSaveData.Value.Slots",
    ".worldSaveData.CharacterContainerSaveData.Value.RawData",
    ".worldSaveData.ItemContainerSaveData",
    ".worldSaveData.ItemContainerSaveData.Value.BelongInfo",
    ".worldSaveData.ItemContainerSaveData.Value.Slots",
    ".worldSaveData.ItemContainerSaveData.Value.RawData",
    ".worldSaveData.RandomizerSaveData",
];

/// Decodes a property whose header (name, type, size) has been consumed.
/// Receives the declared type name, the body size, and the property's path.
pub type DecodeFn =
    fn(&mut PropertyReader<'_, '_>, &str, u64, &str) -> Result<Property, Error>;

/// Encodes a property's header and body, returning the body size
pub type EncodeFn = fn(&mut PropertyWriter<'_>, &str, &Property) -> Result<u64, Error>;

/// A codec pair bound to a path
#[derive(Clone)]
pub struct DispatchEntry {
    path: String,
    decode: DecodeFn,
    encode: EncodeFn,
    deferred: bool,
}

impl DispatchEntry {
    #[inline]
    pub fn decode(
        &self,
        reader: &mut PropertyReader<'_, '_>,
        type_name: &str,
        size: u64,
        path: &str,
    ) -> Result<Property, Error> {
        (self.decode)(reader, type_name, size, path)
    }

    #[inline]
    pub fn encode(
        &self,
        writer: &mut PropertyWriter<'_>,
        type_name: &str,
        property: &Property,
    ) -> Result<u64, Error> {
        (self.encode)(writer, type_name, property)
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True for the skip codec
    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("path", &self.path)
            .field("deferred", &self.deferred)
            .finish()
    }
}

/// Maps property paths to the codecs that read and write them.
///
/// A registry is built up front and only read afterwards, so one instance can
/// be shared by any number of readers and writers.
///
/// ```
/// use palsave::Registry;
///
/// let standard = Registry::standard();
/// let entry = standard.lookup(".worldSaveData.GroupSaveDataMap").unwrap();
/// assert!(!entry.is_deferred());
///
/// let lazy = Registry::lazy();
/// assert!(lazy.is_deferred(".worldSaveData.MapObjectSaveData"));
/// assert!(standard.lookup(".worldSaveData.MapObjectSaveData").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    entries: HashMap<String, DispatchEntry>,
    displaced: HashMap<String, DispatchEntry>,
    hints: TypeHints,
}

impl Registry {
    /// A registry without any codecs. Type hints default to the Palworld
    /// table.
    pub fn new() -> Self {
        Registry {
            entries: HashMap::new(),
            displaced: HashMap::new(),
            hints: TypeHints::default(),
        }
    }

    /// The full detail codecs
    pub fn standard() -> Self {
        CodecOptions::new().registry()
    }

    /// The full detail codecs plus the skip codec at every lazy path
    pub fn lazy() -> Self {
        CodecOptions::new().with_lazy(true).registry()
    }

    fn standard_with(layout: GuildLayout) -> Self {
        let mut result = Registry::new();
        let decode_groups: DecodeFn = match layout {
            GuildLayout::Current => group::decode_map,
            GuildLayout::Prefixed => group::decode_map_prefixed,
        };

        result.register(GROUP_SAVE_DATA_MAP, decode_groups, group::encode_map);
        result.register(
            BASE_CAMP_WORKER_DIRECTOR,
            base_camp::decode_array,
            base_camp::encode_array,
        );
        result.register(WORK_SAVE_DATA, work::decode_array, work::encode_array);
        result
    }

    fn lazy_with(layout: GuildLayout) -> Self {
        let mut result = Registry::standard_with(layout);
        for path in LAZY_PATHS {
            result.register_deferred(*path);
        }
        result
    }

    /// Binds a codec pair to a path, returning the entry it replaced
    pub fn register(
        &mut self,
        path: impl Into<String>,
        decode: DecodeFn,
        encode: EncodeFn,
    ) -> Option<DispatchEntry> {
        let path = path.into();
        let entry = DispatchEntry {
            path: path.clone(),
            decode,
            encode,
            deferred: false,
        };
        self.entries.insert(path, entry)
    }

    /// Binds the skip codec to a path. A full codec already bound there is
    /// kept aside so that forced properties are still written by it.
    pub fn register_deferred(&mut self, path: impl Into<String>) {
        let path = path.into();
        let entry = DispatchEntry {
            path: path.clone(),
            decode: skip::decode,
            encode: skip::encode,
            deferred: true,
        };

        if let Some(previous) = self.entries.insert(path.clone(), entry) {
            if !previous.deferred {
                self.displaced.insert(path, previous);
            }
        }
    }

    #[inline]
    pub fn lookup(&self, path: &str) -> Option<&DispatchEntry> {
        self.entries.get(path)
    }

    /// The full codec that a skip binding displaced
    #[inline]
    pub fn displaced(&self, path: &str) -> Option<&DispatchEntry> {
        self.displaced.get(path)
    }

    pub fn is_deferred(&self, path: &str) -> bool {
        self.lookup(path).map_or(false, |x| x.deferred)
    }

    /// The codec that fully decodes the path, if one is bound there
    pub(crate) fn full_codec(&self, path: &str) -> Option<&DispatchEntry> {
        match self.lookup(path) {
            Some(entry) if !entry.deferred => Some(entry),
            _ => self.displaced(path),
        }
    }

    #[inline]
    pub fn hints(&self) -> &TypeHints {
        &self.hints
    }

    /// Adds or replaces the struct type hint at a map key or value path
    pub fn register_type_hint(&mut self, path: impl Into<String>, struct_type: impl Into<String>) {
        self.hints.insert(path, struct_type);
    }

    /// All bound paths in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// Load time choices that shape a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    lazy: bool,
    guild_layout: GuildLayout,
}

impl CodecOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        CodecOptions::default()
    }

    /// Sets if large subtrees are left undecoded until forced
    pub fn with_lazy(mut self, lazy: bool) -> CodecOptions {
        self.lazy = lazy;
        self
    }

    /// Sets the on-disk layout of guild records
    pub fn with_guild_layout(mut self, guild_layout: GuildLayout) -> CodecOptions {
        self.guild_layout = guild_layout;
        self
    }

    pub fn lazy(&self) -> bool {
        self.lazy
    }

    pub fn guild_layout(&self) -> GuildLayout {
        self.guild_layout
    }

    /// Builds the registry these options select
    pub fn registry(&self) -> Registry {
        let result = if self.lazy {
            Registry::lazy_with(self.guild_layout)
        } else {
            Registry::standard_with(self.guild_layout)
        };

        debug!(
            lazy = self.lazy,
            guild_layout = ?self.guild_layout,
            codecs = result.len(),
            "built registry"
        );
        result
    }

    /// Builds both registries, as needed for forcing
    pub fn registries(&self) -> Registries {
        Registries::new(*self)
    }
}

/// A standard and a lazy registry built from the same options
#[derive(Debug, Clone)]
pub struct Registries {
    standard: Registry,
    lazy: Registry,
}

impl Registries {
    pub fn new(options: CodecOptions) -> Self {
        Registries {
            standard: options.with_lazy(false).registry(),
            lazy: options.with_lazy(true).registry(),
        }
    }

    #[inline]
    pub fn standard(&self) -> &Registry {
        &self.standard
    }

    #[inline]
    pub fn lazy(&self) -> &Registry {
        &self.lazy
    }

    /// Forces a shadow property. A recursive force decodes everything below
    /// it while a shallow one leaves nested lazy paths deferred.
    pub fn force(&self, property: &mut Property, path: &str, recursive: bool) -> Result<bool, Error> {
        let registry = if recursive { &self.standard } else { &self.lazy };
        skip::force_decode(property, path, registry)
    }

    /// Forces every shadow below the struct at `path`
    pub fn force_all(&self, properties: &mut PropertyMap, path: &str) -> Result<usize, Error> {
        skip::force_all(properties, path, &self.standard)
    }
}

impl Default for Registries {
    fn default() -> Self {
        Registries::new(CodecOptions::default())
    }
}
