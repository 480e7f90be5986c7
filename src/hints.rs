//! Struct type hints for map keys and values.
//!
//! Map properties only declare that their keys or values are a
//! `StructProperty`; the concrete struct type is never written. Readers fall
//! back to a table of known paths and, failing that, a default.

use std::collections::HashMap;

/// Known struct types of map keys and values in a Palworld level save
pub const PALWORLD_TYPE_HINTS: &[(&str, &str)] = &[
    (".worldSaveData.BaseCampSaveData.Key", "Guid"),
    (".worldSaveData.BaseCampSaveData.Value", "StructProperty"),
    (".worldSaveData.BaseCampSaveData.Value.ModuleMap.Value", "StructProperty"),
    (".worldSaveData.CharacterContainerSaveData.Key", "StructProperty"),
    (".worldSaveData.CharacterContainerSaveData.Value", "StructProperty"),
    (".worldSaveData.CharacterSaveParameterMap.Key", "StructProperty"),
    (".worldSaveData.CharacterSaveParameterMap.Value", "StructProperty"),
    (".worldSaveData.FoliageGridSaveDataMap.Key", "StructProperty"),
    (".worldSaveData.FoliageGridSaveDataMap.Value", "StructProperty"),
    (".worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value", "StructProperty"),
    (
        ".worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value.InstanceDataMap.Key",
        "StructProperty",
    ),
    (
        ".worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value.InstanceDataMap.Value",
        "StructProperty",
    ),
    (".worldSaveData.GroupSaveDataMap.Key", "Guid"),
    (".worldSaveData.GroupSaveDataMap.Value", "StructProperty"),
    (".worldSaveData.ItemContainerSaveData.Key", "StructProperty"),
    (".worldSaveData.ItemContainerSaveData.Value", "StructProperty"),
    (
        ".worldSaveData.MapObjectSaveData.MapObjectSaveData.ConcreteModel.ModuleMap.Value",
        "StructProperty",
    ),
    (
        ".worldSaveData.MapObjectSaveData.MapObjectSaveData.Model.EffectMap.Value",
        "StructProperty",
    ),
    (".worldSaveData.MapObjectSpawnerInStageSaveData.Key", "StructProperty"),
    (".worldSaveData.MapObjectSpawnerInStageSaveData.Value", "StructProperty"),
    (
        ".worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Key",
        "Guid",
    ),
    (
        ".worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Value",
        "StructProperty",
    ),
    (
        ".worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Value.ItemMap.Value",
        "StructProperty",
    ),
    (".worldSaveData.WorkSaveData.WorkSaveData.WorkAssignMap.Value", "StructProperty"),
];

/// Path to struct type lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHints {
    hints: HashMap<String, String>,
}

impl TypeHints {
    /// A table without any hints
    pub fn empty() -> Self {
        TypeHints {
            hints: HashMap::new(),
        }
    }

    /// Add or replace the hint for a path
    pub fn insert(&mut self, path: impl Into<String>, struct_type: impl Into<String>) {
        self.hints.insert(path.into(), struct_type.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.hints.get(path).map(|x| x.as_str())
    }

    /// The hinted struct type at the path or the given default
    pub fn get_type_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get(path).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

impl Default for TypeHints {
    fn default() -> Self {
        let mut result = TypeHints::empty();
        for (path, struct_type) in PALWORLD_TYPE_HINTS {
            result.insert(*path, *struct_type);
        }
        result
    }
}
