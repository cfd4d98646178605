//! Enrichment configuration tables.
//!
//! Three YAML files drive enrichment:
//! - `typemap.yml` - datatype name -> target category and default value
//! - `property_heuristics.yml` - rule sets for access mode, change mode, area
//! - `unit_conversion_rules.yml` - unit -> multiplier/offset to base unit
//!
//! All tables may be empty; enrichment then falls back to builtin defaults.

use crate::error::{MapperError, Result};
use crate::model::{AccessMode, Area, ChangeMode, TargetType};
use crate::rules::RuleSet;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const TYPE_MAP_FILE: &str = "typemap.yml";
pub const HEURISTICS_FILE: &str = "property_heuristics.yml";
pub const UNIT_RULES_FILE: &str = "unit_conversion_rules.yml";

/// Type map entry for datatypes outside the builtin table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TypeMapEntry {
    #[serde(default, alias = "vhal", alias = "target_type")]
    pub target: Option<String>,
    #[serde(default, alias = "default_value")]
    pub default: Option<serde_yaml::Value>,
}

impl TypeMapEntry {
    pub fn target_type(&self) -> Option<TargetType> {
        self.target.as_deref().map(TargetType::from_type_map_target)
    }
}

/// Datatype name (case-insensitive) -> entry
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    entries: FxHashMap<String, TypeMapEntry>,
}

impl TypeMap {
    pub fn insert<S: AsRef<str>>(&mut self, datatype: S, entry: TypeMapEntry) {
        self.entries.insert(datatype.as_ref().to_lowercase(), entry);
    }

    pub fn get(&self, datatype: &str) -> Option<&TypeMapEntry> {
        self.entries.get(&datatype.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TypeMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<FxHashMap<String, TypeMapEntry>>::deserialize(deserializer)?.unwrap_or_default();
        let mut map = TypeMap::default();
        for (name, entry) in raw {
            map.insert(name, entry);
        }
        Ok(map)
    }
}

/// Rule sets keyed by concern
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeuristicRules {
    #[serde(default, alias = "access_mode")]
    pub access_mode_rules: RuleSet<AccessMode>,
    #[serde(default, alias = "change_mode")]
    pub change_mode_rules: RuleSet<ChangeMode>,
    #[serde(default, alias = "area", alias = "area_rules")]
    pub area_type_rules: RuleSet<Area>,
}

/// Conversion of one unit to its base unit: `base = value * multiplier + offset`
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct UnitConversion {
    #[serde(default, alias = "multiplier")]
    pub to_base_multiplier: Option<f64>,
    #[serde(default, alias = "offset")]
    pub to_base_offset: Option<f64>,
}

impl UnitConversion {
    pub fn new(multiplier: f64, offset: f64) -> Self {
        Self { to_base_multiplier: Some(multiplier), to_base_offset: Some(offset) }
    }

    /// Multiplier and offset, if both are present
    pub fn complete(&self) -> Option<(f64, f64)> {
        self.to_base_multiplier.zip(self.to_base_offset)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: FxHashMap<String, UnitConversion>,
}

impl UnitTable {
    pub fn insert<S: Into<String>>(&mut self, unit: S, conversion: UnitConversion) {
        self.units.insert(unit.into(), conversion);
    }

    pub fn get(&self, unit: &str) -> Option<&UnitConversion> {
        self.units.get(unit.trim())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUnitTable {
    Nested { units: FxHashMap<String, UnitConversion> },
    Flat(FxHashMap<String, UnitConversion>),
}

impl<'de> Deserialize<'de> for UnitTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let units = match Option::<RawUnitTable>::deserialize(deserializer)? {
            Some(RawUnitTable::Nested { units }) | Some(RawUnitTable::Flat(units)) => units,
            None => FxHashMap::default(),
        };
        Ok(UnitTable { units })
    }
}

/// All tables consumed by [`crate::enricher::PropertyEnricher`]
#[derive(Debug, Clone, Default)]
pub struct EnrichmentConfig {
    pub type_map: TypeMap,
    pub heuristics: HeuristicRules,
    pub units: UnitTable,
}

impl EnrichmentConfig {
    pub fn new(type_map: TypeMap, heuristics: HeuristicRules, units: UnitTable) -> Self {
        Self { type_map, heuristics, units }
    }

    /// Load the three tables from `dir`. Missing files leave that table
    /// empty; unparseable files are configuration errors.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let config = Self {
            type_map: load_table(&dir.join(TYPE_MAP_FILE))?,
            heuristics: load_table(&dir.join(HEURISTICS_FILE))?,
            units: load_table(&dir.join(UNIT_RULES_FILE))?,
        };
        debug!(
            "Loaded configuration from {}: {} type map entries, {}/{}/{} access/change/area rules, {} units",
            dir.display(),
            config.type_map.len(),
            config.heuristics.access_mode_rules.len(),
            config.heuristics.change_mode_rules.len(),
            config.heuristics.area_type_rules.len(),
            config.units.len()
        );
        Ok(config)
    }

    /// Build from in-memory YAML documents (empty strings are empty tables)
    pub fn from_yaml_strs(type_map: &str, heuristics: &str, units: &str) -> Result<Self> {
        Ok(Self {
            type_map: parse_table(type_map, TYPE_MAP_FILE)?,
            heuristics: parse_table(heuristics, HEURISTICS_FILE)?,
            units: parse_table(units, UNIT_RULES_FILE)?,
        })
    }
}

fn load_table<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        warn!("Configuration file {} not found; using an empty table", path.display());
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    parse_table(&content, &path.display().to_string())
}

fn parse_table<T: Default + for<'de> Deserialize<'de>>(content: &str, origin: &str) -> Result<T> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str::<Option<T>>(content)
        .map(Option::unwrap_or_default)
        .map_err(|e| MapperError::configuration(format!("{origin}: {e}")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
