//! Flattening of the enriched registry into the unified signal model.
//!
//! Every non-branch node becomes one top-level record keyed by its path.
//! Records keep their children (recursively) for consumers that want
//! hierarchy context, but branches never get an entry of their own.

use crate::error::{MapperError, Result};
use crate::model::{AccessMode, Area, ChangeMode, NodeType, PropertyGroup, PropertyId, Registry, SignalNode, TargetType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Serializable view of one node; unset fields are omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub name: String,
    pub path: String,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<AccessMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_mode: Option<ChangeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_id_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_id_value: Option<PropertyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_group: Option<PropertyGroup>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, SignalRecord>,
}

impl SignalRecord {
    /// Record for `node`, with its children resolved through `registry`
    pub fn from_node(node: &SignalNode, registry: &Registry) -> Self {
        let declared = &node.constraints;
        let enriched = &node.enrichment;

        Self {
            name: node.name.clone(),
            path: node.path.clone(),
            node_type: node.node_type,
            datatype: node.datatype.clone(),
            unit: node.unit.clone(),
            description: node.description.clone(),
            min: declared.min.clone(),
            max: declared.max.clone(),
            default: declared.default.clone(),
            allowed: declared.allowed_values.clone(),
            pattern: declared.pattern.clone(),
            deprecation: declared.deprecation_notice.clone(),
            target_type: enriched.target_type,
            access_mode: enriched.access_mode,
            change_mode: enriched.change_mode,
            area: enriched.area,
            unit_multiplier: enriched.unit_multiplier,
            unit_offset: enriched.unit_offset,
            min_value: enriched.min_value,
            max_value: enriched.max_value,
            initial_value: enriched.initial_value.clone(),
            generated_id_name: enriched.generated_id_name.clone(),
            generated_id_value: enriched.generated_id_value,
            property_group: enriched.property_group,
            children: registry
                .children_of(node)
                .map(|(segment, child)| (segment.to_string(), Self::from_node(child, registry)))
                .collect(),
        }
    }
}

/// Path-ordered map of leaf-eligible records handed to code generators
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnifiedModel {
    signals: BTreeMap<String, SignalRecord>,
}

impl UnifiedModel {
    pub fn get(&self, path: &str) -> Option<&SignalRecord> {
        self.signals.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.signals.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalRecord)> {
        self.signals.iter().map(|(p, r)| (p.as_str(), r))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Pretty-printed JSON; identical input always gives identical bytes
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MapperError::serialization(e.to_string()))
    }
}

/// Build the unified model from an enriched registry
pub fn flatten(registry: &Registry) -> UnifiedModel {
    let signals = registry
        .iter()
        .filter(|(_, node)| node.node_type.is_leaf_eligible())
        .map(|(path, node)| (path.to_string(), SignalRecord::from_node(node, registry)))
        .collect();
    UnifiedModel { signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnrichmentConfig;
    use crate::diagnostics::Diagnostics;
    use crate::enricher::PropertyEnricher;

    fn sample_registry() -> Registry {
        let mut diagnostics = Diagnostics::new();
        let mut registry = Registry::new();
        registry.register(SignalNode::new("Door", "Door", NodeType::Branch), &mut diagnostics);
        for name in ["IsOpen", "IsLocked"] {
            let path = format!("Door.{name}");
            let node = SignalNode::new(name, path.as_str(), NodeType::Sensor)
                .with_datatype("boolean")
                .with_description("state");
            registry.register(node, &mut diagnostics);
            registry.link_child("Door", name, &path);
        }
        registry.add_root("Door");
        PropertyEnricher::new(&EnrichmentConfig::default()).enrich(&mut registry, &mut diagnostics);
        registry
    }

    #[test]
    fn test_branch_contributes_no_entry() {
        let model = flatten(&sample_registry());
        assert_eq!(model.len(), 2);
        assert!(!model.contains("Door"));
        assert_eq!(model.paths().collect::<Vec<_>>(), vec!["Door.IsLocked", "Door.IsOpen"]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let registry = sample_registry();
        let first = flatten(&registry).to_json_pretty().unwrap();
        let second = flatten(&registry).to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let mut registry = Registry::new();
        registry.register(
            SignalNode::new("Raw", "Raw", NodeType::Attribute),
            &mut Diagnostics::new(),
        );
        let json = flatten(&registry).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = value["Raw"].as_object().unwrap();
        let mut keys: Vec<_> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["name", "node_type", "path"]);
    }

    #[test]
    fn test_enriched_values_use_platform_names() {
        let model = flatten(&sample_registry());
        let value = serde_json::to_value(&model).unwrap();
        let record = &value["Door.IsOpen"];
        assert_eq!(record["node_type"], "sensor");
        assert_eq!(record["target_type"], "BOOLEAN");
        assert_eq!(record["access_mode"], "READ");
        assert_eq!(record["change_mode"], "ON_CHANGE");
        assert_eq!(record["area"], "GLOBAL");
        assert_eq!(record["initial_value"], false);
        assert!(record["generated_id_value"].as_str().unwrap().starts_with("0x"));
        assert_eq!(record["property_group"], "SYSTEM");
    }

    #[test]
    fn test_children_are_nested_in_leaf_records() {
        let mut diagnostics = Diagnostics::new();
        let mut registry = Registry::new();
        registry.register(
            SignalNode::new("Seat", "Seat", NodeType::Signal).with_datatype("uint8"),
            &mut diagnostics,
        );
        registry.register(
            SignalNode::new("Heating", "Seat.Heating", NodeType::Actuator).with_datatype("uint8"),
            &mut diagnostics,
        );
        registry.link_child("Seat", "Heating", "Seat.Heating");

        let model = flatten(&registry);
        let seat = model.get("Seat").unwrap();
        assert_eq!(seat.children.get("Heating").map(|r| r.path.as_str()), Some("Seat.Heating"));
        assert!(model.contains("Seat.Heating"));
    }
}
