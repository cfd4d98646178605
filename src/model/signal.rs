//! The specification node record.
//!
//! Declared attributes come straight from the spec; enrichment attributes
//! are filled in later by [`crate::enricher::PropertyEnricher`]. Children
//! are handles (full paths) into the owning [`crate::model::Registry`].

use crate::instances::InstanceEntry;
use crate::model::constants::{AccessMode, Area, ChangeMode, NodeType, PropertyGroup, PropertyId, TargetType};
use std::collections::BTreeMap;

/// Constraint attributes as declared in the spec
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min: Option<serde_json::Value>,
    pub max: Option<serde_json::Value>,
    pub default: Option<serde_json::Value>,
    pub allowed_values: Option<Vec<serde_json::Value>>,
    pub pattern: Option<String>,
    pub deprecation_notice: Option<String>,
    /// Only kept on nodes where expansion did not apply
    pub instances: Option<Vec<InstanceEntry>>,
}

/// Platform attributes derived during enrichment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub target_type: Option<TargetType>,
    pub access_mode: Option<AccessMode>,
    pub change_mode: Option<ChangeMode>,
    pub area: Option<Area>,
    pub unit_multiplier: Option<f64>,
    pub unit_offset: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub initial_value: Option<serde_json::Value>,
    pub generated_id_name: Option<String>,
    pub generated_id_value: Option<PropertyId>,
    pub property_group: Option<PropertyGroup>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalNode {
    /// Local segment name as declared (instances share their key's name)
    pub name: String,
    /// Full dotted path; unique key in the registry
    pub path: String,
    pub node_type: NodeType,
    pub datatype: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub constraints: Constraints,
    pub enrichment: Enrichment,
    /// Path segment relative to this node -> child's full path
    pub children: BTreeMap<String, String>,
}

impl SignalNode {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, path: P, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            node_type,
            datatype: None,
            unit: None,
            description: None,
            constraints: Constraints::default(),
            enrichment: Enrichment::default(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_datatype<S: Into<String>>(mut self, datatype: S) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Non-blank declared datatype
    pub fn declared_datatype(&self) -> Option<&str> {
        non_blank(self.datatype.as_deref())
    }

    /// Non-blank declared unit
    pub fn declared_unit(&self) -> Option<&str> {
        non_blank(self.unit.as_deref())
    }

    pub fn has_description(&self) -> bool {
        non_blank(self.description.as_deref()).is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Join a parent path and a child segment. The root has an empty path.
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "Vehicle"), "Vehicle");
        assert_eq!(join_path("Vehicle", "Speed"), "Vehicle.Speed");
        assert_eq!(join_path("Vehicle.Cabin", "Row1.Left"), "Vehicle.Cabin.Row1.Left");
    }

    #[test]
    fn test_blank_declarations_are_absent() {
        let node = SignalNode::new("Speed", "Vehicle.Speed", NodeType::Sensor)
            .with_datatype("  ")
            .with_description("");
        assert_eq!(node.declared_datatype(), None);
        assert!(!node.has_description());
        assert!(node.enrichment.is_empty());
    }
}
