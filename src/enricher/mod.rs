//! Property enrichment.
//!
//! Fills the platform attributes of every leaf-eligible node in place. A
//! node qualifies when it is not a branch, declares a datatype and a
//! description, and has no children. Steps run in a fixed order:
//!
//! 1. target type (builtin table, then type map, else `MIXED`)
//! 2. access mode (sensors are always `READ`)
//! 3. change mode (default `ON_CHANGE`)
//! 4. area, matched against the upper-cased full path (default `GLOBAL`)
//! 5. bounds and initial value
//! 6. unit multiplier/offset for numeric types
//! 7. generated identifier name and value, always in the `SYSTEM` group

pub mod identifiers;

use crate::config::{EnrichmentConfig, TypeMapEntry};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::loader::declaration::yaml_to_json;
use crate::model::{AccessMode, Area, ChangeMode, Enrichment, NodeType, PropertyGroup, Registry, SignalNode, TargetType};
use tracing::{debug, info, info_span};

pub use identifiers::{generated_id_name, generated_id_value};

/// Applies [`EnrichmentConfig`] tables to a registry
pub struct PropertyEnricher<'c> {
    config: &'c EnrichmentConfig,
}

impl<'c> PropertyEnricher<'c> {
    pub fn new(config: &'c EnrichmentConfig) -> Self {
        Self { config }
    }

    /// Enrich every qualifying node. Returns how many nodes were enriched.
    pub fn enrich(&self, registry: &mut Registry, diagnostics: &mut Diagnostics) -> usize {
        let _span = info_span!("enrich").entered();
        let mut enriched = 0;

        for (path, node) in registry.iter_mut() {
            if node.node_type == NodeType::Branch {
                continue;
            }
            if let Some(reason) = skip_reason(node) {
                diagnostics.push(DiagnosticKind::EnrichmentSkipped, path, reason);
                continue;
            }
            self.enrich_node(node, diagnostics);
            enriched += 1;
        }

        info!("Enriched {} of {} node(s)", enriched, registry.len());
        enriched
    }

    /// Run all steps on one node, replacing any earlier enrichment.
    pub fn enrich_node(&self, node: &mut SignalNode, diagnostics: &mut Diagnostics) {
        let datatype = node.declared_datatype().unwrap_or_default().to_string();
        let mut enrichment = Enrichment::default();

        let target_type = self.target_type(node, &datatype, diagnostics);
        enrichment.target_type = Some(target_type);
        enrichment.access_mode = Some(self.access_mode(node));
        enrichment.change_mode = Some(
            self.config
                .heuristics
                .change_mode_rules
                .evaluate(&node.name, ChangeMode::OnChange),
        );
        enrichment.area = Some(
            self.config
                .heuristics
                .area_type_rules
                .evaluate(&node.path.to_uppercase(), Area::Global),
        );

        enrichment.min_value = bound(node, "min", node.constraints.min.as_ref(), diagnostics);
        enrichment.max_value = bound(node, "max", node.constraints.max.as_ref(), diagnostics);
        enrichment.initial_value = self.initial_value(node, &datatype, target_type);

        if target_type.is_numeric() {
            if let Some(unit) = node.declared_unit() {
                let (multiplier, offset) = match self.config.units.get(unit).and_then(|u| u.complete()) {
                    Some(conversion) => conversion,
                    None => {
                        diagnostics.push(
                            DiagnosticKind::UnmappedUnit,
                            node.path.as_str(),
                            format!("unit '{unit}' has no complete conversion; using 1.0/0.0"),
                        );
                        (1.0, 0.0)
                    }
                };
                enrichment.unit_multiplier = Some(multiplier);
                enrichment.unit_offset = Some(offset);
            }
        }

        enrichment.generated_id_name = Some(generated_id_name(&node.path));
        enrichment.generated_id_value = Some(generated_id_value(&node.path));
        enrichment.property_group = Some(PropertyGroup::System);

        debug!(
            "{}: {} {} {} {}",
            node.path,
            target_type,
            enrichment.access_mode.map_or("-", AccessMode::as_str),
            enrichment.change_mode.map_or("-", ChangeMode::as_str),
            enrichment.area.map_or("-", Area::as_str)
        );
        node.enrichment = enrichment;
    }

    fn target_type(&self, node: &SignalNode, datatype: &str, diagnostics: &mut Diagnostics) -> TargetType {
        if let Some(target) = TargetType::from_datatype(datatype) {
            return target;
        }
        if let Some(target) = self.config.type_map.get(datatype).and_then(TypeMapEntry::target_type) {
            return target;
        }
        diagnostics.push(
            DiagnosticKind::UnresolvedDataType,
            node.path.as_str(),
            format!("datatype '{datatype}' is not a builtin type or in the type map; using MIXED"),
        );
        TargetType::Mixed
    }

    fn access_mode(&self, node: &SignalNode) -> AccessMode {
        let rule = self.config.heuristics.access_mode_rules.first_match(&node.name).copied();
        match node.node_type {
            NodeType::Sensor => AccessMode::Read,
            NodeType::Actuator => rule.unwrap_or(AccessMode::ReadWrite),
            _ => rule.unwrap_or(AccessMode::Read),
        }
    }

    /// Declared default, then the type's default, then the type map's default
    fn initial_value(&self, node: &SignalNode, datatype: &str, target_type: TargetType) -> Option<serde_json::Value> {
        node.constraints
            .default
            .clone()
            .or_else(|| target_type.default_value())
            .or_else(|| {
                self.config
                    .type_map
                    .get(datatype)
                    .and_then(|entry| entry.default.as_ref())
                    .map(yaml_to_json)
            })
    }
}

/// Why a non-branch node cannot be enriched, if it cannot
fn skip_reason(node: &SignalNode) -> Option<String> {
    let mut missing = Vec::new();
    if node.declared_datatype().is_none() {
        missing.push("datatype");
    }
    if !node.has_description() {
        missing.push("description");
    }

    if node.has_children() {
        return Some(format!(
            "{} node has {} child node(s); treated as a container",
            node.node_type,
            node.children.len()
        ));
    }
    if !missing.is_empty() {
        return Some(format!("no {} declared", missing.join(" or ")));
    }
    None
}

/// Coerce a declared bound to a float; unusable values are reported and dropped
fn bound(
    node: &SignalNode,
    which: &str,
    declared: Option<&serde_json::Value>,
    diagnostics: &mut Diagnostics,
) -> Option<f64> {
    let value = declared?;
    let coerced = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if coerced.is_none() {
        diagnostics.push(
            DiagnosticKind::InvalidBound,
            node.path.as_str(),
            format!("{which} value {value} is not a number; ignored"),
        );
    }
    coerced
}

#[cfg(test)]
#[path = "enricher_test.rs"]
mod tests;
