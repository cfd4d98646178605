//! Raw node declarations.
//!
//! A declaration is the mapping under a node key. The reserved keys `type`,
//! `datatype`, `unit`, `description`, `min`, `max`, `default`, `allowed`,
//! `pattern`, `deprecation` and `instances` are node attributes; every other
//! mapping-valued entry is a child declaration. A repeated attribute keeps
//! its last value; a repeated child key yields one child entry per
//! occurrence.

use crate::instances::InstanceEntry;
use crate::loader::document::{Document, Entries};
use crate::model::Constraints;
use serde_yaml::Value;

/// Attributes and children of one node key, borrowed from the parsed fragment
#[derive(Debug, Clone, Default)]
pub struct Declaration<'a> {
    /// Raw `type` value, if declared
    pub explicit_type: Option<String>,
    pub datatype: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub constraints: Constraints,
    /// Parsed `instances`; `None` when absent or not a usable directive
    pub instances: Option<Vec<InstanceEntry>>,
    /// Mapping-valued, non-reserved entries in declaration order
    pub children: Vec<(String, &'a Entries)>,
}

impl<'a> Declaration<'a> {
    /// Read a declaration. A null value is an empty declaration; any other
    /// non-mapping value is rejected with a description of what was found.
    pub fn parse(document: &'a Document) -> Result<Self, String> {
        match document {
            Document::Mapping(entries) => Ok(Self::from_entries(entries)),
            Document::Value(Value::Null) => Ok(Self::default()),
            Document::Value(other) => Err(format!("expected a mapping, found {}", kind_name(other))),
        }
    }

    pub fn from_entries(entries: &'a Entries) -> Self {
        let mut decl = Self::default();

        for (key, document) in entries {
            let Some(key) = scalar_text(key) else {
                continue;
            };
            if let Some(child) = document.as_entries() {
                if !is_reserved(&key) {
                    decl.children.push((key, child));
                    continue;
                }
            }

            let value = document.to_value();
            let value = &value;
            match key.as_str() {
                "type" => decl.explicit_type = scalar_text(value),
                "datatype" => decl.datatype = scalar_text(value),
                "unit" => decl.unit = scalar_text(value),
                "description" => decl.description = scalar_text(value),
                "min" => decl.constraints.min = present(value).map(yaml_to_json),
                "max" => decl.constraints.max = present(value).map(yaml_to_json),
                "default" => decl.constraints.default = present(value).map(yaml_to_json),
                "allowed" => {
                    decl.constraints.allowed_values = present(value).map(|v| match v {
                        Value::Sequence(items) => items.iter().map(yaml_to_json).collect(),
                        single => vec![yaml_to_json(single)],
                    })
                }
                "pattern" => decl.constraints.pattern = scalar_text(value),
                "deprecation" => decl.constraints.deprecation_notice = scalar_text(value),
                "instances" => {
                    decl.instances = InstanceEntry::parse_directive(value).filter(|entries| !entries.is_empty())
                }
                _ => {}
            }
        }

        decl
    }

    pub fn has_datatype(&self) -> bool {
        self.datatype.as_deref().is_some_and(|d| !d.trim().is_empty())
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(
        key,
        "type"
            | "datatype"
            | "unit"
            | "description"
            | "min"
            | "max"
            | "default"
            | "allowed"
            | "pattern"
            | "deprecation"
            | "instances"
    )
}

fn present(value: &Value) -> Option<&Value> {
    (!value.is_null()).then_some(value)
}

/// Text of a scalar key or value
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Convert a parsed YAML value into its JSON equivalent
pub(crate) fn yaml_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(yaml_to_json).collect()),
        Value::Mapping(mapping) => serde_json::Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| scalar_text(k).map(|k| (k, yaml_to_json(v))))
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn document(text: &str) -> Document {
        Document::from_yaml(text).unwrap()
    }

    #[test]
    fn test_reserved_keys_become_attributes() {
        let value = document(
            r#"
type: sensor
datatype: uint8
unit: percent
description: Fill level
min: 0
max: 100
default: 50
allowed: [LOW, HIGH]
pattern: "^[A-Z]+$"
deprecation: "v4.0 moved to Fuel"
"#,
        );
        let decl = Declaration::parse(&value).unwrap();
        assert_eq!(decl.explicit_type.as_deref(), Some("sensor"));
        assert_eq!(decl.datatype.as_deref(), Some("uint8"));
        assert_eq!(decl.unit.as_deref(), Some("percent"));
        assert_eq!(decl.constraints.min, Some(json!(0)));
        assert_eq!(decl.constraints.max, Some(json!(100)));
        assert_eq!(decl.constraints.default, Some(json!(50)));
        assert_eq!(decl.constraints.allowed_values, Some(vec![json!("LOW"), json!("HIGH")]));
        assert_eq!(decl.constraints.pattern.as_deref(), Some("^[A-Z]+$"));
        assert_eq!(decl.constraints.deprecation_notice.as_deref(), Some("v4.0 moved to Fuel"));
        assert!(decl.children.is_empty());
    }

    #[test]
    fn test_only_mapping_entries_are_children() {
        let value = document("type: branch\nSpeed:\n  datatype: float\nNote: just text\nEmpty: ~\nRow: {}\n");
        let decl = Declaration::parse(&value).unwrap();
        let names: Vec<_> = decl.children.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Speed", "Row"]);
    }

    #[test]
    fn test_null_is_empty_declaration() {
        let null = document("~");
        let decl = Declaration::parse(&null).unwrap();
        assert!(decl.explicit_type.is_none());
        assert!(!decl.has_datatype());
    }

    #[test]
    fn test_scalar_declaration_is_rejected() {
        let number = document("42");
        let err = Declaration::parse(&number).unwrap_err();
        assert!(err.contains("a number"));
        let list = document("[a, b]");
        assert!(Declaration::parse(&list).is_err());
    }

    #[test]
    fn test_blank_datatype_does_not_count() {
        let value = document("datatype: '  '");
        let decl = Declaration::parse(&value).unwrap();
        assert!(!decl.has_datatype());
    }

    #[test]
    fn test_empty_instances_are_ignored() {
        let empty = document("instances: []");
        assert!(Declaration::parse(&empty).unwrap().instances.is_none());
        let value = document("instances: [Left, Right]");
        let decl = Declaration::parse(&value).unwrap();
        assert_eq!(decl.instances.map(|i| i.len()), Some(2));
    }

    #[test]
    fn test_repeated_keys() {
        let value = document("datatype: float\nX: {unit: km}\ndatatype: uint8\nX: {unit: m}\n");
        let decl = Declaration::parse(&value).unwrap();
        assert_eq!(decl.datatype.as_deref(), Some("uint8"));
        let names: Vec<_> = decl.children.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["X", "X"]);
    }

    #[test]
    fn test_mapping_valued_attribute_is_not_a_child() {
        let value = document("default: {a: 1}\nChild: {}\n");
        let decl = Declaration::parse(&value).unwrap();
        assert_eq!(decl.constraints.default, Some(json!({"a": 1})));
        assert_eq!(decl.children.len(), 1);
    }

    #[test]
    fn test_yaml_to_json_numbers() {
        assert_eq!(yaml_to_json(&yaml("-3")), json!(-3));
        assert_eq!(yaml_to_json(&yaml("2.5")), json!(2.5));
        assert_eq!(yaml_to_json(&yaml("{a: [1, true]}")), json!({"a": [1, true]}));
    }
}
