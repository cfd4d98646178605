//! Parsed spec documents that keep repeated mapping keys.
//!
//! `serde_yaml::Mapping` rejects a key that appears twice, but spec
//! fragments routinely redeclare a node and expect the later declaration to
//! replace the earlier one. [`Document`] keeps every mapping entry in
//! document order so the tree builder sees each declaration and the registry
//! applies last-write-wins.

use serde::de::{Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// Mapping entries in document order, repeated keys included
pub type Entries = Vec<(Value, Document)>;

/// One parsed YAML node
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Mapping(Entries),
    /// Scalars, sequences and tagged scalars
    Value(Value),
}

impl Document {
    /// Parse one YAML document
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn as_entries(&self) -> Option<&Entries> {
        match self {
            Document::Mapping(entries) => Some(entries),
            Document::Value(_) => None,
        }
    }

    /// Plain value view; a repeated key keeps its last value
    pub fn to_value(&self) -> Value {
        match self {
            Document::Value(value) => value.clone(),
            Document::Mapping(entries) => {
                let mut mapping = Mapping::new();
                for (key, value) in entries {
                    mapping.insert(key.clone(), value.to_value());
                }
                Value::Mapping(mapping)
            }
        }
    }

    fn into_value(self) -> Value {
        match self {
            Document::Value(value) => value,
            Document::Mapping(entries) => {
                let mut mapping = Mapping::new();
                for (key, value) in entries {
                    mapping.insert(key, value.into_value());
                }
                Value::Mapping(mapping)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any YAML value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Bool(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Number(v.into())))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Number(v.into())))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Number(v.into())))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::String(v.to_string())))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::String(v)))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Null))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(Document::Value(Value::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Document::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Document>()? {
            items.push(item.into_value());
        }
        Ok(Document::Value(Value::Sequence(items)))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<Document>()? {
            let value = map.next_value::<Document>()?;
            entries.push((key.into_value(), value));
        }
        Ok(Document::Mapping(entries))
    }

    // Tags arrive as single-variant enums. A tagged mapping keeps its entries
    // and drops the tag.
    fn visit_enum<A>(self, data: A) -> Result<Self::Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, variant) = data.variant::<String>()?;
        let inner = variant.newtype_variant::<Document>()?;
        Ok(match inner {
            Document::Mapping(entries) => Document::Mapping(entries),
            Document::Value(value) => Document::Value(Value::Tagged(Box::new(TaggedValue { tag: Tag::new(tag), value }))),
        })
    }
}
