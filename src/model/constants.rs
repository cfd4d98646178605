//! Node types and the platform property vocabulary.
//!
//! Platform values (access mode, change mode, area) serialize as the
//! vehicle HAL constant names. Parsing is lenient: case-insensitive,
//! `-`/` ` treated as `_`, an optional `Enum::` or `Enum.` qualifier is
//! dropped, and a few spelled-out aliases (`read-only`, `on-change`) are
//! accepted so heuristic files can be written either way.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Strip an `Enum::`/`Enum.` qualifier and normalise separators and case.
fn normalize_constant(raw: &str) -> String {
    let trimmed = raw.trim();
    let unqualified = trimmed
        .rsplit_once("::")
        .map(|(_, tail)| tail)
        .or_else(|| trimmed.rsplit_once('.').map(|(_, tail)| tail))
        .unwrap_or(trimmed);
    unqualified.replace(['-', ' '], "_").to_ascii_uppercase()
}

/// Declares a closed string vocabulary with lenient parsing and
/// serde support through its canonical name.
macro_rules! platform_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $variant:ident => $canonical:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $canonical ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize_constant(s).as_str() {
                    $( $canonical $(| $alias)* => Ok(Self::$variant), )+
                    _ => Err(format!("unknown {} '{}'", $what, s)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

platform_enum! {
    /// Vehicle property access (VehiclePropertyAccess)
    AccessMode, "access mode" {
        Read => "READ" | "READ_ONLY" | "READONLY" | "R",
        Write => "WRITE" | "WRITE_ONLY" | "WRITEONLY" | "W",
        ReadWrite => "READ_WRITE" | "READWRITE" | "RW",
        None => "NONE",
    }
}

platform_enum! {
    /// Vehicle property change mode (VehiclePropertyChangeMode)
    ChangeMode, "change mode" {
        Static => "STATIC",
        OnChange => "ON_CHANGE" | "ONCHANGE",
        Continuous => "CONTINUOUS",
    }
}

platform_enum! {
    /// Vehicle property area (VehicleArea)
    Area, "area" {
        Global => "GLOBAL",
        Window => "WINDOW",
        Mirror => "MIRROR",
        Seat => "SEAT",
        Door => "DOOR",
        Wheel => "WHEEL",
    }
}

platform_enum! {
    /// Property id group (VehiclePropertyGroup)
    PropertyGroup, "property group" {
        System => "SYSTEM",
        Vendor => "VENDOR",
    }
}

platform_enum! {
    /// Target property value category (VehiclePropertyType)
    TargetType, "target type" {
        String => "STRING",
        Boolean => "BOOLEAN" | "BOOL",
        Int32 => "INT32",
        Int32Vector => "INT32_VEC" | "INT32[]",
        Int64 => "INT64",
        Int64Vector => "INT64_VEC" | "INT64[]",
        Float => "FLOAT",
        FloatVector => "FLOAT_VEC" | "FLOAT[]",
        Bytes => "BYTES",
        Mixed => "MIXED",
    }
}

impl TargetType {
    /// Builtin mapping from declared datatype names.
    ///
    /// Every 8/16/32-bit integer kind lands in `Int32`, the 64-bit kinds in
    /// `Int64`. Lookup is case-insensitive.
    pub fn from_datatype(datatype: &str) -> Option<Self> {
        match datatype.trim().to_ascii_lowercase().as_str() {
            "boolean" => Some(Self::Boolean),
            "uint8" | "int8" | "uint16" | "int16" | "uint32" | "int32" => Some(Self::Int32),
            "uint64" | "int64" => Some(Self::Int64),
            "float" | "double" => Some(Self::Float),
            "string" | "string[]" => Some(Self::String),
            "int32[]" => Some(Self::Int32Vector),
            "float[]" => Some(Self::FloatVector),
            _ => None,
        }
    }

    /// Category named by a type-map entry. Anything unrecognised is `Mixed`.
    pub fn from_type_map_target(target: &str) -> Self {
        match target.trim().to_ascii_lowercase().as_str() {
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "float" => Self::Float,
            "string" => Self::String,
            "boolean" | "bool" => Self::Boolean,
            "int32[]" | "int32_vec" => Self::Int32Vector,
            "int64[]" | "int64_vec" => Self::Int64Vector,
            "float[]" | "float_vec" => Self::FloatVector,
            "bytes" => Self::Bytes,
            _ => Self::Mixed,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Int32 | Self::Int64 | Self::Float | Self::Int32Vector | Self::Int64Vector | Self::FloatVector
        )
    }

    /// Initial value used when no default was declared.
    pub fn default_value(self) -> Option<serde_json::Value> {
        use serde_json::Value;
        match self {
            Self::Boolean => Some(Value::Bool(false)),
            Self::Int32 | Self::Int64 => Some(Value::from(0)),
            Self::Float => Some(Value::from(0.0)),
            Self::String => Some(Value::String(String::new())),
            Self::Int32Vector | Self::Int64Vector | Self::FloatVector => Some(Value::Array(Vec::new())),
            Self::Bytes | Self::Mixed => None,
        }
    }
}

/// Kind of a specification node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Branch,
    Signal,
    Sensor,
    Actuator,
    Attribute,
}

impl NodeType {
    /// Signal, sensor, actuator and attribute nodes may carry platform
    /// attributes; branches are organisational only.
    pub fn is_leaf_eligible(self) -> bool {
        !matches!(self, Self::Branch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Signal => "signal",
            Self::Sensor => "sensor",
            Self::Actuator => "actuator",
            Self::Attribute => "attribute",
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "branch" => Ok(Self::Branch),
            "signal" => Ok(Self::Signal),
            "sensor" => Ok(Self::Sensor),
            "actuator" => Ok(Self::Actuator),
            "attribute" => Ok(Self::Attribute),
            other => Err(format!("unknown node type '{other}'")),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated numeric property identifier, rendered as `0x%04X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub u16);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl Serialize for PropertyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_constant_parsing() {
        assert_eq!("read".parse::<AccessMode>(), Ok(AccessMode::Read));
        assert_eq!("read-only".parse::<AccessMode>(), Ok(AccessMode::Read));
        assert_eq!("VehiclePropertyAccess::READ_WRITE".parse::<AccessMode>(), Ok(AccessMode::ReadWrite));
        assert_eq!("on-change".parse::<ChangeMode>(), Ok(ChangeMode::OnChange));
        assert_eq!("VehicleArea.SEAT".parse::<Area>(), Ok(Area::Seat));
        assert_eq!("VehiclePropertyGroup.VENDOR".parse::<PropertyGroup>(), Ok(PropertyGroup::Vendor));
        assert!("sideways".parse::<Area>().is_err());
    }

    #[test]
    fn test_builtin_datatype_table() {
        assert_eq!(TargetType::from_datatype("UINT8"), Some(TargetType::Int32));
        assert_eq!(TargetType::from_datatype("int64"), Some(TargetType::Int64));
        assert_eq!(TargetType::from_datatype("double"), Some(TargetType::Float));
        assert_eq!(TargetType::from_datatype("float[]"), Some(TargetType::FloatVector));
        assert_eq!(TargetType::from_datatype("uint8[]"), None);
    }

    #[test]
    fn test_type_map_target_falls_back_to_mixed() {
        assert_eq!(TargetType::from_type_map_target("int32_vec"), TargetType::Int32Vector);
        assert_eq!(TargetType::from_type_map_target("quaternion"), TargetType::Mixed);
    }

    #[test]
    fn test_property_id_rendering() {
        assert_eq!(PropertyId(0x0a1).to_string(), "0x00A1");
        assert_eq!(serde_json::to_string(&PropertyId(0xBEEF)).unwrap(), "\"0xBEEF\"");
    }

    #[test]
    fn test_node_type_parse() {
        assert_eq!("Sensor".parse::<NodeType>(), Ok(NodeType::Sensor));
        assert!("struct".parse::<NodeType>().is_err());
        assert!(!NodeType::Branch.is_leaf_eligible());
        assert!(NodeType::Attribute.is_leaf_eligible());
    }
}
