//! Stable property identifiers derived from signal paths.
//!
//! Both the name and the numeric value depend on nothing but the path, so
//! regenerating from the same spec always yields the same identifiers.
//! Distinct paths may share a numeric value; nothing here detects that.

use crate::model::PropertyId;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Name prefix used when a path yields no usable identifier characters
pub const FALLBACK_NAME_PREFIX: &str = "VEHICLE_PROPERTY_";

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn separator_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"))
}

fn path_digest(path: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Path with every run of characters outside ASCII `A-Za-z0-9` collapsed to
/// `_`, then upper-cased.
///
/// `Vehicle.Cabin.Door.Row1.IsOpen` -> `VEHICLE_CABIN_DOOR_ROW1_ISOPEN`
pub fn generated_id_name(path: &str) -> String {
    let collapsed = separator_regex().replace_all(path, "_");
    let name = collapsed.trim_matches('_');

    if name.is_empty() {
        let hex: String = path_digest(path).iter().take(4).map(|b| format!("{b:02X}")).collect();
        return format!("{FALLBACK_NAME_PREFIX}{hex}");
    }
    name.to_ascii_uppercase()
}

/// First 16 bits of the SHA-256 digest of the path
pub fn generated_id_value(path: &str) -> PropertyId {
    let digest = path_digest(path);
    PropertyId(u16::from_be_bytes([digest[0], digest[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_collapses_separators() {
        assert_eq!(generated_id_name("Vehicle.Cabin.Door.Row1.IsOpen"), "VEHICLE_CABIN_DOOR_ROW1_ISOPEN");
        assert_eq!(generated_id_name("A..B--c"), "A_B_C");
        assert_eq!(generated_id_name("._Speed_."), "SPEED");
    }

    #[test]
    fn test_name_collapses_non_ascii_before_upper_casing() {
        assert_eq!(generated_id_name("Vehicle.Größe"), "VEHICLE_GR_E");
        assert_eq!(generated_id_name("Cabin.Sitz-Höhe"), "CABIN_SITZ_H_HE");
    }

    #[test]
    fn test_name_fallback_for_symbol_only_paths() {
        let name = generated_id_name("..");
        assert!(name.starts_with(FALLBACK_NAME_PREFIX));
        assert_eq!(name.len(), FALLBACK_NAME_PREFIX.len() + 8);
        assert_eq!(name, generated_id_name(".."));
        assert_ne!(name, generated_id_name("--"));
    }

    #[test]
    fn test_value_is_deterministic() {
        assert_eq!(generated_id_value("Vehicle.Speed"), generated_id_value("Vehicle.Speed"));
        // SHA-256("abc") = ba7816bf...
        assert_eq!(generated_id_value("abc"), PropertyId(0xBA78));
        assert_eq!(generated_id_value("abc").to_string(), "0xBA78");
    }

    #[test]
    fn test_fallback_uses_digest_prefix() {
        // SHA-256("") = e3b0c442...
        assert_eq!(generated_id_name(""), "VEHICLE_PROPERTY_E3B0C442");
    }
}
