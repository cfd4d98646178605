//! Priority-ordered heuristic rules.
//!
//! A rule carries a priority, a list of patterns and a result value. Rules
//! are sorted once when the set is built (ascending priority, declaration
//! order breaks ties) and evaluated by linear scan: the first rule with any
//! pattern found in the target wins.

use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Priority assumed for rules that do not declare one
pub const DEFAULT_PRIORITY: i64 = 999;

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

/// Rule as written in a heuristics file
#[derive(Debug, Clone, Deserialize)]
pub struct RawRule<T> {
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(alias = "vhal_access", alias = "vhal_change_mode", alias = "vhal_area", alias = "value")]
    pub result: T,
}

impl<T> RawRule<T> {
    pub fn new<S: AsRef<str>>(priority: i64, patterns: &[S], result: T) -> Self {
        Self {
            priority,
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            result,
        }
    }
}

/// Compiled rule
#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub priority: i64,
    patterns: Vec<regex::Regex>,
    pub result: T,
}

impl<T> Rule<T> {
    pub fn matches(&self, target: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(target))
    }
}

/// Compile a pattern for case-insensitive search. Patterns that are not
/// valid regex syntax are searched for as literal substrings.
fn compile_pattern(pattern: &str) -> regex::Regex {
    match regex::Regex::new(&format!("(?i){pattern}")) {
        Ok(re) => re,
        Err(e) => {
            warn!("Heuristic pattern '{}' is not a valid regex ({}); matching it literally", pattern, e);
            #[allow(clippy::expect_used)] // An escaped literal is always a valid regex
            regex::Regex::new(&format!("(?i){}", regex::escape(pattern))).expect("escaped literal compiles")
        }
    }
}

/// Ordered, compiled rule list for one concern
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleSet<T> {
    pub fn compile(raw: Vec<RawRule<T>>) -> Self {
        let mut rules: Vec<Rule<T>> = raw
            .into_iter()
            .map(|r| Rule {
                priority: r.priority,
                patterns: r.patterns.iter().map(|p| compile_pattern(p)).collect(),
                result: r.result,
            })
            .collect();
        // stable: equal priorities keep declaration order
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    /// Result of the first matching rule, if any
    pub fn first_match(&self, target: &str) -> Option<&T> {
        self.rules.iter().find(|r| r.matches(target)).map(|r| &r.result)
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T: Clone> RuleSet<T> {
    /// Result of the first matching rule, or `default` when nothing matches
    pub fn evaluate(&self, target: &str, default: T) -> T {
        self.first_match(target).cloned().unwrap_or(default)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RuleSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<RawRule<T>>>::deserialize(deserializer)?;
        Ok(Self::compile(raw.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessMode;

    #[test]
    fn test_lowest_priority_number_wins() {
        let rules = RuleSet::compile(vec![
            RawRule::new(20, &["speed"], "late"),
            RawRule::new(5, &["spe"], "early"),
        ]);
        assert_eq!(rules.evaluate("VehicleSpeed", "none"), "early");
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let rules = RuleSet::compile(vec![
            RawRule::new(10, &["door"], "first"),
            RawRule::new(10, &["door"], "second"),
        ]);
        assert_eq!(rules.first_match("IsDoorOpen"), Some(&"first"));
    }

    #[test]
    fn test_match_is_case_insensitive_search() {
        let rules = RuleSet::compile(vec![RawRule::new(1, &["^is[A-Z]"], AccessMode::Read)]);
        assert_eq!(rules.first_match("IsOpen"), Some(&AccessMode::Read));
        assert_eq!(rules.first_match("ISOPEN"), Some(&AccessMode::Read));
        assert_eq!(rules.first_match("ThisIsOpen"), None);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let rules: RuleSet<&str> = RuleSet::compile(vec![RawRule::new(1, &["window"], "WINDOW")]);
        assert_eq!(rules.evaluate("Vehicle.Speed", "GLOBAL"), "GLOBAL");
        let empty: RuleSet<&str> = RuleSet::default();
        assert_eq!(empty.evaluate("anything", "GLOBAL"), "GLOBAL");
    }

    #[test]
    fn test_invalid_regex_matches_literally() {
        let rules = RuleSet::compile(vec![RawRule::new(1, &["Row[1"], "hit")]);
        assert_eq!(rules.first_match("Cabin.ROW[1"), Some(&"hit"));
        assert_eq!(rules.first_match("Cabin.Row1"), None);
    }

    #[test]
    fn test_deserialize_with_legacy_result_keys() {
        let yaml = r#"
- priority: 30
  patterns: ["Set", "Target"]
  vhal_access: READ_WRITE
- patterns: ["Is.*Open"]
  result: read
- priority: 1
  patterns: ["Lock"]
  result: write
"#;
        let rules: RuleSet<AccessMode> = serde_yaml::from_str(yaml).unwrap();
        let priorities: Vec<_> = rules.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 30, DEFAULT_PRIORITY]);
        assert_eq!(rules.first_match("TargetTemperature"), Some(&AccessMode::ReadWrite));
        assert_eq!(rules.first_match("IsTrunkOpen"), Some(&AccessMode::Read));
    }

    #[test]
    fn test_deserialize_rejects_unknown_result() {
        let yaml = "- patterns: [x]\n  result: sometimes\n";
        let parsed: Result<RuleSet<AccessMode>, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }
}
