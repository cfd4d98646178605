//! Include directives.
//!
//! Spec files write includes as column-0 comment lines:
//!
//! ```text
//! #include Body/Body.vspec Vehicle.Body
//! ```
//!
//! A YAML parser drops comments, so [`preserve_include_lines`] rewrites each
//! such line into a quoted mapping key before parsing. The directive then
//! shows up as a key in the fragment mapping, in its original position.

use std::sync::OnceLock;

/// Parsed `include <identifier> [target]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub identifier: String,
    /// Branch path the fragment's top-level nodes are grafted under
    pub target: Option<String>,
}

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn directive_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^#?include(?:\s+(\S+))?(?:\s+(\S+))?\s*(.*)$").expect("valid regex"))
}

impl IncludeDirective {
    /// True if a mapping key is an include directive rather than a node.
    ///
    /// `#include` always starts a directive; the bare form needs whitespace
    /// after `include` so a node literally named `include` stays a node.
    pub fn is_directive_key(key: &str) -> bool {
        let key = key.trim_start();
        if key.starts_with("#include") {
            return true;
        }
        key.strip_prefix("include")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace) && !rest.trim().is_empty())
    }

    /// Parse a directive key. Errors carry a human-readable reason.
    pub fn parse(key: &str) -> Result<Self, String> {
        let key = key.trim();
        let caps = directive_regex()
            .captures(key)
            .ok_or_else(|| format!("'{key}' is not an include directive"))?;

        let identifier = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| "include directive has no identifier".to_string())?;
        let target = caps.get(2).map(|m| m.as_str().trim_matches('.').to_string()).filter(|t| !t.is_empty());

        if let Some(extra) = caps.get(3).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            return Err(format!("unexpected trailing text '{extra}' after include target"));
        }

        Ok(Self { identifier, target })
    }
}

/// Rewrite column-0 `#include ...` lines into `"#include ...": ~` keys.
pub fn preserve_include_lines(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 32);
    for line in content.lines() {
        if line.starts_with("#include") {
            let directive = line.trim_end();
            let escaped = directive.replace('\\', "\\\\").replace('"', "\\\"");
            out.push('"');
            out.push_str(&escaped);
            out.push_str("\": ~");
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
