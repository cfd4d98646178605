//! Instance directive expansion.
//!
//! An `instances` directive turns one branch declaration into a family of
//! sibling nodes. Supported shapes:
//!
//! - `"Row[1,4]"` - a range, expands to `Row1` .. `Row4` (inclusive)
//! - `"Left"` - a literal segment
//! - `["Left", "Right"]` - a list of plain strings is one dimension
//! - `["Row[1,2]", ["Left", "Right"]]` - entries become dimensions once any
//!   list appears; the product varies the last entry fastest
//! - `[["Row[1,2]", ["Left", "Right"]]]` - an `[outer, [inner..]]` entry
//!   combines every outer with every inner segment (`Row1_Left` / `Row1.Left`)
//!
//! Expansion yields `(name_segment, path_segment)` pairs lazily; an
//! [`InstanceExpansion`] can be iterated any number of times.

use serde_yaml::Value;
use std::sync::OnceLock;

/// One entry of an `instances` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceEntry {
    /// Plain string, possibly a `PREFIX[start,end]` range
    Label(String),
    /// List of plain strings forming a single dimension
    Group(Vec<String>),
    /// `[outer, [inner..]]` combination
    Nested { outer: String, inner: Vec<String> },
}

impl InstanceEntry {
    /// Parse a directive value into its entries.
    ///
    /// A scalar is a one-entry directive. Returns `None` for values that
    /// cannot describe instances (mappings, null).
    pub fn parse_directive(value: &Value) -> Option<Vec<Self>> {
        match value {
            Value::Sequence(items) => Some(items.iter().filter_map(Self::from_value).collect()),
            Value::Tagged(tagged) => Self::parse_directive(&tagged.value),
            other => scalar_text(other).map(|label| vec![Self::Label(label)]),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Sequence(items) => {
                if let [Value::Sequence(_), ..] = items.as_slice() {
                    // A bare list of lists has no outer segment; read it as a group
                    return Some(Self::Group(items.iter().flat_map(flatten_scalars).collect()));
                }
                match items.as_slice() {
                    [outer, Value::Sequence(inner), ..] => Some(Self::Nested {
                        outer: scalar_text(outer)?,
                        inner: inner.iter().filter_map(scalar_text).collect(),
                    }),
                    _ => Some(Self::Group(items.iter().filter_map(scalar_text).collect())),
                }
            }
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            other => scalar_text(other).map(Self::Label),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flatten_scalars(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().flat_map(flatten_scalars).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

#[allow(clippy::expect_used)] // Static regex pattern is hardcoded and valid
fn range_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^(\w+)\[(\d+),(\d+)\]$").expect("valid regex"))
}

/// Expand a single label. `P[a,b]` yields `Pa..=Pb`; anything else is
/// returned unchanged as the only segment.
pub fn expand_label(label: &str) -> Vec<String> {
    if let Some(caps) = range_regex().captures(label) {
        let bounds = caps[2].parse::<u64>().ok().zip(caps[3].parse::<u64>().ok());
        if let Some((start, end)) = bounds {
            let prefix = &caps[1];
            return (start..=end).map(|i| format!("{prefix}{i}")).collect();
        }
    }
    vec![label.to_string()]
}

/// A name/path pair contributed by one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    path: String,
}

impl Segment {
    fn plain(label: String) -> Self {
        Self { name: label.clone(), path: label }
    }
}

/// Cartesian product of an instance directive, iterated lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceExpansion {
    dimensions: Vec<Vec<Segment>>,
}

/// Expand a directive into its ordered `(name_segment, path_segment)` pairs.
pub fn expand(entries: &[InstanceEntry]) -> InstanceExpansion {
    let only_labels = entries.iter().all(|e| matches!(e, InstanceEntry::Label(_)));

    let dimensions = if only_labels && !entries.is_empty() {
        let single = entries
            .iter()
            .flat_map(|e| match e {
                InstanceEntry::Label(label) => expand_label(label),
                _ => Vec::new(),
            })
            .map(Segment::plain)
            .collect();
        vec![single]
    } else {
        entries.iter().map(entry_dimension).collect()
    };

    InstanceExpansion { dimensions }
}

fn entry_dimension(entry: &InstanceEntry) -> Vec<Segment> {
    match entry {
        InstanceEntry::Label(label) => expand_label(label).into_iter().map(Segment::plain).collect(),
        InstanceEntry::Group(labels) => labels
            .iter()
            .flat_map(|l| expand_label(l))
            .map(Segment::plain)
            .collect(),
        InstanceEntry::Nested { outer, inner } => {
            let inner_segments: Vec<String> = inner.iter().flat_map(|l| expand_label(l)).collect();
            let mut combined = Vec::new();
            for outer_segment in expand_label(outer) {
                if inner_segments.is_empty() {
                    combined.push(Segment::plain(outer_segment));
                    continue;
                }
                for inner_segment in &inner_segments {
                    combined.push(Segment {
                        name: format!("{outer_segment}_{inner_segment}"),
                        path: format!("{outer_segment}.{inner_segment}"),
                    });
                }
            }
            combined
        }
    }
}

impl InstanceExpansion {
    pub fn iter(&self) -> InstanceIter<'_> {
        let cursor = if self.dimensions.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; self.dimensions.len()])
        };
        InstanceIter { dimensions: &self.dimensions, cursor }
    }

    /// Number of pairs the expansion yields
    pub fn len(&self) -> usize {
        self.dimensions.iter().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for &'a InstanceExpansion {
    type Item = (String, String);
    type IntoIter = InstanceIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Odometer over the expansion's dimensions, last dimension fastest.
#[derive(Debug, Clone)]
pub struct InstanceIter<'a> {
    dimensions: &'a [Vec<Segment>],
    cursor: Option<Vec<usize>>,
}

impl Iterator for InstanceIter<'_> {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;

        let picked: Vec<&Segment> = cursor
            .iter()
            .zip(self.dimensions)
            .map(|(&i, dim)| &dim[i])
            .collect();
        let name = join_non_empty(picked.iter().map(|s| s.name.as_str()), "_");
        let path = join_non_empty(picked.iter().map(|s| s.path.as_str()), ".");

        // advance
        let mut exhausted = true;
        for (slot, dim) in cursor.iter_mut().zip(self.dimensions).rev() {
            *slot += 1;
            if *slot < dim.len() {
                exhausted = false;
                break;
            }
            *slot = 0;
        }
        if exhausted {
            self.cursor = None;
        }

        Some((name, path))
    }
}

fn join_non_empty<'a>(parts: impl Iterator<Item = &'a str>, sep: &str) -> String {
    parts.filter(|p| !p.is_empty()).collect::<Vec<_>>().join(sep)
}

#[cfg(test)]
#[path = "instances_test.rs"]
mod tests;
