//! Path-keyed node registry owned by a single conversion run.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::signal::SignalNode;
use std::collections::BTreeMap;

/// Every node produced while loading, keyed by full path.
///
/// Registration is last-write-wins: a later node at an existing path
/// replaces the earlier one together with the subtree that hung below it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    nodes: BTreeMap<String, SignalNode>,
    roots: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any earlier node at the same path.
    ///
    /// Replacement discards the earlier node's descendants and is always
    /// reported as a `PathCollision`.
    pub fn register(&mut self, node: SignalNode, diagnostics: &mut Diagnostics) {
        let path = node.path.clone();
        let Some(previous) = self.nodes.insert(path.clone(), node) else {
            return;
        };

        let dropped = self.remove_descendants(&previous);
        let message = if dropped > 0 {
            format!(
                "redefined; earlier {} definition replaced and {} descendant node(s) discarded",
                previous.node_type, dropped
            )
        } else {
            format!("redefined; earlier {} definition replaced", previous.node_type)
        };
        diagnostics.push(DiagnosticKind::PathCollision, path, message);
    }

    fn remove_descendants(&mut self, node: &SignalNode) -> usize {
        let mut removed = 0;
        let mut pending: Vec<String> = node.children.values().cloned().collect();
        while let Some(path) = pending.pop() {
            if let Some(child) = self.nodes.remove(&path) {
                removed += 1;
                pending.extend(child.children.into_values());
            }
        }
        removed
    }

    /// Link `child_path` under `parent_path` using `segment` as the key.
    /// Returns false when the parent is not registered.
    pub fn link_child(&mut self, parent_path: &str, segment: &str, child_path: &str) -> bool {
        match self.nodes.get_mut(parent_path) {
            Some(parent) => {
                parent.children.insert(segment.to_string(), child_path.to_string());
                true
            }
            None => false,
        }
    }

    pub fn add_root(&mut self, path: &str) {
        if !self.roots.iter().any(|r| r == path) {
            self.roots.push(path.to_string());
        }
    }

    /// Top-level nodes of the root fragment, in declaration order
    pub fn roots(&self) -> impl Iterator<Item = &SignalNode> {
        self.roots.iter().filter_map(|p| self.nodes.get(p))
    }

    pub fn get(&self, path: &str) -> Option<&SignalNode> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Resolved children of a node, keyed by relative segment
    pub fn children_of<'a>(&'a self, node: &'a SignalNode) -> impl Iterator<Item = (&'a str, &'a SignalNode)> + 'a {
        node.children
            .iter()
            .filter_map(|(segment, path)| self.nodes.get(path).map(|child| (segment.as_str(), child)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalNode)> {
        self.nodes.iter().map(|(p, n)| (p.as_str(), n))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut SignalNode)> {
        self.nodes.iter_mut().map(|(p, n)| (p.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
