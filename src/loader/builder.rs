//! Spec tree builder.
//!
//! Turns one node declaration into registered [`SignalNode`]s. A branch with
//! an `instances` directive becomes one node per expanded instance; anything
//! else becomes exactly one node. Children are built recursively under every
//! produced node and linked by their path segment relative to the parent.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::instances;
use crate::loader::declaration::Declaration;
use crate::loader::document::Document;
use crate::model::{join_path, NodeType, Registry, SignalNode};
use tracing::debug;

/// A node produced for a declaration, as seen from its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltNode {
    /// Path segment relative to the parent; the parent's child key
    pub segment: String,
    pub path: String,
}

/// Builds declarations into a registry owned by the caller
pub struct TreeBuilder<'r> {
    registry: &'r mut Registry,
    diagnostics: &'r mut Diagnostics,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r mut Registry, diagnostics: &'r mut Diagnostics) -> Self {
        Self { registry, diagnostics }
    }

    /// Build the node(s) declared under `key` at `parent_path`.
    ///
    /// Returns what the caller should link under the parent. A value that
    /// is not a declaration yields nothing and a `MalformedDeclaration`.
    pub fn build(&mut self, key: &str, value: &Document, parent_path: &str) -> Vec<BuiltNode> {
        match Declaration::parse(value) {
            Ok(decl) => self.build_declaration(key, &decl, parent_path),
            Err(reason) => {
                self.diagnostics.push(
                    DiagnosticKind::MalformedDeclaration,
                    join_path(parent_path, key),
                    format!("{reason}; declaration skipped"),
                );
                Vec::new()
            }
        }
    }

    fn build_declaration(&mut self, key: &str, decl: &Declaration<'_>, parent_path: &str) -> Vec<BuiltNode> {
        let node_type = self.classify(key, decl, parent_path);

        match (&decl.instances, node_type) {
            (Some(entries), NodeType::Branch) => {
                let expansion = instances::expand(entries);
                let mut built = Vec::with_capacity(expansion.len());
                for (name_segment, path_segment) in &expansion {
                    if path_segment.is_empty() {
                        continue;
                    }
                    let path = join_path(parent_path, &path_segment);
                    debug!("Instance {} of '{}' -> {}", name_segment, key, path);
                    self.register_subtree(new_node(key, &path, node_type, decl, false), decl);
                    built.push(BuiltNode { segment: path_segment, path });
                }
                if built.is_empty() {
                    debug!("Instances of '{}' under '{}' expanded to nothing", key, parent_path);
                }
                built
            }
            _ => {
                let path = join_path(parent_path, key);
                self.register_subtree(new_node(key, &path, node_type, decl, true), decl);
                vec![BuiltNode { segment: key.to_string(), path }]
            }
        }
    }

    /// Register `node`, then build and link the declaration's children under it
    fn register_subtree(&mut self, node: SignalNode, decl: &Declaration<'_>) {
        let path = node.path.clone();
        self.registry.register(node, self.diagnostics);

        for (child_key, child_entries) in &decl.children {
            let child_decl = Declaration::from_entries(child_entries);
            for child in self.build_declaration(child_key, &child_decl, &path) {
                self.registry.link_child(&path, &child.segment, &child.path);
            }
        }
    }

    /// Explicit `type` wins; otherwise a datatype makes a signal.
    fn classify(&mut self, key: &str, decl: &Declaration<'_>, parent_path: &str) -> NodeType {
        if let Some(raw) = decl.explicit_type.as_deref().filter(|t| !t.trim().is_empty()) {
            match raw.parse::<NodeType>() {
                Ok(node_type) => return node_type,
                Err(reason) => self.diagnostics.push(
                    DiagnosticKind::UnknownNodeType,
                    join_path(parent_path, key),
                    format!("{reason}; inferring from datatype"),
                ),
            }
        }

        if decl.has_datatype() {
            NodeType::Signal
        } else {
            NodeType::Branch
        }
    }
}

fn new_node(key: &str, path: &str, node_type: NodeType, decl: &Declaration<'_>, keep_instances: bool) -> SignalNode {
    let mut node = SignalNode::new(key, path, node_type);
    node.datatype = decl.datatype.clone();
    node.unit = decl.unit.clone();
    node.description = decl.description.clone();
    node.constraints = decl.constraints.clone();
    if keep_instances {
        node.constraints.instances = decl.instances.clone();
    }
    node
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
