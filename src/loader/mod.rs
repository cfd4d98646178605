//! Spec loading: include resolution and tree building.
//!
//! [`SpecLoader`] walks the root fragment and every fragment it includes,
//! hands node declarations to the [`TreeBuilder`] and collects everything in
//! one [`Registry`]. Include cycles are broken with an explicit stack of the
//! identifiers currently being loaded.
//!
//! Every fragment is loaded at a base path. Top-level nodes of a fragment at
//! the root base become tree roots; at any other base they are grafted under
//! the node at that path once loading has finished, so a fragment can target
//! a branch that is declared later.

pub mod builder;
pub mod declaration;
pub mod document;
pub mod include;
pub mod resolver;

pub use builder::{BuiltNode, TreeBuilder};
pub use document::{Document, Entries};
pub use include::IncludeDirective;
pub use resolver::{ContentResolver, FsResolver, MapResolver};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{MapperError, Result};
use crate::model::Registry;
use serde_yaml::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, info_span};

/// Pending parent link for a top-level node of a non-root fragment
#[derive(Debug, Clone)]
struct Graft {
    parent: String,
    segment: String,
    child: String,
}

/// Loads a root spec and its includes into a fresh registry
pub struct SpecLoader<'a> {
    resolver: &'a dyn ContentResolver,
    include_stack: Vec<String>,
    grafts: Vec<Graft>,
    fragments_loaded: usize,
}

impl<'a> SpecLoader<'a> {
    pub fn new(resolver: &'a dyn ContentResolver) -> Self {
        Self { resolver, include_stack: Vec::new(), grafts: Vec::new(), fragments_loaded: 0 }
    }

    /// Build the registry for `root_identifier`.
    ///
    /// Fails only when the root cannot be resolved or is not a mapping;
    /// every other problem is recorded in `diagnostics`.
    pub fn load(&mut self, root_identifier: &str, diagnostics: &mut Diagnostics) -> Result<Registry> {
        let _span = info_span!("load_spec", root = %root_identifier).entered();

        self.include_stack.clear();
        self.grafts.clear();
        self.fragments_loaded = 0;

        let content = self
            .resolver
            .resolve(root_identifier)
            .ok_or_else(|| MapperError::root_spec_not_found(root_identifier))?;
        let fragment =
            parse_fragment(&content).map_err(|message| MapperError::invalid_root_spec(root_identifier, message))?;

        let mut registry = Registry::new();
        self.load_fragment(root_identifier, &fragment, "", &mut registry, diagnostics);
        self.apply_grafts(&mut registry, diagnostics);

        info!(
            "Loaded {} node(s) from {} fragment(s), {} root(s)",
            registry.len(),
            self.fragments_loaded,
            registry.roots().count()
        );
        Ok(registry)
    }

    fn load_fragment(
        &mut self,
        identifier: &str,
        fragment: &Entries,
        base_path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) {
        self.include_stack.push(self.resolver.canonical_id(identifier));
        self.fragments_loaded += 1;
        debug!("Loading '{}' at '{}'", identifier, base_path);

        let mut seen_includes = BTreeSet::new();
        for (key, value) in fragment {
            let Some(key) = declaration::scalar_text(key) else {
                continue;
            };

            if IncludeDirective::is_directive_key(&key) {
                if !seen_includes.insert(key.clone()) {
                    debug!("Repeated '{}' in '{}' ignored", key, identifier);
                    continue;
                }
                match IncludeDirective::parse(&key) {
                    Ok(directive) => self.include(&directive, base_path, registry, diagnostics),
                    Err(reason) => diagnostics.push(DiagnosticKind::MalformedInclude, identifier, reason),
                }
                continue;
            }

            let built = TreeBuilder::new(registry, diagnostics).build(&key, value, base_path);
            for node in built {
                if base_path.is_empty() {
                    registry.add_root(&node.path);
                } else {
                    self.grafts.push(Graft { parent: base_path.to_string(), segment: node.segment, child: node.path });
                }
            }
        }

        self.include_stack.pop();
    }

    fn include(
        &mut self,
        directive: &IncludeDirective,
        base_path: &str,
        registry: &mut Registry,
        diagnostics: &mut Diagnostics,
    ) {
        let identifier = directive.identifier.as_str();
        let canonical = self.resolver.canonical_id(identifier);

        if self.include_stack.contains(&canonical) {
            let chain = self.include_stack.join(" -> ");
            diagnostics.push(
                DiagnosticKind::CircularInclude,
                identifier,
                format!("include cycle {chain} -> {canonical}; include skipped"),
            );
            return;
        }

        let Some(content) = self.resolver.resolve(identifier) else {
            diagnostics.push(DiagnosticKind::MissingInclude, identifier, "cannot be resolved; include skipped");
            return;
        };

        let fragment = match parse_fragment(&content) {
            Ok(fragment) => fragment,
            Err(reason) => {
                diagnostics.push(DiagnosticKind::MalformedFragment, identifier, format!("{reason}; include skipped"));
                return;
            }
        };

        let target = directive.target.as_deref().unwrap_or(base_path);
        self.load_fragment(identifier, &fragment, target, registry, diagnostics);
    }

    fn apply_grafts(&mut self, registry: &mut Registry, diagnostics: &mut Diagnostics) {
        let mut missing_parents = BTreeSet::new();

        for graft in self.grafts.drain(..) {
            if !registry.contains(&graft.child) {
                // replaced or pruned after it was built
                continue;
            }
            if !registry.link_child(&graft.parent, &graft.segment, &graft.child) {
                missing_parents.insert(graft.parent);
            }
        }

        for parent in missing_parents {
            diagnostics.push(
                DiagnosticKind::UngraftedInclude,
                parent,
                "include target branch is never declared; included nodes have no parent",
            );
        }
    }
}

/// Parse fragment text into its top-level entries. Empty text is an empty
/// fragment; any other non-mapping document is rejected. Repeated keys are
/// kept in document order.
pub fn parse_fragment(content: &str) -> std::result::Result<Entries, String> {
    let text = include::preserve_include_lines(content);
    let document = Document::from_yaml(&text).map_err(|e| format!("invalid YAML: {e}"))?;
    match document {
        Document::Mapping(entries) => Ok(entries),
        Document::Value(Value::Null) => Ok(Entries::new()),
        Document::Value(Value::Sequence(_)) => Err("expected a mapping, found a sequence".to_string()),
        Document::Value(_) => Err("expected a mapping, found a scalar".to_string()),
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
