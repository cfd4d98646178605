//! VSS-MAPPER - Vehicle signal specification to vehicle HAL property model.
//!
//! This library loads a hierarchical signal specification (YAML fragments
//! joined by include directives, with parametric instances), infers vehicle
//! HAL property attributes for every data-carrying node, and flattens the
//! result into a path-keyed model for code generators.
//!
//! # Example
//!
//! ```no_run
//! use vss_mapper::{convert, EnrichmentConfig, FsResolver};
//!
//! let resolver = FsResolver::new("spec");
//! let config = EnrichmentConfig::from_dir("config").unwrap();
//! let conversion = convert("VehicleSignalSpecification.vspec", &resolver, &config).unwrap();
//!
//! for diagnostic in &conversion.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! println!("{}", conversion.model.to_json_pretty().unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod enricher;
pub mod error;
pub mod flatten;
pub mod instances;
pub mod loader;
pub mod model;
pub mod rules;

// Re-export commonly used types at crate root
pub use config::EnrichmentConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use enricher::PropertyEnricher;
pub use error::{MapperError, Result};
pub use flatten::{flatten, SignalRecord, UnifiedModel};
pub use loader::{ContentResolver, FsResolver, MapResolver, SpecLoader};
pub use model::{NodeType, Registry, SignalNode};

/// Outcome of one conversion run
#[derive(Debug, Clone)]
pub struct Conversion {
    pub model: UnifiedModel,
    pub diagnostics: Diagnostics,
    /// Nodes in the registry after loading
    pub node_count: usize,
    /// Nodes that received platform attributes
    pub enriched_count: usize,
}

/// Load, enrich and flatten the spec rooted at `root_identifier`.
///
/// Only an unloadable root is an error; everything else ends up in
/// [`Conversion::diagnostics`].
pub fn convert(
    root_identifier: &str,
    resolver: &dyn ContentResolver,
    config: &EnrichmentConfig,
) -> Result<Conversion> {
    let mut diagnostics = Diagnostics::new();

    let mut registry = SpecLoader::new(resolver).load(root_identifier, &mut diagnostics)?;
    let enriched_count = PropertyEnricher::new(config).enrich(&mut registry, &mut diagnostics);
    let model = flatten(&registry);

    Ok(Conversion { model, diagnostics, node_count: registry.len(), enriched_count })
}
