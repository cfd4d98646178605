//! Signal node data model.

pub mod constants;
pub mod registry;
pub mod signal;

pub use constants::{AccessMode, Area, ChangeMode, NodeType, PropertyGroup, PropertyId, TargetType};
pub use registry::Registry;
pub use signal::{join_path, Constraints, Enrichment, SignalNode};
