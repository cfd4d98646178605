//! Recoverable conversion diagnostics.
//!
//! A conversion run only fails outright when the root specification cannot
//! be loaded. Every other problem degrades gracefully and is recorded here
//! so the caller can decide whether warnings should count as failures.
//!
//! Each pushed diagnostic is also emitted as a `tracing` event at the
//! matching level.

use serde::Serialize;
use std::fmt;

/// Category of a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Include target could not be resolved; the include was skipped
    MissingInclude,
    /// Include target is already being resolved; the include was skipped
    CircularInclude,
    /// Include directive without an identifier
    MalformedInclude,
    /// Included fragment is not a YAML mapping
    MalformedFragment,
    /// Node declaration is neither a mapping nor empty
    MalformedDeclaration,
    /// Datatype matched neither the builtin table nor the type map
    UnresolvedDataType,
    /// Leaf-eligible node left unenriched
    EnrichmentSkipped,
    /// Two definitions produced the same path; the later one won
    PathCollision,
    /// Explicit `type` attribute is not a known node type
    UnknownNodeType,
    /// Declared min/max cannot be read as a number
    InvalidBound,
    /// Declared unit has no complete conversion entry
    UnmappedUnit,
    /// Graft target never became a node
    UngraftedInclude,
}

impl DiagnosticKind {
    /// Severity a diagnostic of this kind is reported with.
    pub fn severity(self) -> Severity {
        match self {
            Self::MissingInclude | Self::MalformedFragment => Severity::Error,
            Self::CircularInclude
            | Self::MalformedInclude
            | Self::MalformedDeclaration
            | Self::UnresolvedDataType
            | Self::EnrichmentSkipped
            | Self::PathCollision
            | Self::UnknownNodeType
            | Self::InvalidBound => Severity::Warning,
            Self::UnmappedUnit | Self::UngraftedInclude => Severity::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingInclude => "missing-include",
            Self::CircularInclude => "circular-include",
            Self::MalformedInclude => "malformed-include",
            Self::MalformedFragment => "malformed-fragment",
            Self::MalformedDeclaration => "malformed-declaration",
            Self::UnresolvedDataType => "unresolved-datatype",
            Self::EnrichmentSkipped => "enrichment-skipped",
            Self::PathCollision => "path-collision",
            Self::UnknownNodeType => "unknown-node-type",
            Self::InvalidBound => "invalid-bound",
            Self::UnmappedUnit => "unmapped-unit",
            Self::UngraftedInclude => "ungrafted-include",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One recorded condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Signal path or include identifier the diagnostic is about
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}[{}] {}: {}", self.kind.as_str(), self.subject, self.message)
    }
}

/// Ordered collection of diagnostics for one conversion run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the log.
    pub fn push<S: Into<String>, M: Into<String>>(&mut self, kind: DiagnosticKind, subject: S, message: M) {
        let diagnostic = Diagnostic {
            kind,
            severity: kind.severity(),
            subject: subject.into(),
            message: message.into(),
        };

        match diagnostic.severity {
            Severity::Error => tracing::error!(kind = kind.as_str(), subject = %diagnostic.subject, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(kind = kind.as_str(), subject = %diagnostic.subject, "{}", diagnostic.message),
            Severity::Info => tracing::info!(kind = kind.as_str(), subject = %diagnostic.subject, "{}", diagnostic.message),
        }

        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// True if anything at warning level or above was recorded
    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|d| d.severity >= Severity::Warning)
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
