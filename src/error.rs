use thiserror::Error;

/// Fatal conditions that stop a conversion run.
///
/// Everything recoverable (missing includes, cycles, unknown datatypes...)
/// is reported through [`crate::diagnostics::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Root specification not found: {identifier}")]
    RootSpecNotFound { identifier: String },

    #[error("Root specification {identifier} is not a signal mapping: {message}")]
    InvalidRootSpec { identifier: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

pub type Result<T> = std::result::Result<T, MapperError>;

impl MapperError {
    pub fn root_spec_not_found<S: Into<String>>(identifier: S) -> Self {
        Self::RootSpecNotFound { identifier: identifier.into() }
    }

    pub fn invalid_root_spec<S1: Into<String>, S2: Into<String>>(identifier: S1, message: S2) -> Self {
        Self::InvalidRootSpec { identifier: identifier.into(), message: message.into() }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Returns true when no registry could be built at all
    pub fn is_root_failure(&self) -> bool {
        matches!(self, Self::RootSpecNotFound { .. } | Self::InvalidRootSpec { .. })
    }
}
