//! Error type shared by every stage of the pipeline

use thiserror::Error;

/// Errors produced while binarizing or sampling an image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No usable binary signal could be derived at this stage.
    ///
    /// Always recoverable: callers may retry with another binarizer or
    /// report that nothing was found.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Malformed geometric request (region outside bounds, bad size, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The luminance source does not offer this capability
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// True for the recoverable not-found category
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
