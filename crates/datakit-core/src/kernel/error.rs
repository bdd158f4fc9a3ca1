//! # Datakit Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and its `Result` alias.
//!
//! Each subsystem owns a typed error ([`PathError`], [`RetrievalError`],
//! [`ProcessingError`], [`DiscoveryError`], [`ConfigError`]); [`Error`]
//! wraps them all so callers driving a whole run can use `?` throughout.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::discovery::error::DiscoveryError;
use crate::extension::error::{PathError, ReferenceRejection};
use crate::processing::error::ProcessingError;
use crate::retrieval::error::RetrievalError;

/// Boxed error returned by extension callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Custom error type for the datakit runtime
#[derive(Debug, ThisError)]
pub enum Error {
    /// Malformed cooker path, output path or processor id
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// A candidate type was rejected while building a reference
    #[error("Reference rejected: {0}")]
    Rejected(#[from] ReferenceRejection),

    /// Misuse of a scoped retrieval or the retrieval factory
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Misuse of a source processing session
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure reported by an extension callback
    #[error("Extension error: {0}")]
    Extension(BoxError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        Error::Extension(err)
    }
}
