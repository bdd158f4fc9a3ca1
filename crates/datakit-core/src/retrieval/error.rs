//! # Datakit Retrieval Errors
//!
//! Usage errors surfaced by the retrieval factory and filtered retrievals.
//! These are programming errors on the extension author's side: asking for an
//! extension that does not exist or is unavailable, or querying outside the
//! declared dependency closure.
use thiserror::Error;

use crate::extension::availability::Availability;
use crate::extension::reference::ExtensionKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("No {kind} '{identity}' is registered")]
    ExtensionNotFound { kind: ExtensionKind, identity: String },

    #[error("The {kind} '{identity}' is not available (availability: {availability})")]
    ExtensionUnavailable {
        kind: ExtensionKind,
        identity: String,
        availability: Availability,
    },

    #[error("'{requester}' did not declare a dependency on '{dependency}'")]
    UndeclaredDependency { requester: String, dependency: String },

    #[error("No output found at '{path}'")]
    OutputNotFound { path: String },

    #[error("Output '{path}' is not of type {expected}")]
    OutputTypeMismatch { path: String, expected: &'static str },

    #[error("Failed to materialize {kind} '{identity}': {reason}")]
    MaterializationFailed {
        kind: ExtensionKind,
        identity: String,
        reason: String,
    },

    #[error("Failed to build table '{identity}': {reason}")]
    TableBuildFailed { identity: String, reason: String },

    #[error("The processing run that owned this retrieval has ended")]
    ProcessingRunEnded,
}
