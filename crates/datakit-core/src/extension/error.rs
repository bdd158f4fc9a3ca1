//! # Datakit Extension Errors
//!
//! Defines error types raised while building extension identities.
//!
//! Structural and dependency problems found on references are *not* errors
//! in this sense: they are accumulated as messages on the reference or its
//! dependency state so they can be reported later. [`PathError`] only covers
//! malformed identities handed to the path constructors.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Data cooker id must not be empty")]
    EmptyCookerId,

    #[error("Data output id must not be empty")]
    EmptyOutputId,

    #[error("Data processor id must not be empty")]
    EmptyProcessorId,

    #[error("Path component '{component}' must not contain the path separator '{separator}'")]
    ContainsSeparator { component: String, separator: char },

    #[error("Malformed path '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

/// Why a candidate type that looks like an extension was turned away.
///
/// A type that simply does not implement an extension kind is not rejected;
/// it is skipped without a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceRejection {
    #[error("{kind} type '{type_name}' is not public")]
    NotPublic { type_name: String, kind: String },

    #[error("{kind} type '{type_name}' has no parameterless constructor")]
    MissingConstructor { type_name: String, kind: String },

    #[error("{kind} type '{type_name}' is missing a required id: {reason}")]
    MissingIdentity { type_name: String, kind: String, reason: String },
}
