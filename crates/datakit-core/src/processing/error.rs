//! # Datakit Processing Errors
//!
//! Errors raised while driving a [`SourceProcessingSession`](super::session::SourceProcessingSession).
//!
//! Per-element outcomes, including corrupt data, are *not* errors: they are
//! returned as [`DataProcessingResult`](super::element::DataProcessingResult)
//! values. [`ProcessingError`] covers misuse of the session itself.
use thiserror::Error;

use crate::extension::availability::Availability;
use crate::processing::session::SessionPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("Cannot {operation} while the session is {actual}; expected {expected}")]
    InvalidPhase {
        operation: &'static str,
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("Source data cooker '{path}' is not registered")]
    CookerNotFound { path: String },

    #[error("Source data cooker '{path}' is not available (availability: {availability})")]
    CookerUnavailable { path: String, availability: Availability },

    #[error("Source data cooker '{path}' does not belong to source parser '{source_parser_id}'")]
    WrongSourceParser { path: String, source_parser_id: String },

    #[error("Source data cooker '{path}' was activated more than once")]
    DuplicateCooker { path: String },
}
