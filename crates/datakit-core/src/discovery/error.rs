//! # Datakit Discovery Errors
//!
//! Errors raised by the [`ExtensionCatalog`](super::catalog::ExtensionCatalog).
//!
//! Rejected candidate types and failing subscribers are not errors of the
//! batch; they are reported in its [`BatchSummary`](super::catalog::BatchSummary).
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Discovery from '{source_name}' failed: {reason}")]
    DiscoveryFailed { source_name: String, reason: String },

    #[error("Subscriber '{subscriber}' failed: {reason}")]
    SubscriberFailed { subscriber: String, reason: String },

    #[error("Catalog configuration error: {0}")]
    Config(#[from] ConfigError),
}
