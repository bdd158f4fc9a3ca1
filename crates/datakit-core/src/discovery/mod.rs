//! # Datakit Extension Discovery
//!
//! Turns the candidate types found by plugin loading into registered,
//! finalized extension references.
//!
//! - **[`reflector`]**: [`DataExtensionReflector`], the observer that tries
//!   every extension kind on each candidate and registers what it finds.
//! - **[`catalog`]**: [`ExtensionCatalog`], which serializes load batches and
//!   subscriber notification so a subscriber sees a batch whole or not at all.
//! - **[`error`]**: [`DiscoveryError`](error::DiscoveryError).
pub mod catalog;
pub mod error;
pub mod reflector;

pub use catalog::{BatchSummary, CatalogSubscriber, ExtensionCatalog, SubscriberFailure};
pub use error::DiscoveryError;
pub use reflector::{DataExtensionReflector, ExtensionTypeObserver, Rejection};

// Test module declaration
#[cfg(test)]
mod tests;
