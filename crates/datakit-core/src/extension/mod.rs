//! # Datakit Data Extensions
//!
//! This module models the extensions plugins contribute to a processing run
//! and decides which of them can be used.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`path`]**: Identity types ([`DataCookerPath`], [`DataOutputPath`],
//!   [`DataProcessorId`], [`DataKey`]).
//! - **[`traits`]**: The contracts extensions implement: source and composite
//!   cookers, data processors and tables.
//! - **[`descriptor`]**: [`ExtensionType`], the candidate handed to discovery,
//!   and the [`TableDescriptorFactory`] seam.
//! - **[`reference`]**: One reference variant per extension kind, carrying
//!   identity, declared dependencies and static validation errors.
//! - **[`dependency`]**: The dependency state engine computing availability
//!   and the dependency closure of each reference.
//! - **[`repository`]**: The [`ExtensionRepository`] holding every reference
//!   and orchestrating finalization.
//! - **[`error`]**: [`PathError`](error::PathError) and
//!   [`ReferenceRejection`](error::ReferenceRejection).
pub mod availability;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod path;
pub mod reference;
pub mod repository;
pub mod traits;

pub use availability::Availability;
pub use dependency::{DependencyReferences, DependencyState, VisitState};
pub use descriptor::{DefaultTableDescriptorFactory, ExtensionType, TableDescriptorFactory};
pub use error::{PathError, ReferenceRejection};
pub use path::{DataCookerPath, DataKey, DataOutputPath, DataProcessorId};
pub use reference::{
    CompositeDataCookerReference, DataExtensionReference, DataProcessorReference, ExtensionKey, ExtensionKind,
    SourceDataCookerReference, TableExtensionReference,
};
pub use repository::ExtensionRepository;
pub use traits::{
    CompositeDataCooker, DataCooker, DataCookerOptions, DataOutput, DataProcessor, DataProductionStrategy,
    SourceDataCooker, TableBuildAction, TableBuilder, TableDescriptor, TableProvider,
};

// Test module declaration
#[cfg(test)]
mod tests;
