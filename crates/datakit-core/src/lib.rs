//! # datakit-core
//!
//! Extension runtime for datakit. Plugins contribute source data cookers,
//! composite data cookers, data processors and tables, each declaring the
//! extensions it depends on. This crate discovers those extensions, resolves
//! which of them are available, and gives each one a retrieval that can only
//! see what it declared.
pub mod config;
pub mod discovery;
pub mod extension;
pub mod kernel;
pub mod processing;
pub mod retrieval;

// Re-export key public types/traits for hosts and plugins
pub use config::{ConfigFormat, FinalizeMode, RuntimeConfig};
pub use discovery::{CatalogSubscriber, DataExtensionReflector, ExtensionCatalog, ExtensionTypeObserver};
pub use extension::{
    Availability, CompositeDataCooker, DataCooker, DataCookerOptions, DataCookerPath, DataKey, DataOutput,
    DataOutputPath, DataProcessor, DataProcessorId, DataProductionStrategy, ExtensionKey, ExtensionRepository,
    ExtensionType, SourceDataCooker, TableBuilder, TableDescriptor, TableProvider,
};
pub use kernel::error::{BoxError, Error, Result};
pub use processing::{
    CancellationToken, CookedSourceData, DataElement, DataProcessingResult, ElementContext, ProcessingPlan,
    SourceProcessingSession,
};
pub use retrieval::{
    CookedDataRetrieval, DataExtensionRetrieval, DataExtensionRetrievalFactory, FilteredDataRetrieval, QueryOutputExt,
};

// Shared mocks and cross-module tests
#[cfg(test)]
mod tests;
