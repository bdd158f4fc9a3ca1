//! # Extension References
//!
//! A reference wraps one discovered [`ExtensionType`](crate::extension::descriptor::ExtensionType)
//! and records its identity, the dependencies it declares, and the static
//! validation errors found while building it.
//!
//! - **[`source_cooker`]**: cookers bound to one source parser.
//! - **[`composite_cooker`]**: cookers fed by other cookers.
//! - **[`processor`]**: data processors.
//! - **[`table`]**: tables and their build callbacks.
//!
//! Dependency state is not stored on the reference. The
//! [`ExtensionRepository`](crate::extension::repository::ExtensionRepository)
//! keeps it out-of-line, keyed by [`ExtensionKey`].
use std::fmt;

use uuid::Uuid;

use crate::extension::availability::Availability;
use crate::extension::path::{DataCookerPath, DataProcessorId};

pub mod composite_cooker;
pub mod processor;
pub mod source_cooker;
pub mod table;

pub use composite_cooker::CompositeDataCookerReference;
pub use processor::DataProcessorReference;
pub use source_cooker::SourceDataCookerReference;
pub use table::TableExtensionReference;

/// The four kinds of data extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    SourceDataCooker,
    CompositeDataCooker,
    DataProcessor,
    Table,
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKind::SourceDataCooker => write!(f, "source data cooker"),
            ExtensionKind::CompositeDataCooker => write!(f, "composite data cooker"),
            ExtensionKind::DataProcessor => write!(f, "data processor"),
            ExtensionKind::Table => write!(f, "table"),
        }
    }
}

/// Natural identity of an extension inside a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKey {
    SourceDataCooker(DataCookerPath),
    CompositeDataCooker(DataCookerPath),
    DataProcessor(DataProcessorId),
    Table(Uuid),
}

impl ExtensionKey {
    /// Key for a cooker path, choosing source or composite by its parser id.
    pub fn for_cooker(path: &DataCookerPath) -> Self {
        if path.is_source() {
            ExtensionKey::SourceDataCooker(path.clone())
        } else {
            ExtensionKey::CompositeDataCooker(path.clone())
        }
    }

    pub fn kind(&self) -> ExtensionKind {
        match self {
            ExtensionKey::SourceDataCooker(_) => ExtensionKind::SourceDataCooker,
            ExtensionKey::CompositeDataCooker(_) => ExtensionKind::CompositeDataCooker,
            ExtensionKey::DataProcessor(_) => ExtensionKind::DataProcessor,
            ExtensionKey::Table(_) => ExtensionKind::Table,
        }
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKey::SourceDataCooker(path) | ExtensionKey::CompositeDataCooker(path) => write!(f, "{}", path),
            ExtensionKey::DataProcessor(id) => write!(f, "{}", id),
            ExtensionKey::Table(guid) => write!(f, "{}", guid),
        }
    }
}

/// Identity and static validation record shared by every reference kind.
#[derive(Debug, Clone)]
pub struct ReferenceCore {
    name: String,
    type_name: String,
    required_data_cooker_paths: Vec<DataCookerPath>,
    required_data_processor_ids: Vec<DataProcessorId>,
    errors: Vec<String>,
    initial_availability: Availability,
}

impl ReferenceCore {
    pub(crate) fn new(
        name: String,
        type_name: &str,
        required_data_cooker_paths: Vec<DataCookerPath>,
        required_data_processor_ids: Vec<DataProcessorId>,
    ) -> Self {
        Self {
            name,
            type_name: type_name.to_string(),
            required_data_cooker_paths,
            required_data_processor_ids,
            errors: Vec::new(),
            initial_availability: Availability::Available,
        }
    }

    /// Record a structural problem. The reference can never become available.
    pub(crate) fn add_error(&mut self, message: String) {
        log::debug!("Static validation error on '{}': {}", self.name, message);
        self.errors.push(message);
        self.initial_availability = Availability::Error;
    }
}

/// A resolved direct dependency, handed to kind-specific validation.
#[derive(Debug, Clone, Copy)]
pub enum DependencyTarget<'a> {
    SourceDataCooker(&'a SourceDataCookerReference),
    CompositeDataCooker(&'a CompositeDataCookerReference),
    DataProcessor(&'a DataProcessorReference),
}

impl<'a> DependencyTarget<'a> {
    pub fn key(&self) -> ExtensionKey {
        self.reference().key()
    }

    /// The dependency viewed through the common reference surface.
    pub fn reference(&self) -> &'a dyn DataExtensionReference {
        match *self {
            DependencyTarget::SourceDataCooker(r) => r,
            DependencyTarget::CompositeDataCooker(r) => r,
            DependencyTarget::DataProcessor(r) => r,
        }
    }
}

/// Common read surface of all reference kinds.
pub trait DataExtensionReference: Send + Sync {
    fn core(&self) -> &ReferenceCore;

    fn key(&self) -> ExtensionKey;

    fn name(&self) -> &str {
        &self.core().name
    }

    /// Name of the candidate type this reference was built from.
    fn extension_type_name(&self) -> &str {
        &self.core().type_name
    }

    fn required_data_cooker_paths(&self) -> &[DataCookerPath] {
        &self.core().required_data_cooker_paths
    }

    fn required_data_processor_ids(&self) -> &[DataProcessorId] {
        &self.core().required_data_processor_ids
    }

    /// Static validation errors. Dependency errors live on the dependency state.
    fn errors(&self) -> &[String] {
        &self.core().errors
    }

    fn initial_availability(&self) -> Availability {
        self.core().initial_availability
    }

    /// Apply the cross-kind rules for one resolved direct dependency.
    ///
    /// Returns every violation found; an empty list means the dependency is acceptable.
    fn perform_additional_data_extension_validation(&self, dependency: DependencyTarget<'_>) -> Vec<String>;
}
