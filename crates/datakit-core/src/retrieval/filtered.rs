use std::fmt;
use std::sync::{Arc, Weak};

use crate::extension::dependency::DependencyReferences;
use crate::extension::path::{DataOutputPath, DataProcessorId};
use crate::extension::reference::ExtensionKey;
use crate::extension::traits::{DataOutput, DataProcessor};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::factory::DataExtensionRetrievalFactory;
use crate::retrieval::DataExtensionRetrieval;

/// Retrieval limited to one extension's dependency closure.
///
/// Source cooker outputs are read from the run's cooked data. Composite
/// cookers and processors are materialized through the owning factory, each
/// with its own filtered retrieval.
pub struct FilteredDataRetrieval {
    factory: Weak<DataExtensionRetrievalFactory>,
    owner: ExtensionKey,
    dependency_references: DependencyReferences,
}

impl FilteredDataRetrieval {
    pub(crate) fn new(
        factory: Weak<DataExtensionRetrievalFactory>,
        owner: ExtensionKey,
        dependency_references: DependencyReferences,
    ) -> Self {
        Self {
            factory,
            owner,
            dependency_references,
        }
    }

    /// The extension this retrieval was created for.
    pub fn owner(&self) -> &ExtensionKey {
        &self.owner
    }

    pub fn dependency_references(&self) -> &DependencyReferences {
        &self.dependency_references
    }

    fn factory(&self) -> Result<Arc<DataExtensionRetrievalFactory>, RetrievalError> {
        self.factory.upgrade().ok_or(RetrievalError::ProcessingRunEnded)
    }

    fn undeclared(&self, dependency: String) -> RetrievalError {
        log::warn!("'{}' queried undeclared dependency '{}'", self.owner, dependency);
        RetrievalError::UndeclaredDependency {
            requester: self.owner.to_string(),
            dependency,
        }
    }
}

impl DataExtensionRetrieval for FilteredDataRetrieval {
    fn query_output_raw(&self, path: &DataOutputPath) -> Result<DataOutput, RetrievalError> {
        let cooker_path = path.cooker_path();
        if !self.dependency_references.contains_cooker(cooker_path) {
            return Err(self.undeclared(cooker_path.to_string()));
        }
        let factory = self.factory()?;

        if cooker_path.is_source() {
            return factory.cooked_data().query_output(path);
        }

        let cooker = factory.materialize_composite_data_cooker(cooker_path)?;
        cooker
            .query_output(path.output_id())
            .ok_or_else(|| RetrievalError::OutputNotFound { path: path.to_string() })
    }

    fn query_data_processor(&self, id: &DataProcessorId) -> Result<Arc<dyn DataProcessor>, RetrievalError> {
        if !self.dependency_references.contains_processor(id) {
            return Err(self.undeclared(id.to_string()));
        }
        self.factory()?.materialize_data_processor(id)
    }
}

impl fmt::Debug for FilteredDataRetrieval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredDataRetrieval")
            .field("owner", &self.owner)
            .field("dependency_references", &self.dependency_references)
            .field("run_active", &(self.factory.strong_count() > 0))
            .finish()
    }
}
