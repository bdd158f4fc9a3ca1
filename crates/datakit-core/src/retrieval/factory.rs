use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use uuid::Uuid;

use crate::extension::availability::Availability;
use crate::extension::dependency::DependencyReferences;
use crate::extension::path::{DataCookerPath, DataProcessorId};
use crate::extension::reference::{DataExtensionReference, ExtensionKey, ExtensionKind};
use crate::extension::repository::ExtensionRepository;
use crate::extension::traits::{CompositeDataCooker, DataProcessor, TableBuilder};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::filtered::FilteredDataRetrieval;
use crate::retrieval::{CookedDataRetrieval, DataExtensionRetrieval};

type CompositeSlot = Arc<OnceLock<Result<Arc<dyn CompositeDataCooker>, RetrievalError>>>;
type ProcessorSlot = Arc<OnceLock<Result<Arc<dyn DataProcessor>, RetrievalError>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands out scoped retrievals for one processing run.
///
/// The factory is always held in an `Arc`; the retrievals it creates keep a
/// weak handle back to it and stop answering once the run's factory is dropped.
pub struct DataExtensionRetrievalFactory {
    this: Weak<DataExtensionRetrievalFactory>,
    repository: Arc<ExtensionRepository>,
    cooked_data: Arc<dyn CookedDataRetrieval>,
    composite_retrievals: Mutex<HashMap<DataCookerPath, Arc<FilteredDataRetrieval>>>,
    processor_retrievals: Mutex<HashMap<DataProcessorId, Arc<FilteredDataRetrieval>>>,
    table_retrievals: Mutex<HashMap<Uuid, Arc<FilteredDataRetrieval>>>,
    composite_cookers: Mutex<HashMap<DataCookerPath, CompositeSlot>>,
    data_processors: Mutex<HashMap<DataProcessorId, ProcessorSlot>>,
}

impl DataExtensionRetrievalFactory {
    pub fn new(repository: Arc<ExtensionRepository>, cooked_data: Arc<dyn CookedDataRetrieval>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            repository,
            cooked_data,
            composite_retrievals: Mutex::new(HashMap::new()),
            processor_retrievals: Mutex::new(HashMap::new()),
            table_retrievals: Mutex::new(HashMap::new()),
            composite_cookers: Mutex::new(HashMap::new()),
            data_processors: Mutex::new(HashMap::new()),
        })
    }

    pub fn repository(&self) -> &Arc<ExtensionRepository> {
        &self.repository
    }

    pub(crate) fn cooked_data(&self) -> &dyn CookedDataRetrieval {
        self.cooked_data.as_ref()
    }

    /// Scoped retrieval for the composite cooker at `path`.
    ///
    /// Repeated calls for the same path return the same instance.
    pub fn create_data_retrieval_for_composite_data_cooker(
        &self,
        path: &DataCookerPath,
    ) -> Result<Arc<FilteredDataRetrieval>, RetrievalError> {
        let key = ExtensionKey::CompositeDataCooker(path.clone());
        self.cached_retrieval(&self.composite_retrievals, path, &key)
    }

    /// Scoped retrieval for the data processor `id`.
    pub fn create_data_retrieval_for_data_processor(
        &self,
        id: &DataProcessorId,
    ) -> Result<Arc<FilteredDataRetrieval>, RetrievalError> {
        let key = ExtensionKey::DataProcessor(id.clone());
        self.cached_retrieval(&self.processor_retrievals, id, &key)
    }

    /// Scoped retrieval for the table `guid`.
    pub fn create_data_retrieval_for_table(&self, guid: &Uuid) -> Result<Arc<FilteredDataRetrieval>, RetrievalError> {
        let key = ExtensionKey::Table(*guid);
        self.cached_retrieval(&self.table_retrievals, guid, &key)
    }

    fn cached_retrieval<K>(
        &self,
        cache: &Mutex<HashMap<K, Arc<FilteredDataRetrieval>>>,
        cache_key: &K,
        key: &ExtensionKey,
    ) -> Result<Arc<FilteredDataRetrieval>, RetrievalError>
    where
        K: Eq + Hash + Clone,
    {
        let dependency_references = self.available_closure(key)?;
        let mut retrievals = lock(cache);
        let retrieval = retrievals.entry(cache_key.clone()).or_insert_with(|| {
            log::debug!("Creating filtered data retrieval for '{}'", key);
            Arc::new(FilteredDataRetrieval::new(
                self.this.clone(),
                key.clone(),
                dependency_references,
            ))
        });
        Ok(Arc::clone(retrieval))
    }

    fn available_closure(&self, key: &ExtensionKey) -> Result<DependencyReferences, RetrievalError> {
        if !self.repository.contains(key) {
            return Err(RetrievalError::ExtensionNotFound {
                kind: key.kind(),
                identity: key.to_string(),
            });
        }
        match self.repository.dependency_state(key) {
            Some(state) if state.availability().is_available() => Ok(state.dependency_references().clone()),
            state => Err(RetrievalError::ExtensionUnavailable {
                kind: key.kind(),
                identity: key.to_string(),
                availability: state.map(|s| s.availability()).unwrap_or(Availability::Undetermined),
            }),
        }
    }

    /// The composite cooker at `path`, instantiated and fed on first request.
    ///
    /// A failed materialization is remembered; later requests see the same error.
    pub fn materialize_composite_data_cooker(
        &self,
        path: &DataCookerPath,
    ) -> Result<Arc<dyn CompositeDataCooker>, RetrievalError> {
        let slot = {
            let mut cookers = lock(&self.composite_cookers);
            Arc::clone(cookers.entry(path.clone()).or_default())
        };
        slot.get_or_init(|| self.build_composite_data_cooker(path)).clone()
    }

    /// The data processor `id`, instantiated and fed on first request.
    pub fn materialize_data_processor(&self, id: &DataProcessorId) -> Result<Arc<dyn DataProcessor>, RetrievalError> {
        let slot = {
            let mut processors = lock(&self.data_processors);
            Arc::clone(processors.entry(id.clone()).or_default())
        };
        slot.get_or_init(|| self.build_data_processor(id)).clone()
    }

    fn build_composite_data_cooker(
        &self,
        path: &DataCookerPath,
    ) -> Result<Arc<dyn CompositeDataCooker>, RetrievalError> {
        let retrieval = self.create_data_retrieval_for_composite_data_cooker(path)?;
        let reference = self
            .repository
            .get_composite_data_cooker_reference(path)
            .ok_or_else(|| RetrievalError::ExtensionNotFound {
                kind: ExtensionKind::CompositeDataCooker,
                identity: path.to_string(),
            })?;

        log::debug!("Materializing composite data cooker '{}'", path);
        let mut cooker = reference.create_instance();
        cooker.on_data_available(retrieval.as_ref()).map_err(|e| {
            log::error!("Composite data cooker '{}' failed: {}", path, e);
            RetrievalError::MaterializationFailed {
                kind: ExtensionKind::CompositeDataCooker,
                identity: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Arc::from(cooker))
    }

    fn build_data_processor(&self, id: &DataProcessorId) -> Result<Arc<dyn DataProcessor>, RetrievalError> {
        let retrieval = self.create_data_retrieval_for_data_processor(id)?;
        let reference = self
            .repository
            .get_data_processor_reference(id)
            .ok_or_else(|| RetrievalError::ExtensionNotFound {
                kind: ExtensionKind::DataProcessor,
                identity: id.to_string(),
            })?;

        log::debug!("Materializing data processor '{}'", id);
        let mut processor = reference.create_instance();
        processor.on_data_available(retrieval.as_ref()).map_err(|e| {
            log::error!("Data processor '{}' failed: {}", id, e);
            RetrievalError::MaterializationFailed {
                kind: ExtensionKind::DataProcessor,
                identity: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Arc::from(processor))
    }

    /// Run the build action of table `guid` against its scoped retrieval.
    pub fn build_table(&self, guid: &Uuid, builder: &mut dyn TableBuilder) -> Result<(), RetrievalError> {
        let retrieval = self.create_data_retrieval_for_table(guid)?;
        let reference = self
            .repository
            .get_table_reference(guid)
            .ok_or_else(|| RetrievalError::ExtensionNotFound {
                kind: ExtensionKind::Table,
                identity: guid.to_string(),
            })?;
        let build_action = reference.build_action().ok_or_else(|| RetrievalError::TableBuildFailed {
            identity: reference.name().to_string(),
            reason: "the table has no build action".to_string(),
        })?;

        log::debug!("Building table '{}' ({})", reference.name(), guid);
        let scoped: &dyn DataExtensionRetrieval = retrieval.as_ref();
        build_action(scoped, builder).map_err(|e| RetrievalError::TableBuildFailed {
            identity: reference.name().to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for DataExtensionRetrievalFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataExtensionRetrievalFactory")
            .field("repository", &self.repository)
            .field("composite_retrievals", &lock(&self.composite_retrievals).len())
            .field("processor_retrievals", &lock(&self.processor_retrievals).len())
            .field("table_retrievals", &lock(&self.table_retrievals).len())
            .finish_non_exhaustive()
    }
}
