use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::FinalizeMode;
use crate::extension::availability::Availability;
use crate::extension::dependency::{DependencyResolver, DependencyState, ReferenceGraph};
use crate::extension::path::{DataCookerPath, DataProcessorId};
use crate::extension::reference::{
    CompositeDataCookerReference, DataExtensionReference, DataProcessorReference, ExtensionKey,
    SourceDataCookerReference, TableExtensionReference,
};

/// Every discovered data extension, plus the dependency state computed for each.
///
/// References are shared behind `Arc`; cloning the repository yields an
/// isolated snapshot whose dependency states evolve independently.
#[derive(Clone, Default)]
pub struct ExtensionRepository {
    source_data_cookers: HashMap<DataCookerPath, Arc<SourceDataCookerReference>>,
    composite_data_cookers: HashMap<DataCookerPath, Arc<CompositeDataCookerReference>>,
    data_processors: HashMap<DataProcessorId, Arc<DataProcessorReference>>,
    tables: HashMap<Uuid, Arc<TableExtensionReference>>,
    states: HashMap<ExtensionKey, DependencyState>,
    finalize_mode: FinalizeMode,
}

impl ExtensionRepository {
    /// Create an empty repository using incremental finalization.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finalize_mode(finalize_mode: FinalizeMode) -> Self {
        Self {
            finalize_mode,
            ..Self::default()
        }
    }

    pub fn finalize_mode(&self) -> FinalizeMode {
        self.finalize_mode
    }

    /// Add a source cooker reference. Returns `false` if the path is already registered.
    pub fn add_source_data_cooker_reference(&mut self, reference: SourceDataCookerReference) -> bool {
        if self.source_data_cookers.contains_key(reference.path()) {
            log::debug!("Source data cooker '{}' already registered; keeping the first", reference.path());
            return false;
        }
        self.source_data_cookers
            .insert(reference.path().clone(), Arc::new(reference));
        true
    }

    /// Add a composite cooker reference. Returns `false` if the path is already registered.
    pub fn add_composite_data_cooker_reference(&mut self, reference: CompositeDataCookerReference) -> bool {
        if self.composite_data_cookers.contains_key(reference.path()) {
            log::debug!("Composite data cooker '{}' already registered; keeping the first", reference.path());
            return false;
        }
        self.composite_data_cookers
            .insert(reference.path().clone(), Arc::new(reference));
        true
    }

    /// Add a data processor reference. Returns `false` if the id is already registered.
    pub fn add_data_processor_reference(&mut self, reference: DataProcessorReference) -> bool {
        if self.data_processors.contains_key(reference.id()) {
            log::debug!("Data processor '{}' already registered; keeping the first", reference.id());
            return false;
        }
        self.data_processors.insert(reference.id().clone(), Arc::new(reference));
        true
    }

    /// Add a table reference. Returns `false` if the guid is already registered.
    pub fn add_table_extension_reference(&mut self, reference: TableExtensionReference) -> bool {
        if self.tables.contains_key(&reference.guid()) {
            log::debug!("Table '{}' already registered; keeping the first", reference.guid());
            return false;
        }
        self.tables.insert(reference.guid(), Arc::new(reference));
        true
    }

    pub fn get_source_data_cooker_reference(&self, path: &DataCookerPath) -> Option<&Arc<SourceDataCookerReference>> {
        self.source_data_cookers.get(path)
    }

    pub fn get_composite_data_cooker_reference(
        &self,
        path: &DataCookerPath,
    ) -> Option<&Arc<CompositeDataCookerReference>> {
        self.composite_data_cookers.get(path)
    }

    pub fn get_data_processor_reference(&self, id: &DataProcessorId) -> Option<&Arc<DataProcessorReference>> {
        self.data_processors.get(id)
    }

    /// Drop the build callback of table `guid`.
    ///
    /// Only the sole owner of the reference can release it. Returns `false` if
    /// the table is unknown or still shared with a snapshot or a running factory.
    pub fn release_table(&mut self, guid: &Uuid) -> bool {
        match self.tables.get_mut(guid).and_then(Arc::get_mut) {
            Some(reference) => {
                reference.release();
                log::debug!("Released build action of table '{}' ({})", reference.name(), guid);
                true
            }
            None => false,
        }
    }

    pub fn get_table_reference(&self, guid: &Uuid) -> Option<&Arc<TableExtensionReference>> {
        self.tables.get(guid)
    }

    /// Look up any reference by key.
    pub fn get_reference(&self, key: &ExtensionKey) -> Option<&dyn DataExtensionReference> {
        match key {
            ExtensionKey::SourceDataCooker(path) => self
                .source_data_cookers
                .get(path)
                .map(|r| r.as_ref() as &dyn DataExtensionReference),
            ExtensionKey::CompositeDataCooker(path) => self
                .composite_data_cookers
                .get(path)
                .map(|r| r.as_ref() as &dyn DataExtensionReference),
            ExtensionKey::DataProcessor(id) => self
                .data_processors
                .get(id)
                .map(|r| r.as_ref() as &dyn DataExtensionReference),
            ExtensionKey::Table(guid) => self
                .tables
                .get(guid)
                .map(|r| r.as_ref() as &dyn DataExtensionReference),
        }
    }

    pub fn contains(&self, key: &ExtensionKey) -> bool {
        self.get_reference(key).is_some()
    }

    pub fn source_data_cookers(&self) -> impl Iterator<Item = &Arc<SourceDataCookerReference>> {
        self.source_data_cookers.values()
    }

    /// Source cookers bound to `source_parser_id`.
    pub fn source_data_cookers_for_parser<'a>(
        &'a self,
        source_parser_id: &'a str,
    ) -> impl Iterator<Item = &'a Arc<SourceDataCookerReference>> + 'a {
        self.source_data_cookers
            .values()
            .filter(move |r| r.source_parser_id() == source_parser_id)
    }

    pub fn composite_data_cookers(&self) -> impl Iterator<Item = &Arc<CompositeDataCookerReference>> {
        self.composite_data_cookers.values()
    }

    pub fn data_processors(&self) -> impl Iterator<Item = &Arc<DataProcessorReference>> {
        self.data_processors.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableExtensionReference>> {
        self.tables.values()
    }

    /// Tables that may be listed on their own, i.e. everything but internal tables.
    pub fn enumerable_tables(&self) -> impl Iterator<Item = &Arc<TableExtensionReference>> {
        self.tables.values().filter(|t| !t.is_internal_table())
    }

    /// Total number of references of every kind.
    pub fn len(&self) -> usize {
        self.source_data_cookers.len()
            + self.composite_data_cookers.len()
            + self.data_processors.len()
            + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Availability of `key`. `Undetermined` for unknown or not yet finalized references.
    pub fn availability(&self, key: &ExtensionKey) -> Availability {
        self.states
            .get(key)
            .map(|s| s.availability())
            .unwrap_or_default()
    }

    pub fn dependency_state(&self, key: &ExtensionKey) -> Option<&DependencyState> {
        self.states.get(key)
    }

    /// Static and dependency errors recorded for `key`, in that order.
    pub fn errors(&self, key: &ExtensionKey) -> Vec<String> {
        let mut errors: Vec<String> = self
            .get_reference(key)
            .map(|r| r.errors().to_vec())
            .unwrap_or_default();
        if let Some(state) = self.states.get(key) {
            errors.extend(state.errors().iter().cloned());
        }
        errors
    }

    /// Resolve the dependency state of every reference currently held.
    ///
    /// Safe to call repeatedly as references are added. In
    /// [`FinalizeMode::Incremental`] available references keep their state and
    /// every other reference is recomputed; [`FinalizeMode::Full`] recomputes all.
    pub fn finalize_data_extensions(&mut self) {
        match self.finalize_mode {
            FinalizeMode::Full => self.states.clear(),
            FinalizeMode::Incremental => self.states.retain(|_, state| state.availability().is_available()),
        }

        let ExtensionRepository {
            source_data_cookers,
            composite_data_cookers,
            data_processors,
            tables,
            states,
            ..
        } = self;
        let source: &HashMap<_, _> = source_data_cookers;
        let composite: &HashMap<_, _> = composite_data_cookers;
        let processors: &HashMap<_, _> = data_processors;
        let tables: &HashMap<_, _> = tables;

        let graph = ReferenceGraph {
            source_data_cookers: source,
            composite_data_cookers: composite,
            data_processors: processors,
        };
        let mut resolver = DependencyResolver::new(graph, states);
        for reference in source.values() {
            resolver.process_dependencies(reference.as_ref());
        }
        for reference in composite.values() {
            resolver.process_dependencies(reference.as_ref());
        }
        for reference in processors.values() {
            resolver.process_dependencies(reference.as_ref());
        }
        for reference in tables.values() {
            resolver.process_dependencies(reference.as_ref());
        }

        let available = self.states.values().filter(|s| s.availability().is_available()).count();
        log::info!(
            "Finalized {} data extensions: {} available, {} in error",
            self.states.len(),
            available,
            self.states.len() - available
        );
    }
}

impl fmt::Debug for ExtensionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRepository")
            .field("source_data_cookers", &self.source_data_cookers.len())
            .field("composite_data_cookers", &self.composite_data_cookers.len())
            .field("data_processors", &self.data_processors.len())
            .field("tables", &self.tables.len())
            .field("finalize_mode", &self.finalize_mode)
            .finish()
    }
}
