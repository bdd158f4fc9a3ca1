//! Dependency state engine.
//!
//! Resolution is a depth-first walk over the reference graph. States are kept
//! out-of-line in a map keyed by [`ExtensionKey`], and each state carries a
//! visit marker so a dependency found "in progress" is reported as a cycle.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::extension::availability::Availability;
use crate::extension::path::{DataCookerPath, DataProcessorId};
use crate::extension::reference::{
    CompositeDataCookerReference, DataExtensionReference, DataProcessorReference, DependencyTarget, ExtensionKey,
    SourceDataCookerReference,
};

/// The flattened, de-duplicated set of extensions a reference may query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReferences {
    required_source_data_cooker_paths: BTreeSet<DataCookerPath>,
    required_composite_data_cooker_paths: BTreeSet<DataCookerPath>,
    required_data_processor_ids: BTreeSet<DataProcessorId>,
}

impl DependencyReferences {
    pub fn required_source_data_cooker_paths(&self) -> &BTreeSet<DataCookerPath> {
        &self.required_source_data_cooker_paths
    }

    pub fn required_composite_data_cooker_paths(&self) -> &BTreeSet<DataCookerPath> {
        &self.required_composite_data_cooker_paths
    }

    pub fn required_data_processor_ids(&self) -> &BTreeSet<DataProcessorId> {
        &self.required_data_processor_ids
    }

    /// Whether `path` is in the closure, checking the set its parser id selects.
    pub fn contains_cooker(&self, path: &DataCookerPath) -> bool {
        if path.is_source() {
            self.required_source_data_cooker_paths.contains(path)
        } else {
            self.required_composite_data_cooker_paths.contains(path)
        }
    }

    pub fn contains_processor(&self, id: &DataProcessorId) -> bool {
        self.required_data_processor_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.required_source_data_cooker_paths.is_empty()
            && self.required_composite_data_cooker_paths.is_empty()
            && self.required_data_processor_ids.is_empty()
    }

    /// Add one extension to the closure. Tables are never dependencies and are ignored.
    pub fn add(&mut self, key: &ExtensionKey) {
        match key {
            ExtensionKey::SourceDataCooker(path) => {
                self.required_source_data_cooker_paths.insert(path.clone());
            }
            ExtensionKey::CompositeDataCooker(path) => {
                self.required_composite_data_cooker_paths.insert(path.clone());
            }
            ExtensionKey::DataProcessor(id) => {
                self.required_data_processor_ids.insert(id.clone());
            }
            ExtensionKey::Table(_) => {}
        }
    }

    pub fn union_with(&mut self, other: &DependencyReferences) {
        self.required_source_data_cooker_paths
            .extend(other.required_source_data_cooker_paths.iter().cloned());
        self.required_composite_data_cooker_paths
            .extend(other.required_composite_data_cooker_paths.iter().cloned());
        self.required_data_processor_ids
            .extend(other.required_data_processor_ids.iter().cloned());
    }
}

/// Traversal marker used for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    #[default]
    NotVisited,
    InProgress,
    Visited,
}

/// Outcome of resolving one reference against its repository.
#[derive(Debug, Clone, Default)]
pub struct DependencyState {
    availability: Availability,
    dependency_references: DependencyReferences,
    errors: Vec<String>,
    visit: VisitState,
}

impl DependencyState {
    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// The closure. Empty unless the reference is available.
    pub fn dependency_references(&self) -> &DependencyReferences {
        &self.dependency_references
    }

    /// Errors found while resolving dependencies.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn visit_state(&self) -> VisitState {
        self.visit
    }
}

/// Borrowed view of the reference maps a resolver walks.
#[derive(Clone, Copy)]
pub(crate) struct ReferenceGraph<'r> {
    pub source_data_cookers: &'r HashMap<DataCookerPath, Arc<SourceDataCookerReference>>,
    pub composite_data_cookers: &'r HashMap<DataCookerPath, Arc<CompositeDataCookerReference>>,
    pub data_processors: &'r HashMap<DataProcessorId, Arc<DataProcessorReference>>,
}

impl<'r> ReferenceGraph<'r> {
    fn target(&self, key: &ExtensionKey) -> Option<DependencyTarget<'r>> {
        match key {
            ExtensionKey::SourceDataCooker(path) => {
                let source: &'r HashMap<_, _> = self.source_data_cookers;
                source.get(path).map(|r| DependencyTarget::SourceDataCooker(r.as_ref()))
            }
            ExtensionKey::CompositeDataCooker(path) => {
                let composite: &'r HashMap<_, _> = self.composite_data_cookers;
                composite.get(path).map(|r| DependencyTarget::CompositeDataCooker(r.as_ref()))
            }
            ExtensionKey::DataProcessor(id) => {
                let processors: &'r HashMap<_, _> = self.data_processors;
                processors.get(id).map(|r| DependencyTarget::DataProcessor(r.as_ref()))
            }
            ExtensionKey::Table(_) => None,
        }
    }
}

/// Walks the reference graph, writing one [`DependencyState`] per reference.
pub(crate) struct DependencyResolver<'r> {
    graph: ReferenceGraph<'r>,
    states: &'r mut HashMap<ExtensionKey, DependencyState>,
}

impl<'r> DependencyResolver<'r> {
    pub(crate) fn new(graph: ReferenceGraph<'r>, states: &'r mut HashMap<ExtensionKey, DependencyState>) -> Self {
        Self { graph, states }
    }

    /// Resolve `reference` and, depth-first, everything it requires.
    ///
    /// A reference already visited in this pass is left untouched.
    pub(crate) fn process_dependencies(&mut self, reference: &'r dyn DataExtensionReference) {
        let key = reference.key();
        let state = self.states.entry(key.clone()).or_default();
        if state.visit != VisitState::NotVisited {
            return;
        }

        // Static errors can never heal; skip the traversal entirely.
        if reference.initial_availability().is_error() {
            *state = DependencyState {
                availability: Availability::Error,
                dependency_references: DependencyReferences::default(),
                errors: Vec::new(),
                visit: VisitState::Visited,
            };
            return;
        }

        state.visit = VisitState::InProgress;

        let mut errors = Vec::new();
        let mut closure = DependencyReferences::default();

        for path in reference.required_data_cooker_paths() {
            self.resolve_dependency(reference, ExtensionKey::for_cooker(path), &mut errors, &mut closure);
        }
        for id in reference.required_data_processor_ids() {
            self.resolve_dependency(
                reference,
                ExtensionKey::DataProcessor(id.clone()),
                &mut errors,
                &mut closure,
            );
        }

        let availability = if errors.is_empty() {
            Availability::Available
        } else {
            for error in &errors {
                log::debug!("Dependency error on '{}': {}", key, error);
            }
            closure = DependencyReferences::default();
            Availability::Error
        };

        // The sentinel is cleared whatever the outcome.
        self.states.insert(
            key,
            DependencyState {
                availability,
                dependency_references: closure,
                errors,
                visit: VisitState::Visited,
            },
        );
    }

    fn resolve_dependency(
        &mut self,
        reference: &'r dyn DataExtensionReference,
        dependency_key: ExtensionKey,
        errors: &mut Vec<String>,
        closure: &mut DependencyReferences,
    ) {
        let target = match self.graph.target(&dependency_key) {
            Some(target) => target,
            None => {
                errors.push(format!(
                    "Required {} '{}' was not found",
                    dependency_key.kind(),
                    dependency_key
                ));
                return;
            }
        };

        let visit = self
            .states
            .get(&dependency_key)
            .map(|s| s.visit)
            .unwrap_or_default();
        match visit {
            VisitState::InProgress => {
                errors.push(format!(
                    "Cyclic dependency detected: '{}' requires '{}', which is already being resolved",
                    reference.key(),
                    dependency_key
                ));
            }
            VisitState::NotVisited => self.process_dependencies(target.reference()),
            VisitState::Visited => {}
        }

        errors.extend(reference.perform_additional_data_extension_validation(target));

        if visit == VisitState::InProgress {
            return;
        }
        match self.states.get(&dependency_key) {
            Some(state) if state.availability.is_available() => {
                closure.union_with(&state.dependency_references);
                closure.add(&dependency_key);
            }
            _ => {
                errors.push(format!(
                    "Required {} '{}' is not available",
                    dependency_key.kind(),
                    dependency_key
                ));
            }
        }
    }
}
