use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::extension::availability::Availability;
use crate::extension::path::{DataCookerPath, DataProcessorId};
use crate::extension::reference::ExtensionKey;
use crate::extension::repository::ExtensionRepository;

/// The source cookers a run must activate, per source parser, to serve a set of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingPlan {
    source_data_cookers: BTreeMap<String, BTreeSet<DataCookerPath>>,
    unavailable: Vec<(ExtensionKey, Availability)>,
}

impl ProcessingPlan {
    /// Plan for the given tables, processors and composite cookers.
    ///
    /// Targets that are not available cannot be served; they are listed in
    /// [`unavailable`](Self::unavailable) and contribute no cookers.
    pub fn for_targets(
        repository: &ExtensionRepository,
        tables: &[Uuid],
        processors: &[DataProcessorId],
        composites: &[DataCookerPath],
    ) -> Self {
        let targets = tables
            .iter()
            .map(|guid| ExtensionKey::Table(*guid))
            .chain(processors.iter().map(|id| ExtensionKey::DataProcessor(id.clone())))
            .chain(composites.iter().map(|path| ExtensionKey::CompositeDataCooker(path.clone())));

        let mut plan = ProcessingPlan::default();
        for key in targets {
            let state = match repository.dependency_state(&key) {
                Some(state) if state.availability().is_available() => state,
                _ => {
                    let availability = repository.availability(&key);
                    log::warn!("Cannot plan for '{}': {}", key, availability);
                    plan.unavailable.push((key, availability));
                    continue;
                }
            };
            for path in state.dependency_references().required_source_data_cooker_paths() {
                plan.source_data_cookers
                    .entry(path.source_parser_id().to_string())
                    .or_default()
                    .insert(path.clone());
            }
        }
        plan
    }

    pub fn source_parser_ids(&self) -> impl Iterator<Item = &str> {
        self.source_data_cookers.keys().map(String::as_str)
    }

    /// Cookers to activate for `source_parser_id`, in path order.
    pub fn source_data_cookers_for(&self, source_parser_id: &str) -> Vec<DataCookerPath> {
        self.source_data_cookers
            .get(source_parser_id)
            .map(|paths| paths.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Targets that could not be planned, with their availability.
    pub fn unavailable(&self) -> &[(ExtensionKey, Availability)] {
        &self.unavailable
    }

    pub fn is_empty(&self) -> bool {
        self.source_data_cookers.is_empty()
    }
}
