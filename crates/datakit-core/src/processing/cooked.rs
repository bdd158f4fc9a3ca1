use std::collections::HashMap;
use std::fmt;

use crate::extension::path::{DataCookerPath, DataOutputPath};
use crate::extension::reference::ExtensionKind;
use crate::extension::traits::{DataOutput, SourceDataCooker};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::CookedDataRetrieval;

/// Finished source cookers from one or more sessions, queryable by output path.
#[derive(Default)]
pub struct CookedSourceData {
    cookers: HashMap<DataCookerPath, Box<dyn SourceDataCooker>>,
}

impl CookedSourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished cooker. The first cooker registered for a path is kept.
    pub fn insert(&mut self, cooker: Box<dyn SourceDataCooker>) -> bool {
        let path = cooker.path();
        if self.cookers.contains_key(&path) {
            log::warn!("Cooked data for '{}' already present; ignoring duplicate", path);
            return false;
        }
        self.cookers.insert(path, cooker);
        true
    }

    /// Fold in the cookers of another session, typically for another source parser.
    pub fn merge(&mut self, other: CookedSourceData) {
        for (_, cooker) in other.cookers {
            self.insert(cooker);
        }
    }

    pub fn contains(&self, path: &DataCookerPath) -> bool {
        self.cookers.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.cookers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookers.is_empty()
    }
}

impl CookedDataRetrieval for CookedSourceData {
    fn query_output(&self, path: &DataOutputPath) -> Result<DataOutput, RetrievalError> {
        let cooker = self
            .cookers
            .get(path.cooker_path())
            .ok_or_else(|| RetrievalError::ExtensionNotFound {
                kind: ExtensionKind::SourceDataCooker,
                identity: path.cooker_path().to_string(),
            })?;
        cooker
            .query_output(path.output_id())
            .ok_or_else(|| RetrievalError::OutputNotFound { path: path.to_string() })
    }
}

impl fmt::Debug for CookedSourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.cookers.keys().map(|p| p.to_string()).collect();
        paths.sort();
        f.debug_struct("CookedSourceData").field("cookers", &paths).finish()
    }
}
