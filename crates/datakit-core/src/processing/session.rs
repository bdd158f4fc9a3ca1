use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::extension::path::{DataCookerPath, DataKey};
use crate::extension::repository::ExtensionRepository;
use crate::extension::reference::ExtensionKey;
use crate::extension::traits::SourceDataCooker;
use crate::processing::cancellation::CancellationToken;
use crate::processing::cooked::CookedSourceData;
use crate::processing::element::{DataElement, DataProcessingResult, ElementContext};
use crate::processing::error::ProcessingError;

/// Lifecycle of a [`SourceProcessingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Created,
    CookersSet,
    Registered,
    /// Setup is complete; elements may be processed.
    Prepared,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Created => write!(f, "Created"),
            SessionPhase::CookersSet => write!(f, "CookersSet"),
            SessionPhase::Registered => write!(f, "Registered"),
            SessionPhase::Prepared => write!(f, "Prepared"),
            SessionPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Routes one source parser's data elements to its active source cookers.
///
/// Setup runs exactly once, in order: [`set_active_data_cookers`](Self::set_active_data_cookers),
/// [`register_cookers`](Self::register_cookers),
/// [`prepare_for_processing`](Self::prepare_for_processing). After that
/// [`process_data_element`](Self::process_data_element) may be called any
/// number of times, serially.
pub struct SourceProcessingSession {
    source_parser_id: String,
    phase: SessionPhase,
    cookers: Vec<Box<dyn SourceDataCooker>>,
    /// Indices into `cookers`, per subscribed key.
    keyed_cookers: HashMap<DataKey, Vec<usize>>,
    receive_all_cookers: Vec<usize>,
}

impl SourceProcessingSession {
    pub fn new(source_parser_id: &str) -> Self {
        Self {
            source_parser_id: source_parser_id.to_string(),
            phase: SessionPhase::Created,
            cookers: Vec::new(),
            keyed_cookers: HashMap::new(),
            receive_all_cookers: Vec::new(),
        }
    }

    pub fn source_parser_id(&self) -> &str {
        &self.source_parser_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Paths of the active cookers, in activation order.
    pub fn active_data_cookers(&self) -> Vec<DataCookerPath> {
        self.cookers.iter().map(|c| c.path()).collect()
    }

    /// Keys with at least one subscribed cooker.
    pub fn registered_data_keys(&self) -> impl Iterator<Item = &DataKey> {
        self.keyed_cookers.keys()
    }

    pub fn receive_all_cooker_count(&self) -> usize {
        self.receive_all_cookers.len()
    }

    fn expect_phase(&self, operation: &'static str, expected: SessionPhase) -> Result<(), ProcessingError> {
        if self.phase != expected {
            return Err(ProcessingError::InvalidPhase {
                operation,
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn advance(&mut self, phase: SessionPhase) {
        log::debug!(
            "Source processing session '{}': {} -> {}",
            self.source_parser_id,
            self.phase,
            phase
        );
        self.phase = phase;
    }

    /// Choose the cookers that take part in this run.
    ///
    /// Every cooker must belong to this session's source parser, and each path
    /// may appear only once.
    pub fn set_active_data_cookers(&mut self, cookers: Vec<Box<dyn SourceDataCooker>>) -> Result<(), ProcessingError> {
        self.expect_phase("set active data cookers", SessionPhase::Created)?;

        let mut seen = HashSet::new();
        for cooker in &cookers {
            let path = cooker.path();
            if path.source_parser_id() != self.source_parser_id {
                return Err(ProcessingError::WrongSourceParser {
                    path: path.to_string(),
                    source_parser_id: self.source_parser_id.clone(),
                });
            }
            if !seen.insert(path.clone()) {
                return Err(ProcessingError::DuplicateCooker { path: path.to_string() });
            }
        }

        self.cookers = cookers;
        self.advance(SessionPhase::CookersSet);
        Ok(())
    }

    /// Instantiate the cookers at `paths` from `repository` and activate them.
    ///
    /// Each path must name an available source cooker of this parser.
    pub fn set_active_data_cookers_from_repository(
        &mut self,
        repository: &ExtensionRepository,
        paths: &[DataCookerPath],
    ) -> Result<(), ProcessingError> {
        self.expect_phase("set active data cookers", SessionPhase::Created)?;

        let mut cookers = Vec::with_capacity(paths.len());
        for path in paths {
            let reference = repository
                .get_source_data_cooker_reference(path)
                .ok_or_else(|| ProcessingError::CookerNotFound { path: path.to_string() })?;
            let availability = repository.availability(&ExtensionKey::SourceDataCooker(path.clone()));
            if !availability.is_available() {
                return Err(ProcessingError::CookerUnavailable {
                    path: path.to_string(),
                    availability,
                });
            }
            cookers.push(reference.create_instance());
        }
        self.set_active_data_cookers(cookers)
    }

    /// Build the key index from the active cookers.
    ///
    /// A cooker with no data keys, or with the receive-all option, is not
    /// indexed by key and instead receives every element.
    pub fn register_cookers(&mut self) -> Result<(), ProcessingError> {
        self.expect_phase("register cookers", SessionPhase::CookersSet)?;

        for (index, cooker) in self.cookers.iter().enumerate() {
            let keys = match cooker.data_keys() {
                Some(keys) if !cooker.options().receive_all_data_elements => keys,
                _ => {
                    self.receive_all_cookers.push(index);
                    continue;
                }
            };
            for key in keys {
                let subscribers = self.keyed_cookers.entry(key).or_default();
                if !subscribers.contains(&index) {
                    subscribers.push(index);
                }
            }
        }

        self.advance(SessionPhase::Registered);
        Ok(())
    }

    /// Let every active cooker set up before the first element.
    pub fn prepare_for_processing(&mut self, cancellation: &CancellationToken) -> Result<(), ProcessingError> {
        self.expect_phase("prepare for processing", SessionPhase::Registered)?;
        for cooker in &mut self.cookers {
            cooker.begin_data_cooking(cancellation);
        }
        self.advance(SessionPhase::Prepared);
        Ok(())
    }

    /// Hand one element to the cookers subscribed to its key, then to the receive-all cookers.
    ///
    /// Returns `CorruptData` as soon as any cooker reports it; no further
    /// cooker sees the element. Otherwise `Processed` if any cooker processed
    /// it, else `Ignored`.
    pub fn process_data_element(
        &mut self,
        data: &dyn DataElement,
        context: &ElementContext,
        cancellation: &CancellationToken,
    ) -> Result<DataProcessingResult, ProcessingError> {
        self.expect_phase("process data element", SessionPhase::Prepared)?;

        let SourceProcessingSession {
            source_parser_id,
            cookers,
            keyed_cookers,
            receive_all_cookers,
            ..
        } = self;

        let key = data.key();
        let keyed = keyed_cookers.get(key);
        if keyed.is_none() && receive_all_cookers.is_empty() {
            return Ok(DataProcessingResult::Ignored);
        }

        let mut processed = false;
        let subscribers = keyed.map(Vec::as_slice).unwrap_or_default();
        for &index in subscribers.iter().chain(receive_all_cookers.iter()) {
            let cooker = &mut cookers[index];
            match cooker.cook_data_element(data, context, cancellation) {
                DataProcessingResult::CorruptData => {
                    log::warn!(
                        "Source data cooker '{}' reported corrupt data for key '{}' from '{}'",
                        cooker.path(),
                        key,
                        source_parser_id
                    );
                    return Ok(DataProcessingResult::CorruptData);
                }
                DataProcessingResult::Processed => processed = true,
                DataProcessingResult::Ignored => {}
            }
        }

        Ok(if processed {
            DataProcessingResult::Processed
        } else {
            DataProcessingResult::Ignored
        })
    }

    /// Let every cooker finish once parsing is over.
    pub fn end_processing(&mut self, cancellation: &CancellationToken) -> Result<(), ProcessingError> {
        self.expect_phase("end processing", SessionPhase::Prepared)?;
        for cooker in &mut self.cookers {
            cooker.end_data_cooking(cancellation);
        }
        self.advance(SessionPhase::Completed);
        Ok(())
    }

    /// Hand the finished cookers over for querying.
    pub fn into_cooked_data(self) -> Result<CookedSourceData, ProcessingError> {
        self.expect_phase("collect cooked data", SessionPhase::Completed)?;
        let mut cooked = CookedSourceData::new();
        for cooker in self.cookers {
            cooked.insert(cooker);
        }
        Ok(cooked)
    }
}

impl fmt::Debug for SourceProcessingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceProcessingSession")
            .field("source_parser_id", &self.source_parser_id)
            .field("phase", &self.phase)
            .field("active_data_cookers", &self.active_data_cookers())
            .field("keyed_cookers", &self.keyed_cookers)
            .field("receive_all_cookers", &self.receive_all_cookers)
            .finish()
    }
}
