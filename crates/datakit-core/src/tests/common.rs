#![cfg(test)]

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::discovery::reflector::{DataExtensionReflector, ExtensionTypeObserver};
use crate::extension::descriptor::{DefaultTableDescriptorFactory, ExtensionType};
use crate::extension::path::{DataCookerPath, DataKey, DataOutputPath, DataProcessorId};
use crate::extension::repository::ExtensionRepository;
use crate::extension::traits::{
    CompositeDataCooker, DataCooker, DataCookerOptions, DataOutput, DataProcessor, DataProductionStrategy,
    SourceDataCooker, TableBuildAction, TableBuilder, TableDescriptor,
};
use crate::kernel::error::BoxError;
use crate::processing::cancellation::CancellationToken;
use crate::processing::element::{DataElement, DataProcessingResult, ElementContext};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::{CookedDataRetrieval, DataExtensionRetrieval, QueryOutputExt};

// ===== IDENTITY HELPERS =====

pub fn source_path(parser: &str, cooker: &str) -> DataCookerPath {
    DataCookerPath::for_source(parser, cooker).unwrap()
}

pub fn composite_path(cooker: &str) -> DataCookerPath {
    DataCookerPath::for_composite(cooker).unwrap()
}

pub fn processor_id(id: &str) -> DataProcessorId {
    DataProcessorId::new(id).unwrap()
}

pub fn output(cooker: &DataCookerPath, output_id: &str) -> DataOutputPath {
    cooker.output(output_id).unwrap()
}

// ===== MOCK SOURCE COOKER =====

/// Configurable source cooker. Clones share their counters.
#[derive(Clone)]
pub struct MockSourceCooker {
    pub path: DataCookerPath,
    pub required: Vec<DataCookerPath>,
    pub required_processors: Vec<DataProcessorId>,
    pub data_keys: Option<Vec<DataKey>>,
    pub options: DataCookerOptions,
    pub strategy: DataProductionStrategy,
    pub result: DataProcessingResult,
    pub calls: Arc<AtomicUsize>,
    pub begun: Arc<AtomicBool>,
    pub ended: Arc<AtomicBool>,
    processed: usize,
}

impl MockSourceCooker {
    pub fn new(parser: &str, cooker: &str) -> Self {
        Self {
            path: source_path(parser, cooker),
            required: Vec::new(),
            required_processors: Vec::new(),
            data_keys: Some(Vec::new()),
            options: DataCookerOptions::NONE,
            strategy: DataProductionStrategy::PostSourceParsing,
            result: DataProcessingResult::Processed,
            calls: Arc::new(AtomicUsize::new(0)),
            begun: Arc::new(AtomicBool::new(false)),
            ended: Arc::new(AtomicBool::new(false)),
            processed: 0,
        }
    }

    pub fn requiring(mut self, path: DataCookerPath) -> Self {
        self.required.push(path);
        self
    }

    pub fn requiring_processor(mut self, id: DataProcessorId) -> Self {
        self.required_processors.push(id);
        self
    }

    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.data_keys = Some(keys.iter().map(|k| DataKey::from(*k)).collect());
        self
    }

    pub fn without_keys(mut self) -> Self {
        self.data_keys = None;
        self
    }

    pub fn receive_all(mut self) -> Self {
        self.options = DataCookerOptions::RECEIVE_ALL;
        self
    }

    pub fn as_required(mut self) -> Self {
        self.strategy = DataProductionStrategy::AsRequired;
        self
    }

    pub fn returning(mut self, result: DataProcessingResult) -> Self {
        self.result = result;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn extension_type(&self) -> ExtensionType {
        let prototype = self.clone();
        ExtensionType::new(&format!("MockSourceCooker[{}]", self.path))
            .with_source_data_cooker(move || Box::new(prototype.clone()) as Box<dyn SourceDataCooker>)
    }
}

impl DataCooker for MockSourceCooker {
    fn path(&self) -> DataCookerPath {
        self.path.clone()
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        self.required.clone()
    }

    fn required_data_processors(&self) -> Vec<DataProcessorId> {
        self.required_processors.clone()
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["count".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "count" => Some(Arc::new(self.processed)),
            _ => None,
        }
    }
}

impl SourceDataCooker for MockSourceCooker {
    fn data_keys(&self) -> Option<Vec<DataKey>> {
        self.data_keys.clone()
    }

    fn options(&self) -> DataCookerOptions {
        self.options
    }

    fn production_strategy(&self) -> DataProductionStrategy {
        self.strategy
    }

    fn begin_data_cooking(&mut self, _cancellation: &CancellationToken) {
        self.begun.store(true, Ordering::SeqCst);
    }

    fn cook_data_element(
        &mut self,
        _data: &dyn DataElement,
        _context: &ElementContext,
        _cancellation: &CancellationToken,
    ) -> DataProcessingResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.result == DataProcessingResult::Processed {
            self.processed += 1;
        }
        self.result
    }

    fn end_data_cooking(&mut self, _cancellation: &CancellationToken) {
        self.ended.store(true, Ordering::SeqCst);
    }
}

// ===== MOCK COMPOSITE COOKER =====

/// Sums the `usize` outputs it is told to read; publishes the sum as `total`.
#[derive(Clone)]
pub struct MockCompositeCooker {
    pub path: DataCookerPath,
    pub required: Vec<DataCookerPath>,
    pub required_processors: Vec<DataProcessorId>,
    pub reads: Vec<DataOutputPath>,
    pub fail: bool,
    pub materialized: Arc<AtomicUsize>,
    total: usize,
}

impl MockCompositeCooker {
    pub fn new(cooker: &str) -> Self {
        Self {
            path: composite_path(cooker),
            required: Vec::new(),
            required_processors: Vec::new(),
            reads: Vec::new(),
            fail: false,
            materialized: Arc::new(AtomicUsize::new(0)),
            total: 0,
        }
    }

    /// Declare `path` as a dependency without reading it.
    pub fn requiring(mut self, path: DataCookerPath) -> Self {
        self.required.push(path);
        self
    }

    pub fn requiring_processor(mut self, id: DataProcessorId) -> Self {
        self.required_processors.push(id);
        self
    }

    /// Declare `output`'s cooker and read `output` when data becomes available.
    pub fn reading(mut self, output: DataOutputPath) -> Self {
        if !self.required.contains(output.cooker_path()) {
            self.required.push(output.cooker_path().clone());
        }
        self.reads.push(output);
        self
    }

    /// Read `output` without declaring its cooker.
    pub fn reading_undeclared(mut self, output: DataOutputPath) -> Self {
        self.reads.push(output);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn extension_type(&self) -> ExtensionType {
        let prototype = self.clone();
        ExtensionType::new(&format!("MockCompositeCooker[{}]", self.path))
            .with_composite_data_cooker(move || Box::new(prototype.clone()) as Box<dyn CompositeDataCooker>)
    }
}

impl DataCooker for MockCompositeCooker {
    fn path(&self) -> DataCookerPath {
        self.path.clone()
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        self.required.clone()
    }

    fn required_data_processors(&self) -> Vec<DataProcessorId> {
        self.required_processors.clone()
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["total".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "total" => Some(Arc::new(self.total)),
            _ => None,
        }
    }
}

impl CompositeDataCooker for MockCompositeCooker {
    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError> {
        self.materialized.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err("composite cooker failed on purpose".into());
        }
        for path in &self.reads {
            self.total += *retrieval.query_output::<usize>(path)?;
        }
        Ok(())
    }
}

// ===== MOCK DATA PROCESSOR =====

#[derive(Clone)]
pub struct MockProcessor {
    pub id: DataProcessorId,
    pub required: Vec<DataCookerPath>,
    pub required_processors: Vec<DataProcessorId>,
    pub reads: Vec<DataOutputPath>,
    pub materialized: Arc<AtomicUsize>,
    total: usize,
}

impl MockProcessor {
    pub fn new(id: &str) -> Self {
        Self {
            id: processor_id(id),
            required: Vec::new(),
            required_processors: Vec::new(),
            reads: Vec::new(),
            materialized: Arc::new(AtomicUsize::new(0)),
            total: 0,
        }
    }

    pub fn requiring(mut self, path: DataCookerPath) -> Self {
        self.required.push(path);
        self
    }

    pub fn requiring_processor(mut self, id: DataProcessorId) -> Self {
        self.required_processors.push(id);
        self
    }

    pub fn reading(mut self, output: DataOutputPath) -> Self {
        if !self.required.contains(output.cooker_path()) {
            self.required.push(output.cooker_path().clone());
        }
        self.reads.push(output);
        self
    }

    pub fn extension_type(&self) -> ExtensionType {
        let prototype = self.clone();
        ExtensionType::new(&format!("MockProcessor[{}]", self.id))
            .with_data_processor(move || Box::new(prototype.clone()) as Box<dyn DataProcessor>)
    }
}

impl DataProcessor for MockProcessor {
    fn id(&self) -> DataProcessorId {
        self.id.clone()
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        self.required.clone()
    }

    fn required_data_processors(&self) -> Vec<DataProcessorId> {
        self.required_processors.clone()
    }

    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError> {
        self.materialized.fetch_add(1, Ordering::SeqCst);
        for path in &self.reads {
            self.total += *retrieval.query_output::<usize>(path)?;
        }
        Ok(())
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["total".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "total" => Some(Arc::new(self.total)),
            _ => None,
        }
    }
}

// ===== TABLES =====

pub fn table_type(descriptor: TableDescriptor, build_action: Option<TableBuildAction>) -> ExtensionType {
    ExtensionType::new(&format!("MockTable[{}]", descriptor.name)).with_table(Some(descriptor), build_action)
}

/// A build action that reads one `usize` output and emits that many rows.
pub fn rows_from(output: DataOutputPath) -> TableBuildAction {
    Arc::new(move |retrieval: &dyn DataExtensionRetrieval, builder: &mut dyn TableBuilder| -> Result<(), BoxError> {
        let rows = retrieval.query_output::<usize>(&output)?;
        builder.add_column("value");
        builder.set_row_count(*rows);
        Ok(())
    })
}

#[derive(Debug, Default)]
pub struct RecordingTableBuilder {
    pub rows: usize,
    pub columns: Vec<String>,
}

impl TableBuilder for RecordingTableBuilder {
    fn set_row_count(&mut self, rows: usize) {
        self.rows = rows;
    }

    fn add_column(&mut self, name: &str) {
        self.columns.push(name.to_string());
    }
}

// ===== ELEMENTS & COOKED DATA =====

pub struct MockElement {
    pub key: String,
}

impl MockElement {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_string() }
    }
}

impl DataElement for MockElement {
    fn key(&self) -> &str {
        &self.key
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fixed source cooker outputs, keyed by output path.
#[derive(Default)]
pub struct StaticCookedData {
    outputs: HashMap<DataOutputPath, DataOutput>,
}

impl StaticCookedData {
    pub fn with(mut self, path: DataOutputPath, value: usize) -> Self {
        self.outputs.insert(path, Arc::new(value));
        self
    }
}

impl CookedDataRetrieval for StaticCookedData {
    fn query_output(&self, path: &DataOutputPath) -> Result<DataOutput, RetrievalError> {
        self.outputs
            .get(path)
            .cloned()
            .ok_or_else(|| RetrievalError::OutputNotFound { path: path.to_string() })
    }
}

// ===== REPOSITORY SETUP =====

/// Discover `types` into a fresh repository and finalize it.
pub fn finalized_repository(types: Vec<ExtensionType>) -> ExtensionRepository {
    let mut repository = ExtensionRepository::new();
    let config = RuntimeConfig::default();
    let mut reflector = DataExtensionReflector::new(&mut repository, &config, &DefaultTableDescriptorFactory);
    for extension_type in &types {
        reflector.process_type(extension_type, "test");
    }
    reflector.discovery_complete();
    repository
}
