use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::extension::path::{DataCookerPath, DataKey, DataProcessorId};
use crate::kernel::error::BoxError;
use crate::processing::cancellation::CancellationToken;
use crate::processing::element::{DataElement, DataProcessingResult, ElementContext};
use crate::retrieval::DataExtensionRetrieval;

/// A value published by a cooker or processor under an output id.
pub type DataOutput = Arc<dyn Any + Send + Sync>;

/// Options a source cooker declares to its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataCookerOptions {
    /// Receive every element regardless of its key.
    pub receive_all_data_elements: bool,
}

impl DataCookerOptions {
    pub const NONE: DataCookerOptions = DataCookerOptions { receive_all_data_elements: false };
    pub const RECEIVE_ALL: DataCookerOptions = DataCookerOptions { receive_all_data_elements: true };
}

/// When a source cooker's output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataProductionStrategy {
    /// Cooked while the source is parsed; output is ready once parsing ends.
    #[default]
    PostSourceParsing,
    /// Cooked only when some consumer asks for it.
    AsRequired,
}

impl fmt::Display for DataProductionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataProductionStrategy::PostSourceParsing => write!(f, "PostSourceParsing"),
            DataProductionStrategy::AsRequired => write!(f, "AsRequired"),
        }
    }
}

/// Common surface of every data cooker.
pub trait DataCooker: Send + Sync {
    /// The path identifying this cooker
    fn path(&self) -> DataCookerPath;

    fn description(&self) -> &str {
        ""
    }

    /// Cookers whose output this cooker consumes
    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        vec![]
    }

    /// Processors this cooker consumes
    fn required_data_processors(&self) -> Vec<DataProcessorId> {
        vec![]
    }

    /// Ids of the outputs this cooker publishes
    fn output_ids(&self) -> Vec<String>;

    /// Fetch a published output by id
    fn query_output(&self, output_id: &str) -> Option<DataOutput>;
}

/// A cooker bound to a single source parser's element stream.
pub trait SourceDataCooker: DataCooker {
    /// Keys this cooker subscribes to. `None` means every element.
    fn data_keys(&self) -> Option<Vec<DataKey>>;

    fn options(&self) -> DataCookerOptions {
        DataCookerOptions::NONE
    }

    fn production_strategy(&self) -> DataProductionStrategy {
        DataProductionStrategy::PostSourceParsing
    }

    /// Called once before the first element is delivered.
    fn begin_data_cooking(&mut self, _cancellation: &CancellationToken) {}

    /// Consume one element.
    fn cook_data_element(
        &mut self,
        data: &dyn DataElement,
        context: &ElementContext,
        cancellation: &CancellationToken,
    ) -> DataProcessingResult;

    /// Called once after the last element is delivered.
    fn end_data_cooking(&mut self, _cancellation: &CancellationToken) {}
}

/// A cooker fed by the outputs of other cookers rather than a parser.
pub trait CompositeDataCooker: DataCooker {
    /// Called once with a retrieval scoped to this cooker's declared dependencies.
    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError>;
}

/// Produces a queryable result from cooker and processor outputs.
pub trait DataProcessor: Send + Sync {
    fn id(&self) -> DataProcessorId;

    fn description(&self) -> &str {
        ""
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        vec![]
    }

    fn required_data_processors(&self) -> Vec<DataProcessorId> {
        vec![]
    }

    /// Called once with a retrieval scoped to this processor's declared dependencies.
    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError>;

    fn output_ids(&self) -> Vec<String> {
        vec![]
    }

    fn query_output(&self, _output_id: &str) -> Option<DataOutput> {
        None
    }
}

/// Static metadata describing a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub guid: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub required_data_cookers: Vec<DataCookerPath>,
    pub required_data_processors: Vec<DataProcessorId>,
    /// Built only by its owning processor; not enumerable on its own.
    pub is_internal_table: bool,
    pub is_metadata_table: bool,
}

impl TableDescriptor {
    pub fn new(guid: Uuid, name: &str) -> Self {
        Self {
            guid,
            name: name.to_string(),
            description: String::new(),
            category: String::new(),
            required_data_cookers: Vec::new(),
            required_data_processors: Vec::new(),
            is_internal_table: false,
            is_metadata_table: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn requiring_cooker(mut self, path: DataCookerPath) -> Self {
        self.required_data_cookers.push(path);
        self
    }

    pub fn requiring_processor(mut self, id: DataProcessorId) -> Self {
        self.required_data_processors.push(id);
        self
    }

    pub fn internal(mut self) -> Self {
        self.is_internal_table = true;
        self
    }

    pub fn metadata(mut self) -> Self {
        self.is_metadata_table = true;
        self
    }
}

/// Receives the columns and rows a table build produces.
pub trait TableBuilder {
    fn set_row_count(&mut self, rows: usize);
    fn add_column(&mut self, name: &str);
}

/// Callback that fills a [`TableBuilder`] from a scoped retrieval.
pub type TableBuildAction =
    Arc<dyn Fn(&dyn DataExtensionRetrieval, &mut dyn TableBuilder) -> Result<(), BoxError> + Send + Sync>;

/// Declares a table statically on a Rust type.
pub trait TableProvider: 'static {
    fn descriptor() -> TableDescriptor;

    fn build_table(retrieval: &dyn DataExtensionRetrieval, builder: &mut dyn TableBuilder) -> Result<(), BoxError>;
}
