//! # Datakit Data Retrieval
//!
//! Capability-scoped access to extension outputs.
//!
//! Every composite cooker, data processor and table gets its own
//! [`FilteredDataRetrieval`], which answers queries only for the extensions in
//! that node's dependency closure. The [`DataExtensionRetrievalFactory`] hands
//! these out, caches them per key for the lifetime of one processing run, and
//! lazily materializes composite cookers and processors on first use.
//!
//! - **[`factory`]**: [`DataExtensionRetrievalFactory`].
//! - **[`filtered`]**: [`FilteredDataRetrieval`].
//! - **[`error`]**: [`RetrievalError`].
use std::any::Any;
use std::sync::Arc;

use crate::extension::path::{DataOutputPath, DataProcessorId};
use crate::extension::traits::{DataOutput, DataProcessor};

pub mod error;
pub mod factory;
pub mod filtered;

pub use error::RetrievalError;
pub use factory::DataExtensionRetrievalFactory;
pub use filtered::FilteredDataRetrieval;

/// Read access to cooker outputs and processors, as seen by one extension.
pub trait DataExtensionRetrieval: Send + Sync {
    /// Fetch the output at `path` without type checking.
    fn query_output_raw(&self, path: &DataOutputPath) -> Result<DataOutput, RetrievalError>;

    /// Fetch a materialized data processor.
    fn query_data_processor(&self, id: &DataProcessorId) -> Result<Arc<dyn DataProcessor>, RetrievalError>;
}

/// Typed queries over any [`DataExtensionRetrieval`].
pub trait QueryOutputExt: DataExtensionRetrieval {
    /// Fetch the output at `path` as a `T`.
    fn query_output<T: Any + Send + Sync>(&self, path: &DataOutputPath) -> Result<Arc<T>, RetrievalError> {
        let output = self.query_output_raw(path)?;
        output.downcast::<T>().map_err(|_| RetrievalError::OutputTypeMismatch {
            path: path.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Fetch one output of a data processor as a `T`.
    fn query_processor_output<T: Any + Send + Sync>(
        &self,
        id: &DataProcessorId,
        output_id: &str,
    ) -> Result<Arc<T>, RetrievalError> {
        let processor = self.query_data_processor(id)?;
        let identity = format!("{}/{}", id, output_id);
        let output = processor
            .query_output(output_id)
            .ok_or_else(|| RetrievalError::OutputNotFound { path: identity.clone() })?;
        output.downcast::<T>().map_err(|_| RetrievalError::OutputTypeMismatch {
            path: identity,
            expected: std::any::type_name::<T>(),
        })
    }
}

impl<R: DataExtensionRetrieval + ?Sized> QueryOutputExt for R {}

/// Outputs of source cookers that a processing session already ran.
///
/// Implemented outside the retrieval layer, typically by
/// [`CookedSourceData`](crate::processing::cooked::CookedSourceData).
pub trait CookedDataRetrieval: Send + Sync {
    fn query_output(&self, path: &DataOutputPath) -> Result<DataOutput, RetrievalError>;
}
