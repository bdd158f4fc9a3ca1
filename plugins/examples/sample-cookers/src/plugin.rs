//! Example data extensions over a simple log line source.
//!
//! The `Log` source parser emits one [`LogLine`] per line, keyed by level.
//! Two source cookers consume those lines, a composite cooker rolls them up,
//! a data processor reports on the rollup and a table lists the level counts.
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use datakit_core::{
    BoxError, CancellationToken, CompositeDataCooker, DataCooker, DataCookerPath, DataElement, DataExtensionRetrieval,
    DataKey, DataOutput, DataOutputPath, DataProcessingResult, DataProcessor, DataProcessorId, ElementContext,
    ExtensionType, QueryOutputExt, SourceDataCooker, TableBuilder, TableDescriptor, TableProvider,
};
use uuid::Uuid;

/// Id of the source parser these cookers belong to
pub const LOG_PARSER_ID: &str = "Log";

/// Table listing one row per log level
pub const LEVEL_TABLE_GUID: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b0_4d5e_8a71_c0de_10a1_7ab1);

/// One parsed log line.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: String,
    pub message: String,
}

impl LogLine {
    pub fn new(level: &str, message: &str) -> Self {
        Self {
            level: level.to_string(),
            message: message.to_string(),
        }
    }
}

impl DataElement for LogLine {
    fn key(&self) -> &str {
        &self.level
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn path(parser: &str, cooker: &str) -> DataCookerPath {
    DataCookerPath::for_source(parser, cooker).expect("static cooker path is valid")
}

fn composite(cooker: &str) -> DataCookerPath {
    DataCookerPath::for_composite(cooker).expect("static cooker path is valid")
}

fn output(cooker: DataCookerPath, output_id: &str) -> DataOutputPath {
    cooker.output(output_id).expect("static output path is valid")
}

pub fn level_counts_path() -> DataCookerPath {
    path(LOG_PARSER_ID, "LevelCounts")
}

pub fn errors_path() -> DataCookerPath {
    path(LOG_PARSER_ID, "Errors")
}

pub fn summary_path() -> DataCookerPath {
    composite("Summary")
}

pub fn error_report_id() -> DataProcessorId {
    DataProcessorId::new("ErrorReport").expect("static processor id is valid")
}

// ===== SOURCE COOKERS =====

/// Counts lines per level.
#[derive(Debug, Default)]
pub struct LevelCountsCooker {
    counts: BTreeMap<String, usize>,
}

impl DataCooker for LevelCountsCooker {
    fn path(&self) -> DataCookerPath {
        level_counts_path()
    }

    fn description(&self) -> &str {
        "Number of log lines per level"
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["counts".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "counts" => Some(Arc::new(self.counts.clone())),
            _ => None,
        }
    }
}

impl SourceDataCooker for LevelCountsCooker {
    fn data_keys(&self) -> Option<Vec<DataKey>> {
        Some(["debug", "info", "warn", "error"].into_iter().map(DataKey::from).collect())
    }

    fn cook_data_element(
        &mut self,
        data: &dyn DataElement,
        _context: &ElementContext,
        cancellation: &CancellationToken,
    ) -> DataProcessingResult {
        if cancellation.is_cancelled() {
            return DataProcessingResult::Ignored;
        }
        *self.counts.entry(data.key().to_string()).or_default() += 1;
        DataProcessingResult::Processed
    }
}

/// Collects error messages. An error line without a message is corrupt.
#[derive(Debug, Default)]
pub struct ErrorsCooker {
    messages: Vec<String>,
}

impl DataCooker for ErrorsCooker {
    fn path(&self) -> DataCookerPath {
        errors_path()
    }

    fn description(&self) -> &str {
        "Messages of error lines"
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["messages".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "messages" => Some(Arc::new(self.messages.clone())),
            _ => None,
        }
    }
}

impl SourceDataCooker for ErrorsCooker {
    fn data_keys(&self) -> Option<Vec<DataKey>> {
        Some(vec![DataKey::from("error")])
    }

    fn cook_data_element(
        &mut self,
        data: &dyn DataElement,
        _context: &ElementContext,
        _cancellation: &CancellationToken,
    ) -> DataProcessingResult {
        let Some(line) = data.as_any().downcast_ref::<LogLine>() else {
            return DataProcessingResult::Ignored;
        };
        if line.message.trim().is_empty() {
            log::warn!("Error line without a message");
            return DataProcessingResult::CorruptData;
        }
        self.messages.push(line.message.clone());
        DataProcessingResult::Processed
    }
}

// ===== COMPOSITE COOKER =====

/// Totals across levels, plus the first error seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub total_lines: usize,
    pub error_lines: usize,
    pub first_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct SummaryCooker {
    summary: LogSummary,
}

impl DataCooker for SummaryCooker {
    fn path(&self) -> DataCookerPath {
        summary_path()
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        vec![level_counts_path(), errors_path()]
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["summary".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "summary" => Some(Arc::new(self.summary.clone())),
            _ => None,
        }
    }
}

impl CompositeDataCooker for SummaryCooker {
    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError> {
        let counts = retrieval.query_output::<BTreeMap<String, usize>>(&output(level_counts_path(), "counts"))?;
        let messages = retrieval.query_output::<Vec<String>>(&output(errors_path(), "messages"))?;
        self.summary = LogSummary {
            total_lines: counts.values().sum(),
            error_lines: messages.len(),
            first_error: messages.first().cloned(),
        };
        Ok(())
    }
}

// ===== DATA PROCESSOR =====

/// Renders a one-line report from the summary.
#[derive(Debug, Default)]
pub struct ErrorReportProcessor {
    report: String,
}

impl DataProcessor for ErrorReportProcessor {
    fn id(&self) -> DataProcessorId {
        error_report_id()
    }

    fn description(&self) -> &str {
        "Human readable error report"
    }

    fn required_data_cookers(&self) -> Vec<DataCookerPath> {
        vec![summary_path()]
    }

    fn on_data_available(&mut self, retrieval: &dyn DataExtensionRetrieval) -> Result<(), BoxError> {
        let summary = retrieval.query_output::<LogSummary>(&output(summary_path(), "summary"))?;
        self.report = match &summary.first_error {
            Some(first) => format!(
                "{} of {} lines are errors; first: {}",
                summary.error_lines, summary.total_lines, first
            ),
            None => format!("no errors in {} lines", summary.total_lines),
        };
        Ok(())
    }

    fn output_ids(&self) -> Vec<String> {
        vec!["report".to_string()]
    }

    fn query_output(&self, output_id: &str) -> Option<DataOutput> {
        match output_id {
            "report" => Some(Arc::new(self.report.clone())),
            _ => None,
        }
    }
}

// ===== TABLE =====

pub struct LevelTable;

impl TableProvider for LevelTable {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new(LEVEL_TABLE_GUID, "Log Levels")
            .with_description("Line count per log level")
            .with_category("Logs")
            .requiring_cooker(level_counts_path())
    }

    fn build_table(retrieval: &dyn DataExtensionRetrieval, builder: &mut dyn TableBuilder) -> Result<(), BoxError> {
        let counts = retrieval.query_output::<BTreeMap<String, usize>>(&output(level_counts_path(), "counts"))?;
        builder.add_column("level");
        builder.add_column("count");
        builder.set_row_count(counts.len());
        Ok(())
    }
}

/// Every extension type this plugin contributes.
pub fn extension_types() -> Vec<ExtensionType> {
    vec![
        ExtensionType::source_data_cooker::<LevelCountsCooker>(),
        ExtensionType::source_data_cooker::<ErrorsCooker>(),
        ExtensionType::composite_data_cooker::<SummaryCooker>(),
        ExtensionType::data_processor::<ErrorReportProcessor>(),
        ExtensionType::table::<LevelTable>(),
    ]
}

#[cfg(test)]
mod tests;
