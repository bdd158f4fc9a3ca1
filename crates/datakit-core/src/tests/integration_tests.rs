use std::sync::Arc;

use uuid::Uuid;

use crate::config::RuntimeConfig;
use crate::discovery::catalog::ExtensionCatalog;
use crate::extension::traits::TableDescriptor;
use crate::processing::cancellation::CancellationToken;
use crate::processing::cooked::CookedSourceData;
use crate::processing::element::{DataProcessingResult, ElementContext};
use crate::processing::plan::ProcessingPlan;
use crate::processing::session::SourceProcessingSession;
use crate::retrieval::{DataExtensionRetrievalFactory, QueryOutputExt};
use crate::tests::common::*;

/// Discovery, planning, cooking and retrieval over two source parsers.
#[tokio::test]
async fn test_full_processing_run() {
    let table = Uuid::new_v4();
    let rollup = output(&composite_path("Rollup"), "total");
    let catalog = ExtensionCatalog::new(RuntimeConfig::default());
    let summary = catalog
        .load_batch(
            "plugin",
            vec![
                MockSourceCooker::new("Cpu", "Samples").with_keys(&["sample"]).extension_type(),
                MockSourceCooker::new("Disk", "Io").with_keys(&["read", "write"]).extension_type(),
                MockSourceCooker::new("Disk", "Idle").with_keys(&["idle"]).extension_type(),
                MockCompositeCooker::new("Rollup")
                    .reading(output(&source_path("Cpu", "Samples"), "count"))
                    .reading(output(&source_path("Disk", "Io"), "count"))
                    .extension_type(),
                MockProcessor::new("Stats").reading(rollup.clone()).extension_type(),
                table_type(
                    TableDescriptor::new(table, "Rollup Rows").requiring_cooker(composite_path("Rollup")),
                    Some(rows_from(rollup.clone())),
                ),
            ],
        )
        .await;
    assert!(summary.is_clean());
    let repository = catalog.snapshot();

    let plan = ProcessingPlan::for_targets(&repository, &[table], &[processor_id("Stats")], &[]);
    assert!(plan.unavailable().is_empty());
    assert_eq!(plan.source_data_cookers_for("Disk"), vec![source_path("Disk", "Io")]);

    let cancellation = CancellationToken::new();
    let context: &ElementContext = &();
    let mut cooked = CookedSourceData::new();
    let elements = [("Cpu", "sample"), ("Cpu", "sample"), ("Disk", "read"), ("Disk", "write"), ("Disk", "idle")];
    for parser in plan.source_parser_ids() {
        let mut session = SourceProcessingSession::new(parser);
        session
            .set_active_data_cookers_from_repository(&repository, &plan.source_data_cookers_for(parser))
            .unwrap();
        session.register_cookers().unwrap();
        session.prepare_for_processing(&cancellation).unwrap();
        for (_, key) in elements.iter().filter(|(p, _)| *p == parser) {
            let result = session
                .process_data_element(&MockElement::new(key), context, &cancellation)
                .unwrap();
            let expected = if *key == "idle" {
                DataProcessingResult::Ignored
            } else {
                DataProcessingResult::Processed
            };
            assert_eq!(result, expected);
        }
        session.end_processing(&cancellation).unwrap();
        cooked.merge(session.into_cooked_data().unwrap());
    }
    assert_eq!(cooked.len(), 2);

    let factory = DataExtensionRetrievalFactory::new(Arc::clone(&repository), Arc::new(cooked));
    let mut builder = RecordingTableBuilder::default();
    factory.build_table(&table, &mut builder).unwrap();
    assert_eq!(builder.rows, 4);

    let stats = factory.create_data_retrieval_for_data_processor(&processor_id("Stats")).unwrap();
    assert_eq!(*stats.query_output::<usize>(&rollup).unwrap(), 4);
    let processor = factory.materialize_data_processor(&processor_id("Stats")).ok().unwrap();
    assert_eq!(*processor.query_output("total").unwrap().downcast::<usize>().unwrap(), 4);
}
