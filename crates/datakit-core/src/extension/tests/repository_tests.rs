use uuid::Uuid;

use crate::config::FinalizeMode;
use crate::extension::availability::Availability;
use crate::extension::reference::{ExtensionKey, SourceDataCookerReference};
use crate::extension::repository::ExtensionRepository;
use crate::extension::traits::TableDescriptor;
use crate::tests::common::*;

fn reference(cooker: &MockSourceCooker) -> SourceDataCookerReference {
    SourceDataCookerReference::try_create(&cooker.extension_type()).unwrap().unwrap()
}

#[test]
fn test_empty_repository() {
    let repository = ExtensionRepository::new();
    assert!(repository.is_empty());
    assert_eq!(repository.finalize_mode(), FinalizeMode::Incremental);
    assert_eq!(
        repository.availability(&ExtensionKey::SourceDataCooker(source_path("P", "A"))),
        Availability::Undetermined
    );
    assert!(repository.get_reference(&ExtensionKey::Table(Uuid::new_v4())).is_none());
}

#[test]
fn test_duplicate_add_keeps_first() {
    let mut repository = ExtensionRepository::new();
    let first = MockSourceCooker::new("P", "A").with_keys(&["first"]);
    let second = MockSourceCooker::new("P", "A").with_keys(&["second"]);

    assert!(repository.add_source_data_cooker_reference(reference(&first)));
    assert!(!repository.add_source_data_cooker_reference(reference(&second)));
    assert_eq!(repository.len(), 1);

    let kept = repository.get_source_data_cooker_reference(&source_path("P", "A")).unwrap();
    assert_eq!(kept.data_keys().unwrap()[0].as_str(), "first");
}

#[test]
fn test_references_are_undetermined_until_finalized() {
    let mut repository = ExtensionRepository::new();
    repository.add_source_data_cooker_reference(reference(&MockSourceCooker::new("P", "A")));
    let key = ExtensionKey::SourceDataCooker(source_path("P", "A"));
    assert!(repository.contains(&key));
    assert_eq!(repository.availability(&key), Availability::Undetermined);

    repository.finalize_data_extensions();
    assert_eq!(repository.availability(&key), Availability::Available);
}

#[test]
fn test_incremental_finalize_heals_missing_dependency() {
    let mut repository = ExtensionRepository::new();
    let dependent = MockSourceCooker::new("P", "B").requiring(source_path("P", "A"));
    repository.add_source_data_cooker_reference(reference(&dependent));
    repository.finalize_data_extensions();

    let key = ExtensionKey::SourceDataCooker(source_path("P", "B"));
    assert_eq!(repository.availability(&key), Availability::Error);

    repository.add_source_data_cooker_reference(reference(&MockSourceCooker::new("P", "A")));
    repository.finalize_data_extensions();
    assert_eq!(repository.availability(&key), Availability::Available);
    assert!(repository.errors(&key).is_empty());
}

#[test]
fn test_full_finalize_recomputes_everything() {
    let mut repository = ExtensionRepository::with_finalize_mode(FinalizeMode::Full);
    repository.add_source_data_cooker_reference(reference(&MockSourceCooker::new("P", "A")));
    repository.finalize_data_extensions();
    repository.finalize_data_extensions();

    let state = repository
        .dependency_state(&ExtensionKey::SourceDataCooker(source_path("P", "A")))
        .unwrap();
    assert_eq!(state.availability(), Availability::Available);
    assert_eq!(repository.finalize_mode(), FinalizeMode::Full);
}

#[test]
fn test_clone_is_an_independent_snapshot() {
    let mut repository = ExtensionRepository::new();
    let dependent = MockSourceCooker::new("P", "B").requiring(source_path("P", "A"));
    repository.add_source_data_cooker_reference(reference(&dependent));
    repository.finalize_data_extensions();
    let snapshot = repository.clone();

    repository.add_source_data_cooker_reference(reference(&MockSourceCooker::new("P", "A")));
    repository.finalize_data_extensions();

    let key = ExtensionKey::SourceDataCooker(source_path("P", "B"));
    assert_eq!(repository.availability(&key), Availability::Available);
    assert_eq!(snapshot.availability(&key), Availability::Error);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn test_enumeration_by_kind() {
    let internal = Uuid::new_v4();
    let public = Uuid::new_v4();
    let repository = finalized_repository(vec![
        MockSourceCooker::new("P", "A").extension_type(),
        MockSourceCooker::new("P", "B").extension_type(),
        MockSourceCooker::new("Q", "X").extension_type(),
        MockCompositeCooker::new("C").extension_type(),
        MockProcessor::new("Stats").extension_type(),
        table_type(TableDescriptor::new(internal, "Internal").internal(), None),
        table_type(
            TableDescriptor::new(public, "Public"),
            Some(rows_from(output(&source_path("P", "A"), "count"))),
        ),
    ]);

    assert_eq!(repository.len(), 7);
    assert_eq!(repository.source_data_cookers().count(), 3);
    assert_eq!(repository.source_data_cookers_for_parser("P").count(), 2);
    assert_eq!(repository.composite_data_cookers().count(), 1);
    assert_eq!(repository.data_processors().count(), 1);
    assert_eq!(repository.tables().count(), 2);

    let enumerable: Vec<Uuid> = repository.enumerable_tables().map(|t| t.guid()).collect();
    assert_eq!(enumerable, vec![public]);
    assert!(repository.get_table_reference(&internal).is_some());
}

#[test]
fn test_get_reference_by_key() {
    let repository = finalized_repository(vec![
        MockCompositeCooker::new("C").extension_type(),
        MockProcessor::new("Stats").extension_type(),
    ]);
    let composite = repository
        .get_reference(&ExtensionKey::CompositeDataCooker(composite_path("C")))
        .unwrap();
    assert_eq!(composite.name(), "/C");
    let processor = repository
        .get_reference(&ExtensionKey::DataProcessor(processor_id("Stats")))
        .unwrap();
    assert_eq!(processor.key(), ExtensionKey::DataProcessor(processor_id("Stats")));
}

#[test]
fn test_errors_list_static_then_dependency_errors() {
    let repository = finalized_repository(vec![
        MockSourceCooker::new("P", "A").as_required().extension_type(),
        MockSourceCooker::new("P", "B")
            .requiring(source_path("Q", "X"))
            .extension_type(),
    ]);
    let errors = repository.errors(&ExtensionKey::SourceDataCooker(source_path("P", "B")));
    // The static error short-circuits traversal, so no dependency error follows it.
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Q/X"));
}

#[test]
fn test_release_table_requires_sole_ownership() {
    let guid = Uuid::new_v4();
    let mut repository = finalized_repository(vec![table_type(
        TableDescriptor::new(guid, "Counts"),
        Some(rows_from(output(&source_path("P", "A"), "count"))),
    )]);
    assert!(!repository.release_table(&Uuid::new_v4()));

    let snapshot = repository.clone();
    assert!(!repository.release_table(&guid));
    assert!(repository.get_table_reference(&guid).unwrap().build_action().is_some());

    drop(snapshot);
    assert!(repository.release_table(&guid));
    assert!(repository.get_table_reference(&guid).unwrap().build_action().is_none());
}
