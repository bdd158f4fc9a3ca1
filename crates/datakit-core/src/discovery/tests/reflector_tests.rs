use uuid::Uuid;

use crate::config::RuntimeConfig;
use crate::discovery::reflector::{DataExtensionReflector, ExtensionTypeObserver};
use crate::extension::availability::Availability;
use crate::extension::descriptor::{DefaultTableDescriptorFactory, ExtensionType};
use crate::extension::error::ReferenceRejection;
use crate::extension::reference::ExtensionKey;
use crate::extension::repository::ExtensionRepository;
use crate::extension::traits::TableDescriptor;
use crate::tests::common::*;

#[test]
fn test_reflector_adds_and_finalizes() {
    let mut repository = ExtensionRepository::new();
    let config = RuntimeConfig::default();
    let mut reflector = DataExtensionReflector::new(&mut repository, &config, &DefaultTableDescriptorFactory);

    reflector.process_type(&MockSourceCooker::new("P", "A").extension_type(), "plugin");
    reflector.process_type(&MockSourceCooker::new("P", "A").extension_type(), "plugin");
    reflector.process_type(&ExtensionType::new("Unrelated"), "plugin");
    assert_eq!(reflector.added(), 1);
    assert!(!reflector.is_complete());

    reflector.discovery_complete();
    assert!(reflector.is_complete());
    assert!(reflector.rejections().is_empty());
    drop(reflector);

    assert_eq!(
        repository.availability(&ExtensionKey::SourceDataCooker(source_path("P", "A"))),
        Availability::Available
    );
}

#[test]
fn test_one_type_may_implement_several_kinds() {
    let guid = Uuid::new_v4();
    let cooker = MockSourceCooker::new("P", "A");
    let prototype = cooker.clone();
    let extension_type = table_type(
        TableDescriptor::new(guid, "Self Describing"),
        Some(rows_from(output(&source_path("P", "A"), "count"))),
    )
    .with_source_data_cooker(move || {
        Box::new(prototype.clone()) as Box<dyn crate::extension::traits::SourceDataCooker>
    });

    let mut repository = ExtensionRepository::new();
    let config = RuntimeConfig::default();
    let mut reflector = DataExtensionReflector::new(&mut repository, &config, &DefaultTableDescriptorFactory);
    reflector.process_type(&extension_type, "plugin");
    reflector.discovery_complete();
    assert_eq!(reflector.added(), 2);
    drop(reflector);

    assert!(repository.get_table_reference(&guid).is_some());
    assert!(repository.get_source_data_cooker_reference(&cooker.path).is_some());
}

#[test]
fn test_rejections_are_collected_with_their_source() {
    let mut repository = ExtensionRepository::new();
    let config = RuntimeConfig {
        log_discovery_rejections: false,
        ..RuntimeConfig::default()
    };
    let mut reflector = DataExtensionReflector::new(&mut repository, &config, &DefaultTableDescriptorFactory);

    reflector.process_type(&MockProcessor::new("Hidden").extension_type().non_public(), "first.so");
    reflector.process_type(
        &MockCompositeCooker::new("NoCtor").extension_type().without_constructor(),
        "second.so",
    );
    reflector.process_type(&table_type(TableDescriptor::new(Uuid::nil(), "Nil"), None), "third.so");
    reflector.discovery_complete();

    let rejections = reflector.rejections();
    assert_eq!(rejections.len(), 3);
    assert_eq!(rejections[0].source, "first.so");
    assert!(matches!(rejections[0].reason, ReferenceRejection::NotPublic { .. }));
    assert!(matches!(rejections[1].reason, ReferenceRejection::MissingConstructor { .. }));
    assert!(matches!(rejections[2].reason, ReferenceRejection::MissingIdentity { .. }));
    assert!(rejections[0].to_string().contains("first.so"));
    assert_eq!(reflector.added(), 0);
}

#[test]
fn test_disabled_extensions_are_skipped() {
    let guid = Uuid::new_v4();
    let mut repository = ExtensionRepository::new();
    let config = RuntimeConfig {
        disabled_extensions: vec!["P/A".to_string(), "Stats".to_string(), guid.to_string()],
        ..RuntimeConfig::default()
    };
    let mut reflector = DataExtensionReflector::new(&mut repository, &config, &DefaultTableDescriptorFactory);

    reflector.process_type(&MockSourceCooker::new("P", "A").extension_type(), "plugin");
    reflector.process_type(&MockSourceCooker::new("P", "B").extension_type(), "plugin");
    reflector.process_type(&MockProcessor::new("Stats").extension_type(), "plugin");
    reflector.process_type(&table_type(TableDescriptor::new(guid, "Off").internal(), None), "plugin");
    reflector.discovery_complete();

    assert_eq!(reflector.added(), 1);
    assert_eq!(reflector.disabled().len(), 3);
    let (added, disabled, rejections) = reflector.into_parts();
    assert_eq!(added, 1);
    assert!(disabled.contains(&"Stats".to_string()));
    assert!(rejections.is_empty());

    assert!(repository.get_source_data_cooker_reference(&source_path("P", "A")).is_none());
    assert!(repository.get_table_reference(&guid).is_none());
}
