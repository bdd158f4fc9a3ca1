use std::fmt;

use crate::extension::descriptor::{Capability, CompositeDataCookerFactory, ExtensionType};
use crate::extension::error::ReferenceRejection;
use crate::extension::path::DataCookerPath;
use crate::extension::reference::{
    DataExtensionReference, DependencyTarget, ExtensionKey, ExtensionKind, ReferenceCore,
};
use crate::extension::traits::CompositeDataCooker;

/// Reference to a cooker that consumes other cookers' outputs.
///
/// Composite cookers may depend on source cookers from any number of parsers
/// and on other composite cookers, but never on data processors.
#[derive(Clone)]
pub struct CompositeDataCookerReference {
    core: ReferenceCore,
    path: DataCookerPath,
    description: String,
    factory: CompositeDataCookerFactory,
}

impl CompositeDataCookerReference {
    /// Build a reference if `extension_type` is a composite data cooker.
    pub fn try_create(extension_type: &ExtensionType) -> Result<Option<Self>, ReferenceRejection> {
        let factory = match extension_type.composite_data_cooker_capability() {
            Capability::NotImplemented => return Ok(None),
            Capability::WithoutConstructor => {
                return Err(ReferenceRejection::MissingConstructor {
                    type_name: extension_type.name().to_string(),
                    kind: ExtensionKind::CompositeDataCooker.to_string(),
                });
            }
            Capability::Constructible(factory) => factory.clone(),
        };
        if !extension_type.is_public() {
            return Err(ReferenceRejection::NotPublic {
                type_name: extension_type.name().to_string(),
                kind: ExtensionKind::CompositeDataCooker.to_string(),
            });
        }

        let prototype = factory();
        let path = prototype.path();
        let mut core = ReferenceCore::new(
            path.to_string(),
            extension_type.name(),
            prototype.required_data_cookers(),
            prototype.required_data_processors(),
        );

        if path.is_source() {
            core.add_error(format!(
                "Composite data cooker '{}' must not declare a source parser id (found '{}')",
                path,
                path.source_parser_id()
            ));
        }
        for processor in prototype.required_data_processors() {
            core.add_error(format!(
                "Composite data cooker '{}' cannot depend on data processor '{}'",
                path, processor
            ));
        }

        Ok(Some(Self {
            core,
            description: prototype.description().to_string(),
            path,
            factory,
        }))
    }

    pub fn path(&self) -> &DataCookerPath {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Instantiate a fresh, not yet fed, composite cooker.
    pub fn create_instance(&self) -> Box<dyn CompositeDataCooker> {
        (self.factory)()
    }
}

impl DataExtensionReference for CompositeDataCookerReference {
    fn core(&self) -> &ReferenceCore {
        &self.core
    }

    fn key(&self) -> ExtensionKey {
        ExtensionKey::CompositeDataCooker(self.path.clone())
    }

    fn perform_additional_data_extension_validation(&self, dependency: DependencyTarget<'_>) -> Vec<String> {
        match dependency {
            DependencyTarget::DataProcessor(required) => vec![format!(
                "Composite data cooker '{}' cannot depend on data processor '{}'",
                self.path,
                required.id()
            )],
            DependencyTarget::SourceDataCooker(_) | DependencyTarget::CompositeDataCooker(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for CompositeDataCookerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDataCookerReference")
            .field("path", &self.path)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
