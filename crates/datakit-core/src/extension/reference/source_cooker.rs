use std::fmt;

use crate::extension::descriptor::{Capability, ExtensionType, SourceDataCookerFactory};
use crate::extension::error::ReferenceRejection;
use crate::extension::path::{DataCookerPath, DataKey};
use crate::extension::reference::{
    DataExtensionReference, DependencyTarget, ExtensionKey, ExtensionKind, ReferenceCore,
};
use crate::extension::traits::{DataCookerOptions, DataProductionStrategy, SourceDataCooker};

/// Reference to a cooker bound to one source parser.
#[derive(Clone)]
pub struct SourceDataCookerReference {
    core: ReferenceCore,
    path: DataCookerPath,
    description: String,
    data_keys: Option<Vec<DataKey>>,
    options: DataCookerOptions,
    production_strategy: DataProductionStrategy,
    factory: SourceDataCookerFactory,
}

impl SourceDataCookerReference {
    /// Build a reference if `extension_type` is a source data cooker.
    ///
    /// Returns `Ok(None)` when the type does not implement the capability at all.
    pub fn try_create(extension_type: &ExtensionType) -> Result<Option<Self>, ReferenceRejection> {
        let factory = match extension_type.source_data_cooker_capability() {
            Capability::NotImplemented => return Ok(None),
            Capability::WithoutConstructor => {
                return Err(ReferenceRejection::MissingConstructor {
                    type_name: extension_type.name().to_string(),
                    kind: ExtensionKind::SourceDataCooker.to_string(),
                });
            }
            Capability::Constructible(factory) => factory.clone(),
        };
        if !extension_type.is_public() {
            return Err(ReferenceRejection::NotPublic {
                type_name: extension_type.name().to_string(),
                kind: ExtensionKind::SourceDataCooker.to_string(),
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

        if !path.is_source() {
            core.add_error(format!(
                "Source data cooker '{}' must declare a source parser id in its path",
                path
            ));
        }

        for required in prototype.required_data_cookers() {
            if required.is_composite() {
                core.add_error(format!(
                    "Source data cooker '{}' cannot depend on composite data cooker '{}'",
                    path, required
                ));
            } else if required.source_parser_id() != path.source_parser_id() {
                core.add_error(format!(
                    "Source data cooker '{}' cannot depend on '{}' from source parser '{}'",
                    path,
                    required,
                    required.source_parser_id()
                ));
            }
        }

        for processor in prototype.required_data_processors() {
            core.add_error(format!(
                "Source data cooker '{}' cannot depend on data processor '{}'",
                path, processor
            ));
        }

        Ok(Some(Self {
            core,
            description: prototype.description().to_string(),
            data_keys: prototype.data_keys(),
            options: prototype.options(),
            production_strategy: prototype.production_strategy(),
            path,
            factory,
        }))
    }

    /// Build a reference for a cooker that must belong to `source_parser_id`.
    pub fn try_create_for_parser(
        extension_type: &ExtensionType,
        source_parser_id: &str,
    ) -> Result<Option<Self>, ReferenceRejection> {
        let mut reference = match Self::try_create(extension_type)? {
            Some(reference) => reference,
            None => return Ok(None),
        };
        if reference.path.source_parser_id() != source_parser_id {
            let message = format!(
                "Source data cooker '{}' does not belong to source parser '{}'",
                reference.path, source_parser_id
            );
            reference.core.add_error(message);
        }
        Ok(Some(reference))
    }

    pub fn path(&self) -> &DataCookerPath {
        &self.path
    }

    pub fn source_parser_id(&self) -> &str {
        self.path.source_parser_id()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn data_keys(&self) -> Option<&[DataKey]> {
        self.data_keys.as_deref()
    }

    pub fn options(&self) -> DataCookerOptions {
        self.options
    }

    pub fn production_strategy(&self) -> DataProductionStrategy {
        self.production_strategy
    }

    /// Instantiate a fresh cooker for a processing session.
    pub fn create_instance(&self) -> Box<dyn SourceDataCooker> {
        (self.factory)()
    }
}

impl DataExtensionReference for SourceDataCookerReference {
    fn core(&self) -> &ReferenceCore {
        &self.core
    }

    fn key(&self) -> ExtensionKey {
        ExtensionKey::SourceDataCooker(self.path.clone())
    }

    fn perform_additional_data_extension_validation(&self, dependency: DependencyTarget<'_>) -> Vec<String> {
        let mut errors = Vec::new();
        match dependency {
            DependencyTarget::SourceDataCooker(required) => {
                if required.source_parser_id() != self.source_parser_id() {
                    errors.push(format!(
                        "Source data cooker '{}' cannot depend on '{}' from source parser '{}'",
                        self.path,
                        required.path,
                        required.source_parser_id()
                    ));
                }
                if self.production_strategy == DataProductionStrategy::AsRequired
                    && required.production_strategy != DataProductionStrategy::AsRequired
                {
                    errors.push(format!(
                        "Source data cooker '{}' is {} and may only depend on {} cookers, but '{}' is {}",
                        self.path,
                        DataProductionStrategy::AsRequired,
                        DataProductionStrategy::AsRequired,
                        required.path,
                        required.production_strategy
                    ));
                }
            }
            DependencyTarget::CompositeDataCooker(required) => {
                errors.push(format!(
                    "Source data cooker '{}' cannot depend on composite data cooker '{}'",
                    self.path,
                    required.path()
                ));
            }
            DependencyTarget::DataProcessor(required) => {
                errors.push(format!(
                    "Source data cooker '{}' cannot depend on data processor '{}'",
                    self.path,
                    required.id()
                ));
            }
        }
        errors
    }
}

impl fmt::Debug for SourceDataCookerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDataCookerReference")
            .field("path", &self.path)
            .field("data_keys", &self.data_keys)
            .field("options", &self.options)
            .field("production_strategy", &self.production_strategy)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
