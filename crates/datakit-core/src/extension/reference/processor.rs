use std::fmt;

use crate::extension::descriptor::{Capability, DataProcessorFactory, ExtensionType};
use crate::extension::error::ReferenceRejection;
use crate::extension::path::DataProcessorId;
use crate::extension::reference::{
    DataExtensionReference, DependencyTarget, ExtensionKey, ExtensionKind, ReferenceCore,
};
use crate::extension::traits::DataProcessor;

/// Reference to a data processor.
#[derive(Clone)]
pub struct DataProcessorReference {
    core: ReferenceCore,
    id: DataProcessorId,
    description: String,
    factory: DataProcessorFactory,
}

impl DataProcessorReference {
    /// Build a reference if `extension_type` is a data processor.
    pub fn try_create(extension_type: &ExtensionType) -> Result<Option<Self>, ReferenceRejection> {
        let factory = match extension_type.data_processor_capability() {
            Capability::NotImplemented => return Ok(None),
            Capability::WithoutConstructor => {
                return Err(ReferenceRejection::MissingConstructor {
                    type_name: extension_type.name().to_string(),
                    kind: ExtensionKind::DataProcessor.to_string(),
                });
            }
            Capability::Constructible(factory) => factory.clone(),
        };
        if !extension_type.is_public() {
            return Err(ReferenceRejection::NotPublic {
                type_name: extension_type.name().to_string(),
                kind: ExtensionKind::DataProcessor.to_string(),
            });
        }

        let prototype = factory();
        let id = prototype.id();
        let core = ReferenceCore::new(
            id.to_string(),
            extension_type.name(),
            prototype.required_data_cookers(),
            prototype.required_data_processors(),
        );

        Ok(Some(Self {
            core,
            description: prototype.description().to_string(),
            id,
            factory,
        }))
    }

    pub fn id(&self) -> &DataProcessorId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn create_instance(&self) -> Box<dyn DataProcessor> {
        (self.factory)()
    }
}

impl DataExtensionReference for DataProcessorReference {
    fn core(&self) -> &ReferenceCore {
        &self.core
    }

    fn key(&self) -> ExtensionKey {
        ExtensionKey::DataProcessor(self.id.clone())
    }

    // Processors may consume any cooker and any other processor.
    fn perform_additional_data_extension_validation(&self, _dependency: DependencyTarget<'_>) -> Vec<String> {
        Vec::new()
    }
}

impl fmt::Debug for DataProcessorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataProcessorReference")
            .field("id", &self.id)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
