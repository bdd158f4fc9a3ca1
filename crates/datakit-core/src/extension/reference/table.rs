use std::fmt;

use uuid::Uuid;

use crate::extension::descriptor::{ExtensionType, TableDescriptorFactory};
use crate::extension::error::ReferenceRejection;
use crate::extension::reference::{
    DataExtensionReference, DependencyTarget, ExtensionKey, ExtensionKind, ReferenceCore,
};
use crate::extension::traits::{TableBuildAction, TableDescriptor};

/// Reference to a table and the callback that builds it.
#[derive(Clone)]
pub struct TableExtensionReference {
    core: ReferenceCore,
    descriptor: TableDescriptor,
    build_action: Option<TableBuildAction>,
}

impl TableExtensionReference {
    /// Build a reference if `factory` can extract a table from `extension_type`.
    pub fn try_create(
        extension_type: &ExtensionType,
        factory: &dyn TableDescriptorFactory,
    ) -> Result<Option<Self>, ReferenceRejection> {
        let (descriptor, build_action) = match factory.try_create(extension_type) {
            Some(table) => table,
            None => return Ok(None),
        };
        if !extension_type.is_public() {
            return Err(ReferenceRejection::NotPublic {
                type_name: extension_type.name().to_string(),
                kind: ExtensionKind::Table.to_string(),
            });
        }
        if descriptor.guid.is_nil() {
            return Err(ReferenceRejection::MissingIdentity {
                type_name: extension_type.name().to_string(),
                kind: ExtensionKind::Table.to_string(),
                reason: "table guid is nil".to_string(),
            });
        }

        let mut core = ReferenceCore::new(
            descriptor.name.clone(),
            extension_type.name(),
            descriptor.required_data_cookers.clone(),
            descriptor.required_data_processors.clone(),
        );
        if descriptor.name.trim().is_empty() {
            core.add_error(format!("Table '{}' must have a name", descriptor.guid));
        }
        if build_action.is_none() && !descriptor.is_internal_table {
            core.add_error(format!(
                "Table '{}' ({}) has no build action and is not an internal table",
                descriptor.name, descriptor.guid
            ));
        }

        Ok(Some(Self {
            core,
            descriptor,
            build_action,
        }))
    }

    pub fn guid(&self) -> Uuid {
        self.descriptor.guid
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn build_action(&self) -> Option<&TableBuildAction> {
        self.build_action.as_ref()
    }

    /// Internal tables are built by their owning processor and are not enumerable.
    pub fn is_internal_table(&self) -> bool {
        self.descriptor.is_internal_table
    }

    pub fn is_metadata_table(&self) -> bool {
        self.descriptor.is_metadata_table
    }

    /// Drop the build callback. The reference can no longer build its table.
    ///
    /// Registered references are shared behind `Arc`; release those through
    /// [`ExtensionRepository::release_table`](crate::extension::ExtensionRepository::release_table).
    pub fn release(&mut self) {
        self.build_action = None;
    }
}

impl DataExtensionReference for TableExtensionReference {
    fn core(&self) -> &ReferenceCore {
        &self.core
    }

    fn key(&self) -> ExtensionKey {
        ExtensionKey::Table(self.descriptor.guid)
    }

    // Tables may consume any cooker and any processor.
    fn perform_additional_data_extension_validation(&self, _dependency: DependencyTarget<'_>) -> Vec<String> {
        Vec::new()
    }
}

impl fmt::Debug for TableExtensionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableExtensionReference")
            .field("descriptor", &self.descriptor)
            .field("has_build_action", &self.build_action.is_some())
            .field("core", &self.core)
            .finish()
    }
}
