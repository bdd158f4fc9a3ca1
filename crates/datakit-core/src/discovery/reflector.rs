use std::fmt;

use crate::config::RuntimeConfig;
use crate::extension::descriptor::{ExtensionType, TableDescriptorFactory};
use crate::extension::error::ReferenceRejection;
use crate::extension::reference::{
    CompositeDataCookerReference, DataExtensionReference, DataProcessorReference, SourceDataCookerReference,
    TableExtensionReference,
};
use crate::extension::repository::ExtensionRepository;

/// Receives candidate types from plugin discovery.
///
/// Each candidate is handed over exactly once, then
/// [`discovery_complete`](Self::discovery_complete) is called when no more will arrive.
pub trait ExtensionTypeObserver {
    fn process_type(&mut self, extension_type: &ExtensionType, source: &str);

    fn discovery_complete(&mut self);
}

/// A candidate that looked like an extension but was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub source: String,
    pub reason: ReferenceRejection,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (from '{}')", self.reason, self.source)
    }
}

/// Registers every data extension found on the observed candidates.
///
/// A single candidate may implement several kinds; each kind is tried
/// independently. Finalization runs when discovery completes.
pub struct DataExtensionReflector<'a> {
    repository: &'a mut ExtensionRepository,
    config: &'a RuntimeConfig,
    table_factory: &'a dyn TableDescriptorFactory,
    added: usize,
    disabled: Vec<String>,
    rejections: Vec<Rejection>,
    complete: bool,
}

impl<'a> DataExtensionReflector<'a> {
    pub fn new(
        repository: &'a mut ExtensionRepository,
        config: &'a RuntimeConfig,
        table_factory: &'a dyn TableDescriptorFactory,
    ) -> Self {
        Self {
            repository,
            config,
            table_factory,
            added: 0,
            disabled: Vec::new(),
            rejections: Vec::new(),
            complete: false,
        }
    }

    /// Number of references added to the repository so far.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Identities skipped because the configuration disables them.
    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Consume the reflector, returning what it added, skipped and rejected.
    pub fn into_parts(self) -> (usize, Vec<String>, Vec<Rejection>) {
        (self.added, self.disabled, self.rejections)
    }

    fn reject(&mut self, source: &str, reason: ReferenceRejection) {
        if self.config.log_discovery_rejections {
            log::warn!("Rejected candidate from '{}': {}", source, reason);
        } else {
            log::debug!("Rejected candidate from '{}': {}", source, reason);
        }
        self.rejections.push(Rejection {
            source: source.to_string(),
            reason,
        });
    }

    /// Whether `reference` passes the enable list; records it otherwise.
    fn is_enabled(&mut self, reference: &dyn DataExtensionReference) -> bool {
        let identity = reference.key().to_string();
        if self.config.is_disabled(&identity) {
            log::info!("Skipping disabled data extension '{}'", identity);
            self.disabled.push(identity);
            return false;
        }
        true
    }

    fn record(&mut self, inserted: bool) {
        if inserted {
            self.added += 1;
        }
    }
}

impl ExtensionTypeObserver for DataExtensionReflector<'_> {
    fn process_type(&mut self, extension_type: &ExtensionType, source: &str) {
        match SourceDataCookerReference::try_create(extension_type) {
            Ok(Some(reference)) => {
                if self.is_enabled(&reference) {
                    let inserted = self.repository.add_source_data_cooker_reference(reference);
                    self.record(inserted);
                }
            }
            Ok(None) => {}
            Err(reason) => self.reject(source, reason),
        }

        match CompositeDataCookerReference::try_create(extension_type) {
            Ok(Some(reference)) => {
                if self.is_enabled(&reference) {
                    let inserted = self.repository.add_composite_data_cooker_reference(reference);
                    self.record(inserted);
                }
            }
            Ok(None) => {}
            Err(reason) => self.reject(source, reason),
        }

        match DataProcessorReference::try_create(extension_type) {
            Ok(Some(reference)) => {
                if self.is_enabled(&reference) {
                    let inserted = self.repository.add_data_processor_reference(reference);
                    self.record(inserted);
                }
            }
            Ok(None) => {}
            Err(reason) => self.reject(source, reason),
        }

        match TableExtensionReference::try_create(extension_type, self.table_factory) {
            Ok(Some(reference)) => {
                if self.is_enabled(&reference) {
                    let inserted = self.repository.add_table_extension_reference(reference);
                    self.record(inserted);
                }
            }
            Ok(None) => {}
            Err(reason) => self.reject(source, reason),
        }
    }

    fn discovery_complete(&mut self) {
        self.repository.finalize_data_extensions();
        self.complete = true;
        log::info!(
            "Discovery complete: {} added, {} disabled, {} rejected",
            self.added,
            self.disabled.len(),
            self.rejections.len()
        );
    }
}

impl fmt::Debug for DataExtensionReflector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataExtensionReflector")
            .field("added", &self.added)
            .field("disabled", &self.disabled)
            .field("rejections", &self.rejections)
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}
