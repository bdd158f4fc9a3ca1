use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_stream::{Stream, StreamExt};

use crate::config::RuntimeConfig;
use crate::discovery::error::DiscoveryError;
use crate::discovery::reflector::{DataExtensionReflector, ExtensionTypeObserver, Rejection};
use crate::extension::descriptor::{DefaultTableDescriptorFactory, ExtensionType, TableDescriptorFactory};
use crate::extension::repository::ExtensionRepository;
use crate::kernel::constants::BUILTIN_SOURCE;
use crate::kernel::error::BoxError;

/// Notified with the repository each time a load batch completes.
#[async_trait]
pub trait CatalogSubscriber: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    async fn on_extensions_loaded(&self, repository: &Arc<ExtensionRepository>) -> Result<(), BoxError>;
}

/// A subscriber that returned an error for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    pub subscriber: String,
    pub reason: String,
}

/// What one load batch did.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub source: String,
    /// Candidate types seen in the batch.
    pub candidates: usize,
    /// References added to the repository.
    pub added: usize,
    pub disabled: Vec<String>,
    pub rejections: Vec<Rejection>,
    pub subscriber_failures: Vec<SubscriberFailure>,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty() && self.subscriber_failures.is_empty()
    }
}

struct CatalogState {
    repository: Arc<ExtensionRepository>,
    subscribers: Vec<Arc<dyn CatalogSubscriber>>,
    batches: usize,
}

/// The process-wide set of discovered data extensions.
///
/// Load batches run one at a time. Each batch works on a copy of the current
/// repository, finalizes it, publishes it and notifies subscribers while still
/// holding the catalog lock, so a subscriber joining concurrently sees either
/// the whole batch or none of it.
pub struct ExtensionCatalog {
    config: RuntimeConfig,
    table_factory: Arc<dyn TableDescriptorFactory>,
    state: Mutex<CatalogState>,
    published: RwLock<Arc<ExtensionRepository>>,
}

impl ExtensionCatalog {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_table_descriptor_factory(config, Arc::new(DefaultTableDescriptorFactory))
    }

    pub fn with_table_descriptor_factory(
        config: RuntimeConfig,
        table_factory: Arc<dyn TableDescriptorFactory>,
    ) -> Self {
        let repository = Arc::new(ExtensionRepository::with_finalize_mode(config.finalize_mode));
        Self {
            config,
            table_factory,
            state: Mutex::new(CatalogState {
                repository: Arc::clone(&repository),
                subscribers: Vec::new(),
                batches: 0,
            }),
            published: RwLock::new(repository),
        }
    }

    /// Create a catalog configured from a JSON, YAML or TOML file.
    pub fn from_config_file(path: &Path) -> Result<Self, DiscoveryError> {
        Ok(Self::new(RuntimeConfig::load(path)?))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The latest finalized repository. Never blocks on a running batch.
    pub fn snapshot(&self) -> Arc<ExtensionRepository> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Register `subscriber` and replay the current repository to it if any batch has loaded.
    ///
    /// The subscriber stays registered even if the replay fails.
    pub async fn subscribe(&self, subscriber: Arc<dyn CatalogSubscriber>) -> Result<(), DiscoveryError> {
        let mut state = self.state.lock().await;
        state.subscribers.push(Arc::clone(&subscriber));
        if state.batches == 0 {
            return Ok(());
        }
        subscriber
            .on_extensions_loaded(&state.repository)
            .await
            .map_err(|e| {
                log::error!("Subscriber '{}' failed on replay: {}", subscriber.name(), e);
                DiscoveryError::SubscriberFailed {
                    subscriber: subscriber.name().to_string(),
                    reason: e.to_string(),
                }
            })
    }

    /// Discover, finalize and publish a batch of candidate types.
    pub async fn load_batch<I>(&self, source: &str, types: I) -> BatchSummary
    where
        I: IntoIterator<Item = ExtensionType>,
    {
        let mut state = self.state.lock().await;
        let mut repository = ExtensionRepository::clone(&state.repository);
        let mut summary = self.discover(&mut repository, source, |reflector| {
            let mut candidates = 0;
            for extension_type in types {
                reflector.process_type(&extension_type, source);
                candidates += 1;
            }
            candidates
        });
        self.commit(&mut state, repository, &mut summary).await;
        summary
    }

    /// Load extensions the host registers directly rather than through plugins.
    pub async fn register_builtin<I>(&self, types: I) -> BatchSummary
    where
        I: IntoIterator<Item = ExtensionType>,
    {
        self.load_batch(BUILTIN_SOURCE, types).await
    }

    /// Discover from a stream of candidates. A failing item aborts the batch; nothing is published.
    pub async fn load_stream<S>(&self, source: &str, mut types: S) -> Result<BatchSummary, DiscoveryError>
    where
        S: Stream<Item = Result<ExtensionType, BoxError>> + Unpin,
    {
        let mut state = self.state.lock().await;
        let mut repository = ExtensionRepository::clone(&state.repository);
        let mut candidates = Vec::new();
        while let Some(item) = types.next().await {
            match item {
                Ok(extension_type) => candidates.push(extension_type),
                Err(e) => {
                    log::error!("Discovery from '{}' failed: {}", source, e);
                    return Err(DiscoveryError::DiscoveryFailed {
                        source_name: source.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        let mut summary = self.discover(&mut repository, source, |reflector| {
            for extension_type in &candidates {
                reflector.process_type(extension_type, source);
            }
            candidates.len()
        });
        self.commit(&mut state, repository, &mut summary).await;
        Ok(summary)
    }

    fn discover<F>(&self, repository: &mut ExtensionRepository, source: &str, feed: F) -> BatchSummary
    where
        F: FnOnce(&mut DataExtensionReflector<'_>) -> usize,
    {
        let mut reflector = DataExtensionReflector::new(repository, &self.config, self.table_factory.as_ref());
        let candidates = feed(&mut reflector);
        reflector.discovery_complete();
        let (added, disabled, rejections) = reflector.into_parts();
        BatchSummary {
            source: source.to_string(),
            candidates,
            added,
            disabled,
            rejections,
            subscriber_failures: Vec::new(),
        }
    }

    async fn commit(&self, state: &mut CatalogState, repository: ExtensionRepository, summary: &mut BatchSummary) {
        let repository = Arc::new(repository);
        state.repository = Arc::clone(&repository);
        state.batches += 1;
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&repository);

        for subscriber in &state.subscribers {
            if let Err(e) = subscriber.on_extensions_loaded(&repository).await {
                log::error!("Subscriber '{}' failed for batch '{}': {}", subscriber.name(), summary.source, e);
                summary.subscriber_failures.push(SubscriberFailure {
                    subscriber: subscriber.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        log::info!(
            "Loaded batch '{}': {} candidates, {} added, {} rejected, {} subscriber failures",
            summary.source,
            summary.candidates,
            summary.added,
            summary.rejections.len(),
            summary.subscriber_failures.len()
        );
    }
}

impl fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionCatalog")
            .field("config", &self.config)
            .field("repository", &self.snapshot())
            .finish_non_exhaustive()
    }
}
