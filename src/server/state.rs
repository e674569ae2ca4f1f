//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::ingest::{batch::BatchExtractor, extractor::ExtractorRegistry, validate::FileValidator};
use crate::rag::RagClient;
use crate::storage::{DocumentStore, LocalDocumentStore, UploadIndex};

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<GatewayConfig>,
    validator: Arc<FileValidator>,
    batch: Arc<BatchExtractor>,
    store: Arc<dyn DocumentStore>,
    index: Arc<UploadIndex>,
    rag: Arc<RagClient>,
}

impl AppState {
    /// Wire up the pipeline and its collaborators from configuration.
    ///
    /// Extractors hold no process-global state; everything is
    /// constructed here and shared behind `Arc`s.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let registry = Arc::new(ExtractorRegistry::with_defaults());
        let validator = Arc::new(FileValidator::new(config.ingest.max_file_size));
        let batch = Arc::new(BatchExtractor::new(
            Arc::clone(&registry),
            Duration::from_secs(config.ingest.file_timeout_secs),
        ));
        let store: Arc<dyn DocumentStore> =
            Arc::new(LocalDocumentStore::new(config.storage.root_dir.clone())?);
        let index = Arc::new(UploadIndex::open(&config.storage.database_path)?);
        let rag = Arc::new(RagClient::new(&config.rag)?);

        Ok(Self {
            config: Arc::new(config),
            validator,
            batch,
            store,
            index,
            rag,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn batch(&self) -> &BatchExtractor {
        &self.batch
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn index(&self) -> &UploadIndex {
        &self.index
    }

    pub fn rag(&self) -> &RagClient {
        &self.rag
    }
}
