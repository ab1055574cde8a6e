//! Embedding and index store.
//!
//! [`IndexStore`] binds an [`EmbeddingProvider`] to one named collection of a
//! [`VectorIndex`]. Ingestion is best effort per chunk; search and count
//! degrade to empty results instead of failing the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::RagConfig;
use crate::document::{Chunk, IndexedItem, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::{CollectionSpec, VectorIndex};

/// Description recorded on collections created by the store.
pub const COLLECTION_DESCRIPTION: &str = "GxP Validation Guidelines (OpenAI)";

/// Fixed pause applied during ingestion to stay under provider rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    /// Pause after every this many processed chunks.
    pub every: usize,
    /// How long to pause.
    pub pause: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self { every: 10, pause: Duration::from_millis(500) }
    }
}

/// Outcome of [`IndexStore::add_documents`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Chunks attempted.
    pub processed: usize,
    /// Chunks embedded and written to the index.
    pub indexed: usize,
    /// Chunks skipped because embedding failed.
    pub failed: usize,
}

/// A named collection plus the embedding service that fills and queries it.
pub struct IndexStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    spec: CollectionSpec,
    top_k: usize,
    throttle: Throttle,
}

impl IndexStore {
    /// Attach to `collection`, creating it with the embedder's dimensionality
    /// if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Propagates index failures, including a dimensionality mismatch with an
    /// existing collection.
    pub async fn open(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        collection: &str,
    ) -> Result<Self> {
        let requested = CollectionSpec::new(collection, embedder.dimensions())
            .with_description(COLLECTION_DESCRIPTION);
        let existed = index.collection_exists(collection).await?;
        let spec = index.open_or_create(&requested).await?;
        if existed {
            info!(collection, backend = index.backend(), "loaded existing collection");
        } else {
            info!(collection, backend = index.backend(), "created new collection");
        }
        Ok(Self { embedder, index, spec, top_k: 5, throttle: Throttle::default() })
    }

    /// Open the configured collection and apply the configured retrieval
    /// depth and ingestion throttle.
    pub async fn from_config(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        let store = Self::open(embedder, index, &config.collection_name).await?;
        Ok(store.with_top_k(config.top_k).with_throttle(Throttle {
            every: config.ingest_pause_every,
            pause: config.ingest_pause(),
        }))
    }

    /// Set the default number of search results.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the ingestion throttle.
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// The collection definition in use.
    pub fn collection(&self) -> &CollectionSpec {
        &self.spec
    }

    /// Name of the index backend.
    pub fn backend(&self) -> &str {
        self.index.backend()
    }

    /// Embed a single text. Errors propagate without retry.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await.inspect_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "failed to generate embedding");
        })
    }

    /// Embed and index `chunks`.
    ///
    /// Chunks whose embedding fails are logged and skipped. Successful items
    /// are written with a single upsert; nothing is written if none succeed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final upsert fails.
    pub async fn add_documents(&self, chunks: &[Chunk]) -> Result<AddReport> {
        let mut report = AddReport::default();
        if chunks.is_empty() {
            warn!("no documents to add");
            return Ok(report);
        }

        let total = chunks.len();
        info!(collection = %self.spec.name, count = total, "adding documents to vector store");

        let mut items = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            match self.embed(&chunk.text).await {
                Ok(embedding) => items.push(IndexedItem::from_chunk(chunk, embedding)),
                Err(e) => {
                    error!(chunk.id = %chunk.id(), error = %e, "skipping chunk");
                    report.failed += 1;
                }
            }
            report.processed += 1;

            if self.throttle.every > 0 && (i + 1) % self.throttle.every == 0 {
                info!("Processed {}/{} documents", i + 1, total);
                tokio::time::sleep(self.throttle.pause).await;
            }
        }

        if !items.is_empty() {
            self.index.upsert(&self.spec.name, &items).await?;
            info!(collection = %self.spec.name, count = items.len(), "added documents to vector store");
        }
        report.indexed = items.len();
        Ok(report)
    }

    /// Return up to `top_k` (default: the configured value) passages closest
    /// to `query`, closest first.
    ///
    /// Any failure is logged and yields an empty result.
    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Vec<RetrievalResult> {
        let top_k = top_k.unwrap_or(self.top_k);
        let embedding = match self.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                error!(error = %e, "error searching vector store");
                return Vec::new();
            }
        };
        match self.index.query(&self.spec.name, &embedding, top_k).await {
            Ok(results) => {
                info!(result_count = results.len(), "found relevant documents for query");
                results
            }
            Err(e) => {
                error!(error = %e, "error searching vector store");
                Vec::new()
            }
        }
    }

    /// Number of indexed items, 0 if the index cannot be read.
    pub async fn count(&self) -> usize {
        match self.index.count(&self.spec.name).await {
            Ok(count) => count,
            Err(e) => {
                warn!(collection = %self.spec.name, error = %e, "failed to count items");
                0
            }
        }
    }

    /// Remove every item by dropping the collection and recreating it with
    /// the same definition.
    pub async fn clear(&self) -> Result<()> {
        self.index.delete_collection(&self.spec.name).await?;
        self.index.create_collection(&self.spec).await?;
        info!(collection = %self.spec.name, "cleared collection");
        Ok(())
    }
}
