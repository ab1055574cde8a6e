//! Vector index trait for storing and searching vector embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{IndexedItem, RetrievalResult};
use crate::error::{RagError, Result};

/// How distances between embeddings are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`, in `[0, 2]`.
    #[default]
    Cosine,
    /// Sum of squared component differences.
    SquaredL2,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => 1.0 - cosine_similarity(a, b),
            Self::SquaredL2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        }
    }

    /// Stable name used when persisting the metric.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::SquaredL2 => "squared_l2",
        }
    }

    /// Parse a name produced by [`as_str`](Self::as_str).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cosine" => Some(Self::Cosine),
            "squared_l2" => Some(Self::SquaredL2),
            _ => None,
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Sort results closest first; equal distances are ordered by id.
pub(crate) fn sort_by_distance(results: &mut [RetrievalResult]) {
    results.sort_by(|a, b| {
        a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id))
    });
}

/// Definition of a named collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection name, stable across runs.
    pub name: String,
    /// Required length of every stored and queried embedding.
    pub dimensions: usize,
    /// Distance used by [`VectorIndex::query`].
    pub metric: DistanceMetric,
    /// Free-text description kept with the collection.
    pub description: Option<String>,
}

impl CollectionSpec {
    /// A cosine-distance collection without a description.
    pub fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self { name: name.into(), dimensions, metric: DistanceMetric::Cosine, description: None }
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Fail if `embedding` does not have this collection's dimensionality.
    pub fn check_dimensions(&self, backend: &str, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(RagError::VectorStoreError {
                backend: backend.to_string(),
                message: format!(
                    "embedding has {} dimensions, collection '{}' expects {}",
                    embedding.len(),
                    self.name,
                    self.dimensions
                ),
            });
        }
        Ok(())
    }
}

/// A persistent or in-memory index of embeddings with nearest-neighbour search.
///
/// Implementations manage named collections of [`IndexedItem`]s.
///
/// # Example
///
/// ```rust,ignore
/// use gxp_rag::{CollectionSpec, InMemoryVectorStore, VectorIndex};
///
/// let index = InMemoryVectorStore::new();
/// index.open_or_create(&CollectionSpec::new("docs", 1536)).await?;
/// index.upsert("docs", &items).await?;
/// let results = index.query("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Short backend name used in errors and logs.
    fn backend(&self) -> &str;

    /// Look up a collection's definition, `None` if it does not exist.
    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>>;

    /// Create a collection. Fails if one with the same name exists.
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()>;

    /// Delete a collection and all its items. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace items by id. Embeddings must match the collection's dimensionality.
    async fn upsert(&self, collection: &str, items: &[IndexedItem]) -> Result<()>;

    /// Return the `top_k` items closest to `embedding`, ordered by
    /// non-decreasing distance.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>>;

    /// Number of items in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Whether a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collection(name).await?.is_some())
    }

    /// Attach to the collection named in `spec`, creating it if absent.
    ///
    /// Idempotent. Returns the stored definition, which for an existing
    /// collection keeps its original metric and description.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::VectorStoreError`] if an existing collection has a
    /// different dimensionality, or if the lookup itself fails.
    async fn open_or_create(&self, spec: &CollectionSpec) -> Result<CollectionSpec> {
        if let Some(existing) = self.collection(&spec.name).await? {
            if existing.dimensions != spec.dimensions {
                return Err(RagError::VectorStoreError {
                    backend: self.backend().to_string(),
                    message: format!(
                        "collection '{}' has {} dimensions, expected {}",
                        spec.name, existing.dimensions, spec.dimensions
                    ),
                });
            }
            return Ok(existing);
        }
        self.create_collection(spec).await?;
        Ok(spec.clone())
    }
}
