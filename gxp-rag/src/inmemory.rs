//! In-memory vector index.
//!
//! This module provides [`InMemoryVectorStore`], a vector index backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. Nothing is persisted; it is
//! meant for tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedItem, RetrievalResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionSpec, VectorIndex, sort_by_distance};

const BACKEND: &str = "InMemory";

#[derive(Debug)]
struct Collection {
    spec: CollectionSpec,
    items: HashMap<String, IndexedItem>,
}

/// An in-memory [`VectorIndex`] using exhaustive distance search.
///
/// Collections are stored as nested `HashMap`s: collection name → item ID → item.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(collection: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>> {
        let collections = self.collections.read().await;
        Ok(collections.get(name).map(|c| c.spec.clone()))
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(&spec.name) {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("collection '{}' already exists", spec.name),
            });
        }
        collections
            .insert(spec.name.clone(), Collection { spec: spec.clone(), items: HashMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, items: &[IndexedItem]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing(collection))?;
        for item in items {
            store.spec.check_dimensions(BACKEND, &item.embedding)?;
        }
        for item in items {
            store.items.insert(item.id.clone(), item.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;
        store.spec.check_dimensions(BACKEND, embedding)?;

        let mut results: Vec<RetrievalResult> = store
            .items
            .values()
            .map(|item| RetrievalResult {
                id: item.id.clone(),
                text: item.text.clone(),
                metadata: item.metadata.clone(),
                distance: store.spec.metric.distance(&item.embedding, embedding),
            })
            .collect();

        sort_by_distance(&mut results);
        results.truncate(top_k);
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections.get(collection).map(|c| c.items.len()).ok_or_else(|| missing(collection))
    }
}
