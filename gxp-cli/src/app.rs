//! Wiring of the library components from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use gxp_rag::openai::{OpenAIChatProvider, OpenAIEmbeddingProvider};
use gxp_rag::{GenerationEngine, IndexStore, RagConfig, SqliteVectorIndex};
use tracing::info;

/// Open the persistent index and connect the OpenAI services.
pub async fn connect(config: &RagConfig) -> Result<(Arc<IndexStore>, GenerationEngine)> {
    let embedder = OpenAIEmbeddingProvider::new(config.api_key.clone())?
        .with_model(&config.embedding_model)
        .with_expected_dimensions(config.embedding_dimensions)
        .with_base_url(&config.api_base_url);
    let chat = OpenAIChatProvider::new(config.api_key.clone())?.with_base_url(&config.api_base_url);

    let index = SqliteVectorIndex::open(&config.index_dir)
        .with_context(|| format!("failed to open vector index in {}", config.index_dir.display()))?;

    let store = IndexStore::from_config(config, Arc::new(embedder), Arc::new(index))
        .await
        .context("failed to open collection")?;
    let store = Arc::new(store);
    let engine = GenerationEngine::from_config(config, store.clone(), Arc::new(chat));

    info!(
        collection = %config.collection_name,
        embedding_model = %config.embedding_model,
        generation_model = %config.generation_model,
        "components initialized"
    );
    Ok((store, engine))
}
