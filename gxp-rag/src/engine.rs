//! Retrieval-augmented answer generation.
//!
//! [`GenerationEngine`] runs search → context → prompt → completion for one
//! query and always returns a [`RagResponse`]; failures are folded into the
//! answer text rather than surfaced as errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use gxp_rag::{GenerationEngine, IndexStore};
//!
//! let engine = GenerationEngine::new(Arc::new(store), Arc::new(chat))
//!     .with_model("gpt-3.5-turbo");
//! let response = engine.generate_response("What is a URS?", None).await;
//! println!("{}\n{:?}", response.answer, response.sources);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::RagConfig;
use crate::document::RetrievalResult;
use crate::error::Result;
use crate::generation::{ChatMessage, CompletionRequest, GenerationProvider};
use crate::store::IndexStore;

/// Context used when nothing was retrieved.
pub const NO_CONTEXT: &str = "No relevant context found.";

/// System message sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are a GxP Validation Expert Assistant.";

/// Answer returned when retrieval finds nothing.
pub const FALLBACK_ANSWER: &str = "I couldn't find relevant information in the GxP validation guidelines to answer your question. Please try rephrasing your question or ask about topics covered in GAMP 5, FDA Part 11, ISO 27001, or other GxP validation standards.";

/// The result of answering one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    /// Generated answer, fallback text, or error description.
    pub answer: String,
    /// Distinct source file names in first-retrieved order.
    pub sources: Vec<String>,
    /// Whether retrieved passages were sent to the model.
    pub context_used: bool,
    /// Number of passages retrieved, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_retrieved: Option<usize>,
}

impl RagResponse {
    fn fallback() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
            context_used: false,
            chunks_retrieved: None,
        }
    }

    fn failed(message: impl std::fmt::Display) -> Self {
        Self {
            answer: format!("An error occurred while generating the response: {message}"),
            sources: Vec::new(),
            context_used: false,
            chunks_retrieved: None,
        }
    }
}

/// Render retrieved passages as numbered, source-labelled blocks.
pub fn build_context(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("[Source {}: {}]\n{}\n", i + 1, result.source(), result.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The instruction prompt wrapping `context` and `query`.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are a GxP Validation Assistant, an expert in pharmaceutical and medical device validation, compliance, and regulatory guidelines. Your role is to provide accurate, detailed, and actionable guidance based on the provided context from official GxP validation documents.

**Context from GxP Validation Guidelines:**
{context}

**User Question:**
{query}

**Instructions:**
1. Answer the question based ONLY on the provided context from the GxP validation guidelines.
2. If the context contains relevant information, provide a comprehensive and detailed answer.
3. Include specific references to the source documents when applicable (e.g., \"According to GAMP 5...\" or \"As per FDA 21 CFR Part 11...\").
4. If the context does not contain enough information to answer the question, clearly state this and explain what information is missing.
5. Use professional terminology appropriate for GxP validation professionals.
6. Structure your answer with clear sections if the response is lengthy.
7. If applicable, provide practical implementation guidance or best practices.

**Answer:**"
    )
}

/// Distinct sources of `results`, keeping the first occurrence of each.
pub fn distinct_sources(results: &[RetrievalResult]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for result in results {
        if !sources.iter().any(|s| s == result.source()) {
            sources.push(result.source().to_string());
        }
    }
    sources
}

/// Stateless question answering over an [`IndexStore`].
pub struct GenerationEngine {
    store: Arc<IndexStore>,
    generator: Arc<dyn GenerationProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GenerationEngine {
    /// Create an engine with the default model settings.
    pub fn new(store: Arc<IndexStore>, generator: Arc<dyn GenerationProvider>) -> Self {
        let defaults = RagConfig::default();
        Self {
            store,
            generator,
            model: defaults.generation_model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Create an engine using the model settings in `config`.
    pub fn from_config(
        config: &RagConfig,
        store: Arc<IndexStore>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self::new(store, generator)
            .with_model(&config.generation_model)
            .with_sampling(config.temperature, config.max_tokens)
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature and generated token limit.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Answer `query` from the top `top_k` passages (default: the store's).
    ///
    /// Never fails: an empty retrieval yields the fallback answer, and any
    /// generation error is described in the answer text.
    pub async fn generate_response(&self, query: &str, top_k: Option<usize>) -> RagResponse {
        let preview: String = query.chars().take(100).collect();
        info!(query = %preview, "processing query");

        let results = self.store.search(query, top_k).await;
        if results.is_empty() {
            return RagResponse::fallback();
        }

        match self.complete(query, &results).await {
            Ok(answer) => {
                info!(chunks_retrieved = results.len(), "response generated");
                RagResponse {
                    answer,
                    sources: distinct_sources(&results),
                    context_used: true,
                    chunks_retrieved: Some(results.len()),
                }
            }
            Err(e) => {
                error!(error = %e, "error generating response");
                RagResponse::failed(e)
            }
        }
    }

    async fn complete(&self, query: &str, results: &[RetrievalResult]) -> Result<String> {
        let context = build_context(results);
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(query, &context)),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        self.generator.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn result(source: &str, text: &str) -> RetrievalResult {
        RetrievalResult {
            id: format!("{source}_0"),
            text: text.to_string(),
            metadata: ChunkMetadata { source: source.to_string(), chunk_id: 0, total_chunks: 1 },
            distance: 0.1,
        }
    }

    #[test]
    fn context_numbers_sources_from_one() {
        let context = build_context(&[result("GAMP5.pdf", "alpha"), result("Part11.pdf", "beta")]);
        assert_eq!(context, "[Source 1: GAMP5.pdf]\nalpha\n\n[Source 2: Part11.pdf]\nbeta\n");
        assert_eq!(build_context(&[]), NO_CONTEXT);
    }

    #[test]
    fn prompt_embeds_context_and_query() {
        let prompt = build_prompt("What is CSV?", "[Source 1: a.pdf]\ntext\n");
        assert!(prompt.contains("**User Question:**\nWhat is CSV?"));
        assert!(prompt.contains("[Source 1: a.pdf]"));
        assert!(prompt.ends_with("**Answer:**"));
    }

    #[test]
    fn sources_keep_first_occurrence_order() {
        let results = [result("b.pdf", "1"), result("a.pdf", "2"), result("b.pdf", "3")];
        assert_eq!(distinct_sources(&results), vec!["b.pdf", "a.pdf"]);
    }
}
