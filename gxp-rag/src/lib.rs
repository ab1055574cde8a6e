//! Retrieval-augmented question answering over GxP validation guidance.
//!
//! This crate provides:
//! - PDF text extraction and recursive character chunking
//! - Embedding and generation provider traits, with OpenAI implementations
//! - Persistent (SQLite) and in-memory vector indexes
//! - An index store for ingestion and similarity search
//! - A generation engine that grounds answers in retrieved passages
//! - Session-scoped conversation history
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` (default) | [`openai::OpenAIEmbeddingProvider`] and [`openai::OpenAIChatProvider`] |

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod processor;
pub mod session;
pub mod sqlite;
pub mod store;
pub mod vectorstore;

pub use chunking::{DEFAULT_SEPARATORS, RecursiveCharacterSplitter, TextSplitter};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkMetadata, IndexedItem, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use engine::{GenerationEngine, RagResponse};
pub use error::{RagError, Result};
pub use generation::{ChatMessage, CompletionRequest, GenerationProvider, Role};
pub use inmemory::InMemoryVectorStore;
pub use processor::{DocumentProcessor, PdfTextExtractor, TextExtractor};
pub use session::{ChatSession, ConversationTurn};
pub use sqlite::SqliteVectorIndex;
pub use store::{AddReport, IndexStore, Throttle};
pub use vectorstore::{CollectionSpec, DistanceMetric, VectorIndex};
