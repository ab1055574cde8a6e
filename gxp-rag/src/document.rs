//! Data types for chunks, indexed items, and retrieval results.

use serde::{Deserialize, Serialize};

/// Per-chunk metadata stored alongside every indexed item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// File name of the originating document.
    pub source: String,
    /// 0-based position of the chunk within its source document.
    pub chunk_id: usize,
    /// Number of chunks produced from the source document.
    pub total_chunks: usize,
}

/// A contiguous span of extracted text from one source document.
///
/// Chunk identity is the pair `(source, chunk_id)`, rendered by
/// [`Chunk::id`] as `"<source>_<chunk_id>"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// Source and position of the chunk.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk for position `chunk_id` of `total_chunks` in `source`.
    pub fn new(
        text: impl Into<String>,
        source: impl Into<String>,
        chunk_id: usize,
        total_chunks: usize,
    ) -> Self {
        Self {
            text: text.into(),
            metadata: ChunkMetadata { source: source.into(), chunk_id, total_chunks },
        }
    }

    /// The index item identifier for this chunk.
    pub fn id(&self) -> String {
        format!("{}_{}", self.metadata.source, self.metadata.chunk_id)
    }

    /// File name of the originating document.
    pub fn source(&self) -> &str {
        &self.metadata.source
    }
}

/// A [`Chunk`] with its vector embedding, as stored in a vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedItem {
    /// Unique identifier, derived from source and chunk position.
    pub id: String,
    /// The vector embedding for this item's text.
    pub embedding: Vec<f32>,
    /// The raw chunk text.
    pub text: String,
    /// Source and position of the chunk.
    pub metadata: ChunkMetadata,
}

impl IndexedItem {
    /// Attach an embedding to a chunk.
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id(),
            embedding,
            text: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
        }
    }
}

/// An indexed item returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Identifier of the matched item.
    pub id: String,
    /// The raw chunk text.
    pub text: String,
    /// Source and position of the chunk.
    pub metadata: ChunkMetadata,
    /// Distance to the query embedding (lower is closer).
    pub distance: f32,
}

impl RetrievalResult {
    /// File name of the originating document.
    pub fn source(&self) -> &str {
        &self.metadata.source
    }
}
