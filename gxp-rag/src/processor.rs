//! PDF text extraction and chunking.
//!
//! [`DocumentProcessor`] turns a directory of PDF files into [`Chunk`]s ready
//! for indexing. Extraction failures are soft: a document that cannot be read
//! is logged and contributes no chunks, and never aborts a batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::{RecursiveCharacterSplitter, TextSplitter};
use crate::config::RagConfig;
use crate::document::Chunk;
use crate::error::{RagError, Result};

/// File extensions picked up by [`DocumentProcessor::process_all_documents`].
pub const SUPPORTED_EXTENSIONS: [&str; 1] = ["pdf"];

/// Extracts plain text from a document on disk.
pub trait TextExtractor: Send + Sync {
    /// Read the whole document and return its text.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// A [`TextExtractor`] for PDF files backed by `lopdf`.
///
/// Pages are read in page-number order and each page's text is followed by a
/// newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let document = lopdf::Document::load(path).map_err(|e| extraction_error(path, e))?;
        let pages = document.get_pages();
        info!(file = %file_name(path), pages = pages.len(), "processing document");

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text =
                document.extract_text(&[*page_number]).map_err(|e| extraction_error(path, e))?;
            text.push_str(&page_text);
            text.push('\n');
        }
        Ok(text)
    }
}

fn extraction_error(path: &Path, e: lopdf::Error) -> RagError {
    RagError::ExtractionError { path: path.display().to_string(), message: e.to_string() }
}

/// The file name used as a chunk's `source`.
fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Extracts, splits, and labels documents for ingestion.
///
/// # Example
///
/// ```rust,ignore
/// use gxp_rag::{DocumentProcessor, RagConfig};
///
/// let processor = DocumentProcessor::from_config(&RagConfig::default());
/// let chunks = processor.process_all_documents("Data")?;
/// ```
pub struct DocumentProcessor {
    splitter: Arc<dyn TextSplitter>,
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentProcessor {
    /// Create a processor that reads PDFs and splits them with `splitter`.
    pub fn new(splitter: Arc<dyn TextSplitter>) -> Self {
        Self { splitter, extractor: Arc::new(PdfTextExtractor) }
    }

    /// Create a processor with a [`RecursiveCharacterSplitter`] sized from `config`.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(Arc::new(RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap)))
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extract all text from a document.
    ///
    /// Returns an empty string if the document cannot be read; the failure is
    /// logged, not propagated.
    pub fn extract_text(&self, path: &Path) -> String {
        match self.extractor.extract(path) {
            Ok(text) => text,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to extract text");
                String::new()
            }
        }
    }

    /// Split text into overlapping chunks.
    pub fn split_into_chunks(&self, text: &str) -> Vec<String> {
        self.splitter.split_text(text)
    }

    /// Extract and split one document, labelling every chunk with its source
    /// file name, position, and the document's chunk count.
    pub fn process_document(&self, path: &Path) -> Vec<Chunk> {
        let text = self.extract_text(path);
        if text.is_empty() {
            return Vec::new();
        }

        let source = file_name(path);
        let pieces = self.split_into_chunks(&text);
        let total_chunks = pieces.len();
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_id, piece)| Chunk::new(piece, source.clone(), chunk_id, total_chunks))
            .collect();

        info!(source = %source, chunk_count = chunks.len(), "created chunks");
        chunks
    }

    /// Process every supported file directly inside `dir` (not recursively).
    ///
    /// Files are visited in path order. A document that fails to process
    /// contributes no chunks and does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] only if the directory itself cannot be listed.
    pub fn process_all_documents(&self, dir: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let files = discover_documents(dir.as_ref())?;
        info!(dir = %dir.as_ref().display(), file_count = files.len(), "found documents to process");

        let mut all_chunks = Vec::new();
        for file in &files {
            all_chunks.extend(self.process_document(file));
        }

        info!(chunk_count = all_chunks.len(), "total chunks created");
        Ok(all_chunks)
    }
}

/// List supported files directly inside `dir`, sorted by path.
fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        if path.is_file() && is_supported(&path) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping unsupported entry");
        }
    }
    files.sort();
    Ok(files)
}
