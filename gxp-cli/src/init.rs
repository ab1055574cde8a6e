//! Index initialization: process the data directory and fill the store.

use std::path::Path;

use anyhow::{Context, Result, bail};
use gxp_rag::{AddReport, DocumentProcessor, IndexStore};
use tracing::{error, info};

/// What [`initialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The index already had items and the user chose to keep them.
    Kept {
        /// Items in the index.
        count: usize,
    },
    /// The data directory produced no chunks; nothing was written.
    NoDocuments,
    /// Chunks were embedded and written.
    Indexed {
        /// Per-chunk ingestion results.
        report: AddReport,
        /// Items in the index afterwards.
        count: usize,
    },
}

/// Build the index from the PDFs in `data_dir`.
///
/// If the index already holds items, `confirm_rebuild` is asked whether to
/// clear it; declining leaves the index untouched.
pub async fn initialize<F>(
    store: &IndexStore,
    processor: &DocumentProcessor,
    data_dir: &Path,
    confirm_rebuild: F,
) -> Result<InitOutcome>
where
    F: FnOnce(usize) -> Result<bool>,
{
    if !data_dir.is_dir() {
        bail!("data directory not found: {}", data_dir.display());
    }

    let existing = store.count().await;
    if existing > 0 {
        info!(count = existing, "vector store already contains documents");
        if !confirm_rebuild(existing)? {
            info!("keeping existing documents");
            return Ok(InitOutcome::Kept { count: existing });
        }
        info!("clearing existing collection");
        store.clear().await.context("failed to clear collection")?;
    }

    info!(dir = %data_dir.display(), "processing documents");
    let chunks = processor
        .process_all_documents(data_dir)
        .with_context(|| format!("failed to read {}", data_dir.display()))?;
    if chunks.is_empty() {
        error!("no documents were processed");
        return Ok(InitOutcome::NoDocuments);
    }

    info!(chunk_count = chunks.len(), "adding documents to vector store");
    let report = store.add_documents(&chunks).await.context("failed to write to the index")?;

    let count = store.count().await;
    info!(count, indexed = report.indexed, failed = report.failed, "database initialized");
    Ok(InitOutcome::Indexed { report, count })
}
