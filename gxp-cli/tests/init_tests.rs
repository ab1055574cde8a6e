//! Tests for the index initialization flow.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gxp_cli::{InitOutcome, initialize};
use gxp_rag::{
    AddReport, Chunk, DocumentProcessor, EmbeddingProvider, InMemoryVectorStore, IndexStore,
    RecursiveCharacterSplitter, Result, TextExtractor, Throttle,
};

struct ConstantEmbedder;

#[async_trait]
impl EmbeddingProvider for ConstantEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, text.len() as f32])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

struct FixedText(&'static str);

impl TextExtractor for FixedText {
    fn extract(&self, _path: &Path) -> Result<String> {
        Ok(self.0.to_string())
    }
}

async fn store() -> IndexStore {
    IndexStore::open(Arc::new(ConstantEmbedder), Arc::new(InMemoryVectorStore::new()), "docs")
        .await
        .unwrap()
        .with_throttle(Throttle { every: 10, pause: Duration::ZERO })
}

fn processor() -> DocumentProcessor {
    DocumentProcessor::new(Arc::new(RecursiveCharacterSplitter::new(40, 0)))
        .with_extractor(Arc::new(FixedText("Design qualification.\n\nInstallation qualification.")))
}

fn data_dir_with(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::write(dir.path().join(name), b"placeholder").unwrap();
    }
    dir
}

#[tokio::test]
async fn empty_index_is_filled_without_asking() {
    let dir = data_dir_with(&["URS.pdf", "FS.pdf"]);
    let store = store().await;

    let outcome = initialize(&store, &processor(), dir.path(), |_| panic!("should not ask"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        InitOutcome::Indexed { report: AddReport { processed: 4, indexed: 4, failed: 0 }, count: 4 }
    );
}

#[tokio::test]
async fn declining_keeps_existing_items() {
    let dir = data_dir_with(&["URS.pdf"]);
    let store = store().await;
    store.add_documents(&[Chunk::new("old", "old.pdf", 0, 1)]).await.unwrap();

    let outcome = initialize(&store, &processor(), dir.path(), |count| {
        assert_eq!(count, 1);
        Ok(false)
    })
    .await
    .unwrap();

    assert_eq!(outcome, InitOutcome::Kept { count: 1 });
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn confirming_rebuilds_from_scratch() {
    let dir = data_dir_with(&["URS.pdf"]);
    let store = store().await;
    store.add_documents(&[Chunk::new("old", "old.pdf", 0, 1)]).await.unwrap();

    let outcome = initialize(&store, &processor(), dir.path(), |_| Ok(true)).await.unwrap();

    assert!(matches!(outcome, InitOutcome::Indexed { count: 2, .. }));
    let sources: Vec<String> =
        store.search("qualification", Some(5)).await.into_iter().map(|r| r.source().to_string()).collect();
    assert!(sources.iter().all(|s| s == "URS.pdf"));
}

#[tokio::test]
async fn no_documents_writes_nothing() {
    let dir = data_dir_with(&["readme.txt"]);
    let store = store().await;

    let outcome = initialize(&store, &processor(), dir.path(), |_| Ok(true)).await.unwrap();

    assert_eq!(outcome, InitOutcome::NoDocuments);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn missing_data_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store().await;

    let result = initialize(&store, &processor(), &dir.path().join("Data"), |_| Ok(true)).await;
    assert!(result.is_err());
}
