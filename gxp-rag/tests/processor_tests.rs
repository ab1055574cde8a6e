//! Tests for PDF extraction and batch document processing.

mod common;

use std::sync::Arc;

use common::{FixedTextExtractor, write_pdf};
use gxp_rag::{DocumentProcessor, RagConfig, RecursiveCharacterSplitter};

#[test]
fn valid_pdfs_are_processed_and_corrupt_ones_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("Annex11.pdf"), &["Annex 11 computerised systems"]);
    write_pdf(
        &dir.path().join("GAMP5.pdf"),
        &["Risk based approach", "Supplier assessment"],
    );
    std::fs::write(dir.path().join("broken.pdf"), b"this is not a pdf").unwrap();
    std::fs::write(dir.path().join("empty.pdf"), b"").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

    let processor = DocumentProcessor::from_config(&RagConfig::default());
    let chunks = processor.process_all_documents(dir.path()).unwrap();

    assert!(!chunks.is_empty());
    let mut sources: Vec<&str> = chunks.iter().map(|c| c.source()).collect();
    sources.dedup();
    assert_eq!(sources, vec!["Annex11.pdf", "GAMP5.pdf"]);

    let gamp: Vec<_> = chunks.iter().filter(|c| c.source() == "GAMP5.pdf").collect();
    assert!(gamp[0].text.contains("Risk"));
    assert!(gamp[0].text.contains("Supplier"));
    for (i, chunk) in gamp.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_id, i);
        assert_eq!(chunk.metadata.total_chunks, gamp.len());
    }
}

#[test]
fn corrupt_pdf_extracts_to_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

    let processor = DocumentProcessor::from_config(&RagConfig::default());
    assert_eq!(processor.extract_text(&path), "");
    assert!(processor.process_document(&path).is_empty());
    assert_eq!(processor.extract_text(&dir.path().join("missing.pdf")), "");
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let processor = DocumentProcessor::from_config(&RagConfig::default());
    assert!(processor.process_all_documents(dir.path().join("absent")).is_err());
}

#[test]
fn chunks_are_labelled_with_source_position_and_total() {
    let text = "Installation qualification.\n\nOperational qualification.\n\nPerformance qualification.";
    let processor = DocumentProcessor::new(Arc::new(RecursiveCharacterSplitter::new(30, 0)))
        .with_extractor(Arc::new(FixedTextExtractor(text.to_string())));

    let chunks = processor.process_document(std::path::Path::new("Data/IQOQPQ.pdf"));

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Installation qualification.",
            "Operational qualification.",
            "Performance qualification."
        ]
    );
    let ids: Vec<String> = chunks.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["IQOQPQ.pdf_0", "IQOQPQ.pdf_1", "IQOQPQ.pdf_2"]);
    assert!(chunks.iter().all(|c| c.metadata.total_chunks == 3));
}
