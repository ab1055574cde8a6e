//! Property and behaviour tests for recursive character splitting.

use gxp_rag::{RecursiveCharacterSplitter, TextSplitter};
use proptest::prelude::*;

/// Text made of short lowercase words joined by spaces, line breaks, and
/// paragraph breaks.
fn arb_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        ("[a-z]{1,10}", prop_oneof![Just(" "), Just(" "), Just("\n"), Just("\n\n")]),
        1..200,
    )
    .prop_map(|words| words.into_iter().map(|(w, sep)| format!("{w}{sep}")).collect())
}

/// Arbitrary text including multi-byte characters.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![Just('a'), Just('é'), Just('字'), Just(' '), Just('\n'), Just('.')],
        0..600,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// **Chunk size bound**
/// *For any* text and valid size/overlap, every chunk SHALL be non-empty,
/// trimmed, and at most `chunk_size` characters long.
mod prop_chunk_size_bound {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunks_fit_the_budget(
            text in arb_text(),
            chunk_size in 1usize..120,
            overlap_ratio in 0.0f64..0.9,
        ) {
            let chunk_overlap = (chunk_size as f64 * overlap_ratio) as usize;
            let splitter = RecursiveCharacterSplitter::new(chunk_size, chunk_overlap);

            for chunk in splitter.split_text(&text) {
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
                prop_assert!(
                    chunk.chars().count() <= chunk_size,
                    "chunk of {} chars exceeds {}",
                    chunk.chars().count(),
                    chunk_size,
                );
            }
        }
    }
}

/// **No content lost**
/// *For any* document whose words are shorter than the chunk size, every
/// word SHALL appear intact in at least one chunk, in order.
mod prop_no_content_lost {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn every_word_survives(
            text in arb_document(),
            chunk_size in 20usize..200,
            chunk_overlap in 0usize..20,
        ) {
            prop_assume!(chunk_overlap < chunk_size);
            let splitter = RecursiveCharacterSplitter::new(chunk_size, chunk_overlap);
            let chunks = splitter.split_text(&text);

            let words: Vec<&str> = text.split_whitespace().collect();
            let chunk_words: Vec<Vec<&str>> =
                chunks.iter().map(|c| c.split_whitespace().collect()).collect();

            // Walk the words in order; each must be found in the current chunk
            // or a later one.
            let mut at = 0;
            for word in words {
                while at < chunk_words.len() && !chunk_words[at].contains(&word) {
                    at += 1;
                }
                prop_assert!(at < chunk_words.len(), "word {:?} missing from chunks", word);
            }
        }
    }
}

#[test]
fn consecutive_chunks_share_overlap() {
    let text = (0..60).map(|i| format!("w{i:02}")).collect::<Vec<_>>().join(" ");
    let splitter = RecursiveCharacterSplitter::new(40, 12);
    let chunks = splitter.split_text(&text);
    assert!(chunks.len() > 1);

    for pair in chunks.windows(2) {
        let last_word = pair[0].split_whitespace().last().unwrap();
        assert!(
            pair[1].starts_with(last_word) || pair[1].contains(&format!(" {last_word}")),
            "{:?} does not carry the tail of {:?}",
            pair[1],
            pair[0]
        );
    }
}

#[test]
fn whitespace_only_text_yields_nothing() {
    let splitter = RecursiveCharacterSplitter::new(1000, 200);
    assert!(splitter.split_text("").is_empty());
    assert!(splitter.split_text(" \n\n \t").is_empty());
}

#[test]
fn lengths_count_characters_not_bytes() {
    let text = "é".repeat(10);
    let splitter = RecursiveCharacterSplitter::new(10, 0);
    assert_eq!(splitter.split_text(&text), vec![text.clone()]);
}
