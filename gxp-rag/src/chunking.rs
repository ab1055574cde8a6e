//! Text splitting for document chunking.
//!
//! This module provides the [`TextSplitter`] trait and
//! [`RecursiveCharacterSplitter`], which splits text on a prioritized list of
//! separators (paragraphs, lines, sentences, words, then single characters)
//! and merges the pieces back into overlapping chunks of bounded size.
//!
//! All lengths are measured in characters, not bytes.

use std::collections::VecDeque;

use tracing::warn;

/// Separators tried in order: paragraph break, line break, sentence end,
/// word boundary, and the empty-string fallback that splits between characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// A strategy for splitting raw text into chunk-sized pieces.
pub trait TextSplitter: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` if the text is empty or whitespace only.
    fn split_text(&self, text: &str) -> Vec<String>;
}

/// Splits text hierarchically on separators, keeping consecutive chunks overlapping.
///
/// The first separator that occurs in the text is used to cut it into pieces;
/// the separator stays attached to the start of the piece that follows it.
/// Pieces shorter than `chunk_size` are merged greedily, and when a chunk is
/// emitted its trailing pieces (up to `chunk_overlap` characters) are carried
/// into the next one. Pieces that are too long are split again with the
/// remaining separators. Emitted chunks are whitespace-trimmed.
///
/// # Example
///
/// ```rust
/// use gxp_rag::{RecursiveCharacterSplitter, TextSplitter};
///
/// let splitter = RecursiveCharacterSplitter::new(1000, 200);
/// let chunks = splitter.split_text("Installation Qualification.\n\nOperational Qualification.");
/// assert_eq!(chunks.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter using [`DEFAULT_SEPARATORS`].
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short_pieces: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }

            if !short_pieces.is_empty() {
                chunks.extend(self.merge_pieces(&short_pieces));
                short_pieces.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !short_pieces.is_empty() {
            chunks.extend(self.merge_pieces(&short_pieces));
        }

        chunks
    }

    /// Merge pieces into chunks of at most `chunk_size` characters, carrying
    /// up to `chunk_overlap` characters of trailing pieces forward.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(total, chunk_size = self.chunk_size, "created a chunk longer than the limit");
                }
                if !current.is_empty() {
                    if let Some(chunk) = join_pieces(&current) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_pieces(&current) {
            chunks.push(chunk);
        }
        chunks
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Split text at a separator, keeping the separator attached to the start of
/// the following segment. An empty separator splits between characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }

    let mut result = Vec::new();
    let mut start = 0;
    let mut search_from = 0;

    while let Some(pos) = text[search_from..].find(separator) {
        let at = search_from + pos;
        if at > start {
            result.push(&text[start..at]);
        }
        start = at;
        search_from = at + separator.len();
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_stays_with_following_segment() {
        assert_eq!(split_keeping_separator("a\n\nb\n\nc", "\n\n"), vec!["a", "\n\nb", "\n\nc"]);
        assert_eq!(split_keeping_separator("\n\nabc", "\n\n"), vec!["\n\nabc"]);
        assert_eq!(split_keeping_separator("a\n\n\n\nb", "\n\n"), vec!["a", "\n\n", "\n\nb"]);
        assert_eq!(split_keeping_separator("añb", ""), vec!["a", "ñ", "b"]);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new(100, 20);
        assert_eq!(splitter.split_text("  Annex 11 applies.  "), vec!["Annex 11 applies."]);
        assert!(splitter.split_text(" \n\n ").is_empty());
    }

    #[test]
    fn paragraphs_are_preferred_over_words() {
        let splitter = RecursiveCharacterSplitter::new(30, 0);
        let text = "Risk assessment first.\n\nThen supplier audits follow.";
        assert_eq!(
            splitter.split_text(text),
            vec!["Risk assessment first.", "Then supplier audits follow."]
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveCharacterSplitter::new(4, 1);
        let chunks = splitter.split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }
}
