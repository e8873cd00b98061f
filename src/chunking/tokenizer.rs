//! Corpus and query tokenization
//!
//! Contract: query tokenization MUST match corpus tokenization (casing,
//! stopword removal, minimum token length). The sparse index is fitted on
//! `tokenize` output and scores `tokenize` output; a mismatch between the
//! two silently degrades ranking quality without raising an error, so every
//! caller goes through this module.

use unicode_segmentation::UnicodeSegmentation;

/// Stopwords excluded from sparse retrieval terms. Sorted for binary search.
/// Words shorter than three characters are dropped by the length filter and
/// are not listed here.
const STOPWORDS: &[&str] = &[
    "about", "all", "and", "are", "both", "can", "could", "did", "does",
    "each", "every", "few", "for", "from", "had", "has", "have", "how",
    "just", "may", "might", "more", "most", "must", "only", "other", "own",
    "same", "she", "should", "some", "such", "than", "that", "the", "these",
    "they", "this", "those", "too", "very", "was", "were", "what", "when",
    "where", "which", "who", "why", "will", "with", "would", "you",
];

/// Tokenize text for sparse retrieval: lowercase unicode words, minimum
/// three characters, stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() >= 3 && STOPWORDS.binary_search(&w.as_str()).is_err())
        .collect()
}

/// Count tokens in text (word-based, no filtering). Used for chunk budgets,
/// where stopwords still occupy space in the embedding input.
pub fn count_tokens(text: &str) -> usize {
    text.unicode_words().count()
}
