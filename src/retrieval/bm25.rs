//! BM25 sparse retrieval statistics
//!
//! Fitted once over the full chunk corpus and persisted with the index
//! bundle: per-term document frequency, per-chunk term frequency and
//! length-normalization statistics are sufficient to score queries without
//! rescanning raw text.
//!
//! Corpus and query text both pass through [`crate::chunking::tokenize`];
//! see that module for the shared tokenization contract.

use crate::chunking::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted BM25 statistics for a chunk corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseStats {
    /// Term-frequency saturation
    k1: f32,
    /// Length normalization
    b: f32,
    /// Chunks containing each term
    doc_freqs: HashMap<String, u32>,
    /// Term frequencies per chunk, corpus order
    term_freqs: Vec<HashMap<String, u32>>,
    /// Token count per chunk after tokenization, corpus order
    chunk_lengths: Vec<u32>,
    avg_chunk_len: f32,
    chunk_count: usize,
}

impl SparseStats {
    /// Fit statistics over the chunk corpus in one pass.
    pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>, k1: f32, b: f32) -> Self {
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut term_freqs: Vec<HashMap<String, u32>> = Vec::new();
        let mut chunk_lengths: Vec<u32> = Vec::new();

        for text in texts {
            let tokens = tokenize(text);
            chunk_lengths.push(tokens.len() as u32);

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let chunk_count = term_freqs.len();
        let avg_chunk_len = if chunk_count > 0 {
            chunk_lengths.iter().sum::<u32>() as f32 / chunk_count as f32
        } else {
            0.0
        };

        Self {
            k1,
            b,
            doc_freqs,
            term_freqs,
            chunk_lengths,
            avg_chunk_len,
            chunk_count,
        }
    }

    /// Number of chunks the statistics were fitted on
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Number of distinct terms in the corpus
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freqs.len()
    }

    /// Smoothed IDF, non-negative even for terms appearing in most chunks.
    fn idf(&self, term: &str) -> Option<f32> {
        let df = *self.doc_freqs.get(term)? as f32;
        let n = self.chunk_count as f32;
        Some(((n - df + 0.5) / (df + 0.5) + 1.0).ln())
    }

    /// BM25 score of pre-tokenized query terms against one chunk.
    pub fn score(&self, query_terms: &[String], chunk_index: usize) -> f32 {
        let Some(freqs) = self.term_freqs.get(chunk_index) else {
            return 0.0;
        };
        let chunk_len = self.chunk_lengths[chunk_index] as f32;

        let mut score = 0.0;
        for term in query_terms {
            let Some(idf) = self.idf(term) else { continue };
            let tf = *freqs.get(term).unwrap_or(&0) as f32;
            if tf == 0.0 {
                continue;
            }
            let numerator = tf * (self.k1 + 1.0);
            let denominator =
                tf + self.k1 * (1.0 - self.b + self.b * chunk_len / self.avg_chunk_len.max(1e-6));
            score += idf * numerator / denominator;
        }
        score
    }

    /// Rank a candidate universe of chunk indices against a query, keeping
    /// chunks with a positive score, best first. Ties break on the lower
    /// index so ranking is deterministic.
    pub fn search(&self, query: &str, universe: &[usize], limit: usize) -> Vec<(usize, f32)> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = universe
            .iter()
            .map(|&i| (i, self.score(&query_terms, i)))
            .filter(|(_, s)| *s > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored
    }
}
