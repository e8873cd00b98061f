//! Heuristic reranking
//!
//! A second, cheap relevance pass over an already-truncated result set:
//! blends the fused score with query-term overlap against chunk content,
//! document title and section heading. Reordering only; the candidate set
//! itself never changes.

use crate::chunking::tokenize;
use crate::types::SearchResult;
use std::collections::HashSet;

/// Weights for the blended rerank score
const WEIGHT_ORIGINAL: f32 = 0.4;
const WEIGHT_CONTENT: f32 = 0.3;
const WEIGHT_TITLE: f32 = 0.2;
const WEIGHT_HEADING: f32 = 0.1;

/// Query-term-overlap reranker
pub struct HeuristicReranker;

impl HeuristicReranker {
    /// Re-sort results by blended relevance. Scores are updated in place.
    pub fn rerank(query: &str, results: &mut [SearchResult]) {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() || results.is_empty() {
            return;
        }

        for result in results.iter_mut() {
            let content_overlap = overlap(&query_terms, &result.chunk.text);
            let title_overlap = overlap(&query_terms, &result.chunk.document_title);
            let heading_bonus = result
                .chunk
                .heading
                .as_deref()
                .map(|h| overlap(&query_terms, h) * 0.5)
                .unwrap_or(0.0);

            result.score = result.score * WEIGHT_ORIGINAL
                + content_overlap * WEIGHT_CONTENT
                + title_overlap * WEIGHT_TITLE
                + heading_bonus * WEIGHT_HEADING;
        }

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.chunk.ordinal.cmp(&b.chunk.ordinal))
                .then(a.chunk.document_slug.cmp(&b.chunk.document_slug))
        });
    }
}

/// Fraction of query terms present in the text
fn overlap(query_terms: &HashSet<String>, text: &str) -> f32 {
    let text_terms: HashSet<String> = tokenize(text).into_iter().collect();
    let shared = query_terms.iter().filter(|t| text_terms.contains(*t)).count();
    shared as f32 / query_terms.len() as f32
}
