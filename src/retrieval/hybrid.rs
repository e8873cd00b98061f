//! Hybrid retrieval combining dense and sparse search
//!
//! Both rankings draw from the same tag-filtered candidate universe, are
//! fused with Reciprocal Rank Fusion, truncated to `top_k` and optionally
//! reranked. Deterministic for fixed inputs and a fixed bundle: fused-score
//! ties break on chunk ordinal then document slug, never on storage order.

use super::fusion::{reciprocal_rank_fusion, to_ranked, RetrievalMethod, RrfConfig};
use super::reranker::HeuristicReranker;
use crate::config::RetrievalConfig;
use crate::embedding::{cosine_similarity, EmbeddingError, EmbeddingProvider};
use crate::index::{BundleError, IndexBundle};
use crate::types::{Query, SearchResult};
use crate::util::truncate_str;
use std::sync::Arc;
use tracing::{debug, info};

/// Query-time errors. Typed so "no results" (an empty Ok) and "search
/// failed" never collapse into each other.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The configured provider does not match the model recorded in the
    /// bundle; searching would compare vectors from different spaces.
    #[error("index bundle incompatible with configured embedding provider")]
    ProviderMismatch(#[source] BundleError),

    /// Query embedding exceeded its deadline. Surfaced to the caller, not
    /// auto-retried at query time.
    #[error("query embedding timed out")]
    QueryTimeout(#[source] EmbeddingError),

    /// Query embedding failed for a reason other than a timeout
    #[error("query embedding failed")]
    QueryEmbedding(#[source] EmbeddingError),
}

/// Hybrid retrieval engine over an immutable index bundle.
///
/// Holds no mutable state: concurrent `search` calls share the same bundle
/// without locking.
pub struct HybridRetriever {
    bundle: Arc<IndexBundle>,
    provider: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    /// Create a retriever, verifying provider/bundle compatibility up front
    /// so a mismatch fails here rather than mid-search.
    pub fn new(
        bundle: Arc<IndexBundle>,
        provider: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Result<Self, SearchError> {
        bundle
            .ensure_compatible(provider.as_ref())
            .map_err(SearchError::ProviderMismatch)?;
        Ok(Self {
            bundle,
            provider,
            config,
        })
    }

    pub fn bundle(&self) -> &Arc<IndexBundle> {
        &self.bundle
    }

    /// Hybrid search: dense cosine + BM25 over the same candidate universe,
    /// fused, truncated, optionally reranked.
    pub fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        if query.text.trim().is_empty() || query.top_k == 0 {
            return Ok(Vec::new());
        }

        let universe = self.candidate_universe(query.tags.as_deref());
        if universe.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed(&query.text).map_err(|e| match e {
            EmbeddingError::Timeout(_) => SearchError::QueryTimeout(e),
            other => SearchError::QueryEmbedding(other),
        })?;

        // Dense ranking over the universe
        let mut dense: Vec<(usize, f32)> = universe
            .iter()
            .map(|&i| (i, cosine_similarity(&query_vector, &self.bundle.vectors[i])))
            .collect();
        dense.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        dense.truncate(self.config.candidate_count);

        // Sparse ranking over the same universe
        let sparse = self
            .bundle
            .sparse
            .search(&query.text, &universe, self.config.candidate_count);

        debug!(
            "Candidates: {} dense, {} sparse (universe {})",
            dense.len(),
            sparse.len(),
            universe.len()
        );

        let ranked_lists = vec![
            to_ranked(&dense, RetrievalMethod::Dense),
            to_ranked(&sparse, RetrievalMethod::Sparse),
        ];
        let fused = reciprocal_rank_fusion(&ranked_lists, &RrfConfig { k: self.config.rrf_k });

        let mut results: Vec<SearchResult> = fused
            .into_iter()
            .map(|f| {
                let mut result = SearchResult::new(self.bundle.chunks[f.index].clone(), f.score);
                result.matched_by = f.methods;
                result
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.chunk.ordinal.cmp(&b.chunk.ordinal))
                .then(a.chunk.document_slug.cmp(&b.chunk.document_slug))
        });

        if let Some(min_score) = self.config.min_score {
            results.retain(|r| r.score >= min_score);
        }
        results.truncate(query.top_k);

        // Reranking may reorder the truncated set, never change it
        if self.config.enable_reranking {
            HeuristicReranker::rerank(&query.text, &mut results);
        }

        info!(
            "Hybrid search for '{}': {} results",
            truncate_str(&query.text, 50),
            results.len()
        );
        Ok(results)
    }

    /// Chunk indices eligible for this query. Tag filtering happens before
    /// ranking so dense and sparse scores are computed over the same set.
    fn candidate_universe(&self, tags: Option<&[String]>) -> Vec<usize> {
        match tags {
            Some(filter) if !filter.is_empty() => self
                .bundle
                .chunks
                .iter()
                .enumerate()
                .filter(|(_, chunk)| chunk.matches_tags(filter))
                .map(|(i, _)| i)
                .collect(),
            _ => (0..self.bundle.chunks.len()).collect(),
        }
    }
}
