//! Hybrid retrieval
//!
//! Combines:
//! - Dense cosine ranking over the bundle's embedding vectors
//! - BM25 lexical ranking from persisted sparse statistics
//! - Reciprocal Rank Fusion (RRF) for score aggregation
//! - An optional heuristic reranking pass

mod bm25;
mod fusion;
mod hybrid;
mod reranker;

pub use bm25::SparseStats;
pub use fusion::{
    reciprocal_rank_fusion, to_ranked, FusedResult, RankedEntry, RetrievalMethod, RrfConfig,
};
pub use hybrid::{HybridRetriever, SearchError};
pub use reranker::HeuristicReranker;
