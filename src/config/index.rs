//! Chunking, retrieval and store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for document chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk; oversized sections are split at sentence
    /// boundaries
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Token overlap carried between adjacent sub-chunks of a split section
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

fn default_max_tokens() -> usize {
    512
}

fn default_overlap_tokens() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

/// Configuration for hybrid retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates taken from each ranking before fusion
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,
    /// Rank constant for Reciprocal Rank Fusion
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,
    /// BM25 length normalization
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,
    /// Apply the heuristic reranker to the truncated result set
    #[serde(default = "default_enable_reranking")]
    pub enable_reranking: bool,
    /// Optional minimum fused score; results below are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
}

fn default_candidate_count() -> usize {
    20
}

fn default_rrf_k() -> usize {
    60
}

fn default_bm25_k1() -> f32 {
    1.5
}

fn default_bm25_b() -> f32 {
    0.75
}

fn default_enable_reranking() -> bool {
    true
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_count: default_candidate_count(),
            rrf_k: default_rrf_k(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
            enable_reranking: default_enable_reranking(),
            min_score: None,
        }
    }
}

/// Configuration for the on-disk index bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the persisted bundle artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
