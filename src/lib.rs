//! HIndex: Hybrid Search Index for Long-Form Content
//!
//! A retrieval engine that turns a library of long-form markdown documents
//! into a queryable index, featuring:
//! - Section-aware chunking with sentence-boundary splitting and overlap
//! - Pluggable embedding providers (deterministic local model, managed HTTP API)
//! - BM25 sparse statistics persisted alongside the dense vectors
//! - Hybrid retrieval (dense cosine + BM25 + RRF fusion) with tag filtering
//!   and optional reranking
//! - A versioned on-disk index bundle, validated on load, served read-only

pub mod answer;
pub mod chunking;
pub mod config;
pub mod content;
pub mod embedding;
pub mod index;
pub mod retrieval;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
