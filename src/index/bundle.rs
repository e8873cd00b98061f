//! The versioned index bundle
//!
//! One matched set of {chunks, vectors, sparse statistics, summary}, built
//! offline in a single pass and served read-only. A bundle with mismatched
//! counts or dimensions refuses to initialize rather than serve degraded
//! results: an embedding space mismatched to the query-time provider yields
//! plausible-looking but meaningless similarity scores.

use crate::embedding::EmbeddingProvider;
use crate::retrieval::SparseStats;
use crate::types::{Chunk, Embedding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Errors raised while loading or validating a bundle. All fatal: a bundle
/// that fails validation is never served.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error(
        "bundle counts do not match: {chunks} chunks, {vectors} vectors, \
         {sparse} sparse entries, summary records {summary}"
    )]
    CountMismatch {
        chunks: usize,
        vectors: usize,
        sparse: usize,
        summary: usize,
    },

    #[error("vector {index} has dimension {found}, expected {expected}")]
    RaggedVector {
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error("vectors have dimension {found} but summary records {recorded}")]
    DimensionMismatch { found: usize, recorded: usize },

    #[error(
        "index built with model '{index_model}' ({index_dimensions} dims) but \
         configured provider is '{provider_model}' ({provider_dimensions} dims)"
    )]
    ProviderMismatch {
        index_model: String,
        index_dimensions: usize,
        provider_model: String,
        provider_dimensions: usize,
    },
}

/// Summary metadata recorded index-wide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Identity of the one model that produced every vector in the bundle
    pub embedding_model_id: String,
    pub embedding_dimension: usize,
    pub built_at: DateTime<Utc>,
    pub document_count: usize,
    pub chunk_count: usize,
    /// Every tag appearing in the corpus, sorted
    pub tag_roster: Vec<String>,
}

/// The complete persisted artifact required to serve search without
/// reprocessing source documents.
#[derive(Debug, Clone)]
pub struct IndexBundle {
    pub chunks: Vec<Chunk>,
    /// Parallel to `chunks`, one fixed-length vector per chunk
    pub vectors: Vec<Embedding>,
    pub sparse: SparseStats,
    pub summary: IndexSummary,
}

impl IndexBundle {
    /// Check internal consistency: matching counts everywhere, and the
    /// dimension recomputed from the vectors agreeing with the summary.
    pub fn validate(&self) -> Result<(), BundleError> {
        let chunks = self.chunks.len();
        let vectors = self.vectors.len();
        let sparse = self.sparse.chunk_count();
        let summary = self.summary.chunk_count;

        if chunks != vectors || chunks != sparse || chunks != summary {
            return Err(BundleError::CountMismatch {
                chunks,
                vectors,
                sparse,
                summary,
            });
        }

        // Dimension can only be recomputed when vectors exist
        if let Some(first) = self.vectors.first() {
            let found = first.len();
            for (index, vector) in self.vectors.iter().enumerate() {
                if vector.len() != found {
                    return Err(BundleError::RaggedVector {
                        index,
                        found: vector.len(),
                        expected: found,
                    });
                }
            }
            if found != self.summary.embedding_dimension {
                return Err(BundleError::DimensionMismatch {
                    found,
                    recorded: self.summary.embedding_dimension,
                });
            }
        }

        Ok(())
    }

    /// Check that a query-time provider matches the model this bundle was
    /// built with. Mixing embedding spaces invalidates cosine comparisons,
    /// so a mismatch refuses to search.
    pub fn ensure_compatible(&self, provider: &dyn EmbeddingProvider) -> Result<(), BundleError> {
        if provider.model_id() != self.summary.embedding_model_id
            || provider.dimensions() != self.summary.embedding_dimension
        {
            return Err(BundleError::ProviderMismatch {
                index_model: self.summary.embedding_model_id.clone(),
                index_dimensions: self.summary.embedding_dimension,
                provider_model: provider.model_id().to_string(),
                provider_dimensions: provider.dimensions(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Collect the sorted set of tags appearing across chunks.
pub fn tag_roster(chunks: &[Chunk]) -> Vec<String> {
    let tags: BTreeSet<String> = chunks
        .iter()
        .flat_map(|c| c.tags.iter().cloned())
        .collect();
    tags.into_iter().collect()
}
