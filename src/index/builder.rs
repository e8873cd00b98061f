//! Offline index construction
//!
//! One full pass over the corpus: chunk every document, embed the chunk
//! texts in bounded batches, fit the sparse statistics, assemble the
//! summary. Per-document failures are collected into the build report
//! without aborting the batch; a terminal embedding-provider failure aborts
//! the whole build.

use super::bundle::{tag_roster, IndexBundle, IndexSummary};
use crate::chunking::SectionSplitter;
use crate::config::Config;
use crate::content::ContentError;
use crate::embedding::EmbeddingProvider;
use crate::retrieval::SparseStats;
use crate::types::{Chunk, Document, Embedding};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a full index build
#[derive(Debug)]
pub struct BuildReport {
    /// Documents offered to the builder
    pub document_count: usize,
    /// Documents that produced at least one chunk
    pub indexed_documents: usize,
    pub chunk_count: usize,
    /// Per-document failures, none of which aborted the build
    pub errors: Vec<ContentError>,
}

/// Builds index bundles from documents
pub struct IndexBuilder {
    splitter: SectionSplitter,
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    bm25_k1: f32,
    bm25_b: f32,
}

impl IndexBuilder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: &Config) -> Self {
        Self {
            splitter: SectionSplitter::new(config.chunking.clone()),
            provider,
            batch_size: config.embedding.max_batch_size.max(1),
            bm25_k1: config.retrieval.bm25_k1,
            bm25_b: config.retrieval.bm25_b,
        }
    }

    /// Build a fresh bundle from the full corpus. Always a full rebuild:
    /// content changes replace the bundle, they never patch it.
    pub fn build(&self, documents: &[Document]) -> Result<(IndexBundle, BuildReport)> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut errors: Vec<ContentError> = Vec::new();
        let mut indexed_slugs: BTreeSet<String> = BTreeSet::new();

        for document in documents {
            if document.body.trim().is_empty() {
                let err = ContentError::EmptyBody {
                    path: document.slug.clone(),
                };
                warn!("Skipping document: {}", err);
                errors.push(err);
                continue;
            }

            let document_chunks = self.splitter.split_document(document);
            if document_chunks.is_empty() {
                let err = ContentError::EmptyBody {
                    path: document.slug.clone(),
                };
                warn!("Skipping document: {}", err);
                errors.push(err);
                continue;
            }

            indexed_slugs.insert(document.slug.clone());
            chunks.extend(document_chunks);
        }

        info!(
            "Chunked {} of {} documents into {} chunks",
            indexed_slugs.len(),
            documents.len(),
            chunks.len()
        );

        let vectors = self.embed_chunks(&chunks)?;

        let sparse = SparseStats::fit(
            chunks.iter().map(|c| c.text.as_str()),
            self.bm25_k1,
            self.bm25_b,
        );

        let summary = IndexSummary {
            embedding_model_id: self.provider.model_id().to_string(),
            embedding_dimension: self.provider.dimensions(),
            built_at: Utc::now(),
            document_count: indexed_slugs.len(),
            chunk_count: chunks.len(),
            tag_roster: tag_roster(&chunks),
        };

        let report = BuildReport {
            document_count: documents.len(),
            indexed_documents: indexed_slugs.len(),
            chunk_count: chunks.len(),
            errors,
        };

        let bundle = IndexBundle {
            chunks,
            vectors,
            sparse,
            summary,
        };
        bundle
            .validate()
            .context("freshly built bundle failed validation")?;

        Ok((bundle, report))
    }

    /// Embed all chunk texts in bounded batches. A provider error here is
    /// terminal for the build: a bundle must never contain placeholder
    /// vectors.
    fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut vectors: Vec<Embedding> = Vec::with_capacity(texts.len());

        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!("Embedding batch {} ({} texts)", i + 1, batch.len());
            let embeddings = self
                .provider
                .embed_batch(batch)
                .with_context(|| format!("embedding batch {} failed", i + 1))?;
            vectors.extend(embeddings);
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::LocalProvider;

    fn builder(dimensions: usize) -> IndexBuilder {
        let mut config = Config::default();
        config.embedding.dimensions = dimensions;
        config.embedding.max_batch_size = 2;
        let provider = Arc::new(LocalProvider::new(dimensions, 2));
        IndexBuilder::new(provider, &config)
    }

    fn sample_documents() -> Vec<Document> {
        vec![
            Document::new("rag-search", "RAG hybrid search using BM25 statistics.")
                .with_tags(vec!["RAG".to_string(), "AI".to_string()]),
            Document::new("aws-lambda", "Deploying Lambda functions to AWS regions.")
                .with_tags(vec!["AWS".to_string()]),
        ]
    }

    #[test]
    fn test_build_produces_matched_set() {
        let (bundle, report) = builder(32).build(&sample_documents()).unwrap();

        assert_eq!(bundle.chunks.len(), bundle.vectors.len());
        assert_eq!(bundle.sparse.chunk_count(), bundle.chunks.len());
        assert_eq!(bundle.summary.chunk_count, bundle.chunks.len());
        assert_eq!(bundle.summary.document_count, 2);
        assert_eq!(bundle.summary.embedding_dimension, 32);
        assert_eq!(bundle.summary.embedding_model_id, "hashed-bow-v1-32");
        assert_eq!(report.indexed_documents, 2);
        assert!(report.errors.is_empty());
        assert!(bundle.validate().is_ok());
    }

    #[test]
    fn test_empty_document_reported_not_fatal() {
        let mut docs = sample_documents();
        docs.push(Document::new("empty-post", "   "));

        let (bundle, report) = builder(16).build(&docs).unwrap();

        assert_eq!(report.document_count, 3);
        assert_eq!(report.indexed_documents, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], ContentError::EmptyBody { .. }));
        assert_eq!(bundle.summary.document_count, 2);
    }

    #[test]
    fn test_tag_roster_collected() {
        let (bundle, _) = builder(16).build(&sample_documents()).unwrap();
        assert_eq!(bundle.summary.tag_roster, vec!["AI", "AWS", "RAG"]);
    }

    #[test]
    fn test_rebuild_unchanged_corpus_identical_chunk_ids() {
        let docs = sample_documents();
        let b = builder(16);
        let (first, _) = b.build(&docs).unwrap();
        let (second, _) = b.build(&docs).unwrap();

        let ids_first: Vec<&str> = first.chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        let ids_second: Vec<&str> = second.chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids_first, ids_second);
        assert_eq!(first.vectors, second.vectors, "vectors are deterministic too");
    }

    #[test]
    fn test_empty_corpus_builds_empty_bundle() {
        let (bundle, report) = builder(16).build(&[]).unwrap();
        assert!(bundle.is_empty());
        assert_eq!(report.chunk_count, 0);
        assert!(bundle.validate().is_ok());
    }
}
