//! Deterministic local embedding model
//!
//! Projects the tokenized text into a fixed number of signed hash buckets
//! and L2-normalizes the result. Entirely self-contained: no model files,
//! no network, identical output for identical input across processes, so
//! index builds are reproducible and query vectors always live in the same
//! space as the corpus vectors built with the same model id.

use super::provider::{normalize_embedding, EmbeddingProvider, EmbeddingResult};
use crate::chunking::tokenize;
use crate::types::Embedding;
use xxhash_rust::xxh3::xxh3_64;

/// Local hashed bag-of-words embedding model
#[derive(Debug)]
pub struct LocalProvider {
    dimensions: usize,
    num_threads: usize,
    model_id: String,
}

impl LocalProvider {
    pub fn new(dimensions: usize, num_threads: usize) -> Self {
        Self {
            dimensions,
            num_threads: num_threads.max(1),
            model_id: format!("hashed-bow-v1-{}", dimensions),
        }
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let hash = xxh3_64(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            // Independent bit decides the sign so colliding terms do not
            // always reinforce each other
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize_embedding(&vector)
    }
}

impl EmbeddingProvider for LocalProvider {
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Fan the batch out across a bounded worker pool, preserving order
        let workers = self.num_threads.min(texts.len());
        let chunk_size = texts.len().div_ceil(workers);

        let embeddings = std::thread::scope(|scope| {
            let handles: Vec<_> = texts
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || chunk.iter().map(|t| self.embed_text(t)).collect::<Vec<_>>())
                })
                .collect();

            let mut all = Vec::with_capacity(texts.len());
            for handle in handles {
                match handle.join() {
                    Ok(batch) => all.extend(batch),
                    Err(_) => return Err(super::provider::EmbeddingError::Failed(
                        "embedding worker panicked".to_string(),
                    )),
                }
            }
            Ok(all)
        })?;

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
