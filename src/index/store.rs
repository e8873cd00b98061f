//! On-disk persistence for the index bundle
//!
//! Layout under the store directory:
//! - `chunks.json`: chunk texts and metadata
//! - `vectors.bin`: dense vectors (bincode)
//! - `sparse.bin`: BM25 statistics (bincode)
//! - `summary.json`: index-wide summary metadata
//!
//! The four artifacts form one matched set: `load` reassembles and validates
//! them together, failing loudly on any inconsistency instead of serving a
//! partially valid index.

use super::bundle::{BundleError, IndexBundle, IndexSummary};
use crate::embedding::EmbeddingProvider;
use crate::retrieval::SparseStats;
use crate::types::{Chunk, Embedding};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const CHUNKS_FILE: &str = "chunks.json";
const VECTORS_FILE: &str = "vectors.bin";
const SPARSE_FILE: &str = "sparse.bin";
const SUMMARY_FILE: &str = "summary.json";

/// Reads and writes index bundles in a directory
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Whether a bundle has been written here
    pub fn exists(&self) -> bool {
        [CHUNKS_FILE, VECTORS_FILE, SPARSE_FILE, SUMMARY_FILE]
            .iter()
            .all(|f| self.dir.join(f).exists())
    }

    /// Persist a bundle as one matched set. The bundle is validated first so
    /// an inconsistent set is never written.
    pub fn write(&self, bundle: &IndexBundle) -> Result<(), BundleError> {
        bundle.validate()?;

        fs::create_dir_all(&self.dir).map_err(|source| BundleError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        self.write_json(CHUNKS_FILE, &bundle.chunks)?;
        self.write_bin(VECTORS_FILE, &bundle.vectors)?;
        self.write_bin(SPARSE_FILE, &bundle.sparse)?;
        self.write_json(SUMMARY_FILE, &bundle.summary)?;

        info!(
            "Wrote index bundle to {}: {} chunks, {} dims",
            self.dir.display(),
            bundle.summary.chunk_count,
            bundle.summary.embedding_dimension
        );
        Ok(())
    }

    /// Load and validate a bundle. Any missing artifact, decode failure or
    /// internal inconsistency aborts the load.
    pub fn load(&self) -> Result<IndexBundle, BundleError> {
        let chunks: Vec<Chunk> = self.read_json(CHUNKS_FILE)?;
        let vectors: Vec<Embedding> = self.read_bin(VECTORS_FILE)?;
        let sparse: SparseStats = self.read_bin(SPARSE_FILE)?;
        let summary: IndexSummary = self.read_json(SUMMARY_FILE)?;

        let bundle = IndexBundle {
            chunks,
            vectors,
            sparse,
            summary,
        };
        bundle.validate()?;

        info!(
            "Loaded index bundle from {}: {} chunks, model '{}'",
            self.dir.display(),
            bundle.summary.chunk_count,
            bundle.summary.embedding_model_id
        );
        Ok(bundle)
    }

    /// Load a bundle and verify it matches the query-time provider.
    pub fn load_for(&self, provider: &dyn EmbeddingProvider) -> Result<IndexBundle, BundleError> {
        let bundle = self.load()?;
        bundle.ensure_compatible(provider)?;
        Ok(bundle)
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), BundleError> {
        let path = self.dir.join(name);
        let data = serde_json::to_vec_pretty(value).map_err(|e| BundleError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, data).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, BundleError> {
        let path = self.dir.join(name);
        let data = fs::read(&path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|e| BundleError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write_bin<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), BundleError> {
        let path = self.dir.join(name);
        let data = bincode::serialize(value).map_err(|e| BundleError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, data).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn read_bin<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, BundleError> {
        let path = self.dir.join(name);
        let data = fs::read(&path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        bincode::deserialize(&data).map_err(|e| BundleError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::bundle::tag_roster;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_chunk(ordinal: usize, text: &str) -> Chunk {
        Chunk {
            chunk_id: crate::types::derive_chunk_id("post", ordinal, text),
            document_slug: "post".to_string(),
            document_title: "Post".to_string(),
            heading: None,
            ordinal,
            tags: vec!["tag".to_string()],
            url_fragment: String::new(),
            token_count: text.split_whitespace().count(),
            text: text.to_string(),
        }
    }

    fn make_bundle() -> IndexBundle {
        let chunks = vec![
            make_chunk(0, "first chunk content"),
            make_chunk(1, "second chunk content"),
        ];
        let vectors = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
        let sparse = SparseStats::fit(chunks.iter().map(|c| c.text.as_str()), 1.5, 0.75);
        let summary = IndexSummary {
            embedding_model_id: "hashed-bow-v1-3".to_string(),
            embedding_dimension: 3,
            built_at: Utc::now(),
            document_count: 1,
            chunk_count: 2,
            tag_roster: tag_roster(&chunks),
        };
        IndexBundle {
            chunks,
            vectors,
            sparse,
            summary,
        }
    }

    #[test]
    fn test_round_trip_preserves_counts() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());

        let bundle = make_bundle();
        store.write(&bundle).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.chunks.len(), bundle.chunks.len());
        assert_eq!(loaded.vectors.len(), bundle.vectors.len());
        assert_eq!(loaded.sparse.chunk_count(), bundle.sparse.chunk_count());
        assert_eq!(loaded.summary.chunk_count, bundle.summary.chunk_count);
        assert_eq!(loaded.chunks[0].chunk_id, bundle.chunks[0].chunk_id);
        assert_eq!(loaded.vectors[1], bundle.vectors[1]);
    }

    #[test]
    fn test_missing_artifact_fails_load() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());
        store.write(&make_bundle()).unwrap();

        fs::remove_file(tmp.path().join(VECTORS_FILE)).unwrap();
        assert!(!store.exists());
        assert!(matches!(store.load().unwrap_err(), BundleError::Io { .. }));
    }

    #[test]
    fn test_corrupt_artifact_fails_load() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());
        store.write(&make_bundle()).unwrap();

        fs::write(tmp.path().join(SPARSE_FILE), b"not bincode at all").unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            BundleError::Decode { .. }
        ));
    }

    #[test]
    fn test_tampered_counts_fail_load() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());
        store.write(&make_bundle()).unwrap();

        // Drop one vector on disk: the matched set is now inconsistent
        let vectors: Vec<Embedding> =
            bincode::deserialize(&fs::read(tmp.path().join(VECTORS_FILE)).unwrap()).unwrap();
        let truncated = &vectors[..1];
        fs::write(
            tmp.path().join(VECTORS_FILE),
            bincode::serialize(&truncated).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            BundleError::CountMismatch { .. }
        ));
    }

    #[test]
    fn test_write_refuses_invalid_bundle() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());

        let mut bundle = make_bundle();
        bundle.vectors.pop();
        assert!(store.write(&bundle).is_err());
        assert!(!store.exists(), "nothing should be written for an invalid bundle");
    }

    #[test]
    fn test_load_for_rejects_mismatched_provider() {
        use crate::embedding::LocalProvider;

        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());
        store.write(&make_bundle()).unwrap();

        // Bundle records 3 dimensions; provider produces 384
        let provider = LocalProvider::new(384, 1);
        assert!(matches!(
            store.load_for(&provider).unwrap_err(),
            BundleError::ProviderMismatch { .. }
        ));

        let matching = LocalProvider::new(3, 1);
        assert!(store.load_for(&matching).is_ok());
    }
}
