//! Core types for the HIndex retrieval engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unique identifier for a chunk
pub type ChunkId = String;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// A source document to be indexed.
///
/// Documents are immutable once indexed; any edit triggers a full rebuild of
/// the index bundle rather than an in-place mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// URL slug, unique within the corpus (typically the file stem)
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub category: String,
    pub tags: Vec<String>,
    /// Cleaned markdown body (frontmatter stripped)
    pub body: String,
}

impl Document {
    pub fn new(slug: impl Into<String>, body: impl Into<String>) -> Self {
        let slug = slug.into();
        let title = title_from_slug(&slug);
        Self {
            slug,
            title,
            date: Utc::now(),
            category: "general".to_string(),
            tags: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

/// Derive a human-readable title from a slug ("hybrid-search" -> "Hybrid Search")
pub fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A bounded, independently retrievable span of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id: unchanged across rebuilds when content is unchanged,
    /// never shared by semantically different content
    pub chunk_id: ChunkId,
    pub document_slug: String,
    pub document_title: String,
    /// Section heading this chunk belongs to; None for preamble content
    pub heading: Option<String>,
    /// Document-relative position
    pub ordinal: usize,
    /// Tag set inherited from the parent document
    pub tags: Vec<String>,
    /// URL fragment for deep-linking ("#section-slug", empty for preamble)
    pub url_fragment: String,
    pub token_count: usize,
    pub text: String,
}

impl Chunk {
    /// Deep link to this chunk within its document
    pub fn url(&self) -> String {
        format!("/{}{}", self.document_slug, self.url_fragment)
    }

    /// Tag filter semantics: a chunk matches if its tag set intersects the
    /// filter set (OR, not AND).
    pub fn matches_tags(&self, filter: &[String]) -> bool {
        filter.iter().any(|tag| self.tags.iter().any(|t| t == tag))
    }
}

/// Derive a stable chunk id from the document slug, chunk ordinal and
/// content. Identical input always yields the same id, so rebuilding an
/// unchanged corpus produces identical ids.
pub fn derive_chunk_id(slug: &str, ordinal: usize, text: &str) -> ChunkId {
    let mut hasher = Sha256::new();
    hasher.update(slug.as_bytes());
    hasher.update(b":");
    hasher.update(ordinal.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub top_k: usize,
    /// Optional tag filter; a chunk is eligible when its tags intersect this set
    pub tags: Option<Vec<String>>,
}

impl Query {
    pub fn new(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// A search result from hybrid retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
    /// Which retrieval methods surfaced this chunk
    pub matched_by: Vec<crate::retrieval::RetrievalMethod>,
}

impl SearchResult {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self {
            chunk,
            score,
            matched_by: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_chunk_id_is_stable() {
        let a = derive_chunk_id("my-post", 3, "some content");
        let b = derive_chunk_id("my-post", 3, "some content");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_derive_chunk_id_differs_per_input() {
        let base = derive_chunk_id("my-post", 3, "some content");
        assert_ne!(base, derive_chunk_id("my-post", 4, "some content"));
        assert_ne!(base, derive_chunk_id("other-post", 3, "some content"));
        assert_ne!(base, derive_chunk_id("my-post", 3, "other content"));
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("hybrid-search-deep-dive"), "Hybrid Search Deep Dive");
        assert_eq!(title_from_slug("single"), "Single");
    }

    #[test]
    fn test_matches_tags_is_or_semantics() {
        let chunk = Chunk {
            chunk_id: "c1".to_string(),
            document_slug: "post".to_string(),
            document_title: "Post".to_string(),
            heading: None,
            ordinal: 0,
            tags: vec!["A".to_string(), "B".to_string()],
            url_fragment: String::new(),
            token_count: 1,
            text: "text".to_string(),
        };

        assert!(chunk.matches_tags(&["B".to_string(), "C".to_string()]));
        assert!(!chunk.matches_tags(&["C".to_string(), "D".to_string()]));
        assert!(!chunk.matches_tags(&[]));
    }

    #[test]
    fn test_chunk_url_includes_fragment() {
        let chunk = Chunk {
            chunk_id: "c1".to_string(),
            document_slug: "my-post".to_string(),
            document_title: "My Post".to_string(),
            heading: Some("Results".to_string()),
            ordinal: 2,
            tags: Vec::new(),
            url_fragment: "#results".to_string(),
            token_count: 1,
            text: "text".to_string(),
        };
        assert_eq!(chunk.url(), "/my-post#results");
    }
}
