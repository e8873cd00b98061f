//! Markdown content loading
//!
//! Walks a directory of markdown posts, parses YAML frontmatter into
//! document metadata and returns cleaned `Document` values. Malformed files
//! are skipped and reported, never aborting the whole batch.

use crate::types::{title_from_slug, Document};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors raised while loading a single document. Collected per file; the
/// rest of the batch proceeds.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{path}: failed to read file: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid frontmatter: {reason}")]
    Frontmatter { path: String, reason: String },

    #[error("{path}: empty document body")]
    EmptyBody { path: String },
}

/// YAML frontmatter fields. All optional; defaults applied afterwards.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<String>,
}

/// Load all markdown documents under a directory.
///
/// Returns the successfully parsed documents (sorted by slug for
/// deterministic downstream ordering) together with the per-file errors.
pub fn load_documents(dir: &Path) -> (Vec<Document>, Vec<ContentError>) {
    let mut documents = Vec::new();
    let mut errors = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => {}
            _ => continue,
        }

        match load_document(path) {
            Ok(document) => {
                debug!("Loaded document: {}", document.slug);
                documents.push(document);
            }
            Err(e) => {
                warn!("Skipping document: {}", e);
                errors.push(e);
            }
        }
    }

    documents.sort_by(|a, b| a.slug.cmp(&b.slug));
    (documents, errors)
}

/// Load and parse a single markdown document.
pub fn load_document(path: &Path) -> Result<Document, ContentError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: display.clone(),
        source,
    })?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();

    parse_document(&display, slug, &raw)
}

/// Parse raw markdown with optional leading YAML frontmatter.
pub fn parse_document(path: &str, slug: String, raw: &str) -> Result<Document, ContentError> {
    let (frontmatter, body) = split_frontmatter(raw).map_err(|reason| {
        ContentError::Frontmatter {
            path: path.to_string(),
            reason,
        }
    })?;

    let meta: FrontMatter = match frontmatter {
        Some(yaml) => serde_yaml::from_str(yaml).map_err(|e| ContentError::Frontmatter {
            path: path.to_string(),
            reason: e.to_string(),
        })?,
        None => FrontMatter::default(),
    };

    let body = body.trim();
    if body.is_empty() {
        return Err(ContentError::EmptyBody {
            path: path.to_string(),
        });
    }

    let date = match meta.date.as_deref() {
        Some(raw_date) => NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(|| ContentError::Frontmatter {
                path: path.to_string(),
                reason: format!("invalid date '{}', expected YYYY-MM-DD", raw_date),
            })?,
        None => Utc::now(),
    };

    let title = meta.title.unwrap_or_else(|| title_from_slug(&slug));

    Ok(Document {
        slug,
        title,
        date,
        category: meta.category.unwrap_or_else(|| "general".to_string()),
        tags: meta.tags.unwrap_or_default(),
        body: body.to_string(),
    })
}

/// Split a leading `--- ... ---` frontmatter block from the body.
fn split_frontmatter(raw: &str) -> Result<(Option<&str>, &str), String> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with("---") {
        return Ok((None, raw));
    }

    let after_open = &trimmed[3..];
    match after_open.find("\n---") {
        Some(end) => {
            let frontmatter = &after_open[..end];
            let mut body = &after_open[end + 4..];
            // Consume the rest of the closing delimiter line
            if let Some(newline) = body.find('\n') {
                body = &body[newline + 1..];
            } else {
                body = "";
            }
            Ok((Some(frontmatter), body))
        }
        None => Err("unterminated frontmatter block".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_document_with_frontmatter() {
        let raw = "---\ntitle: Hybrid Search Deep Dive\ndate: 2025-03-01\ntags:\n  - RAG\n  - AI\ncategory: engineering\n---\n\n# Heading\n\nBody text here.";
        let doc = parse_document("post.md", "hybrid-search".to_string(), raw).unwrap();

        assert_eq!(doc.title, "Hybrid Search Deep Dive");
        assert_eq!(doc.tags, vec!["RAG", "AI"]);
        assert_eq!(doc.category, "engineering");
        assert_eq!(doc.date.format("%Y-%m-%d").to_string(), "2025-03-01");
        assert!(doc.body.starts_with("# Heading"));
    }

    #[test]
    fn test_parse_document_defaults() {
        let raw = "Just body text, no frontmatter.";
        let doc = parse_document("post.md", "my-first-post".to_string(), raw).unwrap();

        assert_eq!(doc.title, "My First Post");
        assert!(doc.tags.is_empty());
        assert_eq!(doc.category, "general");
        assert_eq!(doc.body, raw);
    }

    #[test]
    fn test_parse_document_rejects_empty_body() {
        let raw = "---\ntitle: Empty\n---\n\n   \n";
        let err = parse_document("post.md", "empty".to_string(), raw).unwrap_err();
        assert!(matches!(err, ContentError::EmptyBody { .. }));
    }

    #[test]
    fn test_parse_document_rejects_bad_yaml() {
        let raw = "---\ntitle: [unclosed\n---\n\nBody.";
        let err = parse_document("post.md", "bad".to_string(), raw).unwrap_err();
        assert!(matches!(err, ContentError::Frontmatter { .. }));
    }

    #[test]
    fn test_parse_document_rejects_bad_date() {
        let raw = "---\ndate: March 1st\n---\n\nBody.";
        let err = parse_document("post.md", "bad-date".to_string(), raw).unwrap_err();
        match err {
            ContentError::Frontmatter { reason, .. } => {
                assert!(reason.contains("invalid date"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_document_rejects_unterminated_frontmatter() {
        let raw = "---\ntitle: Oops\n\nBody without closing delimiter.";
        let err = parse_document("post.md", "oops".to_string(), raw).unwrap_err();
        assert!(matches!(err, ContentError::Frontmatter { .. }));
    }

    #[test]
    fn test_load_documents_skips_and_reports_malformed() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("good.md"),
            "---\ntitle: Good\n---\n\nReal content.",
        )
        .unwrap();
        fs::write(tmp.path().join("empty.md"), "---\ntitle: Empty\n---\n\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored, not markdown").unwrap();

        let (docs, errors) = load_documents(tmp.path());

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "good");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ContentError::EmptyBody { .. }));
    }

    #[test]
    fn test_load_documents_sorted_by_slug() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("zebra.md"), "Z content.").unwrap();
        fs::write(tmp.path().join("alpha.md"), "A content.").unwrap();

        let (docs, errors) = load_documents(tmp.path());
        assert!(errors.is_empty());
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "zebra"]);
    }
}
