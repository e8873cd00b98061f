//! Generation collaborator boundary
//!
//! The retrieval core hands its ranked chunks to an external collaborator
//! that produces prose; this module defines that boundary (the trait, the
//! citation mapping and the context-assembly helpers) without shipping a
//! generator itself.

use crate::types::SearchResult;
use serde::{Deserialize, Serialize};

/// A citation back into the corpus for one retrieved chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub chunk_id: String,
    pub document_slug: String,
    pub title: String,
    /// Deep link including the chunk's URL fragment
    pub url: String,
}

/// Text produced by the collaborator, with its citation mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// External generation collaborator: accepts the query and the ordered
/// retrieved chunks, returns generated text plus citations. The retrieval
/// core is indifferent to how its output is used downstream.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, query: &str, context: &[SearchResult]) -> anyhow::Result<GeneratedAnswer>;
}

/// Format retrieved chunks into a numbered context block for prompt
/// construction. Each chunk appears once, with its title and deep link.
pub fn assemble_context(results: &[SearchResult]) -> String {
    let mut context = String::new();
    for (i, result) in results.iter().enumerate() {
        let chunk = &result.chunk;
        context.push_str(&format!("[{}] {} ({})\n", i + 1, chunk.document_title, chunk.url()));
        if let Some(heading) = &chunk.heading {
            context.push_str(&format!("Section: {}\n", heading));
        }
        context.push_str(&chunk.text);
        context.push_str("\n\n");
    }
    context
}

/// Citation list for the retrieved chunks, deduplicated by chunk id,
/// retrieval order preserved.
pub fn citations_for(results: &[SearchResult]) -> Vec<Citation> {
    let mut seen = std::collections::HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.chunk.chunk_id.clone()))
        .map(|r| Citation {
            chunk_id: r.chunk.chunk_id.clone(),
            document_slug: r.chunk.document_slug.clone(),
            title: r.chunk.document_title.clone(),
            url: r.chunk.url(),
        })
        .collect()
}
