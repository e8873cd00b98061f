//! Document splitting into section-aware chunks

use super::tokenizer::count_tokens;
use crate::config::ChunkingConfig;
use crate::types::{derive_chunk_id, Chunk, Document};
use crate::util::slugify;
use tracing::debug;

/// Splits documents into chunks at section boundaries.
///
/// Sections are delimited by H2/H3 headings; content before the first H2
/// forms a heading-less preamble section. Sections exceeding the token
/// budget are split at sentence boundaries with a bounded token overlap
/// between adjacent sub-chunks. Fenced code blocks are never split.
pub struct SectionSplitter {
    config: ChunkingConfig,
}

/// A detected section of a document
struct Section {
    heading: Option<String>,
    text: String,
}

impl SectionSplitter {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split a document into an ordered sequence of chunks covering the
    /// entire body. An empty body produces no chunks.
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let body = document.body.trim();
        if body.is_empty() {
            return Vec::new();
        }

        let sections = detect_sections(body);

        let mut chunks = Vec::new();
        let mut ordinal = 0;
        for section in &sections {
            self.split_section(section, document, &mut ordinal, &mut chunks);
        }

        debug!(
            "Split document {} into {} chunks",
            document.slug,
            chunks.len()
        );

        chunks
    }

    /// Split one section into chunks, respecting the token budget.
    fn split_section(
        &self,
        section: &Section,
        document: &Document,
        ordinal: &mut usize,
        chunks: &mut Vec<Chunk>,
    ) {
        let max_tokens = self.config.max_tokens;

        if count_tokens(&section.text) <= max_tokens {
            // Section fits in one chunk; shorter than the overlap budget is
            // fine, it is kept whole and never padded.
            self.push_chunk(section, document, ordinal, chunks, section.text.clone());
            return;
        }

        let sentences = split_sentences(&section.text);
        let mut current: Vec<String> = Vec::new();
        let mut current_tokens = 0usize;

        for sentence in sentences {
            let sentence_tokens = count_tokens(&sentence);

            if sentence_tokens > max_tokens {
                // A single sentence over the budget: flush what we have and
                // hard-wrap the sentence at word boundaries.
                if !current.is_empty() {
                    self.push_chunk(section, document, ordinal, chunks, current.join(" "));
                    current.clear();
                    current_tokens = 0;
                }
                for piece in hard_wrap(&sentence, max_tokens) {
                    self.push_chunk(section, document, ordinal, chunks, piece);
                }
                continue;
            }

            if current_tokens + sentence_tokens <= max_tokens {
                current.push(sentence);
                current_tokens += sentence_tokens;
            } else {
                self.push_chunk(section, document, ordinal, chunks, current.join(" "));

                // Carry trailing sentences into the next chunk as overlap,
                // bounded by overlap_tokens and never breaking mid-sentence.
                // The overlap also may not push the next chunk over budget.
                let budget = self
                    .config
                    .overlap_tokens
                    .min(max_tokens - sentence_tokens);
                let mut overlap: Vec<String> = Vec::new();
                let mut overlap_tokens = 0usize;
                for sent in current.iter().rev() {
                    let t = count_tokens(sent);
                    if overlap_tokens + t <= budget {
                        overlap.insert(0, sent.clone());
                        overlap_tokens += t;
                    } else {
                        break;
                    }
                }

                current = overlap;
                current.push(sentence);
                current_tokens = overlap_tokens + sentence_tokens;
            }
        }

        if !current.is_empty() {
            self.push_chunk(section, document, ordinal, chunks, current.join(" "));
        }
    }

    fn push_chunk(
        &self,
        section: &Section,
        document: &Document,
        ordinal: &mut usize,
        chunks: &mut Vec<Chunk>,
        text: String,
    ) {
        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }

        let url_fragment = section
            .heading
            .as_deref()
            .map(|h| format!("#{}", slugify(h)))
            .unwrap_or_default();

        chunks.push(Chunk {
            chunk_id: derive_chunk_id(&document.slug, *ordinal, &text),
            document_slug: document.slug.clone(),
            document_title: document.title.clone(),
            heading: section.heading.clone(),
            ordinal: *ordinal,
            tags: document.tags.clone(),
            url_fragment,
            token_count: count_tokens(&text),
            text,
        });
        *ordinal += 1;
    }
}

/// Detect sections delimited by H2/H3 headings.
///
/// H3 headings within an H2 produce a combined "H2 > H3" heading. Headings
/// inside fenced code blocks are content, not boundaries. A document with no
/// headings becomes a single heading-less section.
fn detect_sections(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut heading: Option<String> = None;
    let mut h2: Option<String> = None;
    let mut in_fence = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            current.push_str(line);
            current.push('\n');
            continue;
        }

        if !in_fence {
            match parse_heading(line) {
                Some((2, text)) => {
                    flush_section(&mut sections, heading.take(), &mut current);
                    h2 = Some(text.to_string());
                    heading = Some(text.to_string());
                    continue;
                }
                Some((3, text)) => {
                    flush_section(&mut sections, heading.take(), &mut current);
                    heading = Some(match &h2 {
                        Some(parent) => format!("{} > {}", parent, text),
                        None => text.to_string(),
                    });
                    continue;
                }
                // Other heading levels stay in the surrounding section body
                _ => {}
            }
        }

        current.push_str(line);
        current.push('\n');
    }

    flush_section(&mut sections, heading, &mut current);
    sections
}

fn flush_section(sections: &mut Vec<Section>, heading: Option<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        sections.push(Section {
            heading,
            text: text.to_string(),
        });
    }
    current.clear();
}

/// Parse an ATX heading ("## Heading"), returning (level, text)
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level > 6 {
        return None;
    }
    let text = trimmed[level..].trim().trim_end_matches('#').trim();
    if text.is_empty() {
        None
    } else {
        Some((level, text))
    }
}

/// Split text into sentence units, keeping fenced code blocks intact.
fn split_sentences(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        prose_sentences(&rest[..start], &mut units);

        let after_open = &rest[start + 3..];
        match after_open.find("```") {
            Some(close) => {
                let block_end = start + 3 + close + 3;
                let block = rest[start..block_end].trim();
                if !block.is_empty() {
                    units.push(block.to_string());
                }
                rest = &rest[block_end..];
            }
            None => {
                // Unterminated fence: keep the remainder whole
                let block = rest[start..].trim();
                if !block.is_empty() {
                    units.push(block.to_string());
                }
                rest = "";
            }
        }
    }

    prose_sentences(rest, &mut units);
    units
}

/// Split prose after sentence terminators followed by whitespace.
fn prose_sentences(text: &str, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace())
        {
            let sentence = current.trim();
            if !sentence.is_empty() {
                out.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        out.push(sentence.to_string());
    }
}

/// Hard-wrap an oversized sentence at word boundaries.
fn hard_wrap(sentence: &str, max_tokens: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0usize;

    for word in sentence.split_whitespace() {
        let word_tokens = count_tokens(word).max(1);
        if current_tokens + word_tokens > max_tokens && !current.is_empty() {
            pieces.push(current.join(" "));
            current.clear();
            current_tokens = 0;
        }
        current.push(word);
        current_tokens += word_tokens;
    }

    if !current.is_empty() {
        pieces.push(current.join(" "));
    }
    pieces
}
