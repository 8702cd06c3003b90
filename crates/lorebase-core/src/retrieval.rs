//! Semantic retrieval seam and grounding preamble assembly.

use async_trait::async_trait;
use lorebase_protocol::NoteId;
use lorebase_vault::Note;
use thiserror::Error;

/// Errors surfaced by semantic search implementations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search backend failed or was unreachable.
    #[error("semantic search failed: {0}")]
    Backend(String),
}

/// Best-effort ranked semantic search over the note corpus.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Return note ids ranked by relevance to the query.
    async fn search(&self, query: &str, corpus: &[Note]) -> Result<Vec<NoteId>, SearchError>;
}

/// Builds the grounding instruction for non-agentic modes.
///
/// Pure function of its inputs: numbering follows the candidate order,
/// 1-based, stable under re-invocation.
#[derive(Debug, Clone)]
pub struct RetrievalPreambleBuilder {
    /// Maximum characters excerpted per source note.
    excerpt_chars: usize,
}

impl RetrievalPreambleBuilder {
    /// Create a builder with the given per-source excerpt budget.
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Produce the source-numbered grounding instruction.
    ///
    /// An empty candidate set yields an explicit no-sources instruction so
    /// the model is told not to fabricate citations.
    pub fn build(&self, query: &str, candidates: &[Note]) -> String {
        if candidates.is_empty() {
            return format!(
                "You are the assistant for a personal note vault. No notes relevant \
                 to this question were found. Say so if the notes matter, answer from \
                 general knowledge otherwise, and do not cite or invent sources.\n\n\
                 Question: {query}"
            );
        }

        let mut preamble = String::from(
            "You are the assistant for a personal note vault. Ground your answer in \
             the numbered sources below and cite them by number, like [1]. Do not \
             invent sources.\n",
        );
        for (index, note) in candidates.iter().enumerate() {
            preamble.push_str(&format!(
                "\nSource {}: {}\n{}\n",
                index + 1,
                note.title,
                self.excerpt(&note.content)
            ));
        }
        preamble.push_str(&format!("\nQuestion: {query}"));
        preamble
    }

    /// Truncate note content to the excerpt budget on a char boundary.
    fn excerpt(&self, content: &str) -> String {
        if content.chars().count() <= self.excerpt_chars {
            return content.to_string();
        }
        let truncated: String = content.chars().take(self.excerpt_chars).collect();
        format!("{truncated}…")
    }
}
