//! Mock semantic search implementations.

use async_trait::async_trait;
use lorebase_core::{SearchError, SemanticSearch};
use lorebase_protocol::NoteId;
use lorebase_vault::Note;

/// Search returning a fixed ranking regardless of query.
#[derive(Debug, Clone, Default)]
pub struct StaticSearch {
    ids: Vec<NoteId>,
}

impl StaticSearch {
    pub fn new(ids: Vec<NoteId>) -> Self {
        Self { ids }
    }

    /// Search that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SemanticSearch for StaticSearch {
    async fn search(&self, _query: &str, _corpus: &[Note]) -> Result<Vec<NoteId>, SearchError> {
        Ok(self.ids.clone())
    }
}

/// Search ranking notes whose title overlaps the query text.
#[derive(Debug, Clone, Default)]
pub struct TitleSearch;

#[async_trait]
impl SemanticSearch for TitleSearch {
    async fn search(&self, query: &str, corpus: &[Note]) -> Result<Vec<NoteId>, SearchError> {
        let query = query.to_lowercase();
        Ok(corpus
            .iter()
            .filter(|note| {
                let title = note.title.to_lowercase();
                query.contains(&title) || title.contains(&query)
            })
            .map(|note| note.id)
            .collect())
    }
}

/// Search that always fails.
#[derive(Debug, Clone)]
pub struct FailingSearch {
    message: String,
}

impl FailingSearch {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SemanticSearch for FailingSearch {
    async fn search(&self, _query: &str, _corpus: &[Note]) -> Result<Vec<NoteId>, SearchError> {
        Err(SearchError::Backend(self.message.clone()))
    }
}
