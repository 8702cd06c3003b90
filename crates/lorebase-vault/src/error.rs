//! Error types for the vault store boundary.

use lorebase_protocol::{FolderId, NoteId, TemplateId};
use thiserror::Error;

/// Errors returned by vault store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Note id is unknown to the store.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),
    /// Folder id is unknown to the store.
    #[error("folder not found: {0}")]
    FolderNotFound(FolderId),
    /// Template id is unknown to the store.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),
    /// The store rejected the request.
    #[error("store rejected request: {0}")]
    Rejected(String),
}
