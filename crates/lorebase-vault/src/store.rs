//! Vault store trait consumed by the conversational core.

use crate::error::StoreError;
use crate::model::{Folder, Note, NoteDraft, Template};
use async_trait::async_trait;
use lorebase_protocol::{FolderId, NoteId, TemplateId};

/// Persistent note/folder/template store.
///
/// Each call is an independent request/response exchange; the store owns its
/// own consistency and the core never holds locks across calls.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Fetch a note by id.
    async fn note(&self, id: NoteId) -> Result<Note, StoreError>;
    /// Create a new note from a draft.
    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError>;
    /// Replace a note's body content.
    async fn update_note(&self, id: NoteId, content: String) -> Result<Note, StoreError>;
    /// Delete a note by id.
    async fn delete_note(&self, id: NoteId) -> Result<(), StoreError>;
    /// List all notes in insertion order.
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;
    /// Move a note into a folder, or to the vault root.
    async fn move_note(&self, id: NoteId, folder_id: Option<FolderId>) -> Result<Note, StoreError>;

    /// Create a new folder.
    async fn create_folder(
        &self,
        name: String,
        parent_id: Option<FolderId>,
    ) -> Result<Folder, StoreError>;
    /// List all folders in insertion order.
    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError>;

    /// Fetch a template by id.
    async fn template(&self, id: TemplateId) -> Result<Template, StoreError>;
    /// Create a new template.
    async fn create_template(&self, name: String, content: String)
    -> Result<Template, StoreError>;
    /// List all templates in insertion order.
    async fn list_templates(&self) -> Result<Vec<Template>, StoreError>;
}
