//! Entity types stored in the vault.

use chrono::{DateTime, Utc};
use lorebase_protocol::{FolderId, NoteId, TemplateId};
use serde::{Deserialize, Serialize};

/// A note in the user's vault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Note identifier.
    pub id: NoteId,
    /// Note title.
    pub title: String,
    /// Note body content.
    pub content: String,
    /// Containing folder, or none for the vault root.
    pub folder_id: Option<FolderId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last content mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A folder grouping notes in the vault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    /// Folder identifier.
    pub id: FolderId,
    /// Folder display name.
    pub name: String,
    /// Parent folder, or none for the vault root.
    pub parent_id: Option<FolderId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A reusable note template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    /// Template identifier.
    pub id: TemplateId,
    /// Template display name.
    pub name: String,
    /// Template body content.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a note.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    /// Note title.
    pub title: String,
    /// Initial body content.
    pub content: String,
    /// Containing folder, or none for the vault root.
    pub folder_id: Option<FolderId>,
}
