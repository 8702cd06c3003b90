//! In-memory vault used by tests and embedding hosts.

use crate::error::StoreError;
use crate::model::{Folder, Note, NoteDraft, Template};
use crate::store::VaultStore;
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use lorebase_protocol::{FolderId, NoteId, TemplateId};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct VaultState {
    notes: Vec<Note>,
    folders: Vec<Folder>,
    templates: Vec<Template>,
}

/// In-memory `VaultStore` implementation with insertion-ordered listings.
#[derive(Default)]
pub struct InMemoryVault {
    state: RwLock<VaultState>,
}

impl InMemoryVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_folder(state: &VaultState, folder_id: FolderId) -> Result<(), StoreError> {
        if state.folders.iter().any(|folder| folder.id == folder_id) {
            Ok(())
        } else {
            Err(StoreError::FolderNotFound(folder_id))
        }
    }
}

#[async_trait]
impl VaultStore for InMemoryVault {
    async fn note(&self, id: NoteId) -> Result<Note, StoreError> {
        self.state
            .read()
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
            .ok_or(StoreError::NoteNotFound(id))
    }

    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let mut state = self.state.write();
        if let Some(folder_id) = draft.folder_id {
            Self::ensure_folder(&state, folder_id)?;
        }
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            folder_id: draft.folder_id,
            created_at: now,
            updated_at: now,
        };
        debug!("created note (note_id={}, title={})", note.id, note.title);
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: NoteId, content: String) -> Result<Note, StoreError> {
        let mut state = self.state.write();
        let note = state
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(StoreError::NoteNotFound(id))?;
        note.content = content;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete_note(&self, id: NoteId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let before = state.notes.len();
        state.notes.retain(|note| note.id != id);
        if state.notes.len() == before {
            return Err(StoreError::NoteNotFound(id));
        }
        debug!("deleted note (note_id={})", id);
        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.state.read().notes.clone())
    }

    async fn move_note(&self, id: NoteId, folder_id: Option<FolderId>) -> Result<Note, StoreError> {
        let mut state = self.state.write();
        if let Some(folder_id) = folder_id {
            Self::ensure_folder(&state, folder_id)?;
        }
        let note = state
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(StoreError::NoteNotFound(id))?;
        note.folder_id = folder_id;
        Ok(note.clone())
    }

    async fn create_folder(
        &self,
        name: String,
        parent_id: Option<FolderId>,
    ) -> Result<Folder, StoreError> {
        let mut state = self.state.write();
        if let Some(parent_id) = parent_id {
            Self::ensure_folder(&state, parent_id)?;
        }
        let folder = Folder {
            id: Uuid::new_v4(),
            name,
            parent_id,
            created_at: Utc::now(),
        };
        debug!(
            "created folder (folder_id={}, name={})",
            folder.id, folder.name
        );
        state.folders.push(folder.clone());
        Ok(folder)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError> {
        Ok(self.state.read().folders.clone())
    }

    async fn template(&self, id: TemplateId) -> Result<Template, StoreError> {
        self.state
            .read()
            .templates
            .iter()
            .find(|template| template.id == id)
            .cloned()
            .ok_or(StoreError::TemplateNotFound(id))
    }

    async fn create_template(
        &self,
        name: String,
        content: String,
    ) -> Result<Template, StoreError> {
        let mut state = self.state.write();
        let template = Template {
            id: Uuid::new_v4(),
            name,
            content,
            created_at: Utc::now(),
        };
        debug!(
            "created template (template_id={}, name={})",
            template.id, template.name
        );
        state.templates.push(template.clone());
        Ok(template)
    }

    async fn list_templates(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.state.read().templates.clone())
    }
}
