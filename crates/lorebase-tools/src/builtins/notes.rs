//! Built-in note tools (create/read/update/delete/move).

use crate::builtins::utils::{note_json, parse_args, store_error};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use log::info;
use lorebase_protocol::{FolderId, NoteId, ToolError};
use lorebase_vault::NoteDraft;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool for creating a note in the vault.
#[derive(Debug, Default)]
pub struct CreateNoteTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateNoteArgs {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    folder_id: Option<FolderId>,
}

#[async_trait]
impl Tool for CreateNoteTool {
    fn name(&self) -> &str {
        "createNote"
    }

    fn description(&self) -> &str {
        "Create a new note with a title and optional content"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Title for the new note" },
                "content": { "type": "string", "description": "Initial note body" },
                "folder_id": { "type": "string", "description": "Folder to place the note in" },
            },
            "required": ["title"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: CreateNoteArgs = parse_args(args)?;
        if input.title.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "title cannot be empty".to_string(),
            ));
        }
        let note = ctx
            .vault
            .create_note(NoteDraft {
                title: input.title,
                content: input.content,
                folder_id: input.folder_id,
            })
            .await
            .map_err(store_error)?;
        info!("created note (note_id={})", note.id);
        Ok(json!({ "success": true, "note": note_json(&note) }))
    }
}

/// Tool for reading a note by id.
#[derive(Debug, Default)]
pub struct ReadNoteTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadNoteArgs {
    note_id: NoteId,
}

#[async_trait]
impl Tool for ReadNoteTool {
    fn name(&self) -> &str {
        "readNote"
    }

    fn description(&self) -> &str {
        "Read a note's title and content by id"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "note_id": { "type": "string", "description": "Id of the note to read" },
            },
            "required": ["note_id"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ReadNoteArgs = parse_args(args)?;
        let note = ctx.vault.note(input.note_id).await.map_err(store_error)?;
        Ok(json!({ "success": true, "note": note_json(&note) }))
    }
}

/// Tool for replacing a note's content.
#[derive(Debug, Default)]
pub struct UpdateNoteTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateNoteArgs {
    note_id: NoteId,
    content: String,
}

#[async_trait]
impl Tool for UpdateNoteTool {
    fn name(&self) -> &str {
        "updateNote"
    }

    fn description(&self) -> &str {
        "Replace a note's body content"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "note_id": { "type": "string", "description": "Id of the note to update" },
                "content": { "type": "string", "description": "New note body" },
            },
            "required": ["note_id", "content"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: UpdateNoteArgs = parse_args(args)?;
        let note = ctx
            .vault
            .update_note(input.note_id, input.content)
            .await
            .map_err(store_error)?;
        info!("updated note (note_id={})", note.id);
        Ok(json!({ "success": true, "note": note_json(&note) }))
    }
}

/// Tool for deleting a note by id.
#[derive(Debug, Default)]
pub struct DeleteNoteTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteNoteArgs {
    note_id: NoteId,
}

#[async_trait]
impl Tool for DeleteNoteTool {
    fn name(&self) -> &str {
        "deleteNote"
    }

    fn description(&self) -> &str {
        "Delete a note by id"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "note_id": { "type": "string", "description": "Id of the note to delete" },
            },
            "required": ["note_id"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: DeleteNoteArgs = parse_args(args)?;
        ctx.vault
            .delete_note(input.note_id)
            .await
            .map_err(store_error)?;
        info!("deleted note (note_id={})", input.note_id);
        Ok(json!({ "success": true, "note_id": input.note_id }))
    }
}

/// Tool for moving a note into a folder or back to the vault root.
#[derive(Debug, Default)]
pub struct MoveNoteTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MoveNoteArgs {
    note_id: NoteId,
    #[serde(default)]
    folder_id: Option<FolderId>,
}

#[async_trait]
impl Tool for MoveNoteTool {
    fn name(&self) -> &str {
        "moveNote"
    }

    fn description(&self) -> &str {
        "Move a note into a folder, or to the vault root when no folder is given"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "note_id": { "type": "string", "description": "Id of the note to move" },
                "folder_id": { "type": "string", "description": "Destination folder id; omit for the vault root" },
            },
            "required": ["note_id"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: MoveNoteArgs = parse_args(args)?;
        let note = ctx
            .vault
            .move_note(input.note_id, input.folder_id)
            .await
            .map_err(store_error)?;
        info!(
            "moved note (note_id={}, folder_id={:?})",
            note.id, note.folder_id
        );
        Ok(json!({ "success": true, "note": note_json(&note) }))
    }
}
