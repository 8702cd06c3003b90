//! Utility helpers shared by built-in tools.

use lorebase_protocol::ToolError;
use lorebase_vault::{Folder, Note, StoreError, Template};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Parse JSON args into a typed struct for tool calls.
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Map a vault failure into a tool execution error.
pub(super) fn store_error(err: StoreError) -> ToolError {
    ToolError::ExecutionFailed(err.to_string())
}

/// Summarize a note for tool result payloads.
pub(super) fn note_json(note: &Note) -> Value {
    json!({
        "note_id": note.id,
        "title": note.title,
        "content": note.content,
        "folder_id": note.folder_id,
    })
}

/// Summarize a folder for tool result payloads.
pub(super) fn folder_json(folder: &Folder) -> Value {
    json!({
        "folder_id": folder.id,
        "name": folder.name,
        "parent_id": folder.parent_id,
    })
}

/// Summarize a template for tool result payloads.
pub(super) fn template_json(template: &Template) -> Value {
    json!({
        "template_id": template.id,
        "name": template.name,
    })
}

/// Case-insensitive substring match used by the search tools.
pub(super) fn matches_query(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}
