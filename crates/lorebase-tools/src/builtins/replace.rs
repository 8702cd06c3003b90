//! Bulk regex find-and-replace across all notes.

use crate::builtins::utils::{parse_args, store_error};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use log::info;
use lorebase_protocol::{NoteId, ToolError};
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool applying a regex replacement to every matching note.
#[derive(Debug, Default)]
pub struct FindAndReplaceTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FindAndReplaceArgs {
    pattern: String,
    replacement: String,
    #[serde(default)]
    case_sensitive: bool,
}

#[async_trait]
impl Tool for FindAndReplaceTool {
    fn name(&self) -> &str {
        "findAndReplace"
    }

    fn description(&self) -> &str {
        "Apply a regex replacement to the content of every matching note"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": { "type": "string", "description": "Regular expression to search for" },
                "replacement": { "type": "string", "description": "Replacement text" },
                "case_sensitive": {
                    "type": "boolean",
                    "description": "Match case-sensitively; defaults to false",
                },
            },
            "required": ["pattern", "replacement"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: FindAndReplaceArgs = parse_args(args)?;
        let regex = RegexBuilder::new(&input.pattern)
            .case_insensitive(!input.case_sensitive)
            .build()
            .map_err(|err| ToolError::InvalidArguments(format!("invalid pattern: {err}")))?;

        // Compute the full update set before touching the store, so a bad
        // pattern or read failure never leaves a half-applied batch.
        let notes = ctx.vault.list_notes().await.map_err(store_error)?;
        let pending: Vec<(NoteId, String)> = notes
            .iter()
            .filter(|note| regex.is_match(&note.content))
            .map(|note| (note.id, regex.replace_all(&note.content, input.replacement.as_str()).into_owned()))
            .collect();

        let mut updated: Vec<NoteId> = Vec::with_capacity(pending.len());
        let total = pending.len();
        for (note_id, content) in pending {
            if let Err(err) = ctx.vault.update_note(note_id, content).await {
                return Err(ToolError::ExecutionFailed(format!(
                    "replace failed on note {note_id} after updating {} of {total} notes ({err}); updated note ids: {updated:?}",
                    updated.len(),
                )));
            }
            updated.push(note_id);
        }

        info!(
            "bulk replace finished (pattern_len={}, notes_updated={})",
            input.pattern.len(),
            updated.len()
        );
        Ok(json!({
            "success": true,
            "notes_updated": updated.len(),
            "note_ids": updated,
        }))
    }
}
