//! Built-in note title search.

use crate::builtins::utils::{matches_query, parse_args, store_error};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use lorebase_protocol::ToolError;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool for finding notes by title substring.
#[derive(Debug, Default)]
pub struct SearchNotesTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchNotesArgs {
    query: String,
}

#[async_trait]
impl Tool for SearchNotesTool {
    fn name(&self) -> &str {
        "searchNotes"
    }

    fn description(&self) -> &str {
        "Find notes whose title contains the query, case-insensitively"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Substring to match against note titles" },
            },
            "required": ["query"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchNotesArgs = parse_args(args)?;
        let matches: Vec<Value> = ctx
            .vault
            .list_notes()
            .await
            .map_err(store_error)?
            .iter()
            .filter(|note| matches_query(&note.title, &input.query))
            .map(|note| json!({ "note_id": note.id, "title": note.title }))
            .collect();
        Ok(json!({ "success": true, "count": matches.len(), "notes": matches }))
    }
}
