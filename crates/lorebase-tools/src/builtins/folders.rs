//! Built-in folder tools (create/search).

use crate::builtins::utils::{folder_json, matches_query, parse_args, store_error};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use log::info;
use lorebase_protocol::{FolderId, ToolError};
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool for creating a folder in the vault.
#[derive(Debug, Default)]
pub struct CreateFolderTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateFolderArgs {
    name: String,
    #[serde(default)]
    parent_id: Option<FolderId>,
}

#[async_trait]
impl Tool for CreateFolderTool {
    fn name(&self) -> &str {
        "createFolder"
    }

    fn description(&self) -> &str {
        "Create a new folder, optionally nested under a parent folder"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name for the new folder" },
                "parent_id": { "type": "string", "description": "Parent folder id; omit for the vault root" },
            },
            "required": ["name"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: CreateFolderArgs = parse_args(args)?;
        if input.name.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "name cannot be empty".to_string(),
            ));
        }
        let folder = ctx
            .vault
            .create_folder(input.name, input.parent_id)
            .await
            .map_err(store_error)?;
        info!("created folder (folder_id={})", folder.id);
        Ok(json!({ "success": true, "folder": folder_json(&folder) }))
    }
}

/// Tool for finding folders by name substring.
#[derive(Debug, Default)]
pub struct SearchFoldersTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchFoldersArgs {
    query: String,
}

#[async_trait]
impl Tool for SearchFoldersTool {
    fn name(&self) -> &str {
        "searchFolders"
    }

    fn description(&self) -> &str {
        "Find folders whose name contains the query, case-insensitively"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Substring to match against folder names" },
            },
            "required": ["query"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchFoldersArgs = parse_args(args)?;
        let matches: Vec<Value> = ctx
            .vault
            .list_folders()
            .await
            .map_err(store_error)?
            .iter()
            .filter(|folder| matches_query(&folder.name, &input.query))
            .map(folder_json)
            .collect();
        Ok(json!({ "success": true, "count": matches.len(), "folders": matches }))
    }
}
