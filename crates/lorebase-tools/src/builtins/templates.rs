//! Built-in template tools (find/create/apply).

use crate::builtins::utils::{
    matches_query, note_json, parse_args, store_error, template_json,
};
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use log::info;
use lorebase_protocol::{FolderId, TemplateId, ToolError};
use lorebase_vault::NoteDraft;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool for finding templates by name substring.
#[derive(Debug, Default)]
pub struct FindTemplateTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FindTemplateArgs {
    query: String,
}

#[async_trait]
impl Tool for FindTemplateTool {
    fn name(&self) -> &str {
        "findTemplate"
    }

    fn description(&self) -> &str {
        "Find note templates whose name contains the query, case-insensitively"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Substring to match against template names" },
            },
            "required": ["query"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: FindTemplateArgs = parse_args(args)?;
        let matches: Vec<Value> = ctx
            .vault
            .list_templates()
            .await
            .map_err(store_error)?
            .iter()
            .filter(|template| matches_query(&template.name, &input.query))
            .map(template_json)
            .collect();
        Ok(json!({ "success": true, "count": matches.len(), "templates": matches }))
    }
}

/// Tool for creating a reusable note template.
#[derive(Debug, Default)]
pub struct CreateTemplateTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateTemplateArgs {
    name: String,
    content: String,
}

#[async_trait]
impl Tool for CreateTemplateTool {
    fn name(&self) -> &str {
        "createTemplate"
    }

    fn description(&self) -> &str {
        "Create a reusable note template"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name for the template" },
                "content": { "type": "string", "description": "Template body" },
            },
            "required": ["name", "content"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: CreateTemplateArgs = parse_args(args)?;
        if input.name.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "name cannot be empty".to_string(),
            ));
        }
        let template = ctx
            .vault
            .create_template(input.name, input.content)
            .await
            .map_err(store_error)?;
        info!("created template (template_id={})", template.id);
        Ok(json!({ "success": true, "template": template_json(&template) }))
    }
}

/// Tool for instantiating a note from a template.
#[derive(Debug, Default)]
pub struct ApplyTemplateTool;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApplyTemplateArgs {
    template_id: TemplateId,
    title: String,
    #[serde(default)]
    folder_id: Option<FolderId>,
}

#[async_trait]
impl Tool for ApplyTemplateTool {
    fn name(&self) -> &str {
        "applyTemplate"
    }

    fn description(&self) -> &str {
        "Create a new note whose body is copied from a template"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "template_id": { "type": "string", "description": "Template to instantiate" },
                "title": { "type": "string", "description": "Title for the new note" },
                "folder_id": { "type": "string", "description": "Folder to place the note in" },
            },
            "required": ["template_id", "title"],
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ApplyTemplateArgs = parse_args(args)?;
        if input.title.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "title cannot be empty".to_string(),
            ));
        }
        let template = ctx
            .vault
            .template(input.template_id)
            .await
            .map_err(store_error)?;
        let note = ctx
            .vault
            .create_note(NoteDraft {
                title: input.title,
                content: template.content,
                folder_id: input.folder_id,
            })
            .await
            .map_err(store_error)?;
        info!(
            "applied template (template_id={}, note_id={})",
            template.id, note.id
        );
        Ok(json!({ "success": true, "note": note_json(&note) }))
    }
}
