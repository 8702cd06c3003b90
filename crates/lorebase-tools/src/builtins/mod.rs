//! Built-in vault tools bundled with Lorebase.

mod folders;
mod notes;
mod replace;
mod search;
mod templates;
mod utils;

use crate::ToolRegistry;
use log::info;
use std::sync::Arc;

pub use folders::{CreateFolderTool, SearchFoldersTool};
pub use notes::{CreateNoteTool, DeleteNoteTool, MoveNoteTool, ReadNoteTool, UpdateNoteTool};
pub use replace::FindAndReplaceTool;
pub use search::SearchNotesTool;
pub use templates::{ApplyTemplateTool, CreateTemplateTool, FindTemplateTool};

/// Register all built-in tools with the provided registry.
pub fn register_builtin_tools(registry: &ToolRegistry) {
    registry.register(Arc::new(CreateNoteTool));
    registry.register(Arc::new(ReadNoteTool));
    registry.register(Arc::new(UpdateNoteTool));
    registry.register(Arc::new(DeleteNoteTool));
    registry.register(Arc::new(MoveNoteTool));
    registry.register(Arc::new(CreateFolderTool));
    registry.register(Arc::new(SearchFoldersTool));
    registry.register(Arc::new(SearchNotesTool));
    registry.register(Arc::new(FindTemplateTool));
    registry.register(Arc::new(CreateTemplateTool));
    registry.register(Arc::new(ApplyTemplateTool));
    registry.register(Arc::new(FindAndReplaceTool));
    info!("registered built-in tools");
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry() -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry);
    registry
}
