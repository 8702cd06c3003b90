//! Conversation message types shared across the orchestrator API.

use chrono::{DateTime, Utc};
use log::warn;
use lorebase_protocol::{Feedback, ImageAttachment, MessageId, NoteId, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle state of a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Message is still being produced.
    Processing,
    /// Message reached its final content.
    Complete,
}

/// Execution state of a tool message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolExecutionStatus {
    /// Tool call recorded, execution not finished.
    Pending,
    /// Tool executed successfully.
    Complete,
    /// Tool execution failed.
    Error,
}

/// Structured payload of a tool-role message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCard {
    /// Name of the invoked tool.
    pub tool_name: String,
    /// Arguments the model supplied.
    pub arguments: Value,
    /// Execution state; moves only forward from pending.
    pub execution: ToolExecutionStatus,
    /// Result payload once execution finished.
    #[serde(default)]
    pub result: Option<Value>,
}

/// Message content: plain text or a tool card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MessageContent {
    /// Plain text content.
    Text { text: String },
    /// Structured tool invocation record.
    Tool { card: ToolCard },
}

/// A note cited as grounding for an assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    /// Cited note id.
    pub note_id: NoteId,
    /// Note title at citation time.
    pub title: String,
}

/// Message stored in a mode log.
///
/// Mutated in place only to grow streamed text, resolve tool status, or
/// attach feedback; immutable once complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Message identifier, generated at creation.
    pub id: MessageId,
    /// Role that produced the message.
    pub role: Role,
    /// Message content.
    pub content: MessageContent,
    /// Optional image attached by the user.
    #[serde(default)]
    pub image: Option<ImageAttachment>,
    /// Notes used to ground the reply.
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    /// Lifecycle state.
    pub status: MessageStatus,
    /// Optional user feedback.
    #[serde(default)]
    pub feedback: Option<Feedback>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a complete user message.
    pub fn user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: MessageContent::Text { text: text.into() },
            image,
            sources: Vec::new(),
            status: MessageStatus::Complete,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    /// Build a complete assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: MessageContent::Text { text: text.into() },
            image: None,
            sources: Vec::new(),
            status: MessageStatus::Complete,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    /// Build an empty assistant message that streamed text will grow.
    pub fn assistant_processing(sources: Vec<SourceRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: MessageContent::Text {
                text: String::new(),
            },
            image: None,
            sources,
            status: MessageStatus::Processing,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    /// Build a pending tool message for a model-requested invocation.
    pub fn tool_pending(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Tool,
            content: MessageContent::Tool {
                card: ToolCard {
                    tool_name: tool_name.into(),
                    arguments,
                    execution: ToolExecutionStatus::Pending,
                    result: None,
                },
            },
            image: None,
            sources: Vec::new(),
            status: MessageStatus::Processing,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    /// Return the text content, if any.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(text),
            MessageContent::Tool { .. } => None,
        }
    }

    /// Return the tool card, if this is a tool message.
    pub fn tool_card(&self) -> Option<&ToolCard> {
        match &self.content {
            MessageContent::Tool { card } => Some(card),
            MessageContent::Text { .. } => None,
        }
    }

    /// Append streamed text to an in-flight text message.
    pub fn append_text(&mut self, delta: &str) {
        match &mut self.content {
            MessageContent::Text { text } => text.push_str(delta),
            MessageContent::Tool { .. } => {
                warn!("ignoring text delta on tool message (message_id={})", self.id)
            }
        }
    }

    /// Mark the message lifecycle as complete.
    pub fn mark_complete(&mut self) {
        self.status = MessageStatus::Complete;
    }

    /// Resolve a pending tool card to its final state.
    ///
    /// Tool execution state never moves backward; resolving an already
    /// resolved card is a logged no-op.
    pub fn resolve_tool(&mut self, execution: ToolExecutionStatus, result: Value) {
        let MessageContent::Tool { card } = &mut self.content else {
            warn!("ignoring tool resolution on text message (message_id={})", self.id);
            return;
        };
        if card.execution != ToolExecutionStatus::Pending {
            warn!(
                "ignoring repeated tool resolution (message_id={}, execution={:?})",
                self.id, card.execution
            );
            return;
        }
        if execution == ToolExecutionStatus::Pending {
            warn!("ignoring resolution back to pending (message_id={})", self.id);
            return;
        }
        card.execution = execution;
        card.result = Some(result);
        self.status = MessageStatus::Complete;
    }
}

/// Ephemeral tool call descriptor emitted by the model.
///
/// Never persisted directly; only the resulting tool message is.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Registered tool name the model asked for.
    pub name: String,
    /// Arguments the model supplied.
    pub arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, MessageStatus, ToolExecutionStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn streamed_text_grows_in_place() {
        let mut message = ChatMessage::assistant_processing(Vec::new());
        message.append_text("hello");
        message.append_text(" world");
        assert_eq!(message.text(), Some("hello world"));
        assert_eq!(message.status, MessageStatus::Processing);

        message.mark_complete();
        assert_eq!(message.status, MessageStatus::Complete);
    }

    #[test]
    fn tool_resolution_only_moves_forward() {
        let mut message = ChatMessage::tool_pending("createNote", json!({ "title": "x" }));
        message.resolve_tool(ToolExecutionStatus::Error, json!({ "success": false }));
        let card = message.tool_card().expect("card");
        assert_eq!(card.execution, ToolExecutionStatus::Error);

        // A second resolution must not overwrite the first.
        message.resolve_tool(ToolExecutionStatus::Complete, json!({ "success": true }));
        let card = message.tool_card().expect("card");
        assert_eq!(card.execution, ToolExecutionStatus::Error);
        assert_eq!(card.result, Some(json!({ "success": false })));
    }

    #[test]
    fn message_round_trips_through_json() {
        let message = ChatMessage::tool_pending("searchNotes", json!({ "query": "q" }));
        let encoded = serde_json::to_value(&message).expect("serialize");
        let decoded: ChatMessage = serde_json::from_value(encoded).expect("deserialize");
        assert_eq!(decoded, message);
    }
}
