//! Shared vocabulary for Lorebase conversation events and common types.

mod tool;

pub use tool::ToolError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a conversation message.
pub type MessageId = Uuid;
/// Unique identifier for a note in the vault.
pub type NoteId = Uuid;
/// Unique identifier for a folder in the vault.
pub type FolderId = Uuid;
/// Unique identifier for a note template.
pub type TemplateId = Uuid;

/// Conversation modes offered by the orchestrator.
///
/// Each mode owns an isolated message log. `Agent` additionally owns a live
/// model session and drives the tool-calling loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Question answering grounded in retrieved notes.
    Ask,
    /// Writing copilot without retrieval grounding.
    Draft,
    /// Digest of retrieved notes relevant to a topic.
    Summarize,
    /// Agentic mode with vault tool access.
    Agent,
}

impl ChatMode {
    /// All modes, in display order.
    pub const ALL: [ChatMode; 4] = [
        ChatMode::Ask,
        ChatMode::Draft,
        ChatMode::Summarize,
        ChatMode::Agent,
    ];

    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Ask => "ask",
            ChatMode::Draft => "draft",
            ChatMode::Summarize => "summarize",
            ChatMode::Agent => "agent",
        }
    }

    /// Whether this mode runs the tool-calling loop.
    pub fn is_agentic(&self) -> bool {
        matches!(self, ChatMode::Agent)
    }

    /// Whether this mode grounds replies on retrieved notes.
    pub fn uses_retrieval(&self) -> bool {
        matches!(self, ChatMode::Ask | ChatMode::Summarize)
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaker role for a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
    /// Tool invocation record.
    Tool,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    /// Parse a role from a lowercase string; unknown values fall back to user.
    pub fn parse(value: &str) -> Self {
        if value == "assistant" {
            Role::Assistant
        } else if value == "tool" {
            Role::Tool
        } else {
            Role::User
        }
    }
}

/// Per-mode request state exposed to observers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    /// No request in flight.
    #[default]
    Idle,
    /// Awaiting semantic retrieval.
    Searching,
    /// Awaiting or consuming the model response.
    Replying,
    /// Executing a batch of tool calls.
    UsingTool,
}

impl ChatStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Idle => "idle",
            ChatStatus::Searching => "searching",
            ChatStatus::Replying => "replying",
            ChatStatus::UsingTool => "using_tool",
        }
    }
}

/// User rating attached to an assistant message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRating {
    /// Helpful response.
    Positive,
    /// Unhelpful response.
    Negative,
}

/// User feedback attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    /// Rating direction.
    pub rating: FeedbackRating,
    /// Freeform feedback tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Inline image attached to a user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type of the image payload.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// Wrapper for events emitted by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMsg {
    /// Unique id for the event.
    pub id: Uuid,
    /// Timestamp when the event was created.
    pub created_at: DateTime<Utc>,
    /// Event payload content.
    pub payload: EventPayload,
}

/// All events emitted during conversation orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum EventPayload {
    /// Per-mode request state changed.
    StatusChanged { mode: ChatMode, status: ChatStatus },
    /// A message was appended to a mode log.
    MessageAppended { mode: ChatMode, message_id: MessageId },
    /// Streamed text was appended to an in-flight assistant message.
    MessageDelta {
        mode: ChatMode,
        message_id: MessageId,
        delta: String,
    },
    /// A message reached its final state.
    MessageCompleted { mode: ChatMode, message_id: MessageId },
    /// Tool execution started for a pending tool message.
    ToolCallStarted {
        mode: ChatMode,
        message_id: MessageId,
        tool_name: String,
        arguments: Value,
    },
    /// Tool execution finished for a tool message.
    ToolCallFinished {
        mode: ChatMode,
        message_id: MessageId,
        result: Value,
        success: bool,
    },
    /// A message was deleted by id.
    MessageDeleted { mode: ChatMode, message_id: MessageId },
    /// A mode log was cleared.
    ModeCleared { mode: ChatMode },
    /// A mode-scoped error was recorded.
    Error { mode: ChatMode, message: String },
}

/// Sink interface for orchestrator events.
pub trait EventSink: Send + Sync {
    /// Emit an event to downstream listeners.
    fn emit(&self, event: EventMsg);
}
