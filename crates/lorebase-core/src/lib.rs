//! Core conversation orchestration for Lorebase.
//!
//! This crate owns the chat orchestrator, mode-partitioned history, the
//! stream supersession scheme, and the collaborator seams for the LLM
//! transport and semantic search.

pub mod error;
pub mod history;
pub mod llm;
pub mod orchestrator;
pub mod retrieval;
pub mod session;
pub mod state;
pub mod types;

pub use error::CoreError;
pub use history::ModeHistoryStore;
pub use llm::{
    AgentContent, AgentSession, AgentTransport, ChatTransport, ChunkStream, ModelReply,
    ToolResultPayload, TransportError,
};
pub use lorebase_protocol::EventSink;
pub use orchestrator::ChatOrchestrator;
pub use retrieval::{RetrievalPreambleBuilder, SearchError, SemanticSearch};
pub use session::{SessionToken, StreamSessionController};
pub use state::{HistorySnapshot, HistoryStateStore, JsonHistoryStore, ModeLogRecord, StateError};
pub use types::{ChatMessage, MessageContent, MessageStatus, SourceRef, ToolCard,
    ToolExecutionStatus, ToolInvocation};
