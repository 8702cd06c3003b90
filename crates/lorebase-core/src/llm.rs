//! LLM transport collaborator seams.
//!
//! The core never talks to a provider directly; hosts inject a streaming
//! transport for the conversational modes and a session transport for the
//! agentic mode. Wire formats belong to the implementations.

use crate::types::ToolInvocation;
use async_trait::async_trait;
use futures_util::Stream;
use lorebase_protocol::ImageAttachment;
use lorebase_tools::ToolSpec;
use serde_json::Value;
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced by transport implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be issued or was rejected.
    #[error("model request failed: {0}")]
    Request(String),
    /// An open stream failed mid-flight.
    #[error("model stream failed: {0}")]
    Stream(String),
}

/// Async sequence of text chunks from the model.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// One-shot streaming transport used by the non-agentic modes.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open a streaming reply for a query under a system instruction.
    async fn stream(
        &self,
        query: &str,
        system_instruction: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ChunkStream, TransportError>;
}

/// A single model response in the agentic protocol.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    /// Final or interim text, when the model produced any.
    pub text: Option<String>,
    /// Tool invocations the model requested, in emission order.
    pub tool_calls: Vec<ToolInvocation>,
}

/// Result of one tool execution, fed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultPayload {
    /// Tool that produced the result.
    pub tool_name: String,
    /// Result payload, including failures as `{success:false, error}`.
    pub result: Value,
}

/// Content of one agentic turn sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentContent {
    /// Plain user text.
    Text(String),
    /// Batched tool results for the model's previous tool calls.
    ToolResults(Vec<ToolResultPayload>),
}

/// Live multi-turn model session used by the agentic mode.
#[async_trait]
pub trait AgentSession: Send {
    /// Send one turn and await the model's reply.
    async fn send_message(&mut self, content: AgentContent) -> Result<ModelReply, TransportError>;
}

/// Factory opening agentic model sessions.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Open a fresh model-side session advertising the given tools.
    async fn open_session(
        &self,
        system_instruction: &str,
        tools: &[ToolSpec],
    ) -> Result<Box<dyn AgentSession>, TransportError>;
}
