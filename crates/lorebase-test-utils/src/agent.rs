//! Mock agentic transports and sessions.

use async_trait::async_trait;
use lorebase_core::{AgentContent, AgentSession, AgentTransport, ModelReply, TransportError};
use lorebase_core::types::ToolInvocation;
use lorebase_tools::ToolSpec;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport whose sessions replay a scripted sequence of model replies.
///
/// Every opened session shares the transport's recorders, so tests can
/// assert on what the orchestrator sent back to the model and on the tool
/// specs it advertised.
#[derive(Default)]
pub struct ScriptedAgentTransport {
    scripts: Mutex<VecDeque<Vec<ModelReply>>>,
    sent: Arc<Mutex<Vec<AgentContent>>>,
    advertised_tools: Arc<Mutex<Vec<String>>>,
    opened: AtomicUsize,
}

impl ScriptedAgentTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply script for the next opened session.
    pub fn push_script(&self, replies: Vec<ModelReply>) {
        self.scripts.lock().push_back(replies);
    }

    /// Everything the orchestrator sent to the model, in order.
    pub fn sent(&self) -> Vec<AgentContent> {
        self.sent.lock().clone()
    }

    /// Tool names advertised on the most recent session open.
    pub fn advertised_tools(&self) -> Vec<String> {
        self.advertised_tools.lock().clone()
    }

    /// How many sessions have been opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentTransport for ScriptedAgentTransport {
    async fn open_session(
        &self,
        _system_instruction: &str,
        tools: &[ToolSpec],
    ) -> Result<Box<dyn AgentSession>, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.advertised_tools.lock() = tools.iter().map(|spec| spec.name.clone()).collect();
        let replies = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::Request("no script registered".to_string()))?;
        Ok(Box::new(ScriptedAgentSession {
            replies: replies.into(),
            sent: self.sent.clone(),
        }))
    }
}

struct ScriptedAgentSession {
    replies: VecDeque<ModelReply>,
    sent: Arc<Mutex<Vec<AgentContent>>>,
}

#[async_trait]
impl AgentSession for ScriptedAgentSession {
    async fn send_message(&mut self, content: AgentContent) -> Result<ModelReply, TransportError> {
        self.sent.lock().push(content);
        self.replies
            .pop_front()
            .ok_or_else(|| TransportError::Request("script exhausted".to_string()))
    }
}

/// Transport whose sessions request the same tool on every turn, forever.
pub struct EndlessToolTransport {
    call: ToolInvocation,
}

impl EndlessToolTransport {
    pub fn new(call: ToolInvocation) -> Self {
        Self { call }
    }
}

#[async_trait]
impl AgentTransport for EndlessToolTransport {
    async fn open_session(
        &self,
        _system_instruction: &str,
        _tools: &[ToolSpec],
    ) -> Result<Box<dyn AgentSession>, TransportError> {
        Ok(Box::new(EndlessToolSession {
            call: self.call.clone(),
        }))
    }
}

struct EndlessToolSession {
    call: ToolInvocation,
}

#[async_trait]
impl AgentSession for EndlessToolSession {
    async fn send_message(&mut self, _content: AgentContent) -> Result<ModelReply, TransportError> {
        Ok(ModelReply {
            text: None,
            tool_calls: vec![self.call.clone()],
        })
    }
}
