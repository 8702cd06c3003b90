//! Chat orchestration facade.

mod agent_turn;
mod instructions;
mod stream_turn;

use crate::error::CoreError;
use crate::history::ModeHistoryStore;
use crate::llm::{AgentSession, AgentTransport, ChatTransport};
use crate::retrieval::{RetrievalPreambleBuilder, SemanticSearch};
use crate::session::{SessionToken, StreamSessionController};
use crate::state::{HistoryStateStore, JsonHistoryStore};
use crate::types::ChatMessage;
use chrono::Utc;
use directories::BaseDirs;
use log::{debug, error, info};
use lorebase_config::{HistoryConfig, LorebaseConfig};
use lorebase_protocol::{
    ChatMode, ChatStatus, EventMsg, EventPayload, EventSink, Feedback, ImageAttachment, MessageId,
};
use lorebase_tools::{ToolContext, ToolRegistry};
use lorebase_vault::{Note, VaultStore};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

const EVENT_STREAM_BUFFER: usize = 512;

/// Top-level conversation coordinator.
///
/// Owned by the host's composition root; UI surfaces read state through the
/// accessors and watch mutations through [`ChatOrchestrator::subscribe`].
/// One orchestrator has exactly one current session token at a time, so a
/// new send or a clear supersedes any in-flight request.
pub struct ChatOrchestrator {
    /// Shared configuration snapshot.
    config: Arc<LorebaseConfig>,
    /// Mode-partitioned conversation history.
    history: ModeHistoryStore,
    /// Session token issuer guarding asynchronous write-backs.
    sessions: StreamSessionController,
    /// Registry of vault tools exposed to the agentic mode.
    tools: ToolRegistry,
    /// Context handed to every tool execution.
    tool_ctx: ToolContext,
    /// Vault store, read directly for retrieval grounding.
    vault: Arc<dyn VaultStore>,
    /// Semantic search collaborator.
    search: Arc<dyn SemanticSearch>,
    /// Streaming transport for the non-agentic modes.
    chat_transport: Arc<dyn ChatTransport>,
    /// Session transport for the agentic mode.
    agent_transport: Arc<dyn AgentTransport>,
    /// Live model session for the agentic mode, if one is open.
    agent_session: Mutex<Option<Box<dyn AgentSession>>>,
    /// Grounding preamble assembly.
    preamble: RetrievalPreambleBuilder,
    /// Per-mode request status.
    status: RwLock<HashMap<ChatMode, ChatStatus>>,
    /// Per-mode error flag from the most recent failed turn.
    errors: RwLock<HashMap<ChatMode, String>>,
    /// Broadcast bus backing `subscribe`.
    bus: broadcast::Sender<EventMsg>,
    /// Optional external event sink.
    event_sink: Option<Arc<dyn EventSink>>,
}

impl ChatOrchestrator {
    /// Construct an orchestrator around the injected collaborators.
    ///
    /// When history persistence is enabled and no store is supplied, a JSON
    /// snapshot store is created under the configured (or default) root and
    /// any persisted history is loaded back into the mode logs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: LorebaseConfig,
        vault: Arc<dyn VaultStore>,
        search: Arc<dyn SemanticSearch>,
        chat_transport: Arc<dyn ChatTransport>,
        agent_transport: Arc<dyn AgentTransport>,
        tools: ToolRegistry,
        state_store: Option<Arc<dyn HistoryStateStore>>,
        event_sink: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, CoreError> {
        info!("initializing chat orchestrator");
        debug!(
            "orchestrator config flags (history={}, retention={}, max_tool_rounds={})",
            config.history.enabled, config.history.retention, config.agent.max_tool_rounds
        );
        let state_store = if config.history.enabled {
            match state_store {
                Some(store) => Some(store),
                None => Some(build_default_history_store(&config.history)?),
            }
        } else {
            None
        };
        let history = ModeHistoryStore::new(state_store, config.history.retention);
        history.load();

        let preamble = RetrievalPreambleBuilder::new(config.retrieval.excerpt_chars);
        let (bus, _) = broadcast::channel(EVENT_STREAM_BUFFER);
        debug!("tool registry wired (tools={})", tools.list().len());

        Ok(Self {
            config: Arc::new(config),
            history,
            sessions: StreamSessionController::new(),
            tools,
            tool_ctx: ToolContext::new(vault.clone()),
            vault,
            search,
            chat_transport,
            agent_transport,
            agent_session: Mutex::new(None),
            preamble,
            status: RwLock::new(HashMap::new()),
            errors: RwLock::new(HashMap::new()),
            bus,
            event_sink,
        })
    }

    /// Return the shared configuration for this orchestrator.
    pub fn config(&self) -> &LorebaseConfig {
        &self.config
    }

    /// Send a user message in a mode and drive the turn to completion.
    ///
    /// Beginning the send supersedes any in-flight turn on this
    /// orchestrator. Failures surface as messages in the mode log, never as
    /// an error return. The issued token is returned so callers can relate
    /// later events to this turn.
    pub async fn send(
        &self,
        mode: ChatMode,
        text: impl Into<String>,
        image: Option<ImageAttachment>,
    ) -> SessionToken {
        let text = text.into();
        let token = self.sessions.begin();
        info!("starting send (mode={}, prompt_len={})", mode, text.len());
        self.errors.write().remove(&mode);
        if mode.is_agentic() {
            self.run_agent_turn(text, image, token).await;
        } else {
            self.run_stream_turn(mode, text, image, token).await;
        }
        token
    }

    /// Clear one mode's log and cancel any in-flight request.
    ///
    /// This is the only cancellation primitive: it supersedes the current
    /// session token, and for the agentic mode drops the live model session
    /// so the next message starts a fresh model-side context.
    pub fn clear(&self, mode: ChatMode) {
        info!("clearing mode (mode={})", mode);
        self.sessions.invalidate();
        self.history.clear(mode);
        if mode.is_agentic() && self.agent_session.lock().take().is_some() {
            debug!("dropped live agent session");
        }
        self.errors.write().remove(&mode);
        self.status.write().insert(mode, ChatStatus::Idle);
        self.emit(EventPayload::StatusChanged {
            mode,
            status: ChatStatus::Idle,
        });
        self.emit(EventPayload::ModeCleared { mode });
    }

    /// Return the ordered log for a mode, oldest first.
    pub fn history(&self, mode: ChatMode) -> Vec<ChatMessage> {
        self.history.all(mode)
    }

    /// Return the current request status for a mode.
    pub fn status(&self, mode: ChatMode) -> ChatStatus {
        self.status.read().get(&mode).copied().unwrap_or_default()
    }

    /// Return the error recorded by the most recent failed turn, if any.
    pub fn last_error(&self, mode: ChatMode) -> Option<String> {
        self.errors.read().get(&mode).cloned()
    }

    /// Delete one message by id; returns false when absent.
    pub fn delete_message(&self, mode: ChatMode, message_id: MessageId) -> bool {
        let deleted = self.history.delete(mode, message_id);
        if deleted {
            self.emit(EventPayload::MessageDeleted { mode, message_id });
        }
        deleted
    }

    /// Attach user feedback to a message; returns false when absent.
    pub fn record_feedback(
        &self,
        mode: ChatMode,
        message_id: MessageId,
        feedback: Feedback,
    ) -> bool {
        self.history.replace(mode, message_id, |message| {
            message.feedback = Some(feedback);
        })
    }

    /// Subscribe to orchestrator events.
    pub fn subscribe(&self) -> BroadcastStream<EventMsg> {
        BroadcastStream::new(self.bus.subscribe())
    }

    /// Persist the current history snapshot (teardown path).
    pub fn flush_history(&self) {
        self.history.flush();
    }

    /// Whether the token still owns the current session; logs stale drops.
    pub(crate) fn guard(&self, token: SessionToken) -> bool {
        let current = self.sessions.is_current(token);
        if !current {
            debug!("discarding superseded mutation (token={token:?})");
        }
        current
    }

    /// Emit an event to the broadcast bus and the optional external sink.
    pub(crate) fn emit(&self, payload: EventPayload) {
        let event = EventMsg {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
        };
        if let Some(sink) = &self.event_sink {
            sink.emit(event.clone());
        }
        let _ = self.bus.send(event);
    }

    /// Token-guarded status transition with change-only emission.
    pub(crate) fn set_status(&self, mode: ChatMode, status: ChatStatus, token: SessionToken) {
        if !self.guard(token) {
            return;
        }
        let changed = self.status.write().insert(mode, status) != Some(status);
        if changed {
            self.emit(EventPayload::StatusChanged { mode, status });
        }
    }

    /// Append a message and announce it; returns its id.
    pub(crate) fn append_message(&self, mode: ChatMode, message: ChatMessage) -> MessageId {
        let message_id = message.id;
        self.history.append(mode, message);
        self.emit(EventPayload::MessageAppended { mode, message_id });
        message_id
    }

    /// Record a turn failure: error flag, synthetic assistant message, event.
    pub(crate) fn record_turn_error(&self, mode: ChatMode, token: SessionToken, message: String) {
        if !self.guard(token) {
            return;
        }
        error!("turn failed (mode={}): {}", mode, message);
        self.errors.write().insert(mode, message.clone());
        self.append_message(mode, ChatMessage::assistant(message.clone()));
        self.emit(EventPayload::Error { mode, message });
    }

    /// Record a turn failure and return the mode to idle.
    pub(crate) fn fail_turn(&self, mode: ChatMode, token: SessionToken, message: String) {
        self.record_turn_error(mode, token, message);
        self.set_status(mode, ChatStatus::Idle, token);
    }

    /// Rank vault notes against the query and keep the top candidates.
    pub(crate) async fn collect_sources(&self, query: &str) -> Result<Vec<Note>, String> {
        let notes = self
            .vault
            .list_notes()
            .await
            .map_err(|err| err.to_string())?;
        let ranked = self
            .search
            .search(query, &notes)
            .await
            .map_err(|err| err.to_string())?;
        let mut by_id: HashMap<_, _> = notes.into_iter().map(|note| (note.id, note)).collect();
        let sources: Vec<Note> = ranked
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .take(self.config.retrieval.max_sources)
            .collect();
        debug!("retrieval ranked sources (count={})", sources.len());
        Ok(sources)
    }
}

impl Drop for ChatOrchestrator {
    /// Best-effort synchronous flush of the history snapshot on teardown.
    fn drop(&mut self) {
        debug!("flushing history on teardown");
        self.history.flush();
    }
}

/// Build the default history store from config.
fn build_default_history_store(
    config: &HistoryConfig,
) -> Result<Arc<dyn HistoryStateStore>, CoreError> {
    let root = resolve_default_root(config.path.as_ref(), "history")?;
    Ok(Arc::new(JsonHistoryStore::new(root)?))
}

/// Resolve an absolute storage root for config-specified paths.
fn resolve_default_root(
    path: Option<&String>,
    fallback_dir: &str,
) -> Result<PathBuf, CoreError> {
    let cwd = std::env::current_dir().map_err(CoreError::Io)?;
    if let Some(path) = path {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            debug!("using absolute storage root: {}", path.display());
            return Ok(path);
        }
        debug!(
            "resolving storage root relative to cwd: {}",
            cwd.join(&path).display()
        );
        return Ok(cwd.join(path));
    }

    if let Some(home) = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()) {
        debug!(
            "resolving storage root under home: {}",
            home.join(".lorebase").join(fallback_dir).display()
        );
        return Ok(home.join(".lorebase").join(fallback_dir));
    }

    Ok(cwd.join(".lorebase").join(fallback_dir))
}
