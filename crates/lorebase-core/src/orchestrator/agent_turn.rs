//! Agentic turn flow: the tool-calling loop.

use super::ChatOrchestrator;
use super::instructions::agent_instruction;
use crate::llm::{AgentContent, AgentSession, ToolResultPayload};
use crate::session::SessionToken;
use crate::types::{ChatMessage, ToolExecutionStatus};
use log::{debug, warn};
use lorebase_protocol::{ChatMode, ChatStatus, EventPayload, ImageAttachment};
use serde_json::json;

/// How one agent turn ended.
enum AgentOutcome {
    /// The model stopped requesting tools.
    Completed,
    /// A newer session superseded this turn.
    Superseded,
    /// The transport failed mid-turn.
    TransportFailed(String),
    /// The model kept requesting tools past the configured cap.
    RoundsExhausted,
}

impl ChatOrchestrator {
    /// Drive one agentic turn through the tool-calling loop.
    ///
    /// The live model session is taken out of its slot for the duration of
    /// the turn and only put back when this turn's token is still current;
    /// a clear issued mid-turn therefore drops the model-side context.
    pub(crate) async fn run_agent_turn(
        &self,
        text: String,
        image: Option<ImageAttachment>,
        token: SessionToken,
    ) {
        let mode = ChatMode::Agent;
        self.append_message(mode, ChatMessage::user(text.clone(), image));
        self.set_status(mode, ChatStatus::Replying, token);

        // Take the handle out before any await so the lock is never held
        // across a suspension point.
        let live_session = self.agent_session.lock().take();
        let mut session = match live_session {
            Some(session) => session,
            None => {
                match self
                    .agent_transport
                    .open_session(&agent_instruction(&self.config.agent), &self.tools.specs())
                    .await
                {
                    Ok(session) => session,
                    Err(err) => {
                        self.fail_turn(mode, token, format!("Could not reach the model: {err}"));
                        return;
                    }
                }
            }
        };

        let outcome = self.drive_tool_loop(session.as_mut(), text, token).await;

        if matches!(outcome, AgentOutcome::Superseded) {
            debug!("agent turn superseded, dropping model session");
            return;
        }
        // Still current: keep the model-side context for the next message.
        *self.agent_session.lock() = Some(session);

        match outcome {
            AgentOutcome::Completed => {}
            AgentOutcome::TransportFailed(message) => {
                self.record_turn_error(mode, token, format!("The model request failed: {message}"));
            }
            AgentOutcome::RoundsExhausted => {
                self.record_turn_error(
                    mode,
                    token,
                    format!(
                        "The agent stopped after {} tool rounds without finishing; try a \
                         narrower request.",
                        self.config.agent.max_tool_rounds
                    ),
                );
            }
            AgentOutcome::Superseded => unreachable!("handled above"),
        }
        self.set_status(mode, ChatStatus::Idle, token);
    }

    /// Exchange turns with the model until it stops calling tools.
    ///
    /// Tool calls within a batch execute strictly sequentially, in the order
    /// received; a failing tool resolves its own message to error and never
    /// prevents its siblings from running. All results, failures included,
    /// are packaged into one follow-up turn.
    async fn drive_tool_loop(
        &self,
        session: &mut dyn AgentSession,
        text: String,
        token: SessionToken,
    ) -> AgentOutcome {
        let mode = ChatMode::Agent;
        let max_rounds = self.config.agent.max_tool_rounds;
        let mut content = AgentContent::Text(text);

        for round in 0..max_rounds {
            let reply = match session.send_message(content).await {
                Ok(reply) => reply,
                Err(err) => {
                    return if self.guard(token) {
                        AgentOutcome::TransportFailed(err.to_string())
                    } else {
                        AgentOutcome::Superseded
                    };
                }
            };
            if !self.guard(token) {
                return AgentOutcome::Superseded;
            }

            if reply.tool_calls.is_empty() {
                match reply.text.filter(|text| !text.is_empty()) {
                    Some(text) => {
                        self.append_message(mode, ChatMessage::assistant(text));
                    }
                    None => warn!("agent reply carried neither text nor tool calls"),
                }
                return AgentOutcome::Completed;
            }

            debug!(
                "model requested tools (round={}, calls={})",
                round,
                reply.tool_calls.len()
            );
            self.set_status(mode, ChatStatus::UsingTool, token);

            let mut results: Vec<ToolResultPayload> = Vec::with_capacity(reply.tool_calls.len());
            for call in reply.tool_calls {
                let message_id = self.append_message(
                    mode,
                    ChatMessage::tool_pending(call.name.clone(), call.arguments.clone()),
                );
                self.emit(EventPayload::ToolCallStarted {
                    mode,
                    message_id,
                    tool_name: call.name.clone(),
                    arguments: call.arguments.clone(),
                });

                let executed = self
                    .tools
                    .execute(&self.tool_ctx, &call.name, call.arguments)
                    .await;
                if !self.guard(token) {
                    return AgentOutcome::Superseded;
                }

                let (result, success) = match executed {
                    Ok(value) => (value, true),
                    Err(err) => {
                        warn!("tool failed (name={}): {err}", call.name);
                        (json!({ "success": false, "error": err.to_string() }), false)
                    }
                };
                let execution = if success {
                    ToolExecutionStatus::Complete
                } else {
                    ToolExecutionStatus::Error
                };
                self.history.replace(mode, message_id, |message| {
                    message.resolve_tool(execution, result.clone());
                });
                self.emit(EventPayload::ToolCallFinished {
                    mode,
                    message_id,
                    result: result.clone(),
                    success,
                });
                results.push(ToolResultPayload {
                    tool_name: call.name,
                    result,
                });
            }

            content = AgentContent::ToolResults(results);
            self.set_status(mode, ChatStatus::Replying, token);
        }

        AgentOutcome::RoundsExhausted
    }
}
