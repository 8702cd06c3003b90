//! Orchestrator integration tests with mock transports.

use lorebase_config::{AgentConfig, HistoryConfig, LorebaseConfig};
use lorebase_core::types::{MessageStatus, ToolExecutionStatus, ToolInvocation};
use lorebase_core::{AgentContent, AgentTransport, ChatOrchestrator, ChatTransport, ModelReply,
    SemanticSearch};
use lorebase_protocol::{ChatMode, ChatStatus, EventPayload, Role};
use lorebase_test_utils::{
    BrokenChatTransport, ChunkedChatTransport, EndlessToolTransport, FailingChatTransport,
    FailingSearch, RecordingEventSink, ScriptedAgentTransport, StaticSearch, TitleSearch,
    seeded_vault,
};
use lorebase_tools::{ToolRegistry, builtin_tool_registry};
use lorebase_vault::{InMemoryVault, VaultStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn memory_only_config() -> LorebaseConfig {
    LorebaseConfig::builder()
        .history(HistoryConfig {
            enabled: false,
            retention: 100,
            path: None,
        })
        .build()
}

fn orchestrator(
    config: LorebaseConfig,
    vault: Arc<dyn VaultStore>,
    search: Arc<dyn SemanticSearch>,
    chat: Arc<dyn ChatTransport>,
    agent: Arc<dyn AgentTransport>,
    tools: ToolRegistry,
) -> ChatOrchestrator {
    ChatOrchestrator::new(config, vault, search, chat, agent, tools, None, None)
        .expect("build orchestrator")
}

fn unused_chat() -> Arc<dyn ChatTransport> {
    Arc::new(ChunkedChatTransport::new(Vec::<String>::new()))
}

fn unused_agent() -> Arc<dyn AgentTransport> {
    Arc::new(ScriptedAgentTransport::new())
}

/// Streaming mode should grow one assistant message from the chunk stream
/// and attach the retrieved sources to it.
#[tokio::test]
async fn ask_mode_streams_a_grounded_reply() {
    let vault = seeded_vault().await;
    let chat = Arc::new(ChunkedChatTransport::new(vec!["Feed it ", "every morning."]));
    let orchestrator = orchestrator(
        memory_only_config(),
        vault,
        Arc::new(TitleSearch),
        chat,
        unused_agent(),
        builtin_tool_registry(),
    );

    orchestrator
        .send(ChatMode::Ask, "How do I keep the sourdough starter alive?", None)
        .await;

    let log = orchestrator.history(ChatMode::Ask);
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].role, Role::User);
    assert_eq!(log[1].role, Role::Assistant);
    assert_eq!(log[1].text(), Some("Feed it every morning."));
    assert_eq!(log[1].status, MessageStatus::Complete);
    assert_eq!(log[1].sources.len(), 1);
    assert_eq!(log[1].sources[0].title, "Sourdough starter".to_string());
    assert_eq!(orchestrator.status(ChatMode::Ask), ChatStatus::Idle);
    assert_eq!(orchestrator.last_error(ChatMode::Ask), None);
}

/// Draft mode skips the retrieval phase entirely.
#[tokio::test]
async fn draft_mode_never_enters_searching() {
    let sink = Arc::new(RecordingEventSink::new());
    let chat = Arc::new(ChunkedChatTransport::new(vec!["better text"]));
    let orchestrator = ChatOrchestrator::new(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        chat,
        unused_agent(),
        builtin_tool_registry(),
        None,
        Some(sink.clone()),
    )
    .expect("build orchestrator");

    orchestrator.send(ChatMode::Draft, "make this crisp", None).await;

    let searched = sink.events().into_iter().any(|event| {
        matches!(
            event.payload,
            EventPayload::StatusChanged {
                status: ChatStatus::Searching,
                ..
            }
        )
    });
    assert_eq!(searched, false);
    let log = orchestrator.history(ChatMode::Draft);
    assert_eq!(log[1].text(), Some("better text"));
}

/// Retrieval failures become a synthetic assistant error message.
#[tokio::test]
async fn search_failure_surfaces_as_error_message() {
    let orchestrator = orchestrator(
        memory_only_config(),
        seeded_vault().await,
        Arc::new(FailingSearch::new("index offline")),
        unused_chat(),
        unused_agent(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Ask, "anything", None).await;

    let log = orchestrator.history(ChatMode::Ask);
    assert_eq!(log.len(), 2);
    let error_text = log[1].text().expect("text").to_string();
    assert_eq!(error_text.contains("Searching your notes failed"), true);
    assert_eq!(error_text.contains("index offline"), true);
    assert_eq!(orchestrator.status(ChatMode::Ask), ChatStatus::Idle);
    assert_eq!(orchestrator.last_error(ChatMode::Ask).is_some(), true);
}

/// A stream that dies mid-reply keeps the partial text and appends a
/// separate error message rather than overwriting it.
#[tokio::test]
async fn mid_stream_failure_preserves_partial_text() {
    let chat = Arc::new(BrokenChatTransport::new(vec!["partial answer "], "link dropped"));
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        chat,
        unused_agent(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Ask, "question", None).await;

    let log = orchestrator.history(ChatMode::Ask);
    assert_eq!(log.len(), 3);
    assert_eq!(log[1].text(), Some("partial answer "));
    assert_eq!(log[1].status, MessageStatus::Complete);
    let error_text = log[2].text().expect("text").to_string();
    assert_eq!(error_text.contains("The reply stream failed"), true);
    assert_eq!(orchestrator.status(ChatMode::Ask), ChatStatus::Idle);
}

/// A transport that cannot open a stream fails the turn cleanly.
#[tokio::test]
async fn stream_open_failure_fails_the_turn() {
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        Arc::new(FailingChatTransport::new("no route")),
        unused_agent(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Summarize, "digest my notes", None).await;

    let log = orchestrator.history(ChatMode::Summarize);
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1].text().expect("text").contains("The model request failed"),
        true
    );
    assert_eq!(orchestrator.status(ChatMode::Summarize), ChatStatus::Idle);
}

/// The canonical agentic flow: one createNote tool call resolving
/// pending -> complete, then a final assistant message.
#[tokio::test]
async fn agent_mode_runs_one_tool_then_replies() {
    let vault: Arc<InMemoryVault> = Arc::new(InMemoryVault::new());
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(vec![
        ModelReply {
            text: None,
            tool_calls: vec![ToolInvocation {
                name: "createNote".to_string(),
                arguments: json!({ "title": "Groceries" }),
            }],
        },
        ModelReply {
            text: Some("Created your Groceries note.".to_string()),
            tool_calls: Vec::new(),
        },
    ]);
    let orchestrator = orchestrator(
        memory_only_config(),
        vault.clone(),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent.clone(),
        builtin_tool_registry(),
    );

    orchestrator
        .send(ChatMode::Agent, "Create a note called Groceries", None)
        .await;

    let log = orchestrator.history(ChatMode::Agent);
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].role, Role::User);
    assert_eq!(log[1].role, Role::Tool);
    assert_eq!(log[2].role, Role::Assistant);

    let card = log[1].tool_card().expect("tool card");
    assert_eq!(card.tool_name, "createNote".to_string());
    assert_eq!(card.execution, ToolExecutionStatus::Complete);
    let result = card.result.clone().expect("result");
    assert_eq!(result["success"], json!(true));

    // The created note exists and its id went back to the model.
    let notes = vault.list_notes().await.expect("list");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Groceries".to_string());
    let sent = agent.sent();
    assert_eq!(sent.len(), 2);
    match &sent[1] {
        AgentContent::ToolResults(results) => {
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].tool_name, "createNote".to_string());
            assert_eq!(
                results[0].result["note"]["note_id"],
                json!(notes[0].id.to_string())
            );
        }
        other => panic!("unexpected content: {other:?}"),
    }
    assert_eq!(log[2].text(), Some("Created your Groceries note."));
    assert_eq!(orchestrator.status(ChatMode::Agent), ChatStatus::Idle);
}

/// The registry advertises its tool surface when the session opens.
#[tokio::test]
async fn agent_session_advertises_registry_tools() {
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(vec![ModelReply {
        text: Some("hi".to_string()),
        tool_calls: Vec::new(),
    }]);
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent.clone(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "hello", None).await;

    let advertised = agent.advertised_tools();
    assert_eq!(advertised.contains(&"createNote".to_string()), true);
    assert_eq!(advertised.contains(&"findAndReplace".to_string()), true);
    assert_eq!(advertised.len(), 12);
}

/// Within a batch, tools execute in order and a failure never blocks the
/// remaining tools; all results go back to the model.
#[tokio::test]
async fn tool_failure_does_not_abort_the_batch() {
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(vec![
        ModelReply {
            text: None,
            tool_calls: vec![
                ToolInvocation {
                    name: "explodeNote".to_string(),
                    arguments: json!({}),
                },
                ToolInvocation {
                    name: "createNote".to_string(),
                    arguments: json!({ "title": "Survivor" }),
                },
            ],
        },
        ModelReply {
            text: Some("One tool failed, one note created.".to_string()),
            tool_calls: Vec::new(),
        },
    ]);
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent.clone(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "do two things", None).await;

    let log = orchestrator.history(ChatMode::Agent);
    assert_eq!(log.len(), 4);

    let first = log[1].tool_card().expect("first card");
    assert_eq!(first.tool_name, "explodeNote".to_string());
    assert_eq!(first.execution, ToolExecutionStatus::Error);
    let failure = first.result.clone().expect("failure payload");
    assert_eq!(failure["success"], json!(false));
    assert_eq!(
        failure["error"].as_str().expect("error").contains("tool not found"),
        true
    );

    let second = log[2].tool_card().expect("second card");
    assert_eq!(second.tool_name, "createNote".to_string());
    assert_eq!(second.execution, ToolExecutionStatus::Complete);

    match &agent.sent()[1] {
        AgentContent::ToolResults(results) => {
            let names: Vec<String> = results.iter().map(|r| r.tool_name.clone()).collect();
            assert_eq!(names, vec!["explodeNote".to_string(), "createNote".to_string()]);
        }
        other => panic!("unexpected content: {other:?}"),
    }
}

/// A model that never stops calling tools hits the configured cap and
/// reports exactly one terminal error message.
#[tokio::test]
async fn runaway_tool_loop_aborts_at_the_cap() {
    let config = LorebaseConfig::builder()
        .history(HistoryConfig {
            enabled: false,
            retention: 100,
            path: None,
        })
        .agent(AgentConfig {
            max_tool_rounds: 3,
            additional_instruction_prompt: None,
        })
        .build();
    let agent = Arc::new(EndlessToolTransport::new(ToolInvocation {
        name: "searchNotes".to_string(),
        arguments: json!({ "query": "loop" }),
    }));
    let orchestrator = orchestrator(
        config,
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent,
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "never finish", None).await;

    let log = orchestrator.history(ChatMode::Agent);
    // user + one resolved tool message per round + one terminal error.
    assert_eq!(log.len(), 5);
    for message in &log[1..4] {
        let card = message.tool_card().expect("tool card");
        assert_eq!(card.execution, ToolExecutionStatus::Complete);
    }
    let terminal = log[4].text().expect("text").to_string();
    assert_eq!(terminal.contains("3 tool rounds"), true);
    assert_eq!(orchestrator.last_error(ChatMode::Agent).is_some(), true);
    assert_eq!(orchestrator.status(ChatMode::Agent), ChatStatus::Idle);
}

/// A failing session transport surfaces one error message and stays idle.
#[tokio::test]
async fn agent_transport_failure_fails_the_turn() {
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(Vec::new());
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent,
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "hello", None).await;

    let log = orchestrator.history(ChatMode::Agent);
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1].text().expect("text").contains("The model request failed"),
        true
    );
    assert_eq!(orchestrator.status(ChatMode::Agent), ChatStatus::Idle);
}

/// Clearing the agent mode drops the live model session, so the next send
/// opens a fresh model-side context.
#[tokio::test]
async fn clear_discards_the_live_agent_session() {
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(vec![ModelReply {
        text: Some("first".to_string()),
        tool_calls: Vec::new(),
    }]);
    agent.push_script(vec![ModelReply {
        text: Some("second".to_string()),
        tool_calls: Vec::new(),
    }]);
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent.clone(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "one", None).await;
    assert_eq!(agent.opened(), 1);

    orchestrator.clear(ChatMode::Agent);
    assert_eq!(orchestrator.history(ChatMode::Agent).len(), 0);

    orchestrator.send(ChatMode::Agent, "two", None).await;
    assert_eq!(agent.opened(), 2);
    let log = orchestrator.history(ChatMode::Agent);
    assert_eq!(log[1].text(), Some("second"));
}

/// A kept session is reused across consecutive sends.
#[tokio::test]
async fn agent_session_is_reused_between_sends() {
    let agent = Arc::new(ScriptedAgentTransport::new());
    agent.push_script(vec![
        ModelReply {
            text: Some("first".to_string()),
            tool_calls: Vec::new(),
        },
        ModelReply {
            text: Some("second".to_string()),
            tool_calls: Vec::new(),
        },
    ]);
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        unused_chat(),
        agent.clone(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Agent, "one", None).await;
    orchestrator.send(ChatMode::Agent, "two", None).await;
    assert_eq!(agent.opened(), 1);
    assert_eq!(orchestrator.history(ChatMode::Agent).len(), 4);
}

/// Feedback and deletion operate on single messages by id.
#[tokio::test]
async fn feedback_and_deletion_target_single_messages() {
    let chat = Arc::new(ChunkedChatTransport::new(vec!["reply"]));
    let orchestrator = orchestrator(
        memory_only_config(),
        Arc::new(InMemoryVault::new()),
        Arc::new(StaticSearch::empty()),
        chat,
        unused_agent(),
        builtin_tool_registry(),
    );

    orchestrator.send(ChatMode::Ask, "question", None).await;
    let log = orchestrator.history(ChatMode::Ask);
    let reply_id = log[1].id;

    let recorded = orchestrator.record_feedback(
        ChatMode::Ask,
        reply_id,
        lorebase_protocol::Feedback {
            rating: lorebase_protocol::FeedbackRating::Positive,
            tags: vec!["helpful".to_string()],
        },
    );
    assert_eq!(recorded, true);
    let log = orchestrator.history(ChatMode::Ask);
    assert_eq!(log[1].feedback.is_some(), true);

    assert_eq!(orchestrator.delete_message(ChatMode::Ask, reply_id), true);
    assert_eq!(orchestrator.delete_message(ChatMode::Ask, reply_id), false);
    assert_eq!(orchestrator.history(ChatMode::Ask).len(), 1);
}
