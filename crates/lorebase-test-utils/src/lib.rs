//! Shared mocks and fixtures for Lorebase tests.

mod agent;
mod events;
mod llm;
mod search;
mod vault;

pub use agent::{EndlessToolTransport, ScriptedAgentTransport};
pub use events::RecordingEventSink;
pub use llm::{BrokenChatTransport, ChannelChatTransport, ChunkedChatTransport,
    FailingChatTransport};
pub use search::{FailingSearch, StaticSearch, TitleSearch};
pub use vault::seeded_vault;
