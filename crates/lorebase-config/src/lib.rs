//! Configuration for the Lorebase conversational core.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{default_config_path, load, load_from};
pub use model::{
    AgentConfig, HistoryConfig, LorebaseConfig, LorebaseConfigBuilder, RetrievalConfig,
};
