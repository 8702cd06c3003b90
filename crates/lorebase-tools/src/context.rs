//! Tool execution context.

use lorebase_vault::VaultStore;
use std::sync::Arc;

/// Shared context passed to tools during execution.
///
/// Cloning is a cheap reference-count bump; every tool call sees the same
/// vault handle, which owns its own consistency.
#[derive(Clone)]
pub struct ToolContext {
    /// Vault store the tools operate on.
    pub vault: Arc<dyn VaultStore>,
}

impl ToolContext {
    /// Build a context around a vault handle.
    pub fn new(vault: Arc<dyn VaultStore>) -> Self {
        Self { vault }
    }
}
