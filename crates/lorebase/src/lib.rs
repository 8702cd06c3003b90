//! Public SDK surface for the Lorebase conversational core.
//!
//! This crate re-exports the core building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use lorebase_config as config;
/// Re-export for convenience.
pub use lorebase_core as core;
/// Re-export for convenience.
pub use lorebase_protocol as protocol;
/// Re-export for convenience.
pub use lorebase_tools as tools;
/// Re-export for convenience.
pub use lorebase_vault as vault;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Hosts are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
