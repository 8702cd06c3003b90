//! Monotonic stream session tokens.
//!
//! Every send/clear issues a fresh token; asynchronous completions compare
//! their captured token against the current one and discard their own
//! mutation when superseded. The controller never cancels work itself; the
//! stale check is the cancellation signal.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

/// Issues monotonically increasing session tokens; one token is current at
/// any instant.
#[derive(Debug, Default)]
pub struct StreamSessionController {
    current: AtomicU64,
}

impl StreamSessionController {
    /// Create a controller with no session begun yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session, superseding all outstanding tokens.
    pub fn begin(&self) -> SessionToken {
        let token = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        SessionToken(token)
    }

    /// Whether the given token is still the current session.
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    /// Supersede all outstanding tokens without beginning a new session.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::StreamSessionController;
    use pretty_assertions::assert_eq;

    #[test]
    fn begin_supersedes_prior_tokens() {
        let controller = StreamSessionController::new();
        let first = controller.begin();
        assert_eq!(controller.is_current(first), true);

        let second = controller.begin();
        assert_eq!(controller.is_current(first), false);
        assert_eq!(controller.is_current(second), true);
    }

    #[test]
    fn invalidate_leaves_no_current_token() {
        let controller = StreamSessionController::new();
        let token = controller.begin();
        controller.invalidate();
        assert_eq!(controller.is_current(token), false);

        let next = controller.begin();
        assert_eq!(controller.is_current(next), true);
    }
}
