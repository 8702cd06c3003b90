//! Mode-partitioned conversation history with capped write-through
//! persistence.

use crate::state::{HISTORY_SCHEMA_VERSION, HistorySnapshot, HistoryStateStore, ModeLogRecord};
use crate::types::ChatMessage;
use log::{debug, warn};
use lorebase_protocol::{ChatMode, MessageId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Append log of conversation messages, partitioned by mode.
///
/// Every mutation re-persists the capped logs; persistence failures are
/// logged and swallowed so conversation continuity never depends on the
/// durable store being available.
pub struct ModeHistoryStore {
    /// Per-mode ordered logs.
    logs: RwLock<HashMap<ChatMode, Vec<ChatMessage>>>,
    /// Optional durable snapshot store.
    state_store: Option<Arc<dyn HistoryStateStore>>,
    /// Maximum messages retained per mode.
    retention: usize,
}

impl ModeHistoryStore {
    /// Create a store with an optional persistence backend.
    pub fn new(state_store: Option<Arc<dyn HistoryStateStore>>, retention: usize) -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
            state_store,
            retention,
        }
    }

    /// Load the persisted snapshot back into the in-memory logs.
    ///
    /// Missing or unreadable snapshots leave the logs empty.
    pub fn load(&self) {
        let Some(store) = &self.state_store else {
            return;
        };
        match store.load_history() {
            Ok(Some(snapshot)) => {
                let mut logs = self.logs.write();
                for record in snapshot.modes {
                    let mut messages = record.messages;
                    Self::truncate(&mut messages, self.retention);
                    debug!(
                        "restored mode log (mode={}, messages={})",
                        record.mode,
                        messages.len()
                    );
                    logs.insert(record.mode, messages);
                }
            }
            Ok(None) => debug!("no persisted history snapshot found"),
            Err(err) => warn!("failed to load history snapshot: {err}"),
        }
    }

    /// Append a message to a mode log, enforcing the retention cap.
    pub fn append(&self, mode: ChatMode, message: ChatMessage) {
        {
            let mut logs = self.logs.write();
            let log = logs.entry(mode).or_default();
            debug!(
                "appending message (mode={}, role={}, message_id={})",
                mode,
                message.role.as_str(),
                message.id
            );
            log.push(message);
            Self::truncate(log, self.retention);
        }
        self.persist();
    }

    /// Mutate a message in place; a no-op returning false when absent.
    pub fn replace(
        &self,
        mode: ChatMode,
        message_id: MessageId,
        updater: impl FnOnce(&mut ChatMessage),
    ) -> bool {
        let found = {
            let mut logs = self.logs.write();
            match logs
                .get_mut(&mode)
                .and_then(|log| log.iter_mut().find(|message| message.id == message_id))
            {
                Some(message) => {
                    updater(message);
                    true
                }
                None => false,
            }
        };
        if found {
            self.persist();
        } else {
            debug!(
                "replace skipped, message absent (mode={}, message_id={})",
                mode, message_id
            );
        }
        found
    }

    /// Return the ordered log for a mode, oldest first.
    pub fn all(&self, mode: ChatMode) -> Vec<ChatMessage> {
        self.logs.read().get(&mode).cloned().unwrap_or_default()
    }

    /// Delete one message by id; returns false when absent.
    pub fn delete(&self, mode: ChatMode, message_id: MessageId) -> bool {
        let removed = {
            let mut logs = self.logs.write();
            match logs.get_mut(&mode) {
                Some(log) => {
                    let before = log.len();
                    log.retain(|message| message.id != message_id);
                    log.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty one mode's log, leaving other modes untouched.
    pub fn clear(&self, mode: ChatMode) {
        self.logs.write().remove(&mode);
        self.persist();
    }

    /// Persist the current snapshot unconditionally (teardown path).
    pub fn flush(&self) {
        self.persist();
    }

    /// Serialize the capped logs to the durable store, swallowing failures.
    fn persist(&self) {
        let Some(store) = &self.state_store else {
            return;
        };
        let snapshot = {
            let logs = self.logs.read();
            let mut modes: Vec<ModeLogRecord> = ChatMode::ALL
                .into_iter()
                .filter_map(|mode| logs.get(&mode).map(|log| (mode, log)))
                .filter(|(_, log)| !log.is_empty())
                .map(|(mode, log)| ModeLogRecord {
                    mode,
                    messages: log.clone(),
                })
                .collect();
            modes.sort_by_key(|record| record.mode.as_str());
            HistorySnapshot {
                version: HISTORY_SCHEMA_VERSION,
                modes,
            }
        };
        if let Err(err) = store.save_history(&snapshot) {
            warn!("failed to persist history snapshot: {err}");
        }
    }

    /// Drop the oldest messages beyond the retention cap.
    fn truncate(log: &mut Vec<ChatMessage>, retention: usize) {
        if log.len() > retention {
            let excess = log.len() - retention;
            log.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ModeHistoryStore;
    use crate::state::{HistoryStateStore, JsonHistoryStore};
    use crate::types::{ChatMessage, MessageStatus};
    use lorebase_protocol::ChatMode;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn append_caps_the_log_at_retention() {
        let store = ModeHistoryStore::new(None, 100);
        for index in 0..105 {
            store.append(ChatMode::Ask, ChatMessage::user(format!("m{index}"), None));
        }
        let log = store.all(ChatMode::Ask);
        assert_eq!(log.len(), 100);
        assert_eq!(log[0].text(), Some("m5"));
        assert_eq!(log[99].text(), Some("m104"));
    }

    #[test]
    fn replace_is_a_no_op_for_missing_ids() {
        let store = ModeHistoryStore::new(None, 100);
        store.append(ChatMode::Draft, ChatMessage::user("hello", None));
        let replaced = store.replace(ChatMode::Draft, Uuid::new_v4(), |message| {
            message.mark_complete()
        });
        assert_eq!(replaced, false);
    }

    #[test]
    fn clear_leaves_other_modes_untouched() {
        let store = ModeHistoryStore::new(None, 100);
        store.append(ChatMode::Ask, ChatMessage::user("ask", None));
        store.append(ChatMode::Draft, ChatMessage::user("draft", None));

        store.clear(ChatMode::Ask);
        assert_eq!(store.all(ChatMode::Ask).len(), 0);
        assert_eq!(store.all(ChatMode::Draft).len(), 1);
    }

    #[test]
    fn delete_removes_exactly_one_message() {
        let store = ModeHistoryStore::new(None, 100);
        let keep = ChatMessage::user("keep", None);
        let drop = ChatMessage::user("drop", None);
        let drop_id = drop.id;
        store.append(ChatMode::Agent, keep);
        store.append(ChatMode::Agent, drop);

        assert_eq!(store.delete(ChatMode::Agent, drop_id), true);
        assert_eq!(store.delete(ChatMode::Agent, drop_id), false);
        let log = store.all(ChatMode::Agent);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text(), Some("keep"));
    }

    #[test]
    fn mutations_write_through_and_reload() {
        let temp = tempdir().expect("tempdir");
        let backend: Arc<dyn HistoryStateStore> =
            Arc::new(JsonHistoryStore::new(temp.path()).expect("backend"));

        let store = ModeHistoryStore::new(Some(backend.clone()), 100);
        let message = ChatMessage::user("persisted", None);
        let message_id = message.id;
        store.append(ChatMode::Ask, message);
        store.replace(ChatMode::Ask, message_id, |m| m.mark_complete());

        let reloaded = ModeHistoryStore::new(Some(backend), 100);
        reloaded.load();
        let log = reloaded.all(ChatMode::Ask);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text(), Some("persisted"));
        assert_eq!(log[0].status, MessageStatus::Complete);
    }

    #[test]
    fn persisted_snapshot_is_truncated_to_retention() {
        let temp = tempdir().expect("tempdir");
        let backend: Arc<dyn HistoryStateStore> =
            Arc::new(JsonHistoryStore::new(temp.path()).expect("backend"));

        let store = ModeHistoryStore::new(Some(backend.clone()), 3);
        for index in 0..6 {
            store.append(ChatMode::Summarize, ChatMessage::user(format!("m{index}"), None));
        }

        let snapshot = backend.load_history().expect("load").expect("snapshot");
        assert_eq!(snapshot.modes.len(), 1);
        assert_eq!(snapshot.modes[0].messages.len(), 3);
        assert_eq!(snapshot.modes[0].messages[0].text(), Some("m3"));
    }
}
