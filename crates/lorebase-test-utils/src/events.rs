//! Recording event sink for assertions on emitted events.

use lorebase_protocol::{EventMsg, EventSink};
use parking_lot::Mutex;

/// Event sink that records every emitted event.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<EventMsg>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<EventMsg> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: EventMsg) {
        self.events.lock().push(event);
    }
}
