//! Streaming turn flow for the non-agentic modes.

use super::ChatOrchestrator;
use super::instructions::DRAFT_INSTRUCTION;
use crate::session::SessionToken;
use crate::types::{ChatMessage, SourceRef};
use futures_util::StreamExt;
use log::{debug, warn};
use lorebase_protocol::{ChatMode, ChatStatus, EventPayload, ImageAttachment, MessageId};
use lorebase_vault::Note;

impl ChatOrchestrator {
    /// Drive one streaming turn: retrieval, grounding, chunk write-back.
    ///
    /// Every write-back re-checks the session token; a superseded turn stops
    /// consuming the stream and leaves history untouched from that point on.
    pub(crate) async fn run_stream_turn(
        &self,
        mode: ChatMode,
        text: String,
        image: Option<ImageAttachment>,
        token: SessionToken,
    ) {
        self.append_message(mode, ChatMessage::user(text.clone(), image.clone()));

        let sources = if mode.uses_retrieval() {
            self.set_status(mode, ChatStatus::Searching, token);
            match self.collect_sources(&text).await {
                Ok(notes) => notes,
                Err(err) => {
                    self.fail_turn(mode, token, format!("Searching your notes failed: {err}"));
                    return;
                }
            }
        } else {
            Vec::new()
        };
        if !self.guard(token) {
            return;
        }

        let instruction = match mode {
            ChatMode::Draft => DRAFT_INSTRUCTION.to_string(),
            _ => self.preamble.build(&text, &sources),
        };
        self.set_status(mode, ChatStatus::Replying, token);

        let mut stream = match self
            .chat_transport
            .stream(&text, &instruction, image.as_ref())
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                self.fail_turn(mode, token, format!("The model request failed: {err}"));
                return;
            }
        };

        let source_refs: Vec<SourceRef> = sources
            .iter()
            .map(|note: &Note| SourceRef {
                note_id: note.id,
                title: note.title.clone(),
            })
            .collect();

        let mut reply_id: Option<MessageId> = None;
        while let Some(chunk) = stream.next().await {
            if !self.guard(token) {
                debug!("abandoning superseded stream (mode={})", mode);
                return;
            }
            match chunk {
                Ok(delta) => {
                    let message_id = match reply_id {
                        Some(id) => id,
                        None => {
                            // The reply message exists from the first chunk on
                            // and grows in place afterwards.
                            let id = self.append_message(
                                mode,
                                ChatMessage::assistant_processing(source_refs.clone()),
                            );
                            reply_id = Some(id);
                            id
                        }
                    };
                    if delta.is_empty() {
                        continue;
                    }
                    self.history.replace(mode, message_id, |message| {
                        message.append_text(&delta);
                    });
                    self.emit(EventPayload::MessageDelta {
                        mode,
                        message_id,
                        delta,
                    });
                }
                Err(err) => {
                    // Preserve whatever partial text already streamed in and
                    // surface the failure as its own message.
                    if let Some(message_id) = reply_id {
                        self.complete_reply(mode, message_id);
                    }
                    self.fail_turn(mode, token, format!("The reply stream failed: {err}"));
                    return;
                }
            }
        }

        if !self.guard(token) {
            return;
        }
        match reply_id {
            Some(message_id) => self.complete_reply(mode, message_id),
            None => warn!("stream produced no content (mode={})", mode),
        }
        self.set_status(mode, ChatStatus::Idle, token);
    }

    /// Finalize the streamed reply message.
    fn complete_reply(&self, mode: ChatMode, message_id: MessageId) {
        self.history.replace(mode, message_id, |message| {
            message.mark_complete();
        });
        self.emit(EventPayload::MessageCompleted { mode, message_id });
    }
}
