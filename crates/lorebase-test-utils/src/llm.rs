//! Mock streaming chat transports.

use async_trait::async_trait;
use futures_util::stream;
use lorebase_core::{ChatTransport, ChunkStream, TransportError};
use lorebase_protocol::ImageAttachment;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Transport replying with a fixed chunk sequence on every call.
#[derive(Debug, Clone)]
pub struct ChunkedChatTransport {
    chunks: Vec<String>,
}

impl ChunkedChatTransport {
    pub fn new(chunks: Vec<impl Into<String>>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ChatTransport for ChunkedChatTransport {
    async fn stream(
        &self,
        _query: &str,
        _system_instruction: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ChunkStream, TransportError> {
        let chunks: Vec<Result<String, TransportError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Transport that fails to open any stream.
#[derive(Debug, Clone)]
pub struct FailingChatTransport {
    message: String,
}

impl FailingChatTransport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for FailingChatTransport {
    async fn stream(
        &self,
        _query: &str,
        _system_instruction: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ChunkStream, TransportError> {
        Err(TransportError::Request(self.message.clone()))
    }
}

/// Transport yielding some chunks and then a stream error.
#[derive(Debug, Clone)]
pub struct BrokenChatTransport {
    chunks: Vec<String>,
    message: String,
}

impl BrokenChatTransport {
    pub fn new(chunks: Vec<impl Into<String>>, message: impl Into<String>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for BrokenChatTransport {
    async fn stream(
        &self,
        _query: &str,
        _system_instruction: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ChunkStream, TransportError> {
        let mut items: Vec<Result<String, TransportError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        items.push(Err(TransportError::Stream(self.message.clone())));
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Transport whose chunk timing is driven externally through channels.
///
/// Register one channel per expected `stream` call with `push_stream`; each
/// call consumes the next registered channel in order. Tests interleave
/// sends by feeding the senders and closing them when the stream should
/// end.
#[derive(Default)]
pub struct ChannelChatTransport {
    pending: Mutex<VecDeque<ChunkStream>>,
}

impl ChannelChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stream for the next `stream` call; returns its feeder.
    pub fn push_stream(&self) -> UnboundedSender<Result<String, TransportError>> {
        let (sender, receiver) = unbounded_channel();
        self.pending
            .lock()
            .push_back(Box::pin(UnboundedReceiverStream::new(receiver)));
        sender
    }
}

#[async_trait]
impl ChatTransport for ChannelChatTransport {
    async fn stream(
        &self,
        _query: &str,
        _system_instruction: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ChunkStream, TransportError> {
        self.pending
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::Request("no stream registered".to_string()))
    }
}
