//! Length-prefixed message transport.
//!
//! A frame is a 4-byte big-endian payload length followed by the payload, one
//! JSON-encoded [`Message`]. A transport splits into a [`MessageSource`] half
//! (owned by the receive loop) and a [`MessageSink`] half (owned by the
//! foreground loop), so neither side ever waits on the other.

use crate::error::SessionError;
use crate::protocol::Message;

pub mod frame;
pub mod in_memory;
pub mod tcp;

pub use frame::{FrameReader, FrameWriter};
pub use in_memory::InMemoryTransport;
pub use tcp::TcpTransport;

/// Receiving half of a connection.
#[async_trait::async_trait]
pub trait MessageSource: Send {
    /// Wait for the next complete message.
    async fn recv(&mut self) -> Result<Message, SessionError>;
}

/// Sending half of a connection.
#[async_trait::async_trait]
pub trait MessageSink: Send {
    /// Write one complete message.
    async fn send(&mut self, msg: &Message) -> Result<(), SessionError>;

    /// Shut the write direction down.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// A bidirectional message channel that can be split into independent halves.
pub trait Transport: MessageSource + MessageSink {
    type Source: MessageSource + 'static;
    type Sink: MessageSink + 'static;

    fn into_split(self) -> (Self::Source, Self::Sink);
}

/// A [`Transport`] over any async byte stream halves.
pub struct FramedTransport<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R, W> FramedTransport<R, W> {
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
        }
    }
}

#[async_trait::async_trait]
impl<R, W> MessageSource for FramedTransport<R, W>
where
    R: tokio::io::AsyncRead + Unpin + Send,
    W: Send,
{
    async fn recv(&mut self) -> Result<Message, SessionError> {
        self.reader.recv().await
    }
}

#[async_trait::async_trait]
impl<R, W> MessageSink for FramedTransport<R, W>
where
    R: Send,
    W: tokio::io::AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, msg: &Message) -> Result<(), SessionError> {
        self.writer.send(msg).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.writer.close().await
    }
}

impl<R, W> Transport for FramedTransport<R, W>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    type Source = FrameReader<R>;
    type Sink = FrameWriter<W>;

    fn into_split(self) -> (Self::Source, Self::Sink) {
        (self.reader, self.writer)
    }
}
