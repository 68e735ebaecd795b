use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::SessionError;
use crate::protocol::Message;
use crate::transport::{MessageSink, MessageSource};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// Reads length-prefixed frames from a byte stream.
pub struct FrameReader<R> {
    inner: R,
}

impl<R> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Read exactly one frame payload.
    ///
    /// End of stream anywhere, including cleanly between frames, is
    /// [`SessionError::ConnectionClosed`].
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, SessionError> {
        let mut header = [0u8; HEADER_LEN];
        self.inner
            .read_exact(&mut header)
            .await
            .map_err(SessionError::from_stream)?;
        let len = u32::from_be_bytes(header) as usize;

        let mut payload = vec![0u8; len];
        self.inner
            .read_exact(&mut payload)
            .await
            .map_err(SessionError::from_stream)?;
        Ok(payload)
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> MessageSource for FrameReader<R> {
    async fn recv(&mut self) -> Result<Message, SessionError> {
        let payload = self.read_frame().await?;
        let msg = Message::decode(&payload)?;
        log::debug!("recv {}", msg.kind());
        Ok(msg)
    }
}

/// Writes length-prefixed frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Write header and payload as one buffer so a frame is never interleaved
    /// with another write.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), SessionError> {
        let len = u32::try_from(payload.len())
            .map_err(|_| SessionError::violation("frame larger than 4 GiB"))?;
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(payload);
        self.inner
            .write_all(&buf)
            .await
            .map_err(SessionError::from_stream)?;
        self.inner.flush().await.map_err(SessionError::from_stream)
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> MessageSink for FrameWriter<W> {
    async fn send(&mut self, msg: &Message) -> Result<(), SessionError> {
        let payload = msg.encode()?;
        log::debug!("send {}", msg.kind());
        self.write_frame(&payload).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.inner.shutdown().await.map_err(SessionError::from_stream)
    }
}
