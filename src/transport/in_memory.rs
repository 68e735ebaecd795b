use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

use crate::transport::FramedTransport;

const DEFAULT_BUFFER: usize = 64 * 1024;

/// Framed transport over an in-process byte pipe. Frames go through the same
/// encoder and length prefix as TCP.
pub type InMemoryTransport = FramedTransport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

impl FramedTransport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>> {
    /// Two connected endpoints.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_capacity(DEFAULT_BUFFER)
    }

    pub fn pair_with_capacity(capacity: usize) -> (Self, Self) {
        let (a, b) = tokio::io::duplex(capacity);
        (Self::from_stream(a), Self::from_stream(b))
    }

    pub fn from_stream(stream: DuplexStream) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self::from_parts(reader, writer)
    }
}
