use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::SessionError;
use crate::transport::FramedTransport;

/// Framed transport over a TCP stream.
pub type TcpTransport = FramedTransport<OwnedReadHalf, OwnedWriteHalf>;

impl FramedTransport<OwnedReadHalf, OwnedWriteHalf> {
    pub fn new(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("cannot disable Nagle on game socket: {}", e);
        }
        let (reader, writer) = stream.into_split();
        Self::from_parts(reader, writer)
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(addr).await?;
        log::info!("connected to {}", stream.peer_addr()?);
        Ok(Self::new(stream))
    }

    /// Accept exactly one peer from `listener`.
    pub async fn accept(listener: &TcpListener) -> Result<Self, SessionError> {
        let (stream, peer) = listener.accept().await?;
        log::info!("accepted peer {}", peer);
        Ok(Self::new(stream))
    }
}
