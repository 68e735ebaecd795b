use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use versus::transport::MessageSource;
use versus::{Message, SessionError, TcpTransport};

/// Accept one connection, write `bytes` raw and hang up.
async fn serve_raw(bytes: Vec<u8>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(&bytes).await.unwrap();
        stream.shutdown().await.unwrap();
    });
    addr
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

async fn first_message(bytes: Vec<u8>) -> Result<Message, SessionError> {
    let addr = serve_raw(bytes).await;
    let mut transport = TcpTransport::new(TcpStream::connect(addr).await.unwrap());
    transport.recv().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_zero_length_frame_is_violation() {
    let result = first_message(frame(b"")).await;
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_json_is_violation() {
    let result = first_message(frame(b"{\"type\":")).await;
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_type_is_violation() {
    let result = first_message(frame(br#"{"type":"warp","to":"mars"}"#)).await;
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_truncated_payload_is_closed() {
    let mut bytes = frame(br#"{"type":"quit"}"#);
    bytes.truncate(bytes.len() - 3);
    let result = first_message(bytes).await;
    assert!(matches!(result, Err(SessionError::ConnectionClosed)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_truncated_header_is_closed() {
    let result = first_message(vec![0, 0]).await;
    assert!(matches!(result, Err(SessionError::ConnectionClosed)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_split_writes_reassemble() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let bytes = frame(br#"{"type":"fire","row":4,"col":5}"#);
        for chunk in bytes.chunks(3) {
            stream.write_all(chunk).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
    });
    let mut transport = TcpTransport::new(TcpStream::connect(addr).await.unwrap());
    assert_eq!(transport.recv().await.unwrap(), Message::Fire { row: 4, col: 5 });
}
