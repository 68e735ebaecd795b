//! A live peer connection: a background receive loop feeding an inbox, and a
//! writer owned by the foreground loop.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::protocol::{Message, Role};
use crate::transport::{MessageSink, MessageSource, Transport};

type Inbox = mpsc::UnboundedReceiver<Result<Message, SessionError>>;

pub struct Connection {
    role: Role,
    inbox: Inbox,
    writer: Box<dyn MessageSink>,
    reader_task: JoinHandle<()>,
    closed: bool,
}

impl Connection {
    /// Split `transport` and start the receive loop on the current runtime.
    pub fn spawn<T: Transport>(role: Role, transport: T) -> Self {
        let (source, sink) = transport.into_split();
        let (tx, inbox) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(receive_loop(source, tx));
        Self {
            role,
            inbox,
            writer: Box::new(sink),
            reader_task,
            closed: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::ConnectionClosed);
        }
        self.writer.send(msg).await
    }

    /// Take the next inbound message without waiting.
    ///
    /// `Ok(None)` means nothing has arrived yet. An error is terminal.
    pub fn poll(&mut self) -> Result<Option<Message>, SessionError> {
        match self.inbox.try_recv() {
            Ok(item) => item.map(Some),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SessionError::ConnectionClosed),
        }
    }

    /// Wait for the next inbound message.
    pub async fn recv(&mut self) -> Result<Message, SessionError> {
        match self.inbox.recv().await {
            Some(item) => item,
            None => Err(SessionError::ConnectionClosed),
        }
    }

    /// Stop the receive loop and shut the write side down.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.reader_task.abort();
        if let Err(e) = self.writer.close().await {
            log::debug!("closing {} connection: {}", self.role, e);
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn receive_loop<S: MessageSource>(
    mut source: S,
    tx: mpsc::UnboundedSender<Result<Message, SessionError>>,
) {
    loop {
        let item = source.recv().await;
        let failed = item.is_err();
        if let Err(e) = &item {
            log::debug!("receive loop stopping: {}", e);
        }
        if tx.send(item).is_err() || failed {
            break;
        }
    }
}
