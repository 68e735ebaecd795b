//! Error types shared by the transport, the negotiator and the game state machines.
//!
//! [`SessionError`] is fatal: once returned, the session is over and the
//! connection should be torn down. [`CombatError`] and [`LobbyError`] are
//! local and recoverable: they reject user input and never cause a message
//! to be sent.

/// Fatal errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The peer speaks a different protocol version (or none at all).
    #[error("protocol mismatch: expected version {expected}, peer sent {got:?}")]
    ProtocolMismatch { expected: u32, got: Option<u32> },

    /// Unknown message type, missing field, or a message the current state
    /// does not allow.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The peer went away before a complete message was read or written.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Local socket failure other than the peer disconnecting.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub(crate) fn violation(msg: impl Into<String>) -> Self {
        SessionError::ProtocolViolation(msg.into())
    }

    /// Classify an I/O error from a stream read or write.
    pub(crate) fn from_stream(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected => SessionError::ConnectionClosed,
            _ => SessionError::Io(err),
        }
    }
}

/// Locally rejected combat input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("target ({row}, {col}) is outside the board")]
    InvalidTarget { row: usize, col: usize },
    #[error("already fired at ({row}, {col})")]
    AlreadyTargeted { row: usize, col: usize },
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("still waiting for the result of the previous shot")]
    AwaitingResult,
    #[error("both fleets must be placed before firing")]
    NotStarted,
    #[error("the game is over")]
    GameOver,
    #[error("fleet is incomplete")]
    FleetIncomplete,
    #[error("placement was already announced")]
    AlreadyPlaced,
    #[error("only the host decides who moves first")]
    NotHost,
}

/// Locally rejected lobby input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("game {0:?} is not in the lobby catalogue")]
    UnknownGame(String),
    #[error("the lobby has not been offered yet")]
    NotOffered,
    #[error("a game has already been chosen")]
    AlreadyChosen,
    #[error("only the host offers the lobby")]
    NotHost,
}
