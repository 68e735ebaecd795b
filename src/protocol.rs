//! Wire messages exchanged between the two peers.
//!
//! Every message is a JSON object whose `type` field names the variant. The
//! field spellings below are the wire contract; renaming them breaks
//! interoperability with existing peers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arena::{ArenaStatus, Direction, Scores, Winner};
use crate::error::SessionError;
use crate::hazard::WallKinds;

/// Version carried in `hello`. Peers with a different version are rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Grid coordinate as `(row, col)`, sent as `[row, col]`.
pub type Coord = (usize, usize);

/// Role of a peer, fixed for the lifetime of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Client,
}

impl Role {
    /// The role of the other peer.
    pub fn peer(self) -> Role {
        match self {
            Role::Host => Role::Client,
            Role::Client => Role::Host,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// Games offered in the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Battleship,
    Snake,
}

impl Game {
    /// Lobby catalogue, in the order the host advertises it.
    pub const ALL: [Game; 2] = [Game::Battleship, Game::Snake];

    pub fn name(self) -> &'static str {
        match self {
            Game::Battleship => "Battleship",
            Game::Snake => "Snake",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Handshake identity and protocol version. `proto` may be absent on the
    /// wire; that is reported as a version mismatch, not a malformed message.
    Hello {
        role: Role,
        #[serde(default)]
        proto: Option<u32>,
    },
    /// Host advertises the selectable games.
    Lobby { games: Vec<String> },
    /// A peer proposes a game.
    GameSelect { game: String },
    /// Host announces the resolved game.
    GameChosen { game: String },
    /// Host tells the client whether it fires first.
    Start {
        #[serde(rename = "youStart")]
        you_start: bool,
    },
    /// Sender finished placing its fleet.
    PlaceDone,
    /// Attacker names a target cell.
    Fire { row: usize, col: usize },
    /// Defender reports the outcome of a `fire`.
    #[serde(rename = "result")]
    FireResult {
        row: usize,
        col: usize,
        hit: bool,
        #[serde(default)]
        sunk: Option<String>,
        #[serde(rename = "gameOver")]
        game_over: bool,
    },
    /// Sender is leaving; the receiver wins by forfeit.
    Quit,
    /// Host seeds the client's arena mirror.
    SnakeInit {
        rows: usize,
        cols: usize,
        h_snake: Vec<Coord>,
        c_snake: Vec<Coord>,
        food: Coord,
    },
    /// Client asks for a direction change.
    SnakeDir { dir: Direction },
    /// Full authoritative arena snapshot.
    SnakeState {
        h_snake: Vec<Coord>,
        c_snake: Vec<Coord>,
        food: Coord,
        scores: Scores,
        status: ArenaStatus,
        winner: Option<Winner>,
        walls: WallKinds,
        /// Current tick interval in seconds.
        tick: f64,
    },
}

impl Message {
    pub fn hello(role: Role) -> Self {
        Message::Hello {
            role,
            proto: Some(PROTOCOL_VERSION),
        }
    }

    /// The wire `type` string.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Hello { .. } => "hello",
            Message::Lobby { .. } => "lobby",
            Message::GameSelect { .. } => "game_select",
            Message::GameChosen { .. } => "game_chosen",
            Message::Start { .. } => "start",
            Message::PlaceDone => "place_done",
            Message::Fire { .. } => "fire",
            Message::FireResult { .. } => "result",
            Message::Quit => "quit",
            Message::SnakeInit { .. } => "snake_init",
            Message::SnakeDir { .. } => "snake_dir",
            Message::SnakeState { .. } => "snake_state",
        }
    }

    /// Serialize to compact UTF-8 JSON.
    pub fn encode(&self) -> Result<Vec<u8>, SessionError> {
        serde_json::to_vec(self)
            .map_err(|e| SessionError::violation(format!("cannot encode {}: {}", self.kind(), e)))
    }

    /// Parse one frame payload. Unknown `type` values, missing fields and
    /// malformed JSON are all protocol violations.
    pub fn decode(bytes: &[u8]) -> Result<Self, SessionError> {
        serde_json::from_slice(bytes)
            .map_err(|e| SessionError::violation(format!("malformed message: {}", e)))
    }

    pub(crate) fn unexpected(&self, context: &str) -> SessionError {
        SessionError::violation(format!("unexpected {} while {}", self.kind(), context))
    }
}
