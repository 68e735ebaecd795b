pub mod ai;
pub mod arena;
mod board;
mod bot;
pub mod cli;
mod combat;
mod common;
mod config;
mod connection;
mod controller;
pub mod error;
pub mod hazard;
mod logging;
pub mod negotiator;
mod node;
pub mod protocol;
mod ship;
pub mod transport;

pub use arena::{
    Agent, ArenaHost, ArenaMirror, ArenaStatus, ArenaView, Direction, Scores, Winner,
};
pub use board::*;
pub use bot::BotController;
pub use cli::CliController;
pub use combat::*;
pub use common::*;
pub use config::*;
pub use connection::Connection;
pub use controller::{Controller, NodeEvent};
pub use error::{CombatError, LobbyError, SessionError};
pub use hazard::{Hazards, Side, WallKind, WallKinds, WallState, MAX_OPEN_SIDES};
pub use logging::init_logging;
pub use negotiator::{client_handshake, host_handshake, resolve_choice, Lobby, NegotiationPhase};
pub use node::{NodeReport, Outcome, PeerNode};
pub use protocol::{Coord, Game, Message, Role, PROTOCOL_VERSION};
pub use ship::*;
pub use transport::{InMemoryTransport, TcpTransport, Transport};
