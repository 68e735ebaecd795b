//! Session setup: the `hello` handshake and the game lobby.
//!
//! The host speaks first in both stages. After the handshake it advertises the
//! catalogue, both peers propose a game, and the host alone announces the
//! resolved choice.

use rand::Rng;

use crate::connection::Connection;
use crate::error::{LobbyError, SessionError};
use crate::protocol::{Game, Message, Role, PROTOCOL_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    Connecting,
    HandshakeSent,
    HandshakeConfirmed,
    LobbyOffered,
    GameChosen(Game),
}

/// Validate a peer's `hello`.
fn check_hello(msg: Message, expected_role: Role) -> Result<(), SessionError> {
    match msg {
        Message::Hello { role, proto } => {
            if proto != Some(PROTOCOL_VERSION) {
                log::warn!("peer speaks protocol {:?}, we speak {}", proto, PROTOCOL_VERSION);
                return Err(SessionError::ProtocolMismatch {
                    expected: PROTOCOL_VERSION,
                    got: proto,
                });
            }
            if role != expected_role {
                return Err(SessionError::violation(format!(
                    "peer claims role {}, expected {}",
                    role, expected_role
                )));
            }
            Ok(())
        }
        other => Err(other.unexpected("waiting for hello")),
    }
}

/// Host side: send `hello`, then wait for the client's.
pub async fn host_handshake(conn: &mut Connection) -> Result<NegotiationPhase, SessionError> {
    conn.send(&Message::hello(Role::Host)).await?;
    log::debug!("handshake sent");
    check_hello(conn.recv().await?, Role::Client)?;
    log::info!("handshake confirmed with client");
    Ok(NegotiationPhase::HandshakeConfirmed)
}

/// Client side: wait for the host's `hello`, validate it and reply.
pub async fn client_handshake(conn: &mut Connection) -> Result<NegotiationPhase, SessionError> {
    check_hello(conn.recv().await?, Role::Host)?;
    conn.send(&Message::hello(Role::Client)).await?;
    log::info!("handshake confirmed with host");
    Ok(NegotiationPhase::HandshakeConfirmed)
}

/// Pick the game to play from the two proposals. Different proposals are
/// settled by a fair coin.
pub fn resolve_choice<R: Rng + ?Sized>(mine: Game, theirs: Game, rng: &mut R) -> Game {
    if mine == theirs || rng.random() {
        mine
    } else {
        theirs
    }
}

/// Lobby state machine for one peer, entered after the handshake.
#[derive(Debug, Clone)]
pub struct Lobby {
    role: Role,
    phase: NegotiationPhase,
    offered: Vec<Game>,
    mine: Option<Game>,
    theirs: Option<Game>,
}

impl Lobby {
    pub fn host() -> Self {
        Self::new(Role::Host)
    }

    pub fn client() -> Self {
        Self::new(Role::Client)
    }

    fn new(role: Role) -> Self {
        Self {
            role,
            phase: NegotiationPhase::HandshakeConfirmed,
            offered: Vec::new(),
            mine: None,
            theirs: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn offered(&self) -> &[Game] {
        &self.offered
    }

    pub fn mine(&self) -> Option<Game> {
        self.mine
    }

    pub fn theirs(&self) -> Option<Game> {
        self.theirs
    }

    pub fn chosen(&self) -> Option<Game> {
        match self.phase {
            NegotiationPhase::GameChosen(game) => Some(game),
            _ => None,
        }
    }

    /// Host: advertise the catalogue.
    pub fn offer(&mut self) -> Result<Message, LobbyError> {
        if self.role != Role::Host {
            return Err(LobbyError::NotHost);
        }
        if self.chosen().is_some() {
            return Err(LobbyError::AlreadyChosen);
        }
        self.offered = Game::ALL.to_vec();
        self.phase = NegotiationPhase::LobbyOffered;
        Ok(Message::Lobby {
            games: self.offered.iter().map(|g| g.name().to_string()).collect(),
        })
    }

    /// Propose `game`. May be repeated until the host announces the choice.
    pub fn select(&mut self, game: Game) -> Result<Message, LobbyError> {
        match self.phase {
            NegotiationPhase::LobbyOffered => {}
            NegotiationPhase::GameChosen(_) => return Err(LobbyError::AlreadyChosen),
            _ => return Err(LobbyError::NotOffered),
        }
        if !self.offered.contains(&game) {
            return Err(LobbyError::UnknownGame(game.name().to_string()));
        }
        self.mine = Some(game);
        Ok(Message::GameSelect {
            game: game.name().to_string(),
        })
    }

    fn parse_offered(&self, name: &str) -> Result<Game, SessionError> {
        name.parse::<Game>()
            .ok()
            .filter(|g| self.offered.contains(g))
            .ok_or_else(|| SessionError::violation(format!("game {:?} was not offered", name)))
    }

    /// Apply a lobby message from the peer. Returns the game once the host's
    /// announcement has been applied (client side).
    pub fn handle(&mut self, msg: Message) -> Result<Option<Game>, SessionError> {
        match (self.role, msg) {
            (Role::Client, Message::Lobby { games }) => {
                if self.phase != NegotiationPhase::HandshakeConfirmed {
                    return Err(SessionError::violation("lobby offered twice"));
                }
                self.offered = games
                    .iter()
                    .filter_map(|name| match name.parse::<Game>() {
                        Ok(game) => Some(game),
                        Err(name) => {
                            log::warn!("ignoring unknown game {:?} in lobby", name);
                            None
                        }
                    })
                    .collect();
                if self.offered.is_empty() {
                    return Err(SessionError::violation("lobby offers no known game"));
                }
                self.phase = NegotiationPhase::LobbyOffered;
                Ok(None)
            }
            (_, Message::GameSelect { game }) => {
                if self.phase != NegotiationPhase::LobbyOffered {
                    return Err(SessionError::violation("game_select outside the lobby"));
                }
                let game = self.parse_offered(&game)?;
                log::info!("{} proposes {}", self.role.peer(), game);
                self.theirs = Some(game);
                Ok(None)
            }
            (Role::Client, Message::GameChosen { game }) => {
                if self.phase != NegotiationPhase::LobbyOffered {
                    return Err(SessionError::violation("game_chosen outside the lobby"));
                }
                let game = self.parse_offered(&game)?;
                log::info!("host chose {}", game);
                self.phase = NegotiationPhase::GameChosen(game);
                Ok(Some(game))
            }
            (_, other) => Err(other.unexpected("in the lobby")),
        }
    }

    /// Host: once both proposals are in, settle the game and produce the
    /// `game_chosen` announcement.
    pub fn resolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Message> {
        if self.role != Role::Host || self.phase != NegotiationPhase::LobbyOffered {
            return None;
        }
        let game = resolve_choice(self.mine?, self.theirs?, rng);
        log::info!("game chosen: {}", game);
        self.phase = NegotiationPhase::GameChosen(game);
        Some(Message::GameChosen {
            game: game.name().to_string(),
        })
    }
}
