//! One peer of a session, from handshake to game over.

use rand::rngs::SmallRng;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::arena::{ArenaHost, ArenaMirror, ArenaStatus, Direction, Scores, Winner};
use crate::combat::{CombatSession, CombatStatus};
use crate::config::NodeConfig;
use crate::connection::Connection;
use crate::controller::{Controller, NodeEvent};
use crate::error::SessionError;
use crate::negotiator::{client_handshake, host_handshake, Lobby};
use crate::protocol::{Game, Message, Role};
use crate::transport::Transport;

/// How a session ended from this peer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Draw,
    /// The opponent sent `quit`.
    OpponentQuit,
    /// We sent `quit`.
    Quit,
}

impl Outcome {
    fn from_winner(winner: Option<Winner>, me: Role) -> Self {
        match winner {
            Some(Winner::Draw) | None => Outcome::Draw,
            Some(w) if w == Winner::from(me) => Outcome::Won,
            Some(_) => Outcome::Lost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub role: Role,
    /// `None` if the session ended in the lobby.
    pub game: Option<Game>,
    pub outcome: Outcome,
    /// Shots we fired in combat.
    pub shots: Option<usize>,
    /// Final arena scores.
    pub scores: Option<Scores>,
}

pub struct PeerNode<C> {
    role: Role,
    conn: Connection,
    controller: C,
    config: NodeConfig,
}

impl<C: Controller> PeerNode<C> {
    /// Host side of `transport`. Must be called inside a tokio runtime.
    pub fn host<T: Transport>(transport: T, controller: C, config: NodeConfig) -> Self {
        Self::new(Role::Host, transport, controller, config)
    }

    /// Client side of `transport`. Must be called inside a tokio runtime.
    pub fn join<T: Transport>(transport: T, controller: C, config: NodeConfig) -> Self {
        Self::new(Role::Client, transport, controller, config)
    }

    fn new<T: Transport>(role: Role, transport: T, controller: C, config: NodeConfig) -> Self {
        Self {
            role,
            conn: Connection::spawn(role, transport),
            controller,
            config,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Play one session and tear the connection down.
    pub async fn run(mut self, rng: &mut SmallRng) -> anyhow::Result<NodeReport> {
        let result = self.play(rng).await;
        self.conn.close().await;
        let report = result?;
        log::info!("{} finished: {:?}", self.role, report.outcome);
        self.controller.notify(&NodeEvent::Finished(report.outcome));
        Ok(report)
    }

    async fn play(&mut self, rng: &mut SmallRng) -> anyhow::Result<NodeReport> {
        let mut frame = tokio::time::interval(self.config.frame_interval);
        frame.set_missed_tick_behavior(MissedTickBehavior::Delay);

        match self.role {
            Role::Host => host_handshake(&mut self.conn).await?,
            Role::Client => client_handshake(&mut self.conn).await?,
        };

        let Some(game) = self.negotiate(&mut frame, rng).await? else {
            return Ok(self.report(None, Outcome::OpponentQuit));
        };

        match game {
            Game::Battleship => {
                let (outcome, shots) = self.play_combat(&mut frame, rng).await?;
                Ok(NodeReport {
                    shots: Some(shots),
                    ..self.report(Some(game), outcome)
                })
            }
            Game::Snake => {
                let (outcome, scores) = match self.role {
                    Role::Host => self.host_arena(&mut frame, rng).await?,
                    Role::Client => self.join_arena(&mut frame).await?,
                };
                Ok(NodeReport {
                    scores: Some(scores),
                    ..self.report(Some(game), outcome)
                })
            }
        }
    }

    fn report(&self, game: Option<Game>, outcome: Outcome) -> NodeReport {
        NodeReport {
            role: self.role,
            game,
            outcome,
            shots: None,
            scores: None,
        }
    }

    /// Wait for the next inbound message without blocking on the socket.
    async fn next_message(&mut self, frame: &mut Interval) -> Result<Message, SessionError> {
        loop {
            if let Some(msg) = self.conn.poll()? {
                return Ok(msg);
            }
            frame.tick().await;
        }
    }

    /// Run the lobby. `None` if the opponent left before a game was chosen.
    async fn negotiate(
        &mut self,
        frame: &mut Interval,
        rng: &mut SmallRng,
    ) -> anyhow::Result<Option<Game>> {
        let mut lobby = match self.role {
            Role::Host => {
                let mut lobby = Lobby::host();
                let offer = lobby.offer()?;
                self.conn.send(&offer).await?;
                lobby
            }
            Role::Client => {
                let mut lobby = Lobby::client();
                while lobby.offered().is_empty() {
                    match self.next_message(frame).await? {
                        Message::Quit => return Ok(None),
                        msg => {
                            lobby.handle(msg)?;
                        }
                    }
                }
                lobby
            }
        };

        let mine = self.controller.choose_game(lobby.offered(), rng);
        let select = lobby.select(mine)?;
        self.conn.send(&select).await?;

        let game = loop {
            if let Some(chosen) = lobby.resolve(rng) {
                self.conn.send(&chosen).await?;
                if let Some(game) = lobby.chosen() {
                    break game;
                }
            }
            match self.next_message(frame).await? {
                Message::Quit => return Ok(None),
                msg => {
                    if let Some(game) = lobby.handle(msg)? {
                        break game;
                    }
                }
            }
        };

        self.controller.notify(&NodeEvent::GameChosen {
            game,
            mine,
            theirs: lobby.theirs(),
        });
        Ok(Some(game))
    }

    async fn play_combat(
        &mut self,
        frame: &mut Interval,
        rng: &mut SmallRng,
    ) -> anyhow::Result<(Outcome, usize)> {
        let mut session = CombatSession::with_policy(self.role, self.config.turn_policy);
        if self.role == Role::Host {
            let start = session.opening(self.config.host_moves_first)?;
            self.conn.send(&start).await?;
        }

        if let Err(e) = self.controller.place_fleet(&mut session, rng) {
            log::warn!("fleet placement failed ({}), placing the rest at random", e);
            session.place_fleet_randomly(rng)?;
        }
        let done = session.finish_placement()?;
        self.conn.send(&done).await?;

        loop {
            while !session.is_over() {
                let Some(msg) = self.conn.poll()? else {
                    break;
                };
                if let Some(reply) = session.handle(msg)? {
                    self.conn.send(&reply).await?;
                }
                for event in session.take_events() {
                    self.controller.notify(&NodeEvent::Combat(event));
                }
            }
            if session.is_over() {
                break;
            }

            if session.can_fire() {
                match self.controller.select_target(session.known(), rng) {
                    None => {
                        let quit = session.quit();
                        self.conn.send(&quit).await?;
                        break;
                    }
                    Some((row, col)) => match session.propose_target(row, col) {
                        Ok(fire) => self.conn.send(&fire).await?,
                        Err(e) => log::warn!("target rejected: {}", e),
                    },
                }
            }
            frame.tick().await;
        }

        let outcome = match session.status() {
            CombatStatus::Won => Outcome::Won,
            CombatStatus::Lost => Outcome::Lost,
            CombatStatus::Quit => Outcome::Quit,
            CombatStatus::OpponentQuit | CombatStatus::Placing | CombatStatus::InProgress => {
                Outcome::OpponentQuit
            }
        };
        Ok((outcome, session.known().shots()))
    }

    async fn host_arena(
        &mut self,
        frame: &mut Interval,
        rng: &mut SmallRng,
    ) -> anyhow::Result<(Outcome, Scores)> {
        let clock = Instant::now();
        let mut arena = ArenaHost::new(self.config.arena.clone(), clock.elapsed(), rng);
        self.conn.send(&arena.init_message()).await?;

        loop {
            while arena.status() == ArenaStatus::Ongoing {
                match self.conn.poll()? {
                    Some(Message::Quit) => {
                        arena.handle(Message::Quit)?;
                        return Ok((Outcome::OpponentQuit, arena.scores()));
                    }
                    Some(msg) => arena.handle(msg)?,
                    None => break,
                }
            }

            if let Some(dir) = self.controller.steer(&arena.view(), Role::Host) {
                arena.propose_direction(Role::Host, dir);
            }
            if let Some(snapshot) = arena.poll(clock.elapsed(), rng) {
                self.conn.send(&snapshot).await?;
                self.controller.notify(&NodeEvent::ArenaUpdated(arena.view()));
            }
            if arena.status() == ArenaStatus::Over {
                return Ok((Outcome::from_winner(arena.winner(), Role::Host), arena.scores()));
            }
            frame.tick().await;
        }
    }

    async fn join_arena(&mut self, frame: &mut Interval) -> anyhow::Result<(Outcome, Scores)> {
        let mut mirror = ArenaMirror::new();
        let mut requested: Option<Direction> = None;

        loop {
            while !mirror.is_over() {
                match self.conn.poll()? {
                    Some(Message::Quit) => {
                        mirror.handle(Message::Quit)?;
                        let scores = mirror.view().map(|v| v.scores).unwrap_or_default();
                        return Ok((Outcome::OpponentQuit, scores));
                    }
                    Some(msg) => {
                        mirror.handle(msg)?;
                        if let Some(view) = mirror.view() {
                            self.controller.notify(&NodeEvent::ArenaUpdated(view.clone()));
                        }
                    }
                    None => break,
                }
            }

            if let Some(view) = mirror.view() {
                if view.status == ArenaStatus::Over {
                    return Ok((Outcome::from_winner(view.winner, Role::Client), view.scores));
                }
                let wanted = self.controller.steer(view, Role::Client);
                if wanted.is_some() && wanted != requested {
                    if let Some(dir) = wanted {
                        // The host may already have hung up after its final
                        // snapshot; the inbox still decides the outcome.
                        match self.conn.send(&mirror.propose_direction(dir)).await {
                            Err(SessionError::ConnectionClosed) => {
                                log::debug!("host gone before snake_dir was sent");
                            }
                            other => other?,
                        }
                    }
                    requested = wanted;
                }
            }
            frame.tick().await;
        }
    }
}
