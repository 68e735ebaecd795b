//! Combat (battleship) session for one peer.
//!
//! Each side is authoritative for its own [`Board`]: it resolves incoming
//! `fire` messages locally and answers with `result`. What it learns about the
//! opponent lives in a [`TargetBoard`] that only ever holds hit and miss
//! markers.

use rand::Rng;

use crate::board::{Board, TargetBoard};
use crate::common::{AttackOutcome, BoardError};
use crate::config::{ship_name_static, TurnPolicy, BOARD_SIZE};
use crate::error::{CombatError, SessionError};
use crate::protocol::{Coord, Message, Role};
use crate::ship::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatStatus {
    /// Fleets are being placed or the opening has not been announced yet.
    Placing,
    InProgress,
    Won,
    Lost,
    /// The opponent sent `quit`; counts as a win for us.
    OpponentQuit,
    /// We sent `quit`.
    Quit,
}

impl CombatStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, CombatStatus::Placing | CombatStatus::InProgress)
    }
}

/// Something the presentation layer may want to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    /// The opponent answered one of our shots.
    ShotResolved {
        row: usize,
        col: usize,
        hit: bool,
        sunk: Option<String>,
        game_over: bool,
    },
    /// The opponent fired at us and we resolved it.
    IncomingShot {
        row: usize,
        col: usize,
        outcome: AttackOutcome,
        game_over: bool,
    },
}

#[derive(Debug, Clone)]
pub struct CombatSession {
    role: Role,
    policy: TurnPolicy,
    board: Board,
    known: TargetBoard,
    /// Finishing placement requires the whole catalogue fleet.
    full_fleet: bool,
    placed_local: bool,
    placed_remote: bool,
    my_turn: Option<bool>,
    pending: Option<Coord>,
    status: CombatStatus,
    events: Vec<CombatEvent>,
}

impl CombatSession {
    pub fn new(role: Role) -> Self {
        Self::with_policy(role, TurnPolicy::default())
    }

    pub fn with_policy(role: Role, policy: TurnPolicy) -> Self {
        Self {
            role,
            policy,
            board: Board::new(),
            known: TargetBoard::new(),
            full_fleet: true,
            placed_local: false,
            placed_remote: false,
            my_turn: None,
            pending: None,
            status: CombatStatus::Placing,
            events: Vec::new(),
        }
    }

    /// Start from an already populated board, which may hold any subset of
    /// ships. Placement still has to be finished explicitly.
    pub fn with_board(role: Role, policy: TurnPolicy, board: Board) -> Self {
        Self {
            board,
            full_fleet: false,
            ..Self::with_policy(role, policy)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn policy(&self) -> TurnPolicy {
        self.policy
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn known(&self) -> &TargetBoard {
        &self.known
    }

    pub fn placement_finished(&self) -> bool {
        self.placed_local
    }

    pub fn peer_placement_finished(&self) -> bool {
        self.placed_remote
    }

    /// The shot waiting for a `result`, if any.
    pub fn pending(&self) -> Option<Coord> {
        self.pending
    }

    /// Whether we hold the turn. `false` until the opening is known.
    pub fn is_my_turn(&self) -> bool {
        self.my_turn == Some(true)
    }

    /// Whether [`Self::propose_target`] would currently be accepted for some
    /// unresolved cell.
    pub fn can_fire(&self) -> bool {
        self.status == CombatStatus::InProgress && self.is_my_turn() && self.pending.is_none()
    }

    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Host only: decide who fires first and produce the `start` message for
    /// the client.
    pub fn opening(&mut self, host_moves_first: bool) -> Result<Message, CombatError> {
        if self.role != Role::Host {
            return Err(CombatError::NotHost);
        }
        self.my_turn = Some(host_moves_first);
        self.refresh();
        Ok(Message::Start {
            you_start: !host_moves_first,
        })
    }

    pub fn place_ship(
        &mut self,
        ship_index: usize,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        if self.placed_local {
            return Err(BoardError::PlacementClosed);
        }
        self.board.place(ship_index, row, col, orientation)
    }

    /// Place every ship not yet on the board at random.
    pub fn place_fleet_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        if self.placed_local {
            return Err(BoardError::PlacementClosed);
        }
        self.board.place_remaining_randomly(rng)
    }

    /// Lock the board and produce `place_done`.
    pub fn finish_placement(&mut self) -> Result<Message, CombatError> {
        if self.placed_local {
            return Err(CombatError::AlreadyPlaced);
        }
        let ready = if self.full_fleet {
            self.board.fleet_complete()
        } else {
            !self.board.ships().is_empty()
        };
        if !ready {
            return Err(CombatError::FleetIncomplete);
        }
        self.placed_local = true;
        log::info!("{} fleet placed", self.role);
        self.refresh();
        Ok(Message::PlaceDone)
    }

    /// Aim at (`row`, `col`) on the opponent's board and produce `fire`.
    pub fn propose_target(&mut self, row: usize, col: usize) -> Result<Message, CombatError> {
        match self.status {
            CombatStatus::InProgress => {}
            CombatStatus::Placing => return Err(CombatError::NotStarted),
            _ => return Err(CombatError::GameOver),
        }
        if self.pending.is_some() {
            return Err(CombatError::AwaitingResult);
        }
        if !self.is_my_turn() {
            return Err(CombatError::NotYourTurn);
        }
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(CombatError::InvalidTarget { row, col });
        }
        if self.known.is_resolved(row, col) {
            return Err(CombatError::AlreadyTargeted { row, col });
        }
        self.pending = Some((row, col));
        Ok(Message::Fire { row, col })
    }

    /// Leave the game; produces `quit`.
    pub fn quit(&mut self) -> Message {
        if !self.status.is_over() {
            self.status = CombatStatus::Quit;
        }
        self.my_turn = Some(false);
        Message::Quit
    }

    fn refresh(&mut self) {
        if self.status == CombatStatus::Placing
            && self.placed_local
            && self.placed_remote
            && self.my_turn.is_some()
        {
            log::info!(
                "{} combat begins, {}",
                self.role,
                if self.is_my_turn() { "we fire first" } else { "opponent fires first" }
            );
            self.status = CombatStatus::InProgress;
        }
    }

    /// Apply a message from the opponent, returning the reply to send, if any.
    pub fn handle(&mut self, msg: Message) -> Result<Option<Message>, SessionError> {
        match msg {
            Message::Start { you_start } => {
                if self.role == Role::Host {
                    return Err(SessionError::violation("client sent start"));
                }
                if self.my_turn.is_some() {
                    return Err(SessionError::violation("duplicate start"));
                }
                self.my_turn = Some(you_start);
                self.refresh();
                Ok(None)
            }
            Message::PlaceDone => {
                if self.placed_remote {
                    return Err(SessionError::violation("duplicate place_done"));
                }
                self.placed_remote = true;
                self.refresh();
                Ok(None)
            }
            Message::Fire { row, col } => self.resolve_incoming(row, col).map(Some),
            Message::FireResult {
                row,
                col,
                hit,
                sunk,
                game_over,
            } => {
                self.apply_result(row, col, hit, sunk, game_over)?;
                Ok(None)
            }
            Message::Quit => {
                if !self.status.is_over() {
                    log::info!("opponent left the combat");
                    self.status = CombatStatus::OpponentQuit;
                }
                self.my_turn = Some(false);
                Ok(None)
            }
            other => Err(other.unexpected("in combat")),
        }
    }

    fn resolve_incoming(&mut self, row: usize, col: usize) -> Result<Message, SessionError> {
        if self.status != CombatStatus::InProgress {
            return Err(SessionError::violation("fire before combat started"));
        }
        if self.is_my_turn() {
            return Err(SessionError::violation("fire out of turn"));
        }
        let outcome = self
            .board
            .receive_attack(row, col)
            .map_err(|e| SessionError::violation(e.to_string()))?;
        if outcome.repeated {
            log::warn!("opponent fired at resolved cell ({}, {})", row, col);
        }
        let game_over = self.board.all_sunk();
        if game_over {
            log::info!("our fleet is sunk");
            self.status = CombatStatus::Lost;
            self.my_turn = Some(false);
        } else {
            self.my_turn = Some(!self.policy.attacker_keeps_turn(outcome.hit));
        }
        self.events.push(CombatEvent::IncomingShot {
            row,
            col,
            outcome,
            game_over,
        });
        Ok(Message::FireResult {
            row,
            col,
            hit: outcome.hit,
            sunk: outcome.sunk.map(str::to_string),
            game_over,
        })
    }

    fn apply_result(
        &mut self,
        row: usize,
        col: usize,
        hit: bool,
        sunk: Option<String>,
        game_over: bool,
    ) -> Result<(), SessionError> {
        if self.pending != Some((row, col)) {
            return Err(SessionError::violation(format!(
                "result for ({}, {}) does not match the pending shot {:?}",
                row, col, self.pending
            )));
        }
        self.pending = None;
        self.known
            .mark(row, col, hit)
            .map_err(|e| SessionError::violation(e.to_string()))?;
        if let Some(name) = &sunk {
            match ship_name_static(name) {
                Some(name) => log::info!("we sank their {}", name),
                None => log::warn!("opponent reports unknown ship {:?} sunk", name),
            }
            self.known.record_sunk(name);
        }
        if game_over {
            log::info!("opponent fleet is sunk");
            self.status = CombatStatus::Won;
            self.my_turn = Some(false);
        } else {
            self.my_turn = Some(self.policy.attacker_keeps_turn(hit));
        }
        self.events.push(CombatEvent::ShotResolved {
            row,
            col,
            hit,
            sunk,
            game_over,
        });
        Ok(())
    }
}
