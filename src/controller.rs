use rand::rngs::SmallRng;

use crate::arena::{ArenaView, Direction};
use crate::board::TargetBoard;
use crate::combat::{CombatEvent, CombatSession};
use crate::common::BoardError;
use crate::node::Outcome;
use crate::protocol::{Coord, Game, Role};

/// Something a [`crate::PeerNode`] reports to its controller while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// The lobby settled on `game`; `theirs` is what the opponent proposed.
    GameChosen { game: Game, mine: Game, theirs: Option<Game> },
    Combat(CombatEvent),
    /// A fresh arena snapshot was applied.
    ArenaUpdated(ArenaView),
    Finished(Outcome),
}

/// Decision-making side of a peer. The node calls into it; it never calls back
/// into the node or touches the connection.
pub trait Controller: Send {
    /// Pick a game from the lobby catalogue.
    fn choose_game(&mut self, offered: &[Game], rng: &mut SmallRng) -> Game;

    /// Place the whole fleet through `session`.
    fn place_fleet(
        &mut self,
        session: &mut CombatSession,
        rng: &mut SmallRng,
    ) -> Result<(), BoardError>;

    /// Next combat target, or `None` to leave the game.
    fn select_target(&mut self, known: &TargetBoard, rng: &mut SmallRng) -> Option<Coord>;

    /// Desired arena heading for agent `me`, or `None` to keep the current one.
    fn steer(&mut self, view: &ArenaView, me: Role) -> Option<Direction>;

    fn notify(&mut self, _event: &NodeEvent) {}
}
