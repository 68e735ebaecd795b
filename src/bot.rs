use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use crate::ai;
use crate::arena::{ArenaView, Direction};
use crate::board::TargetBoard;
use crate::combat::CombatSession;
use crate::common::BoardError;
use crate::controller::Controller;
use crate::protocol::{Coord, Game, Role};

/// Automatic player.
#[derive(Debug, Clone, Default)]
pub struct BotController {
    preferred: Option<Game>,
}

impl BotController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always propose `game` in the lobby when it is offered.
    pub fn preferring(game: Game) -> Self {
        Self {
            preferred: Some(game),
        }
    }
}

impl Controller for BotController {
    fn choose_game(&mut self, offered: &[Game], rng: &mut SmallRng) -> Game {
        match self.preferred {
            Some(game) if offered.contains(&game) => game,
            _ => offered.choose(rng).copied().unwrap_or(Game::Battleship),
        }
    }

    fn place_fleet(
        &mut self,
        session: &mut CombatSession,
        rng: &mut SmallRng,
    ) -> Result<(), BoardError> {
        session.place_fleet_randomly(rng)
    }

    fn select_target(&mut self, known: &TargetBoard, rng: &mut SmallRng) -> Option<Coord> {
        ai::calc_pdf_and_guess(known, rng)
    }

    fn steer(&mut self, view: &ArenaView, me: Role) -> Option<Direction> {
        ai::steer(view, me)
    }
}
