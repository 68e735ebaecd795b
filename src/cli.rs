//! Terminal player: reads placements and targets from a line-based input and
//! prints both boards.
//!
//! Coordinates are written `A5`: the letter names the row, the number the
//! column, both counted from the top left corner.

use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use rand::rngs::SmallRng;

use crate::ai;
use crate::arena::{ArenaView, Direction};
use crate::board::{Board, TargetBoard};
use crate::combat::{CombatEvent, CombatSession};
use crate::common::{BoardError, Cell};
use crate::config::{BOARD_SIZE, SHIPS};
use crate::controller::{Controller, NodeEvent};
use crate::node::Outcome;
use crate::protocol::{Coord, Game, Role};
use crate::ship::Orientation;

pub fn format_coord(row: usize, col: usize) -> String {
    format!("{}{}", (b'A' + row as u8) as char, col + 1)
}

/// Parse `A5`-style input into `(row, col)`.
pub fn parse_coord(input: &str) -> Option<Coord> {
    let t = input.trim();
    let mut chars = t.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let row = (letter as u8 - b'A') as usize;
    let col: usize = chars.as_str().parse().ok()?;
    if row >= BOARD_SIZE || col == 0 || col > BOARD_SIZE {
        return None;
    }
    Some((row, col - 1))
}

fn header(out: &mut String) {
    out.push_str("  ");
    for c in 0..BOARD_SIZE {
        let _ = write!(out, " {:>2}", c + 1);
    }
    out.push('\n');
}

fn render_grid(out: &mut String, cell: impl Fn(usize, usize) -> char) {
    header(out);
    for r in 0..BOARD_SIZE {
        out.push((b'A' + r as u8) as char);
        out.push(' ');
        for c in 0..BOARD_SIZE {
            let _ = write!(out, "  {}", cell(r, c));
        }
        out.push('\n');
    }
}

/// Text rendering of our own board; `reveal` shows intact ship cells.
pub fn render_board(board: &Board, reveal: bool) -> String {
    let mut out = String::new();
    render_grid(&mut out, |r, c| match board.grid()[r][c] {
        Cell::Empty => '.',
        Cell::Ship if reveal => 'S',
        Cell::Ship => '.',
        Cell::Miss => 'o',
        Cell::Hit => 'X',
    });
    out
}

pub fn render_target(known: &TargetBoard) -> String {
    let mut out = String::new();
    render_grid(&mut out, |r, c| match known.grid()[r][c] {
        Cell::Miss => 'o',
        Cell::Hit => 'X',
        _ => '.',
    });
    out
}

pub struct CliController<R, W> {
    input: R,
    output: W,
}

impl CliController<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> CliController<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `text` and read one trimmed line. `None` on end of input.
    fn prompt(&mut self, text: &str) -> Option<String> {
        if write!(self.output, "{} ", text)
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            log::debug!("terminal write failed: {}", e);
        }
    }
}

impl<R, W> Controller for CliController<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn choose_game(&mut self, offered: &[Game], _rng: &mut SmallRng) -> Game {
        let fallback = offered.first().copied().unwrap_or(Game::Battleship);
        let menu: Vec<String> = offered
            .iter()
            .enumerate()
            .map(|(i, g)| format!("{}) {}", i + 1, g))
            .collect();
        self.say(&format!("Games: {}", menu.join("  ")));
        loop {
            let Some(line) = self.prompt("Choose a game:") else {
                return fallback;
            };
            let by_index = line
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| offered.get(i).copied());
            let by_name = line.parse::<Game>().ok().filter(|g| offered.contains(g));
            match by_index.or(by_name) {
                Some(game) => return game,
                None => self.say("Unknown game."),
            }
        }
    }

    fn place_fleet(
        &mut self,
        session: &mut CombatSession,
        rng: &mut SmallRng,
    ) -> Result<(), BoardError> {
        self.say("Place your ships, e.g. `A1 H` or `C4 V`. Press enter for random placement.");
        while let Some(index) = session.board().next_unplaced() {
            let def = SHIPS[index];
            let board = render_board(session.board(), true);
            self.say(&board);
            let Some(line) = self.prompt(&format!("Place {} (length {}):", def.name(), def.size()))
            else {
                return session.place_fleet_randomly(rng);
            };
            if line.is_empty() {
                let (r, c, o) = session.board().random_placement(rng, index)?;
                session.place_ship(index, r, c, o)?;
                continue;
            }
            let mut parts = line.split_whitespace();
            let coord = parts.next().and_then(parse_coord);
            let orientation = match parts.next().map(|p| p.to_ascii_uppercase()) {
                None => Some(Orientation::Horizontal),
                Some(p) if p.starts_with('H') => Some(Orientation::Horizontal),
                Some(p) if p.starts_with('V') => Some(Orientation::Vertical),
                Some(_) => None,
            };
            match (coord, orientation) {
                (Some((r, c)), Some(o)) => {
                    if let Err(e) = session.place_ship(index, r, c, o) {
                        log::warn!("placement rejected: {}", e);
                        self.say(&format!("Cannot place there: {}", e));
                    }
                }
                _ => self.say("Invalid input."),
            }
        }
        Ok(())
    }

    fn select_target(&mut self, known: &TargetBoard, rng: &mut SmallRng) -> Option<Coord> {
        let suggestion = ai::calc_pdf_and_guess(known, rng);
        let target = render_target(known);
        self.say(&format!("Opponent board:\n{}", target));
        let hint = suggestion
            .map(|(r, c)| format!(" [{}]", format_coord(r, c)))
            .unwrap_or_default();
        loop {
            let line = self.prompt(&format!("Fire at{} (q to quit):", hint))?;
            if line.eq_ignore_ascii_case("q") {
                return None;
            }
            if line.is_empty() {
                if suggestion.is_some() {
                    return suggestion;
                }
                continue;
            }
            match parse_coord(&line) {
                Some((r, c)) if known.is_resolved(r, c) => self.say("Already targeted that cell."),
                Some(coord) => return Some(coord),
                None => self.say("Invalid coordinate."),
            }
        }
    }

    fn steer(&mut self, view: &ArenaView, me: Role) -> Option<Direction> {
        ai::steer(view, me)
    }

    fn notify(&mut self, event: &NodeEvent) {
        let text = match event {
            NodeEvent::GameChosen { game, mine, theirs } => match theirs {
                Some(theirs) if theirs != mine => {
                    format!("You chose {}, opponent chose {}. Playing {}.", mine, theirs, game)
                }
                _ => format!("Playing {}.", game),
            },
            NodeEvent::Combat(CombatEvent::ShotResolved {
                row, col, hit, sunk, ..
            }) => {
                let mut text = format!(
                    "You fired at {}: {}",
                    format_coord(*row, *col),
                    if *hit { "hit" } else { "miss" }
                );
                if let Some(name) = sunk {
                    let _ = write!(text, ", sunk their {}", name);
                }
                text
            }
            NodeEvent::Combat(CombatEvent::IncomingShot {
                row, col, outcome, ..
            }) => {
                let mut text = format!(
                    "Opponent fired at {}: {}",
                    format_coord(*row, *col),
                    if outcome.hit { "hit" } else { "miss" }
                );
                if let Some(name) = outcome.sunk {
                    let _ = write!(text, ", your {} sank", name);
                }
                text
            }
            NodeEvent::ArenaUpdated(_) => return,
            NodeEvent::Finished(outcome) => match outcome {
                Outcome::Won => "You win!".to_string(),
                Outcome::Lost => "You lose.".to_string(),
                Outcome::Draw => "Draw.".to_string(),
                Outcome::OpponentQuit => "Opponent left the game.".to_string(),
                Outcome::Quit => "You left the game.".to_string(),
            },
        };
        self.say(&text);
    }
}
