//! Combat boards: the defender's own fleet and the attacker's shadow of the opponent.

use core::fmt;
use rand::Rng;

use crate::common::{AttackOutcome, BoardError, Cell};
use crate::config::{BOARD_SIZE, NUM_SHIPS, SHIPS};
use crate::ship::{Orientation, Ship, ShipType};

type Grid = [[Cell; BOARD_SIZE]; BOARD_SIZE];

fn check_bounds(row: usize, col: usize) -> Result<(), BoardError> {
    if row < BOARD_SIZE && col < BOARD_SIZE {
        Ok(())
    } else {
        Err(BoardError::CellOutOfBounds { row, col })
    }
}

/// A player's own board: ship placements plus every attack landed on it.
///
/// Only the owner mutates it. Cells move from `Ship` to `Hit` or from `Empty`
/// to `Miss` exactly once; attacking a resolved cell changes nothing.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    ships: Vec<Ship>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Board {
            grid: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            ships: Vec::with_capacity(NUM_SHIPS),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Place a ship of `ship_type` with its bow at (`row`, `col`).
    ///
    /// Fails without touching the board when any cell is off the board or
    /// already holds a ship.
    pub fn place_ship(
        &mut self,
        ship_type: ShipType,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let ship = Ship::new(ship_type, orientation, row, col)?;
        if ship
            .cells()
            .iter()
            .any(|&(r, c)| self.grid[r][c] != Cell::Empty)
        {
            return Err(BoardError::ShipOverlaps);
        }
        for &(r, c) in ship.cells() {
            self.grid[r][c] = Cell::Ship;
        }
        self.ships.push(ship);
        Ok(())
    }

    /// Place the catalogue ship `ship_index` (see [`SHIPS`]).
    pub fn place(
        &mut self,
        ship_index: usize,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let def = *SHIPS.get(ship_index).ok_or(BoardError::InvalidIndex)?;
        if self.is_placed(ship_index) {
            return Err(BoardError::ShipAlreadyPlaced);
        }
        self.place_ship(def, row, col, orientation)
    }

    /// Whether catalogue ship `ship_index` is on the board.
    pub fn is_placed(&self, ship_index: usize) -> bool {
        SHIPS
            .get(ship_index)
            .is_some_and(|def| self.ships.iter().any(|s| s.ship_type() == *def))
    }

    /// First catalogue ship that still has to be placed.
    pub fn next_unplaced(&self) -> Option<usize> {
        (0..NUM_SHIPS).find(|&i| !self.is_placed(i))
    }

    /// Every catalogue ship is on the board.
    pub fn fleet_complete(&self) -> bool {
        self.next_unplaced().is_none()
    }

    /// Returns a random non-overlapping (row, col, Orientation) for `ship_index`.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ship_index: usize,
    ) -> Result<(usize, usize, Orientation), BoardError> {
        let def = *SHIPS.get(ship_index).ok_or(BoardError::InvalidIndex)?;
        for _ in 0..100 {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_r, max_c) = match orient {
                Orientation::Vertical => (BOARD_SIZE - def.size(), BOARD_SIZE - 1),
                Orientation::Horizontal => (BOARD_SIZE - 1, BOARD_SIZE - def.size()),
            };
            let r = rng.random_range(0..=max_r);
            let c = rng.random_range(0..=max_c);
            let ship = Ship::new(def, orient, r, c)?;
            if ship.cells().iter().all(|&(rr, cc)| self.grid[rr][cc] == Cell::Empty) {
                return Ok((r, c, orient));
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    /// Place every ship that is not yet on the board at a random position.
    pub fn place_remaining_randomly<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        while let Some(i) = self.next_unplaced() {
            let (r, c, o) = self.random_placement(rng, i)?;
            self.place(i, r, c, o)?;
        }
        Ok(())
    }

    /// Resolve an attack at (`row`, `col`).
    ///
    /// Re-attacking a resolved cell is reported as a miss with `repeated` set
    /// and leaves the board untouched.
    pub fn receive_attack(&mut self, row: usize, col: usize) -> Result<AttackOutcome, BoardError> {
        check_bounds(row, col)?;
        match self.grid[row][col] {
            Cell::Miss | Cell::Hit => Ok(AttackOutcome::repeated()),
            Cell::Empty => {
                self.grid[row][col] = Cell::Miss;
                Ok(AttackOutcome::miss())
            }
            Cell::Ship => {
                self.grid[row][col] = Cell::Hit;
                let ship = self
                    .ships
                    .iter_mut()
                    .find(|s| s.occupies(row, col));
                let sunk = ship.and_then(|s| {
                    s.register_hit();
                    s.is_sunk().then(|| s.ship_type().name())
                });
                Ok(AttackOutcome {
                    hit: true,
                    sunk,
                    repeated: false,
                })
            }
        }
    }

    /// Returns `true` when every placed ship is sunk.
    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }

    /// Ships still afloat.
    pub fn remaining_ships(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ ships: {:?} }}", self.ships)?;
        for row in self.grid.iter() {
            for cell in row.iter() {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::Ship => 'S',
                    Cell::Miss => 'o',
                    Cell::Hit => 'X',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// What the attacker knows about the opponent's board: hit and miss markers
/// derived from `result` messages, plus the names of ships reported sunk.
/// Never holds ship positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBoard {
    grid: Grid,
    sunk: [bool; NUM_SHIPS],
}

impl Default for TargetBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetBoard {
    pub fn new() -> Self {
        Self {
            grid: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            sunk: [false; NUM_SHIPS],
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Whether a shot at (`row`, `col`) has already been answered.
    pub fn is_resolved(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(Cell::is_resolved)
    }

    pub fn is_hit(&self, row: usize, col: usize) -> bool {
        self.cell(row, col) == Some(Cell::Hit)
    }

    pub fn is_miss(&self, row: usize, col: usize) -> bool {
        self.cell(row, col) == Some(Cell::Miss)
    }

    /// Record the answer to one of our shots.
    pub fn mark(&mut self, row: usize, col: usize, hit: bool) -> Result<(), BoardError> {
        check_bounds(row, col)?;
        self.grid[row][col] = if hit { Cell::Hit } else { Cell::Miss };
        Ok(())
    }

    /// Remember that the opponent reported `name` sunk. Unknown names are ignored.
    pub fn record_sunk(&mut self, name: &str) {
        if let Some(idx) = SHIPS.iter().position(|s| s.name() == name) {
            self.sunk[idx] = true;
        }
    }

    pub fn sunk(&self) -> &[bool; NUM_SHIPS] {
        &self.sunk
    }

    /// Sizes of opponent ships not yet reported sunk; zero for sunk ships.
    pub fn remaining_lengths(&self) -> [usize; NUM_SHIPS] {
        core::array::from_fn(|i| if self.sunk[i] { 0 } else { SHIPS[i].size() })
    }

    /// Cells not yet fired upon, in row-major order.
    pub fn unresolved(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..BOARD_SIZE)
            .flat_map(|r| (0..BOARD_SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| !self.grid[r][c].is_resolved())
    }

    pub fn shots(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|c| c.is_resolved())
            .count()
    }
}
