//! Ship definitions and placement geometry.

use core::fmt;

use crate::common::BoardError;
use crate::config::BOARD_SIZE;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Type of ship: name and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    size: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of cells the ship occupies.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A ship placed on a board, with the cells it occupies and the hits it took.
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    ship_type: ShipType,
    orientation: Orientation,
    cells: Vec<(usize, usize)>,
    hits: usize,
}

impl Ship {
    /// Lay out a ship starting at (`row`, `col`) and extending right or down.
    /// Fails when any cell would fall outside the board.
    pub fn new(
        ship_type: ShipType,
        orientation: Orientation,
        row: usize,
        col: usize,
    ) -> Result<Self, BoardError> {
        let size = ship_type.size();
        let fits = size > 0 && match orientation {
            Orientation::Horizontal => {
                row < BOARD_SIZE && col.checked_add(size).is_some_and(|end| end <= BOARD_SIZE)
            }
            Orientation::Vertical => {
                col < BOARD_SIZE && row.checked_add(size).is_some_and(|end| end <= BOARD_SIZE)
            }
        };
        if !fits {
            return Err(BoardError::ShipOutOfBounds);
        }

        let cells = (0..size)
            .map(|i| match orientation {
                Orientation::Horizontal => (row, col + i),
                Orientation::Vertical => (row + i, col),
            })
            .collect();
        Ok(Ship {
            ship_type,
            orientation,
            cells,
            hits: 0,
        })
    }

    /// Whether this ship covers (`row`, `col`).
    pub fn occupies(&self, row: usize, col: usize) -> bool {
        self.cells.contains(&(row, col))
    }

    /// Count one more hit. The board guarantees each cell is hit at most once.
    pub(crate) fn register_hit(&mut self) {
        self.hits = (self.hits + 1).min(self.ship_type.size());
    }

    /// Check if the ship is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.hits == self.ship_type.size()
    }

    pub fn ship_type(&self) -> ShipType {
        self.ship_type
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Occupied coordinates, bow first.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Origin of the ship (row, col).
    pub fn origin(&self) -> (usize, usize) {
        self.cells[0]
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, col) = self.origin();
        write!(
            f,
            "Ship {{ name: \"{}\", origin: ({}, {}), orientation: {:?}, hits: {}/{} }}",
            self.ship_type.name(),
            row,
            col,
            self.orientation,
            self.hits,
            self.ship_type.size(),
        )
    }
}
