//! Common types for the combat game: cell states, attack outcomes and board errors.

/// State of one cell of a combat board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Miss,
    Hit,
}

impl Cell {
    /// A cell that has already been fired upon.
    pub fn is_resolved(self) -> bool {
        matches!(self, Cell::Miss | Cell::Hit)
    }
}

/// Result of resolving one attack on the defender's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub hit: bool,
    /// Name of the ship this attack sank, if any.
    pub sunk: Option<&'static str>,
    /// The cell had already been resolved; nothing changed.
    pub repeated: bool,
}

impl AttackOutcome {
    pub(crate) const fn miss() -> Self {
        Self {
            hit: false,
            sunk: None,
            repeated: false,
        }
    }

    pub(crate) const fn repeated() -> Self {
        Self {
            hit: false,
            sunk: None,
            repeated: true,
        }
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Ship index is not part of the fleet catalogue.
    InvalidIndex,
    /// Attempted to place a ship that is already placed.
    ShipAlreadyPlaced,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// Ship placement runs off the board.
    ShipOutOfBounds,
    /// Coordinate outside the board.
    CellOutOfBounds { row: usize, col: usize },
    /// Random placement gave up.
    UnableToPlaceShip,
    /// The fleet has been declared complete; the board is locked.
    PlacementClosed,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::InvalidIndex => write!(f, "Ship index is out of range"),
            BoardError::ShipAlreadyPlaced => write!(f, "Ship is already placed on the board"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::CellOutOfBounds { row, col } => {
                write!(f, "Cell ({}, {}) is outside the board", row, col)
            }
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::PlacementClosed => write!(f, "Fleet placement is already finished"),
        }
    }
}

impl std::error::Error for BoardError {}
