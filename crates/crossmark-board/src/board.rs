//! Board, cell and mark types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width and height of the board.
pub const SIDE: usize = 3;

/// Number of cells on the board.
pub const CELLS: usize = SIDE * SIDE;

/// One of the two marks. `A` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    A,
    B,
}

impl Mark {
    /// The other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::A => Mark::B,
            Mark::B => Mark::A,
        }
    }
}

/// Contents of a single cell.
///
/// Stored as an integer, the form other hosts write: `0` empty, `1` for
/// player 1's mark, `2` for player 2's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    A,
    B,
}

impl Cell {
    /// The mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::A => Some(Mark::A),
            Cell::B => Some(Mark::B),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::A => 1,
            Cell::B => 2,
        }
    }
}

/// A stored cell value outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell value {0}, expected 0, 1 or 2")]
pub struct InvalidCell(pub u8);

impl TryFrom<u8> for Cell {
    type Error = InvalidCell;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::A),
            2 => Ok(Cell::B),
            other => Err(InvalidCell(other)),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::A => Cell::A,
            Mark::B => Cell::B,
        }
    }
}

/// Why a mark could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("cell {0} is outside the board")]
    OutOfRange(usize),

    #[error("cell {0} is already occupied")]
    Occupied(usize),
}

/// A 3×3 board, stored as nine cells in row-major order.
///
/// Serializes as a nine-element array, so a stored board with any other
/// length fails to decode instead of producing a malformed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Cell; CELLS]);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from nine cells.
    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self(cells)
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.0
    }

    /// The cell at `index`, or `None` past the end of the board.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    /// Returns a copy of this board with `mark` placed at `index`.
    ///
    /// The receiver is left untouched.
    ///
    /// # Errors
    /// - [`PlaceError::OutOfRange`] if `index >= 9`
    /// - [`PlaceError::Occupied`] if the cell is not empty
    pub fn place(&self, index: usize, mark: Mark) -> Result<Board, PlaceError> {
        match self.get(index) {
            None => Err(PlaceError::OutOfRange(index)),
            Some(Cell::Empty) => {
                let mut next = *self;
                next.0[index] = mark.into();
                Ok(next)
            }
            Some(_) => Err(PlaceError::Occupied(index)),
        }
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.0.iter().filter(|c| c.mark() == Some(mark)).count()
    }

    /// `true` when no empty cell is left.
    pub fn is_full(&self) -> bool {
        !self.0.contains(&Cell::Empty)
    }

    /// `true` when no mark has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|c| *c == Cell::Empty)
    }

    /// `true` if the board could arise from alternating play with `A`
    /// moving first: there are as many `A`s as `B`s, or one more `A`.
    pub fn is_balanced(&self) -> bool {
        let a = self.count(Mark::A);
        let b = self.count(Mark::B);
        a == b || a == b + 1
    }

    /// The mark that moves next under alternating play.
    pub fn to_move(&self) -> Mark {
        if self.count(Mark::A) > self.count(Mark::B) {
            Mark::B
        } else {
            Mark::A
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(SIDE).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::A => 'A',
                    Cell::B => 'B',
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
