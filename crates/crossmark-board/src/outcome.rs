//! Win and draw detection.

use serde::{Deserialize, Serialize};

use crate::{Board, Cell, Mark};

/// Every line that wins the game: three rows, three columns, two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// No line is complete and at least one cell is empty.
    Undecided,
    WinnerA,
    WinnerB,
    /// Every cell is filled and no line is complete.
    Draw,
}

impl Outcome {
    fn winner(mark: Mark) -> Self {
        match mark {
            Mark::A => Outcome::WinnerA,
            Mark::B => Outcome::WinnerB,
        }
    }

    /// `true` for anything but [`Outcome::Undecided`].
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::Undecided)
    }
}

/// Evaluates a board.
///
/// All eight lines are inspected. A board where both marks own a line
/// cannot come out of alternating play; if one is handed in anyway the
/// mark that moved last (the one [`Board::to_move`] does not name) wins,
/// so the answer never depends on line order.
pub fn evaluate(board: &Board) -> Outcome {
    let a = has_line(board, Mark::A);
    let b = has_line(board, Mark::B);

    match (a, b) {
        (true, false) => Outcome::WinnerA,
        (false, true) => Outcome::WinnerB,
        (true, true) => Outcome::winner(board.to_move().opponent()),
        (false, false) if board.is_full() => Outcome::Draw,
        (false, false) => Outcome::Undecided,
    }
}

fn has_line(board: &Board, mark: Mark) -> bool {
    let want = Cell::from(mark);
    let cells = board.cells();
    LINES
        .iter()
        .any(|line| line.iter().all(|&i| cells[i] == want))
}
