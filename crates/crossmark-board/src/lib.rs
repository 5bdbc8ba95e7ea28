//! Board engine for Crossmark.
//!
//! Pure functions over a 3×3 board: placing marks, checking the mark
//! balance, and deciding whether a board is won, drawn, or still open.
//! No state, no I/O, no logging.
//!
//! Cells are indexed `0..9` in row-major order:
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```

mod board;
mod outcome;

pub use board::{Board, Cell, InvalidCell, Mark, PlaceError, CELLS, SIDE};
pub use outcome::{evaluate, Outcome, LINES};
