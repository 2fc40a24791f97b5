use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BOARD_SIZE: usize = 15;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Mark(Symbol),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn symbol(self) -> Option<Symbol> {
        match self {
            Self::Empty => None,
            Self::Mark(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("cell index is outside the board")]
    OutOfRange,
    #[error("cell is already occupied")]
    CellOccupied,
}

/// A 15x15 gomoku board in row-major order.
///
/// Cells only ever go from `Empty` to `Mark`; there is no way to clear one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Cell>,
    filled: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::Empty; CELL_COUNT],
            filled: 0,
        }
    }

    /// Marks `index` with `symbol`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `index >= CELL_COUNT`, `CellOccupied` if the cell
    /// already holds a mark. The board is untouched on error.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> Result<(), PlaceError> {
        self.check(index)?;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = Cell::Mark(symbol);
            self.filled += 1;
        }
        Ok(())
    }

    /// Whether `place(index, _)` would succeed.
    ///
    /// # Errors
    ///
    /// Same as [`Board::place`].
    pub fn check(&self, index: usize) -> Result<(), PlaceError> {
        match self.cells.get(index) {
            None => Err(PlaceError::OutOfRange),
            Some(cell) if !cell.is_empty() => Err(PlaceError::CellOccupied),
            Some(_) => Ok(()),
        }
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Cell at (`row`, `col`), or `None` off the board.
    pub fn get_at(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return None;
        }
        self.get(Self::coord_to_index(row, col))
    }

    pub const fn filled_count(&self) -> usize {
        self.filled
    }

    pub const fn is_full(&self) -> bool {
        self.filled == CELL_COUNT
    }

    pub const fn index_to_coord(index: usize) -> (usize, usize) {
        (index / BOARD_SIZE, index % BOARD_SIZE)
    }

    pub const fn coord_to_index(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }
}
