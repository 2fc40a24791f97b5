pub mod logic;

pub use logic::board::{Board, Cell, PlaceError, Symbol, BOARD_SIZE, CELL_COUNT};
pub use logic::game::{GameState, GameStatus, MoveError};
pub use logic::rules::{check_win, WinningLine, WIN_LENGTH};
