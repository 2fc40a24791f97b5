use crate::logic::board::{Board, Cell, Symbol, BOARD_SIZE};

pub const WIN_LENGTH: usize = 5;

/// Horizontal, vertical, down-right and down-left, as (row, col) steps.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Colinear cells bearing the winning symbol.
///
/// Ordered as the placed cell, then the cells found walking forward along
/// the direction, then the cells found walking backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningLine {
    pub symbol: Symbol,
    pub cells: Vec<usize>,
}

/// Checks whether the mark just placed at `index` completes a line of five
/// or more.
///
/// Only the four lines through `index` are walked.
pub fn check_win(board: &Board, symbol: Symbol, index: usize) -> Option<WinningLine> {
    if board.get(index) != Some(Cell::Mark(symbol)) {
        return None;
    }

    let origin = Board::index_to_coord(index);

    for (dr, dc) in DIRECTIONS {
        let mut cells = vec![index];
        collect_run(board, symbol, origin, (dr, dc), &mut cells);
        collect_run(board, symbol, origin, (-dr, -dc), &mut cells);

        if cells.len() >= WIN_LENGTH {
            return Some(WinningLine { symbol, cells });
        }
    }

    None
}

fn collect_run(
    board: &Board,
    symbol: Symbol,
    (mut row, mut col): (usize, usize),
    (dr, dc): (isize, isize),
    cells: &mut Vec<usize>,
) {
    // A run can never be longer than the board is wide.
    for _ in 1..BOARD_SIZE {
        let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
            break;
        };
        if board.get_at(r, c) != Some(Cell::Mark(symbol)) {
            break;
        }
        cells.push(Board::coord_to_index(r, c));
        (row, col) = (r, c);
    }
}
