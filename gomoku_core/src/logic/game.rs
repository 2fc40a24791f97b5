use crate::logic::board::{Board, PlaceError, Symbol};
use crate::logic::rules::{check_win, WinningLine};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won(WinningLine),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,
    #[error("it is {0}'s turn")]
    NotYourTurn(Symbol),
    #[error(transparent)]
    Place(#[from] PlaceError),
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub turn: Symbol,
    pub status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// X moves first.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Symbol::X,
            status: GameStatus::Playing,
        }
    }

    /// Places `symbol` at `index` and settles the outcome.
    ///
    /// The turn only passes to the other symbol while the game is still
    /// being played.
    ///
    /// # Errors
    ///
    /// Fails without touching the state if the game is over, it is not
    /// `symbol`'s turn, or the board rejects the placement.
    pub fn make_move(&mut self, symbol: Symbol, index: usize) -> Result<&GameStatus, MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }
        if self.turn != symbol {
            return Err(MoveError::NotYourTurn(self.turn));
        }

        self.board.place(index, symbol)?;

        if let Some(line) = check_win(&self.board, symbol, index) {
            self.status = GameStatus::Won(line);
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
        } else {
            self.turn = symbol.opposite();
        }

        Ok(&self.status)
    }

    /// Hands the move to the other symbol without placing anything.
    pub fn skip_turn(&mut self) -> Symbol {
        if self.status == GameStatus::Playing {
            self.turn = self.turn.opposite();
        }
        self.turn
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }
}
