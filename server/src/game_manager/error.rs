use gomoku_core::{MoveError, PlaceError};
use shared::{ErrorKind, ServerMessage};
use thiserror::Error;

/// Rejections reported back to the player that sent the request.
///
/// None of these change match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Room is full!")]
    RoomFull,
    #[error("No active match!")]
    NoActiveMatch,
    #[error("Not your turn!")]
    NotYourTurn,
    #[error("Invalid move!")]
    InvalidMove(#[source] PlaceError),
    #[error("Already in a room!")]
    AlreadyInRoom,
}

impl MatchError {
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::RoomFull => ErrorKind::RoomFull,
            Self::NoActiveMatch => ErrorKind::NoActiveMatch,
            Self::NotYourTurn => ErrorKind::NotYourTurn,
            Self::InvalidMove(_) => ErrorKind::InvalidMove,
            Self::AlreadyInRoom => ErrorKind::AlreadyInRoom,
        }
    }

    pub fn to_message(self) -> ServerMessage {
        ServerMessage::Error {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<MoveError> for MatchError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::GameOver => Self::NoActiveMatch,
            MoveError::NotYourTurn(_) => Self::NotYourTurn,
            MoveError::Place(e) => Self::InvalidMove(e),
        }
    }
}
