use gomoku_core::Symbol;
use serde::{Deserialize, Serialize};

/// Display data a client sends on join. The server only echoes it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        profile: PlayerProfile,
    },
    /// Signed so a negative index still decodes and can be rejected as an
    /// invalid move.
    Move {
        index: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub username: String,
    pub avatar: String,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Win,
    Draw,
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    RoomFull,
    NoActiveMatch,
    NotYourTurn,
    InvalidMove,
    AlreadyInRoom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    Waiting {
        message: String,
    },
    GameReady {
        message: String,
        players: Vec<RosterEntry>,
    },
    Move {
        index: usize,
        symbol: Symbol,
    },
    #[serde(rename_all = "camelCase")]
    TurnUpdate {
        time_left: u32,
        current_player: Symbol,
    },
    TurnSkipped {
        message: String,
    },
    GameOver {
        outcome: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<Symbol>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cells: Option<Vec<usize>>,
        message: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}
