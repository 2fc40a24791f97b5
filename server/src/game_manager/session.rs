use crate::game_manager::{
    clock::{Tick, TurnClock, TURN_SECONDS},
    error::MatchError,
};
use gomoku_core::{GameState, GameStatus, Symbol, WinningLine};
use shared::{Outcome, PlayerProfile, RosterEntry, ServerMessage};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex};

pub type Tx = mpsc::UnboundedSender<ServerMessage>;
pub type SharedMatch = Arc<Mutex<MatchSession>>;

/// A live connection, whether or not it has joined a room.
pub struct Player {
    pub tx: Tx,
}

pub struct Participant {
    pub player_id: String,
    pub symbol: Symbol,
    pub profile: PlayerProfile,
    pub tx: Tx,
}

impl Participant {
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPhase {
    WaitingForPlayers,
    InProgress,
    Won(WinningLine),
    Draw,
    Abandoned,
}

impl MatchPhase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Won(_) | Self::Draw | Self::Abandoned)
    }
}

/// One room: two participants, their game and the turn clock.
///
/// Every mutation goes through the `tokio::sync::Mutex` in [`SharedMatch`],
/// including clock ticks, so a move and an expiry never interleave.
pub struct MatchSession {
    pub room_id: String,
    pub game: GameState,
    pub participants: Vec<Participant>,
    pub phase: MatchPhase,
    pub clock: TurnClock,
    handle: Weak<Mutex<MatchSession>>,
}

impl MatchSession {
    pub fn create(room_id: &str) -> SharedMatch {
        Arc::new_cyclic(|handle| {
            Mutex::new(Self {
                room_id: room_id.to_string(),
                game: GameState::new(),
                participants: Vec::with_capacity(2),
                phase: MatchPhase::WaitingForPlayers,
                clock: TurnClock::new(),
                handle: handle.clone(),
            })
        })
    }

    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn participant(&self, player_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player_id)
    }

    pub fn opponent_of(&self, player_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id != player_id)
    }

    /// The participant whose move is accepted. Only set while in progress.
    pub fn current_turn(&self) -> Option<&Participant> {
        if self.phase != MatchPhase::InProgress {
            return None;
        }
        self.participants
            .iter()
            .find(|p| p.symbol == self.game.turn)
    }

    pub fn broadcast(&self, msg: &ServerMessage) {
        for p in &self.participants {
            p.send(msg.clone());
        }
    }

    /// Seats a player. X goes to the first joiner, O to the second, and the
    /// second join starts the game.
    ///
    /// # Errors
    ///
    /// `NoActiveMatch` once the match has ended, `AlreadyInRoom` for a
    /// repeat join, `RoomFull` when both seats are taken.
    pub fn join(
        &mut self,
        player_id: &str,
        profile: PlayerProfile,
        tx: Tx,
    ) -> Result<Symbol, MatchError> {
        if self.is_terminal() {
            return Err(MatchError::NoActiveMatch);
        }
        if self.participant(player_id).is_some() {
            return Err(MatchError::AlreadyInRoom);
        }
        if self.participants.len() >= 2 {
            return Err(MatchError::RoomFull);
        }

        let symbol = if self.participants.is_empty() {
            Symbol::X
        } else {
            Symbol::O
        };
        self.participants.push(Participant {
            player_id: player_id.to_string(),
            symbol,
            profile,
            tx,
        });
        tracing::info!(room_id = %self.room_id, player_id = %player_id, %symbol, "Player joined room");

        if self.participants.len() < 2 {
            if let Some(p) = self.participant(player_id) {
                p.send(ServerMessage::Waiting {
                    message: "Waiting for other players!".to_string(),
                });
            }
            return Ok(symbol);
        }

        self.phase = MatchPhase::InProgress;
        self.game.turn = Symbol::X;
        let players = self
            .participants
            .iter()
            .map(|p| RosterEntry {
                username: p.profile.username.clone(),
                avatar: p.profile.avatar.clone(),
                symbol: p.symbol,
            })
            .collect();
        self.broadcast(&ServerMessage::GameReady {
            message: "Both players connected!".to_string(),
            players,
        });
        tracing::info!(room_id = %self.room_id, "Both players connected, game started");
        self.start_clock();

        Ok(symbol)
    }

    /// Places the current player's mark and settles the outcome.
    ///
    /// On a win or draw the match becomes terminal; the caller is expected
    /// to drop it from the registry.
    ///
    /// # Errors
    ///
    /// `NoActiveMatch` after the game ended, `NotYourTurn` if `player_id`
    /// does not hold the turn (or the game has not started), `InvalidMove`
    /// if the cell is off the board or taken.
    pub fn apply_move(&mut self, player_id: &str, index: usize) -> Result<(), MatchError> {
        if self.is_terminal() {
            return Err(MatchError::NoActiveMatch);
        }
        let symbol = match self.current_turn() {
            Some(p) if p.player_id == player_id => p.symbol,
            _ => return Err(MatchError::NotYourTurn),
        };
        self.game.board.check(index).map_err(MatchError::InvalidMove)?;

        self.clock.cancel();
        let status = self.game.make_move(symbol, index)?.clone();

        tracing::debug!(room_id = %self.room_id, player_id = %player_id, %symbol, index, "Move applied");
        self.broadcast(&ServerMessage::Move { index, symbol });

        match status {
            GameStatus::Won(line) => {
                tracing::info!(room_id = %self.room_id, winner = %symbol, cells = ?line.cells, "Game won");
                self.broadcast(&ServerMessage::GameOver {
                    outcome: Outcome::Win,
                    symbol: Some(symbol),
                    cells: Some(line.cells.clone()),
                    message: format!("{symbol} wins!"),
                });
                self.phase = MatchPhase::Won(line);
            }
            GameStatus::Draw => {
                tracing::info!(room_id = %self.room_id, "Game drawn");
                self.broadcast(&ServerMessage::GameOver {
                    outcome: Outcome::Draw,
                    symbol: None,
                    cells: None,
                    message: "It's a draw!".to_string(),
                });
                self.phase = MatchPhase::Draw;
            }
            GameStatus::Playing => self.start_clock(),
        }

        Ok(())
    }

    /// Drops `player_id` out of the match. Returns true if this ended it.
    pub fn leave(&mut self, player_id: &str) -> bool {
        if self.is_terminal() || self.participant(player_id).is_none() {
            return false;
        }

        self.clock.cancel();
        self.phase = MatchPhase::Abandoned;
        tracing::info!(room_id = %self.room_id, player_id = %player_id, "Match abandoned");

        if let Some(opponent) = self.opponent_of(player_id) {
            opponent.send(ServerMessage::GameOver {
                outcome: Outcome::Disconnect,
                symbol: None,
                cells: None,
                message: "Opponent disconnected!".to_string(),
            });
        }
        self.participants.retain(|p| p.player_id != player_id);
        true
    }

    /// Delivers one clock tick. Returns false when the tick is stale and the
    /// tick task should stop.
    pub fn on_clock_tick(&mut self, epoch: u64) -> bool {
        match self.clock.tick(epoch) {
            Tick::Stale => return false,
            Tick::Counted(left) => self.broadcast_time(left),
            Tick::Expired => {
                self.broadcast_time(0);
                let holder = self.game.skip_turn();
                tracing::info!(room_id = %self.room_id, next = %holder, "Turn skipped due to timeout");
                self.broadcast(&ServerMessage::TurnSkipped {
                    message: "Turn skipped due to timeout!".to_string(),
                });
                self.clock.restart();
                self.broadcast_time(TURN_SECONDS);
            }
        }
        true
    }

    fn start_clock(&mut self) {
        self.clock.start(self.handle.clone());
        self.broadcast_time(TURN_SECONDS);
    }

    fn broadcast_time(&self, time_left: u32) {
        self.broadcast(&ServerMessage::TurnUpdate {
            time_left,
            current_player: self.game.turn,
        });
    }
}
