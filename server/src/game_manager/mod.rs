use dashmap::DashMap;
use shared::{ClientMessage, ServerMessage};

pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod matchmaking;
pub mod move_handler;
pub mod registry;
pub mod session;
#[cfg(test)]
pub mod tests;

pub use error::MatchError;
pub use registry::MatchRegistry;
pub use session::{MatchSession, Player, SharedMatch, Tx};

pub struct AppState {
    pub players: DashMap<String, Player>,
    pub registry: MatchRegistry,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            registry: MatchRegistry::new(),
        }
    }

    pub fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(player) = self.players.get(player_id) {
            let _ = player.tx.send(msg);
        }
    }

    pub fn send_error(&self, player_id: &str, err: MatchError) {
        tracing::debug!(player_id = %player_id, error = %err, "Request rejected");
        self.send_to(player_id, err.to_message());
    }

    pub async fn dispatch(&self, player_id: &str, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom { room_id, profile } => {
                self.join_room(player_id, &room_id, profile).await;
            }
            ClientMessage::Move { index } => self.handle_move(player_id, index).await,
        }
    }

    /// Drops a finished match from the registry and frees its players.
    ///
    /// Called with the match still locked so a racing join sees it gone or
    /// sees it terminal, never half-finished.
    fn finish_match(&self, room_id: &str, session: &SharedMatch, game: &MatchSession) {
        self.registry.remove(room_id, session);
        for p in &game.participants {
            self.registry.unbind(&p.player_id);
        }
        tracing::debug!(room_id = %room_id, live_matches = self.registry.len(), "Match cleaned up");
    }
}
