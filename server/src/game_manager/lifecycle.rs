use crate::game_manager::{AppState, Player, Tx};

impl AppState {
    pub fn add_player(&self, id: String, tx: Tx) {
        tracing::info!(player_id = %id, "Player added to AppState");
        self.players.insert(id, Player { tx });
    }

    pub async fn remove_player(&self, id: &str) {
        tracing::info!(player_id = %id, "Removing player from AppState");
        self.players.remove(id);
        self.leave_room(id).await;
    }

    /// Ends the player's match, if any. The opponent is told and the room is
    /// freed for a fresh match.
    pub async fn leave_room(&self, player_id: &str) {
        let Some(room_id) = self.registry.unbind(player_id) else {
            return;
        };
        let Some(session) = self.registry.get(&room_id) else {
            tracing::debug!(player_id = %player_id, room_id = %room_id, "Room already gone");
            return;
        };

        let mut game = session.lock().await;
        if game.leave(player_id) {
            tracing::info!(player_id = %player_id, room_id = %room_id, "Player left, match ended");
            self.finish_match(&room_id, &session, &game);
        }
    }
}
