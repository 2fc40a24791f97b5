use crate::game_manager::{AppState, MatchError};
use shared::PlayerProfile;

impl AppState {
    pub async fn join_room(&self, player_id: &str, room_id: &str, profile: PlayerProfile) {
        if let Some(current) = self.registry.room_of(player_id) {
            tracing::warn!(player_id = %player_id, room_id = %room_id, current = %current, "Player already in a room, ignoring join");
            self.send_error(player_id, MatchError::AlreadyInRoom);
            return;
        }

        let Some(tx) = self.players.get(player_id).map(|p| p.tx.clone()) else {
            tracing::warn!(player_id = %player_id, "Join from unknown player");
            return;
        };

        loop {
            let session = self.registry.get_or_create(room_id);
            let mut game = session.lock().await;

            // Ended between the lookup and the lock. It was dropped from the
            // registry before the lock was released, so the next lookup
            // creates a fresh match.
            if game.is_terminal() {
                continue;
            }

            match game.join(player_id, profile, tx) {
                Ok(_) => self.registry.bind(player_id, room_id),
                Err(err) => {
                    tracing::info!(player_id = %player_id, room_id = %room_id, error = %err, "Join rejected");
                    self.send_error(player_id, err);
                }
            }
            return;
        }
    }
}
