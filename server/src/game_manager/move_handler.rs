use crate::game_manager::{session::MatchPhase, AppState, MatchError};

impl AppState {
    pub async fn handle_move(&self, player_id: &str, index: i64) {
        let Some((room_id, session)) = self.registry.lookup(player_id) else {
            self.send_error(player_id, MatchError::NoActiveMatch);
            return;
        };
        // Negative indices are off the board like any other; the turn check
        // still runs first.
        let index = usize::try_from(index).unwrap_or(usize::MAX);

        let mut game = session.lock().await;
        match game.apply_move(player_id, index) {
            Ok(()) if game.is_terminal() => {
                if let MatchPhase::Won(line) = &game.phase {
                    tracing::info!(room_id = %room_id, winner = %line.symbol, "Match finished");
                } else {
                    tracing::info!(room_id = %room_id, "Match finished in a draw");
                }
                self.finish_match(&room_id, &session, &game);
            }
            Ok(()) => {}
            Err(err) => self.send_error(player_id, err),
        }
    }
}
