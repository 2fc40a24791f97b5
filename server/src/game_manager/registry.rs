use crate::game_manager::session::{MatchSession, SharedMatch};
use dashmap::DashMap;
use std::sync::Arc;

/// Live matches by room id, plus which room each player sits in.
///
/// Map guards are released before returning, so nothing here is ever held
/// while a match is locked by the caller.
#[derive(Default)]
pub struct MatchRegistry {
    matches: DashMap<String, SharedMatch>,
    player_rooms: DashMap<String, String>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, room_id: &str) -> SharedMatch {
        self.matches
            .entry(room_id.to_string())
            .or_insert_with(|| {
                tracing::info!(room_id = %room_id, "Created new match");
                MatchSession::create(room_id)
            })
            .value()
            .clone()
    }

    pub fn get(&self, room_id: &str) -> Option<SharedMatch> {
        self.matches.get(room_id).map(|m| Arc::clone(m.value()))
    }

    /// Removes `room_id` only while it still maps to `session`.
    pub fn remove(&self, room_id: &str, session: &SharedMatch) -> bool {
        let removed = self
            .matches
            .remove_if(room_id, |_, current| Arc::ptr_eq(current, session))
            .is_some();
        if removed {
            tracing::info!(room_id = %room_id, "Removed match");
        }
        removed
    }

    pub fn bind(&self, player_id: &str, room_id: &str) {
        self.player_rooms
            .insert(player_id.to_string(), room_id.to_string());
    }

    pub fn unbind(&self, player_id: &str) -> Option<String> {
        self.player_rooms.remove(player_id).map(|(_, room)| room)
    }

    pub fn room_of(&self, player_id: &str) -> Option<String> {
        self.player_rooms.get(player_id).map(|r| r.value().clone())
    }

    /// The match `player_id` is playing in, with its room id.
    pub fn lookup(&self, player_id: &str) -> Option<(String, SharedMatch)> {
        let room_id = self.room_of(player_id)?;
        let session = self.get(&room_id)?;
        Some((room_id, session))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}
