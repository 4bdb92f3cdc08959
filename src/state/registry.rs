use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::state::room::QuizRoom;

/// Handle to one room's state; the mutex serializes every read-modify-write
/// sequence against that room.
pub type SharedRoom = Arc<Mutex<QuizRoom>>;

/// Registry owning every active quiz room for the process lifetime.
///
/// Rooms are never deleted; finished sessions accumulate until the process
/// restarts. This is a documented limitation of the in-memory model.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the room registered under `id`, creating it when absent.
    ///
    /// Idempotent per identifier: concurrent callers all receive the same
    /// handle.
    pub fn get_or_create(&self, id: &str) -> SharedRoom {
        self.rooms
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(QuizRoom::new(id.to_string()))))
            .clone()
    }

    /// Look up an existing room.
    pub fn get(&self, id: &str) -> Option<SharedRoom> {
        self.rooms.get(id).map(|entry| entry.value().clone())
    }

    /// Number of rooms currently registered.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Snapshot handles to every registered room.
    ///
    /// Collected into a `Vec` so callers never hold map shard guards across
    /// an await point.
    pub fn rooms(&self) -> Vec<SharedRoom> {
        self.rooms.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Total participant count across every room, for the health endpoint.
    pub async fn participant_count(&self) -> usize {
        let mut total = 0;
        for room in self.rooms() {
            total += room.lock().await.participants.len();
        }
        total
    }

    /// Mark every participant bound to `connection_id` as unreachable.
    ///
    /// Scans all rooms, which is linear in the total participant count;
    /// acceptable at the expected room scale. Returns the `(room, address)`
    /// pairs that were flipped so callers can log them.
    pub async fn mark_disconnected(&self, connection_id: Uuid) -> Vec<(String, String)> {
        let mut affected = Vec::new();
        for room in self.rooms() {
            let mut guard = room.lock().await;
            let room_id = guard.id.clone();
            for participant in guard.participants.values_mut() {
                if participant.connection_id == Some(connection_id) {
                    participant.connected = false;
                    participant.connection_id = None;
                    affected.push((room_id.clone(), participant.address.clone()));
                }
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let registry = RoomRegistry::new();
        let first = registry.get_or_create("r1");
        let second = registry.get_or_create("r1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.room_count(), 1);
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_rooms() {
        let registry = RoomRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn mark_disconnected_only_touches_matching_connection() {
        let registry = RoomRegistry::new();
        let conn_a = Uuid::new_v4();
        let conn_b = Uuid::new_v4();

        {
            let room = registry.get_or_create("r1");
            let mut guard = room.lock().await;
            guard.join_participant("0xA", "Alice", conn_a);
            guard.join_participant("0xB", "Bob", conn_b);
        }

        let affected = registry.mark_disconnected(conn_b).await;
        assert_eq!(affected, [("r1".to_string(), "0xB".to_string())]);

        let room = registry.get("r1").unwrap();
        let guard = room.lock().await;
        assert!(guard.participants["0xA"].connected);
        assert!(!guard.participants["0xB"].connected);
        assert_eq!(guard.participants["0xB"].connection_id, None);
    }

    #[tokio::test]
    async fn participant_count_spans_rooms() {
        let registry = RoomRegistry::new();
        for (room_id, address) in [("r1", "0xA"), ("r1", "0xB"), ("r2", "0xC")] {
            let room = registry.get_or_create(room_id);
            let mut guard = room.lock().await;
            guard.join_participant(address, "someone", Uuid::new_v4());
        }
        assert_eq!(registry.participant_count().await, 3);
    }
}
