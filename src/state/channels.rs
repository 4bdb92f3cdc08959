use dashmap::DashMap;
use tokio::sync::broadcast;

/// Per-room broadcast hubs delivering pre-serialized frames to subscribers.
///
/// Each room gets its own channel so delivery stays scoped to that room's
/// connections. Frames are serialized once by the sender and cloned per
/// subscriber.
pub struct RoomChannels {
    channels: DashMap<String, broadcast::Sender<String>>,
    capacity: usize,
}

impl RoomChannels {
    /// Construct the hub map with the per-room channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Register a subscriber on a room's channel, creating it on first use.
    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<String> {
        self.channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fan a frame out to every subscriber of the room's channel.
    ///
    /// Fire-and-forget: a room without subscribers, or subscribers that have
    /// fallen behind, never surface an error to the caller.
    pub fn broadcast(&self, room_id: &str, frame: String) {
        if let Some(sender) = self.channels.get(room_id) {
            let _ = sender.send(frame);
        }
    }
}
