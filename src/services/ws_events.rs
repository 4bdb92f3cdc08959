//! Outbound fan-out helpers for the quiz WebSocket protocol.

use tracing::warn;
use uuid::Uuid;

use crate::{dto::ws::ServerMessage, state::SharedState};

/// Fan a server message out to every subscriber of `room_id`.
///
/// Serialization happens once here; delivery is fire-and-forget and must only
/// be invoked after the state change it reports has been committed.
pub fn broadcast_to_room(state: &SharedState, room_id: &str, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(frame) => state.channels().broadcast(room_id, frame),
        Err(err) => warn!(room_id, error = %err, "failed to serialize broadcast payload"),
    }
}

/// Deliver a server message to a single connection.
///
/// Used for the join snapshot and for failure reports addressed to one
/// client. A vanished connection is logged and otherwise ignored.
pub fn send_to_connection(state: &SharedState, connection_id: Uuid, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(frame) => {
            if !state.send_to_connection(connection_id, frame) {
                warn!(%connection_id, "targeted send skipped: connection gone");
            }
        }
        Err(err) => {
            warn!(%connection_id, error = %err, "failed to serialize targeted payload");
        }
    }
}
