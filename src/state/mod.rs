pub mod channels;
pub mod registry;
pub mod room;
pub mod state_machine;

use std::{collections::HashSet, sync::Arc};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{config::AppConfig, services::sponsor_service::SponsorClient};

use self::{channels::RoomChannels, registry::RoomRegistry};

/// Cheap-to-clone handle to the process-wide application state.
pub type SharedState = Arc<AppState>;

/// Bookkeeping for one live client socket.
///
/// `rooms` records which room channels the connection has already joined so a
/// rejoin never spawns a second forwarder; `forwarders` holds those tasks so
/// they can be torn down with the connection.
struct ClientConnection {
    tx: mpsc::UnboundedSender<Message>,
    rooms: HashSet<String>,
    forwarders: Vec<JoinHandle<()>>,
}

/// Central application state storing rooms, channels, and live connections.
pub struct AppState {
    config: AppConfig,
    registry: RoomRegistry,
    channels: RoomChannels,
    connections: DashMap<Uuid, ClientConnection>,
    sponsor: SponsorClient,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        let channels = RoomChannels::new(config.channel_capacity());
        let sponsor = SponsorClient::new(&config);
        Arc::new(Self {
            config,
            registry: RoomRegistry::new(),
            channels,
            connections: DashMap::new(),
            sponsor,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of active quiz rooms.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Per-room broadcast hubs.
    pub fn channels(&self) -> &RoomChannels {
        &self.channels
    }

    /// Forwarding client for the external sponsorship service.
    pub fn sponsor(&self) -> &SponsorClient {
        &self.sponsor
    }

    /// Register a live connection so targeted sends can reach it.
    pub fn register_connection(&self, connection_id: Uuid, tx: mpsc::UnboundedSender<Message>) {
        self.connections.insert(
            connection_id,
            ClientConnection {
                tx,
                rooms: HashSet::new(),
                forwarders: Vec::new(),
            },
        );
    }

    /// Drop a connection registration and wind down its room forwarders.
    pub fn remove_connection(&self, connection_id: Uuid) {
        if let Some((_, connection)) = self.connections.remove(&connection_id) {
            for task in connection.forwarders {
                task.abort();
            }
        }
    }

    /// Bind `connection_id` to `room_id`'s channel.
    ///
    /// The first join spawns a forwarder task bridging the room's broadcast
    /// channel into the connection's writer queue; rejoining the same room is
    /// a no-op. A subscriber that lags simply skips the missed frames, so one
    /// slow connection never blocks delivery to the others.
    pub fn subscribe_to_room(&self, connection_id: Uuid, room_id: &str) {
        let Some(mut entry) = self.connections.get_mut(&connection_id) else {
            return;
        };
        if !entry.rooms.insert(room_id.to_string()) {
            return;
        }

        let tx = entry.tx.clone();
        let mut rx = self.channels.subscribe(room_id);
        let forwarder = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(frame) => {
                        if tx.send(Message::Text(frame.into())).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => continue,
                }
            }
        });
        entry.forwarders.push(forwarder);
    }

    /// Deliver a frame to a single connection.
    ///
    /// Returns `false` when the connection is no longer registered or its
    /// writer has shut down.
    pub fn send_to_connection(&self, connection_id: Uuid, frame: String) -> bool {
        let Some(connection) = self.connections.get(&connection_id) else {
            return false;
        };
        connection.tx.send(Message::Text(frame.into())).is_ok()
    }
}
