use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ErrorEvent, ServerMessage},
    error::ServiceError,
    services::{session_service, ws_events},
    state::SharedState,
};

/// Handle the full lifecycle for an individual quiz client connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound frames flowing even while we await inbound ones.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    state.register_connection(connection_id, outbound_tx.clone());
    info!(%connection_id, "client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                dispatch_text(&state, connection_id, text.as_str()).await;
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    session_service::disconnect(&state, connection_id).await;
    info!(%connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Parse one inbound frame and route it to the session coordinator.
async fn dispatch_text(state: &SharedState, connection_id: Uuid, text: &str) {
    let inbound = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(%connection_id, error = %err, "failed to parse client message");
            return;
        }
    };

    let outcome = match inbound {
        ClientMessage::JoinQuiz(payload) => {
            session_service::join_quiz(state, connection_id, payload).await
        }
        ClientMessage::StartQuiz(payload) => session_service::start_quiz(state, payload).await,
        ClientMessage::EndQuiz(payload) => session_service::end_quiz(state, payload).await,
        ClientMessage::SubmitAnswer(payload) => session_service::submit_answer(state, payload).await,
        ClientMessage::DistributeRewards(payload) => {
            session_service::distribute_rewards(state, payload).await
        }
        ClientMessage::Unknown => {
            debug!(%connection_id, "ignoring unknown message type");
            Ok(())
        }
    };

    match outcome {
        Ok(()) => {}
        // Events referencing unknown rooms or participants stay silent on the wire.
        Err(ServiceError::NotFound(reason)) => {
            debug!(%connection_id, reason = %reason, "dropping event for missing target");
        }
        Err(err) => {
            warn!(%connection_id, error = %err, "failed to handle client message");
            ws_events::send_to_connection(
                state,
                connection_id,
                &ServerMessage::Error(ErrorEvent {
                    message: err.to_string(),
                }),
            );
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
