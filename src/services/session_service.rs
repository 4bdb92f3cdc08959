//! Core session coordination: room membership, lifecycle transitions,
//! scoring, and reward distribution.
//!
//! Every operation locks exactly one room, commits its mutation, releases the
//! lock, and only then hands the resulting events to the broadcaster.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        quiz::{self, ParticipantSummary},
        unix_timestamp_ms,
        ws::{
            JoinQuizPayload, LifecyclePayload, ParticipantJoinedEvent, QuizEndedEvent,
            QuizStartedEvent, QuizStatusEvent, RewardsDistributedEvent, ScoreUpdatedEvent,
            ServerMessage, SubmitAnswerPayload,
        },
    },
    error::ServiceError,
    services::ws_events,
    state::{
        SharedState,
        registry::SharedRoom,
        state_machine::{LifecycleEvent, apply_transition},
    },
};

/// Handle `join_quiz`: upsert the participant, subscribe the connection to
/// the room channel, and fan out the join.
///
/// The room is created implicitly when absent, mirroring the frontend's
/// client-side room materialization.
pub async fn join_quiz(
    state: &SharedState,
    connection_id: Uuid,
    payload: JoinQuizPayload,
) -> Result<(), ServiceError> {
    let JoinQuizPayload {
        quiz_id,
        user_address,
        user_name,
    } = payload;

    if user_address.is_empty() || user_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "userAddress and userName must not be empty".into(),
        ));
    }

    let room = state.registry().get_or_create(&quiz_id);
    let (joined, total, snapshot) = {
        let mut guard = room.lock().await;
        let joined = ParticipantSummary::from(&*guard.join_participant(
            &user_address,
            &user_name,
            connection_id,
        ));
        let total = guard.participants.len();
        let snapshot = QuizStatusEvent {
            quiz_id: quiz_id.clone(),
            status: guard.status,
            participants: quiz::roster(&guard),
            current_question: guard.current_question,
            started: guard.started,
            ended: guard.ended,
        };
        (joined, total, snapshot)
    };

    info!(%quiz_id, address = %joined.address, name = %joined.name, "participant joined quiz");

    // Subscribe before broadcasting so the joiner receives its own join event.
    state.subscribe_to_room(connection_id, &quiz_id);

    ws_events::broadcast_to_room(
        state,
        &quiz_id,
        &ServerMessage::ParticipantJoined(ParticipantJoinedEvent {
            quiz_id: quiz_id.clone(),
            participant: joined,
            total_participants: total,
        }),
    );
    ws_events::send_to_connection(state, connection_id, &ServerMessage::QuizStatus(snapshot));

    Ok(())
}

/// Handle `start_quiz`: move the room to the started state and announce it.
pub async fn start_quiz(state: &SharedState, payload: LifecyclePayload) -> Result<(), ServiceError> {
    let LifecyclePayload {
        quiz_id,
        creator_address,
    } = payload;

    let room = lookup(state, &quiz_id)?;
    let total_questions = {
        let mut guard = room.lock().await;
        apply_transition(&mut guard, LifecycleEvent::Start)?;
        guard
            .total_questions
            .unwrap_or(state.config().default_total_questions())
    };

    info!(%quiz_id, requested_by = %creator_address, "quiz started");

    ws_events::broadcast_to_room(
        state,
        &quiz_id,
        &ServerMessage::QuizStarted(QuizStartedEvent {
            quiz_id: quiz_id.clone(),
            started_at: unix_timestamp_ms(),
            total_questions,
        }),
    );

    Ok(())
}

/// Handle `end_quiz`: move the room to the ended state and announce the final
/// roster.
pub async fn end_quiz(state: &SharedState, payload: LifecyclePayload) -> Result<(), ServiceError> {
    let LifecyclePayload {
        quiz_id,
        creator_address,
    } = payload;

    let room = lookup(state, &quiz_id)?;
    let participants = {
        let mut guard = room.lock().await;
        apply_transition(&mut guard, LifecycleEvent::End)?;
        quiz::roster(&guard)
    };

    info!(%quiz_id, requested_by = %creator_address, "quiz ended");

    ws_events::broadcast_to_room(
        state,
        &quiz_id,
        &ServerMessage::QuizEnded(QuizEndedEvent {
            quiz_id: quiz_id.clone(),
            ended_at: unix_timestamp_ms(),
            participants,
        }),
    );

    Ok(())
}

/// Handle `submit_answer`: store the answer, award a point when correct, and
/// broadcast the refreshed score.
pub async fn submit_answer(
    state: &SharedState,
    payload: SubmitAnswerPayload,
) -> Result<(), ServiceError> {
    let SubmitAnswerPayload {
        quiz_id,
        user_address,
        question_index,
        answer,
        is_correct,
    } = payload;

    let room = lookup(state, &quiz_id)?;
    let updated = {
        let mut guard = room.lock().await;
        guard
            .record_answer(&user_address, question_index as usize, answer, is_correct)
            .map(ParticipantSummary::from)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "participant `{user_address}` not found in quiz `{quiz_id}`"
                ))
            })?
    };

    info!(
        %quiz_id,
        address = %updated.address,
        question_index,
        correct = is_correct,
        score = updated.score,
        "answer recorded"
    );

    ws_events::broadcast_to_room(
        state,
        &quiz_id,
        &ServerMessage::ScoreUpdated(ScoreUpdatedEvent {
            quiz_id: quiz_id.clone(),
            participant: updated,
        }),
    );

    Ok(())
}

/// Handle `distribute_rewards`: compute the top scorer and announce the
/// distribution.
///
/// The actual disbursement is delegated to the external sponsorship service;
/// the core only produces the winner record.
pub async fn distribute_rewards(
    state: &SharedState,
    payload: LifecyclePayload,
) -> Result<(), ServiceError> {
    let LifecyclePayload {
        quiz_id,
        creator_address,
    } = payload;

    let room = lookup(state, &quiz_id)?;
    let winner = {
        let guard = room.lock().await;
        guard
            .top_scorer()
            .map(ParticipantSummary::from)
            .ok_or_else(|| ServiceError::EmptyRoom(quiz_id.clone()))?
    };

    info!(%quiz_id, winner = %winner.address, distributed_by = %creator_address, "rewards distributed");

    ws_events::broadcast_to_room(
        state,
        &quiz_id,
        &ServerMessage::RewardsDistributed(RewardsDistributedEvent {
            quiz_id: quiz_id.clone(),
            winner,
            distributed_by: creator_address,
        }),
    );

    Ok(())
}

/// Handle a transport-level disconnect: unregister the connection and mark
/// its participants unreachable. No outbound event is produced.
pub async fn disconnect(state: &SharedState, connection_id: Uuid) {
    state.remove_connection(connection_id);

    let affected = state.registry().mark_disconnected(connection_id).await;
    for (quiz_id, address) in affected {
        info!(%quiz_id, %address, "participant went offline");
    }
}

fn lookup(state: &SharedState, quiz_id: &str) -> Result<SharedRoom, ServiceError> {
    state.registry().get(quiz_id).ok_or_else(|| {
        debug!(quiz_id, "event references unknown quiz");
        ServiceError::NotFound(format!("quiz `{quiz_id}` not found"))
    })
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use serde_json::{Value, json};
    use tokio::sync::{broadcast, mpsc};

    use super::*;
    use crate::{config::AppConfig, state::AppState, state::room::QuizStatus};

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    /// Register a fake connection backed by a plain channel so targeted sends
    /// and room forwarders can be observed without a real socket.
    fn fake_connection(state: &SharedState) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        state.register_connection(id, tx);
        (id, rx)
    }

    async fn join(state: &SharedState, connection_id: Uuid, quiz: &str, address: &str, name: &str) {
        join_quiz(
            state,
            connection_id,
            JoinQuizPayload {
                quiz_id: quiz.into(),
                user_address: address.into(),
                user_name: name.into(),
            },
        )
        .await
        .unwrap();
    }

    fn lifecycle(quiz: &str, creator: &str) -> LifecyclePayload {
        LifecyclePayload {
            quiz_id: quiz.into(),
            creator_address: creator.into(),
        }
    }

    fn answer(quiz: &str, address: &str, index: u32, correct: bool) -> SubmitAnswerPayload {
        SubmitAnswerPayload {
            quiz_id: quiz.into(),
            user_address: address.into(),
            question_index: index,
            answer: json!("x"),
            is_correct: correct,
        }
    }

    async fn next_event(rx: &mut broadcast::Receiver<String>) -> Value {
        serde_json::from_str(&rx.recv().await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn joins_track_distinct_addresses_in_order() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);

        join(&state, conn, "r1", "0xA", "Alice").await;
        join(&state, conn, "r1", "0xB", "Bob").await;
        join(&state, conn, "r1", "0xB", "Bob again").await;

        let room = state.registry().get("r1").unwrap();
        let guard = room.lock().await;
        let addresses: Vec<_> = guard.participants.keys().cloned().collect();
        assert_eq!(addresses, ["0xA", "0xB"]);
    }

    #[tokio::test]
    async fn join_rejects_empty_identity() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);

        let err = join_quiz(
            &state,
            conn,
            JoinQuizPayload {
                quiz_id: "r1".into(),
                user_address: "".into(),
                user_name: "Alice".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn join_sends_snapshot_to_joining_connection() {
        let state = test_state();
        let (conn, mut rx) = fake_connection(&state);

        join(&state, conn, "r1", "0xA", "Alice").await;

        // The connection receives both the room broadcast (via its forwarder)
        // and the targeted snapshot; collect until the snapshot shows up.
        let mut snapshot = None;
        for _ in 0..2 {
            let Some(Message::Text(text)) = rx.recv().await else {
                panic!("expected a text frame");
            };
            let value: Value = serde_json::from_str(text.as_str()).unwrap();
            if value["type"] == "quiz_status" {
                snapshot = Some(value);
                break;
            }
        }

        let snapshot = snapshot.expect("no quiz_status frame received");
        assert_eq!(snapshot["quizId"], "r1");
        assert_eq!(snapshot["status"], "created");
        assert_eq!(snapshot["participants"][0]["address"], "0xA");
        assert_eq!(snapshot["participants"][0]["connected"], true);
        assert_eq!(snapshot["started"], false);
        assert_eq!(snapshot["ended"], false);
    }

    #[tokio::test]
    async fn start_on_unknown_room_reports_not_found() {
        let state = test_state();
        let err = start_quiz(&state, lifecycle("ghost", "0xA")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn restart_reports_invalid_state() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);
        join(&state, conn, "r1", "0xA", "Alice").await;

        start_quiz(&state, lifecycle("r1", "0xA")).await.unwrap();
        let err = start_quiz(&state, lifecycle("r1", "0xA")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn answers_from_unknown_participants_report_not_found() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);
        join(&state, conn, "r1", "0xA", "Alice").await;

        let err = submit_answer(&state, answer("r1", "0xZ", 0, true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn repeated_correct_answers_keep_scoring() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);
        join(&state, conn, "r1", "0xA", "Alice").await;

        submit_answer(&state, answer("r1", "0xA", 0, true)).await.unwrap();
        submit_answer(&state, answer("r1", "0xA", 0, true)).await.unwrap();

        let room = state.registry().get("r1").unwrap();
        assert_eq!(room.lock().await.participants["0xA"].score, 2);
    }

    #[tokio::test]
    async fn distribute_rewards_on_empty_room_reports_empty_room() {
        let state = test_state();
        // Materialize the room without joining anyone.
        state.registry().get_or_create("r1");

        let err = distribute_rewards(&state, lifecycle("r1", "0xA"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyRoom(_)));
    }

    #[tokio::test]
    async fn full_session_scenario_broadcasts_in_order() {
        let state = test_state();
        let (conn_a, _rx_a) = fake_connection(&state);
        let (conn_b, _rx_b) = fake_connection(&state);

        // Observe the room channel directly: broadcast order is the order the
        // coordinator issued the events in.
        let mut room_rx = state.channels().subscribe("r1");

        join(&state, conn_a, "r1", "0xA", "Alice").await;
        join(&state, conn_b, "r1", "0xB", "Bob").await;
        start_quiz(&state, lifecycle("r1", "0xA")).await.unwrap();
        submit_answer(&state, answer("r1", "0xB", 0, true)).await.unwrap();
        end_quiz(&state, lifecycle("r1", "0xA")).await.unwrap();
        distribute_rewards(&state, lifecycle("r1", "0xA")).await.unwrap();

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "participant_joined");
        assert_eq!(event["participant"]["address"], "0xA");
        assert_eq!(event["totalParticipants"], 1);

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "participant_joined");
        assert_eq!(event["participant"]["address"], "0xB");
        assert_eq!(event["totalParticipants"], 2);

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "quiz_started");
        assert_eq!(event["totalQuestions"], 5);

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "score_updated");
        assert_eq!(event["participant"]["address"], "0xB");
        assert_eq!(event["participant"]["score"], 1);

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "quiz_ended");
        assert_eq!(event["participants"].as_array().unwrap().len(), 2);

        let event = next_event(&mut room_rx).await;
        assert_eq!(event["type"], "rewards_distributed");
        assert_eq!(event["winner"]["address"], "0xB");
        assert_eq!(event["winner"]["score"], 1);
        assert_eq!(event["distributedBy"], "0xA");

        let room = state.registry().get("r1").unwrap();
        let guard = room.lock().await;
        assert_eq!(guard.status, QuizStatus::Ended);
        assert!(guard.started);
        assert!(guard.ended);
    }

    #[tokio::test]
    async fn reward_ties_go_to_the_first_joined_participant() {
        let state = test_state();
        let (conn, _rx) = fake_connection(&state);
        let mut room_rx = state.channels().subscribe("r1");

        join(&state, conn, "r1", "0xA", "Alice").await;
        join(&state, conn, "r1", "0xB", "Bob").await;
        submit_answer(&state, answer("r1", "0xA", 0, true)).await.unwrap();
        submit_answer(&state, answer("r1", "0xB", 0, true)).await.unwrap();
        distribute_rewards(&state, lifecycle("r1", "0xA")).await.unwrap();

        let mut winner = None;
        while let Ok(frame) = room_rx.try_recv() {
            let value: Value = serde_json::from_str(&frame).unwrap();
            if value["type"] == "rewards_distributed" {
                winner = Some(value["winner"]["address"].clone());
            }
        }
        assert_eq!(winner, Some(json!("0xA")));
    }

    #[tokio::test]
    async fn disconnect_marks_only_the_matching_connection_offline() {
        let state = test_state();
        let (conn_a, _rx_a) = fake_connection(&state);
        let (conn_b, _rx_b) = fake_connection(&state);

        join(&state, conn_a, "r1", "0xA", "Alice").await;
        join(&state, conn_b, "r1", "0xB", "Bob").await;

        disconnect(&state, conn_b).await;

        let room = state.registry().get("r1").unwrap();
        let guard = room.lock().await;
        assert!(guard.participants["0xA"].connected);
        assert!(!guard.participants["0xB"].connected);
    }

    #[tokio::test]
    async fn rejoin_after_disconnect_restores_score_and_connectivity() {
        let state = test_state();
        let (conn_old, _rx_old) = fake_connection(&state);

        join(&state, conn_old, "r1", "0xB", "Bob").await;
        submit_answer(&state, answer("r1", "0xB", 0, true)).await.unwrap();
        disconnect(&state, conn_old).await;

        let (conn_new, _rx_new) = fake_connection(&state);
        join(&state, conn_new, "r1", "0xB", "Bob").await;

        let room = state.registry().get("r1").unwrap();
        let guard = room.lock().await;
        let bob = &guard.participants["0xB"];
        assert_eq!(bob.score, 1);
        assert!(bob.connected);
        assert_eq!(bob.connection_id, Some(conn_new));
    }
}
