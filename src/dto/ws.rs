//! Wire protocol for the quiz WebSocket channel.
//!
//! Every frame is a single JSON object tagged by a `type` field; payload
//! fields use camelCase for compatibility with the web frontend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    dto::quiz::{ParticipantSnapshot, ParticipantSummary},
    state::room::QuizStatus,
};

/// Messages accepted from quiz clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a quiz room, creating it when absent.
    JoinQuiz(JoinQuizPayload),
    /// Start the quiz.
    StartQuiz(LifecyclePayload),
    /// End the quiz.
    EndQuiz(LifecyclePayload),
    /// Submit an answer for the current question.
    SubmitAnswer(SubmitAnswerPayload),
    /// Distribute rewards to the top scorer.
    DistributeRewards(LifecyclePayload),
    /// Tolerated unknown message type; logged and dropped.
    #[serde(other)]
    Unknown,
}

/// Payload carried by `join_quiz` messages.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinQuizPayload {
    /// Target room identifier.
    pub quiz_id: String,
    /// External identity of the joining participant.
    pub user_address: String,
    /// Display name of the joining participant.
    pub user_name: String,
}

/// Payload shared by the creator-driven lifecycle messages.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LifecyclePayload {
    /// Target room identifier.
    pub quiz_id: String,
    /// Address of the requester. Carried but not verified against an owner
    /// record; see the trust assumptions in DESIGN.md.
    pub creator_address: String,
}

/// Payload carried by `submit_answer` messages.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerPayload {
    /// Target room identifier.
    pub quiz_id: String,
    /// External identity of the answering participant.
    pub user_address: String,
    /// Index of the question being answered.
    pub question_index: u32,
    /// Opaque answer value, stored as submitted.
    pub answer: Value,
    /// Whether the frontend graded the answer as correct.
    pub is_correct: bool,
}

/// Events pushed to quiz clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A participant joined the room.
    ParticipantJoined(ParticipantJoinedEvent),
    /// Point-in-time room snapshot sent to a newly joined connection.
    QuizStatus(QuizStatusEvent),
    /// The quiz started.
    QuizStarted(QuizStartedEvent),
    /// The quiz ended.
    QuizEnded(QuizEndedEvent),
    /// A participant's score changed.
    ScoreUpdated(ScoreUpdatedEvent),
    /// Rewards were distributed to the winner.
    RewardsDistributed(RewardsDistributedEvent),
    /// A reportable failure, delivered only to the requesting connection.
    Error(ErrorEvent),
}

/// Broadcast when a participant joins a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantJoinedEvent {
    /// Room the participant joined.
    pub quiz_id: String,
    /// The joining participant.
    pub participant: ParticipantSummary,
    /// Room size after the join.
    pub total_participants: usize,
}

/// Targeted snapshot sent to the joining connection.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatusEvent {
    /// Room the snapshot describes.
    pub quiz_id: String,
    /// Current lifecycle status.
    pub status: QuizStatus,
    /// Roster in first-join order.
    pub participants: Vec<ParticipantSnapshot>,
    /// Index of the question currently being played.
    pub current_question: u32,
    /// Set once the quiz has started.
    pub started: bool,
    /// Set once the quiz has ended.
    pub ended: bool,
}

/// Broadcast when the quiz starts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizStartedEvent {
    /// Room that started.
    pub quiz_id: String,
    /// Start time in unix milliseconds.
    pub started_at: i64,
    /// Number of questions in the quiz.
    pub total_questions: u32,
}

/// Broadcast when the quiz ends.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizEndedEvent {
    /// Room that ended.
    pub quiz_id: String,
    /// End time in unix milliseconds.
    pub ended_at: i64,
    /// Final roster with scores.
    pub participants: Vec<ParticipantSnapshot>,
}

/// Broadcast when a participant's score changes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdatedEvent {
    /// Room the update belongs to.
    pub quiz_id: String,
    /// The participant with their refreshed score.
    pub participant: ParticipantSummary,
}

/// Broadcast when rewards are distributed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardsDistributedEvent {
    /// Room the distribution belongs to.
    pub quiz_id: String,
    /// Top scorer receiving the rewards.
    pub winner: ParticipantSummary,
    /// Address that requested the distribution.
    pub distributed_by: String,
}

/// Failure report delivered to the requesting connection only.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Human-readable description of the failure.
    pub message: String,
}
