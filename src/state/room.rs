use indexmap::IndexMap;
use indexmap::map::Entry;
use rand::distr::{Alphanumeric, SampleString};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::unix_timestamp_ms;

/// Number of random characters appended to generated room identifiers.
const ROOM_ID_SUFFIX_LEN: usize = 9;

/// Lifecycle status of a quiz room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    /// Room exists but the quiz has not started.
    Created,
    /// Questions are being played.
    Started,
    /// The quiz has finished.
    Ended,
}

/// A quiz-taker tracked within one room, keyed by external address.
#[derive(Debug, Clone)]
pub struct Participant {
    /// External identity string (wallet-style address).
    pub address: String,
    /// Display name chosen at join time.
    pub name: String,
    /// Correct-answer count, never decremented within a session.
    pub score: u32,
    /// Sparse answer log indexed by question index.
    pub answers: Vec<Option<Value>>,
    /// Whether a live connection is currently bound to this participant.
    pub connected: bool,
    /// Identifier of the currently associated connection, if any.
    pub connection_id: Option<Uuid>,
}

/// A live quiz session together with its participant table.
///
/// The whole struct is guarded by a single mutex in the registry, so every
/// read-modify-write sequence against a room is serialized.
#[derive(Debug, Clone)]
pub struct QuizRoom {
    /// Unique room identifier.
    pub id: String,
    /// Display title supplied through the metadata endpoints.
    pub title: Option<String>,
    /// Free-form description supplied through the metadata endpoints.
    pub description: Option<String>,
    /// Whether the quiz appears in the public listing.
    pub is_public: bool,
    /// Address of the creator, when one was recorded at creation.
    pub creator: Option<String>,
    /// Question count announced by `quiz_started`; falls back to the configured default.
    pub total_questions: Option<u32>,
    /// Current lifecycle status.
    pub status: QuizStatus,
    /// Index of the question currently being played.
    pub current_question: u32,
    /// Set once the quiz has started.
    pub started: bool,
    /// Set once the quiz has ended.
    pub ended: bool,
    /// Creation time in unix milliseconds.
    pub created_at: i64,
    /// Participants in first-join order, keyed by address.
    pub participants: IndexMap<String, Participant>,
}

impl QuizRoom {
    /// Build a fresh room in the `created` state with an empty participant table.
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: None,
            description: None,
            is_public: false,
            creator: None,
            total_questions: None,
            status: QuizStatus::Created,
            current_question: 0,
            started: false,
            ended: false,
            created_at: unix_timestamp_ms(),
            participants: IndexMap::new(),
        }
    }

    /// Register or re-activate the participant keyed by `address`.
    ///
    /// A rejoin preserves the accumulated score and answers; only the display
    /// name, connectivity flag, and connection association are refreshed. Any
    /// other participant in the room still bound to `connection_id` is released
    /// first, so a connection maps to at most one connected entry per room.
    pub fn join_participant(
        &mut self,
        address: &str,
        name: &str,
        connection_id: Uuid,
    ) -> &Participant {
        for (other_address, other) in self.participants.iter_mut() {
            if other_address != address && other.connection_id == Some(connection_id) {
                other.connection_id = None;
                other.connected = false;
            }
        }

        match self.participants.entry(address.to_string()) {
            Entry::Occupied(entry) => {
                let participant = entry.into_mut();
                participant.name = name.to_string();
                participant.connected = true;
                participant.connection_id = Some(connection_id);
                participant
            }
            Entry::Vacant(entry) => entry.insert(Participant {
                address: address.to_string(),
                name: name.to_string(),
                score: 0,
                answers: Vec::new(),
                connected: true,
                connection_id: Some(connection_id),
            }),
        }
    }

    /// Store an answer for `address` and award a point when it is correct.
    ///
    /// Re-submitting the same question index overwrites the stored answer but
    /// still awards a point when `is_correct` is set; the protocol carries no
    /// dedup key, so score increments are not idempotent.
    pub fn record_answer(
        &mut self,
        address: &str,
        question_index: usize,
        answer: Value,
        is_correct: bool,
    ) -> Option<&Participant> {
        let participant = self.participants.get_mut(address)?;

        if participant.answers.len() <= question_index {
            participant.answers.resize(question_index + 1, None);
        }
        participant.answers[question_index] = Some(answer);

        if is_correct {
            participant.score += 1;
        }

        Some(participant)
    }

    /// Participant with the highest score, ties broken by first-join order.
    pub fn top_scorer(&self) -> Option<&Participant> {
        self.participants
            .values()
            .reduce(|best, candidate| if candidate.score > best.score { candidate } else { best })
    }
}

/// Generate a collision-resistant room identifier.
///
/// Shape: `quiz_<unix-ms>_<9 random lowercase alphanumerics>`. The timestamp
/// keeps identifiers sortable; the random suffix avoids collisions between
/// rooms created in the same millisecond.
pub fn generate_room_id() -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), ROOM_ID_SUFFIX_LEN)
        .to_lowercase();
    format!("quiz_{}_{}", unix_timestamp_ms(), suffix)
}
