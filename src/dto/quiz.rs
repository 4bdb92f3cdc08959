use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::{validate_address, validate_room_id},
    state::room::{Participant, QuizRoom, QuizStatus},
};

/// Compact participant projection carried in broadcast payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    /// External identity of the participant.
    pub address: String,
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: u32,
}

impl From<&Participant> for ParticipantSummary {
    fn from(value: &Participant) -> Self {
        Self {
            address: value.address.clone(),
            name: value.name.clone(),
            score: value.score,
        }
    }
}

/// Full participant projection carried in room snapshots.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSnapshot {
    /// External identity of the participant.
    pub address: String,
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: u32,
    /// Sparse answer log indexed by question index.
    pub answers: Vec<Option<Value>>,
    /// Whether a live connection is currently bound to this participant.
    pub connected: bool,
}

impl From<&Participant> for ParticipantSnapshot {
    fn from(value: &Participant) -> Self {
        Self {
            address: value.address.clone(),
            name: value.name.clone(),
            score: value.score,
            answers: value.answers.clone(),
            connected: value.connected,
        }
    }
}

/// Materialize the ordered roster snapshot for a room.
///
/// Derived from the participant table on every call so scores are always
/// current; the room record never stores a stale copy.
pub fn roster(room: &QuizRoom) -> Vec<ParticipantSnapshot> {
    room.participants.values().map(Into::into).collect()
}

/// Quiz record projection returned by the REST surface.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    /// Unique room identifier.
    pub id: String,
    /// Display title, when supplied.
    pub title: Option<String>,
    /// Free-form description, when supplied.
    pub description: Option<String>,
    /// Whether the quiz appears in the public listing.
    pub is_public: bool,
    /// Address of the creator, when recorded.
    pub creator: Option<String>,
    /// Question count announced at start time, when supplied.
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
    /// Roster snapshot in first-join order.
    pub participants: Vec<ParticipantSnapshot>,
}

impl From<&QuizRoom> for QuizSummary {
    fn from(value: &QuizRoom) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            description: value.description.clone(),
            is_public: value.is_public,
            creator: value.creator.clone(),
            total_questions: value.total_questions,
            status: value.status,
            current_question: value.current_question,
            started: value.started,
            ended: value.ended,
            created_at: value.created_at,
            participants: roster(value),
        }
    }
}

/// Metadata fields accepted by the create and update endpoints.
///
/// Every field is optional; absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizPatch {
    /// Display title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// Free-form description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Whether the quiz appears in the public listing.
    pub is_public: Option<bool>,
    /// Address of the creator.
    #[validate(custom(function = validate_address))]
    pub creator: Option<String>,
    /// Question count announced at start time.
    #[validate(range(min = 1, max = 500))]
    pub total_questions: Option<u32>,
}

impl QuizPatch {
    /// Merge the supplied fields into `room`, leaving absent fields untouched.
    pub fn apply(&self, room: &mut QuizRoom) {
        if let Some(title) = &self.title {
            room.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            room.description = Some(description.clone());
        }
        if let Some(is_public) = self.is_public {
            room.is_public = is_public;
        }
        if let Some(creator) = &self.creator {
            room.creator = Some(creator.clone());
        }
        if let Some(total_questions) = self.total_questions {
            room.total_questions = Some(total_questions);
        }
    }
}

/// Payload creating (or merging into) a quiz record.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    /// Client-supplied identifier; generated when omitted.
    #[validate(custom(function = validate_room_id))]
    pub id: Option<String>,
    /// Metadata fields to set on the record.
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: QuizPatch,
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn patch_applies_only_supplied_fields() {
        let mut room = QuizRoom::new("r1".into());
        room.title = Some("original".into());
        room.is_public = true;

        let patch: QuizPatch =
            serde_json::from_str(r#"{"description": "about rust", "totalQuestions": 10}"#).unwrap();
        patch.apply(&mut room);

        assert_eq!(room.title.as_deref(), Some("original"));
        assert_eq!(room.description.as_deref(), Some("about rust"));
        assert!(room.is_public);
        assert_eq!(room.total_questions, Some(10));
    }

    #[test]
    fn create_request_flattens_metadata_fields() {
        let request: CreateQuizRequest =
            serde_json::from_str(r#"{"id": "quiz_1_abc", "title": "Rust 101", "isPublic": true}"#)
                .unwrap();
        assert_eq!(request.id.as_deref(), Some("quiz_1_abc"));
        assert_eq!(request.fields.title.as_deref(), Some("Rust 101"));
        assert_eq!(request.fields.is_public, Some(true));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_title() {
        let request: CreateQuizRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn summary_serializes_camel_case_and_skips_absent_fields() {
        let mut room = QuizRoom::new("r1".into());
        room.join_participant("0xA", "Alice", Uuid::new_v4());

        let summary = QuizSummary::from(&room);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["id"], "r1");
        assert_eq!(json["status"], "created");
        assert_eq!(json["currentQuestion"], 0);
        assert_eq!(json["participants"][0]["address"], "0xA");
        assert!(json.get("title").is_none());
    }
}
