//! REST-facing metadata operations over the quiz room registry.

use tracing::info;

use crate::{
    dto::quiz::{CreateQuizRequest, QuizPatch, QuizSummary},
    error::ServiceError,
    state::{SharedState, room},
};

/// List every quiz marked public, oldest first.
pub async fn list_public_quizzes(state: &SharedState) -> Vec<QuizSummary> {
    let mut summaries = Vec::new();
    for handle in state.registry().rooms() {
        let guard = handle.lock().await;
        if guard.is_public {
            summaries.push(QuizSummary::from(&*guard));
        }
    }
    // The registry map is unordered; creation time gives a stable listing.
    summaries.sort_by_key(|summary| summary.created_at);
    summaries
}

/// Fetch one quiz record by identifier.
pub async fn get_quiz(state: &SharedState, id: &str) -> Result<QuizSummary, ServiceError> {
    let handle = state
        .registry()
        .get(id)
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{id}` not found")))?;
    let guard = handle.lock().await;
    Ok(QuizSummary::from(&*guard))
}

/// Create a quiz record, or merge metadata into an existing one.
///
/// When the client supplies no identifier a collision-resistant one is
/// generated.
pub async fn create_quiz(state: &SharedState, request: CreateQuizRequest) -> QuizSummary {
    let CreateQuizRequest { id, fields } = request;
    let id = id.unwrap_or_else(room::generate_room_id);

    let handle = state.registry().get_or_create(&id);
    let summary = {
        let mut guard = handle.lock().await;
        fields.apply(&mut guard);
        QuizSummary::from(&*guard)
    };

    info!(quiz_id = %id, "quiz created");
    summary
}

/// Merge metadata fields into an existing quiz record.
pub async fn update_quiz(
    state: &SharedState,
    id: &str,
    fields: QuizPatch,
) -> Result<QuizSummary, ServiceError> {
    let handle = state
        .registry()
        .get(id)
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{id}` not found")))?;

    let mut guard = handle.lock().await;
    fields.apply(&mut guard);
    Ok(QuizSummary::from(&*guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;

    fn patch(json: &str) -> QuizPatch {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn create_generates_prefixed_identifier_when_absent() {
        let state = AppState::new(AppConfig::default());
        let summary = create_quiz(
            &state,
            CreateQuizRequest {
                id: None,
                fields: patch(r#"{"title": "Rust 101"}"#),
            },
        )
        .await;

        assert!(summary.id.starts_with("quiz_"));
        assert_eq!(summary.title.as_deref(), Some("Rust 101"));
        assert!(state.registry().get(&summary.id).is_some());
    }

    #[tokio::test]
    async fn create_with_existing_id_merges_instead_of_clobbering() {
        let state = AppState::new(AppConfig::default());
        create_quiz(
            &state,
            CreateQuizRequest {
                id: Some("r1".into()),
                fields: patch(r#"{"title": "First", "isPublic": true}"#),
            },
        )
        .await;
        let merged = create_quiz(
            &state,
            CreateQuizRequest {
                id: Some("r1".into()),
                fields: patch(r#"{"description": "second call"}"#),
            },
        )
        .await;

        assert_eq!(merged.title.as_deref(), Some("First"));
        assert_eq!(merged.description.as_deref(), Some("second call"));
        assert!(merged.is_public);
    }

    #[tokio::test]
    async fn listing_only_returns_public_quizzes() {
        let state = AppState::new(AppConfig::default());
        create_quiz(
            &state,
            CreateQuizRequest {
                id: Some("public".into()),
                fields: patch(r#"{"isPublic": true}"#),
            },
        )
        .await;
        create_quiz(
            &state,
            CreateQuizRequest {
                id: Some("private".into()),
                fields: patch("{}"),
            },
        )
        .await;

        let listed = list_public_quizzes(&state).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "public");
    }

    #[tokio::test]
    async fn update_missing_quiz_reports_not_found() {
        let state = AppState::new(AppConfig::default());
        let err = update_quiz(&state, "ghost", patch(r#"{"title": "x"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
