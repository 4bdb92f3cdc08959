use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::quiz::{CreateQuizRequest, QuizPatch, QuizSummary},
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

/// Configure the quiz metadata routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/quizzes", get(list_quizzes))
        .route("/api/quiz", post(create_quiz))
        .route("/api/quiz/{id}", get(get_quiz).put(update_quiz))
}

#[utoipa::path(
    get,
    path = "/api/quizzes",
    tag = "quiz",
    responses((status = 200, description = "Public quiz records", body = [QuizSummary]))
)]
/// List every quiz marked public.
pub async fn list_quizzes(State(state): State<SharedState>) -> Json<Vec<QuizSummary>> {
    Json(quiz_service::list_public_quizzes(&state).await)
}

#[utoipa::path(
    get,
    path = "/api/quiz/{id}",
    tag = "quiz",
    params(("id" = String, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Quiz record", body = QuizSummary),
        (status = 404, description = "Quiz not found")
    )
)]
/// Fetch a single quiz record.
pub async fn get_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<QuizSummary>, AppError> {
    let summary = quiz_service::get_quiz(&state, &id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/quiz",
    tag = "quiz",
    request_body = CreateQuizRequest,
    responses((status = 200, description = "Quiz created or merged", body = QuizSummary))
)]
/// Create a quiz record, generating an identifier when none is supplied.
pub async fn create_quiz(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateQuizRequest>>,
) -> Json<QuizSummary> {
    Json(quiz_service::create_quiz(&state, payload).await)
}

#[utoipa::path(
    put,
    path = "/api/quiz/{id}",
    tag = "quiz",
    params(("id" = String, Path, description = "Quiz identifier")),
    request_body = QuizPatch,
    responses(
        (status = 200, description = "Quiz updated", body = QuizSummary),
        (status = 404, description = "Quiz not found")
    )
)]
/// Merge metadata fields into an existing quiz record.
pub async fn update_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<QuizPatch>>,
) -> Result<Json<QuizSummary>, AppError> {
    let summary = quiz_service::update_quiz(&state, &id, payload).await?;
    Ok(Json(summary))
}
