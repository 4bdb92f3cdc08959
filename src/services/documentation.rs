use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Live Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::get_quiz,
        crate::routes::quiz::create_quiz,
        crate::routes::quiz::update_quiz,
        crate::routes::sponsor::sponsor_transaction,
        crate::routes::sponsor::sign_sponsored_transaction,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::quiz::QuizSummary,
            crate::dto::quiz::QuizPatch,
            crate::dto::quiz::CreateQuizRequest,
            crate::dto::quiz::ParticipantSummary,
            crate::dto::quiz::ParticipantSnapshot,
            crate::dto::sponsor::SponsorTransactionRequest,
            crate::dto::sponsor::SponsorTransactionResponse,
            crate::dto::sponsor::SignSponsoredRequest,
            crate::dto::sponsor::SignSponsoredResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::state::room::QuizStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Quiz metadata endpoints"),
        (name = "sponsor", description = "Sponsorship proxy endpoints"),
        (name = "ws", description = "WebSocket session protocol"),
    )
)]
pub struct ApiDoc;
