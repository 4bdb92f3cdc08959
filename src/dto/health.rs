use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status; always `"OK"` while the process is serving.
    pub status: String,
    /// RFC-3339 timestamp of the check.
    pub timestamp: String,
    /// Number of rooms currently registered.
    pub active_quizzes: usize,
    /// Total participant count across every room.
    pub total_participants: usize,
}
