use std::time::SystemTime;

use crate::{
    dto::{format_system_time, health::HealthResponse},
    state::SharedState,
};

/// Build the health payload with live room and participant counts.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "OK".to_string(),
        timestamp: format_system_time(SystemTime::now()),
        active_quizzes: state.registry().room_count(),
        total_participants: state.registry().participant_count().await,
    }
}
