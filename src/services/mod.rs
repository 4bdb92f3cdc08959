//! Service layer sitting between the route handlers and the shared state.

pub mod documentation;
pub mod health_service;
pub mod quiz_service;
pub mod session_service;
pub mod sponsor_service;
pub mod websocket_service;
pub mod ws_events;
