use thiserror::Error;

use crate::state::room::{QuizRoom, QuizStatus};

/// Lifecycle events driving a quiz room forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Creator starts the quiz from the created state.
    Start,
    /// Creator ends the quiz; valid from any state.
    End,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the room was in when the invalid event was received.
    pub from: QuizStatus,
    /// The event that cannot be applied from this status.
    pub event: LifecycleEvent,
}

/// Compute the next status for `event`, enforcing the strictly forward
/// `created -> started -> ended` flow.
///
/// `End` is accepted from every status so a creator can always shut a quiz
/// down; `Start` is only valid once, from the created state.
pub fn compute_transition(
    from: QuizStatus,
    event: LifecycleEvent,
) -> Result<QuizStatus, InvalidTransition> {
    match (from, event) {
        (QuizStatus::Created, LifecycleEvent::Start) => Ok(QuizStatus::Started),
        (_, LifecycleEvent::End) => Ok(QuizStatus::Ended),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

/// Apply `event` to `room` as a single update under the caller's room lock.
///
/// The redundant `status`/`started`/`ended` trio is kept consistent here and
/// nowhere else.
pub fn apply_transition(
    room: &mut QuizRoom,
    event: LifecycleEvent,
) -> Result<QuizStatus, InvalidTransition> {
    let next = compute_transition(room.status, event)?;

    room.status = next;
    match next {
        QuizStatus::Started => {
            room.started = true;
            room.current_question = 0;
        }
        QuizStatus::Ended => {
            room.ended = true;
        }
        QuizStatus::Created => {}
    }

    Ok(next)
}
