//! Allowed status transitions of a match.
//!
//! ```text
//! IN_PROGRESS --finish--> FINISHED
//! IN_PROGRESS --cancel--> CANCELLED
//! ```
//!
//! Both target states are terminal.

use thiserror::Error;

use crate::dao::models::MatchStatus;

/// Events that move a match through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// Close the match and record its result.
    Finish,
    /// Abandon the match without a result.
    Cancel,
}

/// Error returned when an event cannot be applied to the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {}", .from.as_str())]
pub struct InvalidTransition {
    /// Status the match was in when the event was received.
    pub from: MatchStatus,
    /// The rejected event.
    pub event: MatchEvent,
}

/// Compute the status reached by applying `event` to `from`.
pub fn next_status(
    from: MatchStatus,
    event: MatchEvent,
) -> Result<MatchStatus, InvalidTransition> {
    let next = match (from, event) {
        (MatchStatus::InProgress, MatchEvent::Finish) => MatchStatus::Finished,
        (MatchStatus::InProgress, MatchEvent::Cancel) => MatchStatus::Cancelled,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_can_finish_or_cancel() {
        assert_eq!(
            next_status(MatchStatus::InProgress, MatchEvent::Finish),
            Ok(MatchStatus::Finished)
        );
        assert_eq!(
            next_status(MatchStatus::InProgress, MatchEvent::Cancel),
            Ok(MatchStatus::Cancelled)
        );
    }

    #[test]
    fn terminal_states_reject_every_event() {
        for from in [MatchStatus::Finished, MatchStatus::Cancelled] {
            for event in [MatchEvent::Finish, MatchEvent::Cancel] {
                assert_eq!(
                    next_status(from, event),
                    Err(InvalidTransition { from, event })
                );
            }
        }
    }

    #[test]
    fn error_message_names_status() {
        let err = next_status(MatchStatus::Finished, MatchEvent::Finish).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid transition: Finish cannot be applied while FINISHED"
        );
    }
}
