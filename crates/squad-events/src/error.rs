//! Error types for the event log and projector.

use squad_types::{ActionType, ActorId, EventId};

/// Errors raised by the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// No event with this id exists.
    #[error("event {0} not found")]
    UnknownEvent(EventId),

    /// The event already carries a result.
    #[error("event {0} already has a result attached")]
    ResultAlreadyAttached(EventId),

    /// A previewed event was committed after the log had moved on.
    #[error("event {id} is stale; the next event is {expected}")]
    StaleEvent {
        /// The id the event was previewed with.
        id: EventId,
        /// The id the log would assign now.
        expected: EventId,
    },

    /// An event was appended with a tick earlier than the log's last tick.
    #[error("tick {tick} is earlier than the last logged tick {last}")]
    TickRegression {
        /// The rejected tick.
        tick: u64,
        /// The last tick in the log.
        last: u64,
    },
}

/// Errors raised when an event cannot be projected onto world state.
///
/// Failed actions are not errors -- they produce a `failed` result. These
/// variants mean the event itself does not fit the world it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The event names an actor the world does not contain.
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    /// An action event without an actor.
    #[error("event {0} is an action without an actor")]
    MissingActor(EventId),

    /// An action event without an action type.
    #[error("event {0} is an action without an action type")]
    MissingAction(EventId),

    /// The action has no catalog entry.
    #[error("action {0} has no catalog entry")]
    UnknownAction(ActionType),

    /// An order-disobeyed event for an actor that is not a marine.
    #[error("actor {0} is not a marine")]
    NotAMarine(ActorId),
}
