//! The append-only event log.
//!
//! # Design
//!
//! - **Append-only**: events are never modified or deleted.
//! - **Single result**: an event's result is attached exactly once, after
//!   the event has been applied to world state. [`EventLog::preview`] and
//!   [`EventLog::commit`] let a caller apply first and log second, so an
//!   event the world rejects never reaches the log.
//! - **Ordered**: ticks never go backwards; events sharing a tick keep
//!   their append order.
//! - **Deterministic ids**: ids are the append position, so seeded runs
//!   serialize identically.

use std::collections::BTreeMap;

use serde::Serialize;
use squad_types::{ActionType, ActorId, Event, EventId, EventKind, EventResult};

use crate::error::LogError;

/// An event that has not been appended yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    round: u32,
    tick: u64,
    kind: EventKind,
    actor: Option<ActorId>,
    action: Option<ActionType>,
    target: Option<String>,
    details: BTreeMap<String, serde_json::Value>,
}

impl EventDraft {
    /// Start a draft of the given kind.
    pub const fn new(kind: EventKind, round: u32, tick: u64) -> Self {
        Self {
            round,
            tick,
            kind,
            actor: None,
            action: None,
            target: None,
            details: BTreeMap::new(),
        }
    }

    /// Set the acting actor.
    #[must_use]
    pub fn actor(mut self, actor: &ActorId) -> Self {
        self.actor = Some(actor.clone());
        self
    }

    /// Set the action performed.
    #[must_use]
    pub const fn action(mut self, action: ActionType) -> Self {
        self.action = Some(action);
        self
    }

    /// Set the canonical target.
    #[must_use]
    pub fn target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    /// Add a detail. Values that fail to serialize are recorded as null.
    #[must_use]
    pub fn detail(mut self, key: &str, value: impl Serialize) -> Self {
        self.details.insert(
            key.to_owned(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
        self
    }
}

/// The event log for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append a draft and return the id it was assigned.
    pub fn append(&mut self, draft: EventDraft) -> Result<EventId, LogError> {
        let event = self.preview(draft)?;
        let id = event.id;
        self.events.push(event);
        Ok(id)
    }

    /// The event a draft would become if appended now. Nothing is logged.
    pub fn preview(&self, draft: EventDraft) -> Result<Event, LogError> {
        if let Some(last) = self.events.last()
            && draft.tick < last.tick
        {
            return Err(LogError::TickRegression {
                tick: draft.tick,
                last: last.tick,
            });
        }
        Ok(Event {
            id: self.next_id(),
            round: draft.round,
            tick: draft.tick,
            kind: draft.kind,
            actor: draft.actor,
            action: draft.action,
            target: draft.target,
            details: draft.details,
            result: None,
        })
    }

    /// Append a previewed event together with the result of applying it.
    ///
    /// Fails if anything was appended since the preview.
    pub fn commit(&mut self, mut event: Event, result: EventResult) -> Result<EventId, LogError> {
        let expected = self.next_id();
        if event.id != expected {
            return Err(LogError::StaleEvent {
                id: event.id,
                expected,
            });
        }
        event.result = Some(result);
        self.events.push(event);
        Ok(expected)
    }

    fn next_id(&self) -> EventId {
        EventId(u64::try_from(self.events.len()).unwrap_or(u64::MAX))
    }

    /// Attach the result of applying an event. Allowed once per event.
    pub fn attach_result(&mut self, id: EventId, result: EventResult) -> Result<(), LogError> {
        let event = usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.events.get_mut(idx))
            .ok_or(LogError::UnknownEvent(id))?;
        if event.result.is_some() {
            return Err(LogError::ResultAlreadyAttached(id));
        }
        event.result = Some(result);
        Ok(())
    }

    /// Look up an event.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        usize::try_from(id.0).ok().and_then(|idx| self.events.get(idx))
    }

    /// All events in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The last `window` events, oldest first.
    pub fn recent(&self, window: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(window);
        self.events.get(start..).unwrap_or_default()
    }

    /// Events appended after `cursor` events, oldest first.
    pub fn since(&self, cursor: usize) -> &[Event] {
        self.events.get(cursor..).unwrap_or_default()
    }

    /// Number of events.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serialize the whole log as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }
}
