//! Event sourcing and world state projection for the squad turn simulation.
//!
//! Every state change is an immutable event in the [`EventLog`]. The
//! [`WorldState`] is a pure function of the initial state and the log:
//! the orchestrator applies each event as it is appended, and [`replay`]
//! rebuilds the same state from scratch.
//!
//! # Modules
//!
//! - [`log`] -- Append-only event log ([`EventLog`], [`EventDraft`])
//! - [`world`] -- Zones, actors and graph navigation ([`WorldState`])
//! - [`projector`] -- Event application and replay ([`ProjectionRules`], [`replay`])
//! - [`error`] -- Log and projection errors

pub mod error;
pub mod log;
pub mod projector;
pub mod world;

pub use error::{ApplyError, LogError};
pub use log::{EventDraft, EventLog};
pub use projector::{
    REASON_COMPLIANCE, REASON_DETAIL, REASON_PANIC, ROLL_DETAIL, ProjectionRules, replay,
};
pub use world::{ItemLocation, WorldState};
