//! Turn clock, decision pipeline and round orchestration for the squad
//! simulation.
//!
//! This crate owns the round cycle that drives a mission: Command,
//! Director turn, Antagonist turn, Marine turns and the terminal check.
//!
//! # Modules
//!
//! - [`clock`] -- Round and tick counters owned by the orchestrator.
//! - [`config`] -- Configuration loading from `squad-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`ReasoningCollaborator`] trait, the decision pipeline
//!   and [`ScriptedCollaborator`].
//! - [`narration`] -- In-fiction narration derived from logged events.
//! - [`perception`] -- Per-actor observation assembly from world state.
//! - [`retry`] -- Bounded retry with a validity predicate.
//! - [`round`] -- The round cycle engine loop.
//! - [`scenario`] -- The built-in starting mission.
//! - [`terminal`] -- Mission end conditions.
//!
//! [`ReasoningCollaborator`]: decision::ReasoningCollaborator
//! [`ScriptedCollaborator`]: decision::ScriptedCollaborator

pub mod clock;
pub mod config;
pub mod decision;
pub mod narration;
pub mod perception;
pub mod retry;
pub mod round;
pub mod scenario;
pub mod terminal;

pub use clock::TurnClock;
pub use config::{ConfigError, SimulationConfig};
pub use decision::{CollaboratorError, ContextPackage, ReasoningCollaborator, Scripted, ScriptedCollaborator};
pub use round::{RoundError, RoundPhase, RoundSummary, SimulationState, TurnEngine};
pub use terminal::{MissionStatus, Verdict, evaluate};
