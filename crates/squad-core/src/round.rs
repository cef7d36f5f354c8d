//! Round cycle: the phase loop that drives one mission.
//!
//! Each round runs through these phases:
//!
//! 1. **Command** -- advance the clock and log the commander's order, if
//!    any. The order reaches every marine's context for this round only.
//!
//! 2. **Director turn** -- the director adjusts the environment.
//!
//! 3. **Antagonist turn** -- antagonists act in id order.
//!
//! 4. **Marine turns** -- living marines act by initiative (highest
//!    first, ties by id). Incapacitated marines are skipped without an
//!    event. Each marine's decision passes the panic check and then, in a
//!    round with an order, the compliance roll before it becomes an event.
//!
//! 5. **Terminal check** -- [`evaluate`] the end conditions; a verdict logs
//!    a `mission_ended` event and terminates the simulation.
//!
//! Every event is applied to world state and logged with its result before
//! the next actor acts. A turn that fails is replaced by a `diagnostic`
//! event and the actor's fallback action; the other actors still act. The
//! cycle is deterministic given the same seed, initial state and
//! collaborator outputs.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use squad_agents::{PanicContext, panic_action, panic_band, resolve_compliance};
use squad_events::{ApplyError, EventDraft, EventLog, LogError, WorldState};
use squad_types::{
    ActionType, Actor, ActorId, EventId, EventKind, Marine, Role, ValidatedAction,
};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, TurnClock};
use crate::config::{ConfigError, Rules, SimulationConfig};
use crate::decision::{DecisionPipeline, ReasoningCollaborator, recent_memory};
use crate::narration::{NarrationStream, lines_for, round_banner};
use crate::perception::observe;
use crate::retry::RetryPolicy;
use crate::scenario::starting_world;
use crate::terminal::{MissionStatus, Verdict, evaluate};

/// Keys used in event details.
pub mod details {
    pub use squad_events::{
        REASON_COMPLIANCE, REASON_DETAIL as REASON, REASON_PANIC, ROLL_DETAIL as ROLL,
    };

    /// The commander's order, verbatim.
    pub const COMMAND: &str = "command";
    /// The actor's stated reasoning.
    pub const REASONING: &str = "reasoning";
    /// The actor's spoken line.
    pub const SPEECH: &str = "speech";
    /// Collaborator calls beyond the first.
    pub const RETRIES: &str = "retries";
    /// Whether the fallback table chose the action.
    pub const FALLBACK_USED: &str = "fallback_used";
    /// Per-attempt diagnostics.
    pub const ATTEMPTS: &str = "attempts";
    /// The action the marine meant to take before an override.
    pub const INTENDED: &str = "intended";
    /// Panic response that forced the action.
    pub const PANIC: &str = "panic";
    /// Compliance probability rolled against.
    pub const COMPLIANCE_PROBABILITY: &str = "compliance_probability";
    /// Compliance roll drawn.
    pub const COMPLIANCE_ROLL: &str = "compliance_roll";
    /// Why a turn was abandoned.
    pub const ERROR: &str = "error";
    /// Mission outcome.
    pub const OUTCOME: &str = "outcome";
    /// Why the mission ended.
    pub const VERDICT: &str = "verdict";
}

/// Errors raised while running a round.
///
/// Apply and configuration errors stay inside the failing actor's turn.
/// Clock and log errors, and running a finished mission, halt the round.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    /// The mission is already over.
    #[error("the mission has ended; no further rounds can run")]
    Terminated,

    /// The event log rejected an event.
    #[error("event log error: {source}")]
    Log {
        /// The underlying log error.
        #[from]
        source: LogError,
    },

    /// An event could not be applied to world state.
    #[error("apply error: {source}")]
    Apply {
        /// The underlying apply error.
        #[from]
        source: ApplyError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The rule set is unusable.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}

/// Where the simulation is in its round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the next round.
    Idle,
    /// The director is acting.
    DirectorTurn,
    /// Antagonists are acting.
    AntagonistTurn,
    /// Marines are acting.
    MarineTurns,
    /// All actors have acted; the terminal check is next.
    RoundComplete,
    /// The mission is over.
    Terminated,
}

/// Everything one simulation owns.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current world state.
    pub world: WorldState,
    /// The event log.
    pub log: EventLog,
    /// Round and tick counters.
    pub clock: TurnClock,
    /// Current phase.
    pub phase: RoundPhase,
    /// Narration produced so far.
    pub narration: NarrationStream,
    /// How the mission ended, once it has.
    pub verdict: Option<Verdict>,
    initial: WorldState,
    rng: SmallRng,
}

impl SimulationState {
    /// A fresh simulation over `world`, with randomness seeded from `seed`.
    pub fn new(world: WorldState, seed: u64) -> Self {
        Self {
            initial: world.clone(),
            world,
            log: EventLog::new(),
            clock: TurnClock::new(),
            phase: RoundPhase::Idle,
            narration: NarrationStream::new(),
            verdict: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The world as it was before the first event.
    pub const fn initial(&self) -> &WorldState {
        &self.initial
    }

    /// Whether the mission is over.
    pub const fn is_terminated(&self) -> bool {
        matches!(self.phase, RoundPhase::Terminated)
    }
}

/// What one round did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    /// The round number.
    pub round: u32,
    /// Events appended during the round.
    pub events_logged: usize,
    /// Set when the round ended the mission.
    pub verdict: Option<Verdict>,
}

/// Runs rounds against a collaborator under one rule set.
#[derive(Debug)]
pub struct TurnEngine<C> {
    pipeline: DecisionPipeline<C>,
    rules: Rules,
}

impl<C: ReasoningCollaborator> TurnEngine<C> {
    /// Build an engine, checking the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the catalog, fallback table or
    /// panic bands are inconsistent.
    pub fn new(collaborator: C, config: &SimulationConfig) -> Result<Self, ConfigError> {
        let rules = config.rules()?;
        let pipeline = DecisionPipeline::new(
            collaborator,
            rules.projection.catalog.clone(),
            rules.fallback.clone(),
            RetryPolicy {
                max_retries: rules.decision.max_retries,
            },
            Duration::from_millis(rules.decision.call_timeout_ms),
        );
        Ok(Self { pipeline, rules })
    }

    /// The checked rule set.
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The collaborator in use.
    pub const fn collaborator(&self) -> &C {
        self.pipeline.collaborator()
    }

    /// A fresh simulation of the built-in mission.
    pub fn start(&self) -> SimulationState {
        self.start_with(starting_world(&self.rules.personalities))
    }

    /// A fresh simulation over a custom world.
    pub fn start_with(&self, world: WorldState) -> SimulationState {
        SimulationState::new(world, self.rules.mission.seed)
    }

    /// Run one full round.
    ///
    /// `command` is the commander's order for this round, broadcast
    /// verbatim; an empty string means no order.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::Terminated`] once the mission has ended, and
    /// the log or clock error that halted the round otherwise.
    pub async fn run_round(&self, state: &mut SimulationState, command: &str) -> Result<RoundSummary, RoundError> {
        if state.is_terminated() {
            return Err(RoundError::Terminated);
        }
        let first_event = state.log.len();
        let round = state.clock.begin_round()?;
        info!(round, tick = state.clock.tick(), "Round started");
        state.narration.push(round_banner(round, state.clock.tick()));

        let command = if command.is_empty() {
            None
        } else {
            self.record(state, EventKind::CommandIssued, |d| d.detail(details::COMMAND, command))?;
            Some(command)
        };

        state.phase = RoundPhase::DirectorTurn;
        for id in actors_with_role(&state.world, Role::Director) {
            self.act(state, &id, None).await?;
        }

        state.phase = RoundPhase::AntagonistTurn;
        for id in actors_with_role(&state.world, Role::Antagonist) {
            self.act(state, &id, None).await?;
        }

        state.phase = RoundPhase::MarineTurns;
        for id in self.marine_order(&state.world) {
            if state.world.marine(&id).is_some_and(Marine::is_alive) {
                self.act(state, &id, command).await?;
            } else {
                debug!(round, actor = %id, "Skipping incapacitated marine");
            }
        }

        state.phase = RoundPhase::RoundComplete;
        let verdict = match evaluate(&state.world, &state.clock, &self.rules.mission) {
            MissionStatus::Ongoing => {
                state.phase = RoundPhase::Idle;
                None
            }
            MissionStatus::Ended(verdict) => {
                info!(round, outcome = ?verdict.outcome, reason = %verdict.reason, "Mission ended");
                self.record(state, EventKind::MissionEnded, |d| {
                    d.detail(details::OUTCOME, verdict.outcome)
                        .detail(details::VERDICT, &verdict.reason)
                })?;
                state.phase = RoundPhase::Terminated;
                state.verdict = Some(verdict.clone());
                Some(verdict)
            }
        };

        let events_logged = state.log.len().saturating_sub(first_event);
        info!(round, events = events_logged, "Round complete");
        Ok(RoundSummary {
            round,
            events_logged,
            verdict,
        })
    }

    /// Living marines by initiative, highest first, ties by id.
    fn marine_order(&self, world: &WorldState) -> Vec<ActorId> {
        let mut marines: Vec<(u8, ActorId)> = world
            .marines()
            .filter(|m| m.is_alive())
            .map(|m| (self.rules.personalities.profile(m.personality).initiative, m.id.clone()))
            .collect();
        marines.sort_by(|(ia, a), (ib, b)| ib.cmp(ia).then_with(|| a.cmp(b)));
        marines.into_iter().map(|(_, id)| id).collect()
    }

    // -----------------------------------------------------------------------
    // One actor's turn
    // -----------------------------------------------------------------------

    /// Take one actor's turn, falling back when it fails.
    async fn act(&self, state: &mut SimulationState, actor_id: &ActorId, command: Option<&str>) -> Result<(), RoundError> {
        match self.take_turn(state, actor_id, command).await {
            Ok(()) => Ok(()),
            Err(error) if halts_round(&error) => Err(error),
            Err(error) => self.recover(state, actor_id, &error),
        }
    }

    /// Log why a turn failed, then record the actor's fallback action.
    fn recover(&self, state: &mut SimulationState, actor_id: &ActorId, error: &RoundError) -> Result<(), RoundError> {
        warn!(
            round = state.clock.round(),
            actor = %actor_id,
            error = %error,
            "Turn failed, using fallback"
        );
        self.record(state, EventKind::Diagnostic, |d| {
            d.actor(actor_id).detail(details::ERROR, error.to_string())
        })?;

        let Some(actor) = state.world.actor(actor_id) else {
            return Ok(());
        };
        let fallback = self.rules.fallback.synthesize(
            actor.role(),
            actor.personality(),
            actor.stress().unwrap_or(0),
            0,
        );
        let Some(act) = fallback.action else {
            return Ok(());
        };
        let recorded = self.record(state, EventKind::Action, |d| {
            d.actor(actor_id)
                .action(act)
                .detail(details::REASONING, &fallback.reasoning)
                .detail(details::RETRIES, fallback.retries)
                .detail(details::FALLBACK_USED, true)
        });
        match recorded {
            Ok(_) => Ok(()),
            Err(error) if halts_round(&error) => Err(error),
            Err(error) => {
                warn!(actor = %actor_id, error = %error, "Fallback failed as well");
                Ok(())
            }
        }
    }

    async fn take_turn(&self, state: &mut SimulationState, actor_id: &ActorId, command: Option<&str>) -> Result<(), RoundError> {
        let Some(observation) = observe(&state.world, actor_id) else {
            warn!(actor = %actor_id, "Actor vanished before its turn");
            return Ok(());
        };
        let role = observation.actor.role;
        let memory = recent_memory(
            state.log.events(),
            &state.world,
            role,
            self.rules.decision.memory_window,
        );
        let decision = self.pipeline.decide_traced(&observation, &memory, command).await;

        if decision.action.fallback_used {
            let retries = decision.action.retries;
            self.record(state, EventKind::Diagnostic, |d| {
                d.actor(actor_id)
                    .detail(details::ATTEMPTS, &decision.attempts)
                    .detail(details::RETRIES, retries)
            })?;
        }

        let mut extra: Vec<(&'static str, serde_json::Value)> = Vec::new();
        let marine = state.world.marine(actor_id).cloned();
        let action = match marine {
            Some(marine) => self.resolve_marine(state, &marine, decision.action, command.is_some(), &mut extra)?,
            None => decision.action,
        };
        let Some(act) = action.action else {
            warn!(actor = %actor_id, "Decision carried no action");
            return Ok(());
        };
        if act == ActionType::Interact {
            let roll = roll_2d6(&mut state.rng);
            extra.push((details::ROLL, serde_json::Value::from(roll)));
        }

        let id = self.record(state, EventKind::Action, |d| {
            let mut d = d
                .actor(actor_id)
                .action(act)
                .target(action.target.clone())
                .detail(details::REASONING, &action.reasoning)
                .detail(details::RETRIES, action.retries)
                .detail(details::FALLBACK_USED, action.fallback_used);
            if let Some(speech) = &action.speech {
                d = d.detail(details::SPEECH, speech);
            }
            for (key, value) in extra {
                d = d.detail(key, value);
            }
            d
        })?;
        debug!(
            round = state.clock.round(),
            tick = state.clock.tick(),
            actor = %actor_id,
            action = act.as_str(),
            event = %id,
            "Action logged"
        );
        Ok(())
    }

    /// Panic check, then compliance. Logs an `order_disobeyed` event when
    /// the marine does not carry out its own decision.
    ///
    /// Compliance is only rolled against an order. Without one, or when the
    /// decision already is the fallback, there is nothing to disobey.
    fn resolve_marine(
        &self,
        state: &mut SimulationState,
        marine: &Marine,
        decided: ValidatedAction,
        ordered: bool,
        extra: &mut Vec<(&'static str, serde_json::Value)>,
    ) -> Result<ValidatedAction, RoundError> {
        let intended = decided.action;

        if let Some(response) = panic_band(&self.rules.projection.stress.panic, marine.stress) {
            let context = panic_context(&state.world, marine);
            warn!(
                round = state.clock.round(),
                actor = %marine.id,
                stress = marine.stress,
                response = response.as_str(),
                "Panic override"
            );
            self.record(state, EventKind::OrderDisobeyed, |d| {
                d.actor(&marine.id)
                    .detail(details::REASON, details::REASON_PANIC)
                    .detail(details::PANIC, response.as_str())
                    .detail(details::INTENDED, intended)
            })?;
            let mut forced = panic_action(response, &context, &marine.name);
            forced.retries = decided.retries;
            extra.push((details::PANIC, serde_json::Value::from(response.as_str())));
            return Ok(forced);
        }

        if !ordered || decided.fallback_used {
            return Ok(decided);
        }

        let resolution = resolve_compliance(marine, decided, &self.rules.fallback, &mut state.rng);
        extra.push((
            details::COMPLIANCE_PROBABILITY,
            serde_json::Value::from(resolution.probability.to_string()),
        ));
        extra.push((
            details::COMPLIANCE_ROLL,
            serde_json::Value::from(resolution.roll.to_string()),
        ));
        if resolution.overridden {
            self.record(state, EventKind::OrderDisobeyed, |d| {
                d.actor(&marine.id)
                    .detail(details::REASON, details::REASON_COMPLIANCE)
                    .detail(details::INTENDED, intended)
                    .detail(details::COMPLIANCE_PROBABILITY, resolution.probability.to_string())
                    .detail(details::COMPLIANCE_ROLL, resolution.roll.to_string())
            })?;
        }
        Ok(resolution.final_action)
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Apply an event at the next tick, log it with its result and narrate
    /// it. An event the world rejects is not logged.
    fn record(
        &self,
        state: &mut SimulationState,
        kind: EventKind,
        decorate: impl FnOnce(EventDraft) -> EventDraft,
    ) -> Result<EventId, RoundError> {
        let tick = state.clock.next_tick()?;
        let event = state
            .log
            .preview(decorate(EventDraft::new(kind, state.clock.round(), tick)))?;
        let result = state.world.apply(&event, &self.rules.projection)?;
        let id = state.log.commit(event, result)?;
        if let Some(applied) = state.log.get(id) {
            state.narration.extend(lines_for(applied, &state.world));
        }
        Ok(id)
    }
}

/// Errors no fallback can paper over.
const fn halts_round(error: &RoundError) -> bool {
    matches!(
        error,
        RoundError::Terminated | RoundError::Log { .. } | RoundError::Clock { .. }
    )
}

/// Actors of one role, in id order.
fn actors_with_role(world: &WorldState, role: Role) -> Vec<ActorId> {
    world
        .actors
        .values()
        .filter(|a| a.role() == role)
        .map(|a| a.id().clone())
        .collect()
}

/// Where a panicking marine runs to and whom it lashes out at.
///
/// The fight target is the nearest visible antagonist by graph distance,
/// or failing that the nearest other active actor; ties go by id.
fn panic_context(world: &WorldState, marine: &Marine) -> PanicContext {
    let distances = world.distances_from(&marine.zone);
    let fight_target = world
        .actors
        .values()
        .filter(|a| a.id() != &marine.id && a.is_active() && a.is_visible())
        .filter_map(|a| {
            let distance = a.position().and_then(|z| distances.get(z)).copied()?;
            let hostile = matches!(a, Actor::Antagonist(_));
            Some((!hostile, distance, a.id().clone()))
        })
        .min()
        .map(|(_, _, id)| id);
    PanicContext {
        retreat_to: world.next_hop(&marine.zone, &marine.last_safe_zone),
        fight_target,
    }
}

/// Two six-sided dice.
fn roll_2d6<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    let a: u64 = rng.random_range(1..=6);
    let b: u64 = rng.random_range(1..=6);
    a.saturating_add(b)
}
