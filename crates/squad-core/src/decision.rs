//! The decision pipeline: ask, validate, retry, fall back.
//!
//! During each actor's turn the orchestrator hands the pipeline an
//! [`Observation`] and the actor's recent memory. The pipeline packages
//! them into a [`ContextPackage`], asks the [`ReasoningCollaborator`] for a
//! candidate, and validates it against the action catalog. Invalid
//! candidates are retried with the failure reason fed back; timeouts stop
//! the loop at once. When nothing usable comes back the fallback table
//! decides instead, so [`DecisionPipeline::decide`] always produces a valid
//! action.
//!
//! The collaborator might be an LLM backend, a scripted bot or a test
//! stub. [`ScriptedCollaborator`] is the scripted one.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use squad_agents::{ActionCatalog, FallbackTable, validate};
use squad_events::WorldState;
use squad_types::{ActionType, ActorId, Event, EventKind, ResultStatus, Role, ValidatedAction};
use tracing::{debug, warn};

use crate::perception::{ActorSummary, Observation, ZoneSnapshot};
use crate::retry::{AttemptRecord, AttemptResult, RetryOutcome, RetryPolicy, RetryReport, retry_bounded};

/// Errors a collaborator can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator gave up waiting. Not retried.
    #[error("collaborator timed out")]
    Timeout,

    /// The collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with something unusable.
    #[error("collaborator response malformed: {0}")]
    Malformed(String),
}

/// A source of candidate actions.
///
/// Implementations receive the full [`ContextPackage`] for one attempt and
/// return an arbitrary JSON candidate. The pipeline validates whatever
/// comes back, so implementations never need to check it themselves.
#[allow(async_fn_in_trait)]
pub trait ReasoningCollaborator {
    /// Propose a candidate action.
    async fn propose(&self, context: &ContextPackage) -> Result<Value, CollaboratorError>;
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// One remembered event, as the actor perceives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryEntry {
    /// Round the event happened in.
    pub round: u32,
    /// Tick the event happened at.
    pub tick: u64,
    /// Who acted. `None` when the actor could not tell.
    pub actor: Option<ActorId>,
    /// What was done, if the actor could tell.
    pub action: Option<ActionType>,
    /// What happened.
    pub summary: String,
}

/// The recent events an actor remembers, oldest first.
///
/// Diagnostics are never remembered. Marines perceive the antagonist's
/// movements only as motion-tracker contacts unless it attacks.
pub fn recent_memory(events: &[Event], world: &WorldState, viewer: Role, window: usize) -> Vec<MemoryEntry> {
    let remembered: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind != EventKind::Diagnostic)
        .collect();
    let start = remembered.len().saturating_sub(window);
    remembered
        .get(start..)
        .unwrap_or_default()
        .iter()
        .map(|event| {
            let by_antagonist = event
                .actor
                .as_ref()
                .and_then(|id| world.actor(id))
                .is_some_and(|a| a.role() == Role::Antagonist);
            let concealed = viewer == Role::Marine
                && by_antagonist
                && event.action != Some(ActionType::Attack);
            let summary = if concealed {
                "Motion tracker contact.".to_owned()
            } else {
                describe(event)
            };
            MemoryEntry {
                round: event.round,
                tick: event.tick,
                actor: if concealed { None } else { event.actor.clone() },
                action: if concealed { None } else { event.action },
                summary,
            }
        })
        .collect()
}

fn describe(event: &Event) -> String {
    match event.kind {
        EventKind::CommandIssued => format!(
            "Commander: {}",
            event.detail_str("command").unwrap_or_default()
        ),
        EventKind::OrderDisobeyed => format!(
            "Order disobeyed ({})",
            event.detail_str("reason").unwrap_or("unknown")
        ),
        EventKind::MissionEnded => "Mission over.".to_owned(),
        EventKind::Action | EventKind::Diagnostic => {
            let verdict = event.result.as_ref().map_or("pending", |r| match r.status {
                ResultStatus::Succeeded => "succeeded",
                ResultStatus::Failed => "failed",
                ResultStatus::NoEffect => "no effect",
            });
            let summary = event.result.as_ref().map_or("", |r| r.summary.as_str());
            format!("{verdict}: {summary}")
        }
    }
}

/// Everything the collaborator sees for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextPackage {
    /// The acting actor.
    pub actor: ActorSummary,
    /// What the actor can see.
    pub zone: ZoneSnapshot,
    /// Recent remembered events, oldest first.
    pub recent_events: Vec<MemoryEntry>,
    /// This round's order. Marines only.
    pub command: Option<String>,
    /// The actor's vocabulary.
    pub allowed_actions: Vec<ActionType>,
    /// Why the previous attempt was rejected.
    pub prior_failure: Option<String>,
    /// 1-based attempt number.
    pub attempt: u32,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A decision with its attempt diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The valid action to perform.
    pub action: ValidatedAction,
    /// One record per collaborator call.
    pub attempts: Vec<AttemptRecord>,
}

/// Asks, validates, retries and falls back.
#[derive(Debug)]
pub struct DecisionPipeline<C> {
    collaborator: C,
    catalog: ActionCatalog,
    fallback: FallbackTable,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl<C: ReasoningCollaborator> DecisionPipeline<C> {
    /// Assemble a pipeline.
    pub const fn new(
        collaborator: C,
        catalog: ActionCatalog,
        fallback: FallbackTable,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            collaborator,
            catalog,
            fallback,
            policy,
            call_timeout,
        }
    }

    /// The collaborator in use.
    pub const fn collaborator(&self) -> &C {
        &self.collaborator
    }

    /// Decide on an action. Never fails.
    pub async fn decide(&self, observation: &Observation, memory: &[MemoryEntry], command: Option<&str>) -> ValidatedAction {
        self.decide_traced(observation, memory, command).await.action
    }

    /// Decide on an action and keep the per-attempt diagnostics.
    pub async fn decide_traced(
        &self,
        observation: &Observation,
        memory: &[MemoryEntry],
        command: Option<&str>,
    ) -> Decision {
        let role = observation.actor.role;
        let actor_id = &observation.actor.id;
        let base = ContextPackage {
            actor: observation.actor.clone(),
            zone: observation.snapshot.clone(),
            recent_events: memory.to_vec(),
            command: command.map(ToOwned::to_owned),
            allowed_actions: self.catalog.allowed(role),
            prior_failure: None,
            attempt: 1,
        };
        let timeout_ms = u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX);

        let report = retry_bounded(
            self.policy,
            |attempt| {
                let mut package = base.clone();
                package.attempt = attempt.number;
                package.prior_failure = attempt.prior_failure;
                async move {
                    debug!(actor = %actor_id, attempt = package.attempt, "asking collaborator");
                    match tokio::time::timeout(self.call_timeout, self.collaborator.propose(&package)).await {
                        Err(_elapsed) => AttemptResult::Abort(format!("no answer within {timeout_ms}ms")),
                        Ok(Err(CollaboratorError::Timeout)) => {
                            AttemptResult::Abort(CollaboratorError::Timeout.to_string())
                        }
                        Ok(Err(err)) => AttemptResult::Failed(err.to_string()),
                        Ok(Ok(candidate)) => AttemptResult::Produced(validate(
                            &self.catalog,
                            &candidate,
                            role,
                            &observation.validation,
                        )),
                    }
                }
            },
            |action: &ValidatedAction| {
                if action.valid {
                    Ok(())
                } else {
                    Err(action.failure_reason())
                }
            },
        )
        .await;

        self.conclude(observation, report)
    }

    fn conclude(&self, observation: &Observation, report: RetryReport<ValidatedAction>) -> Decision {
        let retries = report.retries();
        let last_failure = report.last_failure().map(ToOwned::to_owned);
        let RetryReport { outcome, attempts } = report;
        let aborted = matches!(outcome, RetryOutcome::Aborted(_));
        for record in &attempts {
            if let Some(failure) = &record.failure {
                debug!(
                    actor = %observation.actor.id,
                    attempt = record.number,
                    failure = %failure,
                    "attempt rejected"
                );
            }
        }

        let action = match outcome {
            RetryOutcome::Accepted(mut action) => {
                action.retries = retries;
                action
            }
            RetryOutcome::Exhausted | RetryOutcome::Aborted(_) => {
                warn!(
                    actor = %observation.actor.id,
                    attempts = attempts.len(),
                    aborted,
                    last_failure = ?last_failure,
                    "no usable decision, using fallback"
                );
                self.fallback.synthesize(
                    observation.actor.role,
                    observation.actor.personality,
                    observation.actor.stress.unwrap_or(0),
                    retries,
                )
            }
        };
        Decision { action, attempts }
    }
}

// ---------------------------------------------------------------------------
// Scripted collaborator
// ---------------------------------------------------------------------------

/// One scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    /// Return this candidate.
    Respond(Value),
    /// Return this error.
    Fail(CollaboratorError),
    /// Never answer.
    Stall,
}

/// A collaborator that replays per-actor scripts.
///
/// Each call pops the next reply from the actor's queue. Once a queue is
/// empty the actor's role default is returned: marines report in, the
/// antagonist lurks and the director makes ambient noise.
#[derive(Debug, Default)]
pub struct ScriptedCollaborator {
    scripts: Mutex<BTreeMap<ActorId, VecDeque<Scripted>>>,
    calls: Mutex<BTreeMap<ActorId, u32>>,
}

impl ScriptedCollaborator {
    /// A collaborator with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for an actor.
    #[must_use]
    pub fn script(self, actor: &str, replies: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(ActorId::new(actor))
            .or_default()
            .extend(replies);
        self
    }

    /// Queue one more reply for an actor.
    pub fn push(&self, actor: &ActorId, reply: Scripted) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(actor.clone())
            .or_default()
            .push_back(reply);
    }

    /// Calls made on behalf of an actor.
    pub fn calls_for(&self, actor: &str) -> u32 {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ActorId::new(actor))
            .copied()
            .unwrap_or(0)
    }

    /// Calls made in total.
    pub fn total_calls(&self) -> u32 {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .fold(0_u32, |acc, n| acc.saturating_add(*n))
    }

    fn next_reply(&self, actor: &ActorId) -> Option<Scripted> {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let count = calls.entry(actor.clone()).or_insert(0);
        *count = count.saturating_add(1);
        drop(calls);
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(actor)
            .and_then(VecDeque::pop_front)
    }
}

/// The reply used once an actor's script runs out.
pub fn role_default(role: Role) -> Value {
    match role {
        Role::Marine => json!({
            "action": "report",
            "reasoning": "Nothing new to act on. Reporting in.",
        }),
        Role::Antagonist => json!({
            "action": "lurk",
            "reasoning": "Wait in the dark.",
        }),
        Role::Director => json!({
            "action": "ambient_noise",
            "reasoning": "Keep them on edge.",
        }),
    }
}

impl ReasoningCollaborator for ScriptedCollaborator {
    async fn propose(&self, context: &ContextPackage) -> Result<Value, CollaboratorError> {
        match self.next_reply(&context.actor.id) {
            Some(Scripted::Respond(value)) => Ok(value),
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Stall) => std::future::pending().await,
            None => Ok(role_default(context.actor.role)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use squad_agents::{PersonalityTable, fallback::builtin_rules};

    use super::*;
    use crate::perception::observe;
    use crate::scenario::starting_world;

    fn pipeline(collaborator: ScriptedCollaborator, timeout_ms: u64) -> DecisionPipeline<ScriptedCollaborator> {
        let catalog = ActionCatalog::builtin();
        let fallback = FallbackTable::new(builtin_rules(), &catalog).unwrap();
        DecisionPipeline::new(
            collaborator,
            catalog,
            fallback,
            RetryPolicy { max_retries: 2 },
            Duration::from_millis(timeout_ms),
        )
    }

    fn observation(actor: &str) -> Observation {
        let world = starting_world(&PersonalityTable::default());
        observe(&world, &ActorId::new(actor)).unwrap()
    }

    #[tokio::test]
    async fn valid_first_answer_needs_no_retry() {
        let collab = ScriptedCollaborator::new().script(
            "hudson",
            vec![Scripted::Respond(json!({"action": "move", "target": "Dropship", "reasoning": "Fall back."}))],
        );
        let pipeline = pipeline(collab, 1_000);
        let decision = pipeline.decide_traced(&observation("hudson"), &[], Some("fall back")).await;
        assert!(decision.action.valid);
        assert_eq!(decision.action.action, Some(ActionType::Move));
        assert_eq!(decision.action.target.as_deref(), Some("dropship"));
        assert_eq!(decision.action.retries, 0);
        assert_eq!(decision.attempts.len(), 1);
    }

    #[tokio::test]
    async fn invalid_answer_is_retried_with_reason() {
        let collab = ScriptedCollaborator::new().script(
            "hudson",
            vec![
                Scripted::Respond(json!({"action": "dance"})),
                Scripted::Respond(json!({"action": "search", "target": "corridor", "reasoning": "Check the corners."})),
            ],
        );
        let pipeline = pipeline(collab, 1_000);
        let decision = pipeline.decide_traced(&observation("hudson"), &[], None).await;
        assert_eq!(decision.action.action, Some(ActionType::Search));
        assert_eq!(decision.action.target.as_deref(), Some("corridor"));
        assert_eq!(decision.action.retries, 1);
        assert!(!decision.action.fallback_used);
        assert!(decision.attempts.first().and_then(|a| a.failure.as_ref()).is_some());
    }

    #[tokio::test]
    async fn outage_falls_back_after_all_attempts() {
        let collab = ScriptedCollaborator::new().script(
            "miller",
            vec![
                Scripted::Fail(CollaboratorError::Unavailable("503".to_owned())),
                Scripted::Fail(CollaboratorError::Unavailable("503".to_owned())),
                Scripted::Fail(CollaboratorError::Unavailable("503".to_owned())),
            ],
        );
        let pipeline = pipeline(collab, 1_000);
        let action = pipeline.decide(&observation("miller"), &[], None).await;
        assert!(action.valid);
        assert!(action.fallback_used);
        assert_eq!(action.retries, 2);
        assert_eq!(action.action, Some(ActionType::Report));
        assert_eq!(pipeline.collaborator().calls_for("miller"), 3);
    }

    #[tokio::test]
    async fn explicit_timeout_is_not_retried() {
        let collab = ScriptedCollaborator::new().script("director", vec![Scripted::Fail(CollaboratorError::Timeout)]);
        let pipeline = pipeline(collab, 1_000);
        let action = pipeline.decide(&observation("director"), &[], None).await;
        assert!(action.fallback_used);
        assert_eq!(action.action, Some(ActionType::AmbientNoise));
        assert_eq!(pipeline.collaborator().calls_for("director"), 1);
    }

    #[tokio::test]
    async fn stalled_collaborator_hits_the_call_timeout() {
        let collab = ScriptedCollaborator::new().script("xenomorph", vec![Scripted::Stall]);
        let pipeline = pipeline(collab, 20);
        let decision = pipeline.decide_traced(&observation("xenomorph"), &[], None).await;
        assert!(decision.action.fallback_used);
        assert_eq!(decision.action.action, Some(ActionType::Lurk));
        assert_eq!(decision.attempts.len(), 1);
        assert_eq!(decision.action.retries, 0);
    }

    #[test]
    fn memory_drops_diagnostics_and_hides_the_creature() {
        let world = starting_world(&PersonalityTable::default());
        let mut log = squad_events::EventLog::new();
        log.append(squad_events::EventDraft::new(EventKind::Diagnostic, 1, 1)).unwrap();
        log.append(
            squad_events::EventDraft::new(EventKind::Action, 1, 2)
                .actor(&ActorId::new("xenomorph"))
                .action(ActionType::Stalk),
        )
        .unwrap();
        log.append(
            squad_events::EventDraft::new(EventKind::Action, 1, 3)
                .actor(&ActorId::new("hudson"))
                .action(ActionType::Search),
        )
        .unwrap();

        let marine_view = recent_memory(log.events(), &world, Role::Marine, 8);
        assert_eq!(marine_view.len(), 2);
        assert_eq!(marine_view.first().and_then(|m| m.actor.clone()), None);
        let director_view = recent_memory(log.events(), &world, Role::Director, 1);
        assert_eq!(director_view.len(), 1);
        assert_eq!(
            director_view.first().and_then(|m| m.actor.clone()),
            Some(ActorId::new("hudson"))
        );
    }
}
