//! Projection of events onto world state.
//!
//! [`WorldState::apply`] is the only place world state changes. Action
//! events are dispatched on the catalog's [`EffectClass`] for the action;
//! all stress changes happen here, through
//! [`update_stress`](squad_agents::update_stress). Applying the same events
//! to the same initial state always yields the same state and the same
//! results, which is what [`replay`] relies on.

use squad_agents::{ActionCatalog, StressConfig, update_stress};
use squad_types::{
    ActionType, Actor, ActorId, Behavior, EffectClass, Event, EventKind, EventResult, ItemId,
    ItemState, ResultStatus, StressCause, StressChange, ZoneId,
};
use tracing::debug;

use crate::error::ApplyError;
use crate::world::WorldState;

/// Detail key for the 2d6 roll recorded with an `interact` event.
pub const ROLL_DETAIL: &str = "roll";

/// Detail key for why an order was disobeyed.
pub const REASON_DETAIL: &str = "reason";

/// `reason` value for panic overrides.
pub const REASON_PANIC: &str = "panic";

/// `reason` value for failed compliance rolls.
pub const REASON_COMPLIANCE: &str = "compliance";

/// Data the projector needs besides the event itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionRules {
    /// Effect class per action.
    pub catalog: ActionCatalog,
    /// Stress deltas.
    pub stress: StressConfig,
}

/// Accumulates the outcome of one application.
struct Outcome {
    status: ResultStatus,
    summary: String,
    stress_changes: Vec<StressChange>,
}

impl Outcome {
    fn new(status: ResultStatus, summary: impl Into<String>) -> Self {
        Self {
            status,
            summary: summary.into(),
            stress_changes: Vec::new(),
        }
    }

    fn succeeded(summary: impl Into<String>) -> Self {
        Self::new(ResultStatus::Succeeded, summary)
    }

    fn failed(summary: impl Into<String>) -> Self {
        Self::new(ResultStatus::Failed, summary)
    }

    fn no_effect(summary: impl Into<String>) -> Self {
        Self::new(ResultStatus::NoEffect, summary)
    }

    fn finish(self) -> EventResult {
        EventResult {
            status: self.status,
            summary: self.summary,
            stress_changes: self.stress_changes,
        }
    }
}

impl WorldState {
    /// Apply one event and report its effect.
    ///
    /// An event that does not fit the world is rejected before anything
    /// changes.
    pub fn apply(&mut self, event: &Event, rules: &ProjectionRules) -> Result<EventResult, ApplyError> {
        let outcome = match event.kind {
            EventKind::Action => self.apply_action(event, rules)?,
            EventKind::OrderDisobeyed => self.apply_disobedience(event, rules)?,
            EventKind::CommandIssued => Outcome::no_effect("order broadcast"),
            EventKind::Diagnostic => Outcome::no_effect("diagnostic recorded"),
            EventKind::MissionEnded => Outcome::no_effect("mission over"),
        };
        debug!(
            event = %event.id,
            tick = event.tick,
            kind = ?event.kind,
            status = ?outcome.status,
            summary = %outcome.summary,
            "event applied"
        );
        Ok(outcome.finish())
    }

    // -----------------------------------------------------------------------
    // Disobedience
    // -----------------------------------------------------------------------

    fn apply_disobedience(&mut self, event: &Event, rules: &ProjectionRules) -> Result<Outcome, ApplyError> {
        let actor_id = event.actor.clone().ok_or(ApplyError::MissingActor(event.id))?;
        let marine = self
            .marine(&actor_id)
            .ok_or_else(|| self.missing_or_not_marine(&actor_id))?;
        let zone = marine.zone.clone();

        if event.detail_str(REASON_DETAIL) != Some(REASON_PANIC) {
            return Ok(Outcome::no_effect("order ignored"));
        }

        let mut outcome = Outcome::succeeded("panic took over");
        self.stress(&actor_id, StressCause::ForcedOverride, rules, &mut outcome);
        let witnesses: Vec<ActorId> = self
            .marines()
            .filter(|m| m.id != actor_id && m.is_alive() && m.zone == zone)
            .map(|m| m.id.clone())
            .collect();
        for witness in &witnesses {
            self.stress(witness, StressCause::WitnessedPanic, rules, &mut outcome);
        }
        Ok(outcome)
    }

    fn missing_or_not_marine(&self, id: &ActorId) -> ApplyError {
        if self.actors.contains_key(id) {
            ApplyError::NotAMarine(id.clone())
        } else {
            ApplyError::UnknownActor(id.clone())
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn apply_action(&mut self, event: &Event, rules: &ProjectionRules) -> Result<Outcome, ApplyError> {
        let actor_id = event.actor.clone().ok_or(ApplyError::MissingActor(event.id))?;
        let action = event.action.ok_or(ApplyError::MissingAction(event.id))?;
        let spec = rules
            .catalog
            .spec(action)
            .ok_or(ApplyError::UnknownAction(action))?;
        let actor = self
            .actor(&actor_id)
            .ok_or_else(|| ApplyError::UnknownActor(actor_id.clone()))?;

        let mut outcome = if actor.is_active() {
            let target = event.target.as_deref();
            match spec.effect {
                EffectClass::Position => self.apply_position(&actor_id, action, target, rules),
                EffectClass::Inventory => self.apply_inventory(&actor_id, action, target),
                EffectClass::Informational => self.apply_informational(&actor_id, action, target, rules),
                EffectClass::Combat => self.apply_combat(&actor_id, target, rules),
                EffectClass::Environment => self.apply_environment(&actor_id, action, target, event, rules),
            }
        } else {
            Outcome::failed("incapacitated")
        };

        if let Some(marine) = self.actors.get_mut(&actor_id).and_then(Actor::as_marine_mut) {
            marine.last_action = Some(action);
        }
        if outcome.status == ResultStatus::Failed {
            self.stress(&actor_id, StressCause::ActionFailed, rules, &mut outcome);
        }
        Ok(outcome)
    }

    fn apply_position(
        &mut self,
        actor_id: &ActorId,
        action: ActionType,
        target: Option<&str>,
        rules: &ProjectionRules,
    ) -> Outcome {
        let Some(target) = target else {
            return Outcome::no_effect("nowhere to go");
        };
        let dest = ZoneId::new(target);
        let Some(zone) = self.zones.get(&dest) else {
            return Outcome::failed(format!("no zone named {target}"));
        };
        let safe = zone.safe;
        let dest_name = zone.name.clone();
        let Some(actor) = self.actors.get_mut(actor_id) else {
            return Outcome::failed("actor vanished");
        };
        let Some(from) = actor.position().cloned() else {
            return Outcome::failed("has no position");
        };
        if !self.zones.get(&from).is_some_and(|z| z.adjacency.contains(&dest)) {
            return Outcome::failed(format!("{dest_name} is not reachable from {from}"));
        }

        let mut outcome = Outcome::succeeded(format!("moved to {dest_name}"));
        let mut reached_safety = false;
        match actor {
            Actor::Marine(m) => {
                m.zone = dest.clone();
                if safe {
                    m.last_safe_zone = dest;
                    reached_safety = true;
                }
            }
            Actor::Antagonist(a) => {
                a.zone = dest;
                if action == ActionType::Stalk {
                    a.behavior = Behavior::Stalking;
                }
            }
            Actor::Director(_) => return Outcome::failed("has no position"),
        }
        if reached_safety {
            self.stress(actor_id, StressCause::SafeZoneReached, rules, &mut outcome);
        }
        outcome
    }

    fn apply_inventory(&mut self, actor_id: &ActorId, action: ActionType, target: Option<&str>) -> Outcome {
        let Some(target) = target else {
            return Outcome::failed("no item named");
        };
        let item_id = ItemId::new(target);
        let Some(Actor::Marine(marine)) = self.actors.get_mut(actor_id) else {
            return Outcome::failed("only marines carry items");
        };
        let Some(zone) = self.zones.get_mut(&marine.zone) else {
            return Outcome::failed("standing nowhere");
        };
        match action {
            ActionType::Take => {
                let takeable = zone
                    .items
                    .get(&item_id)
                    .is_some_and(|i| i.portable && !i.hidden);
                if !takeable {
                    return Outcome::failed(format!("cannot take {target}"));
                }
                match zone.items.remove(&item_id) {
                    Some(mut item) => {
                        item.state = ItemState::Carried;
                        let name = item.name.clone();
                        marine.inventory.insert(item_id, item);
                        Outcome::succeeded(format!("picked up {name}"))
                    }
                    None => Outcome::failed(format!("cannot take {target}")),
                }
            }
            ActionType::Drop => match marine.inventory.remove(&item_id) {
                Some(mut item) => {
                    item.state = ItemState::Full;
                    item.hidden = false;
                    let name = item.name.clone();
                    zone.items.insert(item_id, item);
                    Outcome::succeeded(format!("dropped {name}"))
                }
                None => Outcome::failed(format!("not carrying {target}")),
            },
            _ => Outcome::failed(format!("{action} does not move items")),
        }
    }

    fn apply_informational(
        &mut self,
        actor_id: &ActorId,
        action: ActionType,
        target: Option<&str>,
        rules: &ProjectionRules,
    ) -> Outcome {
        match action {
            ActionType::Search => self.apply_search(actor_id, target),
            ActionType::HoldPosition => {
                let mut outcome = Outcome::no_effect("held position");
                self.stress(actor_id, StressCause::Recovery, rules, &mut outcome);
                if !outcome.stress_changes.is_empty() {
                    outcome.status = ResultStatus::Succeeded;
                }
                outcome
            }
            ActionType::Hide => match self.actors.get_mut(actor_id) {
                Some(Actor::Antagonist(a)) => {
                    a.hidden = true;
                    a.behavior = Behavior::Inactive;
                    Outcome::succeeded("vanished from sight")
                }
                _ => Outcome::failed("nowhere to hide"),
            },
            ActionType::Lurk => {
                if let Some(Actor::Antagonist(a)) = self.actors.get_mut(actor_id) {
                    a.behavior = Behavior::Inactive;
                }
                Outcome::no_effect("waited in the dark")
            }
            ActionType::Freeze => Outcome::no_effect("frozen in place"),
            ActionType::Report => Outcome::no_effect("reported in"),
            _ => Outcome::no_effect(action.as_str()),
        }
    }

    /// Searching the zone reveals its hidden items; searching something in
    /// it only looks it over. Untargeted searches sweep the zone.
    fn apply_search(&mut self, actor_id: &ActorId, target: Option<&str>) -> Outcome {
        let Some(zone_id) = self.actors.get(actor_id).and_then(Actor::position).cloned() else {
            return Outcome::failed("standing nowhere");
        };
        let Some(zone) = self.zones.get_mut(&zone_id) else {
            return Outcome::failed("standing nowhere");
        };

        match target {
            Some(target) if target != zone_id.as_str() => {
                if let Some(item) = zone.items.get(&ItemId::new(target)).filter(|i| !i.hidden) {
                    return Outcome::no_effect(format!("examined {}", item.name));
                }
                let other = ActorId::new(target);
                match self.actors.get(&other) {
                    Some(actor) if actor.position() == Some(&zone_id) && actor.is_visible() => {
                        Outcome::no_effect(format!("looked over {}", actor.name()))
                    }
                    _ => Outcome::failed(format!("nothing called {target} here")),
                }
            }
            _ => {
                let found: Vec<String> = zone
                    .items
                    .values_mut()
                    .filter(|i| i.hidden)
                    .map(|i| {
                        i.hidden = false;
                        i.name.clone()
                    })
                    .collect();
                if found.is_empty() {
                    Outcome::no_effect("found nothing new")
                } else {
                    Outcome::succeeded(format!("found {}", found.join(", ")))
                }
            }
        }
    }

    fn apply_combat(&mut self, actor_id: &ActorId, target: Option<&str>, rules: &ProjectionRules) -> Outcome {
        let Some(target) = target else {
            return Outcome::no_effect("attacked at shadows");
        };
        let target_id = ActorId::new(target);
        let attacker_zone = self.actors.get(actor_id).and_then(Actor::position).cloned();
        let Some(victim) = self.actors.get(&target_id) else {
            return Outcome::failed(format!("no one named {target}"));
        };
        if target_id == *actor_id || !victim.is_active() || victim.position() != attacker_zone.as_ref() {
            return Outcome::failed(format!("{} is out of reach", victim.name()));
        }
        let victim_name = victim.name().to_owned();

        if let Some(Actor::Antagonist(a)) = self.actors.get_mut(actor_id) {
            a.hidden = false;
            a.behavior = Behavior::Attacking;
        }

        match self.actors.get_mut(&target_id) {
            Some(Actor::Marine(m)) => {
                m.health = m.health.saturating_sub(1);
                let summary = if m.is_alive() {
                    format!("wounded {victim_name}")
                } else {
                    format!("took down {victim_name}")
                };
                let mut outcome = Outcome::succeeded(summary);
                self.stress(&target_id, StressCause::DamageTaken, rules, &mut outcome);
                outcome
            }
            Some(Actor::Antagonist(a)) => {
                a.hidden = true;
                a.behavior = Behavior::Inactive;
                Outcome::succeeded(format!("drove off {victim_name}"))
            }
            _ => Outcome::failed(format!("{victim_name} cannot be hurt")),
        }
    }

    fn apply_environment(
        &mut self,
        actor_id: &ActorId,
        action: ActionType,
        target: Option<&str>,
        event: &Event,
        rules: &ProjectionRules,
    ) -> Outcome {
        if action == ActionType::Interact {
            return self.apply_interact(actor_id, target, event);
        }
        if action == ActionType::AmbientNoise {
            self.record_adjustment(actor_id, "ambient noise echoes through the ship".to_owned(), false);
            return Outcome::succeeded("made the ship groan");
        }
        let Some(zone_id) = target.map(ZoneId::new).filter(|z| self.zones.contains_key(z)) else {
            return Outcome::failed("no such zone");
        };
        match action {
            ActionType::FlickerLights => {
                self.record_adjustment(actor_id, format!("lights flicker in {zone_id}"), false);
                Outcome::succeeded(format!("lights flickered in {zone_id}"))
            }
            ActionType::VentSteam => {
                self.record_adjustment(actor_id, format!("steam vents in {zone_id}"), true);
                let mut outcome = Outcome::succeeded(format!("steam flooded {zone_id}"));
                let caught: Vec<ActorId> = self
                    .marines()
                    .filter(|m| m.is_alive() && m.zone == zone_id)
                    .map(|m| m.id.clone())
                    .collect();
                for marine in &caught {
                    self.stress(marine, StressCause::Hazard, rules, &mut outcome);
                }
                outcome
            }
            ActionType::LockDown => {
                self.record_adjustment(actor_id, format!("lockdown in {zone_id}"), false);
                let Some(zone) = self.zones.get_mut(&zone_id) else {
                    return Outcome::failed("no such zone");
                };
                let mut sealed = 0_usize;
                for item in zone.items.values_mut().filter(|i| i.state == ItemState::Unlocked) {
                    item.state = ItemState::Locked;
                    sealed = sealed.saturating_add(1);
                }
                if sealed == 0 {
                    Outcome::no_effect(format!("nothing to seal in {zone_id}"))
                } else {
                    Outcome::succeeded(format!("sealed {sealed} fixtures in {zone_id}"))
                }
            }
            _ => Outcome::no_effect(action.as_str()),
        }
    }

    fn apply_interact(&mut self, actor_id: &ActorId, target: Option<&str>, event: &Event) -> Outcome {
        let Some(target) = target else {
            return Outcome::failed("nothing to interact with");
        };
        let item_id = ItemId::new(target);
        let Some(zone_id) = self.actors.get(actor_id).and_then(Actor::position).cloned() else {
            return Outcome::failed("standing nowhere");
        };
        let Some(item) = self
            .zones
            .get_mut(&zone_id)
            .and_then(|z| z.items.get_mut(&item_id))
            .filter(|i| !i.hidden)
        else {
            return Outcome::failed(format!("no {target} here"));
        };
        match item.state {
            ItemState::Locked => {
                let roll = event.detail_u64(ROLL_DETAIL).unwrap_or(0);
                match item.difficulty {
                    Some(difficulty) if roll >= u64::from(difficulty) => {
                        item.state = ItemState::Unlocked;
                        Outcome::succeeded(format!("opened {} (rolled {roll})", item.name))
                    }
                    Some(difficulty) => Outcome::failed(format!(
                        "could not open {} (rolled {roll}, needed {difficulty})",
                        item.name
                    )),
                    None => Outcome::failed(format!("{} will not budge", item.name)),
                }
            }
            ItemState::Unlocked => {
                item.state = ItemState::Locked;
                Outcome::succeeded(format!("sealed {}", item.name))
            }
            ItemState::Full => {
                item.state = ItemState::Empty;
                Outcome::succeeded(format!("used {}", item.name))
            }
            ItemState::Empty => Outcome::no_effect(format!("{} is empty", item.name)),
            ItemState::Carried => Outcome::failed(format!("{} is being carried", item.name)),
        }
    }

    fn record_adjustment(&mut self, actor_id: &ActorId, adjustment: String, hazard: bool) {
        if let Some(Actor::Director(d)) = self.actors.get_mut(actor_id) {
            d.adjustments.push(adjustment);
            if hazard {
                d.hazard_level = d.hazard_level.saturating_add(1);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stress
    // -----------------------------------------------------------------------

    /// Apply a configured stress delta to a marine, recording real changes.
    fn stress(&mut self, id: &ActorId, cause: StressCause, rules: &ProjectionRules, outcome: &mut Outcome) {
        let Some(marine) = self.actors.get_mut(id).and_then(Actor::as_marine_mut) else {
            return;
        };
        let delta = rules.stress.delta_for(cause, marine.stress);
        let change = update_stress(marine, delta, cause);
        if change.before != change.after {
            outcome.stress_changes.push(change);
        }
    }
}

/// Rebuild world state by applying `events` to `initial` in order.
pub fn replay(initial: WorldState, events: &[Event], rules: &ProjectionRules) -> Result<WorldState, ApplyError> {
    let mut world = initial;
    for event in events {
        world.apply(event, rules)?;
    }
    Ok(world)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use squad_types::Marine;

    use super::*;
    use crate::log::{EventDraft, EventLog};
    use crate::world::tests::{marine, station};

    fn act(log: &mut EventLog, world: &mut WorldState, draft: EventDraft) -> EventResult {
        let rules = ProjectionRules::default();
        let id = log.append(draft).unwrap();
        let event = log.get(id).cloned().unwrap();
        let result = world.apply(&event, &rules).unwrap();
        log.attach_result(id, result.clone()).unwrap();
        result
    }

    fn action(actor: &str, action: ActionType, target: Option<&str>) -> EventDraft {
        EventDraft::new(EventKind::Action, 1, 1)
            .actor(&ActorId::new(actor))
            .action(action)
            .target(target.map(ToOwned::to_owned))
    }

    fn hudson(world: &WorldState) -> &Marine {
        world.marine(&ActorId::new("hudson")).unwrap()
    }

    #[test]
    fn move_into_safe_zone_resets_stress() {
        let mut world = station();
        if let Some(Actor::Marine(m)) = world.actors.get_mut(&ActorId::new("hudson")) {
            m.stress = 6;
        }
        let mut log = EventLog::new();
        let result = act(&mut log, &mut world, action("hudson", ActionType::Move, Some("dropship")));
        assert_eq!(result.status, ResultStatus::Succeeded);
        assert_eq!(hudson(&world).zone, ZoneId::new("dropship"));
        assert_eq!(hudson(&world).stress, 0);
        assert_eq!(result.stress_changes.len(), 1);
    }

    #[test]
    fn unreachable_move_fails_and_stresses() {
        let mut world = station();
        let mut log = EventLog::new();
        let result = act(&mut log, &mut world, action("hudson", ActionType::Move, Some("reactor")));
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(hudson(&world).zone, ZoneId::new("corridor"));
        assert_eq!(hudson(&world).stress, 1);
        assert_eq!(hudson(&world).last_action, Some(ActionType::Move));
    }

    #[test]
    fn search_reveals_then_take_and_drop() {
        let mut world = station();
        let mut log = EventLog::new();
        let early = act(&mut log, &mut world, action("vasquez", ActionType::Take, Some("ammo_cache")));
        assert_eq!(early.status, ResultStatus::Failed);

        let crates = act(&mut log, &mut world, action("vasquez", ActionType::Search, Some("data_core")));
        assert_eq!(crates.status, ResultStatus::NoEffect);
        assert!(world.zones[&ZoneId::new("storage")].items[&ItemId::new("ammo_cache")].hidden);

        let found = act(&mut log, &mut world, action("vasquez", ActionType::Search, Some("storage")));
        assert_eq!(found.status, ResultStatus::Succeeded);
        let taken = act(&mut log, &mut world, action("vasquez", ActionType::Take, Some("ammo_cache")));
        assert_eq!(taken.status, ResultStatus::Succeeded);
        let vasquez = world.marine(&ActorId::new("vasquez")).unwrap();
        assert_eq!(
            vasquez.inventory.get(&ItemId::new("ammo_cache")).map(|i| i.state),
            Some(ItemState::Carried)
        );

        let dropped = act(&mut log, &mut world, action("vasquez", ActionType::Drop, Some("ammo_cache")));
        assert_eq!(dropped.status, ResultStatus::Succeeded);
        assert!(world.zones[&ZoneId::new("storage")].items.contains_key(&ItemId::new("ammo_cache")));
    }

    #[test]
    fn searching_for_something_elsewhere_fails() {
        let mut world = station();
        let mut log = EventLog::new();
        let result = act(&mut log, &mut world, action("hudson", ActionType::Search, Some("data_core")));
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(hudson(&world).stress, 1);
        assert!(world.zones[&ZoneId::new("storage")].items[&ItemId::new("ammo_cache")].hidden);
    }

    #[test]
    fn antagonist_attack_wounds_and_reveals() {
        let mut world = station();
        if let Some(Actor::Antagonist(a)) = world.actors.get_mut(&ActorId::new("xeno")) {
            a.zone = ZoneId::new("corridor");
        }
        let mut log = EventLog::new();
        let result = act(&mut log, &mut world, action("xeno", ActionType::Attack, Some("hudson")));
        assert_eq!(result.status, ResultStatus::Succeeded);
        assert_eq!(hudson(&world).health, 2);
        assert_eq!(hudson(&world).stress, 2);
        assert!(world.actor(&ActorId::new("xeno")).unwrap().is_visible());
    }

    #[test]
    fn interact_uses_recorded_roll() {
        let mut world = station();
        if let Some(Actor::Marine(m)) = world.actors.get_mut(&ActorId::new("hudson")) {
            m.zone = ZoneId::new("medbay");
        }
        let mut log = EventLog::new();
        let low = act(
            &mut log,
            &mut world,
            action("hudson", ActionType::Interact, Some("door_panel")).detail(ROLL_DETAIL, 5),
        );
        assert_eq!(low.status, ResultStatus::Failed);
        let high = act(
            &mut log,
            &mut world,
            action("hudson", ActionType::Interact, Some("door_panel")).detail(ROLL_DETAIL, 9),
        );
        assert_eq!(high.status, ResultStatus::Succeeded);
        assert_eq!(
            world.zones[&ZoneId::new("medbay")].items[&ItemId::new("door_panel")].state,
            ItemState::Unlocked
        );
    }

    #[test]
    fn panic_disobedience_stresses_witnesses() {
        let mut world = station();
        world
            .actors
            .insert(ActorId::new("miller"), marine("miller", "corridor", 2));
        let mut log = EventLog::new();
        let draft = EventDraft::new(EventKind::OrderDisobeyed, 1, 1)
            .actor(&ActorId::new("hudson"))
            .detail(REASON_DETAIL, REASON_PANIC);
        let result = act(&mut log, &mut world, draft);
        assert_eq!(result.stress_changes.len(), 2);
        assert_eq!(hudson(&world).stress, 1);
        assert_eq!(world.marine(&ActorId::new("miller")).unwrap().stress, 3);
        assert_eq!(world.marine(&ActorId::new("vasquez")).unwrap().stress, 0);
    }

    #[test]
    fn vent_steam_is_a_hazard() {
        let mut world = station();
        let mut log = EventLog::new();
        let result = act(&mut log, &mut world, action("director", ActionType::VentSteam, Some("storage")));
        assert_eq!(result.status, ResultStatus::Succeeded);
        assert_eq!(world.marine(&ActorId::new("vasquez")).unwrap().stress, 1);
        assert_eq!(hudson(&world).stress, 0);
    }

    #[test]
    fn replay_reproduces_incremental_state() {
        let initial = station();
        let mut world = initial.clone();
        let mut log = EventLog::new();
        act(&mut log, &mut world, action("vasquez", ActionType::Search, Some("storage")));
        act(&mut log, &mut world, action("vasquez", ActionType::Take, Some("data_core")));
        act(&mut log, &mut world, action("vasquez", ActionType::Move, Some("corridor")));
        act(&mut log, &mut world, action("xeno", ActionType::Stalk, Some("storage")));
        act(&mut log, &mut world, action("director", ActionType::VentSteam, Some("corridor")));
        act(&mut log, &mut world, action("hudson", ActionType::HoldPosition, None));
        act(&mut log, &mut world, action("vasquez", ActionType::Move, Some("dropship")));

        let rebuilt = replay(initial, log.events(), &ProjectionRules::default()).unwrap();
        assert_eq!(rebuilt, world);
    }

    #[test]
    fn structurally_broken_events_are_errors() {
        let mut world = station();
        let rules = ProjectionRules::default();
        let mut log = EventLog::new();
        let id = log.append(EventDraft::new(EventKind::Action, 1, 1)).unwrap();
        let event = log.get(id).cloned().unwrap();
        assert_eq!(world.apply(&event, &rules), Err(ApplyError::MissingActor(id)));

        let id = log
            .append(EventDraft::new(EventKind::OrderDisobeyed, 1, 1).actor(&ActorId::new("xeno")))
            .unwrap();
        let event = log.get(id).cloned().unwrap();
        assert_eq!(
            world.apply(&event, &rules),
            Err(ApplyError::NotAMarine(ActorId::new("xeno")))
        );
    }
}
