//! Perception assembly for one actor's turn.
//!
//! Before each decision the orchestrator builds an [`Observation`] for the
//! acting actor: a summary of the actor itself, a snapshot of what it can
//! see, and the [`ValidationContext`] the validator checks targets against.
//! Both views are built from the same filtered facts, so the collaborator
//! is never shown a target the validator would reject, nor the reverse.
//!
//! Visibility rules:
//!
//! - Hidden items are invisible to everyone until searched out.
//! - A hidden antagonist is invisible to everyone but itself.
//! - Positioned actors only see their own zone; the director has no
//!   position and sees every marine on the station.

use serde::Serialize;
use squad_agents::{ItemRef, Named, ValidationContext};
use squad_events::WorldState;
use squad_types::{
    Actor, ActorId, ItemId, ItemState, Personality, Role, Zone, ZoneId,
};

/// The acting actor as it sees itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    /// Actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Role tag.
    pub role: Role,
    /// Current zone, if the role has one.
    pub zone: Option<ZoneId>,
    /// Marines only.
    pub personality: Option<Personality>,
    /// Marines only.
    pub health: Option<i32>,
    /// Marines only.
    pub stress: Option<u8>,
    /// Names of carried items (marines only).
    pub inventory: Vec<String>,
    /// Whether the actor is concealed (antagonist only).
    pub hidden: bool,
}

/// An item as shown to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleItem {
    /// Item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Current state.
    pub state: ItemState,
    /// Whether it can be picked up.
    pub portable: bool,
}

/// Another actor as shown to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleActor {
    /// Actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Role tag.
    pub role: Role,
    /// Where they are.
    pub zone: Option<ZoneId>,
    /// False for incapacitated marines.
    pub active: bool,
}

/// A zone reference with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleZone {
    /// Zone id.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
}

/// What the actor can see right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneSnapshot {
    /// The actor's zone. `None` for the director.
    pub zone: Option<VisibleZone>,
    /// Description of the actor's zone.
    pub description: String,
    /// Whether the actor's zone is safe.
    pub safe: bool,
    /// Zones one hop away.
    pub exits: Vec<VisibleZone>,
    /// Visible items and fixtures.
    pub items: Vec<VisibleItem>,
    /// Visible other actors.
    pub actors: Vec<VisibleActor>,
}

/// Everything one actor knows at the start of its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// The actor itself.
    pub actor: ActorSummary,
    /// Its surroundings.
    pub snapshot: ZoneSnapshot,
    /// Targets the validator will accept.
    pub validation: ValidationContext,
}

/// Build the observation for an actor. `None` if the actor does not exist.
pub fn observe(world: &WorldState, actor_id: &ActorId) -> Option<Observation> {
    let actor = world.actor(actor_id)?;
    let summary = summarize(actor);
    let all_zones: Vec<Named<ZoneId>> = world.zones.values().map(named_zone).collect();

    let here = actor.position().and_then(|z| world.zone(z));
    let (snapshot, mut validation) = match here {
        Some(zone) => zone_view(world, actor, zone),
        None => director_view(world, actor),
    };
    validation.actor = Some(actor_id.clone());
    validation.all_zones = all_zones;
    validation.personality = actor.personality();
    validation.stress = actor.stress();
    if let Some(marine) = actor.as_marine() {
        validation.carried_items = marine
            .inventory
            .values()
            .map(|i| Named {
                id: i.id.clone(),
                name: i.name.clone(),
            })
            .collect();
    }

    Some(Observation {
        actor: summary,
        snapshot,
        validation,
    })
}

fn summarize(actor: &Actor) -> ActorSummary {
    let marine = actor.as_marine();
    ActorSummary {
        id: actor.id().clone(),
        name: actor.name().to_owned(),
        role: actor.role(),
        zone: actor.position().cloned(),
        personality: actor.personality(),
        health: marine.map(|m| m.health),
        stress: actor.stress(),
        inventory: marine
            .map(|m| m.inventory.values().map(|i| i.name.clone()).collect())
            .unwrap_or_default(),
        hidden: matches!(actor, Actor::Antagonist(a) if a.hidden),
    }
}

fn named_zone(zone: &Zone) -> Named<ZoneId> {
    Named {
        id: zone.id.clone(),
        name: zone.name.clone(),
    }
}

fn visible(actor: &Actor) -> VisibleActor {
    VisibleActor {
        id: actor.id().clone(),
        name: actor.name().to_owned(),
        role: actor.role(),
        zone: actor.position().cloned(),
        active: actor.is_active(),
    }
}

fn zone_view(world: &WorldState, viewer: &Actor, zone: &Zone) -> (ZoneSnapshot, ValidationContext) {
    let exits: Vec<VisibleZone> = zone
        .adjacency
        .iter()
        .filter_map(|id| world.zone(id))
        .map(|z| VisibleZone {
            id: z.id.clone(),
            name: z.name.clone(),
        })
        .collect();
    let items: Vec<VisibleItem> = zone
        .items
        .values()
        .filter(|i| !i.hidden)
        .map(|i| VisibleItem {
            id: i.id.clone(),
            name: i.name.clone(),
            state: i.state,
            portable: i.portable,
        })
        .collect();
    let others: Vec<&Actor> = world
        .occupants(&zone.id)
        .filter(|a| a.id() != viewer.id() && a.is_visible())
        .collect();

    let validation = ValidationContext {
        current_zone: Some(named_zone(zone)),
        adjacent_zones: exits
            .iter()
            .map(|z| Named {
                id: z.id.clone(),
                name: z.name.clone(),
            })
            .collect(),
        zone_items: items
            .iter()
            .map(|i| ItemRef {
                item: Named {
                    id: i.id.clone(),
                    name: i.name.clone(),
                },
                portable: i.portable,
            })
            .collect(),
        zone_actors: others
            .iter()
            .filter(|a| a.is_active())
            .map(|a| Named {
                id: a.id().clone(),
                name: a.name().to_owned(),
            })
            .collect(),
        ..ValidationContext::default()
    };
    let snapshot = ZoneSnapshot {
        zone: Some(VisibleZone {
            id: zone.id.clone(),
            name: zone.name.clone(),
        }),
        description: zone.description.clone(),
        safe: zone.safe,
        exits,
        items,
        actors: others.into_iter().map(visible).collect(),
    };
    (snapshot, validation)
}

fn director_view(world: &WorldState, viewer: &Actor) -> (ZoneSnapshot, ValidationContext) {
    let snapshot = ZoneSnapshot {
        description: "Watching the station from every camera at once.".to_owned(),
        actors: world
            .actors
            .values()
            .filter(|a| a.id() != viewer.id() && a.role() == Role::Marine)
            .map(visible)
            .collect(),
        ..ZoneSnapshot::default()
    };
    (snapshot, ValidationContext::default())
}
