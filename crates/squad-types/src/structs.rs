//! Core entity structs: actors, zones, items and events.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ActionType, Behavior, EventKind, ItemState, Personality, ResultStatus, Role, StressCause,
};
use crate::ids::{ActorId, EventId, ItemId, ZoneId};

/// Upper bound of the stress scale.
pub const MAX_STRESS: u8 = 10;

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// A squad member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Marine {
    /// Unique identifier.
    pub id: ActorId,
    /// Display name (e.g. "Pvt. Hudson").
    pub name: String,
    /// Personality tag.
    pub personality: Personality,
    /// Remaining hit points. Zero or below means incapacitated for good.
    pub health: i32,
    /// Stress on a 0--10 scale.
    pub stress: u8,
    /// Probability of following orders at zero stress.
    #[ts(as = "String")]
    pub base_compliance: Decimal,
    /// Current zone.
    pub zone: ZoneId,
    /// Most recent safe zone the marine stood in.
    pub last_safe_zone: ZoneId,
    /// Carried items.
    pub inventory: BTreeMap<ItemId, Item>,
    /// The last action this marine performed.
    pub last_action: Option<ActionType>,
}

impl Marine {
    /// Whether the marine can still act.
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// The hidden creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Antagonist {
    /// Unique identifier.
    pub id: ActorId,
    /// Display name, never shown to marines while hidden.
    pub name: String,
    /// Current zone.
    pub zone: ZoneId,
    /// Whether marines can see it.
    pub hidden: bool,
    /// Current behavior.
    pub behavior: Behavior,
}

/// The environmental pacing agent. Has no position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Director {
    /// Unique identifier.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Environmental adjustments made so far, oldest first.
    pub adjustments: Vec<String>,
    /// Number of hazards unleashed.
    pub hazard_level: u32,
}

/// Any participant in the turn order.
///
/// The variant is chosen when the actor is created and carried through
/// serialization as the `role` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "role", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Actor {
    /// A squad member.
    Marine(Marine),
    /// The creature.
    Antagonist(Antagonist),
    /// The environment.
    Director(Director),
}

impl Actor {
    /// The actor's identifier.
    pub const fn id(&self) -> &ActorId {
        match self {
            Self::Marine(m) => &m.id,
            Self::Antagonist(a) => &a.id,
            Self::Director(d) => &d.id,
        }
    }

    /// The actor's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Marine(m) => &m.name,
            Self::Antagonist(a) => &a.name,
            Self::Director(d) => &d.name,
        }
    }

    /// The actor's role.
    pub const fn role(&self) -> Role {
        match self {
            Self::Marine(_) => Role::Marine,
            Self::Antagonist(_) => Role::Antagonist,
            Self::Director(_) => Role::Director,
        }
    }

    /// Zone the actor stands in. The director has none.
    pub const fn position(&self) -> Option<&ZoneId> {
        match self {
            Self::Marine(m) => Some(&m.zone),
            Self::Antagonist(a) => Some(&a.zone),
            Self::Director(_) => None,
        }
    }

    /// Current stress. Only marines carry stress.
    pub const fn stress(&self) -> Option<u8> {
        match self {
            Self::Marine(m) => Some(m.stress),
            _ => None,
        }
    }

    /// Personality tag. Only marines have one.
    pub const fn personality(&self) -> Option<Personality> {
        match self {
            Self::Marine(m) => Some(m.personality),
            _ => None,
        }
    }

    /// Whether the actor still takes turns.
    pub const fn is_active(&self) -> bool {
        match self {
            Self::Marine(m) => m.is_alive(),
            Self::Antagonist(_) | Self::Director(_) => true,
        }
    }

    /// Whether marines can perceive the actor.
    pub const fn is_visible(&self) -> bool {
        match self {
            Self::Antagonist(a) => !a.hidden,
            Self::Marine(_) => true,
            Self::Director(_) => false,
        }
    }

    /// Borrow as a marine.
    pub const fn as_marine(&self) -> Option<&Marine> {
        match self {
            Self::Marine(m) => Some(m),
            _ => None,
        }
    }

    /// Mutably borrow as a marine.
    pub const fn as_marine_mut(&mut self) -> Option<&mut Marine> {
        match self {
            Self::Marine(m) => Some(m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Zones and items
// ---------------------------------------------------------------------------

/// An item or fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Current state.
    pub state: ItemState,
    /// Whether a marine can pick it up.
    pub portable: bool,
    /// Hidden items are revealed by searching the zone.
    pub hidden: bool,
    /// Minimum 2d6 roll to open when locked. `None` means it cannot be forced.
    pub difficulty: Option<u8>,
}

/// A node in the station graph.
///
/// Occupancy is derived from actor positions and never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Unique identifier.
    pub id: ZoneId,
    /// Display name.
    pub name: String,
    /// Flavor text handed to the reasoning collaborator.
    pub description: String,
    /// Whether reaching this zone calms a marine.
    pub safe: bool,
    /// Directly connected zones.
    pub adjacency: Vec<ZoneId>,
    /// Items lying here.
    pub items: BTreeMap<ItemId, Item>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single clamped stress adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StressChange {
    /// The marine affected.
    pub actor: ActorId,
    /// Why it changed.
    pub cause: StressCause,
    /// Stress before.
    pub before: u8,
    /// Stress after clamping.
    pub after: u8,
}

/// The effect an event had once applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventResult {
    /// Whether the event changed anything.
    pub status: ResultStatus,
    /// Short human-readable summary.
    pub summary: String,
    /// Stress adjustments produced by the event.
    pub stress_changes: Vec<StressChange>,
}

/// An immutable record of something that happened.
///
/// Only `result` is ever written after append, and only once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Sequence number within the log.
    pub id: EventId,
    /// The round the event belongs to.
    pub round: u32,
    /// Global ordering key.
    pub tick: u64,
    /// The category of event.
    pub kind: EventKind,
    /// The acting actor, if any.
    pub actor: Option<ActorId>,
    /// The action performed, if any.
    pub action: Option<ActionType>,
    /// Canonical target identifier, if any.
    pub target: Option<String>,
    /// Free-form payload: reasoning, attempt diagnostics, rolls.
    pub details: BTreeMap<String, serde_json::Value>,
    /// Filled in once the event has been applied.
    pub result: Option<EventResult>,
}

impl Event {
    /// Read a string detail.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read an unsigned integer detail.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key).and_then(serde_json::Value::as_u64)
    }
}
