//! Enumeration types for the squad simulation.
//!
//! Every closed vocabulary lives here: roles, personalities, the action
//! vocabulary and its structural classes, item and behavior states, event
//! kinds, stress causes and narration channels.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// The role an actor plays. Assigned at creation, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// A squad member taking orders from the commander.
    Marine,
    /// The hidden creature hunting the squad.
    Antagonist,
    /// The environmental pacing agent.
    Director,
}

impl Role {
    /// Every role, in turn order.
    pub const ALL: [Self; 3] = [Self::Director, Self::Antagonist, Self::Marine];

    /// Lowercase name used in logs and prompts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marine => "marine",
            Self::Antagonist => "antagonist",
            Self::Director => "director",
        }
    }
}

/// Personality tag of a marine.
///
/// Drives base compliance, initiative and fallback behavior through the
/// personality table in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Personality {
    /// Acts first, complies least among veterans.
    Aggressive,
    /// Slow to act, holds position under pressure.
    Cautious,
    /// Steady and reliable.
    Professional,
    /// Prone to disobeying once stressed.
    Nervous,
}

/// What the antagonist is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Behavior {
    /// Dormant or waiting.
    Inactive,
    /// Moving toward prey.
    Stalking,
    /// Engaged in an attack.
    Attacking,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The closed action vocabulary shared by every role.
///
/// Which subset a role may propose is configuration data held by the action
/// catalog. `Freeze` is never proposed; it only appears as a panic override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionType {
    // --- Marine ---
    /// Move to an adjacent zone.
    Move,
    /// Search the current zone or something in it. Searching the zone
    /// itself reveals hidden items.
    Search,
    /// Pick up an item in the current zone.
    Take,
    /// Drop a carried item into the current zone.
    Drop,
    /// Operate a fixture or container in the current zone.
    Interact,
    /// Attack an actor in the same zone.
    Attack,
    /// Radio a status report to the commander.
    Report,
    /// Stay put and steady nerves.
    HoldPosition,
    /// Fall back to an adjacent zone.
    Retreat,
    /// Paralyzed by fear. Panic override only.
    Freeze,

    // --- Antagonist ---
    /// Creep into an adjacent zone while staying hidden.
    Stalk,
    /// Vanish from sight.
    Hide,
    /// Wait in the shadows.
    Lurk,

    // --- Director ---
    /// Unsettling sounds through the ship.
    AmbientNoise,
    /// Lights stutter in a zone.
    FlickerLights,
    /// Scalding steam floods a zone.
    VentSteam,
    /// Seal every open fixture in a zone.
    LockDown,
}

impl ActionType {
    /// Every action in the vocabulary.
    pub const ALL: [Self; 17] = [
        Self::Move,
        Self::Search,
        Self::Take,
        Self::Drop,
        Self::Interact,
        Self::Attack,
        Self::Report,
        Self::HoldPosition,
        Self::Retreat,
        Self::Freeze,
        Self::Stalk,
        Self::Hide,
        Self::Lurk,
        Self::AmbientNoise,
        Self::FlickerLights,
        Self::VentSteam,
        Self::LockDown,
    ];

    /// Canonical `snake_case` name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Search => "search",
            Self::Take => "take",
            Self::Drop => "drop",
            Self::Interact => "interact",
            Self::Attack => "attack",
            Self::Report => "report",
            Self::HoldPosition => "hold_position",
            Self::Retreat => "retreat",
            Self::Freeze => "freeze",
            Self::Stalk => "stalk",
            Self::Hide => "hide",
            Self::Lurk => "lurk",
            Self::AmbientNoise => "ambient_noise",
            Self::FlickerLights => "flicker_lights",
            Self::VentSteam => "vent_steam",
            Self::LockDown => "lock_down",
        }
    }

    /// Look up an action by its canonical name. No synonym handling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }
}

impl core::fmt::Display for ActionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What part of the world an action touches. The projector dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EffectClass {
    /// Changes where the actor stands.
    Position,
    /// Moves items between zones and inventories.
    Inventory,
    /// Produces information only (reports, searches, waiting).
    Informational,
    /// Damages or drives off another actor.
    Combat,
    /// Alters fixtures or conditions in a zone.
    Environment,
}

/// Structural target rule for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TargetKind {
    /// No target. Any supplied target is ignored.
    None,
    /// A zone adjacent to the actor's position.
    AdjacentZone,
    /// Any zone on the station.
    AnyZone,
    /// A visible, portable item in the actor's zone.
    ZoneItem,
    /// Any visible item or fixture in the actor's zone.
    ZoneEntity,
    /// Another visible, active actor in the actor's zone.
    ZoneActor,
    /// The actor's own zone, or a visible item, fixture or actor in it.
    Surroundings,
    /// An item the actor is carrying.
    CarriedItem,
}

/// State of an item or fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ItemState {
    /// Stocked or intact.
    Full,
    /// Used up.
    Empty,
    /// Sealed; interacting requires passing its difficulty check.
    Locked,
    /// Open.
    Unlocked,
    /// In a marine's inventory.
    Carried,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Closed vocabulary of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// The commander broadcast an order for the round.
    CommandIssued,
    /// An actor performed an action.
    Action,
    /// A marine discarded its intended action (panic or failed compliance).
    OrderDisobeyed,
    /// Recoverable fault recorded for diagnosis.
    Diagnostic,
    /// The mission reached a terminal outcome.
    MissionEnded,
}

/// Outcome of applying an event to world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResultStatus {
    /// The action changed the world as intended.
    Succeeded,
    /// The action was attempted and failed.
    Failed,
    /// Nothing changed.
    NoEffect,
}

/// Reason a marine's stress changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StressCause {
    /// Took a hit.
    DamageTaken,
    /// An attempted action failed.
    ActionFailed,
    /// Saw a squadmate panic in the same zone.
    WitnessedPanic,
    /// Own intent was overridden by panic.
    ForcedOverride,
    /// Caught in an environmental hazard.
    Hazard,
    /// Arrived in a safe zone.
    SafeZoneReached,
    /// Held position and steadied.
    Recovery,
}

/// Categorized validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ValidationErrorKind {
    /// The candidate is not an object or a field has the wrong type.
    Malformed,
    /// The action is unknown or not in the role's vocabulary.
    UnsupportedAction,
    /// The action needs a target and none was given.
    MissingTarget,
    /// The target does not resolve to anything reachable.
    InvalidTarget,
}

// ---------------------------------------------------------------------------
// Mission and narration
// ---------------------------------------------------------------------------

/// Terminal mission outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MissionOutcome {
    /// Objective extracted with enough survivors.
    Won,
    /// Squad wiped out or out of time.
    Lost,
    /// Objective extracted but too few survivors.
    Partial,
}

/// Channel a narration line is delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NarrationCategory {
    /// Round boundaries and engine notices.
    System,
    /// Orders from the commander.
    Commander,
    /// What an actor visibly did.
    AgentAction,
    /// What an actor said or radioed.
    AgentReport,
    /// Panic and disobedience.
    Panic,
    /// Environmental changes.
    Director,
    /// Mission end.
    GameEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_match_serialized_form() {
        for action in ActionType::ALL {
            let json = serde_json::to_string(&action).ok();
            assert_eq!(json, Some(format!("\"{}\"", action.as_str())));
            assert_eq!(ActionType::from_name(action.as_str()), Some(action));
        }
    }

    #[test]
    fn from_name_rejects_synonyms() {
        assert_eq!(ActionType::from_name("communicate"), None);
        assert_eq!(ActionType::from_name("Move"), None);
    }
}
