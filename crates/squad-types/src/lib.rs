//! Shared type definitions for the squad turn simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types flow downstream to `TypeScript` via `ts-rs` for the
//! presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Slug identifiers for actors, zones and items; event sequence numbers
//! - [`enums`] -- Closed vocabularies (roles, actions, target rules, event kinds)
//! - [`structs`] -- Actors, zones, items, events and results
//! - [`actions`] -- The validated action produced by the decision pipeline
//! - [`narration`] -- Narration lines

pub mod actions;
pub mod enums;
pub mod ids;
pub mod narration;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{ValidatedAction, ValidationError};
pub use enums::{
    ActionType, Behavior, EffectClass, EventKind, ItemState, MissionOutcome, NarrationCategory,
    Personality, ResultStatus, Role, StressCause, TargetKind, ValidationErrorKind,
};
pub use ids::{ActorId, EventId, ItemId, ZoneId};
pub use narration::NarrationLine;
pub use structs::{
    Actor, Antagonist, Director, Event, EventResult, Item, MAX_STRESS, Marine, StressChange, Zone,
};

#[cfg(test)]
mod tests {
    //! Type export and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::ActorId::export_all();
        let _ = crate::ids::ZoneId::export_all();
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::EventId::export_all();

        // Enums
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::Personality::export_all();
        let _ = crate::enums::ActionType::export_all();
        let _ = crate::enums::EffectClass::export_all();
        let _ = crate::enums::TargetKind::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::MissionOutcome::export_all();
        let _ = crate::enums::NarrationCategory::export_all();

        // Structs
        let _ = crate::structs::Actor::export_all();
        let _ = crate::structs::Zone::export_all();
        let _ = crate::structs::Event::export_all();
        let _ = crate::actions::ValidatedAction::export_all();
        let _ = crate::narration::NarrationLine::export_all();
    }

    #[test]
    fn actor_serializes_with_role_tag() {
        let actor = crate::Actor::Director(crate::Director {
            id: crate::ActorId::new("director"),
            name: String::from("Director"),
            adjustments: Vec::new(),
            hazard_level: 0,
        });
        let value = serde_json::to_value(&actor).unwrap_or_default();
        assert_eq!(value.get("role").and_then(|v| v.as_str()), Some("director"));
        assert_eq!(actor.position(), None);
        assert!(actor.is_active());
    }
}
