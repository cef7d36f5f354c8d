//! Stress updates and panic overrides.
//!
//! Stress lives on a 0--10 scale and only changes through
//! [`update_stress`], which the world projector calls while applying
//! events. The panic band table maps high stress onto a forced action that
//! takes precedence over both the collaborator's proposal and the
//! compliance roll.

use squad_types::{
    ActionType, ActorId, MAX_STRESS, Marine, StressCause, StressChange, ValidatedAction, ZoneId,
};

use crate::config::PanicBands;

/// What a panicking marine does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanicResponse {
    /// Does nothing.
    Freeze,
    /// Retreats one hop toward the last known safe zone.
    Flee,
    /// Attacks the nearest hostile, or the nearest other actor.
    Fight,
}

impl PanicResponse {
    /// Lowercase name recorded in event details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Freeze => "freeze",
            Self::Flee => "flee",
            Self::Fight => "fight",
        }
    }
}

/// Targets computed by the orchestrator from world state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanicContext {
    /// Next hop toward the last safe zone. `None` when already there or
    /// when no path exists.
    pub retreat_to: Option<ZoneId>,
    /// Nearest hostile by graph distance, else nearest other active actor.
    pub fight_target: Option<ActorId>,
}

/// Apply a clamped stress delta and report the change.
pub fn update_stress(marine: &mut Marine, delta: i32, cause: StressCause) -> StressChange {
    let before = marine.stress;
    let raw = i32::from(before).saturating_add(delta);
    let after = u8::try_from(raw.clamp(0, i32::from(MAX_STRESS))).unwrap_or(MAX_STRESS);
    marine.stress = after;
    StressChange {
        actor: marine.id.clone(),
        cause,
        before,
        after,
    }
}

/// The panic band for a stress level, if any.
pub const fn panic_band(bands: &PanicBands, stress: u8) -> Option<PanicResponse> {
    if stress >= bands.fight_at {
        Some(PanicResponse::Fight)
    } else if stress >= bands.flee_at {
        Some(PanicResponse::Flee)
    } else if stress >= bands.freeze_at {
        Some(PanicResponse::Freeze)
    } else {
        None
    }
}

/// Build the forced action for a panic response.
///
/// Forced actions bypass the role vocabulary. Flee with nowhere to go and
/// fight with nobody to hit still produce their action with no target.
pub fn panic_action(response: PanicResponse, context: &PanicContext, marine_name: &str) -> ValidatedAction {
    let (action, target, reasoning) = match response {
        PanicResponse::Freeze => (
            ActionType::Freeze,
            None,
            format!("{marine_name} freezes, unable to move."),
        ),
        PanicResponse::Flee => (
            ActionType::Retreat,
            context.retreat_to.as_ref().map(ToString::to_string),
            format!("{marine_name} breaks and runs for safety."),
        ),
        PanicResponse::Fight => (
            ActionType::Attack,
            context.fight_target.as_ref().map(ToString::to_string),
            format!("{marine_name} lashes out blindly."),
        ),
    };
    ValidatedAction::accepted(action, target, reasoning)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal_macros::dec;
    use squad_types::Personality;

    use super::*;

    fn hudson(stress: u8) -> Marine {
        Marine {
            id: ActorId::new("hudson"),
            name: "Pvt. Hudson".to_owned(),
            personality: Personality::Aggressive,
            health: 3,
            stress,
            base_compliance: dec!(0.7),
            zone: ZoneId::new("corridor"),
            last_safe_zone: ZoneId::new("dropship"),
            inventory: BTreeMap::new(),
            last_action: None,
        }
    }

    #[test]
    fn stress_is_clamped() {
        let mut m = hudson(9);
        let change = update_stress(&mut m, 5, StressCause::DamageTaken);
        assert_eq!((change.before, change.after), (9, 10));
        let change = update_stress(&mut m, -40, StressCause::SafeZoneReached);
        assert_eq!(change.after, 0);
        assert_eq!(m.stress, 0);
        let change = update_stress(&mut m, i32::MAX, StressCause::Hazard);
        assert_eq!(change.after, 10);
    }

    #[test]
    fn bands_follow_the_table() {
        let bands = PanicBands::default();
        assert_eq!(panic_band(&bands, 6), None);
        assert_eq!(panic_band(&bands, 7), Some(PanicResponse::Freeze));
        assert_eq!(panic_band(&bands, 8), Some(PanicResponse::Flee));
        assert_eq!(panic_band(&bands, 9), Some(PanicResponse::Flee));
        assert_eq!(panic_band(&bands, 10), Some(PanicResponse::Fight));
    }

    #[test]
    fn flee_targets_the_next_hop() {
        let ctx = PanicContext {
            retreat_to: Some(ZoneId::new("dropship")),
            fight_target: None,
        };
        let action = panic_action(PanicResponse::Flee, &ctx, "Pvt. Hudson");
        assert_eq!(action.action, Some(ActionType::Retreat));
        assert_eq!(action.target.as_deref(), Some("dropship"));
        assert!(action.valid);
        assert!(!action.fallback_used);
    }

    #[test]
    fn fight_without_anyone_near_has_no_target() {
        let action = panic_action(PanicResponse::Fight, &PanicContext::default(), "Pvt. Hudson");
        assert_eq!(action.action, Some(ActionType::Attack));
        assert_eq!(action.target, None);
    }
}
