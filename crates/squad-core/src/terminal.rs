//! Mission end conditions.
//!
//! [`evaluate`] is pure: it reads world state and the clock and never
//! mutates anything. Conditions are checked in a fixed order, so a round
//! that both extracts the objective and hits the round limit counts as an
//! extraction.

use serde::Serialize;
use squad_events::{ItemLocation, WorldState};
use squad_types::MissionOutcome;

use crate::clock::TurnClock;
use crate::config::MissionConfig;

/// How and why a mission ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Won, lost or partial.
    pub outcome: MissionOutcome,
    /// Human-readable reason.
    pub reason: String,
}

/// Whether the mission is still running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionStatus {
    /// Keep playing.
    Ongoing,
    /// The mission is over.
    Ended(Verdict),
}

impl MissionStatus {
    /// The verdict, if the mission is over.
    pub const fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Ongoing => None,
            Self::Ended(v) => Some(v),
        }
    }
}

fn ended(outcome: MissionOutcome, reason: String) -> MissionStatus {
    MissionStatus::Ended(Verdict { outcome, reason })
}

/// Evaluate the end conditions after a round.
pub fn evaluate(world: &WorldState, clock: &TurnClock, mission: &MissionConfig) -> MissionStatus {
    let alive = world.living_marines();
    if alive == 0 {
        return ended(MissionOutcome::Lost, "the whole squad is down".to_owned());
    }

    if objective_extracted(world, mission) {
        return if alive >= mission.min_survivors {
            ended(
                MissionOutcome::Won,
                format!("{} secured with {alive} marines standing", mission.objective_item),
            )
        } else {
            ended(
                MissionOutcome::Partial,
                format!(
                    "{} secured but only {alive} of the required {} marines survived",
                    mission.objective_item, mission.min_survivors
                ),
            )
        };
    }

    if clock.round() > mission.max_rounds {
        return ended(
            MissionOutcome::Lost,
            format!("out of time after {} rounds", mission.max_rounds),
        );
    }

    MissionStatus::Ongoing
}

/// On the extraction zone floor, or carried by a living marine standing
/// there.
fn objective_extracted(world: &WorldState, mission: &MissionConfig) -> bool {
    match world.item_location(&mission.objective_item) {
        Some(ItemLocation::Zone(zone)) => zone == mission.extraction_zone,
        Some(ItemLocation::Carried(holder)) => world
            .marine(&holder)
            .is_some_and(|m| m.is_alive() && m.zone == mission.extraction_zone),
        None => false,
    }
}
