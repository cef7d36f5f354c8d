//! Tunable parameters for stress, panic and personalities.
//!
//! These values are the `stress` and `personalities` sections of
//! `squad-config.yaml`. Every field has a default so a partial file is
//! enough; [`StressConfig::check`] rejects tables that cannot work.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use squad_types::{MAX_STRESS, Personality, StressCause};

use crate::error::CatalogError;

// ---------------------------------------------------------------------------
// Stress
// ---------------------------------------------------------------------------

/// Stress deltas per cause and the panic band table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Added when a marine takes damage (default: 2).
    #[serde(default = "default_damage_taken")]
    pub damage_taken: u8,

    /// Added when a marine's action fails (default: 1).
    #[serde(default = "default_one")]
    pub action_failed: u8,

    /// Added to marines sharing a zone with a panicking squadmate (default: 1).
    #[serde(default = "default_one")]
    pub witnessed_panic: u8,

    /// Added to a marine whose intent panic overrides (default: 1).
    #[serde(default = "default_one")]
    pub forced_override: u8,

    /// Added to marines caught in a director hazard (default: 1).
    #[serde(default = "default_one")]
    pub hazard: u8,

    /// Removed when a marine holds position (default: 1).
    #[serde(default = "default_one")]
    pub recovery: u8,

    /// Panic thresholds.
    #[serde(default)]
    pub panic: PanicBands,
}

const fn default_damage_taken() -> u8 {
    2
}

const fn default_one() -> u8 {
    1
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            damage_taken: default_damage_taken(),
            action_failed: 1,
            witnessed_panic: 1,
            forced_override: 1,
            hazard: 1,
            recovery: 1,
            panic: PanicBands::default(),
        }
    }
}

impl StressConfig {
    /// Signed stress delta for a cause, given the marine's current stress.
    ///
    /// Reaching a safe zone resets stress, so its delta cancels `current`.
    pub fn delta_for(&self, cause: StressCause, current: u8) -> i32 {
        match cause {
            StressCause::DamageTaken => i32::from(self.damage_taken),
            StressCause::ActionFailed => i32::from(self.action_failed),
            StressCause::WitnessedPanic => i32::from(self.witnessed_panic),
            StressCause::ForcedOverride => i32::from(self.forced_override),
            StressCause::Hazard => i32::from(self.hazard),
            StressCause::SafeZoneReached => -i32::from(current),
            StressCause::Recovery => -i32::from(self.recovery),
        }
    }

    /// Reject panic bands that are unordered or off the scale.
    pub fn check(&self) -> Result<(), CatalogError> {
        self.panic.check()
    }
}

/// The authoritative panic band table.
///
/// A marine at or above `fight_at` attacks, at or above `flee_at` retreats,
/// at or above `freeze_at` freezes. Below `freeze_at` there is no panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicBands {
    /// Lowest stress that freezes (default: 7).
    #[serde(default = "default_freeze_at")]
    pub freeze_at: u8,

    /// Lowest stress that flees (default: 8).
    #[serde(default = "default_flee_at")]
    pub flee_at: u8,

    /// Lowest stress that fights (default: 10).
    #[serde(default = "default_fight_at")]
    pub fight_at: u8,
}

const fn default_freeze_at() -> u8 {
    7
}

const fn default_flee_at() -> u8 {
    8
}

const fn default_fight_at() -> u8 {
    10
}

impl Default for PanicBands {
    fn default() -> Self {
        Self {
            freeze_at: default_freeze_at(),
            flee_at: default_flee_at(),
            fight_at: default_fight_at(),
        }
    }
}

impl PanicBands {
    fn check(&self) -> Result<(), CatalogError> {
        if self.freeze_at == 0 {
            return Err(CatalogError::InvalidPanicBands(
                "freeze_at must be above zero".to_owned(),
            ));
        }
        if !(self.freeze_at <= self.flee_at && self.flee_at <= self.fight_at) {
            return Err(CatalogError::InvalidPanicBands(format!(
                "expected freeze_at <= flee_at <= fight_at, got {} / {} / {}",
                self.freeze_at, self.flee_at, self.fight_at
            )));
        }
        if self.fight_at > MAX_STRESS {
            return Err(CatalogError::InvalidPanicBands(format!(
                "fight_at {} exceeds the stress scale",
                self.fight_at
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Personalities
// ---------------------------------------------------------------------------

/// Per-personality tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    /// Probability of following orders at zero stress.
    pub base_compliance: Decimal,
    /// Turn order within the marine phase; higher acts first.
    pub initiative: u8,
}

/// Personality table keyed by tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalityTable(pub BTreeMap<Personality, PersonalityProfile>);

impl Default for PersonalityTable {
    fn default() -> Self {
        Self(
            [
                Personality::Aggressive,
                Personality::Professional,
                Personality::Cautious,
                Personality::Nervous,
            ]
            .into_iter()
            .map(|p| (p, builtin_profile(p)))
            .collect(),
        )
    }
}

impl PersonalityTable {
    /// Profile for a personality, falling back to the built-in value when
    /// the configured table omits it.
    pub fn profile(&self, personality: Personality) -> PersonalityProfile {
        self.0
            .get(&personality)
            .copied()
            .unwrap_or_else(|| builtin_profile(personality))
    }
}

fn builtin_profile(personality: Personality) -> PersonalityProfile {
    let (base_compliance, initiative) = match personality {
        Personality::Aggressive => (Decimal::new(7, 1), 3),
        Personality::Professional => (Decimal::new(9, 1), 2),
        Personality::Cautious => (Decimal::new(8, 1), 1),
        Personality::Nervous => (Decimal::new(6, 1), 1),
    };
    PersonalityProfile {
        base_compliance,
        initiative,
    }
}
