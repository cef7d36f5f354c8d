//! Marine compliance rolls.
//!
//! A marine follows its intended action with probability
//! `clamp(base * (1 - stress / 10), 0.1, 1.0)`. The roll is a single draw
//! in `[0, 1)` at four decimal places from the simulation's seeded RNG;
//! `roll >= compliance` discards the intent in favor of the fallback.
//!
//! All probabilities are [`Decimal`] -- no floating point.

use rand::Rng;
use rust_decimal::Decimal;
use squad_types::{MAX_STRESS, Marine, Role, ValidatedAction};
use tracing::warn;

use crate::fallback::FallbackTable;

/// Lowest compliance a marine can have.
pub const MIN_COMPLIANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Number of distinct roll values (four decimal places).
const ROLL_RESOLUTION: u32 = 10_000;

/// Outcome of a compliance roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceResolution {
    /// The action the marine will actually perform.
    pub final_action: ValidatedAction,
    /// Whether the intended action was discarded.
    pub overridden: bool,
    /// The compliance probability rolled against.
    pub probability: Decimal,
    /// The roll drawn.
    pub roll: Decimal,
}

/// Compliance probability for a base value and stress level.
///
/// Stress outside 0--10 and base values outside 0--1 are clamped first, so
/// the result always lies in `[0.1, 1.0]`.
pub fn compliance_probability(base: Decimal, stress: i64) -> Decimal {
    let stress = Decimal::from(stress.clamp(0, i64::from(MAX_STRESS)));
    let base = base.clamp(Decimal::ZERO, Decimal::ONE);
    let calm = Decimal::ONE
        .checked_sub(stress.checked_div(Decimal::TEN).unwrap_or(Decimal::ONE))
        .unwrap_or(Decimal::ZERO);
    base.checked_mul(calm)
        .unwrap_or(Decimal::ZERO)
        .clamp(MIN_COMPLIANCE, Decimal::ONE)
}

/// Draw a roll in `[0, 1)`.
pub fn draw_roll<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(i64::from(rng.random_range(0..ROLL_RESOLUTION)), 4)
}

/// Roll compliance for a marine's intended action.
///
/// On failure the fallback for the marine's personality and stress replaces
/// the intent; the retry count of the intent is carried over.
pub fn resolve_compliance<R: Rng + ?Sized>(
    marine: &Marine,
    intended: ValidatedAction,
    fallback: &FallbackTable,
    rng: &mut R,
) -> ComplianceResolution {
    let probability = compliance_probability(marine.base_compliance, i64::from(marine.stress));
    let roll = draw_roll(rng);
    if roll < probability {
        return ComplianceResolution {
            final_action: intended,
            overridden: false,
            probability,
            roll,
        };
    }

    warn!(
        marine = %marine.id,
        stress = marine.stress,
        probability = %probability,
        roll = %roll,
        intended = ?intended.action,
        "marine disobeyed"
    );
    let final_action = fallback.synthesize(
        Role::Marine,
        Some(marine.personality),
        marine.stress,
        intended.retries,
    );
    ComplianceResolution {
        final_action,
        overridden: true,
        probability,
        roll,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;
    use squad_types::{ActionType, ActorId, Personality, ZoneId};

    use super::*;
    use crate::catalog::ActionCatalog;

    fn marine(base: Decimal, stress: u8) -> Marine {
        Marine {
            id: ActorId::new("vasquez"),
            name: "Pvt. Vasquez".to_owned(),
            personality: Personality::Professional,
            health: 3,
            stress,
            base_compliance: base,
            zone: ZoneId::new("corridor"),
            last_safe_zone: ZoneId::new("dropship"),
            inventory: BTreeMap::new(),
            last_action: None,
        }
    }

    #[test]
    fn probability_follows_the_formula() {
        assert_eq!(compliance_probability(dec!(0.9), 0), dec!(0.9));
        assert_eq!(compliance_probability(dec!(0.9), 5), dec!(0.45));
        assert_eq!(compliance_probability(dec!(0.8), 8), dec!(0.16));
    }

    #[test]
    fn probability_stays_in_bounds() {
        for stress in [-1_000, -1, 0, 3, 9, 10, 11, i64::MAX, i64::MIN] {
            for base in [dec!(-2), dec!(0), dec!(0.5), dec!(1), dec!(7)] {
                let p = compliance_probability(base, stress);
                assert!(p >= dec!(0.1) && p <= dec!(1.0), "{base} / {stress} -> {p}");
            }
        }
        assert_eq!(compliance_probability(dec!(0.9), 10), dec!(0.1));
        assert_eq!(compliance_probability(dec!(1), -5), dec!(1));
    }

    #[test]
    fn rolls_are_in_unit_interval_and_seeded() {
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let roll = draw_roll(&mut a);
            assert!(roll >= Decimal::ZERO && roll < Decimal::ONE);
            assert_eq!(roll, draw_roll(&mut b));
        }
    }

    #[test]
    fn full_compliance_never_overrides() {
        let table = FallbackTable::builtin(&ActionCatalog::builtin()).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let intent = ValidatedAction::accepted(ActionType::Search, None, "orders");
        for _ in 0..100 {
            let res = resolve_compliance(&marine(dec!(1), 0), intent.clone(), &table, &mut rng);
            assert!(!res.overridden);
            assert_eq!(res.final_action, intent);
        }
    }

    #[test]
    fn failed_roll_substitutes_fallback() {
        let table = FallbackTable::builtin(&ActionCatalog::builtin()).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let intent = ValidatedAction::accepted(ActionType::Search, None, "orders");
        let overridden = (0..200)
            .map(|_| resolve_compliance(&marine(dec!(0.1), 10), intent.clone(), &table, &mut rng))
            .find(|res| res.overridden)
            .unwrap();
        assert!(overridden.roll >= overridden.probability);
        assert_eq!(overridden.final_action.action, Some(ActionType::Report));
        assert!(overridden.final_action.fallback_used);
    }
}
