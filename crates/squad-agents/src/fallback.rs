//! Deterministic fallback actions.
//!
//! When the decision pipeline cannot obtain a valid action, or a marine
//! fails its compliance roll, the actor falls back to a safe, untargeted
//! action chosen from this table. Rules are matched in order by
//! `(role, personality, minimum stress)`; every role must end in a
//! catch-all, which [`FallbackTable::new`] enforces.

use serde::{Deserialize, Serialize};
use squad_types::{ActionType, Personality, Role, TargetKind, ValidatedAction};

use crate::catalog::ActionCatalog;
use crate::error::CatalogError;

/// One row of the fallback table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// Role the rule applies to.
    pub role: Role,
    /// Restrict to one personality. `None` matches any.
    #[serde(default)]
    pub personality: Option<Personality>,
    /// Minimum stress for the rule to match.
    #[serde(default)]
    pub min_stress: u8,
    /// The action to substitute. Must be untargeted.
    pub action: ActionType,
}

impl FallbackRule {
    const fn is_catch_all(&self) -> bool {
        self.personality.is_none() && self.min_stress == 0
    }

    fn matches(&self, role: Role, personality: Option<Personality>, stress: u8) -> bool {
        self.role == role
            && self.personality.is_none_or(|p| Some(p) == personality)
            && stress >= self.min_stress
    }
}

/// The built-in rules: cautious marines under stress hold position, other
/// marines report in, the antagonist lurks, the director makes noise.
pub fn builtin_rules() -> Vec<FallbackRule> {
    vec![
        FallbackRule {
            role: Role::Marine,
            personality: Some(Personality::Cautious),
            min_stress: 5,
            action: ActionType::HoldPosition,
        },
        FallbackRule {
            role: Role::Marine,
            personality: None,
            min_stress: 0,
            action: ActionType::Report,
        },
        FallbackRule {
            role: Role::Antagonist,
            personality: None,
            min_stress: 0,
            action: ActionType::Lurk,
        },
        FallbackRule {
            role: Role::Director,
            personality: None,
            min_stress: 0,
            action: ActionType::AmbientNoise,
        },
    ]
}

/// A checked fallback table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    rules: Vec<FallbackRule>,
    marine: FallbackRule,
    antagonist: FallbackRule,
    director: FallbackRule,
}

impl FallbackTable {
    /// Build and check a table against the catalog.
    ///
    /// Every rule's action must be in its role's vocabulary and take no
    /// target, and every role needs a catch-all rule.
    pub fn new(rules: Vec<FallbackRule>, catalog: &ActionCatalog) -> Result<Self, CatalogError> {
        for rule in &rules {
            let Some(spec) = catalog.spec(rule.action) else {
                return Err(CatalogError::UnknownAction {
                    action: rule.action,
                    context: "the fallback table".to_owned(),
                });
            };
            if !catalog.is_allowed(rule.role, rule.action) {
                return Err(CatalogError::InvalidFallback {
                    role: rule.role,
                    action: rule.action,
                    reason: "not in the role's vocabulary".to_owned(),
                });
            }
            if spec.target != TargetKind::None {
                return Err(CatalogError::InvalidFallback {
                    role: rule.role,
                    action: rule.action,
                    reason: "fallback actions must not need a target".to_owned(),
                });
            }
        }
        let catch_all = |role: Role| {
            rules
                .iter()
                .find(|r| r.role == role && r.is_catch_all())
                .cloned()
                .ok_or(CatalogError::MissingCatchAll(role))
        };
        Ok(Self {
            marine: catch_all(Role::Marine)?,
            antagonist: catch_all(Role::Antagonist)?,
            director: catch_all(Role::Director)?,
            rules,
        })
    }

    /// The built-in table.
    pub fn builtin(catalog: &ActionCatalog) -> Result<Self, CatalogError> {
        Self::new(builtin_rules(), catalog)
    }

    /// First matching rule. Total: the role's catch-all always matches.
    pub fn lookup(&self, role: Role, personality: Option<Personality>, stress: u8) -> &FallbackRule {
        self.rules
            .iter()
            .find(|r| r.matches(role, personality, stress))
            .unwrap_or(match role {
                Role::Marine => &self.marine,
                Role::Antagonist => &self.antagonist,
                Role::Director => &self.director,
            })
    }

    /// Build the fallback action for an actor.
    ///
    /// The result is valid, untargeted, flagged as a fallback and carries
    /// the number of retries already spent.
    pub fn synthesize(
        &self,
        role: Role,
        personality: Option<Personality>,
        stress: u8,
        retries: u32,
    ) -> ValidatedAction {
        let rule = self.lookup(role, personality, stress);
        let mut action = ValidatedAction::accepted(
            rule.action,
            None,
            format!(
                "No usable decision; falling back to standard procedure ({}).",
                rule.action
            ),
        );
        action.retries = retries;
        action.fallback_used = true;
        action
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table() -> FallbackTable {
        FallbackTable::builtin(&ActionCatalog::builtin()).unwrap()
    }

    #[test]
    fn builtin_lookup_by_role_personality_and_stress() {
        let table = table();
        assert_eq!(
            table.lookup(Role::Marine, Some(Personality::Cautious), 6).action,
            ActionType::HoldPosition
        );
        assert_eq!(
            table.lookup(Role::Marine, Some(Personality::Cautious), 2).action,
            ActionType::Report
        );
        assert_eq!(
            table.lookup(Role::Marine, Some(Personality::Aggressive), 9).action,
            ActionType::Report
        );
        assert_eq!(table.lookup(Role::Antagonist, None, 0).action, ActionType::Lurk);
        assert_eq!(
            table.lookup(Role::Director, None, 0).action,
            ActionType::AmbientNoise
        );
    }

    #[test]
    fn synthesized_fallback_is_valid_and_flagged() {
        let action = table().synthesize(Role::Antagonist, None, 0, 2);
        assert!(action.valid);
        assert!(action.fallback_used);
        assert_eq!(action.action, Some(ActionType::Lurk));
        assert_eq!(action.target, None);
        assert_eq!(action.retries, 2);
    }

    #[test]
    fn missing_catch_all_is_fatal() {
        let rules: Vec<_> = builtin_rules()
            .into_iter()
            .filter(|r| r.role != Role::Director)
            .collect();
        let err = FallbackTable::new(rules, &ActionCatalog::builtin()).unwrap_err();
        assert_eq!(err, CatalogError::MissingCatchAll(Role::Director));
    }

    #[test]
    fn targeted_fallback_is_rejected() {
        let mut rules = builtin_rules();
        rules.insert(
            0,
            FallbackRule {
                role: Role::Marine,
                personality: None,
                min_stress: 3,
                action: ActionType::Move,
            },
        );
        let err = FallbackTable::new(rules, &ActionCatalog::builtin()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFallback { .. }));
    }
}
