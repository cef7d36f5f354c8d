//! The versioned action catalog.
//!
//! The catalog is data, not control flow: per-action structural rules, the
//! vocabulary each role may propose, and the synonym table that maps loose
//! collaborator phrasing onto canonical actions. A catalog can be replaced
//! wholesale from configuration and is checked once at startup.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use squad_types::{ActionType, EffectClass, Role, TargetKind};

use crate::error::CatalogError;

/// Version of the built-in catalog.
pub const BUILTIN_CATALOG_VERSION: u32 = 1;

/// Actions the stress model can force regardless of the role vocabulary.
pub const PANIC_ACTIONS: [ActionType; 3] =
    [ActionType::Freeze, ActionType::Retreat, ActionType::Attack];

/// Structural rule for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// What the action touches.
    pub effect: EffectClass,
    /// What it may target.
    pub target: TargetKind,
}

/// Vocabulary, target rules and synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCatalog {
    /// Bumped whenever the vocabulary or synonyms change.
    pub version: u32,
    /// Structural rule per action.
    pub actions: BTreeMap<ActionType, ActionSpec>,
    /// Actions each role may propose.
    pub vocabularies: BTreeMap<Role, BTreeSet<ActionType>>,
    /// Normalized alias -> canonical action.
    pub synonyms: BTreeMap<String, ActionType>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ActionCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        use ActionType as A;
        use EffectClass as E;
        use TargetKind as T;

        let actions = [
            (A::Move, E::Position, T::AdjacentZone),
            (A::Search, E::Informational, T::Surroundings),
            (A::Take, E::Inventory, T::ZoneItem),
            (A::Drop, E::Inventory, T::CarriedItem),
            (A::Interact, E::Environment, T::ZoneEntity),
            (A::Attack, E::Combat, T::ZoneActor),
            (A::Report, E::Informational, T::None),
            (A::HoldPosition, E::Informational, T::None),
            (A::Retreat, E::Position, T::AdjacentZone),
            (A::Freeze, E::Informational, T::None),
            (A::Stalk, E::Position, T::AdjacentZone),
            (A::Hide, E::Informational, T::None),
            (A::Lurk, E::Informational, T::None),
            (A::AmbientNoise, E::Environment, T::None),
            (A::FlickerLights, E::Environment, T::AnyZone),
            (A::VentSteam, E::Environment, T::AnyZone),
            (A::LockDown, E::Environment, T::AnyZone),
        ]
        .into_iter()
        .map(|(action, effect, target)| (action, ActionSpec { effect, target }))
        .collect();

        let vocabularies = [
            (
                Role::Marine,
                vec![
                    A::Move,
                    A::Search,
                    A::Take,
                    A::Drop,
                    A::Interact,
                    A::Attack,
                    A::Report,
                    A::HoldPosition,
                    A::Retreat,
                ],
            ),
            (Role::Antagonist, vec![A::Stalk, A::Hide, A::Attack, A::Lurk]),
            (
                Role::Director,
                vec![A::AmbientNoise, A::FlickerLights, A::VentSteam, A::LockDown],
            ),
        ]
        .into_iter()
        .map(|(role, list)| (role, list.into_iter().collect()))
        .collect();

        let synonyms = [
            ("communicate", A::Report),
            ("radio", A::Report),
            ("talk", A::Report),
            ("investigate", A::Search),
            ("examine", A::Search),
            ("inspect", A::Search),
            ("look", A::Search),
            ("walk", A::Move),
            ("go", A::Move),
            ("run", A::Move),
            ("advance", A::Move),
            ("grab", A::Take),
            ("pickup", A::Take),
            ("pick_up", A::Take),
            ("put_down", A::Drop),
            ("shoot", A::Attack),
            ("fire", A::Attack),
            ("ambush", A::Attack),
            ("wait", A::HoldPosition),
            ("hold", A::HoldPosition),
            ("defend", A::HoldPosition),
            ("flee", A::Retreat),
            ("fall_back", A::Retreat),
            ("hunt", A::Stalk),
            ("sneak", A::Stalk),
            ("conceal", A::Hide),
            ("use", A::Interact),
            ("repair", A::Interact),
            ("unlock", A::Interact),
            ("hack", A::Interact),
            ("noise", A::AmbientNoise),
            ("steam", A::VentSteam),
            ("lockdown", A::LockDown),
        ]
        .into_iter()
        .map(|(alias, action)| (alias.to_owned(), action))
        .collect();

        Self {
            version: BUILTIN_CATALOG_VERSION,
            actions,
            vocabularies,
            synonyms,
        }
    }

    /// Structural rule for an action.
    pub fn spec(&self, action: ActionType) -> Option<ActionSpec> {
        self.actions.get(&action).copied()
    }

    /// Whether `role` may propose `action`.
    pub fn is_allowed(&self, role: Role, action: ActionType) -> bool {
        self.vocabularies
            .get(&role)
            .is_some_and(|set| set.contains(&action))
    }

    /// The role's vocabulary in canonical order.
    pub fn allowed(&self, role: Role) -> Vec<ActionType> {
        self.vocabularies
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Map a loose action name onto a canonical action.
    ///
    /// The name is trimmed, lowercased and has spaces and dashes folded to
    /// underscores before the canonical and synonym lookups.
    pub fn resolve_name(&self, raw: &str) -> Option<ActionType> {
        let name = normalize_name(raw);
        ActionType::from_name(&name).or_else(|| self.synonyms.get(&name).copied())
    }

    /// Check the catalog for configuration mistakes.
    pub fn check(&self) -> Result<(), CatalogError> {
        for role in Role::ALL {
            let vocab = self.vocabularies.get(&role);
            if vocab.is_none_or(BTreeSet::is_empty) {
                return Err(CatalogError::EmptyVocabulary(role));
            }
            for &action in vocab.into_iter().flatten() {
                self.require(action, &format!("the {} vocabulary", role.as_str()))?;
            }
        }
        for (alias, &action) in &self.synonyms {
            self.require(action, &format!("synonym '{alias}'"))?;
        }
        for action in PANIC_ACTIONS {
            self.require(action, "the panic table")?;
        }
        Ok(())
    }

    fn require(&self, action: ActionType, context: &str) -> Result<(), CatalogError> {
        if self.actions.contains_key(&action) {
            Ok(())
        } else {
            Err(CatalogError::UnknownAction {
                action,
                context: context.to_owned(),
            })
        }
    }
}

/// Lowercase, trim, and fold spaces and dashes into underscores.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_consistent() {
        assert!(ActionCatalog::builtin().check().is_ok());
    }

    #[test]
    fn synonyms_resolve_to_canonical_actions() {
        let catalog = ActionCatalog::builtin();
        assert_eq!(catalog.resolve_name("communicate"), Some(ActionType::Report));
        assert_eq!(catalog.resolve_name("  Investigate "), Some(ActionType::Search));
        assert_eq!(catalog.resolve_name("Hold Position"), Some(ActionType::HoldPosition));
        assert_eq!(catalog.resolve_name("pick-up"), Some(ActionType::Take));
        assert_eq!(catalog.resolve_name("dance"), None);
    }

    #[test]
    fn vocabularies_are_role_scoped() {
        let catalog = ActionCatalog::builtin();
        assert!(catalog.is_allowed(Role::Marine, ActionType::Search));
        assert!(!catalog.is_allowed(Role::Marine, ActionType::Stalk));
        assert!(!catalog.is_allowed(Role::Marine, ActionType::Freeze));
        assert!(catalog.is_allowed(Role::Antagonist, ActionType::Attack));
        assert_eq!(catalog.allowed(Role::Director).len(), 4);
    }

    #[test]
    fn dangling_synonym_is_a_config_error() {
        let mut catalog = ActionCatalog::builtin();
        catalog.actions.remove(&ActionType::Report);
        catalog.vocabularies.values_mut().for_each(|v| {
            v.remove(&ActionType::Report);
        });
        let err = catalog.check().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownAction {
                action: ActionType::Report,
                ..
            }
        ));
    }

    #[test]
    fn empty_vocabulary_is_a_config_error() {
        let mut catalog = ActionCatalog::builtin();
        catalog.vocabularies.remove(&Role::Director);
        assert_eq!(
            catalog.check(),
            Err(CatalogError::EmptyVocabulary(Role::Director))
        );
    }
}
