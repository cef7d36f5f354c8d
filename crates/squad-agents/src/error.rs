//! Error types for the squad-agents crate.
//!
//! Validation failures never surface as errors; they are folded into
//! [`ValidatedAction`](squad_types::ValidatedAction). Only configuration
//! mistakes are reported here, and callers treat them as fatal.

use squad_types::{ActionType, Role};

/// A broken action catalog, fallback table or stress configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A role has no actions it may propose.
    #[error("role {0:?} has an empty vocabulary")]
    EmptyVocabulary(Role),

    /// An action is referenced but has no structural rule.
    #[error("action {action} is referenced by {context} but has no catalog entry")]
    UnknownAction {
        /// The missing action.
        action: ActionType,
        /// Where it was referenced.
        context: String,
    },

    /// A role has no catch-all fallback rule.
    #[error("fallback table has no catch-all rule for role {0:?}")]
    MissingCatchAll(Role),

    /// A fallback action is unusable for its role.
    #[error("fallback action {action} is invalid for role {role:?}: {reason}")]
    InvalidFallback {
        /// The role the rule applies to.
        role: Role,
        /// The offending action.
        action: ActionType,
        /// Why it is unusable.
        reason: String,
    },

    /// Panic thresholds are out of order or off the stress scale.
    #[error("invalid panic bands: {0}")]
    InvalidPanicBands(String),
}
