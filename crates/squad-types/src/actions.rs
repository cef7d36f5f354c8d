//! The validated decision handed from the decision pipeline to the
//! orchestrator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionType, ValidationErrorKind};

/// Why a candidate action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ValidationError {
    /// Category of the failure.
    pub kind: ValidationErrorKind,
    /// Detail fed back to the collaborator on retry.
    pub message: String,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// A candidate action after validation.
///
/// When `valid` is true, `action` is set and `target` is either `None` or a
/// canonical identifier that satisfies the action's target rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ValidatedAction {
    /// The chosen action. Absent only on invalid results.
    pub action: Option<ActionType>,
    /// Canonical target identifier.
    pub target: Option<String>,
    /// The actor's stated reasoning.
    pub reasoning: String,
    /// Spoken line, if the collaborator produced one.
    pub speech: Option<String>,
    /// Whether the action passed validation.
    pub valid: bool,
    /// Categorized failure when `valid` is false.
    pub error: Option<ValidationError>,
    /// Collaborator calls beyond the first.
    pub retries: u32,
    /// Whether the action came from the fallback table.
    pub fallback_used: bool,
}

impl ValidatedAction {
    /// A valid action with no retries and no fallback.
    pub fn accepted(action: ActionType, target: Option<String>, reasoning: impl Into<String>) -> Self {
        Self {
            action: Some(action),
            target,
            reasoning: reasoning.into(),
            speech: None,
            valid: true,
            error: None,
            retries: 0,
            fallback_used: false,
        }
    }

    /// An invalid result carrying a categorized error.
    pub fn rejected(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            action: None,
            target: None,
            reasoning: String::new(),
            speech: None,
            valid: false,
            error: Some(ValidationError {
                kind,
                message: message.into(),
            }),
            retries: 0,
            fallback_used: false,
        }
    }

    /// The failure message, or an empty string for valid actions.
    pub fn failure_reason(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}
