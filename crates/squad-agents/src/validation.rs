//! Validation of candidate actions proposed by the reasoning collaborator.
//!
//! The candidate is arbitrary JSON. Validation runs in stages:
//! 1. Shape -- is it an object with a string action name?
//! 2. Vocabulary -- does the name (after synonym remapping) belong to the role?
//! 3. Target -- does the target satisfy the action's [`TargetKind`]?
//!
//! Every stage folds its failure into the returned [`ValidatedAction`];
//! nothing here returns an error or panics.

use serde_json::{Map, Value};
use squad_types::{
    ActionType, ActorId, ItemId, Personality, Role, TargetKind, ValidatedAction,
    ValidationErrorKind, ZoneId,
};
use tracing::debug;

use crate::catalog::ActionCatalog;

/// Keys accepted for the action name, in priority order.
const ACTION_KEYS: [&str; 3] = ["action", "action_type", "verb"];

/// Keys accepted for the reasoning text, in priority order.
const REASONING_KEYS: [&str; 3] = ["reasoning", "thoughts", "rationale"];

/// A named thing a target can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named<I> {
    /// Canonical identifier.
    pub id: I,
    /// Display name.
    pub name: String,
}

/// A visible item with its pick-up flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    /// Identifier and display name.
    pub item: Named<ItemId>,
    /// Whether it can be taken.
    pub portable: bool,
}

/// Facts about the acting actor's surroundings.
///
/// Assembled by the orchestrator from world state before each decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// The acting actor.
    pub actor: Option<ActorId>,
    /// The zone the actor stands in. `None` for the director.
    pub current_zone: Option<Named<ZoneId>>,
    /// Zones adjacent to the actor.
    pub adjacent_zones: Vec<Named<ZoneId>>,
    /// Every zone on the station.
    pub all_zones: Vec<Named<ZoneId>>,
    /// Visible items and fixtures in the actor's zone.
    pub zone_items: Vec<ItemRef>,
    /// Other visible, active actors in the actor's zone.
    pub zone_actors: Vec<Named<ActorId>>,
    /// Items the actor carries.
    pub carried_items: Vec<Named<ItemId>>,
    /// Personality, for diagnostics.
    pub personality: Option<Personality>,
    /// Stress, for diagnostics.
    pub stress: Option<u8>,
}

/// Validate a candidate for the given role.
pub fn validate(
    catalog: &ActionCatalog,
    candidate: &Value,
    role: Role,
    context: &ValidationContext,
) -> ValidatedAction {
    let result = validate_inner(catalog, candidate, role, context);
    if let Some(error) = &result.error {
        debug!(
            role = role.as_str(),
            actor = ?context.actor,
            personality = ?context.personality,
            stress = ?context.stress,
            kind = ?error.kind,
            message = %error.message,
            "candidate rejected"
        );
    }
    result
}

fn validate_inner(
    catalog: &ActionCatalog,
    candidate: &Value,
    role: Role,
    context: &ValidationContext,
) -> ValidatedAction {
    // Stage 1: shape
    let Some(top) = candidate.as_object() else {
        return ValidatedAction::rejected(
            ValidationErrorKind::Malformed,
            format!("expected a JSON object, got {}", kind_of(candidate)),
        );
    };
    let intent = match top.get("action_intent") {
        None | Some(Value::Null) => None,
        Some(Value::Object(inner)) => Some(inner),
        Some(other) => {
            return ValidatedAction::rejected(
                ValidationErrorKind::Malformed,
                format!("action_intent must be an object, got {}", kind_of(other)),
            );
        }
    };
    let field = |key: &str| top.get(key).or_else(|| intent.and_then(|i| i.get(key)));

    let Some(raw_action) = ACTION_KEYS.iter().find_map(|&key| field(key)) else {
        return ValidatedAction::rejected(
            ValidationErrorKind::Malformed,
            "missing action field (expected one of action, action_type, verb)",
        );
    };
    let Some(action_name) = raw_action.as_str() else {
        return ValidatedAction::rejected(
            ValidationErrorKind::Malformed,
            format!("action must be a string, got {}", kind_of(raw_action)),
        );
    };

    // Stage 2: vocabulary
    let Some(action) = catalog.resolve_name(action_name) else {
        return ValidatedAction::rejected(
            ValidationErrorKind::UnsupportedAction,
            format!("unknown action '{action_name}'"),
        );
    };
    if !catalog.is_allowed(role, action) {
        return ValidatedAction::rejected(
            ValidationErrorKind::UnsupportedAction,
            format!("'{action}' is not available to a {}", role.as_str()),
        );
    }
    let Some(spec) = catalog.spec(action) else {
        return ValidatedAction::rejected(
            ValidationErrorKind::UnsupportedAction,
            format!("'{action}' has no catalog entry"),
        );
    };

    // Stage 3: target
    let raw_target = match field("target") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            return ValidatedAction::rejected(
                ValidationErrorKind::Malformed,
                format!("target must be a string, got {}", kind_of(other)),
            );
        }
    };
    let target = match resolve_target(action, spec.target, raw_target, context) {
        Ok(target) => target,
        Err(rejection) => return rejection,
    };

    let mut accepted = ValidatedAction::accepted(action, target, text_field(top, intent, &REASONING_KEYS));
    accepted.speech = top
        .get("speech")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(ToOwned::to_owned);
    accepted
}

fn resolve_target(
    action: ActionType,
    kind: TargetKind,
    raw: Option<&str>,
    context: &ValidationContext,
) -> Result<Option<String>, ValidatedAction> {
    if kind == TargetKind::None {
        return Ok(None);
    }
    let Some(raw) = raw else {
        return Err(ValidatedAction::rejected(
            ValidationErrorKind::MissingTarget,
            format!("'{action}' requires a target"),
        ));
    };
    let resolved = match kind {
        TargetKind::None => None,
        TargetKind::AdjacentZone => find(&context.adjacent_zones, raw),
        TargetKind::AnyZone => find(&context.all_zones, raw),
        TargetKind::ZoneItem => find(
            context
                .zone_items
                .iter()
                .filter(|i| i.portable)
                .map(|i| &i.item),
            raw,
        ),
        TargetKind::ZoneEntity => find(context.zone_items.iter().map(|i| &i.item), raw),
        TargetKind::ZoneActor => find(&context.zone_actors, raw),
        TargetKind::CarriedItem => find(&context.carried_items, raw),
        TargetKind::Surroundings => find(&context.current_zone, raw)
            .or_else(|| find(context.zone_items.iter().map(|i| &i.item), raw))
            .or_else(|| find(&context.zone_actors, raw)),
    };
    resolved.map(Some).ok_or_else(|| {
        ValidatedAction::rejected(
            ValidationErrorKind::InvalidTarget,
            format!("'{raw}' is not a valid target for '{action}' here"),
        )
    })
}

/// Case-insensitive match against identifiers and display names.
fn find<'a, I, It>(candidates: It, raw: &str) -> Option<String>
where
    I: core::fmt::Display + 'a,
    It: IntoIterator<Item = &'a Named<I>>,
{
    let wanted = raw.trim().to_lowercase();
    let as_slug: String = wanted
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    candidates
        .into_iter()
        .find(|named| {
            let id = named.id.to_string().to_lowercase();
            id == wanted || id == as_slug || named.name.to_lowercase() == wanted
        })
        .map(|named| named.id.to_string())
}

fn text_field(top: &Map<String, Value>, intent: Option<&Map<String, Value>>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| {
            top.get(*key)
                .or_else(|| intent.and_then(|i| i.get(*key)))
                .and_then(Value::as_str)
        })
        .unwrap_or_default()
        .to_owned()
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
