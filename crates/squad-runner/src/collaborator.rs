//! Reasoning collaborators the runner can play against.
//!
//! [`LlmCollaborator`] sends each context package to an HTTP backend.
//! [`OfflineCollaborator`] needs no network: marines carry out the
//! commander's order literally and everyone else falls back on their role
//! default, so a mission always runs to completion.

use serde_json::{Value, json};
use squad_core::decision::role_default;
use squad_core::{CollaboratorError, ContextPackage, ReasoningCollaborator};
use squad_types::Role;
use tracing::debug;

use crate::error::RunnerError;
use crate::llm::{LlmBackend, Prompt};
use crate::parse::parse_response;

/// Output contract appended to every system prompt.
const OUTPUT_CONTRACT: &str = "Reply with a single JSON object and nothing else: \
{\"action\": <one of allowed_actions>, \"target\": <id or name, if the action needs one>, \
\"reasoning\": <one sentence>, \"speech\": <optional radio line>}. \
If prior_failure is set, your last answer was rejected for that reason.";

fn role_brief(role: Role) -> &'static str {
    match role {
        Role::Marine => {
            "You are a colonial marine on a derelict station. Stay in character. \
             Follow the commander's order when you can, but your stress and \
             personality colour every choice."
        }
        Role::Antagonist => {
            "You are the creature stalking the station. The marines cannot see \
             you while you stay hidden. Hunt patiently and strike when a marine \
             is alone."
        }
        Role::Director => {
            "You direct the station itself. Adjust the environment to keep \
             pressure on the squad without making the mission unwinnable."
        }
    }
}

/// Build the prompt for one decision.
pub fn build_prompt(context: &ContextPackage) -> Result<Prompt, RunnerError> {
    Ok(Prompt {
        system: format!("{} {OUTPUT_CONTRACT}", role_brief(context.actor.role)),
        user: serde_json::to_string_pretty(context)?,
    })
}

/// Collaborator backed by an LLM over HTTP.
#[derive(Debug)]
pub struct LlmCollaborator {
    backend: LlmBackend,
}

impl LlmCollaborator {
    /// Wrap a backend.
    pub const fn new(backend: LlmBackend) -> Self {
        Self { backend }
    }

    async fn ask(&self, context: &ContextPackage) -> Result<Value, RunnerError> {
        let prompt = build_prompt(context)?;
        let raw = self.backend.complete(&prompt).await?;
        debug!(
            actor = %context.actor.id,
            attempt = context.attempt,
            backend = self.backend.name(),
            chars = raw.len(),
            "LLM responded"
        );
        parse_response(&raw)
    }
}

impl ReasoningCollaborator for LlmCollaborator {
    async fn propose(&self, context: &ContextPackage) -> Result<Value, CollaboratorError> {
        Ok(self.ask(context).await?)
    }
}

/// Collaborator that needs no backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCollaborator;

impl ReasoningCollaborator for OfflineCollaborator {
    async fn propose(&self, context: &ContextPackage) -> Result<Value, CollaboratorError> {
        let order = context
            .command
            .as_deref()
            .and_then(|command| literal_order(command, &context.actor.name, context.actor.id.as_str()));
        Ok(order.unwrap_or_else(|| role_default(context.actor.role)))
    }
}

/// Words dropped between the verb and its target.
const FILLER: &[&str] = &["to", "the", "into", "at", "on", "up"];

/// Read an order as `[addressee,] verb [target]`.
///
/// Returns `None` when the order is addressed to someone else.
fn literal_order(command: &str, name: &str, id: &str) -> Option<Value> {
    let (addressee, instruction) = match command.split_once(',') {
        Some((head, tail)) if !head.trim().contains(' ') || head.contains('.') => (Some(head.trim()), tail),
        _ => (None, command),
    };
    if let Some(addressee) = addressee {
        let addressee = addressee.to_lowercase();
        let ours = addressee == id || name.to_lowercase().contains(&addressee);
        if !ours {
            return None;
        }
    }

    let mut words = instruction.split_whitespace();
    let verb = words.next()?.to_lowercase();
    let target = words
        .skip_while(|w| FILLER.contains(&w.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    let target = target.trim_end_matches(['.', '!']);
    let mut order = json!({
        "action": verb,
        "reasoning": format!("Following orders: {}", command.trim()),
    });
    if !target.is_empty()
        && let Some(fields) = order.as_object_mut()
    {
        fields.insert("target".to_owned(), Value::from(target));
    }
    Some(order)
}
