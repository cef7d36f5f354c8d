//! In-fiction narration derived from logged events.
//!
//! Narration is a view over the log: every line is produced from one event
//! and the world state right after it was applied, so the same log always
//! narrates the same way. Hidden antagonist actions are reported by the
//! motion tracker and never name the creature.

use squad_events::WorldState;
use squad_types::{Actor, Event, EventKind, NarrationCategory, NarrationLine, ResultStatus};

use crate::round::details;

/// Sender for engine notices.
pub const SYSTEM_SENDER: &str = "SYSTEM";

/// Sender for concealed antagonist activity.
pub const TRACKER_SENDER: &str = "Motion Tracker";

/// Sender for orders.
pub const COMMANDER_SENDER: &str = "Commander";

/// Sender for director adjustments.
pub const STATION_SENDER: &str = "Station";

/// Accumulated narration with a read cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrationStream {
    lines: Vec<NarrationLine>,
    cursor: usize,
}

impl NarrationStream {
    /// An empty stream.
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            cursor: 0,
        }
    }

    /// Append one line.
    pub fn push(&mut self, line: NarrationLine) {
        self.lines.push(line);
    }

    /// Append several lines.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = NarrationLine>) {
        self.lines.extend(lines);
    }

    /// Lines added since the last drain.
    pub fn drain_new(&mut self) -> Vec<NarrationLine> {
        let fresh = self.lines.get(self.cursor..).unwrap_or_default().to_vec();
        self.cursor = self.lines.len();
        fresh
    }

    /// Every line so far.
    pub fn all(&self) -> &[NarrationLine] {
        &self.lines
    }
}

/// Build a line at an event's round and tick.
fn line(event: &Event, sender: &str, content: String, category: NarrationCategory) -> NarrationLine {
    NarrationLine {
        round: event.round,
        tick: event.tick,
        sender: sender.to_owned(),
        content,
        category,
    }
}

/// The system line opening a round.
pub fn round_banner(round: u32, tick: u64) -> NarrationLine {
    NarrationLine {
        round,
        tick,
        sender: SYSTEM_SENDER.to_owned(),
        content: format!("Round {round} begins."),
        category: NarrationCategory::System,
    }
}

/// Narrate one applied event.
pub fn lines_for(event: &Event, world: &WorldState) -> Vec<NarrationLine> {
    let actor = event.actor.as_ref().and_then(|id| world.actor(id));
    let name = actor.map_or("Someone", Actor::name);
    match event.kind {
        EventKind::CommandIssued => vec![line(
            event,
            COMMANDER_SENDER,
            event.detail_str(details::COMMAND).unwrap_or_default().to_owned(),
            NarrationCategory::Commander,
        )],
        EventKind::OrderDisobeyed => {
            let content = if event.detail_str(details::REASON) == Some(details::REASON_PANIC) {
                format!("{name} panics and ignores the order!")
            } else {
                format!("{name} hears the order and does something else.")
            };
            vec![line(event, name, content, NarrationCategory::Panic)]
        }
        EventKind::Action => narrate_action(event, actor, world),
        EventKind::Diagnostic => Vec::new(),
        EventKind::MissionEnded => {
            let outcome = event.detail_str(details::OUTCOME).unwrap_or("over");
            let reason = event.detail_str(details::VERDICT).unwrap_or_default();
            vec![line(
                event,
                SYSTEM_SENDER,
                format!("Mission {outcome}: {reason}."),
                NarrationCategory::GameEnd,
            )]
        }
    }
}

fn narrate_action(event: &Event, actor: Option<&Actor>, world: &WorldState) -> Vec<NarrationLine> {
    let Some(actor) = actor else {
        return Vec::new();
    };
    let summary = event.result.as_ref().map_or("", |r| r.summary.as_str());
    match actor {
        Actor::Antagonist(creature) if creature.hidden => {
            let zone = world
                .zone(&creature.zone)
                .map_or_else(|| creature.zone.to_string(), |z| z.name.clone());
            vec![line(
                event,
                TRACKER_SENDER,
                format!("Contact. Movement near {zone}."),
                NarrationCategory::AgentAction,
            )]
        }
        Actor::Antagonist(creature) => vec![line(
            event,
            &creature.name,
            format!("{} {summary}.", creature.name),
            NarrationCategory::AgentAction,
        )],
        Actor::Director(_) => {
            if event.result.as_ref().is_some_and(|r| r.status == ResultStatus::Succeeded) {
                vec![line(event, STATION_SENDER, capitalize(summary), NarrationCategory::Director)]
            } else {
                Vec::new()
            }
        }
        Actor::Marine(marine) => {
            let fallback = event
                .details
                .get(details::FALLBACK_USED)
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            let mut lines = Vec::new();
            if fallback {
                lines.push(line(
                    event,
                    &marine.name,
                    format!("{} hesitates and falls back to standard procedure.", marine.name),
                    NarrationCategory::AgentAction,
                ));
            } else {
                let verb = event.action.map_or("acts", |a| a.as_str());
                lines.push(line(
                    event,
                    &marine.name,
                    format!("{} {verb}: {summary}.", marine.name),
                    NarrationCategory::AgentAction,
                ));
            }
            let report = event
                .detail_str(details::SPEECH)
                .or_else(|| event.detail_str(details::REASONING).filter(|_| !fallback))
                .filter(|s| !s.trim().is_empty());
            if let Some(report) = report {
                lines.push(line(
                    event,
                    &marine.name,
                    report.to_owned(),
                    NarrationCategory::AgentReport,
                ));
            }
            lines
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use squad_agents::PersonalityTable;
    use squad_events::{EventDraft, EventLog};
    use squad_types::{ActionType, ActorId, EventResult};

    use super::*;
    use crate::scenario::starting_world;

    fn logged(draft: EventDraft, status: ResultStatus, summary: &str) -> Event {
        let mut log = EventLog::new();
        let id = log.append(draft).unwrap();
        log.attach_result(
            id,
            EventResult {
                status,
                summary: summary.to_owned(),
                stress_changes: Vec::new(),
            },
        )
        .unwrap();
        log.get(id).cloned().unwrap()
    }

    #[test]
    fn hidden_creature_is_a_tracker_blip() {
        let world = starting_world(&PersonalityTable::default());
        let event = logged(
            EventDraft::new(EventKind::Action, 1, 2)
                .actor(&ActorId::new("xenomorph"))
                .action(ActionType::Lurk),
            ResultStatus::NoEffect,
            "waited in the dark",
        );
        let lines = lines_for(&event, &world);
        assert_eq!(lines.len(), 1);
        let blip = lines.first().unwrap();
        assert_eq!(blip.sender, TRACKER_SENDER);
        assert!(!blip.content.contains("Xenomorph"));
        assert!(blip.content.contains("Reactor Room"));
    }

    #[test]
    fn fallback_stays_in_character() {
        let world = starting_world(&PersonalityTable::default());
        let event = logged(
            EventDraft::new(EventKind::Action, 1, 3)
                .actor(&ActorId::new("miller"))
                .action(ActionType::Report)
                .detail(details::FALLBACK_USED, true)
                .detail(details::REASONING, "No usable decision."),
            ResultStatus::NoEffect,
            "reported in",
        );
        let lines = lines_for(&event, &world);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines.first().map(|l| l.content.as_str()),
            Some("Vanessa Miller hesitates and falls back to standard procedure.")
        );
    }

    #[test]
    fn speech_goes_to_the_report_channel() {
        let world = starting_world(&PersonalityTable::default());
        let event = logged(
            EventDraft::new(EventKind::Action, 1, 4)
                .actor(&ActorId::new("hudson"))
                .action(ActionType::Search)
                .detail(details::REASONING, "Orders are orders.")
                .detail(details::SPEECH, "Game over, man!"),
            ResultStatus::NoEffect,
            "found nothing new",
        );
        let lines = lines_for(&event, &world);
        let categories: Vec<_> = lines.iter().map(|l| l.category).collect();
        assert_eq!(
            categories,
            vec![NarrationCategory::AgentAction, NarrationCategory::AgentReport]
        );
        assert_eq!(lines.get(1).map(|l| l.content.as_str()), Some("Game over, man!"));
    }

    #[test]
    fn commands_are_narrated_verbatim() {
        let world = starting_world(&PersonalityTable::default());
        let event = logged(
            EventDraft::new(EventKind::CommandIssued, 2, 9).detail(details::COMMAND, "Search storage"),
            ResultStatus::NoEffect,
            "order broadcast",
        );
        let lines = lines_for(&event, &world);
        assert_eq!(lines.first().map(|l| l.category), Some(NarrationCategory::Commander));
        assert_eq!(lines.first().map(|l| l.content.as_str()), Some("Search storage"));
    }

    #[test]
    fn drain_returns_only_new_lines() {
        let mut stream = NarrationStream::new();
        stream.push(round_banner(1, 0));
        assert_eq!(stream.drain_new().len(), 1);
        assert!(stream.drain_new().is_empty());
        stream.push(round_banner(2, 5));
        assert_eq!(stream.drain_new().first().map(|l| l.round), Some(2));
        assert_eq!(stream.all().len(), 2);
    }

    #[test]
    fn capitalize_adds_a_full_stop() {
        assert_eq!(capitalize("lights flickered"), "Lights flickered.");
        assert_eq!(capitalize(""), "");
    }
}
