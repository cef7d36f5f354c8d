//! Command-line runner for the squad simulation.
//!
//! Reads one commander order per line from stdin, plays a round per line
//! and prints the narration as it happens. Once stdin is exhausted the
//! remaining rounds run without orders until the mission ends.
//!
//! # Architecture
//!
//! ```text
//! stdin (orders) --> TurnEngine --> collaborator (LLM or offline) --> narration (stdout)
//! ```

mod collaborator;
mod config;
mod error;
mod llm;
mod parse;

use anyhow::Context;
use squad_core::{ReasoningCollaborator, SimulationConfig, TurnEngine};
use squad_types::{NarrationCategory, NarrationLine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::collaborator::{LlmCollaborator, OfflineCollaborator};
use crate::config::RunnerConfig;
use crate::llm::LlmBackend;

/// Application entry point.
///
/// Initializes logging, loads configuration, picks a collaborator and plays
/// the mission to its end.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("squad-runner starting");

    let config = RunnerConfig::from_env()?;
    let simulation = match &config.config_path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    info!(
        seed = simulation.mission.seed,
        max_rounds = simulation.mission.max_rounds,
        max_retries = simulation.decision.max_retries,
        call_timeout_ms = simulation.decision.call_timeout_ms,
        "configuration loaded"
    );

    match &config.backend {
        Some(backend_config) => {
            let backend = LlmBackend::new(backend_config);
            info!(backend = backend.name(), model = backend.model(), "LLM backend configured");
            play(LlmCollaborator::new(backend), &simulation, &config).await
        }
        None => {
            warn!("LLM_BACKEND not set, playing with the offline collaborator");
            play(OfflineCollaborator, &simulation, &config).await
        }
    }
}

/// Run rounds until the mission ends or the round limit is hit.
async fn play<C: ReasoningCollaborator>(
    collaborator: C,
    simulation: &SimulationConfig,
    config: &RunnerConfig,
) -> anyhow::Result<()> {
    let engine = TurnEngine::new(collaborator, simulation)?;
    let mut state = engine.start();
    let mut orders = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut played: u32 = 0;

    while !state.is_terminated() && config.max_rounds.is_none_or(|limit| played < limit) {
        let command = if stdin_open {
            let line = orders.next_line().await?;
            stdin_open = line.is_some();
            line.unwrap_or_default()
        } else {
            String::new()
        };
        engine.run_round(&mut state, &command).await?;
        played = played.saturating_add(1);
        for line in state.narration.drain_new() {
            println!("{}", render(&line));
        }
    }

    match &state.verdict {
        Some(verdict) => info!(outcome = ?verdict.outcome, reason = %verdict.reason, rounds = played, "mission over"),
        None => info!(rounds = played, "stopped before the mission ended"),
    }

    if let Some(path) = &config.event_log_path {
        std::fs::write(path, state.log.to_json()?).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), events = state.log.len(), "event log written");
    }
    Ok(())
}

fn render(line: &NarrationLine) -> String {
    let tag = match line.category {
        NarrationCategory::System => "SYS",
        NarrationCategory::Commander => "CMD",
        NarrationCategory::AgentAction => "ACT",
        NarrationCategory::AgentReport => "RAD",
        NarrationCategory::Panic => "!!!",
        NarrationCategory::Director => "ENV",
        NarrationCategory::GameEnd => "END",
    };
    format!("[{tag} r{:02}] {}: {}", line.round, line.sender, line.content)
}
