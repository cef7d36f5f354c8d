//! Configuration loading and typed config structures for the squad
//! simulation.
//!
//! The canonical configuration lives in `squad-config.yaml` at the project
//! root. Every section is optional; omitted values fall back to the
//! defaults documented on each field. [`SimulationConfig::rules`] checks the
//! catalog, fallback table and panic bands together and is the point where
//! configuration mistakes become fatal.

use std::path::Path;

use serde::Deserialize;
use squad_agents::fallback::builtin_rules;
use squad_agents::{
    ActionCatalog, CatalogError, FallbackRule, FallbackTable, PersonalityTable, StressConfig,
};
use squad_events::ProjectionRules;
use squad_types::{ItemId, ZoneId};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The catalog, fallback table or stress table is inconsistent.
    #[error("invalid simulation rules: {source}")]
    Invalid {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `squad-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Mission parameters (seed, round limit, objective).
    #[serde(default)]
    pub mission: MissionConfig,

    /// Decision pipeline parameters.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Stress deltas and panic bands.
    #[serde(default)]
    pub stress: StressConfig,

    /// Base compliance and initiative per personality.
    #[serde(default)]
    pub personalities: PersonalityTable,

    /// Fallback rules, matched in order.
    #[serde(default = "builtin_rules")]
    pub fallback: Vec<FallbackRule>,

    /// Action vocabulary, target rules and synonyms.
    #[serde(default)]
    pub catalog: ActionCatalog,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mission: MissionConfig::default(),
            decision: DecisionConfig::default(),
            stress: StressConfig::default(),
            personalities: PersonalityTable::default(),
            fallback: builtin_rules(),
            catalog: ActionCatalog::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check the configuration and assemble the runtime rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the catalog has gaps, the
    /// fallback table lacks a catch-all or uses a targeted action, or the
    /// panic bands are out of order.
    pub fn rules(&self) -> Result<Rules, ConfigError> {
        self.catalog.check()?;
        self.stress.check()?;
        let fallback = FallbackTable::new(self.fallback.clone(), &self.catalog)?;
        Ok(Rules {
            projection: ProjectionRules {
                catalog: self.catalog.clone(),
                stress: self.stress.clone(),
            },
            fallback,
            personalities: self.personalities.clone(),
            mission: self.mission.clone(),
            decision: self.decision.clone(),
        })
    }
}

/// Mission parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MissionConfig {
    /// Random seed for compliance and skill rolls.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// The mission is lost once the round counter passes this value.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Living marines needed for a full win.
    #[serde(default = "default_min_survivors")]
    pub min_survivors: usize,

    /// The item to bring to the extraction zone.
    #[serde(default = "default_objective_item")]
    pub objective_item: ItemId,

    /// Where the objective must end up.
    #[serde(default = "default_extraction_zone")]
    pub extraction_zone: ZoneId,
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_rounds() -> u32 {
    20
}

const fn default_min_survivors() -> usize {
    2
}

fn default_objective_item() -> ItemId {
    ItemId::new("data_core")
}

fn default_extraction_zone() -> ZoneId {
    ZoneId::new("dropship")
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_rounds: default_max_rounds(),
            min_survivors: default_min_survivors(),
            objective_item: default_objective_item(),
            extraction_zone: default_extraction_zone(),
        }
    }
}

/// Decision pipeline parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecisionConfig {
    /// Collaborator calls allowed after the first (default: 2).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Milliseconds allowed per collaborator call (default: 30000).
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Recent events handed to the collaborator (default: 8).
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_call_timeout_ms() -> u64 {
    30_000
}

const fn default_memory_window() -> usize {
    8
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            call_timeout_ms: default_call_timeout_ms(),
            memory_window: default_memory_window(),
        }
    }
}

/// The checked rule set the orchestrator runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    /// Catalog and stress deltas used to apply events.
    pub projection: ProjectionRules,
    /// Checked fallback table.
    pub fallback: FallbackTable,
    /// Personality table.
    pub personalities: PersonalityTable,
    /// Mission parameters.
    pub mission: MissionConfig,
    /// Decision pipeline parameters.
    pub decision: DecisionConfig,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use squad_types::{ActionType, Personality, Role};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.mission.seed, 42);
        assert_eq!(config.mission.max_rounds, 20);
        assert_eq!(config.decision.max_retries, 2);
        assert_eq!(config.stress.panic.flee_at, 8);
        assert!(config.rules().is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = SimulationConfig::parse(include_str!("../../../squad-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
mission:
  seed: 7
  max_rounds: 12
  objective_item: flight_recorder

decision:
  max_retries: 1
  call_timeout_ms: 500

stress:
  damage_taken: 3
  panic:
    freeze_at: 6

personalities:
  nervous:
    base_compliance: 0.5
    initiative: 4

fallback:
  - role: marine
    action: hold_position
  - role: antagonist
    action: hide
  - role: director
    action: ambient_noise
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.mission.seed, 7);
        assert_eq!(config.mission.objective_item, ItemId::new("flight_recorder"));
        assert_eq!(config.mission.extraction_zone, ZoneId::new("dropship"));
        assert_eq!(config.decision.max_retries, 1);
        assert_eq!(config.decision.memory_window, 8);
        assert_eq!(config.stress.damage_taken, 3);
        assert_eq!(config.stress.panic.freeze_at, 6);
        assert_eq!(config.stress.panic.fight_at, 10);
        let nervous = config.personalities.profile(Personality::Nervous);
        assert_eq!(nervous.base_compliance, dec!(0.5));
        assert_eq!(nervous.initiative, 4);

        let rules = config.rules().unwrap();
        assert_eq!(
            rules.fallback.lookup(Role::Antagonist, None, 0).action,
            ActionType::Hide
        );
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn broken_fallback_table_is_fatal() {
        let yaml = r"
fallback:
  - role: marine
    action: report
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(matches!(
            config.rules(),
            Err(ConfigError::Invalid {
                source: CatalogError::MissingCatchAll(Role::Antagonist)
            })
        ));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            SimulationConfig::parse("mission: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
