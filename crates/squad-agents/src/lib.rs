//! Action vocabulary, validation and actor psychology for the squad
//! turn simulation.
//!
//! This crate holds the pure decision logic: nothing here performs I/O or
//! owns world state. The orchestrator in `squad-core` assembles contexts
//! from the world and feeds them through these functions.
//!
//! # Modules
//!
//! - [`catalog`] -- Versioned action vocabulary, target rules and synonyms ([`ActionCatalog`])
//! - [`validation`] -- Candidate validation ([`validate`])
//! - [`fallback`] -- Deterministic fallback table ([`FallbackTable`])
//! - [`compliance`] -- Compliance probability and rolls ([`resolve_compliance`])
//! - [`stress`] -- Stress updates and panic bands ([`update_stress`], [`panic_band`])
//! - [`config`] -- Stress and personality tuning ([`StressConfig`], [`PersonalityTable`])
//! - [`error`] -- Configuration errors ([`CatalogError`])

pub mod catalog;
pub mod compliance;
pub mod config;
pub mod error;
pub mod fallback;
pub mod stress;
pub mod validation;

pub use catalog::{ActionCatalog, ActionSpec};
pub use compliance::{ComplianceResolution, compliance_probability, resolve_compliance};
pub use config::{PanicBands, PersonalityProfile, PersonalityTable, StressConfig};
pub use error::CatalogError;
pub use fallback::{FallbackRule, FallbackTable};
pub use stress::{PanicContext, PanicResponse, panic_action, panic_band, update_stress};
pub use validation::{ItemRef, Named, ValidationContext, validate};
