//! Narration lines delivered to the presentation layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::NarrationCategory;

/// One line of in-fiction narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NarrationLine {
    /// The round the line belongs to.
    pub round: u32,
    /// The tick of the event that produced it.
    pub tick: u64,
    /// Who is speaking ("Pvt. Hudson", "Motion Tracker", "SYSTEM").
    pub sender: String,
    /// The line itself.
    pub content: String,
    /// Delivery channel.
    pub category: NarrationCategory,
}
