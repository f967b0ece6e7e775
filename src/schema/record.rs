use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::Domain;
use super::mission::{MissionId, PlayerId};

/// The persisted decision behind one issued clue.
///
/// Created exactly once per successful generation and never mutated.
/// Later generations read it back to compute cooldowns, so every field
/// that feeds a cooldown must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueRecord {
    pub mission_id: MissionId,
    pub player_id: PlayerId,
    /// 1-based, strictly increasing per (mission, player).
    pub ordinal: u32,
    pub day: u32,
    pub domain: Domain,
    pub category: String,
    pub is_decoy: bool,
    /// `key:value` tags of the location traits the text was built from.
    pub location_features: Vec<String>,
    /// `key:value` tags of the prize traits the text was built from.
    pub prize_features: Vec<String>,
    pub bridge_id: Option<String>,
    pub template_id: String,
    /// FNV-1a hash of the template text, hex encoded.
    pub structure_hash: String,
    pub opening: String,
    pub clarity: f64,
    pub leak_risk: f64,
    /// True when the rendered text was rejected and replaced.
    pub fallback: bool,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ClueRecord {
    /// Every feature tag recorded on this clue, location first.
    pub fn feature_tags(&self) -> impl Iterator<Item = &str> {
        self.location_features
            .iter()
            .chain(self.prize_features.iter())
            .map(String::as_str)
    }
}
