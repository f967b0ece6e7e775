/// Engine tuning, loadable from RON like the rest of the authored content.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::history::CooldownWindows;
use crate::core::leak;
use crate::core::schedule::{self, FIRST_DAY};

/// Hard ceiling on clues per (mission, player).
pub const MAX_ORDINAL_CAP: u32 = 250;

/// Sentence returned in place of a clue that failed leak validation.
pub const DEFAULT_FALLBACK_TEXT: &str =
    "The trail runs quiet today. Keep your eyes open and look again tomorrow.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Records whose (domain, category) is excluded from the next pick.
    pub category_cooldown: usize,
    /// Records whose trait values are excluded from the next pick.
    pub feature_cooldown: usize,
    /// Records whose bridge id is excluded from the next pick.
    pub bridge_cooldown: usize,
    /// How many records to read back per request.
    pub history_depth: usize,
    /// Maximum clues per (mission, player).
    pub ordinal_cap: u32,
    /// Probability of attempting a bridge metaphor.
    pub bridge_chance: f64,
    /// Allow debug requests to see the decoy flag.
    pub expose_decoy_flag: bool,
    pub fallback_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            category_cooldown: 2,
            feature_cooldown: 5,
            bridge_cooldown: 5,
            history_depth: 10,
            ordinal_cap: MAX_ORDINAL_CAP,
            bridge_chance: 0.35,
            expose_decoy_flag: false,
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let widest = self
            .category_cooldown
            .max(self.feature_cooldown)
            .max(self.bridge_cooldown);
        if self.history_depth < widest {
            return Err(ConfigError::Invalid(format!(
                "history_depth {} is shorter than the widest cooldown ({})",
                self.history_depth, widest
            )));
        }
        if !(0.0..=1.0).contains(&self.bridge_chance) {
            return Err(ConfigError::Invalid(format!(
                "bridge_chance {} is not within [0, 1]",
                self.bridge_chance
            )));
        }
        if !(1..=MAX_ORDINAL_CAP).contains(&self.ordinal_cap) {
            return Err(ConfigError::Invalid(format!(
                "ordinal_cap {} is not within [1, {}]",
                self.ordinal_cap, MAX_ORDINAL_CAP
            )));
        }
        if self.fallback_text.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback_text is empty".to_string()));
        }
        // The fallback must pass on the strictest day.
        let floor = schedule::max_leak_risk(FIRST_DAY);
        let score = leak::generic_score(&self.fallback_text);
        if score > floor {
            return Err(ConfigError::Invalid(format!(
                "fallback_text scores {:.2} leak risk, above the day-one ceiling {:.2}",
                score, floor
            )));
        }
        Ok(())
    }

    pub fn cooldown_windows(&self) -> CooldownWindows {
        CooldownWindows {
            category: self.category_cooldown,
            feature: self.feature_cooldown,
            bridge: self.bridge_cooldown,
        }
    }
}
