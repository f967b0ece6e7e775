use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a mission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissionId(pub String);

/// Unique identifier for an enrolled player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl MissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form description of the hidden prize. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeProfile {
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub origin: Option<String>,
    /// Era keyword ("vintage", "roman", ...) or a year ("1962").
    #[serde(default)]
    pub era: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
}

/// Raw facts about a mission, as owned by the mission store.
///
/// The engine only reads these. `city`, `street` and `forbidden_terms`
/// are never rendered; they exist so the leak validator can reject text
/// that names them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionFacts {
    pub mission_id: MissionId,
    pub started_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub coast_distance_km: Option<f64>,
    #[serde(default)]
    pub is_island: bool,
    #[serde(default)]
    pub forbidden_terms: Vec<String>,
    #[serde(default)]
    pub prize: Option<PrizeProfile>,
}

impl MissionFacts {
    /// Facts with only the required fields set.
    pub fn new(
        mission_id: MissionId,
        started_at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            mission_id,
            started_at,
            latitude,
            longitude,
            city: None,
            street: None,
            population: None,
            coast_distance_km: None,
            is_island: false,
            forbidden_terms: Vec::new(),
            prize: None,
        }
    }

    /// Strings that must never appear in rendered text.
    pub fn protected_terms(&self) -> impl Iterator<Item = &str> {
        self.city
            .iter()
            .chain(self.street.iter())
            .chain(self.forbidden_terms.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}
