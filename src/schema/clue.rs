use serde::{Deserialize, Serialize};

use super::features::Domain;
use super::mission::{MissionId, PlayerId};

/// A request for the caller's next clue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClueRequest {
    /// Authenticated caller; `None` when the transport found no identity.
    pub player: Option<PlayerId>,
    /// Explicit mission; defaults to the caller's active mission.
    #[serde(default)]
    pub mission_id: Option<MissionId>,
    /// Ask for privileged debug metadata (honoured only when the engine
    /// is configured to expose it).
    #[serde(default)]
    pub debug: bool,
}

impl ClueRequest {
    pub fn for_player(player: PlayerId) -> Self {
        Self {
            player: Some(player),
            mission_id: None,
            debug: false,
        }
    }

    pub fn in_mission(mut self, mission_id: MissionId) -> Self {
        self.mission_id = Some(mission_id);
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

/// The payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueResponse {
    pub text: String,
    pub category: String,
    pub domain: Domain,
    pub day: u32,
    pub index: u32,
    pub clarity: f64,
    pub meta: ClueMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueMeta {
    pub mission_id: MissionId,
    /// Decoy classification. Only present for debug requests on an engine
    /// configured with `expose_decoy_flag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fake: Option<bool>,
    pub leak_risk: f64,
}
