//! WASM bindings for clue-engine, powering the interactive web demo.
//!
//! Everything crosses the boundary as JSON strings. Missions, enrollment
//! and history live in an in-memory store owned by the demo instance.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use clue_engine::core::config::EngineConfig;
use clue_engine::core::features::extract_features;
use clue_engine::core::pipeline::{ClueEngine, ClueError, ClueWorld};
use clue_engine::core::schedule::Schedule;
use clue_engine::core::store::{FeatureCache, InMemoryStore, MissionDirectory};
use clue_engine::schema::clue::{ClueRequest, ClueResponse};
use clue_engine::schema::mission::{MissionFacts, MissionId, PlayerId};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct ClueInput {
    player_id: Option<String>,
    mission_id: Option<String>,
    #[serde(default)]
    debug: bool,
    /// RFC 3339; defaults to the current time.
    now: Option<String>,
}

#[derive(serde::Serialize)]
struct ClueOutput {
    ok: bool,
    clue: Option<ClueResponse>,
    error: Option<ErrorInfo>,
}

#[derive(serde::Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

#[derive(serde::Serialize)]
struct ScheduleInfo {
    day: u32,
    clarity: f64,
    max_leak_risk: f64,
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {e}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization error", e))
}

// ---------------------------------------------------------------------------
// ClueDemo, the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ClueDemo {
    engine: ClueEngine,
    store: InMemoryStore,
}

#[wasm_bindgen]
impl ClueDemo {
    /// Create a demo over the bundled template bank. The demo is a
    /// privileged client, so debug requests see the decoy flag.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<ClueDemo, JsError> {
        Ok(ClueDemo {
            engine: build_engine(seed)?,
            store: InMemoryStore::new(),
        })
    }

    /// Register a mission from its facts.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "mission_id": "mission-milan",
    ///   "started_at": "2026-06-01T08:00:00Z",
    ///   "latitude": 45.0,
    ///   "longitude": 9.0,
    ///   "prize": { "materials": ["silver"], "era": "vintage" }
    /// }
    /// ```
    pub fn add_mission(&self, facts_json: &str) -> Result<(), JsError> {
        let facts: MissionFacts =
            serde_json::from_str(facts_json).map_err(|e| js_error("Invalid mission JSON", e))?;
        self.store.add_mission(facts);
        Ok(())
    }

    /// Enroll a player, optionally making the mission their active one.
    pub fn enroll(&self, mission_id: &str, player_id: &str, make_active: bool) {
        let mission = MissionId::new(mission_id);
        let player = PlayerId::new(player_id);
        self.store.enroll(&mission, &player);
        if make_active {
            self.store.set_active(&player, &mission);
        }
    }

    /// Generate the next clue. Always returns JSON: `{ ok, clue, error }`
    /// where `error` carries the machine-readable code.
    ///
    /// Expected JSON shape:
    /// ```json
    /// { "player_id": "p-1", "mission_id": null, "debug": true, "now": null }
    /// ```
    pub fn next_clue(&self, request_json: &str) -> Result<String, JsError> {
        let input: ClueInput = serde_json::from_str(request_json)
            .map_err(|e| js_error("Invalid request JSON", e))?;
        let now = match input.now {
            Some(ref raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|e| js_error("Invalid timestamp", e))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        let request = ClueRequest {
            player: input.player_id.map(PlayerId::new),
            mission_id: input.mission_id.map(MissionId::new),
            debug: input.debug,
        };

        let output = match self
            .engine
            .generate(&request, &ClueWorld::from_store(&self.store), now)
        {
            Ok(clue) => ClueOutput {
                ok: true,
                clue: Some(clue.response),
                error: None,
            },
            Err(e) => ClueOutput {
                ok: false,
                clue: None,
                error: Some(error_info(&e)),
            },
        };
        to_json(&output)
    }

    /// JSON array of the player's records for a mission, oldest first.
    pub fn history(&self, mission_id: &str, player_id: &str) -> Result<String, JsError> {
        to_json(&self.store.records(&MissionId::new(mission_id), &PlayerId::new(player_id)))
    }

    /// JSON of the categorical features derived for a mission.
    pub fn features(&self, mission_id: &str) -> Result<String, JsError> {
        let mission = MissionId::new(mission_id);
        let facts = self
            .store
            .mission_facts(&mission)
            .map_err(|e| js_error("Store error", e))?
            .ok_or_else(|| JsError::new(&format!("Unknown mission: {mission_id}")))?;
        let features = self
            .store
            .get_or_populate(&mission, &|| extract_features(&facts))
            .map_err(|e| js_error("Store error", e))?;
        to_json(&*features)
    }

    /// JSON of the schedule values for a mission day.
    pub fn schedule(day: u32) -> Result<String, JsError> {
        let s = Schedule::for_day(day);
        to_json(&ScheduleInfo {
            day: s.day,
            clarity: s.clarity,
            max_leak_risk: s.max_leak_risk,
        })
    }

    /// Reset the engine with a new seed and clear all missions.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        self.engine = build_engine(seed)?;
        self.store = InMemoryStore::new();
        Ok(())
    }
}

fn build_engine(seed: u64) -> Result<ClueEngine, JsError> {
    ClueEngine::builder()
        .seed(seed)
        .with_config(EngineConfig {
            expose_decoy_flag: true,
            ..EngineConfig::default()
        })
        .build()
        .map_err(|e| js_error("Engine build error", e))
}

fn error_info(e: &ClueError) -> ErrorInfo {
    ErrorInfo {
        code: e.code(),
        message: e.to_string(),
    }
}
