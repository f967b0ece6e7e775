/// The clue pipeline: request → clue orchestration.
///
/// Wires together the schedule, decoy selection, cooldown filtering,
/// template selection, rendering, leak validation and recording.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::instrument;

use crate::core::config::{ConfigError, EngineConfig};
use crate::core::decoy::{is_decoy, stable_hash};
use crate::core::features::extract_features;
use crate::core::history::CooldownFilter;
use crate::core::leak;
use crate::core::recorder::{self, Decision};
use crate::core::render::Renderer;
use crate::core::schedule::Schedule;
use crate::core::selector::ClueSelector;
use crate::core::store::{ClueHistory, FeatureCache, MissionDirectory, StoreError};
use crate::core::template::{TemplateBank, TemplateError};
use crate::schema::clue::{ClueMeta, ClueRequest, ClueResponse};
use crate::schema::mission::{MissionId, PlayerId};
use crate::schema::record::ClueRecord;

#[derive(Debug, Error)]
pub enum ClueError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("no active mission for player")]
    NoActiveMission,
    #[error("player {player_id} is not enrolled in mission {mission_id}")]
    NotEnrolled {
        mission_id: MissionId,
        player_id: PlayerId,
    },
    #[error("mission not found: {0}")]
    MissionNotFound(MissionId),
    #[error("clue limit of {limit} reached")]
    LimitExceeded { limit: u32 },
    #[error("no template for clarity {clarity:.3} (decoy: {decoy})")]
    TemplatePoolExhausted { clarity: f64, decoy: bool },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl ClueError {
    /// Stable machine-readable code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NoActiveMission => "NO_ACTIVE_MISSION",
            Self::NotEnrolled { .. } => "NOT_ENROLLED",
            Self::MissionNotFound(_) => "MISSION_NOT_FOUND",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::TemplatePoolExhausted { .. } => "TEMPLATE_POOL_EXHAUSTED",
            Self::Store(_) | Self::Template(_) | Self::Config(_) => "INTERNAL",
        }
    }

    /// True for errors the player can act on; the rest are internal.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::NoActiveMission
                | Self::NotEnrolled { .. }
                | Self::MissionNotFound(_)
                | Self::LimitExceeded { .. }
        )
    }
}

/// The collaborators a generation call reads from and writes to.
#[derive(Clone, Copy)]
pub struct ClueWorld<'a> {
    pub missions: &'a dyn MissionDirectory,
    pub features: &'a dyn FeatureCache,
    pub history: &'a dyn ClueHistory,
}

impl<'a> ClueWorld<'a> {
    /// Use one store for every boundary.
    pub fn from_store<S>(store: &'a S) -> Self
    where
        S: MissionDirectory + FeatureCache + ClueHistory,
    {
        Self {
            missions: store,
            features: store,
            history: store,
        }
    }
}

/// Where per-clue randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngSource {
    /// Reproducible: the same seed gives the same clue for the same
    /// (mission, player, ordinal).
    Seeded(u64),
    Entropy,
}

/// A clue plus the record written for it.
#[derive(Debug, Clone)]
pub struct GeneratedClue {
    pub response: ClueResponse,
    pub record: ClueRecord,
    /// False when the record could not be persisted.
    pub persisted: bool,
}

/// The top-level clue engine. Built via `ClueEngine::builder()`.
pub struct ClueEngine {
    bank: TemplateBank,
    config: EngineConfig,
    rng: RngSource,
}

/// Builder for constructing a `ClueEngine`.
pub struct ClueEngineBuilder {
    templates_path: Option<PathBuf>,
    bridges_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    rng: RngSource,
    /// Directly provided bank (for testing without files).
    bank: Option<TemplateBank>,
    /// Directly provided config (for testing without files).
    config: Option<EngineConfig>,
}

impl ClueEngine {
    pub fn builder() -> ClueEngineBuilder {
        ClueEngineBuilder {
            templates_path: None,
            bridges_path: None,
            config_path: None,
            rng: RngSource::Entropy,
            bank: None,
            config: None,
        }
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate the caller's next clue.
    #[instrument(skip_all, fields(player = ?request.player, mission = ?request.mission_id))]
    pub fn generate(
        &self,
        request: &ClueRequest,
        world: &ClueWorld<'_>,
        now: DateTime<Utc>,
    ) -> Result<GeneratedClue, ClueError> {
        // 1. Identity and mission
        let player = request.player.as_ref().ok_or(ClueError::Unauthenticated)?;
        let mission_id = match &request.mission_id {
            Some(id) => id.clone(),
            None => world
                .missions
                .active_mission(player)?
                .ok_or(ClueError::NoActiveMission)?,
        };
        let facts = world
            .missions
            .mission_facts(&mission_id)?
            .ok_or_else(|| ClueError::MissionNotFound(mission_id.clone()))?;
        if !world.missions.is_enrolled(&mission_id, player)? {
            return Err(ClueError::NotEnrolled {
                mission_id,
                player_id: player.clone(),
            });
        }

        // 2. Features (populated once per mission)
        let features = world
            .features
            .get_or_populate(&mission_id, &|| extract_features(&facts))?;

        // 3. Schedule
        let schedule = Schedule::at(facts.started_at, now);
        tracing::debug!(
            day = schedule.day,
            clarity = schedule.clarity,
            ceiling = schedule.max_leak_risk,
            "schedule"
        );

        // 4. History, then the ordinal. Allocation is atomic in the store.
        let history = world
            .history
            .recent(&mission_id, player, self.config.history_depth)?;
        let ordinal = world
            .history
            .reserve_ordinal(&mission_id, player, self.config.ordinal_cap)
            .map_err(|err| match err {
                StoreError::OrdinalCapReached { cap } => ClueError::LimitExceeded { limit: cap },
                other => ClueError::Store(other),
            })?;

        // 5. Decoy
        let decoy = is_decoy(&mission_id, ordinal);
        tracing::debug!(ordinal, decoy, "decoy decision");

        // 6. Selection under cooldowns
        let mut rng = self.rng_for(&mission_id, player, ordinal);
        let cooldowns = CooldownFilter::from_history(&history, self.config.cooldown_windows());
        let selection = ClueSelector::new(&self.bank, &cooldowns)
            .select(
                schedule.clarity,
                decoy,
                &features,
                self.config.bridge_chance,
                &mut rng,
            )
            .ok_or(ClueError::TemplatePoolExhausted {
                clarity: schedule.clarity,
                decoy,
            })?;
        tracing::debug!(
            template = %selection.template.id,
            bridge = ?selection.bridge.map(|b| b.id.as_str()),
            "selected"
        );

        // 7. Render and validate
        let text = Renderer::new(&features, &facts).render(
            selection.template,
            &selection.values,
            selection.bridge,
            &mut rng,
        );
        let verdict = leak::validate(
            text,
            &facts,
            schedule.max_leak_risk,
            &self.config.fallback_text,
        );

        // 8. Record
        let record = Decision {
            mission_id: &mission_id,
            player_id: player,
            ordinal,
            schedule,
            is_decoy: decoy,
            selection: &selection,
            features: &features,
            verdict: &verdict,
            created_at: now,
        }
        .package();
        let persisted = recorder::persist(world.history, record.clone());

        let is_fake = (request.debug && self.config.expose_decoy_flag).then_some(decoy);
        let response = ClueResponse {
            text: record.text.clone(),
            category: record.category.clone(),
            domain: record.domain,
            day: record.day,
            index: ordinal,
            clarity: record.clarity,
            meta: ClueMeta {
                mission_id: mission_id.clone(),
                is_fake,
                leak_risk: record.leak_risk,
            },
        };

        tracing::info!(
            mission = %mission_id,
            player = %player,
            ordinal,
            day = record.day,
            domain = record.domain.label(),
            category = %record.category,
            fallback = record.fallback,
            "clue issued"
        );

        Ok(GeneratedClue {
            response,
            record,
            persisted,
        })
    }

    fn rng_for(&self, mission: &MissionId, player: &PlayerId, ordinal: u32) -> StdRng {
        match self.rng {
            RngSource::Seeded(seed) => {
                let key = format!("{}:{}:{}", mission.as_str(), player.as_str(), ordinal);
                StdRng::seed_from_u64(seed ^ stable_hash(&key))
            }
            RngSource::Entropy => StdRng::from_entropy(),
        }
    }
}

impl ClueEngineBuilder {
    /// Override bundled templates from a RON file; entries replace bundled
    /// ones with the same id.
    pub fn templates_path(mut self, path: impl AsRef<Path>) -> Self {
        self.templates_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn bridges_path(mut self, path: impl AsRef<Path>) -> Self {
        self.bridges_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = RngSource::Seeded(seed);
        self
    }

    pub fn entropy(mut self) -> Self {
        self.rng = RngSource::Entropy;
        self
    }

    /// Provide the whole bank directly (for testing without files).
    pub fn with_bank(mut self, bank: TemplateBank) -> Self {
        self.bank = Some(bank);
        self
    }

    /// Provide config directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<ClueEngine, ClueError> {
        let mut bank = match self.bank {
            Some(bank) => bank,
            None => TemplateBank::bundled()?,
        };

        // Game-specific content overrides the base bank
        if let Some(ref path) = self.templates_path {
            bank.merge(TemplateBank {
                templates: TemplateBank::load_templates(path)?,
                bridges: Vec::new(),
            });
        }
        if let Some(ref path) = self.bridges_path {
            bank.merge(TemplateBank {
                templates: Vec::new(),
                bridges: TemplateBank::load_bridges(path)?,
            });
        }

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(&path)?,
            (None, None) => EngineConfig::default(),
        };
        config.validate()?;

        let gaps = bank.coverage_gaps();
        if !gaps.is_empty() {
            tracing::warn!(?gaps, "template bank leaves schedule days uncovered");
        }

        Ok(ClueEngine {
            bank,
            config,
            rng: self.rng,
        })
    }
}
