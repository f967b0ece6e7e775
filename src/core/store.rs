/// Collaborator boundaries: mission lookup, the features cache and clue
/// history, plus the in-memory implementations used by tests, tools and
/// the WASM binding.
///
/// Ordinal allocation must be a single atomic step inside the store.
/// Counting existing records and adding one is a read-then-write race:
/// two concurrent requests would both see N and both issue N + 1.

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::schema::features::MissionFeatures;
use crate::schema::mission::{MissionFacts, MissionId, PlayerId};
use crate::schema::record::ClueRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("clue ordinal cap of {cap} reached")]
    OrdinalCapReached { cap: u32 },
    #[error("ordinal {ordinal} already recorded for mission {mission_id}, player {player_id}")]
    DuplicateOrdinal {
        mission_id: MissionId,
        player_id: PlayerId,
        ordinal: u32,
    },
}

/// Mission setup and enrollment, owned outside the engine.
pub trait MissionDirectory {
    fn mission_facts(&self, mission: &MissionId) -> Result<Option<MissionFacts>, StoreError>;
    fn is_enrolled(&self, mission: &MissionId, player: &PlayerId) -> Result<bool, StoreError>;
    fn active_mission(&self, player: &PlayerId) -> Result<Option<MissionId>, StoreError>;
}

/// Per-mission features, populated once and read-only afterwards.
pub trait FeatureCache {
    /// Return the cached features, running `populate` only if the mission
    /// has none yet. A populated entry is never replaced.
    fn get_or_populate(
        &self,
        mission: &MissionId,
        populate: &dyn Fn() -> MissionFeatures,
    ) -> Result<Arc<MissionFeatures>, StoreError>;
}

/// The persisted decision records.
pub trait ClueHistory {
    /// Up to `n` records for (mission, player), newest first.
    fn recent(
        &self,
        mission: &MissionId,
        player: &PlayerId,
        n: usize,
    ) -> Result<Vec<ClueRecord>, StoreError>;

    /// Atomically allocate the next 1-based ordinal. Fails with
    /// `OrdinalCapReached` without writing anything once `cap` ordinals
    /// have been issued.
    fn reserve_ordinal(
        &self,
        mission: &MissionId,
        player: &PlayerId,
        cap: u32,
    ) -> Result<u32, StoreError>;

    /// Persist one record. A second record with the same ordinal is
    /// rejected.
    fn append(&self, record: ClueRecord) -> Result<(), StoreError>;
}

/// Write-once mission features cache.
#[derive(Debug, Default)]
pub struct MissionFeatureCache {
    entries: DashMap<MissionId, Arc<MissionFeatures>>,
}

impl MissionFeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mission: &MissionId) -> Option<Arc<MissionFeatures>> {
        self.entries.get(mission).map(|f| Arc::clone(f.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FeatureCache for MissionFeatureCache {
    fn get_or_populate(
        &self,
        mission: &MissionId,
        populate: &dyn Fn() -> MissionFeatures,
    ) -> Result<Arc<MissionFeatures>, StoreError> {
        if let Some(features) = self.get(mission) {
            return Ok(features);
        }
        let entry = self
            .entries
            .entry(mission.clone())
            .or_insert_with(|| {
                tracing::debug!(mission = %mission, "populating mission features");
                Arc::new(populate())
            });
        Ok(Arc::clone(entry.value()))
    }
}

type HistoryKey = (MissionId, PlayerId);

/// Everything the engine needs, held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    missions: DashMap<MissionId, MissionFacts>,
    enrollments: DashSet<HistoryKey>,
    active: DashMap<PlayerId, MissionId>,
    features: MissionFeatureCache,
    counters: DashMap<HistoryKey, u32>,
    records: DashMap<HistoryKey, Vec<ClueRecord>>,
    fail_appends: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a mission's facts.
    pub fn add_mission(&self, facts: MissionFacts) {
        self.missions.insert(facts.mission_id.clone(), facts);
    }

    pub fn enroll(&self, mission: &MissionId, player: &PlayerId) {
        self.enrollments.insert((mission.clone(), player.clone()));
    }

    pub fn set_active(&self, player: &PlayerId, mission: &MissionId) {
        self.active.insert(player.clone(), mission.clone());
    }

    /// Seed a record directly, keeping the ordinal counter at or above it.
    pub fn insert_record(&self, record: ClueRecord) {
        let key = (record.mission_id.clone(), record.player_id.clone());
        let mut counter = self.counters.entry(key.clone()).or_insert(0);
        *counter = (*counter).max(record.ordinal);
        drop(counter);
        self.records.entry(key).or_default().push(record);
    }

    /// All records for (mission, player), oldest first.
    pub fn records(&self, mission: &MissionId, player: &PlayerId) -> Vec<ClueRecord> {
        let mut records = self
            .records
            .get(&(mission.clone(), player.clone()))
            .map(|r| r.value().clone())
            .unwrap_or_default();
        records.sort_by_key(|r| r.ordinal);
        records
    }

    /// The last ordinal handed out for (mission, player).
    pub fn counter(&self, mission: &MissionId, player: &PlayerId) -> u32 {
        self.counters
            .get(&(mission.clone(), player.clone()))
            .map(|c| *c)
            .unwrap_or(0)
    }

    /// Make every subsequent `append` fail, to exercise persistence errors.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn feature_cache(&self) -> &MissionFeatureCache {
        &self.features
    }
}

impl MissionDirectory for InMemoryStore {
    fn mission_facts(&self, mission: &MissionId) -> Result<Option<MissionFacts>, StoreError> {
        Ok(self.missions.get(mission).map(|f| f.value().clone()))
    }

    fn is_enrolled(&self, mission: &MissionId, player: &PlayerId) -> Result<bool, StoreError> {
        Ok(self
            .enrollments
            .contains(&(mission.clone(), player.clone())))
    }

    fn active_mission(&self, player: &PlayerId) -> Result<Option<MissionId>, StoreError> {
        Ok(self.active.get(player).map(|m| m.value().clone()))
    }
}

impl FeatureCache for InMemoryStore {
    fn get_or_populate(
        &self,
        mission: &MissionId,
        populate: &dyn Fn() -> MissionFeatures,
    ) -> Result<Arc<MissionFeatures>, StoreError> {
        self.features.get_or_populate(mission, populate)
    }
}

impl ClueHistory for InMemoryStore {
    fn recent(
        &self,
        mission: &MissionId,
        player: &PlayerId,
        n: usize,
    ) -> Result<Vec<ClueRecord>, StoreError> {
        let mut records = self.records(mission, player);
        records.reverse();
        records.truncate(n);
        Ok(records)
    }

    fn reserve_ordinal(
        &self,
        mission: &MissionId,
        player: &PlayerId,
        cap: u32,
    ) -> Result<u32, StoreError> {
        // The entry guard holds the shard lock for the whole check-and-bump.
        match self.counters.entry((mission.clone(), player.clone())) {
            Entry::Occupied(mut entry) => {
                if *entry.get() >= cap {
                    return Err(StoreError::OrdinalCapReached { cap });
                }
                *entry.get_mut() += 1;
                Ok(*entry.get())
            }
            Entry::Vacant(entry) => {
                if cap == 0 {
                    return Err(StoreError::OrdinalCapReached { cap });
                }
                entry.insert(1);
                Ok(1)
            }
        }
    }

    fn append(&self, record: ClueRecord) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("appends disabled".to_string()));
        }
        let key = (record.mission_id.clone(), record.player_id.clone());
        let mut records = self.records.entry(key).or_default();
        if records.iter().any(|r| r.ordinal == record.ordinal) {
            return Err(StoreError::DuplicateOrdinal {
                mission_id: record.mission_id,
                player_id: record.player_id,
                ordinal: record.ordinal,
            });
        }
        records.push(record);
        Ok(())
    }
}
