/// Cooldown filtering: anti-repetition over a player's recent clues.
///
/// Two independent windows: the `category_window` most recent records
/// exclude their (domain, category) pair, the `feature_window` most recent
/// records exclude their individual trait values. A third window covers
/// bridge ids. Every narrowing falls back to its input when it would
/// leave nothing: repeating is better than failing to generate.

use rustc_hash::FxHashSet;

use crate::core::template::{BridgeMetaphor, ClueTemplate};
use crate::schema::features::{Domain, FeatureValue, MissionFeatures};
use crate::schema::record::ClueRecord;

/// Window sizes, counted in records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownWindows {
    pub category: usize,
    pub feature: usize,
    pub bridge: usize,
}

impl Default for CooldownWindows {
    fn default() -> Self {
        Self {
            category: 2,
            feature: 5,
            bridge: 5,
        }
    }
}

/// What the recent history rules out for the next clue.
#[derive(Debug, Clone, Default)]
pub struct CooldownFilter {
    categories: FxHashSet<(Domain, String)>,
    features: FxHashSet<String>,
    bridges: FxHashSet<String>,
}

impl CooldownFilter {
    /// Build from records ordered newest first.
    pub fn from_history(history: &[ClueRecord], windows: CooldownWindows) -> Self {
        let categories = history
            .iter()
            .take(windows.category)
            .map(|r| (r.domain, r.category.clone()))
            .collect();
        let features = history
            .iter()
            .take(windows.feature)
            .flat_map(|r| r.feature_tags().map(str::to_string))
            .collect();
        let bridges = history
            .iter()
            .take(windows.bridge)
            .filter_map(|r| r.bridge_id.clone())
            .collect();
        Self {
            categories,
            features,
            bridges,
        }
    }

    pub fn category_cooling(&self, domain: Domain, category: &str) -> bool {
        self.categories.contains(&(domain, category.to_string()))
    }

    pub fn feature_cooling(&self, value: FeatureValue) -> bool {
        self.features.contains(&value.tag())
    }

    pub fn bridge_cooling(&self, id: &str) -> bool {
        self.bridges.contains(id)
    }

    /// Drop templates whose category is cooling, then templates that could
    /// only be rendered with cooling trait values. Each step keeps its
    /// input if it would empty the pool, so an exhausted first step hands
    /// back the original pool.
    pub fn filter_templates<'a>(
        &self,
        pool: Vec<&'a ClueTemplate>,
        features: &MissionFeatures,
    ) -> Vec<&'a ClueTemplate> {
        let by_category = narrow(pool, |t| !self.category_cooling(t.domain, &t.category));
        narrow(by_category, |t| {
            t.requires.iter().all(|key| {
                features
                    .values_for(*key)
                    .into_iter()
                    .any(|v| !self.feature_cooling(v))
            })
        })
    }

    /// Drop trait values used within the feature window.
    pub fn filter_values(&self, pool: Vec<FeatureValue>) -> Vec<FeatureValue> {
        narrow(pool, |v| !self.feature_cooling(*v))
    }

    /// Drop bridges used within the bridge window.
    pub fn filter_bridges<'a>(&self, pool: Vec<&'a BridgeMetaphor>) -> Vec<&'a BridgeMetaphor> {
        narrow(pool, |b| !self.bridge_cooling(&b.id))
    }
}

/// Keep the entries passing `keep`; if none pass, return `pool` untouched.
pub fn narrow<T: Clone>(pool: Vec<T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    let kept: Vec<T> = pool.iter().filter(|item| keep(item)).cloned().collect();
    if kept.is_empty() {
        if !pool.is_empty() {
            tracing::warn!(pool = pool.len(), "cooldown would empty pool, keeping original");
        }
        pool
    } else {
        kept
    }
}
