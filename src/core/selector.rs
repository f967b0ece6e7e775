/// Template and bridge selection.
///
/// Clarity and decoy match are hard constraints; cooldowns only narrow the
/// choice among templates that already satisfy them.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::history::CooldownFilter;
use crate::core::template::{BridgeMetaphor, ClueTemplate, TemplateBank};
use crate::schema::features::{FeatureValue, MissionFeatures};

/// Everything chosen for one clue before rendering.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub template: &'a ClueTemplate,
    /// One value per required trait, in `template.requires` order.
    pub values: Vec<FeatureValue>,
    pub bridge: Option<&'a BridgeMetaphor>,
}

pub struct ClueSelector<'a> {
    bank: &'a TemplateBank,
    cooldowns: &'a CooldownFilter,
}

impl<'a> ClueSelector<'a> {
    pub fn new(bank: &'a TemplateBank, cooldowns: &'a CooldownFilter) -> Self {
        Self { bank, cooldowns }
    }

    /// Pick a template, its trait values and an optional bridge. `None`
    /// means no template satisfies clarity and decoy even without
    /// cooldowns.
    pub fn select(
        &self,
        clarity: f64,
        decoy: bool,
        features: &MissionFeatures,
        bridge_chance: f64,
        rng: &mut StdRng,
    ) -> Option<Selection<'a>> {
        let template = self.select_template(clarity, decoy, features, rng)?;
        let values = self.select_values(template, features, rng);
        let bridge = if rng.gen_bool(bridge_chance.clamp(0.0, 1.0)) {
            self.select_bridge(clarity, decoy, features, &values, rng)
        } else {
            None
        };
        Some(Selection {
            template,
            values,
            bridge,
        })
    }

    pub fn select_template(
        &self,
        clarity: f64,
        decoy: bool,
        features: &MissionFeatures,
        rng: &mut StdRng,
    ) -> Option<&'a ClueTemplate> {
        let eligible = self.bank.eligible(clarity, decoy);
        if eligible.is_empty() {
            return None;
        }
        let pool = self.cooldowns.filter_templates(eligible, features);
        pool.choose(rng).copied()
    }

    /// One value per required key, preferring values outside the feature
    /// cooldown.
    pub fn select_values(
        &self,
        template: &ClueTemplate,
        features: &MissionFeatures,
        rng: &mut StdRng,
    ) -> Vec<FeatureValue> {
        template
            .requires
            .iter()
            .filter_map(|key| {
                let pool = self.cooldowns.filter_values(features.values_for(*key));
                pool.choose(rng).copied()
            })
            .collect()
    }

    /// Prefer bridges that touch the chosen values, then any bridge that
    /// applies to the mission, then none. Decoys only get generic bridges.
    pub fn select_bridge(
        &self,
        clarity: f64,
        decoy: bool,
        features: &MissionFeatures,
        chosen: &[FeatureValue],
        rng: &mut StdRng,
    ) -> Option<&'a BridgeMetaphor> {
        let eligible: Vec<&'a BridgeMetaphor> = self
            .bank
            .bridges
            .iter()
            .filter(|b| b.clarity.contains(clarity))
            .filter(|b| if decoy { b.is_generic() } else { b.applies_to(features) })
            .collect();
        let pool = self.cooldowns.filter_bridges(eligible);

        let preferred: Vec<&'a BridgeMetaphor> =
            pool.iter().copied().filter(|b| b.touches(chosen)).collect();
        if let Some(bridge) = preferred.choose(rng) {
            return Some(*bridge);
        }
        pool.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::CooldownWindows;
    use crate::schema::features::{
        Climate, CoastalProximity, Domain, FeatureKey, Hemisphere, HistoryTone, LatitudeBand,
        LocationFeatures, Material, OriginStyle, PrizeFeatures, TimezoneBand, UrbanDensity,
        UseContext, ValueTier,
    };
    use rand::SeedableRng;

    fn features() -> MissionFeatures {
        MissionFeatures {
            location: LocationFeatures {
                hemisphere: Hemisphere::North,
                latitude_band: LatitudeBand::Temperate,
                climate: Climate::Mediterranean,
                coast: CoastalProximity::Coastal,
                urban: UrbanDensity::Urban,
                timezone: TimezoneBand::Central,
            },
            prize: PrizeFeatures {
                materials: vec![Material::Silver],
                origin: OriginStyle::European,
                use_context: UseContext::Collectible,
                history_tone: HistoryTone::Vintage,
                value_tier: ValueTier::Mid,
            },
        }
    }

    fn bank() -> TemplateBank {
        TemplateBank {
            templates: TemplateBank::parse_templates_ron(
                r#"[
                    Template(id: "low", domain: location, category: "climate", opening: "o", clarity: (0.1, 0.3), text: "Under {climate}."),
                    Template(id: "high", domain: prize, category: "craft", opening: "o", clarity: (0.7, 1.0), text: "Made of {material} by {origin}."),
                    Template(id: "fake", domain: location, category: "rumour", opening: "o", clarity: (0.1, 1.0), text: "Near {false_place}.", decoy: true),
                ]"#,
            )
            .unwrap(),
            bridges: TemplateBank::parse_bridges_ron(
                r#"[
                    Bridge(id: "generic", text: "Place and prize agree.", clarity: (0.1, 1.0)),
                    Bridge(id: "salt", text: "Salt and shine.", location_values: ["coast:coastal"], prize_values: ["material:silver"], clarity: (0.1, 1.0)),
                    Bridge(id: "desert", text: "Sand and gold.", location_values: ["climate:arid"], prize_values: ["material:gold"], clarity: (0.1, 1.0)),
                    Bridge(id: "late", text: "Late only.", clarity: (0.8, 1.0)),
                ]"#,
            )
            .unwrap(),
        }
    }

    #[test]
    fn template_respects_clarity_and_decoy() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let t = selector.select_template(0.12, false, &features(), &mut rng).unwrap();
            assert_eq!(t.id, "low");
            let t = selector.select_template(0.75, false, &features(), &mut rng).unwrap();
            assert_eq!(t.id, "high");
            let t = selector.select_template(0.5, true, &features(), &mut rng).unwrap();
            assert_eq!(t.id, "fake");
        }
        assert!(selector.select_template(0.5, false, &features(), &mut rng).is_none());
    }

    #[test]
    fn cooldown_never_overrides_hard_constraints() {
        let bank = bank();
        let history = vec![crate::schema::record::ClueRecord {
            mission_id: crate::schema::mission::MissionId::new("m"),
            player_id: crate::schema::mission::PlayerId::new("p"),
            ordinal: 1,
            day: 1,
            domain: Domain::Location,
            category: "climate".to_string(),
            is_decoy: false,
            location_features: vec!["climate:mediterranean".to_string()],
            prize_features: Vec::new(),
            bridge_id: None,
            template_id: "low".to_string(),
            structure_hash: String::new(),
            opening: "o".to_string(),
            clarity: 0.12,
            leak_risk: 0.0,
            fallback: false,
            text: String::new(),
            created_at: chrono::Utc::now(),
        }];
        let cooldowns = CooldownFilter::from_history(&history, CooldownWindows::default());
        let selector = ClueSelector::new(&bank, &cooldowns);
        let mut rng = StdRng::seed_from_u64(1);
        let t = selector.select_template(0.12, false, &features(), &mut rng).unwrap();
        assert_eq!(t.id, "low");
    }

    #[test]
    fn values_follow_requires_order() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        let mut rng = StdRng::seed_from_u64(3);
        let high = &bank.templates[1];
        let values = selector.select_values(high, &features(), &mut rng);
        assert_eq!(
            values.iter().map(|v| v.key()).collect::<Vec<_>>(),
            vec![FeatureKey::Material, FeatureKey::Origin]
        );
    }

    #[test]
    fn bridge_prefers_chosen_values() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        let chosen = vec![FeatureValue::Coast(CoastalProximity::Coastal)];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let bridge = selector
                .select_bridge(0.5, false, &features(), &chosen, &mut rng)
                .unwrap();
            assert_eq!(bridge.id, "salt");
        }
    }

    #[test]
    fn bridge_falls_back_to_applicable_ones() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        let chosen = vec![FeatureValue::Climate(Climate::Mediterranean)];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let bridge = selector
                .select_bridge(0.5, false, &features(), &chosen, &mut rng)
                .unwrap();
            // "desert" never applies to this mission, "late" is out of range.
            assert!(bridge.id == "generic" || bridge.id == "salt", "got {}", bridge.id);
        }
    }

    #[test]
    fn decoys_only_get_generic_bridges() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let bridge = selector
                .select_bridge(0.9, true, &features(), &[], &mut rng)
                .unwrap();
            assert!(bridge.is_generic());
        }
    }

    #[test]
    fn no_bridge_when_none_eligible() {
        let mut bank = bank();
        bank.bridges.clear();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        let mut rng = StdRng::seed_from_u64(0);
        let selection = selector
            .select(0.12, false, &features(), 1.0, &mut rng)
            .unwrap();
        assert!(selection.bridge.is_none());
        assert_eq!(selection.template.id, "low");
    }

    #[test]
    fn zero_bridge_chance_never_bridges() {
        let bank = bank();
        let cooldowns = CooldownFilter::default();
        let selector = ClueSelector::new(&bank, &cooldowns);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = selector
                .select(0.12, false, &features(), 0.0, &mut rng)
                .unwrap();
            assert!(selection.bridge.is_none());
        }
    }
}
