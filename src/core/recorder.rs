/// Decision recorder: packages a generation into a `ClueRecord` and hands
/// it to the history store.

use chrono::{DateTime, Utc};

use crate::core::decoy::structure_hash;
use crate::core::leak::Verdict;
use crate::core::schedule::Schedule;
use crate::core::selector::Selection;
use crate::core::store::ClueHistory;
use crate::schema::features::{Domain, FeatureValue, MissionFeatures};
use crate::schema::mission::{MissionId, PlayerId};
use crate::schema::record::ClueRecord;

/// Everything decided for one clue.
pub struct Decision<'a> {
    pub mission_id: &'a MissionId,
    pub player_id: &'a PlayerId,
    pub ordinal: u32,
    pub schedule: Schedule,
    pub is_decoy: bool,
    pub selection: &'a Selection<'a>,
    /// Used to record the bridge values this mission actually holds.
    pub features: &'a MissionFeatures,
    pub verdict: &'a Verdict,
    pub created_at: DateTime<Utc>,
}

impl Decision<'_> {
    /// Build the record. Trait values are split by domain so cooldowns see
    /// exactly what the text states, the bridge sentence included.
    pub fn package(&self) -> ClueRecord {
        let template = self.selection.template;
        let stated = self.stated_values();
        let tags_for = |domain: Domain| -> Vec<String> {
            stated
                .iter()
                .filter(|v| v.key().domain() == domain)
                .map(|v| v.tag())
                .collect()
        };
        ClueRecord {
            mission_id: self.mission_id.clone(),
            player_id: self.player_id.clone(),
            ordinal: self.ordinal,
            day: self.schedule.day,
            domain: template.domain,
            category: template.category.clone(),
            is_decoy: self.is_decoy,
            location_features: tags_for(Domain::Location),
            prize_features: tags_for(Domain::Prize),
            bridge_id: self.selection.bridge.map(|b| b.id.clone()),
            template_id: template.id.clone(),
            structure_hash: structure_hash(&template.text.raw),
            opening: template.opening.clone(),
            clarity: self.schedule.clarity,
            leak_risk: self.verdict.leak_risk,
            fallback: self.verdict.fell_back,
            text: self.verdict.text.clone(),
            created_at: self.created_at,
        }
    }

    /// Placeholder values, then bridge values the mission holds.
    fn stated_values(&self) -> Vec<FeatureValue> {
        let mut stated = self.selection.values.clone();
        if let Some(bridge) = self.selection.bridge {
            for value in bridge.location_values.iter().chain(bridge.prize_values.iter()) {
                if self.features.holds(*value) && !stated.contains(value) {
                    stated.push(*value);
                }
            }
        }
        stated
    }
}

/// Append `record`, logging instead of failing. Returns whether the write
/// landed.
pub fn persist(history: &dyn ClueHistory, record: ClueRecord) -> bool {
    let (mission, player, ordinal) = (
        record.mission_id.clone(),
        record.player_id.clone(),
        record.ordinal,
    );
    match history.append(record) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                mission = %mission,
                player = %player,
                ordinal,
                error = %err,
                "failed to persist clue record; cooldowns may be stale"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::extract_features;
    use crate::core::store::InMemoryStore;
    use crate::core::template::TemplateBank;
    use crate::schema::features::{CoastalProximity, Material};
    use crate::schema::mission::{MissionFacts, PrizeProfile};
    use chrono::TimeZone;

    fn coastal_silver() -> MissionFeatures {
        let mut facts = MissionFacts::new(MissionId::new("m-rec"), Utc::now(), 45.0, 9.0);
        facts.coast_distance_km = Some(5.0);
        facts.prize = Some(PrizeProfile {
            materials: vec!["silver".to_string()],
            ..PrizeProfile::default()
        });
        extract_features(&facts)
    }

    fn bank() -> TemplateBank {
        TemplateBank {
            templates: TemplateBank::parse_templates_ron(
                r#"[Template(id: "mixed", domain: prize, category: "craft", opening: "question", clarity: (0.0, 1.0), text: "Is it {material}?")]"#,
            )
            .unwrap(),
            bridges: TemplateBank::parse_bridges_ron(
                r#"[
                    Bridge(id: "b-1", text: "Salt and shine.", clarity: (0.0, 1.0)),
                    Bridge(
                        id: "b-salt",
                        text: "Salt wind and pale shine.",
                        location_values: ["coast:coastal", "coast:island"],
                        prize_values: ["material:silver", "material:pearl"],
                        clarity: (0.0, 1.0),
                    ),
                ]"#,
            )
            .unwrap(),
        }
    }

    #[test]
    fn package_copies_every_decision_field() {
        let bank = bank();
        let features = coastal_silver();
        let selection = Selection {
            template: &bank.templates[0],
            values: vec![
                FeatureValue::Material(Material::Silver),
                FeatureValue::Coast(CoastalProximity::Coastal),
            ],
            bridge: Some(&bank.bridges[0]),
        };
        let verdict = Verdict {
            text: "Is it a pale, moon-coloured metal? Salt and shine.".to_string(),
            leak_risk: 0.0,
            fell_back: false,
        };
        let mission = MissionId::new("m-rec");
        let player = PlayerId::new("p-rec");
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let decision = Decision {
            mission_id: &mission,
            player_id: &player,
            ordinal: 4,
            schedule: Schedule::for_day(3),
            is_decoy: false,
            selection: &selection,
            features: &features,
            verdict: &verdict,
            created_at: now,
        };
        let record = decision.package();

        assert_eq!(record.ordinal, 4);
        assert_eq!(record.day, 3);
        assert_eq!(record.domain, Domain::Prize);
        assert_eq!(record.category, "craft");
        assert_eq!(record.opening, "question");
        assert_eq!(record.template_id, "mixed");
        assert_eq!(record.bridge_id.as_deref(), Some("b-1"));
        assert_eq!(record.prize_features, vec!["material:silver".to_string()]);
        assert_eq!(record.location_features, vec!["coast:coastal".to_string()]);
        assert_eq!(record.structure_hash, structure_hash("Is it {material}?"));
        assert_eq!(record.clarity, Schedule::for_day(3).clarity);
        assert_eq!(record.text, verdict.text);
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn bridge_values_held_by_the_mission_are_recorded() {
        let bank = bank();
        let features = coastal_silver();
        let selection = Selection {
            template: &bank.templates[0],
            values: vec![FeatureValue::Material(Material::Silver)],
            bridge: Some(&bank.bridges[1]),
        };
        let verdict = Verdict {
            text: "Is it a pale metal? Salt wind and pale shine.".to_string(),
            leak_risk: 0.0,
            fell_back: false,
        };
        let (m, p) = (MissionId::new("m-rec"), PlayerId::new("p-rec"));
        let record = Decision {
            mission_id: &m,
            player_id: &p,
            ordinal: 2,
            schedule: Schedule::for_day(9),
            is_decoy: false,
            selection: &selection,
            features: &features,
            verdict: &verdict,
            created_at: Utc::now(),
        }
        .package();

        // Island and pearl are declared but not held; silver is not doubled.
        assert_eq!(record.location_features, vec!["coast:coastal".to_string()]);
        assert_eq!(record.prize_features, vec!["material:silver".to_string()]);
    }

    #[test]
    fn persist_swallows_store_failures() {
        let features = coastal_silver();
        let store = InMemoryStore::new();
        store.set_fail_appends(true);
        let bank = bank();
        let selection = Selection {
            template: &bank.templates[0],
            values: Vec::new(),
            bridge: None,
        };
        let verdict = Verdict {
            text: "x".to_string(),
            leak_risk: 0.0,
            fell_back: false,
        };
        let (m, p) = (MissionId::new("m"), PlayerId::new("p"));
        let record = Decision {
            mission_id: &m,
            player_id: &p,
            ordinal: 1,
            schedule: Schedule::for_day(1),
            is_decoy: true,
            selection: &selection,
            features: &features,
            verdict: &verdict,
            created_at: Utc::now(),
        }
        .package();

        assert!(!persist(&store, record.clone()));
        store.set_fail_appends(false);
        assert!(persist(&store, record));
        assert_eq!(store.records(&m, &p).len(), 1);
    }
}
