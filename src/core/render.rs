/// Renderer: resolves template placeholders into natural language.
///
/// Resolution goes through `Renderer::resolve`, which is total over the
/// closed `Placeholder` set; a rendered string never contains a `{...}`
/// marker.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::phrases::{
    self, DECOY_MATERIALS, DECOY_MATERIAL_LAST_RESORT, DECOY_PLACES, DECOY_PLACE_LAST_RESORT,
};
use crate::core::template::{BridgeMetaphor, ClueTemplate, Placeholder, TemplateSegment};
use crate::schema::features::{FeatureKey, FeatureValue, MissionFeatures};
use crate::schema::mission::MissionFacts;

/// Used for a trait with no value at all (only possible with hand-built
/// features holding an empty material list).
const UNKNOWN_TRAIT_PHRASE: &str = "something hard to name";

/// Renders templates against one mission.
pub struct Renderer<'a> {
    features: &'a MissionFeatures,
    facts: &'a MissionFacts,
}

impl<'a> Renderer<'a> {
    pub fn new(features: &'a MissionFeatures, facts: &'a MissionFacts) -> Self {
        Self { features, facts }
    }

    /// Render `template` with the chosen trait values, appending the
    /// bridge sentence if one was selected.
    pub fn render(
        &self,
        template: &ClueTemplate,
        values: &[FeatureValue],
        bridge: Option<&BridgeMetaphor>,
        rng: &mut StdRng,
    ) -> String {
        let mut text = String::new();
        for segment in &template.text.segments {
            match segment {
                TemplateSegment::Literal(literal) => text.push_str(literal),
                TemplateSegment::Slot(placeholder) => {
                    text.push_str(&self.resolve(*placeholder, values, rng));
                }
            }
        }
        let mut text = capitalize_first(text.trim());
        if let Some(bridge) = bridge {
            text.push(' ');
            text.push_str(bridge.text.trim());
        }
        text
    }

    /// The phrase for one placeholder.
    pub fn resolve(
        &self,
        placeholder: Placeholder,
        values: &[FeatureValue],
        rng: &mut StdRng,
    ) -> String {
        match placeholder {
            Placeholder::Feature(key) => self.trait_phrase(key, values, rng),
            Placeholder::FalsePlace => self.false_place(rng),
            Placeholder::FalseMaterial => self.false_material(rng),
        }
    }

    fn trait_phrase(&self, key: FeatureKey, values: &[FeatureValue], rng: &mut StdRng) -> String {
        let value = values
            .iter()
            .find(|v| v.key() == key)
            .copied()
            .or_else(|| self.features.values_for(key).first().copied());
        value
            .and_then(|v| phrases::phrases(v).choose(rng))
            .copied()
            .unwrap_or(UNKNOWN_TRAIT_PHRASE)
            .to_string()
    }

    fn false_place(&self, rng: &mut StdRng) -> String {
        let protected: Vec<String> = self
            .facts
            .protected_terms()
            .map(str::to_lowercase)
            .collect();
        let candidates: Vec<&str> = DECOY_PLACES
            .iter()
            .copied()
            .filter(|place| !overlaps(&place.to_lowercase(), &protected))
            .collect();
        candidates
            .choose(rng)
            .copied()
            .unwrap_or(DECOY_PLACE_LAST_RESORT)
            .to_string()
    }

    fn false_material(&self, rng: &mut StdRng) -> String {
        let raw: Vec<String> = self
            .facts
            .prize
            .iter()
            .flat_map(|p| p.materials.iter())
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        let candidates: Vec<&str> = DECOY_MATERIALS
            .iter()
            .filter(|(family, _)| !self.features.prize.materials.contains(family))
            .map(|(_, phrase)| *phrase)
            .filter(|phrase| !overlaps(&phrase.to_lowercase(), &raw))
            .collect();
        candidates
            .choose(rng)
            .copied()
            .unwrap_or(DECOY_MATERIAL_LAST_RESORT)
            .to_string()
    }
}

/// Case-folded containment in either direction.
fn overlaps(candidate: &str, facts: &[String]) -> bool {
    facts
        .iter()
        .any(|fact| candidate.contains(fact.as_str()) || fact.contains(candidate))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
