/// Clue templates: types, parsing, loading, and the template bank.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::schedule::{self, FIRST_DAY, LAST_DAY};
use crate::schema::features::{Domain, FeatureKey, FeatureValue, MissionFeatures};

/// Bundled content, compiled into the crate.
pub const BUNDLED_TEMPLATES: &str = include_str!("../../clue_data/templates.ron");
pub const BUNDLED_BRIDGES: &str = include_str!("../../clue_data/bridges.ron");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),
    #[error("invalid template '{id}': {reason}")]
    Invalid { id: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The closed set of names a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    /// A real mission trait: `{climate}`, `{material}`, ...
    Feature(FeatureKey),
    /// A plausible place that is not the mission's: `{false_place}`.
    FalsePlace,
    /// A plausible material that is not the prize's: `{false_material}`.
    FalseMaterial,
}

impl Placeholder {
    pub fn parse(name: &str) -> Option<Placeholder> {
        match name {
            "false_place" => Some(Self::FalsePlace),
            "false_material" => Some(Self::FalseMaterial),
            other => FeatureKey::from_label(other).map(Self::Feature),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Feature(key) => key.label(),
            Self::FalsePlace => "false_place",
            Self::FalseMaterial => "false_material",
        }
    }

    /// Every placeholder the renderer knows how to resolve.
    pub fn all() -> Vec<Placeholder> {
        let mut all: Vec<Placeholder> = FeatureKey::ALL.iter().copied().map(Self::Feature).collect();
        all.push(Self::FalsePlace);
        all.push(Self::FalseMaterial);
        all
    }

    pub fn is_decoy_only(&self) -> bool {
        matches!(self, Self::FalsePlace | Self::FalseMaterial)
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// A placeholder resolved by the renderer.
    Slot(Placeholder),
}

/// A parsed template, the raw text plus its segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateText {
    pub raw: String,
    pub segments: Vec<TemplateSegment>,
}

impl TemplateText {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{name}` → `Slot`, where `name` must be a known placeholder
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<TemplateText, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::TemplateParse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::TemplateParse("unclosed brace".to_string()));
                    }

                    let name: String = chars[start..end].iter().collect();
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::TemplateParse("empty braces".to_string()));
                    }
                    let placeholder = Placeholder::parse(name)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                    segments.push(TemplateSegment::Slot(placeholder));
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(TemplateError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(TemplateText {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Slot(p) => Some(*p),
            TemplateSegment::Literal(_) => None,
        })
    }
}

/// Inclusive clarity window a template or bridge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClarityRange {
    pub min: f64,
    pub max: f64,
}

impl ClarityRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, clarity: f64) -> bool {
        clarity >= self.min && clarity <= self.max
    }

    fn validate(&self, id: &str) -> Result<(), TemplateError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.min) || !in_unit(self.max) || self.min > self.max {
            return Err(TemplateError::Invalid {
                id: id.to_string(),
                reason: format!("clarity range ({}, {}) is not within [0, 1]", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// An authored clue template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClueTemplate {
    pub id: String,
    pub domain: Domain,
    pub category: String,
    pub text: TemplateText,
    pub opening: String,
    pub clarity: ClarityRange,
    /// Declared keys plus every feature placeholder in the text.
    pub requires: Vec<FeatureKey>,
    pub decoy: bool,
}

impl ClueTemplate {
    pub fn applies(&self, clarity: f64, decoy: bool) -> bool {
        self.decoy == decoy && self.clarity.contains(clarity)
    }
}

/// A phrase fusing a location trait and a prize trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMetaphor {
    pub id: String,
    pub text: String,
    pub location_values: Vec<FeatureValue>,
    pub prize_values: Vec<FeatureValue>,
    pub clarity: ClarityRange,
}

impl BridgeMetaphor {
    /// Declares no trait values; safe for any mission, decoys included.
    pub fn is_generic(&self) -> bool {
        self.location_values.is_empty() && self.prize_values.is_empty()
    }

    /// True when the mission holds at least one declared value on each
    /// side that declares any.
    pub fn applies_to(&self, features: &MissionFeatures) -> bool {
        let side = |values: &[FeatureValue]| {
            values.is_empty() || values.iter().any(|v| features.holds(*v))
        };
        side(&self.location_values) && side(&self.prize_values)
    }

    /// True when a declared value is among `chosen`.
    pub fn touches(&self, chosen: &[FeatureValue]) -> bool {
        self.location_values
            .iter()
            .chain(self.prize_values.iter())
            .any(|v| chosen.contains(v))
    }
}

// RON deserialization helpers. The authored format is flatter than the
// internal types.

#[derive(Debug, Deserialize)]
#[serde(rename = "Template")]
struct RonTemplate {
    id: String,
    domain: Domain,
    category: String,
    opening: String,
    clarity: (f64, f64),
    text: String,
    #[serde(default)]
    requires: Vec<FeatureKey>,
    #[serde(default)]
    decoy: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Bridge")]
struct RonBridge {
    id: String,
    text: String,
    #[serde(default)]
    location_values: Vec<FeatureValue>,
    #[serde(default)]
    prize_values: Vec<FeatureValue>,
    clarity: (f64, f64),
}

impl RonTemplate {
    fn into_template(self) -> Result<ClueTemplate, TemplateError> {
        let text = TemplateText::parse(&self.text)?;
        let clarity = ClarityRange::new(self.clarity.0, self.clarity.1);
        clarity.validate(&self.id)?;

        let invalid = |reason: String| TemplateError::Invalid {
            id: self.id.clone(),
            reason,
        };

        let mut requires = self.requires.clone();
        for placeholder in text.placeholders() {
            match placeholder {
                Placeholder::Feature(key) if self.decoy => {
                    return Err(invalid(format!(
                        "decoy template references real trait {{{}}}",
                        key.label()
                    )));
                }
                Placeholder::Feature(key) => {
                    if !requires.contains(&key) {
                        requires.push(key);
                    }
                }
                p if !self.decoy => {
                    return Err(invalid(format!(
                        "genuine template references decoy placeholder {{{}}}",
                        p.name()
                    )));
                }
                _ => {}
            }
        }
        if self.decoy && !requires.is_empty() {
            return Err(invalid("decoy template declares required traits".to_string()));
        }
        if let Some(key) = requires.iter().find(|k| k.domain() != self.domain) {
            return Err(invalid(format!(
                "{} template requires {} trait '{}'",
                self.domain.label(),
                key.domain().label(),
                key.label()
            )));
        }

        Ok(ClueTemplate {
            id: self.id,
            domain: self.domain,
            category: self.category,
            text,
            opening: self.opening,
            clarity,
            requires,
            decoy: self.decoy,
        })
    }
}

impl RonBridge {
    fn into_bridge(self) -> Result<BridgeMetaphor, TemplateError> {
        let clarity = ClarityRange::new(self.clarity.0, self.clarity.1);
        clarity.validate(&self.id)?;
        if TemplateText::parse(&self.text)?.placeholders().next().is_some() {
            return Err(TemplateError::Invalid {
                id: self.id,
                reason: "bridge text may not contain placeholders".to_string(),
            });
        }
        let misplaced = self
            .location_values
            .iter()
            .any(|v| v.key().domain() != Domain::Location)
            || self
                .prize_values
                .iter()
                .any(|v| v.key().domain() != Domain::Prize);
        if misplaced {
            return Err(TemplateError::Invalid {
                id: self.id,
                reason: "bridge declares a trait on the wrong side".to_string(),
            });
        }
        Ok(BridgeMetaphor {
            id: self.id,
            text: self.text,
            location_values: self.location_values,
            prize_values: self.prize_values,
            clarity,
        })
    }
}

/// All authored content the selector draws from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateBank {
    pub templates: Vec<ClueTemplate>,
    pub bridges: Vec<BridgeMetaphor>,
}

impl TemplateBank {
    /// The bank compiled into the crate from `clue_data/`.
    pub fn bundled() -> Result<TemplateBank, TemplateError> {
        Ok(TemplateBank {
            templates: Self::parse_templates_ron(BUNDLED_TEMPLATES)?,
            bridges: Self::parse_bridges_ron(BUNDLED_BRIDGES)?,
        })
    }

    /// Parse a list of templates from a RON string.
    pub fn parse_templates_ron(input: &str) -> Result<Vec<ClueTemplate>, TemplateError> {
        let raw: Vec<RonTemplate> = ron::from_str(input)?;
        let templates = raw
            .into_iter()
            .map(RonTemplate::into_template)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique_ids(templates.iter().map(|t| t.id.as_str()))?;
        Ok(templates)
    }

    /// Parse a list of bridge metaphors from a RON string.
    pub fn parse_bridges_ron(input: &str) -> Result<Vec<BridgeMetaphor>, TemplateError> {
        let raw: Vec<RonBridge> = ron::from_str(input)?;
        let bridges = raw
            .into_iter()
            .map(RonBridge::into_bridge)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique_ids(bridges.iter().map(|b| b.id.as_str()))?;
        Ok(bridges)
    }

    pub fn load_templates(path: &Path) -> Result<Vec<ClueTemplate>, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_templates_ron(&contents)
    }

    pub fn load_bridges(path: &Path) -> Result<Vec<BridgeMetaphor>, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_bridges_ron(&contents)
    }

    /// Merge another bank into this one. Entries from `other` replace
    /// entries in `self` with the same id.
    pub fn merge(&mut self, other: TemplateBank) {
        for template in other.templates {
            match self.templates.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template,
                None => self.templates.push(template),
            }
        }
        for bridge in other.bridges {
            match self.bridges.iter_mut().find(|b| b.id == bridge.id) {
                Some(existing) => *existing = bridge,
                None => self.bridges.push(bridge),
            }
        }
    }

    /// Templates satisfying the hard constraints: clarity and decoy match.
    pub fn eligible(&self, clarity: f64, decoy: bool) -> Vec<&ClueTemplate> {
        self.templates
            .iter()
            .filter(|t| t.applies(clarity, decoy))
            .collect()
    }

    /// Every (day, decoy) pair of the schedule with no eligible template.
    pub fn coverage_gaps(&self) -> Vec<(u32, bool)> {
        let mut gaps = Vec::new();
        for day in FIRST_DAY..=LAST_DAY {
            let clarity = schedule::clarity(day);
            for decoy in [false, true] {
                if self.eligible(clarity, decoy).is_empty() {
                    gaps.push((day, decoy));
                }
            }
        }
        gaps
    }
}

fn ensure_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), TemplateError> {
    let mut seen = rustc_hash::FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            return Err(TemplateError::Invalid {
                id: id.to_string(),
                reason: "duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let t = TemplateText::parse("The trail is cold.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("The trail is cold.".to_string())]
        );
    }

    #[test]
    fn parse_feature_slot() {
        let t = TemplateText::parse("Look toward {climate} today.").unwrap();
        assert_eq!(t.segments.len(), 3);
        assert_eq!(
            t.segments[1],
            TemplateSegment::Slot(Placeholder::Feature(FeatureKey::Climate))
        );
    }

    #[test]
    fn parse_decoy_slots() {
        let t = TemplateText::parse("{false_place} hides {false_material}.").unwrap();
        let slots: Vec<Placeholder> = t.placeholders().collect();
        assert_eq!(slots, vec![Placeholder::FalsePlace, Placeholder::FalseMaterial]);
    }

    #[test]
    fn parse_escaped_braces() {
        let t = TemplateText::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(TemplateText::parse("Bad {} here").is_err());
        assert!(TemplateText::parse("Bad {outer{inner}} here").is_err());
        assert!(TemplateText::parse("Bad {unclosed here").is_err());
        assert!(TemplateText::parse("Bad } here").is_err());
        assert!(matches!(
            TemplateText::parse("Meet me at {city}."),
            Err(TemplateError::UnknownPlaceholder(name)) if name == "city"
        ));
    }

    #[test]
    fn every_placeholder_name_parses_back() {
        for placeholder in Placeholder::all() {
            assert_eq!(Placeholder::parse(placeholder.name()), Some(placeholder));
        }
    }

    #[test]
    fn requires_collects_text_placeholders() {
        let templates = TemplateBank::parse_templates_ron(
            r#"[
                Template(
                    id: "p-1",
                    domain: prize,
                    category: "craft",
                    opening: "observation",
                    clarity: (0.1, 0.5),
                    text: "It was made from {material} by {origin}.",
                    requires: [value_tier],
                ),
            ]"#,
        )
        .unwrap();
        assert_eq!(
            templates[0].requires,
            vec![FeatureKey::ValueTier, FeatureKey::Material, FeatureKey::Origin]
        );
        assert!(!templates[0].decoy);
    }

    #[test]
    fn decoy_template_may_not_use_real_traits() {
        let result = TemplateBank::parse_templates_ron(
            r#"[
                Template(
                    id: "d-1",
                    domain: location,
                    category: "rumour",
                    opening: "observation",
                    clarity: (0.1, 0.5),
                    text: "Somewhere near {coast}.",
                    decoy: true,
                ),
            ]"#,
        );
        assert!(matches!(result, Err(TemplateError::Invalid { .. })));
    }

    #[test]
    fn genuine_template_may_not_use_decoy_slots() {
        let result = TemplateBank::parse_templates_ron(
            r#"[
                Template(
                    id: "g-1",
                    domain: location,
                    category: "rumour",
                    opening: "observation",
                    clarity: (0.1, 0.5),
                    text: "Go to {false_place}.",
                ),
            ]"#,
        );
        assert!(matches!(result, Err(TemplateError::Invalid { .. })));
    }

    #[test]
    fn cross_domain_requirement_rejected() {
        let result = TemplateBank::parse_templates_ron(
            r#"[
                Template(
                    id: "g-2",
                    domain: location,
                    category: "climate",
                    opening: "observation",
                    clarity: (0.1, 0.5),
                    text: "Under {climate}, find {material}.",
                ),
            ]"#,
        );
        assert!(matches!(result, Err(TemplateError::Invalid { .. })));
    }

    #[test]
    fn bad_clarity_and_duplicate_ids_rejected() {
        let inverted = TemplateBank::parse_templates_ron(
            r#"[Template(id: "x", domain: prize, category: "c", opening: "o", clarity: (0.6, 0.2), text: "plain")]"#,
        );
        assert!(matches!(inverted, Err(TemplateError::Invalid { .. })));

        let duplicate = TemplateBank::parse_templates_ron(
            r#"[
                Template(id: "x", domain: prize, category: "c", opening: "o", clarity: (0.1, 0.2), text: "one"),
                Template(id: "x", domain: prize, category: "c", opening: "o", clarity: (0.1, 0.2), text: "two"),
            ]"#,
        );
        assert!(matches!(duplicate, Err(TemplateError::Invalid { .. })));
    }

    #[test]
    fn bridges_parse_tags() {
        let bridges = TemplateBank::parse_bridges_ron(
            r#"[
                Bridge(
                    id: "b-1",
                    text: "Salt air and pale metal keep company.",
                    location_values: ["coast:coastal"],
                    prize_values: ["material:silver"],
                    clarity: (0.2, 1.0),
                ),
                Bridge(id: "b-2", text: "Place and prize share a memory.", clarity: (0.1, 1.0)),
            ]"#,
        )
        .unwrap();
        assert_eq!(bridges.len(), 2);
        assert!(!bridges[0].is_generic());
        assert!(bridges[1].is_generic());
    }

    #[test]
    fn bridge_on_wrong_side_rejected() {
        let result = TemplateBank::parse_bridges_ron(
            r#"[Bridge(id: "b", text: "t", location_values: ["material:gold"], clarity: (0.1, 1.0))]"#,
        );
        assert!(matches!(result, Err(TemplateError::Invalid { .. })));
    }

    #[test]
    fn merge_replaces_by_id() {
        let mut base = TemplateBank {
            templates: TemplateBank::parse_templates_ron(
                r#"[
                    Template(id: "a", domain: prize, category: "c", opening: "o", clarity: (0.1, 0.2), text: "base a"),
                    Template(id: "b", domain: prize, category: "c", opening: "o", clarity: (0.1, 0.2), text: "base b"),
                ]"#,
            )
            .unwrap(),
            bridges: Vec::new(),
        };
        let other = TemplateBank {
            templates: TemplateBank::parse_templates_ron(
                r#"[Template(id: "a", domain: prize, category: "c", opening: "o", clarity: (0.1, 0.2), text: "override a")]"#,
            )
            .unwrap(),
            bridges: Vec::new(),
        };
        base.merge(other);
        assert_eq!(base.templates.len(), 2);
        assert_eq!(base.templates[0].text.raw, "override a");
        assert_eq!(base.templates[1].text.raw, "base b");
    }

    #[test]
    fn bundled_bank_loads_with_full_coverage() {
        let bank = TemplateBank::bundled().unwrap();
        assert!(!bank.templates.is_empty());
        assert!(!bank.bridges.is_empty());
        assert!(bank.coverage_gaps().is_empty(), "gaps: {:?}", bank.coverage_gaps());
    }
}
