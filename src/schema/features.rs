use serde::{Deserialize, Serialize};

/// Which hidden subject a clue or trait points toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Location,
    Prize,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Prize => "prize",
        }
    }
}

/// Declares a categorical trait enum with its snake_case label table.
macro_rules! trait_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

trait_enum!(Hemisphere { North => "north", South => "south" });

trait_enum!(LatitudeBand {
    Polar => "polar",
    Temperate => "temperate",
    Subtropical => "subtropical",
    Tropical => "tropical",
});

trait_enum!(Climate {
    Continental => "continental",
    Mediterranean => "mediterranean",
    Oceanic => "oceanic",
    Arid => "arid",
    Tropical => "tropical",
});

trait_enum!(CoastalProximity {
    Coastal => "coastal",
    Inland => "inland",
    Island => "island",
});

trait_enum!(UrbanDensity {
    Metro => "metro",
    Urban => "urban",
    Suburban => "suburban",
    Rural => "rural",
});

trait_enum!(TimezoneBand {
    West => "west",
    Central => "central",
    East => "east",
});

trait_enum!(
    /// Normalised material family. `Metal` is the generic fallback.
    Material {
        Gold => "gold",
        Silver => "silver",
        Bronze => "bronze",
        Copper => "copper",
        Iron => "iron",
        Steel => "steel",
        Wood => "wood",
        Glass => "glass",
        Ceramic => "ceramic",
        Stone => "stone",
        Marble => "marble",
        Leather => "leather",
        Textile => "textile",
        Paper => "paper",
        Gemstone => "gemstone",
        Pearl => "pearl",
        Metal => "metal",
    }
);

trait_enum!(OriginStyle {
    European => "european",
    Asian => "asian",
    American => "american",
    African => "african",
    Global => "global",
});

trait_enum!(UseContext {
    Luxury => "luxury",
    Utility => "utility",
    Art => "art",
    Collectible => "collectible",
});

trait_enum!(HistoryTone {
    Ancient => "ancient",
    Vintage => "vintage",
    Modern => "modern",
    Futuristic => "futuristic",
});

trait_enum!(ValueTier {
    Entry => "entry",
    Mid => "mid",
    High => "high",
    Ultra => "ultra",
});

trait_enum!(
    /// The closed set of trait categories. Doubles as the placeholder
    /// vocabulary for templates (`{climate}`, `{material}`, ...).
    FeatureKey {
        Hemisphere => "hemisphere",
        LatitudeBand => "latitude_band",
        Climate => "climate",
        Coast => "coast",
        Urban => "urban",
        Timezone => "timezone",
        Material => "material",
        Origin => "origin",
        UseContext => "use_context",
        HistoryTone => "history_tone",
        ValueTier => "value_tier",
    }
);

impl FeatureKey {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Hemisphere
            | Self::LatitudeBand
            | Self::Climate
            | Self::Coast
            | Self::Urban
            | Self::Timezone => Domain::Location,
            Self::Material
            | Self::Origin
            | Self::UseContext
            | Self::HistoryTone
            | Self::ValueTier => Domain::Prize,
        }
    }
}

/// Declares `FeatureValue` with one variant per `FeatureKey`, each wrapping
/// that key's trait enum.
macro_rules! feature_value {
    ($($variant:ident($inner:ident)),+ $(,)?) => {
        /// One concrete trait value, tagged with its category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FeatureValue {
            $($variant($inner)),+
        }

        impl FeatureValue {
            pub fn key(&self) -> FeatureKey {
                match self {
                    $(Self::$variant(_) => FeatureKey::$variant),+
                }
            }

            pub fn value_label(&self) -> &'static str {
                match self {
                    $(Self::$variant(v) => v.label()),+
                }
            }

            /// Parse a `key:value` tag back into a value.
            pub fn parse_tag(tag: &str) -> Option<FeatureValue> {
                let (key, value) = tag.split_once(':')?;
                let value = value.trim();
                Some(match FeatureKey::from_label(key.trim())? {
                    $(FeatureKey::$variant => Self::$variant($inner::from_label(value)?)),+
                })
            }

            /// Every value of every category.
            pub fn all() -> Vec<FeatureValue> {
                let mut values = Vec::new();
                $(values.extend($inner::ALL.iter().copied().map(Self::$variant));)+
                values
            }
        }
    };
}

feature_value!(
    Hemisphere(Hemisphere),
    LatitudeBand(LatitudeBand),
    Climate(Climate),
    Coast(CoastalProximity),
    Urban(UrbanDensity),
    Timezone(TimezoneBand),
    Material(Material),
    Origin(OriginStyle),
    UseContext(UseContext),
    HistoryTone(HistoryTone),
    ValueTier(ValueTier),
);

impl FeatureValue {
    /// The persisted `key:value` form (e.g., "climate:mediterranean").
    pub fn tag(&self) -> String {
        format!("{}:{}", self.key().label(), self.value_label())
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

impl<'de> Deserialize<'de> for FeatureValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        FeatureValue::parse_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown feature tag '{}'", tag)))
    }
}

/// Traits derived from the hidden location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFeatures {
    pub hemisphere: Hemisphere,
    pub latitude_band: LatitudeBand,
    pub climate: Climate,
    pub coast: CoastalProximity,
    pub urban: UrbanDensity,
    pub timezone: TimezoneBand,
}

/// Traits derived from the prize profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeFeatures {
    /// Never empty; ordered as given in the prize profile.
    pub materials: Vec<Material>,
    pub origin: OriginStyle,
    pub use_context: UseContext,
    pub history_tone: HistoryTone,
    pub value_tier: ValueTier,
}

/// The categorical view of a mission, computed once and cached for the
/// mission's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionFeatures {
    pub location: LocationFeatures,
    pub prize: PrizeFeatures,
}

impl MissionFeatures {
    /// All values this mission holds for `key`. Only materials may yield
    /// more than one.
    pub fn values_for(&self, key: FeatureKey) -> Vec<FeatureValue> {
        let loc = &self.location;
        let prize = &self.prize;
        match key {
            FeatureKey::Hemisphere => vec![FeatureValue::Hemisphere(loc.hemisphere)],
            FeatureKey::LatitudeBand => vec![FeatureValue::LatitudeBand(loc.latitude_band)],
            FeatureKey::Climate => vec![FeatureValue::Climate(loc.climate)],
            FeatureKey::Coast => vec![FeatureValue::Coast(loc.coast)],
            FeatureKey::Urban => vec![FeatureValue::Urban(loc.urban)],
            FeatureKey::Timezone => vec![FeatureValue::Timezone(loc.timezone)],
            FeatureKey::Material => prize
                .materials
                .iter()
                .copied()
                .map(FeatureValue::Material)
                .collect(),
            FeatureKey::Origin => vec![FeatureValue::Origin(prize.origin)],
            FeatureKey::UseContext => vec![FeatureValue::UseContext(prize.use_context)],
            FeatureKey::HistoryTone => vec![FeatureValue::HistoryTone(prize.history_tone)],
            FeatureKey::ValueTier => vec![FeatureValue::ValueTier(prize.value_tier)],
        }
    }

    pub fn all_values(&self) -> Vec<FeatureValue> {
        FeatureKey::ALL
            .iter()
            .flat_map(|key| self.values_for(*key))
            .collect()
    }

    pub fn holds(&self, value: FeatureValue) -> bool {
        self.values_for(value.key()).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_for_every_value() {
        for value in FeatureValue::all() {
            assert_eq!(FeatureValue::parse_tag(&value.tag()), Some(value));
        }
    }

    #[test]
    fn tag_format() {
        assert_eq!(
            FeatureValue::Climate(Climate::Mediterranean).tag(),
            "climate:mediterranean"
        );
        assert_eq!(
            FeatureValue::LatitudeBand(LatitudeBand::Polar).tag(),
            "latitude_band:polar"
        );
    }

    #[test]
    fn parse_tag_rejects_unknown() {
        assert_eq!(FeatureValue::parse_tag("climate:lunar"), None);
        assert_eq!(FeatureValue::parse_tag("weather:rainy"), None);
        assert_eq!(FeatureValue::parse_tag("climate"), None);
    }

    #[test]
    fn feature_key_domains() {
        assert_eq!(FeatureKey::Coast.domain(), Domain::Location);
        assert_eq!(FeatureKey::Timezone.domain(), Domain::Location);
        assert_eq!(FeatureKey::Material.domain(), Domain::Prize);
        assert_eq!(FeatureKey::ValueTier.domain(), Domain::Prize);
    }

    #[test]
    fn materials_yield_multiple_values() {
        let features = MissionFeatures {
            location: LocationFeatures {
                hemisphere: Hemisphere::North,
                latitude_band: LatitudeBand::Temperate,
                climate: Climate::Oceanic,
                coast: CoastalProximity::Coastal,
                urban: UrbanDensity::Urban,
                timezone: TimezoneBand::Central,
            },
            prize: PrizeFeatures {
                materials: vec![Material::Silver, Material::Wood],
                origin: OriginStyle::European,
                use_context: UseContext::Art,
                history_tone: HistoryTone::Vintage,
                value_tier: ValueTier::High,
            },
        };
        assert_eq!(features.values_for(FeatureKey::Material).len(), 2);
        assert_eq!(features.values_for(FeatureKey::Climate).len(), 1);
        assert!(features.holds(FeatureValue::Material(Material::Wood)));
        assert!(!features.holds(FeatureValue::Material(Material::Gold)));
        assert_eq!(features.all_values().len(), 12);
    }
}
