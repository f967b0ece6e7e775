/// Feature extraction: raw mission facts to categorical traits.
///
/// Total over its input: every missing or unrecognised field maps to a
/// documented default, so extraction never fails.

use crate::schema::features::{
    Climate, CoastalProximity, Hemisphere, HistoryTone, LatitudeBand, LocationFeatures,
    Material, MissionFeatures, OriginStyle, PrizeFeatures, TimezoneBand, UrbanDensity,
    UseContext, ValueTier,
};
use crate::schema::mission::{MissionFacts, PrizeProfile};

/// |lat| above this is polar.
pub const POLAR_LATITUDE: f64 = 66.5;
/// |lat| above this (and not polar) is temperate.
pub const TEMPERATE_LATITUDE: f64 = 35.0;
/// |lat| above this (and not temperate) is subtropical.
pub const SUBTROPICAL_LATITUDE: f64 = 23.5;

/// Latitude window for the mediterranean climate hint.
pub const MEDITERRANEAN_LATITUDE: (f64, f64) = (30.0, 45.0);
/// Longitude window for the mediterranean climate hint.
pub const MEDITERRANEAN_LONGITUDE: (f64, f64) = (-10.0, 35.0);

/// Longitudes west of this are the west band.
pub const WEST_LONGITUDE: f64 = -30.0;
/// Longitudes east of this are the east band.
pub const EAST_LONGITUDE: f64 = 60.0;

/// Within this many km of the sea counts as coastal.
pub const COASTAL_DISTANCE_KM: f64 = 30.0;

pub const METRO_POPULATION: u64 = 1_000_000;
pub const URBAN_POPULATION: u64 = 100_000;
pub const SUBURBAN_POPULATION: u64 = 10_000;

/// Upper bounds (exclusive) of the entry, mid and high value tiers.
pub const VALUE_TIER_BOUNDS: [f64; 3] = [500.0, 5_000.0, 50_000.0];

/// Materials assumed when the prize names none we recognise.
pub const DEFAULT_MATERIALS: [Material; 2] = [Material::Metal, Material::Glass];

/// Derive the mission's trait set from its raw facts.
pub fn extract_features(facts: &MissionFacts) -> MissionFeatures {
    MissionFeatures {
        location: extract_location(facts),
        prize: extract_prize(facts.prize.as_ref()),
    }
}

fn extract_location(facts: &MissionFacts) -> LocationFeatures {
    let lat = sanitize(facts.latitude).clamp(-90.0, 90.0);
    let lon = sanitize(facts.longitude).clamp(-180.0, 180.0);
    let latitude_band = latitude_band(lat);
    let coast = coastal_proximity(facts.is_island, facts.coast_distance_km);

    LocationFeatures {
        hemisphere: if lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        },
        latitude_band,
        climate: climate_hint(lat, lon, latitude_band, coast),
        coast,
        urban: urban_density(facts.population),
        timezone: timezone_band(lon),
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn latitude_band(lat: f64) -> LatitudeBand {
    let abs = lat.abs();
    if abs > POLAR_LATITUDE {
        LatitudeBand::Polar
    } else if abs > TEMPERATE_LATITUDE {
        LatitudeBand::Temperate
    } else if abs > SUBTROPICAL_LATITUDE {
        LatitudeBand::Subtropical
    } else {
        LatitudeBand::Tropical
    }
}

pub fn climate_hint(
    lat: f64,
    lon: f64,
    band: LatitudeBand,
    coast: CoastalProximity,
) -> Climate {
    let abs = lat.abs();
    let (lat_lo, lat_hi) = MEDITERRANEAN_LATITUDE;
    let (lon_lo, lon_hi) = MEDITERRANEAN_LONGITUDE;
    if (lat_lo..=lat_hi).contains(&abs) && (lon_lo..=lon_hi).contains(&lon) {
        return Climate::Mediterranean;
    }

    match band {
        LatitudeBand::Polar => Climate::Continental,
        LatitudeBand::Tropical => Climate::Tropical,
        LatitudeBand::Subtropical => Climate::Arid,
        LatitudeBand::Temperate => match coast {
            CoastalProximity::Coastal | CoastalProximity::Island => Climate::Oceanic,
            CoastalProximity::Inland => Climate::Continental,
        },
    }
}

pub fn coastal_proximity(is_island: bool, coast_distance_km: Option<f64>) -> CoastalProximity {
    if is_island {
        return CoastalProximity::Island;
    }
    match coast_distance_km {
        Some(km) if km.is_finite() && km <= COASTAL_DISTANCE_KM => CoastalProximity::Coastal,
        _ => CoastalProximity::Inland,
    }
}

pub fn urban_density(population: Option<u64>) -> UrbanDensity {
    match population {
        None => UrbanDensity::Urban,
        Some(p) if p >= METRO_POPULATION => UrbanDensity::Metro,
        Some(p) if p >= URBAN_POPULATION => UrbanDensity::Urban,
        Some(p) if p >= SUBURBAN_POPULATION => UrbanDensity::Suburban,
        Some(_) => UrbanDensity::Rural,
    }
}

pub fn timezone_band(lon: f64) -> TimezoneBand {
    if lon < WEST_LONGITUDE {
        TimezoneBand::West
    } else if lon <= EAST_LONGITUDE {
        TimezoneBand::Central
    } else {
        TimezoneBand::East
    }
}

fn extract_prize(profile: Option<&PrizeProfile>) -> PrizeFeatures {
    let Some(profile) = profile else {
        return PrizeFeatures {
            materials: DEFAULT_MATERIALS.to_vec(),
            origin: OriginStyle::European,
            use_context: UseContext::Collectible,
            history_tone: HistoryTone::Modern,
            value_tier: ValueTier::Mid,
        };
    };

    let mut materials: Vec<Material> = Vec::new();
    for raw in &profile.materials {
        if let Some(material) = material_family(raw) {
            if !materials.contains(&material) {
                materials.push(material);
            }
        }
    }
    if materials.is_empty() {
        materials = DEFAULT_MATERIALS.to_vec();
    }

    PrizeFeatures {
        materials,
        origin: profile
            .origin
            .as_deref()
            .map(origin_style)
            .unwrap_or(OriginStyle::European),
        use_context: profile
            .category
            .as_deref()
            .and_then(use_context)
            .unwrap_or(UseContext::Collectible),
        history_tone: profile
            .era
            .as_deref()
            .and_then(history_tone)
            .unwrap_or(HistoryTone::Modern),
        value_tier: value_tier(profile.estimated_value),
    }
}

const MATERIAL_KEYWORDS: &[(&str, Material)] = &[
    ("gold", Material::Gold),
    ("silver", Material::Silver),
    ("bronze", Material::Bronze),
    ("brass", Material::Bronze),
    ("copper", Material::Copper),
    ("iron", Material::Iron),
    ("steel", Material::Steel),
    ("titanium", Material::Steel),
    ("aluminium", Material::Steel),
    ("aluminum", Material::Steel),
    ("wood", Material::Wood),
    ("oak", Material::Wood),
    ("walnut", Material::Wood),
    ("mahogany", Material::Wood),
    ("ebony", Material::Wood),
    ("glass", Material::Glass),
    ("crystal", Material::Glass),
    ("ceramic", Material::Ceramic),
    ("porcelain", Material::Ceramic),
    ("clay", Material::Ceramic),
    ("terracotta", Material::Ceramic),
    ("marble", Material::Marble),
    ("stone", Material::Stone),
    ("granite", Material::Stone),
    ("leather", Material::Leather),
    ("silk", Material::Textile),
    ("cotton", Material::Textile),
    ("wool", Material::Textile),
    ("linen", Material::Textile),
    ("fabric", Material::Textile),
    ("textile", Material::Textile),
    ("paper", Material::Paper),
    ("parchment", Material::Paper),
    ("diamond", Material::Gemstone),
    ("ruby", Material::Gemstone),
    ("emerald", Material::Gemstone),
    ("sapphire", Material::Gemstone),
    ("jade", Material::Gemstone),
    ("opal", Material::Gemstone),
    ("gem", Material::Gemstone),
    ("pearl", Material::Pearl),
    ("metal", Material::Metal),
];

/// Map a free-form material name to its family, if recognised.
pub fn material_family(raw: &str) -> Option<Material> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    MATERIAL_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, material)| *material)
}

const ORIGIN_KEYWORDS: &[(&[&str], OriginStyle)] = &[
    (
        &[
            "europe", "italy", "italian", "france", "french", "germany", "german", "spain",
            "spanish", "england", "english", "british", "swiss", "dutch", "austria",
        ],
        OriginStyle::European,
    ),
    (
        &[
            "asia", "japan", "japanese", "china", "chinese", "india", "indian", "korea",
            "korean", "thai", "persian",
        ],
        OriginStyle::Asian,
    ),
    (
        &[
            "america", "usa", "united states", "canada", "canadian", "mexico", "mexican",
            "brazil", "peru", "argentin",
        ],
        OriginStyle::American,
    ),
    (
        &[
            "africa", "egypt", "kenya", "morocc", "nigeria", "ghana", "ethiopia", "mali",
        ],
        OriginStyle::African,
    ),
    (&["global", "international", "world"], OriginStyle::Global),
];

/// Recognised origins map to their style; anything else present but
/// unrecognised is treated as global.
pub fn origin_style(raw: &str) -> OriginStyle {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return OriginStyle::European;
    }
    ORIGIN_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, style)| *style)
        .unwrap_or(OriginStyle::Global)
}

pub fn use_context(raw: &str) -> Option<UseContext> {
    let lower = raw.trim().to_lowercase();
    const TABLE: &[(&[&str], UseContext)] = &[
        (
            &["jewel", "watch", "luxury", "fashion", "perfume"],
            UseContext::Luxury,
        ),
        (
            &["tool", "utility", "gadget", "instrument", "device", "kitchen"],
            UseContext::Utility,
        ),
        (
            &["art", "painting", "sculpture", "print", "statue"],
            UseContext::Art,
        ),
        (
            &["collect", "coin", "stamp", "card", "toy", "figure", "memorabilia"],
            UseContext::Collectible,
        ),
    ];
    TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, ctx)| *ctx)
}

/// Accepts an era keyword or a plain year.
pub fn history_tone(raw: &str) -> Option<HistoryTone> {
    let lower = raw.trim().to_lowercase();
    if let Ok(year) = lower.parse::<i32>() {
        return Some(match year {
            y if y < 1800 => HistoryTone::Ancient,
            y if y < 1980 => HistoryTone::Vintage,
            y if y <= 2030 => HistoryTone::Modern,
            _ => HistoryTone::Futuristic,
        });
    }
    const TABLE: &[(&[&str], HistoryTone)] = &[
        (
            &["ancient", "antique", "medieval", "roman", "classical", "relic"],
            HistoryTone::Ancient,
        ),
        (&["vintage", "retro", "classic", "old"], HistoryTone::Vintage),
        (
            &["futur", "sci-fi", "tomorrow", "space age"],
            HistoryTone::Futuristic,
        ),
        (&["modern", "contemporary", "new"], HistoryTone::Modern),
    ];
    TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, tone)| *tone)
}

pub fn value_tier(estimated_value: Option<f64>) -> ValueTier {
    let [entry, mid, high] = VALUE_TIER_BOUNDS;
    match estimated_value {
        Some(v) if v.is_finite() && v < entry => ValueTier::Entry,
        Some(v) if v.is_finite() && v < mid => ValueTier::Mid,
        Some(v) if v.is_finite() && v < high => ValueTier::High,
        Some(v) if v.is_finite() => ValueTier::Ultra,
        _ => ValueTier::Mid,
    }
}
