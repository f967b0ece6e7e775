/// Phrase tables: natural-language fragments per trait value, plus the
/// decoy pools.
///
/// The lookup is an exhaustive match, so adding a trait value without
/// phrases fails to compile rather than rendering an empty string.

use crate::schema::features::{
    Climate, CoastalProximity, FeatureValue, Hemisphere, HistoryTone, LatitudeBand, Material,
    OriginStyle, TimezoneBand, UrbanDensity, UseContext, ValueTier,
};

/// Synonym phrases for one trait value. Never empty.
pub fn phrases(value: FeatureValue) -> &'static [&'static str] {
    match value {
        FeatureValue::Hemisphere(v) => match v {
            Hemisphere::North => &["the northern half of the world", "the skies of the Pole Star"],
            Hemisphere::South => &[
                "the southern half of the world",
                "the skies of the Southern Cross",
            ],
        },
        FeatureValue::LatitudeBand(v) => match v {
            LatitudeBand::Polar => &["the far cold latitudes", "the lands of the midnight sun"],
            LatitudeBand::Temperate => {
                &["the temperate middle latitudes", "a land of four true seasons"]
            }
            LatitudeBand::Subtropical => &[
                "the warm fringe of the tropics",
                "latitudes where winter barely visits",
            ],
            LatitudeBand::Tropical => &[
                "the belt between the tropics",
                "lands where the noon sun stands overhead",
            ],
        },
        FeatureValue::Climate(v) => match v {
            Climate::Continental => &["hard winters and hot summers", "a climate of sharp extremes"],
            Climate::Mediterranean => {
                &["long dry summers and mild rain", "a dry, olive-scented sun"]
            }
            Climate::Oceanic => &["soft rain carried in from the sea", "mild, cloud-washed weather"],
            Climate::Arid => &["dry air and scarce rain", "a hard blue sky that rarely rains"],
            Climate::Tropical => &["heavy rains and steady heat", "humid air that never cools"],
        },
        FeatureValue::Coast(v) => match v {
            CoastalProximity::Coastal => &["the edge of the sea", "a shoreline"],
            CoastalProximity::Inland => {
                &["ground far from any shore", "country the tide never reaches"]
            }
            CoastalProximity::Island => &["land ringed by water", "a shore on every side"],
        },
        FeatureValue::Urban(v) => match v {
            UrbanDensity::Metro => &["a sprawling metropolis", "a city of millions"],
            UrbanDensity::Urban => &["a busy town", "lively city blocks"],
            UrbanDensity::Suburban => &["quiet residential edges", "the calm outskirts of a town"],
            UrbanDensity::Rural => &["open countryside", "fields and scattered farms"],
        },
        FeatureValue::Timezone(v) => match v {
            TimezoneBand::West => &["by the western clocks", "where the day begins late"],
            TimezoneBand::Central => &[
                "by the clocks of the middle meridians",
                "by the clocks near the prime meridian",
            ],
            TimezoneBand::East => &["by the eastern clocks", "where the sun rises early"],
        },
        FeatureValue::Material(v) => match v {
            Material::Gold => &["a warm yellow metal", "the metal of crowns"],
            Material::Silver => &["a pale, moon-coloured metal", "the metal of old mirrors"],
            Material::Bronze => &["a metal that greens with age", "the alloy of old bells"],
            Material::Copper => &["a rosy metal", "the metal of old pennies"],
            Material::Iron => &["a dark, heavy metal", "the metal of forges"],
            Material::Steel => &["a hard grey alloy", "tempered grey metal"],
            Material::Wood => &["something that once grew leaves", "grained timber"],
            Material::Glass => &["something clear and brittle", "melted sand made solid"],
            Material::Ceramic => &["fired clay", "clay hardened in a kiln"],
            Material::Stone => &["something cut from the earth", "quarried stone"],
            Material::Marble => &["veined white stone", "the stone of statues"],
            Material::Leather => &["tanned hide", "supple, hand-worked hide"],
            Material::Textile => &["woven thread", "cloth from a loom"],
            Material::Paper => &["pressed fibres", "sheets that once held ink"],
            Material::Gemstone => &["a cut stone that catches the light", "a facet of coloured fire"],
            Material::Pearl => &["something grown inside a shell", "the sea's slow jewel"],
            Material::Metal => &["worked metal", "something forged"],
        },
        FeatureValue::Origin(v) => match v {
            OriginStyle::European => &["old-world workshops", "a European craft tradition"],
            OriginStyle::Asian => &["artisans of the East", "a craft tradition from across Asia"],
            OriginStyle::American => {
                &["makers of the New World", "a craft tradition from the Americas"]
            }
            OriginStyle::African => &["African craft traditions", "makers from across Africa"],
            OriginStyle::Global => &["makers from many lands", "a tradition that crossed every border"],
        },
        FeatureValue::UseContext(v) => match v {
            UseContext::Luxury => &["a thing of luxury", "an object made to be envied"],
            UseContext::Utility => &["a tool made for use", "an object built to work"],
            UseContext::Art => &["a work of art", "an object made only to be admired"],
            UseContext::Collectible => &[
                "a collector's piece",
                "the kind of thing people hunt for and keep",
            ],
        },
        FeatureValue::HistoryTone(v) => match v {
            HistoryTone::Ancient => &["distant centuries", "an age long buried"],
            HistoryTone::Vintage => &["a few generations ago", "a bygone decade"],
            HistoryTone::Modern => &["the present day", "recent craftsmanship"],
            HistoryTone::Futuristic => &["a time still to come", "design ahead of its time"],
        },
        FeatureValue::ValueTier(v) => match v {
            ValueTier::Entry => &["a modest price", "a worth within anyone's reach"],
            ValueTier::Mid => &["a fair, honest worth", "a price that would make you pause"],
            ValueTier::High => &["a serious sum", "a worth few would spend lightly"],
            ValueTier::Ultra => &["a small fortune", "a value beyond most dreams"],
        },
    }
}

// ---------------------------------------------------------------------------
// DECOY POOLS. Plausible but false. Invented names only; the renderer also
// drops any entry that matches the mission's real facts.
// ---------------------------------------------------------------------------

/// Invented place names for decoy clues.
pub const DECOY_PLACES: &[&str] = &[
    "Port Velmara",
    "the valley of Ostrevin",
    "Caldera Sul",
    "the shores of Lake Ambrin",
    "the Marrowick downs",
    "the isle of Tessary",
    "Brennholt crossing",
    "the old quarter of Saint Ilvane",
    "the salt flats of Qeresh",
    "Highmoor Landing",
];

/// Decoy material phrases, tagged with the family they would imply.
pub const DECOY_MATERIALS: &[(Material, &str)] = &[
    (Material::Gold, "a thread of red gold"),
    (Material::Silver, "tarnished moon-silver"),
    (Material::Bronze, "sea-green bronze"),
    (Material::Copper, "hammered copper"),
    (Material::Iron, "meteoric iron"),
    (Material::Steel, "blued watchmaker's steel"),
    (Material::Wood, "petrified driftwood"),
    (Material::Glass, "smoked volcanic glass"),
    (Material::Ceramic, "blue-glazed porcelain"),
    (Material::Stone, "carved soapstone"),
    (Material::Marble, "black-veined marble"),
    (Material::Leather, "cracked saddle leather"),
    (Material::Textile, "faded indigo silk"),
    (Material::Paper, "brittle rice paper"),
    (Material::Gemstone, "a sliver of opal"),
    (Material::Pearl, "a black river pearl"),
];

/// Used only if every decoy place collides with a mission fact.
pub const DECOY_PLACE_LAST_RESORT: &str = "a place no map has ever shown";
/// Used only if every decoy material collides with the prize.
pub const DECOY_MATERIAL_LAST_RESORT: &str = "something no inventory lists";
