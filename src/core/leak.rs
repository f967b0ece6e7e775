/// Leak validation: scores rendered text for location-revealing content
/// and substitutes the fallback clue when the day's ceiling is exceeded.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::mission::MissionFacts;

/// A decimal coordinate such as `45.4642`.
pub const COORDINATE_WEIGHT: f64 = 0.8;
/// A degree notation such as `45°` or `9 deg`.
pub const DEGREE_WEIGHT: f64 = 0.5;
/// A well-known city name.
pub const CITY_WEIGHT: f64 = 0.5;
/// Street-like wording such as `Via Roma` or `Baker Street`.
pub const STREET_WEIGHT: f64 = 0.4;
/// The mission's own city, street or a forbidden term.
pub const MISSION_TERM_WEIGHT: f64 = 1.0;

static COORDINATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d{1,3}\.\d{2,}").expect("valid regex"));

static DEGREES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{1,3}(?:\.\d+)?\s*(?:°|º|deg\b|degrees?\b)")
        .expect("valid regex")
});

static STREET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:via|viale|piazza|rue|calle|avenida|strasse|straße)\s+[a-zà-ÿ]+|\b[a-z]+\s+(?:street|avenue|road|boulevard|blvd|lane|square)\b|\b[a-z]+\s+(?:st|ave|rd)\.",
    )
    .expect("valid regex")
});

const KNOWN_CITIES: &[&str] = &[
    "amsterdam", "athens", "bangkok", "barcelona", "beijing", "berlin", "bologna", "boston",
    "brussels", "buenos aires", "cairo", "chicago", "copenhagen", "delhi", "dubai", "dublin",
    "florence", "genoa", "hong kong", "istanbul", "jakarta", "lagos", "lisbon", "london",
    "los angeles", "madrid", "melbourne", "mexico city", "miami", "milan", "montreal", "moscow",
    "mumbai", "munich", "naples", "nairobi", "new york", "oslo", "paris", "prague", "rio de janeiro",
    "rome", "san francisco", "santiago", "sao paulo", "seoul", "shanghai", "singapore",
    "stockholm", "sydney", "tokyo", "toronto", "turin", "venice", "vienna", "warsaw", "zurich",
];

static CITY: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = KNOWN_CITIES.iter().map(|c| regex::escape(c)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("valid regex")
});

/// Which signals fired and the resulting score.
#[derive(Debug, Clone, PartialEq)]
pub struct LeakReport {
    /// Clamped to `[0, 1]`.
    pub score: f64,
    pub signals: Vec<LeakSignal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeakSignal {
    Coordinates,
    Degrees,
    KnownCity,
    StreetPattern,
    MissionTerm(String),
}

impl LeakSignal {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Coordinates => COORDINATE_WEIGHT,
            Self::Degrees => DEGREE_WEIGHT,
            Self::KnownCity => CITY_WEIGHT,
            Self::StreetPattern => STREET_WEIGHT,
            Self::MissionTerm(_) => MISSION_TERM_WEIGHT,
        }
    }
}

/// Sentences used when the configured fallback itself leaks for a mission.
/// Tried in order; none contains digits, place names or street words.
pub const LAST_RESORT_TEXTS: [&str; 3] = [
    "Nothing stirs today. Ask again tomorrow.",
    "Patience. Ask again tomorrow.",
    "Wait.",
];

/// Score `text` against the generic patterns and this mission's terms.
pub fn leak_score(text: &str, facts: &MissionFacts) -> LeakReport {
    let mut signals = generic_signals(text);
    let lower = text.to_lowercase();
    for term in facts.protected_terms() {
        if lower.contains(&term.to_lowercase()) {
            signals.push(LeakSignal::MissionTerm(term.to_string()));
        }
    }

    LeakReport {
        score: total(&signals),
        signals,
    }
}

/// Score `text` against the generic patterns only.
pub fn generic_score(text: &str) -> f64 {
    total(&generic_signals(text))
}

fn generic_signals(text: &str) -> Vec<LeakSignal> {
    let mut signals = Vec::new();
    if COORDINATE.is_match(text) {
        signals.push(LeakSignal::Coordinates);
    }
    if DEGREES.is_match(text) {
        signals.push(LeakSignal::Degrees);
    }
    if CITY.is_match(text) {
        signals.push(LeakSignal::KnownCity);
    }
    if STREET.is_match(text) {
        signals.push(LeakSignal::StreetPattern);
    }
    signals
}

fn total(signals: &[LeakSignal]) -> f64 {
    signals.iter().map(LeakSignal::weight).sum::<f64>().clamp(0.0, 1.0)
}

/// Outcome of validating one rendered clue.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub text: String,
    /// Score of the text actually returned.
    pub leak_risk: f64,
    pub fell_back: bool,
}

/// Accept `text` if it scores at or under `ceiling`, else substitute
/// `fallback`. The verdict carries the score of whichever text is kept.
pub fn validate(text: String, facts: &MissionFacts, ceiling: f64, fallback: &str) -> Verdict {
    let report = leak_score(&text, facts);
    if report.score <= ceiling {
        return Verdict {
            text,
            leak_risk: report.score,
            fell_back: false,
        };
    }

    tracing::warn!(
        mission = %facts.mission_id,
        score = report.score,
        ceiling,
        signals = ?report.signals,
        "rendered clue exceeds leak ceiling, using fallback"
    );
    let fallback_score = leak_score(fallback, facts).score;
    if fallback_score <= ceiling {
        return Verdict {
            text: fallback.to_string(),
            leak_risk: fallback_score,
            fell_back: true,
        };
    }

    tracing::error!(
        mission = %facts.mission_id,
        score = fallback_score,
        ceiling,
        "fallback text leaks for this mission, using a built-in sentence"
    );
    let scored = LAST_RESORT_TEXTS
        .iter()
        .map(|text| (*text, leak_score(text, facts).score));
    let (text, leak_risk) = scored
        .clone()
        .find(|(_, score)| *score <= ceiling)
        .or_else(|| scored.min_by(|a, b| a.1.total_cmp(&b.1)))
        .unwrap_or((LAST_RESORT_TEXTS[0], fallback_score));
    Verdict {
        text: text.to_string(),
        leak_risk,
        fell_back: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule;
    use crate::schema::mission::MissionId;
    use chrono::Utc;

    const FALLBACK: &str = "The trail is quiet today. Look again tomorrow.";

    fn facts() -> MissionFacts {
        let mut facts = MissionFacts::new(MissionId::new("m-leak"), Utc::now(), 45.0, 9.0);
        facts.city = Some("Lodi".to_string());
        facts.street = Some("Corso Adda".to_string());
        facts.forbidden_terms = vec!["Broletto".to_string()];
        facts
    }

    #[test]
    fn coordinates_score_high_and_force_fallback_on_day_one() {
        let report = leak_score("Dig at 45.1234 before sunset.", &facts());
        assert!(report.score >= 0.8);
        assert!(report.signals.contains(&LeakSignal::Coordinates));

        let ceiling = schedule::max_leak_risk(1);
        let verdict = validate("Dig at 45.1234 before sunset.".to_string(), &facts(), ceiling, FALLBACK);
        assert!(verdict.fell_back);
        assert_eq!(verdict.text, FALLBACK);
        assert!(verdict.leak_risk <= ceiling);
    }

    #[test]
    fn mission_terms_are_case_insensitive() {
        let report = leak_score("the lights of LODI glitter", &facts());
        assert_eq!(report.score, 1.0);
        let report = leak_score("Behind the broletto walls.", &facts());
        assert!(report.signals.contains(&LeakSignal::MissionTerm("Broletto".to_string())));
    }

    #[test]
    fn generic_signals() {
        let facts = facts();
        assert_eq!(leak_score("Forty-five 45° north.", &facts).score, DEGREE_WEIGHT);
        assert_eq!(leak_score("Not far from Milan.", &facts).score, CITY_WEIGHT);
        assert_eq!(leak_score("Somewhere on Via Garibaldi.", &facts).score, STREET_WEIGHT);
        // Word boundaries: "Romeo" is not "Rome".
        assert_eq!(leak_score("Romeo waits.", &facts).score, 0.0);
    }

    #[test]
    fn score_is_clamped() {
        let report = leak_score("Lodi, Corso Adda, 45.4642 9.1900, 45°, Milan", &facts());
        assert_eq!(report.score, 1.0);
        assert!(report.signals.len() > 3);
    }

    #[test]
    fn clean_text_passes_unchanged() {
        let text = "Somewhere beneath long dry summers and mild rain, the search begins.";
        let verdict = validate(text.to_string(), &facts(), 0.20, FALLBACK);
        assert!(!verdict.fell_back);
        assert_eq!(verdict.text, text);
        assert_eq!(verdict.leak_risk, 0.0);
    }

    #[test]
    fn leaking_fallback_is_replaced_by_a_built_in_sentence() {
        let ceiling = schedule::max_leak_risk(1);
        let verdict = validate(
            "Dig at 45.9999.".to_string(),
            &facts(),
            ceiling,
            "Dig at 45.1234 near Milan.",
        );
        assert!(verdict.fell_back);
        assert_eq!(verdict.text, LAST_RESORT_TEXTS[0]);
        assert_eq!(verdict.leak_risk, 0.0);
    }

    #[test]
    fn fallback_naming_a_mission_term_is_replaced() {
        let mut facts = facts();
        facts.forbidden_terms = vec!["trail".to_string(), "stirs".to_string()];
        let verdict = validate(
            "Dig at 45.1234.".to_string(),
            &facts,
            schedule::max_leak_risk(1),
            "The trail runs quiet today.",
        );
        assert_eq!(verdict.text, LAST_RESORT_TEXTS[1]);
        assert!(verdict.leak_risk <= schedule::max_leak_risk(1));
    }

    #[test]
    fn generic_score_ignores_mission_terms() {
        assert_eq!(generic_score("Behind the broletto walls."), 0.0);
        assert!(generic_score("Dig at 45.1234 near Milan.") >= 0.8);
        for text in LAST_RESORT_TEXTS {
            assert_eq!(generic_score(text), 0.0);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let verdict = validate("Near Paris.".to_string(), &facts(), 0.5, FALLBACK);
        assert!(!verdict.fell_back);
        let verdict = validate("Near Paris.".to_string(), &facts(), 0.45, FALLBACK);
        assert!(verdict.fell_back);
    }
}
