/// Template bank loading, overrides and rendering integration tests.

use chrono::Utc;
use clue_engine::core::features::extract_features;
use clue_engine::core::pipeline::{ClueEngine, ClueError};
use clue_engine::core::render::Renderer;
use clue_engine::core::template::{TemplateBank, TemplateError};
use clue_engine::schema::mission::{MissionFacts, MissionId, PrizeProfile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Missions spread over every hemisphere, band, coast and density value.
fn sample_missions() -> Vec<MissionFacts> {
    let coords = [
        (45.0, 9.0, None, Some(1_400_000), false),
        (-33.9, 18.4, Some(2.0), Some(4_000_000), false),
        (70.0, 25.0, Some(100.0), Some(3_000), false),
        (1.3, 103.8, Some(1.0), Some(5_600_000), true),
        (25.0, -80.2, Some(5.0), Some(50_000), false),
        (-45.0, -70.0, Some(300.0), None, false),
        (33.0, 65.0, None, Some(20_000), false),
        (52.0, -4.0, Some(10.0), Some(150_000), false),
    ];
    let prizes = [
        None,
        Some(PrizeProfile {
            materials: vec!["gold".into(), "pearl".into(), "oak".into()],
            origin: Some("Japan".into()),
            era: Some("1890".into()),
            category: Some("jewelry".into()),
            estimated_value: Some(80_000.0),
        }),
        Some(PrizeProfile {
            materials: vec!["unobtainium".into()],
            origin: Some("Atlantis".into()),
            era: Some("next century".into()),
            category: Some("tool".into()),
            estimated_value: Some(20.0),
        }),
        Some(PrizeProfile {
            materials: vec!["silk".into(), "ceramic".into()],
            origin: Some("Brazil".into()),
            era: Some("roman".into()),
            category: Some("painting".into()),
            estimated_value: Some(7_000.0),
        }),
    ];
    coords
        .iter()
        .enumerate()
        .map(|(i, (lat, lon, coast, population, island))| {
            let mut facts =
                MissionFacts::new(MissionId::new(format!("sample-{}", i)), Utc::now(), *lat, *lon);
            facts.coast_distance_km = *coast;
            facts.population = *population;
            facts.is_island = *island;
            facts.prize = prizes[i % prizes.len()].clone();
            facts
        })
        .collect()
}

#[test]
fn every_bundled_template_renders_for_every_sample_mission() {
    let bank = TemplateBank::bundled().unwrap();
    for facts in sample_missions() {
        let features = extract_features(&facts);
        let renderer = Renderer::new(&features, &facts);
        for (seed, template) in bank.templates.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            for bridge in std::iter::once(None).chain(bank.bridges.iter().map(Some)) {
                let text = renderer.render(template, &[], bridge, &mut rng);
                assert!(
                    !text.contains('{') && !text.contains('}'),
                    "template {} left a placeholder: {}",
                    template.id,
                    text
                );
                assert!(text.chars().next().map_or(false, char::is_uppercase));
            }
        }
    }
}

#[test]
fn bundled_bank_covers_every_day() {
    let bank = TemplateBank::bundled().unwrap();
    assert!(bank.coverage_gaps().is_empty());
    assert!(bank.templates.iter().any(|t| t.decoy));
    assert!(bank.bridges.iter().any(|b| b.is_generic()));
}

#[test]
fn override_file_replaces_by_id_and_adds_new() {
    let bundled = TemplateBank::bundled().unwrap();
    let engine = ClueEngine::builder()
        .seed(1)
        .templates_path("tests/fixtures/override_templates.ron")
        .bridges_path("tests/fixtures/extra_bridges.ron")
        .build()
        .unwrap();
    let bank = engine.bank();

    assert_eq!(bank.templates.len(), bundled.templates.len() + 1);
    let replaced = bank
        .templates
        .iter()
        .find(|t| t.id == "loc-climate-faint")
        .unwrap();
    assert_eq!(
        replaced.text.raw,
        "Even the weather here has heard of {climate}."
    );
    assert!(bank.templates.iter().any(|t| t.id == "prize-keepsake-faint"));
    assert!(bank.bridges.iter().any(|b| b.id == "bridge-lantern-light"));
}

#[test]
fn config_file_is_applied() {
    let engine = ClueEngine::builder()
        .config_path("tests/fixtures/engine_config.ron")
        .build()
        .unwrap();
    assert_eq!(engine.config().ordinal_cap, 40);
    assert_eq!(engine.config().bridge_chance, 0.0);
    assert!(engine.config().expose_decoy_flag);
    assert_eq!(engine.config().feature_cooldown, 5);
}

#[test]
fn unknown_placeholder_fails_the_build() {
    let err = TemplateBank::load_templates(Path::new("tests/fixtures/unknown_placeholder.ron"))
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnknownPlaceholder(ref name) if name == "river"));

    let err = ClueEngine::builder()
        .templates_path("tests/fixtures/unknown_placeholder.ron")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ClueError::Template(_)));
    assert_eq!(err.code(), "INTERNAL");
}

#[test]
fn cross_domain_template_is_rejected() {
    let err =
        TemplateBank::load_templates(Path::new("tests/fixtures/cross_domain.ron")).unwrap_err();
    assert!(matches!(err, TemplateError::Invalid { ref id, .. } if id == "loc-wrong-side"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = TemplateBank::load_templates(Path::new("tests/fixtures/nope.ron")).unwrap_err();
    assert!(matches!(err, TemplateError::Io(_)));
}
