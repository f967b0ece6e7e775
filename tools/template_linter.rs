/// Template Linter: validates schedule coverage and template quality.
///
/// Usage: template_linter [<templates.ron>] [--bridges <bridges.ron>] [--replace]
///
/// With no files the bundled bank is linted. Files are merged over the
/// bundled bank unless `--replace` is given.

use chrono::Utc;
use clue_engine::core::features::extract_features;
use clue_engine::core::render::Renderer;
use clue_engine::core::schedule::{self, BANDS, FIRST_DAY, LAST_DAY};
use clue_engine::core::template::TemplateBank;
use clue_engine::schema::features::Domain;
use clue_engine::schema::mission::{MissionFacts, MissionId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Below this many distinct categories the category cooldown has to fall
/// back to repeats.
const MIN_CATEGORIES: usize = 3;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clue_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: template_linter [<templates.ron>] [--bridges <bridges.ron>] [--replace]");
        process::exit(0);
    }

    let mut templates_path = None;
    let mut bridges_path = None;
    let mut replace = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bridges" if i + 1 < args.len() => {
                i += 1;
                bridges_path = Some(args[i].clone());
            }
            "--replace" => replace = true,
            other => templates_path = Some(other.to_string()),
        }
        i += 1;
    }

    let mut bank = if replace {
        TemplateBank::default()
    } else {
        match TemplateBank::bundled() {
            Ok(bank) => bank,
            Err(e) => {
                eprintln!("ERROR: bundled bank failed to load: {}", e);
                process::exit(1);
            }
        }
    };

    if let Some(ref path) = templates_path {
        match TemplateBank::load_templates(Path::new(path)) {
            Ok(templates) => {
                println!("  Loaded: {}", path);
                bank.merge(TemplateBank {
                    templates,
                    bridges: Vec::new(),
                });
            }
            Err(e) => {
                eprintln!("ERROR: failed to load {}: {}", path, e);
                process::exit(1);
            }
        }
    }
    if let Some(ref path) = bridges_path {
        match TemplateBank::load_bridges(Path::new(path)) {
            Ok(bridges) => {
                println!("  Loaded: {}", path);
                bank.merge(TemplateBank {
                    templates: Vec::new(),
                    bridges,
                });
            }
            Err(e) => {
                eprintln!("ERROR: failed to load {}: {}", path, e);
                process::exit(1);
            }
        }
    }

    println!(
        "Loaded {} templates ({} decoy), {} bridges",
        bank.templates.len(),
        bank.templates.iter().filter(|t| t.decoy).count(),
        bank.bridges.len()
    );

    let (errors, warnings) = lint_bank(&bank);

    println!("\n=== Template Lint Report ===\n");
    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &warnings {
        println!("WARNING: {}", warning);
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }
    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    process::exit(if errors.is_empty() { 0 } else { 1 });
}

fn lint_bank(bank: &TemplateBank) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // 1. Every schedule day needs a genuine and a decoy template
    for (day, decoy) in bank.coverage_gaps() {
        errors.push(format!(
            "day {} (clarity {:.3}) has no {} template",
            day,
            schedule::clarity(day),
            if decoy { "decoy" } else { "genuine" }
        ));
    }

    // 2. Category variety per band
    for band in BANDS.iter() {
        for decoy in [false, true] {
            let thinnest = (band.first_day..=band.last_day)
                .map(|day| {
                    bank.eligible(schedule::clarity(day), decoy)
                        .iter()
                        .map(|t| (t.domain, t.category.as_str()))
                        .collect::<FxHashSet<(Domain, &str)>>()
                        .len()
                })
                .min()
                .unwrap_or(0);
            if thinnest > 0 && thinnest < MIN_CATEGORIES {
                warnings.push(format!(
                    "days {}-{}: only {} {} categories, cooldowns will repeat",
                    band.first_day,
                    band.last_day,
                    thinnest,
                    if decoy { "decoy" } else { "genuine" }
                ));
            }
        }
    }

    // 3. Content the schedule never reaches
    let reachable = |range: &clue_engine::core::template::ClarityRange| {
        (FIRST_DAY..=LAST_DAY).any(|day| range.contains(schedule::clarity(day)))
    };
    for template in &bank.templates {
        if !reachable(&template.clarity) {
            warnings.push(format!(
                "template '{}' is never eligible on any schedule day",
                template.id
            ));
        }
    }
    for bridge in &bank.bridges {
        if !reachable(&bridge.clarity) {
            warnings.push(format!(
                "bridge '{}' is never eligible on any schedule day",
                bridge.id
            ));
        }
    }

    // 4. Every template must render without leftover placeholders
    let facts = MissionFacts::new(MissionId::new("lint"), Utc::now(), 45.0, 9.0);
    let features = extract_features(&facts);
    let renderer = Renderer::new(&features, &facts);
    let mut rng = StdRng::seed_from_u64(0);
    for template in &bank.templates {
        let text = renderer.render(template, &[], None, &mut rng);
        if text.contains('{') || text.contains('}') {
            errors.push(format!(
                "template '{}' renders with unresolved placeholders: {}",
                template.id, text
            ));
        }
    }

    (errors, warnings)
}
