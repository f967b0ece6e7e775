/// Preview: interactive shell for running a synthetic mission through the
/// clue engine.
///
/// Usage: preview [--templates <path>] [--bridges <path>] [--config <path>]
///                [--seed <n>] [--at <lat> <lon>]
///
/// Commands:
///   next                        next clue on the current day
///   day <n>                     jump to mission day n
///   run                         one clue per day, days 1 to 30
///   at <lat> <lon>              move the mission (clears history)
///   prize <materials> [origin] [era] [value]
///                               set the prize, materials comma separated
///   forbid <term>               add a forbidden term
///   seed <n>                    set RNG seed
///   debug on|off                toggle debug meta
///   history                     list issued clues
///   help                        list commands
///   quit                        exit

use chrono::{DateTime, Duration, Utc};
use clue_engine::core::config::EngineConfig;
use clue_engine::core::pipeline::{ClueEngine, ClueWorld, GeneratedClue};
use clue_engine::core::store::InMemoryStore;
use clue_engine::schema::clue::ClueRequest;
use clue_engine::schema::mission::{MissionFacts, MissionId, PlayerId, PrizeProfile};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Session {
    facts: MissionFacts,
    player: PlayerId,
    store: InMemoryStore,
    day: u32,
    debug: bool,
}

impl Session {
    fn new(facts: MissionFacts) -> Self {
        let player = PlayerId::new("preview-player");
        let mut session = Self {
            facts,
            player,
            store: InMemoryStore::new(),
            day: 1,
            debug: true,
        };
        session.reset();
        session
    }

    /// Fresh store for the current facts.
    fn reset(&mut self) {
        self.store = InMemoryStore::new();
        self.store.add_mission(self.facts.clone());
        self.store.enroll(&self.facts.mission_id, &self.player);
        self.store.set_active(&self.player, &self.facts.mission_id);
    }

    fn now(&self) -> DateTime<Utc> {
        self.facts.started_at + Duration::days(i64::from(self.day) - 1) + Duration::hours(12)
    }

    fn generate(&self, engine: &ClueEngine) {
        let mut request = ClueRequest::for_player(self.player.clone());
        if self.debug {
            request = request.with_debug();
        }
        match engine.generate(&request, &ClueWorld::from_store(&self.store), self.now()) {
            Ok(clue) => print_clue(&clue),
            Err(e) => println!("ERROR [{}]: {}", e.code(), e),
        }
    }
}

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
        print_usage();
        return;
    }

    let mut templates_path = None;
    let mut bridges_path = None;
    let mut config_path = None;
    let mut seed: u64 = 42;
    let mut coords = (45.0, 9.0);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--templates" if i + 1 < args.len() => {
                i += 1;
                templates_path = Some(args[i].clone());
            }
            "--bridges" if i + 1 < args.len() => {
                i += 1;
                bridges_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--at" if i + 2 < args.len() => {
                coords = (
                    args[i + 1].parse().unwrap_or(coords.0),
                    args[i + 2].parse().unwrap_or(coords.1),
                );
                i += 2;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match EngineConfig::load_from_ron(std::path::Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    // The preview is a privileged client.
    let config = EngineConfig {
        expose_decoy_flag: true,
        ..config
    };

    let build = |seed: u64| {
        let mut builder = ClueEngine::builder().seed(seed).with_config(config.clone());
        if let Some(ref path) = templates_path {
            builder = builder.templates_path(path);
        }
        if let Some(ref path) = bridges_path {
            builder = builder.bridges_path(path);
        }
        builder.build()
    };

    let mut engine = match build(seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(MissionFacts::new(
        MissionId::new("preview-mission"),
        Utc::now(),
        coords.0,
        coords.1,
    ));

    println!(
        "Loaded {} templates, {} bridges",
        engine.bank().templates.len(),
        engine.bank().bridges.len()
    );
    println!("Mission at ({}, {}), seed {}", coords.0, coords.1, seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview[day {}]> ", session.day);
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "next" | "n" => session.generate(&engine),
            "day" => match parts.get(1).and_then(|s| s.parse::<u32>().ok()) {
                Some(day) if (1..=30).contains(&day) => {
                    session.day = day;
                    println!("Day set to {}", day);
                }
                _ => println!("Usage: day <1-30>"),
            },
            "run" => {
                for day in 1..=30 {
                    session.day = day;
                    session.generate(&engine);
                }
            }
            "at" => {
                let lat = parts.get(1).and_then(|s| s.parse::<f64>().ok());
                let lon = parts.get(2).and_then(|s| s.parse::<f64>().ok());
                match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        session.facts.latitude = lat;
                        session.facts.longitude = lon;
                        session.reset();
                        println!("Mission moved to ({}, {}); history cleared", lat, lon);
                    }
                    _ => println!("Usage: at <lat> <lon>"),
                }
            }
            "prize" => {
                if parts.len() < 2 {
                    println!("Usage: prize <materials> [origin] [era] [value]");
                    continue;
                }
                session.facts.prize = Some(PrizeProfile {
                    materials: parts[1].split(',').map(str::to_string).collect(),
                    origin: parts.get(2).map(|s| s.to_string()),
                    era: parts.get(3).map(|s| s.to_string()),
                    category: None,
                    estimated_value: parts.get(4).and_then(|s| s.parse().ok()),
                });
                session.reset();
                println!("Prize updated; history cleared");
            }
            "forbid" => {
                if parts.len() < 2 {
                    println!("Usage: forbid <term>");
                    continue;
                }
                session.facts.forbidden_terms.push(parts[1..].join(" "));
                session.reset();
                println!("Forbidden terms: {:?}", session.facts.forbidden_terms);
            }
            "seed" => match parts.get(1).and_then(|s| s.parse::<u64>().ok()) {
                Some(seed) => match build(seed) {
                    Ok(rebuilt) => {
                        engine = rebuilt;
                        println!("Seed set to {}", seed);
                    }
                    Err(e) => println!("ERROR: {}", e),
                },
                None => println!("Usage: seed <n>"),
            },
            "debug" => {
                session.debug = parts.get(1).map_or(!session.debug, |s| *s == "on");
                println!("Debug meta {}", if session.debug { "on" } else { "off" });
            }
            "history" => {
                let records = session
                    .store
                    .records(&session.facts.mission_id, &session.player);
                if records.is_empty() {
                    println!("(no clues issued)");
                }
                for r in records {
                    println!(
                        "  #{:<3} day {:<2} {:<8} {:<10} {:<5} {}",
                        r.ordinal,
                        r.day,
                        r.domain.label(),
                        r.category,
                        if r.is_decoy { "decoy" } else { "" },
                        r.text
                    );
                }
            }
            _ => println!("Unknown command: {}. Type 'help'.", cmd),
        }
    }
}

fn print_clue(clue: &GeneratedClue) {
    let r = &clue.response;
    println!("\n  {}", r.text);
    println!(
        "  day {} · #{} · clarity {:.3} · {}/{} · leak {:.2}",
        r.day,
        r.index,
        r.clarity,
        r.domain.label(),
        r.category,
        r.meta.leak_risk
    );
    if let Some(fake) = r.meta.is_fake {
        println!(
            "  is_fake {} · template {} · bridge {} · fallback {}",
            fake,
            clue.record.template_id,
            clue.record.bridge_id.as_deref().unwrap_or("-"),
            clue.record.fallback
        );
    }
    if !clue.persisted {
        println!("  (record not persisted)");
    }
    println!();
}

fn print_usage() {
    println!("Usage: preview [--templates <path>] [--bridges <path>] [--config <path>]");
    println!("               [--seed <n>] [--at <lat> <lon>]");
}

fn print_help() {
    println!("Commands:");
    println!("  next                       next clue on the current day");
    println!("  day <n>                    jump to mission day n");
    println!("  run                        one clue per day, days 1 to 30");
    println!("  at <lat> <lon>             move the mission (clears history)");
    println!("  prize <materials> [origin] [era] [value]");
    println!("                             set the prize, materials comma separated");
    println!("  forbid <term>              add a forbidden term");
    println!("  seed <n>                   set RNG seed");
    println!("  debug on|off               toggle debug meta");
    println!("  history                    list issued clues");
    println!("  quit                       exit");
}
