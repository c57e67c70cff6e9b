//! hallownest-guess
//!
//! "¿Quién soy?" for the cast of Hollow Knight.
//!
//! Run with: cargo run
//! Numbered menus: cargo run -- --menu

use anyhow::{bail, Context, Result};
use hallownest_guess::{
    config::{GameConfig, InputMode, MatchPolicy},
    frontend::{ConsoleFrontend, InputClosed},
    game::Game,
    store::{self, KnowledgeStore},
    types::AttributeKey,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Pause before the CLI reveals a guess
const CLI_REVEAL_DELAY: Duration = Duration::from_millis(600);

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let verbose = args.iter().any(|a| a == "--verbose");
    init_logging(verbose);

    let config = build_config(&args[1..])?;

    if args.iter().any(|a| a == "--list") {
        let json_output = args.iter().any(|a| a == "--json");
        return run_list(&config, json_output);
    }

    run_game(&config)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn build_config(args: &[String]) -> Result<GameConfig> {
    let mut config = GameConfig {
        reveal_delay: CLI_REVEAL_DELAY,
        ..GameConfig::default()
    };
    let mut threshold: Option<f64> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--menu" => config.input_mode = InputMode::Menu,
            "--policy" => {
                let value = next_value(args, &mut i, "--policy")?;
                config = config.with_policy(MatchPolicy::parse(value)?);
            }
            "--threshold" => {
                let value = next_value(args, &mut i, "--threshold")?;
                threshold = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid threshold '{}'", value))?,
                );
            }
            "--data" => {
                let value = next_value(args, &mut i, "--data")?;
                config = config.with_data_path(PathBuf::from(value));
            }
            "--no-delay" => config.reveal_delay = Duration::ZERO,
            "--list" | "--json" | "--verbose" => {}
            other => bail!("Unknown argument '{}'. Try --help", other),
        }
        i += 1;
    }

    // Applied last so it survives a later --policy
    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold)?;
    }

    Ok(config)
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Usage: {} <value>", flag),
    }
}

fn run_game(config: &GameConfig) -> Result<()> {
    let store = KnowledgeStore::new(&config.data_path, config.seed.clone());
    tracing::debug!(
        "Knowledge base at {:?}, policy {}, threshold {}",
        store.path(),
        config.policy.name(),
        config.confidence_threshold
    );

    let stdin = io::stdin();
    let frontend = ConsoleFrontend::new(stdin.lock(), io::stdout(), config.input_mode);
    let mut game = Game::new(config, &store, frontend)?;

    match game.run() {
        Ok(_) => Ok(()),
        Err(e) if e.downcast_ref::<InputClosed>().is_some() => {
            println!("\nFin del juego. 🦋");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Print the knowledge base as a table, or raw JSON
fn run_list(config: &GameConfig, json_output: bool) -> Result<()> {
    let store = KnowledgeStore::new(&config.data_path, config.seed.clone());
    let loaded = store.load();

    if let Some(warning) = loaded.warning() {
        eprintln!("⚠️ {}", warning);
    }

    if json_output {
        println!("{}", store::to_pretty_json(&loaded.base)?);
        return Ok(());
    }

    println!("\nKnowledge base: {:?}", store.path());
    println!("Characters: {}\n", loaded.base.len());

    let name_width = loaded
        .base
        .keys()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max("Personaje".len());

    let header: Vec<String> = AttributeKey::ALL
        .iter()
        .map(|k| format!("{:<14}", k.short()))
        .collect();
    println!("{:<width$}  {}", "Personaje", header.join(""), width = name_width);
    println!("{}", "─".repeat(name_width + 2 + 14 * AttributeKey::ALL.len()));

    for (name, profile) in &loaded.base {
        let cells: Vec<String> = AttributeKey::ALL
            .iter()
            .map(|k| format!("{:<14}", profile.get(*k).label()))
            .collect();
        println!("{:<width$}  {}", name, cells.join(""), width = name_width);
    }

    Ok(())
}

fn print_usage() {
    println!("¿Quién soy? - Hollow Knight Edition\n");
    println!("Usage: hallownest-guess [options]\n");
    println!("Options:");
    println!("  --menu                 Answer with numbered menus (1-4)");
    println!("  --policy <p>           eliminate (default) or score");
    println!("  --threshold <0..1>     Confidence needed to offer a scored guess");
    println!("  --data <path>          Knowledge base file (or set HALLOWNEST_DATA)");
    println!("  --no-delay             Reveal guesses immediately");
    println!("  --list [--json]        Show the known characters and exit");
    println!("  --verbose              Debug logging on stderr");
    println!("  --help                 Show this help");
}
