//! Import character profiles into the knowledge base
//!
//! Usage: cargo run --bin import -- [--overwrite] [--data <path>] <files-or-dirs...>
//!
//! Each `.json` file is either a whole knowledge base (name -> profile) or a
//! single profile, in which case the file stem is the character's name.

use anyhow::{Context, Result};
use hallownest_guess::{
    config::{default_data_path, seed_knowledge_base},
    CharacterProfile, KnowledgeBase, KnowledgeStore,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportFile {
    // Several characters: {"Hornet": {...}, ...}
    Base(KnowledgeBase),
    // A lone profile: {"arma_aguijon": "Si", ...}
    Profile(CharacterProfile),
}

#[derive(Debug, Default)]
struct ImportStats {
    added: usize,
    replaced: usize,
    skipped: usize,
    failed: usize,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} [--overwrite] [--data <path>] <files-or-dirs...>", args[0]);
        eprintln!("Example: {} --overwrite ./personajes", args[0]);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let mut overwrite = false;
    let mut data_path = default_data_path();
    let mut inputs: Vec<PathBuf> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--overwrite" => overwrite = true,
            "--data" => {
                i += 1;
                let value = args.get(i).context("Usage: --data <path>")?;
                data_path = PathBuf::from(value);
            }
            other => inputs.push(PathBuf::from(other)),
        }
        i += 1;
    }

    let store = KnowledgeStore::new(&data_path, seed_knowledge_base());
    let loaded = store.load();
    if let Some(warning) = loaded.warning() {
        eprintln!("⚠️ {}", warning);
    }
    let mut base = loaded.base;
    println!("Knowledge base at {:?} ({} characters)", store.path(), base.len());

    let mut stats = ImportStats::default();
    for input in &inputs {
        if !input.exists() {
            eprintln!("Warning: {:?} does not exist, skipping", input);
            continue;
        }
        println!("\nProcessing: {:?}", input);
        import_path(&mut base, input, overwrite, &mut stats);
    }

    if stats.added + stats.replaced > 0 {
        store.save(&base)?;
    }

    println!("\n========================================");
    println!("Import complete!");
    println!("  Added: {}", stats.added);
    println!("  Replaced: {}", stats.replaced);
    println!("  Skipped (already known): {}", stats.skipped);
    println!("  Failed files: {}", stats.failed);
    println!("========================================");

    Ok(())
}

fn import_path(base: &mut KnowledgeBase, input: &Path, overwrite: bool, stats: &mut ImportStats) {
    for entry in walkdir::WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
    {
        let path = entry.path();
        let fname = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");

        match read_characters(path) {
            Ok(characters) => {
                for (name, profile) in characters {
                    merge(base, name, profile, overwrite, stats);
                }
            }
            Err(e) => {
                eprintln!("  ✗ {}: {:#}", fname, e);
                stats.failed += 1;
            }
        }
    }
}

fn read_characters(path: &Path) -> Result<Vec<(String, CharacterProfile)>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let file: ImportFile =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;

    match file {
        ImportFile::Profile(profile) => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .with_context(|| format!("Cannot derive a character name from {:?}", path))?;
            Ok(vec![(name, profile)])
        }
        ImportFile::Base(characters) => Ok(characters
            .into_iter()
            .map(|(name, profile)| (name.trim().to_string(), profile))
            .filter(|(name, _)| !name.is_empty())
            .collect()),
    }
}

fn merge(
    base: &mut KnowledgeBase,
    name: String,
    profile: CharacterProfile,
    overwrite: bool,
    stats: &mut ImportStats,
) {
    let existed = base.contains_key(&name);
    if existed && !overwrite {
        println!("  - {} (already known, use --overwrite to replace)", name);
        stats.skipped += 1;
        return;
    }

    if !profile.is_complete() {
        println!("  ! {} is missing attributes; they will read as 'No lo se'", name);
    }

    base.insert(name.clone(), profile);
    if existed {
        println!("  ✓ {} (replaced)", name);
        stats.replaced += 1;
    } else {
        println!("  ✓ {}", name);
        stats.added += 1;
    }
}
