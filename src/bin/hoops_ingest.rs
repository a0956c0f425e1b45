use std::path::PathBuf;

use anyhow::{Context, Result};

use hoops_stats::config::IngestConfig;
use hoops_stats::{ingest, logging, player_stats};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init();

    let mut cfg = IngestConfig::from_env();
    if let Some(dir) = parse_path_arg("--data") {
        cfg.data_dir = dir;
    }
    if let Some(db) = parse_path_arg("--db") {
        cfg.cache_path = db;
    }

    let (table, report) = ingest::rebuild_cache(&cfg)
        .with_context(|| format!("rebuild cache from {}", cfg.data_dir.display()))?;
    let quality = player_stats::data_quality_report(&table);

    println!("Snapshot rebuild complete");
    println!("Data: {}", cfg.data_dir.display());
    println!("DB: {}", report.cache_path.display());
    println!("Files: {} ({} failed)", report.files_seen, report.files_failed);
    println!("Games stored: {}", report.games_loaded);
    println!("Divisions: {:?}", table.divisions());
    println!(
        "Unfinished: {}  missing rosters: {}  malformed rosters: {}  malformed events: {}",
        quality.unfinished_games,
        quality.missing_rosters,
        quality.malformed_rosters.len(),
        quality.malformed_events.len()
    );
    if !quality.point_mismatches.is_empty() {
        println!("Point mismatches: {}", quality.point_mismatches.len());
        for m in quality.point_mismatches.iter().take(6) {
            println!(
                "   - game {} {} ({}): total {} vs shots {}",
                m.game_id, m.player_name, m.team, m.total_points, m.points_from_shots
            );
        }
    }
    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
