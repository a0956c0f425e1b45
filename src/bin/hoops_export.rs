use std::path::PathBuf;

use anyhow::Result;

use hoops_stats::config::{AnalysisConfig, IngestConfig};
use hoops_stats::{export, ingest, logging};

const DEFAULT_OUT: &str = "hoops_stats.xlsx";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init();

    let cfg = parse_arg("--config")
        .map(|p| AnalysisConfig::load(&PathBuf::from(p)))
        .unwrap_or_default();
    let out = parse_arg("--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));
    let top_n = parse_arg("--top")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(50);

    let (full, _) = ingest::load_game_table(&IngestConfig::from_env())?;
    let table = match parse_arg("--division") {
        Some(d) => full.division(&d),
        None => full,
    };

    let report = export::export_workbook(&table, &cfg, top_n, &out)?;
    println!("Export complete: {}", out.display());
    println!("Player facts: {}", report.player_facts);
    println!("Standings rows: {}", report.standings);
    println!("Top scorers: {}", report.top_scorers);
    println!("Teams: {}", report.teams);
    println!("Referees: {}", report.referees);
    Ok(())
}

fn parse_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
