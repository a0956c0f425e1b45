use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::info;

use hoops_stats::config::{AnalysisConfig, IngestConfig};
use hoops_stats::game::GameTable;
use hoops_stats::synthetic::{SeasonSpec, generate_table};
use hoops_stats::{
    combinations, fixtures, game_rankings, impact, ingest, logging, player_rankings,
    player_stats, referees, standings, team_performance,
};

const DEFAULT_TOP_N: usize = 10;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = arg_value(&args, "--config")
        .map(|p| AnalysisConfig::load(&PathBuf::from(p)))
        .unwrap_or_default();
    let top_n = arg_value(&args, "--top")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_N);

    let full = load_table(&args)?;
    let division = arg_value(&args, "--division");
    let table = match division.as_deref() {
        Some(d) => full.division(d),
        None => full.clone(),
    };

    let view = arg_value(&args, "--view").unwrap_or_else(|| "summary".to_string());
    match view.as_str() {
        "summary" => print_summary(&full, &cfg, top_n),
        "standings" => print_json(&standings::calculate_standings(&table, &cfg.standings))?,
        "scorers" => print_json(&player_rankings::top_scorers(&table, top_n))?,
        "top-players" => print_json(&player_rankings::top_players_by_score(&table, top_n))?,
        "single-game" => print_json(&player_rankings::highest_single_game_scores(&table, top_n))?,
        "efficiency" => {
            print_json(&player_rankings::shooting_efficiency(&table, top_n, &cfg.shooting))?
        }
        "starters" => print_json(&player_rankings::starters_vs_bench(&table))?,
        "double-digit" => {
            print_json(&player_rankings::double_digit_scorers(&table, &cfg.double_digit))?
        }
        "consistency" => {
            print_json(&player_rankings::consistent_scorers(&table, &cfg.consistency))?
        }
        "three-pointers" => print_json(&player_rankings::top_three_pointers(&table, top_n))?,
        "foulers" => print_json(&player_rankings::top_foulers(&table, top_n))?,
        "high-scoring" => print_json(&game_rankings::highest_scoring_games(&table, top_n))?,
        "ties" => print_json(&game_rankings::most_tie_scores(&table, top_n))?,
        "lead-changes" => print_json(&game_rankings::most_lead_changes(&table, top_n))?,
        "biggest-leads" => print_json(&game_rankings::biggest_leads(&table, top_n))?,
        "biggest-wins" => print_json(&game_rankings::biggest_wins(&table, top_n))?,
        "teams" => print_json(&team_performance::team_performance(&table))?,
        "team-log" => {
            let team = arg_value(&args, "--team").ok_or_else(|| anyhow!("--team is required"))?;
            print_json(&team_performance::team_game_log(&table, &team))?
        }
        "referees" => print_json(&referees::referee_statistics(&table))?,
        "referee-fouls" => print_json(&referees::referee_fouls_per_game(&table))?,
        "referee-least-fouls" => print_json(&referees::referees_least_fouls_per_game(
            &table,
            cfg.referees.min_games,
        ))?,
        "referee-impact" => print_json(&referees::referee_impact_analysis(&table, &cfg.referees))?,
        "impact" => print_json(&impact::player_impact(&table, top_n, &cfg.impact))?,
        "foul-impact" => print_json(&impact::foul_impact(&table, top_n, &cfg.foul_impact))?,
        "combinations" => {
            print_json(&combinations::player_combinations(&table, &cfg.combinations))?
        }
        "fixtures" => print_json(&fixtures::all_fixtures(&table))?,
        "matrix" => print_json(&fixtures::fixtures_matrix(&full, division.as_deref()))?,
        "quality" => print_json(&player_stats::data_quality_report(&table))?,
        other => return Err(anyhow!("unknown view: {other}")),
    }
    Ok(())
}

fn load_table(args: &[String]) -> Result<GameTable> {
    if let Some(seed) = arg_value(args, "--synthetic") {
        let spec = SeasonSpec {
            seed: seed.parse().unwrap_or(SeasonSpec::default().seed),
            ..SeasonSpec::default()
        };
        info!(seed = spec.seed, "using synthetic season");
        return Ok(generate_table(&spec));
    }

    let mut cfg = IngestConfig::from_env();
    if let Some(dir) = arg_value(args, "--data") {
        cfg.data_dir = PathBuf::from(dir);
    }
    if let Some(db) = arg_value(args, "--db") {
        cfg.cache_path = PathBuf::from(db);
    }
    if args.iter().any(|a| a == "--regenerate") {
        cfg.regenerate = true;
    }
    let (table, report) = ingest::load_game_table(&cfg)?;
    info!(source = ?report.source, games = report.games_loaded, "snapshot ready");
    Ok(table)
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
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
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(table: &GameTable, cfg: &AnalysisConfig, top_n: usize) {
    println!("Games: {}", table.len());
    if table.is_empty() {
        println!("No game data available.");
        return;
    }

    for division in table.divisions() {
        println!();
        println!("== {division} ==");
        println!(
            "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>5} {:>5} {:>4} {:>5}",
            "#", "Team", "G", "W", "L", "F", "A", "Pts", "Diff"
        );
        for row in standings::standings_by_division(table, &division, &cfg.standings) {
            println!(
                "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>5} {:>5} {:>4} {:>+5}",
                row.rank,
                row.team,
                row.games,
                row.wins,
                row.losses,
                row.points_for,
                row.points_against,
                row.league_points,
                row.points_diff
            );
        }
    }

    println!();
    println!("Top scorers");
    for (idx, row) in player_rankings::top_scorers(table, top_n).iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:<28} {:>4} pts  {:>5.1} ppg",
            idx + 1,
            row.player_name,
            row.team,
            row.total_points,
            row.avg_points_per_game
        );
    }

    println!();
    println!("Biggest wins");
    for game in game_rankings::biggest_wins(table, top_n.min(5)) {
        println!(
            "  {} {} - {} {}  (margin {})",
            game.home_team,
            game.final_home_score.unwrap_or(0),
            game.final_away_score.unwrap_or(0),
            game.away_team,
            game.win_margin.unwrap_or(0)
        );
    }

    let quality = player_stats::data_quality_report(table);
    println!();
    println!(
        "Data quality: {} unfinished, {} malformed rosters, {} point mismatches",
        quality.unfinished_games,
        quality.malformed_rosters.len(),
        quality.point_mismatches.len()
    );
}
