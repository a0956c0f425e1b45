use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::Value;
use std::hint::black_box;

use hoops_stats::config::AnalysisConfig;
use hoops_stats::game::GameTable;
use hoops_stats::literal::parse_literal;
use hoops_stats::synthetic::{SeasonSpec, generate_season};
use hoops_stats::{
    combinations, extract_player_facts, game_events, player_rankings, referees, standings,
};

fn season_rows() -> Vec<Value> {
    generate_season(&SeasonSpec {
        teams_per_division: 10,
        rounds: 2,
        ..SeasonSpec::default()
    })
}

fn bench_literal_parse(c: &mut Criterion) {
    let rows: Vec<Value> = serde_json::from_str(SEASON_JSON).expect("valid fixture json");
    let teams = rows[0]["Teams"].as_str().expect("teams literal").to_string();
    c.bench_function("roster_literal_parse", |b| {
        b.iter(|| {
            let value = parse_literal(black_box(&teams)).unwrap();
            black_box(value.as_array().map(Vec::len));
        })
    });
}

fn bench_fact_extraction(c: &mut Criterion) {
    let rows = season_rows();
    c.bench_function("player_fact_extraction_cold", |b| {
        b.iter(|| {
            // Fresh table each time so nested fields are decoded again.
            let table = GameTable::from_values(black_box(&rows).iter());
            black_box(extract_player_facts(&table).len());
        })
    });
}

fn bench_reports(c: &mut Criterion) {
    let table = GameTable::from_values(season_rows().iter());
    let cfg = AnalysisConfig::default();

    c.bench_function("top_scorers", |b| {
        b.iter(|| black_box(player_rankings::top_scorers(&table, 20).len()))
    });
    c.bench_function("standings", |b| {
        b.iter(|| black_box(standings::calculate_standings(&table, &cfg.standings).len()))
    });
    c.bench_function("game_analysis", |b| {
        b.iter(|| black_box(game_events::analyze_games(&table).len()))
    });
    c.bench_function("referee_impact", |b| {
        b.iter(|| {
            black_box(
                referees::referee_impact_analysis(&table, &cfg.referees)
                    .summary
                    .len(),
            )
        })
    });
    c.bench_function("player_combinations", |b| {
        b.iter(|| {
            black_box(
                combinations::player_combinations(&table, &cfg.combinations)
                    .player_synergies
                    .len(),
            )
        })
    });
}

criterion_group!(perf, bench_literal_parse, bench_fact_extraction, bench_reports);
criterion_main!(perf);

static SEASON_JSON: &str = include_str!("../tests/fixtures/season_small.json");
