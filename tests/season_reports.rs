use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use hoops_stats::config::{ConsistencyPolicy, DoubleDigitPolicy, ShootingPolicy, StandingsPolicy};
use hoops_stats::fixtures::{TO_BE_DECIDED, all_fixtures, fixtures_matrix};
use hoops_stats::game_events::{analyze_games, game_top_scorer};
use hoops_stats::game_rankings::{
    biggest_wins, highest_scoring_games, most_lead_changes, most_tie_scores,
};
use hoops_stats::player_rankings::{
    consistency_score, consistent_scorers, double_digit_scorers, highest_single_game_scores,
    shooting_efficiency, starters_vs_bench, top_scorers,
};
use hoops_stats::player_stats::data_quality_report;
use hoops_stats::standings::{calculate_standings, standings_by_division};
use hoops_stats::team_performance::{GameResult, team_game_log, team_performance};
use hoops_stats::{GameTable, extract_player_facts};

const HAWKS: &str = "Harbour Hawks";
const OWLS: &str = "Riverside Owls";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn load_table(name: &str) -> GameTable {
    let rows: Vec<Value> =
        serde_json::from_str(&read_fixture(name)).expect("fixture should be valid json");
    GameTable::from_values(rows.iter())
}

#[test]
fn unparsable_roster_drops_only_that_game() {
    let table = load_table("season_small.json");
    assert_eq!(table.len(), 4);

    let facts = extract_player_facts(&table);
    assert_eq!(facts.len(), 24);
    assert!(facts.iter().all(|f| f.game_id == "101" || f.game_id == "103"));

    let quality = data_quality_report(&table);
    assert_eq!(quality.unfinished_games, 1);
    assert_eq!(quality.missing_rosters, 1);
    assert_eq!(quality.malformed_rosters, ["102"]);
    assert_eq!(quality.fact_rows, 24);
    assert_eq!(quality.point_mismatches.len(), 1);
    assert_eq!(quality.point_mismatches[0].player_name, "Owl F");
    assert_eq!(quality.point_mismatches[0].points_from_shots, 4);
}

#[test]
fn string_starter_flags_are_coerced() {
    let table = load_table("season_small.json");
    let facts = extract_player_facts(&table);
    let owls_103: Vec<_> = facts
        .iter()
        .filter(|f| f.game_id == "103" && f.team == OWLS)
        .collect();
    assert_eq!(owls_103.iter().filter(|f| f.starting_five).count(), 5);
    let owl_f = owls_103
        .iter()
        .find(|f| f.player_name == "Owl F")
        .expect("Owl F should have a row in game 103");
    assert!(!owl_f.starting_five);
}

#[test]
fn scorer_ties_keep_player_key_order() {
    let table = load_table("season_small.json");
    let rows = top_scorers(&table, 3);
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.as_str()).collect();
    // Hawk B and Owl A both have 32 points.
    assert_eq!(names, ["Hawk A", "Hawk B", "Owl A"]);
    assert_eq!(rows[0].total_points, 45);
    assert_eq!(rows[0].made_3p, 5);
    assert_eq!(rows[0].avg_points_per_game, 22.5);
}

#[test]
fn rankings_are_idempotent_and_prefix_stable() {
    let table = load_table("season_small.json");
    let long = top_scorers(&table, 10);
    let short = top_scorers(&table, 4);
    assert_eq!(short.as_slice(), &long[..4]);
    assert_eq!(top_scorers(&table, 10), long);

    let eff = shooting_efficiency(&table, 50, &ShootingPolicy::default());
    assert!(eff.is_empty(), "nobody reaches five games");
    let eff = shooting_efficiency(
        &table,
        50,
        &ShootingPolicy {
            min_games: 2,
            min_made_shots: 10,
        },
    );
    assert!(eff.iter().all(|r| r.games_played >= 2 && r.total_field_goals >= 10));
    for pair in eff.windows(2) {
        assert!(pair[0].points_per_shot >= pair[1].points_per_shot);
    }
}

#[test]
fn single_game_highs_come_from_fact_rows() {
    let table = load_table("season_small.json");
    let top = highest_single_game_scores(&table, 2);
    assert_eq!(top[0].player_name, "Hawk A");
    assert_eq!(top[0].total_points, 25);
    assert_eq!(top[0].game_id, "103");
    assert_eq!(top[1].total_points, 20);
}

#[test]
fn starters_and_bench_split() {
    let table = load_table("season_small.json");
    let split = starters_vs_bench(&table);
    let starters = split.starters.expect("starters present");
    let bench = split.bench.expect("bench present");
    // 101: 10 starters, 103: 4 + 5 starters.
    assert_eq!(starters.total_games, 19);
    assert_eq!(bench.total_games, 5);
    assert_eq!(starters.total_games + bench.total_games, 24);
}

#[test]
fn double_digit_and_consistency_thresholds() {
    let table = load_table("season_small.json");
    let dd = double_digit_scorers(&table, &DoubleDigitPolicy::default());
    let names: Vec<&str> = dd.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Hawk A", "Hawk B", "Owl A", "Owl B", "Hawk D"]);
    assert_eq!(dd[4].double_digit_games, 1);
    assert_eq!(dd[4].double_digit_pct, 50.0);

    assert!(consistent_scorers(&table, &ConsistencyPolicy::default()).is_empty());
    let relaxed = ConsistencyPolicy {
        min_games: 2,
        ..ConsistencyPolicy::default()
    };
    let rows = consistent_scorers(&table, &relaxed);
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].player_name, "Hawk D");
    assert_eq!(rows[0].consistency_score, 6.6);

    // One game has no spread; the stabilizer keeps the score finite.
    let single = consistency_score(&[12.0], 0.1);
    assert!(single.is_finite());
    assert!((single - 120.0).abs() < 1e-9);
}

#[test]
fn standings_balance_wins_and_losses() {
    let table = load_table("season_small.json");
    let rows = calculate_standings(&table, &StandingsPolicy::default());
    let finished = table.iter().filter(|g| g.is_finished()).count() as u32;
    assert_eq!(rows.iter().map(|r| r.wins).sum::<u32>(), finished);
    assert_eq!(rows.iter().map(|r| r.losses).sum::<u32>(), finished);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team, HAWKS);
    assert_eq!(rows[0].league_points, 6);
    assert_eq!(rows[0].points_for, 180);
    assert_eq!(rows[0].points_against, 145);
    assert_eq!(rows[1].league_points, 3);
    assert_eq!(rows[1].points_diff, -35);

    assert!(standings_by_division(&table, "U16", &StandingsPolicy::default()).is_empty());
}

#[test]
fn team_views_follow_finished_games() {
    let table = load_table("season_small.json");
    let teams = team_performance(&table);
    assert_eq!(teams.len(), 2);
    let hawks = &teams[0];
    assert_eq!(hawks.team, HAWKS);
    assert_eq!((hawks.total_games, hawks.home_games, hawks.away_games), (3, 2, 1));
    assert_eq!(hawks.longest_win_streak, 3);
    assert_eq!(hawks.highest_score, 70);
    assert_eq!(hawks.lowest_score, 50);
    assert_eq!(teams[1].win_percentage, 0.0);

    let log = team_game_log(&table, OWLS);
    let ids: Vec<&str> = log.iter().map(|e| e.game_id.as_str()).collect();
    assert_eq!(ids, ["101", "102", "103"]);
    assert!(log.iter().all(|e| e.result == GameResult::L));
    assert!(log[1].is_home);
    assert_eq!(log[2].margin, -28);
}

#[test]
fn scenario_games_rank_by_margin_and_ties() {
    let table = load_table("two_games.json");
    let wins = biggest_wins(&table, 1);
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].game_id, "G2");
    assert_eq!(wins[0].win_margin, Some(30));

    let ties = most_tie_scores(&table, 1);
    assert_eq!(ties[0].game_id, "G1");
    assert_eq!(ties[0].tie_scores, 1);
    assert_eq!(ties[0].lead_changes, 2);

    let all = analyze_games(&table);
    let g2 = all.iter().find(|a| a.game_id == "G2").expect("G2 analysed");
    assert_eq!(g2.tie_scores, 0);
    assert_eq!(g2.max_away_lead, 5);
}

#[test]
fn game_rankings_skip_unfinished_games() {
    let table = load_table("season_small.json");
    assert_eq!(analyze_games(&table).len(), 4);

    let wins = biggest_wins(&table, 10);
    let ids: Vec<&str> = wins.iter().map(|g| g.game_id.as_str()).collect();
    assert_eq!(ids, ["103", "101", "102"]);

    let high = highest_scoring_games(&table, 10);
    assert_eq!(high.len(), 3);
    assert_eq!(high[0].game_id, "101");
    assert_eq!(high[0].total_score, 115);

    let changes = most_lead_changes(&table, 1);
    assert_eq!(changes[0].game_id, "101");
    assert_eq!(changes[0].tie_scores, 3);
    assert_eq!(changes[0].lead_changes, 2);
}

#[test]
fn fixtures_list_and_matrix() {
    let table = load_table("season_small.json");
    let list = all_fixtures(&table);
    let ids: Vec<&str> = list.iter().map(|f| f.game_id.as_str()).collect();
    assert_eq!(ids, ["104", "103", "102", "101"]);

    let upcoming = &list[0];
    assert!(!upcoming.is_finished);
    assert_eq!(upcoming.location, TO_BE_DECIDED);
    assert!(upcoming.referees.is_empty());

    // Native object, literal text and doubly encoded text all decode.
    assert_eq!(list[1].location, "Central Arena");
    assert_eq!(list[2].location, "Eastside Hall");
    assert_eq!(list[3].location, "Central Arena");
    assert_eq!(list[3].referees, ["R. Adams", "R. Baker"]);
    assert_eq!(list[3].top_scorer_name, "Hawk A");
    assert_eq!(list[3].top_scorer_points, 8);
    assert_eq!(list[3].top_scorer_team, HAWKS);

    let game = table.get("101").expect("game 101 present");
    assert_eq!(game_top_scorer(game).map(|t| t.points), Some(8));

    let matrix = fixtures_matrix(&table, Some("U14"));
    assert_eq!(matrix.teams, [HAWKS, OWLS]);
    assert_eq!(matrix.divisions, ["U14", "U16"]);
    assert_eq!(matrix.cell(HAWKS, OWLS).len(), 2);
    assert_eq!(matrix.cell(OWLS, HAWKS).len(), 1);
    assert!(matrix.cell(HAWKS, HAWKS).is_empty());
}

#[test]
fn oversized_counts_and_scores_saturate() {
    let roster = "[{'Team Name': 'Giants', 'Players': [{'Player Name': 'Big', \
                  'Total Points': 4000000000, '2P Made Shots': 3000000000, \
                  'Starting Five': True}]}]";
    let rows: Vec<Value> = ["G1", "G2"]
        .iter()
        .map(|id| {
            serde_json::json!({
                "GameId": id,
                "HomeTeamName": "Giants",
                "AwayTeamName": "Dwarfs",
                "FinalHomeScore": 4_000_000_000u64,
                "FinalAwayScore": 3_000_000_000u64,
                "Teams": roster,
            })
        })
        .collect();
    let table = GameTable::from_values(rows.iter());

    let quality = data_quality_report(&table);
    assert_eq!(quality.point_mismatches.len(), 2);
    assert_eq!(quality.point_mismatches[0].points_from_shots, u32::MAX);

    let scorers = top_scorers(&table, 1);
    assert_eq!(scorers[0].total_points, u32::MAX);

    let games = highest_scoring_games(&table, 2);
    assert!(games.iter().all(|g| g.total_score == u32::MAX));

    let standings = calculate_standings(&table, &StandingsPolicy::default());
    assert_eq!(standings[0].team, "Giants");
    assert_eq!(standings[0].points_for, u32::MAX);

    let giants = team_performance(&table)
        .into_iter()
        .find(|t| t.team == "Giants")
        .expect("home team has a row");
    assert_eq!(giants.total_points_scored, u32::MAX);
    assert_eq!(giants.wins, 2);
}
