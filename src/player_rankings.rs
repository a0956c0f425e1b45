use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::aggregate::{
    PlayerKey, PlayerTotals, group_by_player, mean, rank_desc, ratio, round1, round2, sample_std,
};
use crate::config::{ConsistencyPolicy, DoubleDigitPolicy, ShootingPolicy};
use crate::game::GameTable;
use crate::player_stats::{PlayerGameFact, extract_player_facts};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorerRow {
    pub player_name: String,
    pub team: String,
    pub total_points: u32,
    pub made_1p: u32,
    pub made_2p: u32,
    pub made_3p: u32,
    pub games_played: u32,
    pub avg_points_per_game: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShootingEfficiencyRow {
    pub player_name: String,
    pub team: String,
    pub total_points: u32,
    pub made_1p: u32,
    pub made_2p: u32,
    pub made_3p: u32,
    pub games_played: u32,
    pub total_field_goals: u32,
    /// Points per made shot; attempts are not recorded.
    pub points_per_shot: f64,
    pub avg_points_per_game: f64,
    pub shots_per_game: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleGroupSummary {
    pub total_players: usize,
    pub total_games: usize,
    pub avg_points: f64,
    pub total_points: u32,
    pub avg_fouls: f64,
    pub total_shots: u32,
    pub avg_shots_per_game: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StartersVsBench {
    pub starters: Option<RoleGroupSummary>,
    pub bench: Option<RoleGroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleDigitRow {
    pub player_name: String,
    pub team: String,
    pub double_digit_games: u32,
    pub avg_in_double_digit_games: f64,
    pub highest_score: u32,
    pub total_games_played: u32,
    pub double_digit_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyRow {
    pub player_name: String,
    pub team: String,
    pub games_played: u32,
    pub avg_points: f64,
    pub std_dev_points: f64,
    pub min_points: u32,
    pub max_points: u32,
    pub consistency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreePointRow {
    pub player_name: String,
    pub team: String,
    pub made_3p: u32,
    pub games_played: u32,
    pub total_points: u32,
    pub avg_three_pointers_per_game: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoulerRow {
    pub player_name: String,
    pub team: String,
    pub total_fouls: u32,
    pub p_fouls: u32,
    pub p1_fouls: u32,
    pub p2_fouls: u32,
    pub p3_fouls: u32,
    pub games_played: u32,
    pub total_points: u32,
    pub avg_fouls_per_game: f64,
}

fn per_player<T>(
    facts: &[PlayerGameFact],
    mut row: impl FnMut(PlayerKey<'_>, &[&PlayerGameFact]) -> Option<T>,
) -> Vec<T> {
    group_by_player(facts)
        .into_iter()
        .filter_map(|(key, rows)| row(key, &rows))
        .collect()
}

pub fn top_scorers(table: &GameTable, top_n: usize) -> Vec<ScorerRow> {
    let facts = extract_player_facts(table);
    let rows = per_player(&facts, |key, rows| {
        let t = PlayerTotals::of(rows);
        Some(ScorerRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            total_points: t.points,
            made_1p: t.made_1p,
            made_2p: t.made_2p,
            made_3p: t.made_3p,
            games_played: t.games,
            avg_points_per_game: round1(t.per_game(t.points)),
        })
    });
    rank_desc(rows, top_n, |r| r.total_points as f64)
}

/// Longer leaderboard view of [`top_scorers`].
pub fn top_players_by_score(table: &GameTable, top_n: usize) -> Vec<ScorerRow> {
    top_scorers(table, top_n)
}

/// Best individual games, straight from the fact table.
pub fn highest_single_game_scores(table: &GameTable, top_n: usize) -> Vec<PlayerGameFact> {
    rank_desc(extract_player_facts(table), top_n, |f| f.total_points as f64)
}

pub fn shooting_efficiency(
    table: &GameTable,
    top_n: usize,
    policy: &ShootingPolicy,
) -> Vec<ShootingEfficiencyRow> {
    let facts = extract_player_facts(table);
    let rows = per_player(&facts, |key, rows| {
        let t = PlayerTotals::of(rows);
        let fg = t.made_shots();
        if t.games < policy.min_games || fg < policy.min_made_shots {
            return None;
        }
        Some(ShootingEfficiencyRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            total_points: t.points,
            made_1p: t.made_1p,
            made_2p: t.made_2p,
            made_3p: t.made_3p,
            games_played: t.games,
            total_field_goals: fg,
            points_per_shot: round2(t.points as f64 / fg.max(1) as f64),
            avg_points_per_game: round1(t.per_game(t.points)),
            shots_per_game: round1(t.per_game(fg)),
        })
    });
    rank_desc(rows, top_n, |r| r.points_per_shot)
}

pub fn starters_vs_bench(table: &GameTable) -> StartersVsBench {
    let facts = extract_player_facts(table);
    let (starters, bench): (Vec<&PlayerGameFact>, Vec<&PlayerGameFact>) =
        facts.iter().partition(|f| f.starting_five);
    StartersVsBench {
        starters: role_summary(&starters),
        bench: role_summary(&bench),
    }
}

fn role_summary(rows: &[&PlayerGameFact]) -> Option<RoleGroupSummary> {
    if rows.is_empty() {
        return None;
    }
    let players: HashSet<&str> = rows.iter().map(|f| f.player_name.as_str()).collect();
    let points: Vec<f64> = rows.iter().map(|f| f.total_points as f64).collect();
    let fouls: Vec<f64> = rows.iter().map(|f| f.total_fouls as f64).collect();
    let shots: Vec<f64> = rows.iter().map(|f| f.made_shots() as f64).collect();
    Some(RoleGroupSummary {
        total_players: players.len(),
        total_games: rows.len(),
        avg_points: round1(mean(&points)),
        total_points: rows.iter().fold(0, |acc: u32, f| acc.saturating_add(f.total_points)),
        avg_fouls: round1(mean(&fouls)),
        total_shots: rows.iter().fold(0, |acc: u32, f| acc.saturating_add(f.made_shots())),
        avg_shots_per_game: round1(mean(&shots)),
    })
}

/// Players by number of games at or above `policy.min_points`.
pub fn double_digit_scorers(table: &GameTable, policy: &DoubleDigitPolicy) -> Vec<DoubleDigitRow> {
    let facts = extract_player_facts(table);
    let all_games: BTreeMap<PlayerKey<'_>, u32> = group_by_player(&facts)
        .into_iter()
        .map(|(key, rows)| (key, rows.len() as u32))
        .collect();

    let hits: Vec<PlayerGameFact> = facts
        .iter()
        .filter(|f| f.total_points >= policy.min_points)
        .cloned()
        .collect();

    let rows = per_player(&hits, |key, rows| {
        let points: Vec<f64> = rows.iter().map(|f| f.total_points as f64).collect();
        let count = rows.len() as u32;
        let total = all_games.get(&key).copied().unwrap_or(count);
        Some(DoubleDigitRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            double_digit_games: count,
            avg_in_double_digit_games: round1(mean(&points)),
            highest_score: rows.iter().map(|f| f.total_points).max().unwrap_or(0),
            total_games_played: total,
            double_digit_pct: round1(ratio(count as f64, total as f64) * 100.0),
        })
    });
    rank_desc(rows, policy.top_n, |r| r.double_digit_games as f64)
}

/// Mean over (sample deviation + stabilizer); finite for any non-empty input.
pub fn consistency_score(points: &[f64], stabilizer: f64) -> f64 {
    mean(points) / (sample_std(points) + stabilizer)
}

pub fn consistent_scorers(table: &GameTable, policy: &ConsistencyPolicy) -> Vec<ConsistencyRow> {
    let facts = extract_player_facts(table);
    let rows = per_player(&facts, |key, rows| {
        if (rows.len() as u32) < policy.min_games {
            return None;
        }
        let points: Vec<f64> = rows.iter().map(|f| f.total_points as f64).collect();
        Some(ConsistencyRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            games_played: rows.len() as u32,
            avg_points: round1(mean(&points)),
            std_dev_points: round1(sample_std(&points)),
            min_points: rows.iter().map(|f| f.total_points).min().unwrap_or(0),
            max_points: rows.iter().map(|f| f.total_points).max().unwrap_or(0),
            consistency_score: round2(consistency_score(&points, policy.std_stabilizer)),
        })
    });
    rank_desc(rows, policy.top_n, |r| r.consistency_score)
}

pub fn top_three_pointers(table: &GameTable, top_n: usize) -> Vec<ThreePointRow> {
    let facts = extract_player_facts(table);
    let rows = per_player(&facts, |key, rows| {
        let t = PlayerTotals::of(rows);
        Some(ThreePointRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            made_3p: t.made_3p,
            games_played: t.games,
            total_points: t.points,
            avg_three_pointers_per_game: round1(t.per_game(t.made_3p)),
        })
    });
    rank_desc(rows, top_n, |r| r.made_3p as f64)
}

pub fn top_foulers(table: &GameTable, top_n: usize) -> Vec<FoulerRow> {
    let facts = extract_player_facts(table);
    let rows = per_player(&facts, |key, rows| {
        let t = PlayerTotals::of(rows);
        Some(FoulerRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            total_fouls: t.fouls,
            p_fouls: t.p_fouls,
            p1_fouls: t.p1_fouls,
            p2_fouls: t.p2_fouls,
            p3_fouls: t.p3_fouls,
            games_played: t.games,
            total_points: t.points,
            avg_fouls_per_game: round1(t.per_game(t.fouls)),
        })
    });
    rank_desc(rows, top_n, |r| r.total_fouls as f64)
}
