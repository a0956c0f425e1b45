use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::aggregate::{PlayerTotals, game_index, group_by_player, mean, pct, rank_desc, ratio, round1, round2};
use crate::config::{FoulImpactPolicy, ImpactWeights};
use crate::game::GameTable;
use crate::player_stats::extract_player_facts;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerImpactRow {
    pub player_name: String,
    pub team: String,
    pub games_played: u32,
    pub win_rate: f64,
    pub avg_points: f64,
    pub avg_fouls: f64,
    pub efficiency: f64,
    pub point_differential: f64,
    pub starting_rate: f64,
    pub impact_score: f64,
    pub total_points: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Inputs of the composite score, unrounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImpactInputs {
    pub avg_points: f64,
    pub win_rate: f64,
    pub points_per_shot: f64,
    pub point_differential: f64,
    pub starting_rate: f64,
    pub avg_fouls: f64,
}

pub fn impact_score(inputs: &ImpactInputs, w: &ImpactWeights) -> f64 {
    inputs.avg_points * w.avg_points
        + inputs.win_rate * w.win_rate
        + inputs.points_per_shot * w.efficiency_scale * w.efficiency
        + inputs.point_differential * w.point_differential
        + inputs.starting_rate * w.starting_rate
        - inputs.avg_fouls * w.foul_penalty
}

/// Composite impact per (player, team). Win rate and point differential use
/// the player's finished games only; unfinished appearances still count
/// toward scoring, fouls and starts.
pub fn player_impact(table: &GameTable, top_n: usize, weights: &ImpactWeights) -> Vec<PlayerImpactRow> {
    let facts = extract_player_facts(table);
    let games = game_index(table);

    let mut rows = Vec::new();
    for (key, group) in group_by_player(&facts) {
        let t = PlayerTotals::of(&group);
        if t.games < weights.min_games {
            continue;
        }

        let mut wins = 0u32;
        let mut losses = 0u32;
        let mut diffs = Vec::new();
        for fact in &group {
            let Some((own, opp)) = games.get(fact.game_id.as_str()).and_then(|g| g.scores_for(key.team))
            else {
                continue;
            };
            diffs.push(own as f64 - opp as f64);
            if own > opp {
                wins += 1;
            } else if own < opp {
                losses += 1;
            }
        }

        let inputs = ImpactInputs {
            avg_points: t.per_game(t.points),
            win_rate: pct(wins as f64, diffs.len() as f64),
            points_per_shot: t.points as f64 / t.made_shots().max(1) as f64,
            point_differential: mean(&diffs),
            starting_rate: pct(t.starts as f64, t.games as f64),
            avg_fouls: t.per_game(t.fouls),
        };
        rows.push(PlayerImpactRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            games_played: t.games,
            win_rate: round1(inputs.win_rate),
            avg_points: round1(inputs.avg_points),
            avg_fouls: round1(inputs.avg_fouls),
            efficiency: round2(inputs.points_per_shot),
            point_differential: round1(inputs.point_differential),
            starting_rate: round1(inputs.starting_rate),
            impact_score: round1(impact_score(&inputs, weights)),
            total_points: t.points,
            wins,
            losses,
        });
    }
    rank_desc(rows, top_n, |r| r.impact_score)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoulImpactRow {
    pub player_name: String,
    pub team: String,
    pub games_played: u32,
    pub total_fouls: u32,
    pub personal_avg_fouls: f64,
    pub team_fouls_with_player: f64,
    pub team_fouls_without_player: f64,
    pub foul_difference: f64,
    /// Signed change relative to the team's fouls without the player.
    pub foul_impact_percentage: f64,
    pub games_with_player: u32,
    pub games_without_player: u32,
}

/// How a team's per-game foul total moves with and without each player.
/// Ranked by the magnitude of the change, either direction.
pub fn foul_impact(table: &GameTable, top_n: usize, policy: &FoulImpactPolicy) -> Vec<FoulImpactRow> {
    let facts = extract_player_facts(table);

    // Team-game foul totals summed over everyone on the roster.
    let mut team_games: HashMap<&str, Vec<(&str, u32)>> = HashMap::new();
    let mut slot: HashMap<(&str, &str), usize> = HashMap::new();
    for f in &facts {
        let games = team_games.entry(f.team.as_str()).or_default();
        match slot.get(&(f.team.as_str(), f.game_id.as_str())) {
            Some(&idx) => games[idx].1 = games[idx].1.saturating_add(f.total_fouls),
            None => {
                slot.insert((f.team.as_str(), f.game_id.as_str()), games.len());
                games.push((f.game_id.as_str(), f.total_fouls));
            }
        }
    }

    let mut rows = Vec::new();
    for (key, group) in group_by_player(&facts) {
        let t = PlayerTotals::of(&group);
        if t.games < policy.min_games {
            continue;
        }
        let played: HashSet<&str> = group.iter().map(|f| f.game_id.as_str()).collect();
        let Some(games) = team_games.get(key.team) else {
            continue;
        };
        let mut with = Vec::new();
        let mut without = Vec::new();
        for (game_id, fouls) in games {
            if played.contains(game_id) {
                with.push(*fouls as f64);
            } else {
                without.push(*fouls as f64);
            }
        }
        if with.is_empty() || without.is_empty() {
            continue;
        }

        let avg_with = mean(&with);
        let avg_without = mean(&without);
        let difference = avg_with - avg_without;
        let impact_pct = if avg_without > 0.0 {
            difference / avg_without.max(1.0) * 100.0
        } else {
            0.0
        };
        rows.push(FoulImpactRow {
            player_name: key.player_name.to_string(),
            team: key.team.to_string(),
            games_played: t.games,
            total_fouls: t.fouls,
            personal_avg_fouls: round1(ratio(t.fouls as f64, t.games as f64)),
            team_fouls_with_player: round1(avg_with),
            team_fouls_without_player: round1(avg_without),
            foul_difference: round1(difference),
            foul_impact_percentage: round1(impact_pct),
            games_with_player: with.len() as u32,
            games_without_player: without.len() as u32,
        });
    }
    rank_desc(rows, top_n, |r| r.foul_impact_percentage.abs())
}
