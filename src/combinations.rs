use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::aggregate::{game_index, pct, rank_desc, ratio, round1};
use crate::config::CombinationPolicy;
use crate::game::{Game, GameTable};
use crate::player_stats::{PlayerGameFact, extract_player_facts};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartingFiveRow {
    /// Starter names, sorted and comma separated.
    pub players: String,
    pub team: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub avg_points_per_game: f64,
    pub avg_fouls_per_game: f64,
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynergyRow {
    pub player1: String,
    pub player2: String,
    pub team: String,
    pub games_together: u32,
    pub wins_together: u32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinationAnalysis {
    pub best_starting_fives: Vec<StartingFiveRow>,
    pub player_synergies: Vec<SynergyRow>,
}

/// win rate (%) + avg points / 10 − avg fouls / 2
pub fn lineup_efficiency(win_rate: f64, avg_points: f64, avg_fouls: f64) -> f64 {
    win_rate + avg_points / 10.0 - avg_fouls / 2.0
}

/// One team's appearance in one game.
struct TeamGame<'a> {
    team: &'a str,
    game_id: &'a str,
    rows: Vec<&'a PlayerGameFact>,
}

/// Team-games ordered by team name, then by table order.
fn team_games(facts: &[PlayerGameFact]) -> Vec<TeamGame<'_>> {
    let mut out: Vec<TeamGame<'_>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for f in facts {
        let key = (f.team.as_str(), f.game_id.as_str());
        match index.get(&key) {
            Some(&idx) => out[idx].rows.push(f),
            None => {
                index.insert(key, out.len());
                out.push(TeamGame {
                    team: key.0,
                    game_id: key.1,
                    rows: vec![f],
                });
            }
        }
    }
    out.sort_by(|a, b| a.team.cmp(b.team));
    out
}

fn won(game: Option<&&Game>, team: &str) -> Option<bool> {
    let (own, opp) = game?.scores_for(team)?;
    Some(own > opp)
}

#[derive(Default)]
struct Lineup {
    team: String,
    games: u32,
    wins: u32,
    losses: u32,
    points: u32,
    fouls: u32,
}

pub fn best_starting_fives(table: &GameTable, policy: &CombinationPolicy) -> Vec<StartingFiveRow> {
    let facts = extract_player_facts(table);
    let games = game_index(table);

    let mut order: Vec<Vec<&str>> = Vec::new();
    let mut lineups: HashMap<Vec<&str>, Lineup> = HashMap::new();
    for tg in team_games(&facts) {
        let starters: BTreeSet<&str> = tg
            .rows
            .iter()
            .filter(|f| f.starting_five)
            .map(|f| f.player_name.as_str())
            .collect();
        // Incomplete or over-flagged lineups are not a starting five.
        let flagged = tg.rows.iter().filter(|f| f.starting_five).count();
        if flagged != policy.starters_per_side || starters.len() != policy.starters_per_side {
            continue;
        }
        let key: Vec<&str> = starters.into_iter().collect();
        let lineup = lineups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Lineup {
                team: tg.team.to_string(),
                ..Default::default()
            }
        });
        lineup.games += 1;
        match won(games.get(tg.game_id), tg.team) {
            Some(true) => lineup.wins += 1,
            Some(false) => lineup.losses += 1,
            None => {}
        }
        for f in &tg.rows {
            lineup.points = lineup.points.saturating_add(f.total_points);
            lineup.fouls = lineup.fouls.saturating_add(f.total_fouls);
        }
    }

    let rows = order
        .into_iter()
        .filter_map(|key| {
            let l = lineups.remove(&key)?;
            if l.games < policy.min_games {
                return None;
            }
            let win_rate = pct(l.wins as f64, l.games as f64);
            let avg_points = ratio(l.points as f64, l.games as f64);
            let avg_fouls = ratio(l.fouls as f64, l.games as f64);
            Some(StartingFiveRow {
                players: key.join(", "),
                team: l.team,
                games_played: l.games,
                wins: l.wins,
                losses: l.losses,
                win_rate: round1(win_rate),
                avg_points_per_game: round1(avg_points),
                avg_fouls_per_game: round1(avg_fouls),
                efficiency_score: round1(lineup_efficiency(win_rate, avg_points, avg_fouls)),
            })
        })
        .collect();
    rank_desc(rows, usize::MAX, |r| r.efficiency_score)
}

/// Every teammate pair with enough shared games, by shared win rate.
pub fn player_synergies(table: &GameTable, policy: &CombinationPolicy) -> Vec<SynergyRow> {
    let facts = extract_player_facts(table);
    let games = game_index(table);

    // team -> players in first-appearance order -> games played
    let mut teams: Vec<(&str, Vec<(&str, BTreeSet<&str>)>)> = Vec::new();
    for f in &facts {
        let t = match teams.iter().position(|(t, _)| *t == f.team) {
            Some(t) => t,
            None => {
                teams.push((f.team.as_str(), Vec::new()));
                teams.len() - 1
            }
        };
        let players = &mut teams[t].1;
        let p = match players.iter().position(|(p, _)| *p == f.player_name) {
            Some(p) => p,
            None => {
                players.push((f.player_name.as_str(), BTreeSet::new()));
                players.len() - 1
            }
        };
        players[p].1.insert(f.game_id.as_str());
    }

    let mut rows = Vec::new();
    for (team, players) in &teams {
        for (i, (p1, g1)) in players.iter().enumerate() {
            for (p2, g2) in &players[i + 1..] {
                let together: Vec<&str> = g1.intersection(g2).copied().collect();
                if (together.len() as u32) < policy.min_games {
                    continue;
                }
                let wins = together
                    .iter()
                    .filter(|id| won(games.get(*id), team) == Some(true))
                    .count() as u32;
                rows.push(SynergyRow {
                    player1: p1.to_string(),
                    player2: p2.to_string(),
                    team: team.to_string(),
                    games_together: together.len() as u32,
                    wins_together: wins,
                    win_rate: round1(pct(wins as f64, together.len() as f64)),
                });
            }
        }
    }
    rank_desc(rows, policy.synergy_top_n, |r| r.win_rate)
}

pub fn player_combinations(table: &GameTable, policy: &CombinationPolicy) -> CombinationAnalysis {
    CombinationAnalysis {
        best_starting_fives: best_starting_fives(table, policy),
        player_synergies: player_synergies(table, policy),
    }
}
