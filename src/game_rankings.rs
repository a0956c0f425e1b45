use serde::Serialize;

use crate::aggregate::rank_desc;
use crate::game::GameTable;
use crate::game_events::{GameAnalysis, analyze_games};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighScoringGame {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub final_home_score: u32,
    pub final_away_score: u32,
    pub total_score: u32,
    pub division: Option<String>,
}

/// Finished games by combined final score.
pub fn highest_scoring_games(table: &GameTable, top_n: usize) -> Vec<HighScoringGame> {
    let rows = table
        .iter()
        .filter_map(|g| {
            let (home, away) = g.final_scores()?;
            Some(HighScoringGame {
                game_id: g.game_id.clone(),
                home_team: g.home_team.clone(),
                away_team: g.away_team.clone(),
                final_home_score: home,
                final_away_score: away,
                total_score: home.saturating_add(away),
                division: g.division.clone(),
            })
        })
        .collect();
    rank_desc(rows, top_n, |r| r.total_score as f64)
}

pub fn most_tie_scores(table: &GameTable, top_n: usize) -> Vec<GameAnalysis> {
    rank_desc(analyze_games(table), top_n, |a| a.tie_scores as f64)
}

pub fn most_lead_changes(table: &GameTable, top_n: usize) -> Vec<GameAnalysis> {
    rank_desc(analyze_games(table), top_n, |a| a.lead_changes as f64)
}

pub fn biggest_leads(table: &GameTable, top_n: usize) -> Vec<GameAnalysis> {
    rank_desc(analyze_games(table), top_n, |a| a.biggest_lead as f64)
}

/// Largest final margins. Unfinished games have no margin and are left out.
pub fn biggest_wins(table: &GameTable, top_n: usize) -> Vec<GameAnalysis> {
    let finished: Vec<GameAnalysis> = analyze_games(table)
        .into_iter()
        .filter(|a| a.win_margin.is_some())
        .collect();
    rank_desc(finished, top_n, |a| a.win_margin.unwrap_or(0) as f64)
}
