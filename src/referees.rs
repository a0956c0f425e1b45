//! Referee views. Fouls are not attributed to individual officials: every
//! referee listed for a game carries that game's full foul count.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{mean, pct, rank_asc, rank_desc, round1, round2, sample_std, sort_desc_by};
use crate::config::RefereePolicy;
use crate::game::GameTable;
use crate::game_events::count_fouls;

/// One (referee, game) pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefereeGameFact {
    pub referee_name: String,
    pub game_id: String,
    pub fouls_in_game: u32,
}

pub fn referee_game_facts(table: &GameTable) -> Vec<RefereeGameFact> {
    let mut out = Vec::new();
    for game in table {
        let referees = game.referees();
        if referees.is_empty() {
            continue;
        }
        let fouls = count_fouls(game.events());
        for r in referees.iter().filter(|r| !r.name.is_empty()) {
            out.push(RefereeGameFact {
                referee_name: r.name.clone(),
                game_id: game.game_id.clone(),
                fouls_in_game: fouls,
            });
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefereeStatsRow {
    pub referee_name: String,
    pub games_refereed: u32,
    pub fouls_called: u32,
    pub avg_fouls_per_game: f64,
}

/// Referees by games officiated.
pub fn referee_statistics(table: &GameTable) -> Vec<RefereeStatsRow> {
    let mut groups: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for fact in referee_game_facts(table) {
        let entry = groups.entry(fact.referee_name).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(fact.fouls_in_game);
    }
    let mut rows: Vec<RefereeStatsRow> = groups
        .into_iter()
        .map(|(referee_name, (games, fouls))| RefereeStatsRow {
            referee_name,
            games_refereed: games,
            fouls_called: fouls,
            avg_fouls_per_game: round1(fouls as f64 / games as f64),
        })
        .collect();
    sort_desc_by(&mut rows, |r| r.games_refereed as f64);
    rows
}

pub fn referee_fouls_per_game(table: &GameTable) -> Vec<RefereeStatsRow> {
    rank_desc(referee_statistics(table), usize::MAX, |r| r.avg_fouls_per_game)
}

/// Referees with at least `min_games` games, fewest fouls first.
pub fn referees_least_fouls_per_game(table: &GameTable, min_games: u32) -> Vec<RefereeStatsRow> {
    let qualified = referee_statistics(table)
        .into_iter()
        .filter(|r| r.games_refereed >= min_games)
        .collect();
    rank_asc(qualified, usize::MAX, |r| r.avg_fouls_per_game)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefereeImpactRow {
    pub referee_name: String,
    pub games_refereed: u32,
    pub avg_fouls: f64,
    pub std_fouls: f64,
    pub avg_total_score: f64,
    pub std_total_score: f64,
    pub avg_score_difference: f64,
    pub std_score_difference: f64,
    pub high_scoring_rate: f64,
    pub close_game_rate: f64,
    pub home_win_rate: f64,
    /// Deltas against the mean over every referee, qualified or not.
    pub foul_impact: f64,
    pub scoring_impact: f64,
    pub score_difference_impact: f64,
    pub competitiveness_impact: f64,
    pub home_win_impact: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefereeImpactAnalysis {
    pub summary: Vec<RefereeImpactRow>,
    pub most_foul_prone: Vec<RefereeImpactRow>,
    pub least_foul_prone: Vec<RefereeImpactRow>,
    pub high_scoring: Vec<RefereeImpactRow>,
    pub most_competitive: Vec<RefereeImpactRow>,
}

#[derive(Default)]
struct Officiated {
    fouls: Vec<f64>,
    totals: Vec<f64>,
    diffs: Vec<f64>,
    high_scoring: u32,
    close: u32,
    home_wins: u32,
}

/// Finished games only; an empty analysis when no referee qualifies.
pub fn referee_impact_analysis(table: &GameTable, policy: &RefereePolicy) -> RefereeImpactAnalysis {
    let mut groups: BTreeMap<&str, Officiated> = BTreeMap::new();
    for game in table {
        let Some((home, away)) = game.final_scores() else {
            continue;
        };
        let fouls = count_fouls(game.events());
        let total = home.saturating_add(away);
        let diff = home.abs_diff(away);
        for r in game.referees().iter().filter(|r| !r.name.is_empty()) {
            let g = groups.entry(r.name.as_str()).or_default();
            g.fouls.push(fouls as f64);
            g.totals.push(total as f64);
            g.diffs.push(diff as f64);
            g.high_scoring += (total > policy.high_scoring_total) as u32;
            g.close += (diff <= policy.close_game_margin) as u32;
            g.home_wins += (home > away) as u32;
        }
    }

    let mut rows: Vec<RefereeImpactRow> = groups
        .into_iter()
        .map(|(name, g)| {
            let games = g.fouls.len() as u32;
            RefereeImpactRow {
                referee_name: name.to_string(),
                games_refereed: games,
                avg_fouls: round2(mean(&g.fouls)),
                std_fouls: round2(sample_std(&g.fouls)),
                avg_total_score: round2(mean(&g.totals)),
                std_total_score: round2(sample_std(&g.totals)),
                avg_score_difference: round2(mean(&g.diffs)),
                std_score_difference: round2(sample_std(&g.diffs)),
                high_scoring_rate: round1(pct(g.high_scoring as f64, games as f64)),
                close_game_rate: round1(pct(g.close as f64, games as f64)),
                home_win_rate: round1(pct(g.home_wins as f64, games as f64)),
                foul_impact: 0.0,
                scoring_impact: 0.0,
                score_difference_impact: 0.0,
                competitiveness_impact: 0.0,
                home_win_impact: 0.0,
            }
        })
        .collect();

    let fouls_mean = centre(&rows, |r| r.avg_fouls);
    let score_mean = centre(&rows, |r| r.avg_total_score);
    let diff_mean = centre(&rows, |r| r.avg_score_difference);
    let close_mean = centre(&rows, |r| r.close_game_rate);
    let home_mean = centre(&rows, |r| r.home_win_rate);
    for r in &mut rows {
        r.foul_impact = round2(r.avg_fouls - fouls_mean);
        r.scoring_impact = round2(r.avg_total_score - score_mean);
        r.score_difference_impact = round2(r.avg_score_difference - diff_mean);
        r.competitiveness_impact = round2(r.close_game_rate - close_mean);
        r.home_win_impact = round2(r.home_win_rate - home_mean);
    }

    let qualified: Vec<RefereeImpactRow> = rows
        .into_iter()
        .filter(|r| r.games_refereed >= policy.min_games)
        .collect();
    if qualified.is_empty() {
        return RefereeImpactAnalysis::default();
    }

    let n = policy.list_len;
    RefereeImpactAnalysis {
        most_foul_prone: rank_desc(qualified.clone(), n, |r| r.avg_fouls),
        least_foul_prone: rank_asc(qualified.clone(), n, |r| r.avg_fouls),
        high_scoring: rank_desc(qualified.clone(), n, |r| r.avg_total_score),
        most_competitive: rank_desc(qualified.clone(), n, |r| r.close_game_rate),
        summary: rank_desc(qualified, usize::MAX, |r| r.games_refereed as f64),
    }
}

fn centre(rows: &[RefereeImpactRow], f: impl Fn(&RefereeImpactRow) -> f64) -> f64 {
    mean(&rows.iter().map(f).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game(id: u32, refs: &str, fouls: usize, home: u32, away: u32) -> serde_json::Value {
        let events: Vec<String> = (0..fouls)
            .map(|_| "{'EventActor': 'p', 'EventAction': 'Foul Added', 'EventTeam': 'A'}".to_string())
            .collect();
        json!({
            "GameId": id, "HomeTeamName": "A", "AwayTeamName": "B",
            "FinalHomeScore": home, "FinalAwayScore": away,
            "Referres": refs,
            "GameEvents": format!("[{}]", events.join(", ")),
        })
    }

    #[test]
    fn impact_centres_on_all_referees() {
        let rows = [
            game(1, "[{'Referee Name': 'X'}, {'Referee Name': 'Y'}]", 4, 55, 50),
            game(2, "[{'Referee Name': 'X'}]", 8, 70, 40),
            game(3, "[{'Referee Name': 'Y'}]", 2, 40, 42),
        ];
        let table = GameTable::from_values(rows.iter());
        let analysis = referee_impact_analysis(&table, &RefereePolicy::default());
        assert_eq!(analysis.summary.len(), 2);
        let x = analysis.summary.iter().find(|r| r.referee_name == "X").unwrap();
        // X averages 6 fouls, Y 3; mean 4.5.
        assert_eq!(x.avg_fouls, 6.0);
        assert_eq!(x.foul_impact, 1.5);
        assert_eq!(x.close_game_rate, 50.0);
        assert_eq!(analysis.most_foul_prone[0].referee_name, "X");
        assert_eq!(analysis.least_foul_prone[0].referee_name, "Y");
    }

    #[test]
    fn no_qualified_referees_gives_empty_analysis() {
        let rows = [game(1, "[{'Referee Name': 'X'}]", 1, 50, 40)];
        let table = GameTable::from_values(rows.iter());
        assert_eq!(
            referee_impact_analysis(&table, &RefereePolicy::default()),
            RefereeImpactAnalysis::default()
        );
    }
}
