use serde::Serialize;

use crate::config::StandingsPolicy;
use crate::game::{GameTable, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub rank: usize,
    pub team: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub league_points: u32,
    pub points_diff: i64,
}

impl StandingsRow {
    fn new(team: &str) -> Self {
        Self {
            rank: 0,
            team: team.to_string(),
            games: 0,
            wins: 0,
            losses: 0,
            points_for: 0,
            points_against: 0,
            league_points: 0,
            points_diff: 0,
        }
    }

    fn record(&mut self, scored: u32, allowed: u32, won: Option<bool>, policy: &StandingsPolicy) {
        self.games += 1;
        self.points_for = self.points_for.saturating_add(scored);
        self.points_against = self.points_against.saturating_add(allowed);
        let earned = match won {
            Some(true) => {
                self.wins += 1;
                policy.win_points
            }
            Some(false) => {
                self.losses += 1;
                policy.loss_points
            }
            None => policy.loss_points,
        };
        self.league_points = self.league_points.saturating_add(earned);
    }
}

/// League table over the finished games of `table`. Teams enter in
/// first-appearance order (home before away), then rank by league points and
/// point differential; exact ties keep that order. A drawn game counts as
/// played with no win or loss and each side takes the loss allocation.
pub fn calculate_standings(table: &GameTable, policy: &StandingsPolicy) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::new();

    for game in table {
        let (Some((home, away)), Some(outcome)) = (game.final_scores(), game.outcome()) else {
            continue;
        };
        let (home_won, away_won) = match outcome {
            Outcome::HomeWin => (Some(true), Some(false)),
            Outcome::AwayWin => (Some(false), Some(true)),
            Outcome::Draw => (None, None),
        };
        let h = slot(&mut rows, &game.home_team);
        rows[h].record(home, away, home_won, policy);
        let a = slot(&mut rows, &game.away_team);
        rows[a].record(away, home, away_won, policy);
    }

    for r in &mut rows {
        r.points_diff = r.points_for as i64 - r.points_against as i64;
    }
    rows.sort_by(|a, b| {
        b.league_points
            .cmp(&a.league_points)
            .then(b.points_diff.cmp(&a.points_diff))
    });
    for (idx, r) in rows.iter_mut().enumerate() {
        r.rank = idx + 1;
    }
    rows
}

fn slot(rows: &mut Vec<StandingsRow>, team: &str) -> usize {
    match rows.iter().position(|r| r.team == team) {
        Some(idx) => idx,
        None => {
            rows.push(StandingsRow::new(team));
            rows.len() - 1
        }
    }
}

pub fn standings_by_division(
    table: &GameTable,
    division: &str,
    policy: &StandingsPolicy,
) -> Vec<StandingsRow> {
    calculate_standings(&table.division(division), policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loser_still_earns_a_point() {
        let rows = [
            json!({"GameId": 1, "HomeTeamName": "A", "AwayTeamName": "B",
                   "FinalHomeScore": 50, "FinalAwayScore": 40}),
            json!({"GameId": 2, "HomeTeamName": "C", "AwayTeamName": "A",
                   "FinalHomeScore": 55, "FinalAwayScore": 50}),
            json!({"GameId": 3, "HomeTeamName": "B", "AwayTeamName": "C"}),
        ];
        let table = GameTable::from_values(rows.iter());
        let standings = calculate_standings(&table, &StandingsPolicy::default());
        let names: Vec<&str> = standings.iter().map(|r| r.team.as_str()).collect();
        // Unfinished game 3 is ignored.
        assert_eq!(names, ["A", "C", "B"]);
        assert_eq!(standings[0].league_points, 3);
        assert_eq!(standings[2].league_points, 1);
        assert_eq!(standings[2].games, 1);
        assert_eq!(standings.iter().map(|r| r.rank).collect::<Vec<_>>(), [1, 2, 3]);
    }
}
