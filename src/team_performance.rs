use serde::Serialize;

use crate::aggregate::{pct, ratio, round1, sort_desc_by};
use crate::game::{Game, GameTable, Side};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPerformance {
    pub team: String,
    pub total_games: u32,
    pub home_games: u32,
    pub away_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_points_scored: u32,
    pub total_points_allowed: u32,
    pub highest_score: u32,
    pub lowest_score: u32,
    pub avg_points_scored: f64,
    pub avg_points_allowed: f64,
    pub points_differential: i64,
    pub win_percentage: f64,
    pub home_win_percentage: f64,
    pub away_win_percentage: f64,
    pub longest_win_streak: u32,
}

#[derive(Debug, Default)]
struct Acc {
    games: u32,
    home_games: u32,
    away_games: u32,
    wins: u32,
    home_wins: u32,
    away_wins: u32,
    losses: u32,
    scored: u32,
    allowed: u32,
    highest: u32,
    lowest: Option<u32>,
}

impl Acc {
    fn record(&mut self, side: Side, scored: u32, allowed: u32) {
        self.games += 1;
        self.scored = self.scored.saturating_add(scored);
        self.allowed = self.allowed.saturating_add(allowed);
        self.highest = self.highest.max(scored);
        self.lowest = Some(self.lowest.map_or(scored, |l| l.min(scored)));
        let won = scored > allowed;
        match side {
            Side::Home => {
                self.home_games += 1;
                self.home_wins += won as u32;
            }
            Side::Away => {
                self.away_games += 1;
                self.away_wins += won as u32;
            }
        }
        if won {
            self.wins += 1;
        } else if scored < allowed {
            self.losses += 1;
        }
    }
}

/// Teams in first-appearance order, ranked by win percentage.
pub fn team_performance(table: &GameTable) -> Vec<TeamPerformance> {
    let mut teams: Vec<(String, Acc)> = Vec::new();
    for game in table {
        let Some((home, away)) = game.final_scores() else {
            continue;
        };
        for (team, side, scored, allowed) in [
            (&game.home_team, Side::Home, home, away),
            (&game.away_team, Side::Away, away, home),
        ] {
            let idx = match teams.iter().position(|(t, _)| t == team) {
                Some(idx) => idx,
                None => {
                    teams.push((team.clone(), Acc::default()));
                    teams.len() - 1
                }
            };
            teams[idx].1.record(side, scored, allowed);
        }
    }

    let mut rows: Vec<TeamPerformance> = teams
        .into_iter()
        .map(|(team, a)| {
            let longest_win_streak = longest_win_streak(table, &team);
            TeamPerformance {
                total_games: a.games,
                home_games: a.home_games,
                away_games: a.away_games,
                wins: a.wins,
                losses: a.losses,
                total_points_scored: a.scored,
                total_points_allowed: a.allowed,
                highest_score: a.highest,
                lowest_score: a.lowest.unwrap_or(0),
                avg_points_scored: round1(ratio(a.scored as f64, a.games as f64)),
                avg_points_allowed: round1(ratio(a.allowed as f64, a.games as f64)),
                points_differential: a.scored as i64 - a.allowed as i64,
                win_percentage: round1(pct(a.wins as f64, a.games as f64)),
                home_win_percentage: round1(pct(a.home_wins as f64, a.home_games as f64)),
                away_win_percentage: round1(pct(a.away_wins as f64, a.away_games as f64)),
                longest_win_streak,
                team,
            }
        })
        .collect();
    sort_desc_by(&mut rows, |r| r.win_percentage);
    rows
}

/// A team's finished games ordered by date; undated games go last.
fn finished_games_by_date<'a>(table: &'a GameTable, team: &str) -> Vec<&'a Game> {
    let mut games: Vec<&Game> = table
        .iter()
        .filter(|g| g.is_finished() && g.side_of(team).is_some())
        .collect();
    games.sort_by(|a, b| match (&a.date_time, &b.date_time) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    games
}

pub fn longest_win_streak(table: &GameTable, team: &str) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for game in finished_games_by_date(table, team) {
        if game.winner() == Some(team) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    W,
    L,
    D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGameLogEntry {
    pub game_id: String,
    pub date_time: Option<String>,
    pub opponent: String,
    pub is_home: bool,
    pub team_score: u32,
    pub opponent_score: u32,
    pub result: GameResult,
    pub margin: i64,
    pub division: Option<String>,
}

/// Finished games of one team in date order.
pub fn team_game_log(table: &GameTable, team: &str) -> Vec<TeamGameLogEntry> {
    finished_games_by_date(table, team)
        .into_iter()
        .filter_map(|g| {
            let (team_score, opponent_score) = g.scores_for(team)?;
            let is_home = g.side_of(team)? == Side::Home;
            let opponent = if is_home { &g.away_team } else { &g.home_team };
            let result = match team_score.cmp(&opponent_score) {
                std::cmp::Ordering::Greater => GameResult::W,
                std::cmp::Ordering::Less => GameResult::L,
                std::cmp::Ordering::Equal => GameResult::D,
            };
            Some(TeamGameLogEntry {
                game_id: g.game_id.clone(),
                date_time: g.date_time.clone(),
                opponent: opponent.clone(),
                is_home,
                team_score,
                opponent_score,
                result,
                margin: team_score as i64 - opponent_score as i64,
                division: g.division.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> GameTable {
        let rows = [
            json!({"GameId": 1, "HomeTeamName": "A", "AwayTeamName": "B",
                   "FinalHomeScore": 50, "FinalAwayScore": 40, "DateTime": "2024-01-03T10:00"}),
            json!({"GameId": 2, "HomeTeamName": "B", "AwayTeamName": "A",
                   "FinalHomeScore": 45, "FinalAwayScore": 60, "DateTime": "2024-01-01T10:00"}),
            json!({"GameId": 3, "HomeTeamName": "A", "AwayTeamName": "C",
                   "FinalHomeScore": 30, "FinalAwayScore": 31, "DateTime": "2024-01-02T10:00"}),
            json!({"GameId": 4, "HomeTeamName": "C", "AwayTeamName": "A",
                   "DateTime": "2024-01-04T10:00"}),
        ];
        GameTable::from_values(rows.iter())
    }

    #[test]
    fn streak_follows_dates_not_table_order() {
        // A: W (01) L (02) W (03) => longest 1
        assert_eq!(longest_win_streak(&table(), "A"), 1);
    }

    #[test]
    fn home_and_away_rates() {
        let rows = team_performance(&table());
        let a = rows.iter().find(|r| r.team == "A").unwrap();
        assert_eq!(a.total_games, 3);
        assert_eq!(a.home_games, 2);
        assert_eq!(a.home_win_percentage, 50.0);
        assert_eq!(a.away_win_percentage, 100.0);
        assert_eq!(a.lowest_score, 30);
        assert_eq!(rows[0].team, "C");
    }

    #[test]
    fn log_skips_unfinished() {
        let log = team_game_log(&table(), "A");
        assert_eq!(log.iter().map(|e| e.game_id.as_str()).collect::<Vec<_>>(), ["2", "3", "1"]);
        assert_eq!(log[1].result, GameResult::L);
        assert_eq!(log[0].margin, 15);
    }
}
