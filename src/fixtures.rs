use std::collections::BTreeMap;

use serde::Serialize;

use crate::game::{Game, GameTable};
use crate::game_events::game_top_scorer;

pub const NOT_AVAILABLE: &str = "N/A";
pub const TO_BE_DECIDED: &str = "TBD";

/// Compact per-game summary shared by the fixtures list and the matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSummary {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub date_time: Option<String>,
    /// `YYYY-MM-DDTHH:MM` prefix of the kick-off time, or `TBD`.
    pub date: String,
    pub division: Option<String>,
    pub location: String,
    pub is_finished: bool,
    pub referees: Vec<String>,
    pub top_scorer_name: String,
    pub top_scorer_points: u32,
    pub top_scorer_team: String,
}

pub fn fixture_summary(game: &Game) -> FixtureSummary {
    let top = game_top_scorer(game);
    FixtureSummary {
        game_id: game.game_id.clone(),
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        home_score: game.home_score,
        away_score: game.away_score,
        date_time: game.date_time.clone(),
        date: game
            .date_time
            .as_deref()
            .map(|d| d.chars().take(16).collect())
            .unwrap_or_else(|| TO_BE_DECIDED.to_string()),
        division: game.division.clone(),
        location: game
            .location_name()
            .unwrap_or_else(|| TO_BE_DECIDED.to_string()),
        is_finished: game.is_finished(),
        referees: game.referee_names(),
        top_scorer_points: top.as_ref().map_or(0, |t| t.points),
        top_scorer_team: top
            .as_ref()
            .map_or_else(|| NOT_AVAILABLE.to_string(), |t| t.team.clone()),
        top_scorer_name: top.map_or_else(|| NOT_AVAILABLE.to_string(), |t| t.name),
    }
}

/// Every game, most recent first; undated games last, ties in table order.
pub fn all_fixtures(table: &GameTable) -> Vec<FixtureSummary> {
    let mut out: Vec<FixtureSummary> = table.iter().map(fixture_summary).collect();
    out.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    out
}

/// Home team × away team grid of fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixturesMatrix {
    pub teams: Vec<String>,
    pub matrix: BTreeMap<String, BTreeMap<String, Vec<FixtureSummary>>>,
    /// Divisions of the unfiltered table, for the filter selector.
    pub divisions: Vec<String>,
    pub current_division: Option<String>,
}

impl FixturesMatrix {
    pub fn cell(&self, home: &str, away: &str) -> &[FixtureSummary] {
        self.matrix
            .get(home)
            .and_then(|row| row.get(away))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn fixtures_matrix(table: &GameTable, division_filter: Option<&str>) -> FixturesMatrix {
    if table.is_empty() {
        return FixturesMatrix::default();
    }
    let filtered = match division_filter {
        Some(division) => table.division(division),
        None => table.clone(),
    };
    let teams = filtered.teams();
    let divisions = table.divisions();

    let mut matrix: BTreeMap<String, BTreeMap<String, Vec<FixtureSummary>>> = teams
        .iter()
        .map(|home| {
            let row = teams.iter().map(|away| (away.clone(), Vec::new())).collect();
            (home.clone(), row)
        })
        .collect();
    for game in &filtered {
        if let Some(cell) = matrix
            .get_mut(&game.home_team)
            .and_then(|row| row.get_mut(&game.away_team))
        {
            cell.push(fixture_summary(game));
        }
    }

    FixturesMatrix {
        current_division: division_filter
            .map(str::to_string)
            .or_else(|| divisions.first().cloned()),
        teams,
        matrix,
        divisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_for_missing_details() {
        let g = Game::from_value(&json!({
            "GameId": 9, "HomeTeamName": "A", "AwayTeamName": "B",
        }))
        .unwrap();
        let s = fixture_summary(&g);
        assert_eq!(s.date, TO_BE_DECIDED);
        assert_eq!(s.location, TO_BE_DECIDED);
        assert_eq!(s.top_scorer_name, NOT_AVAILABLE);
        assert_eq!(s.top_scorer_points, 0);
        assert!(!s.is_finished);
    }

    #[test]
    fn matrix_filters_by_division() {
        let rows = [
            json!({"GameId": 1, "HomeTeamName": "B", "AwayTeamName": "A", "GameDivisionDisplay": "U14",
                   "DateTime": "2024-03-01T18:30:00.000Z"}),
            json!({"GameId": 2, "HomeTeamName": "C", "AwayTeamName": "D", "GameDivisionDisplay": "U16"}),
        ];
        let table = GameTable::from_values(rows.iter());
        let m = fixtures_matrix(&table, Some("U14"));
        assert_eq!(m.teams, ["A", "B"]);
        assert_eq!(m.divisions, ["U14", "U16"]);
        assert_eq!(m.current_division.as_deref(), Some("U14"));
        assert_eq!(m.cell("B", "A")[0].date, "2024-03-01T18:30");
        assert!(m.cell("A", "B").is_empty());

        let all = fixtures_matrix(&table, None);
        assert_eq!(all.current_division.as_deref(), Some("U14"));
        assert_eq!(all.teams.len(), 4);
    }
}
