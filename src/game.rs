use std::collections::BTreeSet;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::records::{
    self, EventRecord, RefereeRecord, TeamRosterEntry, as_u32_any, decode_location_name,
};

pub const COL_GAME_ID: &str = "GameId";
pub const COL_HOME_TEAM: &str = "HomeTeamName";
pub const COL_AWAY_TEAM: &str = "AwayTeamName";
pub const COL_HOME_SCORE: &str = "FinalHomeScore";
pub const COL_AWAY_SCORE: &str = "FinalAwayScore";
pub const COL_DIVISION: &str = "GameDivisionDisplay";
pub const COL_DATE_TIME: &str = "DateTime";
pub const COL_LOCATION: &str = "GameLocation";
pub const COL_REFEREES: &str = "Referres";
pub const COL_TEAMS: &str = "Teams";
pub const COL_EVENTS: &str = "GameEvents";

type Decoded<T> = Result<Vec<T>, DecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

/// One contest. Immutable once built; nested fields are decoded lazily and
/// at most once per game, so several reports over the same table share the work.
#[derive(Debug, Clone)]
pub struct Game {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub division: Option<String>,
    pub date_time: Option<String>,
    pub location: Value,
    pub referees_raw: Value,
    pub teams_raw: Value,
    pub events_raw: Value,
    rosters: OnceCell<Decoded<TeamRosterEntry>>,
    events: OnceCell<Decoded<EventRecord>>,
    referees: OnceCell<Decoded<RefereeRecord>>,
}

impl Game {
    /// Build a game from one row object. Rows without an id or either team
    /// name are rejected.
    pub fn from_value(v: &Value) -> Option<Game> {
        let obj = v.as_object()?;
        let game_id = match obj.get(COL_GAME_ID)? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            _ => return None,
        };
        let home_team = non_empty_str(obj.get(COL_HOME_TEAM))?;
        let away_team = non_empty_str(obj.get(COL_AWAY_TEAM))?;

        Some(Game {
            game_id,
            home_team,
            away_team,
            home_score: obj.get(COL_HOME_SCORE).and_then(as_u32_any),
            away_score: obj.get(COL_AWAY_SCORE).and_then(as_u32_any),
            division: non_empty_str(obj.get(COL_DIVISION)),
            date_time: non_empty_str(obj.get(COL_DATE_TIME)),
            location: obj.get(COL_LOCATION).cloned().unwrap_or(Value::Null),
            referees_raw: obj.get(COL_REFEREES).cloned().unwrap_or(Value::Null),
            teams_raw: obj.get(COL_TEAMS).cloned().unwrap_or(Value::Null),
            events_raw: obj.get(COL_EVENTS).cloned().unwrap_or(Value::Null),
            rosters: OnceCell::new(),
            events: OnceCell::new(),
            referees: OnceCell::new(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn final_scores(&self) -> Option<(u32, u32)> {
        Some((self.home_score?, self.away_score?))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let (home, away) = self.final_scores()?;
        Some(if home > away {
            Outcome::HomeWin
        } else if away > home {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        })
    }

    /// Team with the strictly higher final score.
    pub fn winner(&self) -> Option<&str> {
        match self.outcome()? {
            Outcome::HomeWin => Some(&self.home_team),
            Outcome::AwayWin => Some(&self.away_team),
            Outcome::Draw => None,
        }
    }

    pub fn win_margin(&self) -> Option<u32> {
        let (home, away) = self.final_scores()?;
        Some(home.abs_diff(away))
    }

    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// (team score, opponent score) from `team`'s point of view.
    pub fn scores_for(&self, team: &str) -> Option<(u32, u32)> {
        let (home, away) = self.final_scores()?;
        match self.side_of(team)? {
            Side::Home => Some((home, away)),
            Side::Away => Some((away, home)),
        }
    }

    pub fn location_name(&self) -> Option<String> {
        decode_location_name(Some(&self.location))
    }

    /// Decoded rosters, empty when the field is missing or malformed.
    pub fn rosters(&self) -> &[TeamRosterEntry] {
        self.roster_status().unwrap_or(&[])
    }

    pub fn roster_status(&self) -> Result<&[TeamRosterEntry], &DecodeError> {
        self.rosters
            .get_or_init(|| self.decode_logged(COL_TEAMS, records::decode_rosters(Some(&self.teams_raw))))
            .as_deref()
    }

    pub fn events(&self) -> &[EventRecord] {
        self.event_status().unwrap_or(&[])
    }

    pub fn event_status(&self) -> Result<&[EventRecord], &DecodeError> {
        self.events
            .get_or_init(|| self.decode_logged(COL_EVENTS, records::decode_events(Some(&self.events_raw))))
            .as_deref()
    }

    pub fn referees(&self) -> &[RefereeRecord] {
        self.referee_status().unwrap_or(&[])
    }

    pub fn referee_status(&self) -> Result<&[RefereeRecord], &DecodeError> {
        self.referees
            .get_or_init(|| {
                self.decode_logged(COL_REFEREES, records::decode_referees(Some(&self.referees_raw)))
            })
            .as_deref()
    }

    pub fn referee_names(&self) -> Vec<String> {
        self.referees().iter().map(|r| r.name.clone()).collect()
    }

    fn decode_logged<T>(&self, field: &'static str, decoded: Decoded<T>) -> Decoded<T> {
        match &decoded {
            Err(DecodeError::Missing) => {
                debug!(game_id = %self.game_id, field, "nested field missing");
            }
            Err(err) => {
                warn!(game_id = %self.game_id, field, error = %err, "skipping malformed nested field");
            }
            Ok(_) => {}
        }
        decoded
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    let s = v?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(s.to_string())
    }
}

/// Immutable snapshot of the game table. Refreshing data means building a
/// new table, never mutating one that callers may be reading.
#[derive(Debug, Clone, Default)]
pub struct GameTable {
    games: Vec<Game>,
}

impl GameTable {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Rows that cannot form a game are logged and dropped.
    pub fn from_values<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut games = Vec::new();
        for (idx, row) in rows.into_iter().enumerate() {
            match Game::from_value(row) {
                Some(game) => games.push(game),
                None => warn!(row = idx, "dropping row without game id or team names"),
            }
        }
        Self { games }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Game> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, game_id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.game_id == game_id)
    }

    /// Games of one division, in table order.
    pub fn division(&self, name: &str) -> GameTable {
        GameTable {
            games: self
                .games
                .iter()
                .filter(|g| g.division.as_deref() == Some(name))
                .cloned()
                .collect(),
        }
    }

    pub fn divisions(&self) -> Vec<String> {
        self.games
            .iter()
            .filter_map(|g| g.division.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Union of home and away team names, sorted.
    pub fn teams(&self) -> Vec<String> {
        self.games
            .iter()
            .flat_map(|g| [g.home_team.clone(), g.away_team.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> IntoIterator for &'a GameTable {
    type Item = &'a Game;
    type IntoIter = std::slice::Iter<'a, Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_and_missing_scores() {
        let g = Game::from_value(&json!({
            "GameId": 1042.0,
            "HomeTeamName": "Hawks",
            "AwayTeamName": "Owls",
            "FinalHomeScore": "61",
            "FinalAwayScore": null,
        }))
        .unwrap();
        assert_eq!(g.game_id, "1042");
        assert_eq!(g.home_score, Some(61));
        assert!(!g.is_finished());
        assert_eq!(g.winner(), None);
        assert!(g.rosters().is_empty());
        assert_eq!(g.roster_status(), Err(&DecodeError::Missing));
    }

    #[test]
    fn rows_without_teams_are_dropped() {
        let rows = [
            json!({"GameId": 1, "HomeTeamName": "A", "AwayTeamName": "B"}),
            json!({"GameId": 2, "HomeTeamName": "A"}),
            json!("not a row"),
        ];
        let table = GameTable::from_values(rows.iter());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn decode_is_memoised_per_game() {
        let g = Game::from_value(&json!({
            "GameId": 1, "HomeTeamName": "A", "AwayTeamName": "B",
            "GameEvents": "[{'EventActor': 'x', 'EventAction': '2P Points Added', 'EventAdvantage': 2}]",
        }))
        .unwrap();
        let first = g.events().as_ptr();
        let second = g.events().as_ptr();
        assert_eq!(first, second);
        assert_eq!(g.events()[0].advantage, Some(2));
    }
}
