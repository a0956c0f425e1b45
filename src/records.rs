use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::literal::parse_literal;

pub const UNKNOWN: &str = "Unknown";

/// Default applied when an optional source key is absent or unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    Text(&'static str),
    Count(u32),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub rule: FieldRule,
}

const fn field(key: &'static str, rule: FieldRule) -> FieldSpec {
    FieldSpec { key, rule }
}

// A record without one of these keys is skipped.
pub const ROSTER_PLAYERS: &str = "Players";
pub const EVENT_ADVANTAGE: &str = "EventAdvantage";
pub const REFEREE_NAME: &str = "Referee Name";
pub const LOCATION_NAME: &str = "Name";

pub const ROSTER_TEAM_NAME: FieldSpec = field("Team Name", FieldRule::Text(UNKNOWN));
pub const ROSTER_TEAM_SHORT: FieldSpec = field("Team Name Short", FieldRule::Text(UNKNOWN));

pub const PLAYER_NAME: FieldSpec = field("Player Name", FieldRule::Text(UNKNOWN));
pub const PLAYER_NUMBER: FieldSpec = field("Player Number", FieldRule::Count(0));
pub const TOTAL_POINTS: FieldSpec = field("Total Points", FieldRule::Count(0));
pub const MADE_1P: FieldSpec = field("1P Made Shots", FieldRule::Count(0));
pub const MADE_2P: FieldSpec = field("2P Made Shots", FieldRule::Count(0));
pub const MADE_3P: FieldSpec = field("3P Made Shots", FieldRule::Count(0));
pub const TOTAL_FOULS: FieldSpec = field("Total Fouls", FieldRule::Count(0));
pub const P_FOULS: FieldSpec = field("P Fouls", FieldRule::Count(0));
pub const P1_FOULS: FieldSpec = field("P1 Fouls", FieldRule::Count(0));
pub const P2_FOULS: FieldSpec = field("P2 Fouls", FieldRule::Count(0));
pub const P3_FOULS: FieldSpec = field("P3 Fouls", FieldRule::Count(0));
pub const STARTING_FIVE: FieldSpec = field("Starting Five", FieldRule::Flag(false));

pub const EVENT_ACTOR: FieldSpec = field("EventActor", FieldRule::Text(""));
pub const EVENT_ACTION: FieldSpec = field("EventAction", FieldRule::Text(""));
pub const EVENT_TEAM: FieldSpec = field("EventTeam", FieldRule::Text(""));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRosterEntry {
    pub team_name: String,
    pub team_name_short: Option<String>,
    pub players: Vec<PlayerGameRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameRecord {
    pub player_name: String,
    pub player_number: u32,
    pub total_points: u32,
    pub made_1p: u32,
    pub made_2p: u32,
    pub made_3p: u32,
    pub total_fouls: u32,
    pub p_fouls: u32,
    pub p1_fouls: u32,
    pub p2_fouls: u32,
    pub p3_fouls: u32,
    pub starting_five: bool,
}

impl PlayerGameRecord {
    pub fn made_shots(&self) -> u32 {
        made_shots(self.made_1p, self.made_2p, self.made_3p)
    }

    /// Points implied by the made-shot split.
    pub fn points_from_shots(&self) -> u32 {
        points_from_shots(self.made_1p, self.made_2p, self.made_3p)
    }
}

// Counts are accepted up to u32::MAX, so shot arithmetic saturates.
pub fn made_shots(made_1p: u32, made_2p: u32, made_3p: u32) -> u32 {
    made_1p.saturating_add(made_2p).saturating_add(made_3p)
}

pub fn points_from_shots(made_1p: u32, made_2p: u32, made_3p: u32) -> u32 {
    made_1p
        .saturating_add(made_2p.saturating_mul(2))
        .saturating_add(made_3p.saturating_mul(3))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub actor: String,
    pub action: String,
    pub team: String,
    /// Signed score advantage after the event: positive home, negative away.
    pub advantage: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefereeRecord {
    pub name: String,
}

/// Raw field value to a structure: strings are decoded as literals, native
/// structures pass through untouched.
pub fn decode_nested(raw: Option<&Value>) -> Result<Cow<'_, Value>, DecodeError> {
    match raw {
        None | Some(Value::Null) => Err(DecodeError::Missing),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return Err(DecodeError::Missing);
            }
            parse_literal(trimmed).map(Cow::Owned)
        }
        Some(other) => Ok(Cow::Borrowed(other)),
    }
}

fn decode_list<T>(
    raw: Option<&Value>,
    mut item: impl FnMut(&Map<String, Value>) -> Option<T>,
) -> Result<Vec<T>, DecodeError> {
    let decoded = decode_nested(raw)?;
    let items = match decoded.as_ref() {
        Value::Array(items) => items,
        Value::Null => return Err(DecodeError::Missing),
        _ => return Err(DecodeError::Shape { expected: "list" }),
    };
    Ok(items
        .iter()
        .filter_map(|v| v.as_object())
        .filter_map(|obj| item(obj))
        .collect())
}

pub fn decode_rosters(raw: Option<&Value>) -> Result<Vec<TeamRosterEntry>, DecodeError> {
    decode_list(raw, roster_entry)
}

pub fn decode_events(raw: Option<&Value>) -> Result<Vec<EventRecord>, DecodeError> {
    decode_list(raw, |obj| {
        Some(EventRecord {
            actor: text_field(obj, &EVENT_ACTOR),
            action: text_field(obj, &EVENT_ACTION),
            team: text_field(obj, &EVENT_TEAM),
            advantage: obj.get(EVENT_ADVANTAGE).and_then(as_i64_any),
        })
    })
}

pub fn decode_referees(raw: Option<&Value>) -> Result<Vec<RefereeRecord>, DecodeError> {
    decode_list(raw, |obj| {
        let name = obj.get(REFEREE_NAME)?.as_str()?.trim();
        Some(RefereeRecord {
            name: name.to_string(),
        })
    })
}

/// Venue name from a location object, its literal text, or a bare name.
/// The text form is sometimes encoded twice, so one level of string nesting
/// is unwrapped.
pub fn decode_location_name(raw: Option<&Value>) -> Option<String> {
    location_name(raw?, 0)
}

fn location_name(value: &Value, depth: u8) -> Option<String> {
    match value {
        Value::Object(obj) => obj
            .get(LOCATION_NAME)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return None;
            }
            let looks_encoded = (trimmed.starts_with('{') && trimmed.ends_with('}'))
                || (trimmed.starts_with('\'') || trimmed.starts_with('"'));
            if !looks_encoded {
                return Some(trimmed.to_string());
            }
            if depth >= 2 {
                return None;
            }
            let inner = parse_literal(trimmed).ok()?;
            location_name(&inner, depth + 1)
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn roster_entry(obj: &Map<String, Value>) -> Option<TeamRosterEntry> {
    let players = obj.get(ROSTER_PLAYERS)?;
    let team_name_short = obj
        .get(ROSTER_TEAM_SHORT.key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string());
    let team_name = obj
        .get(ROSTER_TEAM_NAME.key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .or_else(|| team_name_short.clone())
        .unwrap_or_else(|| UNKNOWN.to_string());

    // Player lists may themselves be stored as literal text.
    let players = match decode_nested(Some(players)) {
        Ok(decoded) => decoded
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_object())
                    .map(player_record)
                    .collect()
            })
            .unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    Some(TeamRosterEntry {
        team_name,
        team_name_short,
        players,
    })
}

fn player_record(obj: &Map<String, Value>) -> PlayerGameRecord {
    PlayerGameRecord {
        player_name: text_field(obj, &PLAYER_NAME),
        player_number: count_field(obj, &PLAYER_NUMBER),
        total_points: count_field(obj, &TOTAL_POINTS),
        made_1p: count_field(obj, &MADE_1P),
        made_2p: count_field(obj, &MADE_2P),
        made_3p: count_field(obj, &MADE_3P),
        total_fouls: count_field(obj, &TOTAL_FOULS),
        p_fouls: count_field(obj, &P_FOULS),
        p1_fouls: count_field(obj, &P1_FOULS),
        p2_fouls: count_field(obj, &P2_FOULS),
        p3_fouls: count_field(obj, &P3_FOULS),
        starting_five: flag_field(obj, &STARTING_FIVE),
    }
}

fn text_field(obj: &Map<String, Value>, spec: &FieldSpec) -> String {
    let default = match spec.rule {
        FieldRule::Text(d) => d,
        _ => "",
    };
    match obj.get(spec.key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn count_field(obj: &Map<String, Value>, spec: &FieldSpec) -> u32 {
    let default = match spec.rule {
        FieldRule::Count(d) => d,
        _ => 0,
    };
    obj.get(spec.key).and_then(as_u32_any).unwrap_or(default)
}

fn flag_field(obj: &Map<String, Value>, spec: &FieldSpec) -> bool {
    let default = match spec.rule {
        FieldRule::Flag(d) => d,
        _ => false,
    };
    match obj.get(spec.key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => default,
    }
}

pub(crate) fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        return f.is_finite().then_some(f.trunc() as i64);
    }
    let s = v.as_str()?.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

pub(crate) fn as_u32_any(v: &Value) -> Option<u32> {
    let n = as_i64_any(v)?;
    u32::try_from(n.max(0)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starting_five_accepts_text_and_bool() {
        let raw = json!([{ "Team Name": "A", "Players": [
            {"Player Name": "x", "Starting Five": "TRUE"},
            {"Player Name": "y", "Starting Five": false},
            {"Player Name": "z", "Starting Five": "false"},
            {"Player Name": "w"}
        ]}]);
        let rosters = decode_rosters(Some(&raw)).unwrap();
        let flags: Vec<bool> = rosters[0].players.iter().map(|p| p.starting_five).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn team_name_falls_back_to_short_name() {
        let raw = json!([{ "Team Name Short": "HWK", "Players": [] }, { "Team Name": "No players" }]);
        let rosters = decode_rosters(Some(&raw)).unwrap();
        assert_eq!(rosters.len(), 1);
        assert_eq!(rosters[0].team_name, "HWK");
    }

    #[test]
    fn counts_accept_floats_and_strings() {
        let raw = json!([{ "Team Name": "A", "Players": [
            {"Total Points": 12.0, "2P Made Shots": "3", "3P Made Shots": -1}
        ]}]);
        let p = &decode_rosters(Some(&raw)).unwrap()[0].players[0];
        assert_eq!(p.player_name, UNKNOWN);
        assert_eq!(p.total_points, 12);
        assert_eq!(p.made_2p, 3);
        assert_eq!(p.made_3p, 0);
    }

    #[test]
    fn location_forms() {
        assert_eq!(
            decode_location_name(Some(&json!({"Name": "Main Gym"}))),
            Some("Main Gym".to_string())
        );
        assert_eq!(
            decode_location_name(Some(&json!("{'Name': 'Annex', 'Id': 3}"))),
            Some("Annex".to_string())
        );
        assert_eq!(
            decode_location_name(Some(&json!("\"{'Name': 'Double'}\""))),
            Some("Double".to_string())
        );
        assert_eq!(
            decode_location_name(Some(&json!("Sports Hall"))),
            Some("Sports Hall".to_string())
        );
        assert_eq!(decode_location_name(Some(&json!("{broken"))), Some("{broken".to_string()));
        assert_eq!(decode_location_name(Some(&json!("{'Name': }"))), None);
        assert_eq!(decode_location_name(None), None);
    }

    #[test]
    fn records_missing_a_key_field_are_skipped() {
        let refs = decode_referees(Some(&json!("[{'Referee Name': ' R. Adams '}, {'Id': 4}]"))).unwrap();
        assert_eq!(refs, vec![RefereeRecord { name: "R. Adams".to_string() }]);

        let events = decode_events(Some(&json!([{"EventAction": "Timeout"}]))).unwrap();
        assert_eq!(events[0].advantage, None);
        assert_eq!(events[0].actor, "");
    }

    #[test]
    fn shot_arithmetic_saturates() {
        assert_eq!(points_from_shots(1, 2, 3), 14);
        assert_eq!(points_from_shots(0, 3_000_000_000, 0), u32::MAX);
        assert_eq!(made_shots(u32::MAX, 1, 0), u32::MAX);
    }

    #[test]
    fn wrong_shape_is_reported() {
        assert_eq!(
            decode_events(Some(&json!("{'a': 1}"))),
            Err(DecodeError::Shape { expected: "list" })
        );
        assert_eq!(decode_referees(Some(&Value::Null)), Err(DecodeError::Missing));
    }
}
