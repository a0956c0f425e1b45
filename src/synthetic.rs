//! Seeded synthetic seasons for demos, benchmarks and tests. Nested fields
//! are written the way the league export writes them: Python-literal text.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

use crate::game::{
    COL_AWAY_SCORE, COL_AWAY_TEAM, COL_DATE_TIME, COL_DIVISION, COL_EVENTS, COL_GAME_ID,
    COL_HOME_SCORE, COL_HOME_TEAM, COL_LOCATION, COL_REFEREES, COL_TEAMS, GameTable,
};
use crate::game_events::{ACTION_1P, ACTION_2P, ACTION_3P, ACTION_FOUL};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Bea", "Cal", "Dana", "Eli", "Fern", "Gus", "Hana", "Ivo", "Jo", "Kit", "Lena", "Max",
    "Nia", "Oli", "Pia", "Quin", "Rae", "Sol", "Tess",
];
const LAST_NAMES: &[&str] = &[
    "Archer", "Boyd", "Costa", "Dunn", "Ellis", "Frost", "Grant", "Hale", "Irwin", "Jones", "Khan",
    "Lowe", "Moss", "Nash", "Ortiz", "Price", "Reid", "Shaw", "Tate", "Vance",
];
const TEAM_NAMES: &[&str] = &[
    "Harbour Hawks", "Riverside Owls", "North Foxes", "Valley Bears", "Coast Herons",
    "Hill Wolves", "Park Lynx", "Bay Otters", "Forest Kites", "Lake Ravens",
];
const VENUES: &[&str] = &["Central Arena", "Eastside Hall", "Dockland Gym", "College Court"];

#[derive(Debug, Clone)]
pub struct SeasonSpec {
    pub seed: u64,
    pub divisions: Vec<String>,
    pub teams_per_division: usize,
    /// Each round is a full double round robin.
    pub rounds: usize,
    pub players_per_team: usize,
    pub possessions: std::ops::Range<u32>,
    pub unfinished_rate: f64,
    pub referee_pool: usize,
    pub start_date: NaiveDate,
}

impl Default for SeasonSpec {
    fn default() -> Self {
        Self {
            seed: 7,
            divisions: vec!["U16 Boys".to_string(), "U18 Girls".to_string()],
            teams_per_division: 6,
            rounds: 1,
            players_per_team: 10,
            possessions: 70..110,
            unfinished_rate: 0.05,
            referee_pool: 8,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap_or(NaiveDate::MIN),
        }
    }
}

struct Team {
    name: String,
    short: String,
    players: Vec<(String, u32)>,
}

#[derive(Default, Clone)]
struct Line {
    points: u32,
    made: [u32; 3],
    fouls: [u32; 3],
}

pub fn generate_table(spec: &SeasonSpec) -> GameTable {
    GameTable::from_values(generate_season(spec).iter())
}

/// Raw game rows in the export's column layout.
pub fn generate_season(spec: &SeasonSpec) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let referees: Vec<String> = (0..spec.referee_pool.max(1))
        .map(|i| format!("{} {}", FIRST_NAMES[(i * 3 + 1) % FIRST_NAMES.len()], LAST_NAMES[(i * 5 + 2) % LAST_NAMES.len()]))
        .collect();

    let mut rows = Vec::new();
    let mut next_id = 10_000u64;
    for (d, division) in spec.divisions.iter().enumerate() {
        let teams: Vec<Team> = (0..spec.teams_per_division)
            .map(|t| make_team(&mut rng, division, d * spec.teams_per_division + t, spec.players_per_team))
            .collect();

        let mut fixtures = Vec::new();
        for _ in 0..spec.rounds {
            for h in 0..teams.len() {
                for a in 0..teams.len() {
                    if h != a {
                        fixtures.push((h, a));
                    }
                }
            }
        }
        fixtures.shuffle(&mut rng);

        for (slot, (h, a)) in fixtures.into_iter().enumerate() {
            let kickoff = spec.start_date + Duration::days((slot / 3) as i64 * 2);
            let hour = 9 + (slot % 3) * 2;
            let date_time = format!("{}T{hour:02}:30:00", kickoff.format("%Y-%m-%d"));
            let finished = !rng.gen_bool(spec.unfinished_rate.clamp(0.0, 1.0));
            rows.push(play_game(
                &mut rng,
                spec,
                next_id,
                division,
                &date_time,
                &teams[h],
                &teams[a],
                &referees,
                finished,
            ));
            next_id += 1;
        }
    }
    rows
}

fn make_team(rng: &mut StdRng, division: &str, idx: usize, size: usize) -> Team {
    let base = TEAM_NAMES[idx % TEAM_NAMES.len()];
    let name = if idx < TEAM_NAMES.len() {
        format!("{base} {}", division.split_whitespace().next().unwrap_or(""))
    } else {
        format!("{base} {} {}", division.split_whitespace().next().unwrap_or(""), idx)
    };
    let short: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_uppercase();

    let mut players: Vec<(String, u32)> = Vec::new();
    while players.len() < size.max(5) {
        let candidate = format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        );
        if players.iter().all(|(n, _)| *n != candidate) {
            let number = players.len() as u32 * 2 + 4;
            players.push((candidate, number));
        }
    }
    Team { name, short, players }
}

/// Five starters: usually the first five, sometimes with one swap.
fn pick_starters(rng: &mut StdRng, team: &Team) -> Vec<usize> {
    let mut starters: Vec<usize> = (0..5).collect();
    if team.players.len() > 5 && rng.gen_bool(0.2) {
        let out = rng.gen_range(0..5);
        starters[out] = rng.gen_range(5..team.players.len());
    }
    starters
}

#[allow(clippy::too_many_arguments)]
fn play_game(
    rng: &mut StdRng,
    spec: &SeasonSpec,
    game_id: u64,
    division: &str,
    date_time: &str,
    home: &Team,
    away: &Team,
    referees: &[String],
    finished: bool,
) -> Value {
    let mut row = Map::new();
    row.insert(COL_GAME_ID.into(), json!(game_id));
    row.insert(COL_HOME_TEAM.into(), json!(home.name));
    row.insert(COL_AWAY_TEAM.into(), json!(away.name));
    row.insert(COL_DIVISION.into(), json!(division));
    row.insert(COL_DATE_TIME.into(), json!(date_time));
    let venue = VENUES[rng.gen_range(0..VENUES.len())];
    row.insert(
        COL_LOCATION.into(),
        Value::String(to_python_literal(&json!({ "Name": venue }))),
    );

    let crew = rng.gen_range(1..=referees.len().min(3));
    let officials: Vec<Value> = referees
        .choose_multiple(rng, crew)
        .map(|name| json!({ "Referee Name": name }))
        .collect();
    row.insert(
        COL_REFEREES.into(),
        Value::String(to_python_literal(&Value::Array(officials))),
    );

    if !finished {
        row.insert(COL_HOME_SCORE.into(), Value::Null);
        row.insert(COL_AWAY_SCORE.into(), Value::Null);
        row.insert(COL_TEAMS.into(), Value::String(String::new()));
        row.insert(COL_EVENTS.into(), Value::String(String::new()));
        return Value::Object(row);
    }

    let sides = [home, away];
    let starters = [pick_starters(rng, home), pick_starters(rng, away)];
    let mut lines: [Vec<Line>; 2] = [
        vec![Line::default(); home.players.len()],
        vec![Line::default(); away.players.len()],
    ];
    let mut score = [0u32; 2];
    let mut events = Vec::new();

    let possessions = rng.gen_range(spec.possessions.clone());
    for p in 0..possessions {
        let side = usize::from(!rng.gen_bool(0.52));
        let team = sides[side];
        let player = if rng.gen_bool(0.7) {
            starters[side][rng.gen_range(0..starters[side].len())]
        } else {
            rng.gen_range(0..team.players.len())
        };
        let period = ((p * 3) / possessions.max(1)) as usize;
        let roll: f64 = rng.r#gen();
        let (action, points) = if roll < 0.14 {
            (ACTION_1P, 1)
        } else if roll < 0.56 {
            (ACTION_2P, 2)
        } else if roll < 0.72 {
            (ACTION_3P, 3)
        } else if roll < 0.86 {
            (ACTION_FOUL, 0)
        } else {
            continue;
        };

        let line = &mut lines[side][player];
        let mut event = Map::new();
        event.insert("EventActor".into(), json!(team.players[player].0));
        event.insert("EventAction".into(), json!(action));
        event.insert("EventTeam".into(), json!(team.name));
        if points == 0 {
            line.fouls[period.min(2)] += 1;
        } else {
            line.points += points;
            line.made[points as usize - 1] += 1;
            score[side] += points;
            event.insert(
                "EventAdvantage".into(),
                json!(score[0] as i64 - score[1] as i64),
            );
        }
        events.push(Value::Object(event));
    }

    // No draws: a late basket decides level games.
    if score[0] == score[1] {
        let side = usize::from(rng.gen_bool(0.5));
        let player = starters[side][0];
        lines[side][player].points += 2;
        lines[side][player].made[1] += 1;
        score[side] += 2;
        events.push(json!({
            "EventActor": sides[side].players[player].0,
            "EventAction": ACTION_2P,
            "EventTeam": sides[side].name,
            "EventAdvantage": score[0] as i64 - score[1] as i64,
        }));
    }

    let rosters: Vec<Value> = (0..2)
        .map(|side| {
            let team = sides[side];
            let players: Vec<Value> = team
                .players
                .iter()
                .zip(&lines[side])
                .enumerate()
                .map(|(idx, ((name, number), line))| {
                    let fouls: u32 = line.fouls.iter().sum();
                    json!({
                        "Player Name": name,
                        "Player Number": number,
                        "Total Points": line.points,
                        "1P Made Shots": line.made[0],
                        "2P Made Shots": line.made[1],
                        "3P Made Shots": line.made[2],
                        "Total Fouls": fouls,
                        "P Fouls": fouls,
                        "P1 Fouls": line.fouls[0],
                        "P2 Fouls": line.fouls[1],
                        "P3 Fouls": line.fouls[2],
                        "Starting Five": starters[side].contains(&idx),
                    })
                })
                .collect();
            json!({
                "Team Name": team.name,
                "Team Name Short": team.short,
                "Players": players,
            })
        })
        .collect();

    row.insert(COL_HOME_SCORE.into(), json!(score[0]));
    row.insert(COL_AWAY_SCORE.into(), json!(score[1]));
    row.insert(
        COL_TEAMS.into(),
        Value::String(to_python_literal(&Value::Array(rosters))),
    );
    row.insert(
        COL_EVENTS.into(),
        Value::String(to_python_literal(&Value::Array(events))),
    );
    Value::Object(row)
}

/// Python `repr`-style text: single-quoted strings, `True`/`False`/`None`.
pub fn to_python_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '\n' => out.push_str("\\n"),
                    c => out.push(c),
                }
            }
            out.push('\'');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(&Value::String(k.clone()), out);
                out.push_str(": ");
                write_literal(v, out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_literal;

    #[test]
    fn literal_text_decodes_back() {
        let v = json!({"Name": "O'Neil Hall", "ok": true, "n": null, "xs": [1, 2.5]});
        let text = to_python_literal(&v);
        assert!(text.contains("True"));
        assert_eq!(parse_literal(&text).unwrap(), v);
    }

    #[test]
    fn same_seed_same_season() {
        let spec = SeasonSpec::default();
        assert_eq!(generate_season(&spec), generate_season(&spec));
        let table = generate_table(&spec);
        assert_eq!(table.len(), 2 * 6 * 5);
        assert_eq!(table.divisions(), ["U16 Boys", "U18 Girls"]);
    }

    #[test]
    fn scores_match_box_scores() {
        let table = generate_table(&SeasonSpec::default());
        for game in table.iter().filter(|g| g.is_finished()) {
            let rosters = game.rosters();
            assert_eq!(rosters.len(), 2);
            let home: u32 = rosters[0].players.iter().map(|p| p.total_points).sum();
            assert_eq!(Some(home), game.home_score);
            assert!(game.winner().is_some());
            assert_eq!(rosters[0].players.iter().filter(|p| p.starting_five).count(), 5);
        }
    }
}
