use std::collections::HashMap;

use serde::Serialize;

use crate::game::{Game, GameTable};
use crate::records::EventRecord;

pub const ACTION_1P: &str = "1P Points Added";
pub const ACTION_2P: &str = "2P Points Added";
pub const ACTION_3P: &str = "3P Points Added";
pub const ACTION_FOUL: &str = "Foul Added";

/// Per-game narrative metrics derived from the event timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameAnalysis {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub final_home_score: Option<u32>,
    pub final_away_score: Option<u32>,
    pub division: Option<String>,
    pub tie_scores: u32,
    pub lead_changes: u32,
    pub max_home_lead: u32,
    pub max_away_lead: u32,
    pub biggest_lead: u32,
    pub win_margin: Option<u32>,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leader {
    Home,
    Away,
}

/// Replays signed advantage values. A tie never resets the last known leader,
/// so home, tie, home is not a lead change while home, tie, away is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineSummary {
    pub tie_scores: u32,
    pub lead_changes: u32,
    pub max_home_lead: u32,
    pub max_away_lead: u32,
}

impl TimelineSummary {
    pub fn replay(events: &[EventRecord]) -> Self {
        let mut out = TimelineSummary::default();
        let mut previous: Option<Leader> = None;

        for advantage in events.iter().filter_map(|e| e.advantage) {
            let current = match advantage {
                0 => {
                    out.tie_scores += 1;
                    None
                }
                a if a > 0 => {
                    out.max_home_lead = out.max_home_lead.max(magnitude(a));
                    Some(Leader::Home)
                }
                a => {
                    out.max_away_lead = out.max_away_lead.max(magnitude(a));
                    Some(Leader::Away)
                }
            };

            if let Some(current) = current {
                if previous.is_some_and(|p| p != current) {
                    out.lead_changes += 1;
                }
                previous = Some(current);
            }
        }

        out
    }

    pub fn biggest_lead(&self) -> u32 {
        self.max_home_lead.max(self.max_away_lead)
    }
}

fn magnitude(a: i64) -> u32 {
    u32::try_from(a.unsigned_abs()).unwrap_or(u32::MAX)
}

/// Malformed or missing timelines give zeroed metrics; the game is still
/// reported.
pub fn analyze_game(game: &Game) -> GameAnalysis {
    let timeline = TimelineSummary::replay(game.events());
    GameAnalysis {
        game_id: game.game_id.clone(),
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        final_home_score: game.home_score,
        final_away_score: game.away_score,
        division: game.division.clone(),
        tie_scores: timeline.tie_scores,
        lead_changes: timeline.lead_changes,
        max_home_lead: timeline.max_home_lead,
        max_away_lead: timeline.max_away_lead,
        biggest_lead: timeline.biggest_lead(),
        win_margin: game.win_margin(),
        winner: game.winner().map(str::to_string),
    }
}

pub fn analyze_games(table: &GameTable) -> Vec<GameAnalysis> {
    table.iter().map(analyze_game).collect()
}

/// Points credited by an action label, 0 for non-scoring actions.
pub fn event_points(action: &str) -> u32 {
    if action.contains(ACTION_1P) {
        1
    } else if action.contains(ACTION_2P) {
        2
    } else if action.contains(ACTION_3P) {
        3
    } else {
        0
    }
}

pub fn count_fouls(events: &[EventRecord]) -> u32 {
    events
        .iter()
        .filter(|e| e.action.contains(ACTION_FOUL))
        .count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopScorer {
    pub name: String,
    pub points: u32,
    pub team: String,
}

/// Highest scorer from the timeline. Ties go to whoever reached the tally
/// list first.
pub fn game_top_scorer(game: &Game) -> Option<TopScorer> {
    top_scorer_from_events(game.events())
}

pub fn top_scorer_from_events(events: &[EventRecord]) -> Option<TopScorer> {
    let mut tallies: Vec<TopScorer> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for event in events {
        let points = event_points(&event.action);
        if points == 0 || event.actor.is_empty() {
            continue;
        }
        match index.get(event.actor.as_str()) {
            Some(&idx) => {
                tallies[idx].points = tallies[idx].points.saturating_add(points);
                tallies[idx].team = event.team.clone();
            }
            None => {
                index.insert(&event.actor, tallies.len());
                tallies.push(TopScorer {
                    name: event.actor.clone(),
                    points,
                    team: event.team.clone(),
                });
            }
        }
    }

    let mut best: Option<TopScorer> = None;
    for t in tallies {
        if best.as_ref().is_none_or(|b| t.points > b.points) {
            best = Some(t);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(actor: &str, action: &str, team: &str, advantage: Option<i64>) -> EventRecord {
        EventRecord {
            actor: actor.to_string(),
            action: action.to_string(),
            team: team.to_string(),
            advantage,
        }
    }

    fn adv(values: &[i64]) -> Vec<EventRecord> {
        values.iter().map(|a| ev("", "", "", Some(*a))).collect()
    }

    #[test]
    fn lead_changes_ignore_ties_in_between() {
        let s = TimelineSummary::replay(&adv(&[2, 0, 3, 0, -1, -4, 1]));
        assert_eq!(s.tie_scores, 2);
        assert_eq!(s.lead_changes, 2);
        assert_eq!(s.max_home_lead, 3);
        assert_eq!(s.max_away_lead, 4);
        assert_eq!(s.biggest_lead(), 4);
    }

    #[test]
    fn first_lead_is_not_a_change() {
        let s = TimelineSummary::replay(&adv(&[0, -2, -5]));
        assert_eq!(s.lead_changes, 0);
        assert_eq!(s.tie_scores, 1);
    }

    #[test]
    fn events_without_advantage_do_not_move_leader() {
        let mut events = adv(&[2]);
        events.push(ev("x", "Foul Added", "A", None));
        events.extend(adv(&[-1]));
        let s = TimelineSummary::replay(&events);
        assert_eq!(s.lead_changes, 1);
        assert_eq!(count_fouls(&events), 1);
    }

    #[test]
    fn top_scorer_first_max_wins() {
        let events = vec![
            ev("Ann", "2P Points Added", "A", Some(2)),
            ev("Bea", "3P Points Added", "B", Some(-1)),
            ev("Ann", "1P Points Added", "A", Some(0)),
            ev("Cid", "Foul Added", "B", None),
        ];
        let top = top_scorer_from_events(&events).unwrap();
        assert_eq!(top.name, "Ann");
        assert_eq!(top.points, 3);
        assert!(top_scorer_from_events(&[]).is_none());
    }
}
