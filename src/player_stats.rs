use serde::Serialize;

use crate::error::DecodeError;
use crate::game::{Game, GameTable};
use crate::records::{PlayerGameRecord, TeamRosterEntry, made_shots, points_from_shots};

/// One player appearance in one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameFact {
    pub game_id: String,
    pub game_date: Option<String>,
    pub player_name: String,
    pub player_number: u32,
    pub team: String,
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

impl PlayerGameFact {
    fn new(game: &Game, team: &TeamRosterEntry, p: &PlayerGameRecord) -> Self {
        Self {
            game_id: game.game_id.clone(),
            game_date: game.date_time.clone(),
            player_name: p.player_name.clone(),
            player_number: p.player_number,
            team: team.team_name.clone(),
            total_points: p.total_points,
            made_1p: p.made_1p,
            made_2p: p.made_2p,
            made_3p: p.made_3p,
            total_fouls: p.total_fouls,
            p_fouls: p.p_fouls,
            p1_fouls: p.p1_fouls,
            p2_fouls: p.p2_fouls,
            p3_fouls: p.p3_fouls,
            starting_five: p.starting_five,
        }
    }

    pub fn made_shots(&self) -> u32 {
        made_shots(self.made_1p, self.made_2p, self.made_3p)
    }

    pub fn points_from_shots(&self) -> u32 {
        points_from_shots(self.made_1p, self.made_2p, self.made_3p)
    }
}

/// Flatten every roster of every game into the player-game fact table.
/// Games whose roster cannot be decoded contribute no rows.
pub fn extract_player_facts(table: &GameTable) -> Vec<PlayerGameFact> {
    let mut out = Vec::new();
    for game in table {
        out.extend(game_facts(game));
    }
    out
}

pub fn game_facts(game: &Game) -> impl Iterator<Item = PlayerGameFact> + '_ {
    game.rosters().iter().flat_map(move |team| {
        team.players
            .iter()
            .map(move |p| PlayerGameFact::new(game, team, p))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMismatch {
    pub game_id: String,
    pub player_name: String,
    pub team: String,
    pub total_points: u32,
    pub points_from_shots: u32,
}

/// Summary of how much of the snapshot decoded cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub games: usize,
    pub unfinished_games: usize,
    pub missing_rosters: usize,
    pub malformed_rosters: Vec<String>,
    pub malformed_events: Vec<String>,
    pub malformed_referees: Vec<String>,
    pub fact_rows: usize,
    /// Rows where total points disagree with 1P + 2×2P + 3×3P made.
    pub point_mismatches: Vec<PointMismatch>,
}

pub fn data_quality_report(table: &GameTable) -> DataQualityReport {
    let mut report = DataQualityReport {
        games: table.len(),
        ..Default::default()
    };

    for game in table {
        if !game.is_finished() {
            report.unfinished_games += 1;
        }
        match game.roster_status() {
            Err(DecodeError::Missing) => report.missing_rosters += 1,
            Err(_) => report.malformed_rosters.push(game.game_id.clone()),
            Ok(_) => {}
        }
        if matches!(game.event_status(), Err(err) if *err != DecodeError::Missing) {
            report.malformed_events.push(game.game_id.clone());
        }
        if matches!(game.referee_status(), Err(err) if *err != DecodeError::Missing) {
            report.malformed_referees.push(game.game_id.clone());
        }

        for fact in game_facts(game) {
            report.fact_rows += 1;
            let implied = fact.points_from_shots();
            if implied != fact.total_points {
                report.point_mismatches.push(PointMismatch {
                    game_id: fact.game_id,
                    player_name: fact.player_name,
                    team: fact.team,
                    total_points: fact.total_points,
                    points_from_shots: implied,
                });
            }
        }
    }

    report
}
