use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::config::AnalysisConfig;
use crate::game::GameTable;
use crate::player_rankings::{ScorerRow, top_scorers};
use crate::player_stats::{PlayerGameFact, extract_player_facts};
use crate::referees::{RefereeStatsRow, referee_statistics};
use crate::standings::{StandingsRow, calculate_standings};
use crate::team_performance::{TeamPerformance, team_performance};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub player_facts: usize,
    pub standings: usize,
    pub top_scorers: usize,
    pub teams: usize,
    pub referees: usize,
}

/// One workbook: player facts, standings, scorers, teams and referees,
/// each on its own sheet with a header row.
pub fn export_workbook(
    table: &GameTable,
    cfg: &AnalysisConfig,
    top_n: usize,
    path: &Path,
) -> Result<ExportReport> {
    let mut facts_rows = vec![header(&[
        "GameId", "GameDate", "PlayerName", "PlayerNumber", "Team", "TotalPoints", "1PMadeShots",
        "2PMadeShots", "3PMadeShots", "TotalFouls", "PFouls", "P1Fouls", "P2Fouls", "P3Fouls",
        "StartingFive",
    ])];
    facts_rows.extend(extract_player_facts(table).iter().map(fact_row));

    let mut standings_rows = vec![header(&[
        "Rank", "Team", "Games", "W", "L", "F", "A", "Points", "PointsDiff",
    ])];
    standings_rows.extend(calculate_standings(table, &cfg.standings).iter().map(standings_row));

    let mut scorer_rows = vec![header(&[
        "PlayerName", "Team", "TotalPoints", "1PMadeShots", "2PMadeShots", "3PMadeShots",
        "GamesPlayed", "AvgPointsPerGame",
    ])];
    scorer_rows.extend(top_scorers(table, top_n).iter().map(scorer_row));

    let mut team_rows = vec![header(&[
        "Team", "TotalGames", "Wins", "Losses", "PointsScored", "PointsAllowed", "WinPercentage",
        "HomeWinPercentage", "AwayWinPercentage", "LongestWinStreak",
    ])];
    team_rows.extend(team_performance(table).iter().map(team_row));

    let mut referee_rows = vec![header(&[
        "RefereeName", "GamesRefereed", "FoulsCalled", "AvgFoulsPerGame",
    ])];
    referee_rows.extend(referee_statistics(table).iter().map(referee_row));

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("PlayerFacts", &facts_rows),
        ("Standings", &standings_rows),
        ("TopScorers", &scorer_rows),
        ("Teams", &team_rows),
        ("Referees", &referee_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_rows(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        player_facts: facts_rows.len().saturating_sub(1),
        standings: standings_rows.len().saturating_sub(1),
        top_scorers: scorer_rows.len().saturating_sub(1),
        teams: team_rows.len().saturating_sub(1),
        referees: referee_rows.len().saturating_sub(1),
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn fact_row(f: &PlayerGameFact) -> Vec<String> {
    vec![
        f.game_id.clone(),
        f.game_date.clone().unwrap_or_default(),
        f.player_name.clone(),
        f.player_number.to_string(),
        f.team.clone(),
        f.total_points.to_string(),
        f.made_1p.to_string(),
        f.made_2p.to_string(),
        f.made_3p.to_string(),
        f.total_fouls.to_string(),
        f.p_fouls.to_string(),
        f.p1_fouls.to_string(),
        f.p2_fouls.to_string(),
        f.p3_fouls.to_string(),
        if f.starting_five { "TRUE" } else { "FALSE" }.to_string(),
    ]
}

fn standings_row(r: &StandingsRow) -> Vec<String> {
    vec![
        r.rank.to_string(),
        r.team.clone(),
        r.games.to_string(),
        r.wins.to_string(),
        r.losses.to_string(),
        r.points_for.to_string(),
        r.points_against.to_string(),
        r.league_points.to_string(),
        r.points_diff.to_string(),
    ]
}

fn scorer_row(r: &ScorerRow) -> Vec<String> {
    vec![
        r.player_name.clone(),
        r.team.clone(),
        r.total_points.to_string(),
        r.made_1p.to_string(),
        r.made_2p.to_string(),
        r.made_3p.to_string(),
        r.games_played.to_string(),
        format!("{:.1}", r.avg_points_per_game),
    ]
}

fn team_row(r: &TeamPerformance) -> Vec<String> {
    vec![
        r.team.clone(),
        r.total_games.to_string(),
        r.wins.to_string(),
        r.losses.to_string(),
        r.total_points_scored.to_string(),
        r.total_points_allowed.to_string(),
        format!("{:.1}", r.win_percentage),
        format!("{:.1}", r.home_win_percentage),
        format!("{:.1}", r.away_win_percentage),
        r.longest_win_streak.to_string(),
    ]
}

fn referee_row(r: &RefereeStatsRow) -> Vec<String> {
    vec![
        r.referee_name.clone(),
        r.games_refereed.to_string(),
        r.fouls_called.to_string(),
        format!("{:.1}", r.avg_fouls_per_game),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
