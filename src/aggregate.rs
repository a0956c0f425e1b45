//! Grouping, reduction and ranking helpers shared by every report.
//!
//! Ranking is always a stable sort on one metric: rows that tie keep the
//! order they had going in (sorted group key for player and referee groups,
//! table order for games). Top-N is a plain prefix of that ranking.

use std::collections::{BTreeMap, HashMap};

use crate::game::{Game, GameTable};
use crate::player_stats::PlayerGameFact;
use crate::records::made_shots;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation; a single observation has none, so 0.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values
        .iter()
        .map(|v| {
            let d = v - m;
            d * d
        })
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    var.sqrt()
}

pub fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

pub fn round1(v: f64) -> f64 {
    round_to(v, 1)
}

pub fn round2(v: f64) -> f64 {
    round_to(v, 2)
}

/// `part / whole` as a percentage, 0 when there is nothing to divide by.
pub fn pct(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 { 0.0 } else { part / whole * 100.0 }
}

pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 { 0.0 } else { part / whole }
}

pub fn sort_desc_by<T>(rows: &mut [T], key: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

pub fn sort_asc_by<T>(rows: &mut [T], key: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| key(a).total_cmp(&key(b)));
}

/// Stable descending ranking truncated to `top_n` rows.
pub fn rank_desc<T>(mut rows: Vec<T>, top_n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    sort_desc_by(&mut rows, key);
    rows.truncate(top_n);
    rows
}

pub fn rank_asc<T>(mut rows: Vec<T>, top_n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    sort_asc_by(&mut rows, key);
    rows.truncate(top_n);
    rows
}

/// Player identity used by every per-player report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerKey<'a> {
    pub player_name: &'a str,
    pub team: &'a str,
}

/// Facts grouped by (player, team), iterated in key order.
pub fn group_by_player(facts: &[PlayerGameFact]) -> BTreeMap<PlayerKey<'_>, Vec<&PlayerGameFact>> {
    let mut groups: BTreeMap<PlayerKey<'_>, Vec<&PlayerGameFact>> = BTreeMap::new();
    for fact in facts {
        groups
            .entry(PlayerKey {
                player_name: &fact.player_name,
                team: &fact.team,
            })
            .or_default()
            .push(fact);
    }
    groups
}

pub fn game_index(table: &GameTable) -> HashMap<&str, &Game> {
    table.iter().map(|g| (g.game_id.as_str(), g)).collect()
}

/// Per-player sums used by several leaderboards.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerTotals {
    pub games: u32,
    pub points: u32,
    pub made_1p: u32,
    pub made_2p: u32,
    pub made_3p: u32,
    pub fouls: u32,
    pub p_fouls: u32,
    pub p1_fouls: u32,
    pub p2_fouls: u32,
    pub p3_fouls: u32,
    pub starts: u32,
}

impl PlayerTotals {
    pub fn of(rows: &[&PlayerGameFact]) -> Self {
        let mut t = PlayerTotals::default();
        for r in rows {
            t.games += 1;
            t.points = t.points.saturating_add(r.total_points);
            t.made_1p = t.made_1p.saturating_add(r.made_1p);
            t.made_2p = t.made_2p.saturating_add(r.made_2p);
            t.made_3p = t.made_3p.saturating_add(r.made_3p);
            t.fouls = t.fouls.saturating_add(r.total_fouls);
            t.p_fouls = t.p_fouls.saturating_add(r.p_fouls);
            t.p1_fouls = t.p1_fouls.saturating_add(r.p1_fouls);
            t.p2_fouls = t.p2_fouls.saturating_add(r.p2_fouls);
            t.p3_fouls = t.p3_fouls.saturating_add(r.p3_fouls);
            if r.starting_five {
                t.starts += 1;
            }
        }
        t
    }

    pub fn made_shots(&self) -> u32 {
        made_shots(self.made_1p, self.made_2p, self.made_3p)
    }

    pub fn per_game(&self, total: u32) -> f64 {
        ratio(total as f64, self.games as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_matches_sample_definition() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_std(&v) - 2.138).abs() < 1e-3);
        assert_eq!(sample_std(&[10.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn ranking_is_stable_prefix() {
        let rows = vec![("a", 1.0), ("b", 3.0), ("c", 3.0), ("d", 2.0)];
        let full = rank_desc(rows.clone(), usize::MAX, |r| r.1);
        assert_eq!(full.iter().map(|r| r.0).collect::<Vec<_>>(), ["b", "c", "d", "a"]);
        let top = rank_desc(rows, 2, |r| r.1);
        assert_eq!(top, full[..2].to_vec());
    }

    #[test]
    fn rounding() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(pct(1.0, 0.0), 0.0);
    }
}
