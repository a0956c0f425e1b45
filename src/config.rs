use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_DATA_DIR: &str = "full-game-stats-output";
pub const DEFAULT_CACHE_PATH: &str = "full-game-stats.sqlite";

/// Thresholds and weights for every report. Defaults reproduce the published
/// league pages; the weights are tunable heuristics, not fitted values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub shooting: ShootingPolicy,
    pub consistency: ConsistencyPolicy,
    pub double_digit: DoubleDigitPolicy,
    pub impact: ImpactWeights,
    pub foul_impact: FoulImpactPolicy,
    pub referees: RefereePolicy,
    pub combinations: CombinationPolicy,
    pub standings: StandingsPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingPolicy {
    pub min_games: u32,
    pub min_made_shots: u32,
}

impl Default for ShootingPolicy {
    fn default() -> Self {
        Self {
            min_games: 5,
            min_made_shots: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPolicy {
    pub min_games: u32,
    // Keeps zero-variance scorers finite.
    pub std_stabilizer: f64,
    pub top_n: usize,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            min_games: 5,
            std_stabilizer: 0.1,
            top_n: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleDigitPolicy {
    pub min_points: u32,
    pub top_n: usize,
}

impl Default for DoubleDigitPolicy {
    fn default() -> Self {
        Self {
            min_points: 10,
            top_n: 20,
        }
    }
}

/// impact = avg_points·w + win_rate%·w + (efficiency_scale·points_per_shot)·w
///        + point_differential·w + starting_rate%·w − foul_penalty·avg_fouls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactWeights {
    pub avg_points: f64,
    pub win_rate: f64,
    pub efficiency: f64,
    pub efficiency_scale: f64,
    pub point_differential: f64,
    pub starting_rate: f64,
    pub foul_penalty: f64,
    pub min_games: u32,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            avg_points: 0.30,
            win_rate: 0.25,
            efficiency: 0.20,
            efficiency_scale: 10.0,
            point_differential: 0.15,
            starting_rate: 0.10,
            foul_penalty: 2.0,
            min_games: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoulImpactPolicy {
    pub min_games: u32,
}

impl Default for FoulImpactPolicy {
    fn default() -> Self {
        Self { min_games: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereePolicy {
    pub min_games: u32,
    /// Combined score strictly above this is a high-scoring game.
    pub high_scoring_total: u32,
    /// Final margin at or below this is a close game.
    pub close_game_margin: u32,
    pub list_len: usize,
}

impl Default for RefereePolicy {
    fn default() -> Self {
        Self {
            min_games: 2,
            high_scoring_total: 100,
            close_game_margin: 5,
            list_len: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationPolicy {
    pub min_games: u32,
    pub starters_per_side: usize,
    pub synergy_top_n: usize,
}

impl Default for CombinationPolicy {
    fn default() -> Self {
        Self {
            min_games: 3,
            starters_per_side: 5,
            synergy_top_n: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandingsPolicy {
    pub win_points: u32,
    pub loss_points: u32,
}

impl Default for StandingsPolicy {
    fn default() -> Self {
        Self {
            win_points: 2,
            loss_points: 1,
        }
    }
}

impl AnalysisConfig {
    /// Policy file if present and valid, defaults otherwise.
    pub fn load(path: &Path) -> AnalysisConfig {
        let Ok(raw) = fs::read_to_string(path) else {
            return AnalysisConfig::default();
        };
        match serde_json::from_str::<AnalysisConfig>(&raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid analysis config, using defaults");
                AnalysisConfig::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize analysis config")?;
        fs::write(&tmp, json).context("write analysis config")?;
        fs::rename(&tmp, path).context("swap analysis config")?;
        Ok(())
    }
}

/// Where game data comes from and whether the snapshot cache is rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub cache_path: PathBuf,
    pub regenerate: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            regenerate: false,
        }
    }
}

impl IngestConfig {
    /// Reads `HOOPS_DATA_DIR`, `HOOPS_CACHE_PATH` and `HOOPS_REGENERATE`.
    pub fn from_env() -> Self {
        let mut cfg = IngestConfig::default();
        if let Some(dir) = env_path("HOOPS_DATA_DIR") {
            cfg.data_dir = dir;
        }
        if let Some(path) = env_path("HOOPS_CACHE_PATH") {
            cfg.cache_path = path;
        }
        cfg.regenerate = env::var("HOOPS_REGENERATE")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        cfg
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
