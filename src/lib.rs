//! Basketball league statistics: decodes game exports with nested
//! per-team, per-player and per-event records and computes standings,
//! leaderboards, team, referee and lineup views over an immutable snapshot.

pub mod aggregate;
pub mod combinations;
pub mod config;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod game;
pub mod game_events;
pub mod game_rankings;
pub mod impact;
pub mod ingest;
pub mod literal;
pub mod logging;
pub mod player_rankings;
pub mod player_stats;
pub mod records;
pub mod referees;
pub mod standings;
pub mod synthetic;
pub mod team_performance;

pub use config::{AnalysisConfig, IngestConfig};
pub use error::{DecodeError, IngestError};
pub use game::{Game, GameTable};
pub use player_stats::{PlayerGameFact, extract_player_facts};
