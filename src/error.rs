use std::path::PathBuf;

use thiserror::Error;

/// Why a nested per-game field could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("field is missing or null")]
    Missing,

    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: String },

    #[error("unexpected shape, expected {expected}")]
    Shape { expected: &'static str },
}

/// Failures of the ingestion layer. The statistics core never returns these.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no game data available: {0}")]
    NoData(String),
}
