//! Ingestion layer: JSON game files on disk and the SQLite snapshot cache.
//! Nothing here is called by the statistics core; it only produces the
//! immutable [`GameTable`] the core reads.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use rusqlite::{Connection, params};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::game::{
    COL_AWAY_SCORE, COL_AWAY_TEAM, COL_DATE_TIME, COL_DIVISION, COL_EVENTS, COL_GAME_ID,
    COL_HOME_SCORE, COL_HOME_TEAM, COL_LOCATION, COL_REFEREES, COL_TEAMS, Game, GameTable,
};

const BOM: char = '\u{feff}';

/// Rows of one JSON file: an object is one game, an array holds several.
pub fn read_game_file(path: &Path) -> Result<Vec<Value>, IngestError> {
    let raw = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = raw.strip_prefix(BOM).unwrap_or(&raw);
    let value: Value = serde_json::from_str(text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
        obj @ Value::Object(_) => vec![obj],
        _ => Vec::new(),
    })
}

/// Every regular file below `dir`, sorted by path.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut out = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(next) = pending.pop() {
        let entries = fs::read_dir(&next).map_err(|source| IngestError::Io {
            path: next.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

#[derive(Debug, Clone, Default)]
pub struct GameFiles {
    pub rows: Vec<Value>,
    pub files_seen: usize,
    pub files_failed: usize,
}

/// Parse every file under `dir` in parallel. Files that cannot be read or
/// parsed are logged and skipped; row order follows path order.
pub fn load_game_files(dir: &Path) -> Result<GameFiles, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::NoData(format!(
            "data directory {} does not exist",
            dir.display()
        )));
    }
    let paths = collect_files(dir)?;
    let parsed: Vec<Result<Vec<Value>, IngestError>> =
        paths.par_iter().map(|p| read_game_file(p)).collect();

    let mut out = GameFiles {
        files_seen: paths.len(),
        ..Default::default()
    };
    for result in parsed {
        match result {
            Ok(rows) => out.rows.extend(rows),
            Err(err) => {
                warn!(error = %err, "skipping unreadable game file");
                out.files_failed += 1;
            }
        }
    }
    info!(
        dir = %dir.display(),
        files = out.files_seen,
        failed = out.files_failed,
        rows = out.rows.len(),
        "loaded game files"
    );
    Ok(out)
}

pub fn open_cache(path: &Path) -> Result<Connection, IngestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), IngestError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            row_idx INTEGER PRIMARY KEY,
            game_id TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_score INTEGER NULL,
            away_score INTEGER NULL,
            division TEXT NULL,
            date_time TEXT NULL,
            location TEXT NULL,
            referees TEXT NULL,
            teams TEXT NULL,
            events TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_games_division ON games(division);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            finished_at TEXT NOT NULL,
            source_dir TEXT NOT NULL,
            files_seen INTEGER NOT NULL,
            files_failed INTEGER NOT NULL,
            games_stored INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Nested fields keep their serialized text form; native structures are
/// stored as JSON, which the literal decoder also reads.
fn nested_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Replace the cached snapshot with `table`.
pub fn store_snapshot(conn: &mut Connection, table: &GameTable) -> Result<usize, IngestError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM games", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO games(row_idx, game_id, home_team, away_team, home_score, away_score,
                               division, date_time, location, referees, teams, events)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for (idx, g) in table.iter().enumerate() {
            stmt.execute(params![
                idx as i64,
                g.game_id,
                g.home_team,
                g.away_team,
                g.home_score.map(i64::from),
                g.away_score.map(i64::from),
                g.division,
                g.date_time,
                nested_text(&g.location),
                nested_text(&g.referees_raw),
                nested_text(&g.teams_raw),
                nested_text(&g.events_raw),
            ])?;
        }
    }
    tx.commit()?;
    Ok(table.len())
}

pub fn load_snapshot(conn: &Connection) -> Result<GameTable, IngestError> {
    let mut stmt = conn.prepare(
        "SELECT game_id, home_team, away_team, home_score, away_score, division, date_time,
                location, referees, teams, events
         FROM games
         ORDER BY row_idx ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let mut obj = Map::new();
        obj.insert(COL_GAME_ID.into(), Value::String(row.get(0)?));
        obj.insert(COL_HOME_TEAM.into(), Value::String(row.get(1)?));
        obj.insert(COL_AWAY_TEAM.into(), Value::String(row.get(2)?));
        let opt_int = |v: Option<i64>| v.map(Value::from).unwrap_or(Value::Null);
        let opt_text = |v: Option<String>| v.map(Value::String).unwrap_or(Value::Null);
        obj.insert(COL_HOME_SCORE.into(), opt_int(row.get(3)?));
        obj.insert(COL_AWAY_SCORE.into(), opt_int(row.get(4)?));
        obj.insert(COL_DIVISION.into(), opt_text(row.get(5)?));
        obj.insert(COL_DATE_TIME.into(), opt_text(row.get(6)?));
        obj.insert(COL_LOCATION.into(), opt_text(row.get(7)?));
        obj.insert(COL_REFEREES.into(), opt_text(row.get(8)?));
        obj.insert(COL_TEAMS.into(), opt_text(row.get(9)?));
        obj.insert(COL_EVENTS.into(), opt_text(row.get(10)?));
        Ok(Value::Object(obj))
    })?;

    let mut games = Vec::new();
    for row in rows {
        if let Some(game) = Game::from_value(&row?) {
            games.push(game);
        }
    }
    Ok(GameTable::new(games))
}

fn record_run(
    conn: &Connection,
    source_dir: &Path,
    files: &GameFiles,
    stored: usize,
) -> Result<(), IngestError> {
    conn.execute(
        "INSERT INTO ingest_runs(finished_at, source_dir, files_seen, files_failed, games_stored)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Utc::now().to_rfc3339(),
            source_dir.display().to_string(),
            files.files_seen as i64,
            files.files_failed as i64,
            stored as i64
        ],
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cache,
    Json,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: SnapshotSource,
    pub cache_path: PathBuf,
    pub files_seen: usize,
    pub files_failed: usize,
    pub games_loaded: usize,
}

/// Parse the data directory and overwrite the cache with the result.
pub fn rebuild_cache(cfg: &IngestConfig) -> Result<(GameTable, IngestReport)> {
    let files = load_game_files(&cfg.data_dir).context("load game files")?;
    let table = GameTable::from_values(files.rows.iter());

    let mut conn = open_cache(&cfg.cache_path)
        .with_context(|| format!("open sqlite cache {}", cfg.cache_path.display()))?;
    let stored = store_snapshot(&mut conn, &table).context("store snapshot")?;
    record_run(&conn, &cfg.data_dir, &files, stored).context("record ingest run")?;
    info!(games = stored, cache = %cfg.cache_path.display(), "snapshot cache rebuilt");

    let report = IngestReport {
        source: SnapshotSource::Json,
        cache_path: cfg.cache_path.clone(),
        files_seen: files.files_seen,
        files_failed: files.files_failed,
        games_loaded: table.len(),
    };
    Ok((table, report))
}

/// Snapshot for the reports. Order of preference: a forced rebuild, a
/// non-empty cache, a rebuild from JSON, and finally an empty table.
pub fn load_game_table(cfg: &IngestConfig) -> Result<(GameTable, IngestReport)> {
    if cfg.regenerate && cfg.data_dir.is_dir() {
        info!("regenerate requested, rebuilding snapshot from json");
        return rebuild_cache(cfg);
    }

    if cfg.cache_path.is_file() {
        let conn = open_cache(&cfg.cache_path)
            .with_context(|| format!("open sqlite cache {}", cfg.cache_path.display()))?;
        let table = load_snapshot(&conn).context("load snapshot")?;
        if !table.is_empty() {
            info!(games = table.len(), cache = %cfg.cache_path.display(), "loaded snapshot cache");
            let report = IngestReport {
                source: SnapshotSource::Cache,
                cache_path: cfg.cache_path.clone(),
                files_seen: 0,
                files_failed: 0,
                games_loaded: table.len(),
            };
            return Ok((table, report));
        }
        debug!("snapshot cache is empty");
    }

    if cfg.data_dir.is_dir() {
        return rebuild_cache(cfg);
    }

    warn!(dir = %cfg.data_dir.display(), "no cache and no data directory, reports will be empty");
    Ok((
        GameTable::default(),
        IngestReport {
            source: SnapshotSource::Empty,
            cache_path: cfg.cache_path.clone(),
            files_seen: 0,
            files_failed: 0,
            games_loaded: 0,
        },
    ))
}
