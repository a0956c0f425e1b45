use std::fs;
use std::path::{Path, PathBuf};

use hoops_stats::config::{AnalysisConfig, IngestConfig};
use hoops_stats::export::export_workbook;
use hoops_stats::extract_player_facts;
use hoops_stats::ingest::{
    SnapshotSource, load_game_files, load_game_table, load_snapshot, open_cache, read_game_file,
    store_snapshot,
};
use hoops_stats::synthetic::{SeasonSpec, generate_table};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn seed_data_dir(dir: &Path) {
    fs::create_dir_all(dir.join("u14")).expect("create data dir");
    fs::copy(fixture_path("season_small.json"), dir.join("u14").join("season.json"))
        .expect("copy season fixture");
    fs::copy(fixture_path("two_games.json"), dir.join("open.json")).expect("copy scenario fixture");
}

#[test]
fn byte_order_mark_and_single_object_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("one.json");
    fs::write(
        &path,
        "\u{feff}{\"GameId\": 7, \"HomeTeamName\": \"A\", \"AwayTeamName\": \"B\"}",
    )
    .expect("write game file");

    let rows = read_game_file(&path).expect("bom-prefixed file should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["GameId"], 7);
}

#[test]
fn unreadable_files_are_counted_and_skipped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_data_dir(tmp.path());
    fs::write(tmp.path().join("broken.json"), "{ not json").expect("write broken file");

    let files = load_game_files(tmp.path()).expect("directory exists");
    assert_eq!(files.files_seen, 3);
    assert_eq!(files.files_failed, 1);
    assert_eq!(files.rows.len(), 6);

    assert!(load_game_files(&tmp.path().join("missing")).is_err());
}

#[test]
fn snapshot_round_trip_keeps_order_and_nested_text() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let table = generate_table(&SeasonSpec {
        teams_per_division: 4,
        ..SeasonSpec::default()
    });

    let cache = tmp.path().join("cache.sqlite");
    let mut conn = open_cache(&cache).expect("open cache");
    let stored = store_snapshot(&mut conn, &table).expect("store snapshot");
    assert_eq!(stored, table.len());

    let loaded = load_snapshot(&conn).expect("load snapshot");
    assert_eq!(loaded.len(), table.len());
    let ids = |t: &hoops_stats::GameTable| t.iter().map(|g| g.game_id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&loaded), ids(&table));
    assert_eq!(extract_player_facts(&loaded), extract_player_facts(&table));

    // Storing again replaces the snapshot instead of appending.
    store_snapshot(&mut conn, &table).expect("store snapshot twice");
    assert_eq!(load_snapshot(&conn).expect("reload").len(), table.len());
}

#[test]
fn load_prefers_cache_then_json_then_empty() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data_dir = tmp.path().join("data");
    let cfg = IngestConfig {
        data_dir: data_dir.clone(),
        cache_path: tmp.path().join("db").join("games.sqlite"),
        regenerate: false,
    };

    let (empty, report) = load_game_table(&cfg).expect("empty fallback");
    assert!(empty.is_empty());
    assert_eq!(report.source, SnapshotSource::Empty);

    seed_data_dir(&data_dir);
    let (table, report) = load_game_table(&cfg).expect("json rebuild");
    assert_eq!(report.source, SnapshotSource::Json);
    assert_eq!(report.files_seen, 2);
    assert_eq!(table.len(), 6);
    assert!(cfg.cache_path.is_file());

    let (cached, report) = load_game_table(&cfg).expect("cache hit");
    assert_eq!(report.source, SnapshotSource::Cache);
    assert_eq!(cached.len(), 6);

    fs::remove_file(data_dir.join("open.json")).expect("remove one file");
    let forced = IngestConfig {
        regenerate: true,
        ..cfg.clone()
    };
    let (rebuilt, report) = load_game_table(&forced).expect("forced rebuild");
    assert_eq!(report.source, SnapshotSource::Json);
    assert_eq!(rebuilt.len(), 4);
}

#[test]
fn workbook_export_counts_rows() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let rows: Vec<serde_json::Value> = serde_json::from_str(
        &fs::read_to_string(fixture_path("season_small.json")).expect("fixture readable"),
    )
    .expect("fixture should be valid json");
    let table = hoops_stats::GameTable::from_values(rows.iter());

    let out = tmp.path().join("report.xlsx");
    let report = export_workbook(&table, &AnalysisConfig::default(), 5, &out).expect("export");
    assert!(out.is_file());
    assert_eq!(report.player_facts, 24);
    assert_eq!(report.standings, 2);
    assert_eq!(report.top_scorers, 5);
    assert_eq!(report.teams, 2);
    assert_eq!(report.referees, 3);
}
