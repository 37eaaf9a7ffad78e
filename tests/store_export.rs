use std::fs;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use statgraph::ingest::{parse_league_rows_json, parse_match_records_json};
use statgraph::{ChartFamily, PipelineOptions, RequestParameters, TableSource, build_chart, export, store};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn seeded_db(dir: &tempfile::TempDir) -> rusqlite::Connection {
    let mut conn = store::open_db(&dir.path().join("tables.sqlite")).expect("open db");
    let rows = parse_league_rows_json(&read_fixture("league_epl.json")).expect("league fixture");
    let summary = store::import_league(&mut conn, "epl", &rows).expect("import league");
    assert_eq!(summary.name, "EPL");
    assert_eq!(summary.rows_written, 7);

    let records = parse_match_records_json(&read_fixture("Player stats E. Haaland.json")).expect("history fixture");
    store::import_history(&mut conn, "Player stats E. Haaland", &records).expect("import history");
    conn
}

#[test]
fn snapshot_matches_imported_fixtures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = seeded_db(&dir);
    let source = store::load_snapshot(&conn).expect("snapshot");

    assert_eq!(source.league_names(), vec!["EPL".to_string()]);
    let table = source.league_table("epl");
    let expected = parse_league_rows_json(&read_fixture("league_epl.json")).expect("league fixture");
    assert_eq!(table.rows, expected);

    let history = source.match_history("E. Haaland");
    assert_eq!(history.records.len(), 7);
    assert_eq!(history.records[0].date, "2023-10-08");
    assert_eq!(history.records[4].stat("Goals"), None);
}

#[test]
fn reimport_replaces_league_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut conn = seeded_db(&dir);
    let rows = parse_league_rows_json(&read_fixture("league_epl.json")).expect("league fixture");
    store::import_league(&mut conn, "EPL", &rows[..2]).expect("reimport");

    let table = store::load_league(&conn, "epl").expect("load league");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].player, "R. Dias");
}

#[test]
fn charts_from_store_export_to_json_and_workbook() {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = seeded_db(&dir);
    let source = store::load_snapshot(&conn).expect("snapshot");
    let mut rng = StdRng::seed_from_u64(3);

    let request = RequestParameters::new(ChartFamily::Radar)
        .with_league("epl")
        .with_player("R. Dias")
        .with_compare("W. Saliba");
    let radar = build_chart(&source, &request, &PipelineOptions::default(), &mut rng).expect("radar");
    let json = export::to_json(&radar).expect("json");
    assert!(json.contains("\"type\": \"radar\""));
    assert!(json.contains("\"player\": \"R. Dias\""));

    let radar_path = dir.path().join("radar.xlsx");
    export::write_workbook(&radar_path, &radar).expect("radar workbook");
    assert!(fs::metadata(&radar_path).expect("radar file").len() > 0);

    let request = RequestParameters::new(ChartFamily::Line)
        .with_player("E. Haaland")
        .with_stat("xG");
    let line = build_chart(&source, &request, &PipelineOptions::default(), &mut rng).expect("line");
    let json = export::to_json(&line).expect("json");
    assert!(json.contains("\"type\": \"line\""));

    let line_path = dir.path().join("line.xlsx");
    export::write_workbook(&line_path, &line).expect("line workbook");
    assert!(fs::metadata(&line_path).expect("line file").len() > 0);
}
