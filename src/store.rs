use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::info;

use crate::tables::{LeagueRow, LeagueTable, MatchHistory, MatchRecord, MemorySource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub kind: &'static str,
    pub name: String,
    pub rows_written: usize,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .context("enable wal journal")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS league_rows (
            league TEXT NOT NULL,
            player TEXT NOT NULL,
            position TEXT NOT NULL,
            team TEXT NULL,
            matches_played REAL NULL,
            birth_country TEXT NULL,
            stats_json TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (league, player)
        );
        CREATE INDEX IF NOT EXISTS idx_league_rows_league ON league_rows(league);

        CREATE TABLE IF NOT EXISTS match_records (
            source TEXT NOT NULL,
            seq INTEGER NOT NULL,
            date TEXT NOT NULL,
            position TEXT NOT NULL,
            stats_json TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (source, seq)
        );

        CREATE TABLE IF NOT EXISTS import_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            imported_at TEXT NOT NULL,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            rows_written INTEGER NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Replace a league table wholesale. Rows are keyed by player, so a table
/// listing the same player twice is rejected.
pub fn import_league(conn: &mut Connection, league: &str, rows: &[LeagueRow]) -> Result<ImportSummary> {
    let league = league.trim().to_uppercase();
    let mut seen = HashSet::with_capacity(rows.len());
    if let Some(dup) = rows.iter().find(|row| !seen.insert(row.player.as_str())) {
        bail!("league {league} lists player {} more than once", dup.player);
    }
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin league import")?;
    tx.execute("DELETE FROM league_rows WHERE league = ?1", params![league])
        .context("clear league rows")?;
    for row in rows {
        let stats_json = serde_json::to_string(&row.stats).context("serialize league stats")?;
        tx.execute(
            "INSERT INTO league_rows(league, player, position, team, matches_played, birth_country, stats_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                league,
                row.player,
                row.position,
                row.team,
                row.matches_played,
                row.birth_country,
                stats_json,
                updated_at
            ],
        )
        .with_context(|| format!("insert league row {}", row.player))?;
    }
    record_run(&tx, "league", &league, rows.len(), &updated_at)?;
    tx.commit().context("commit league import")?;

    info!(%league, rows = rows.len(), "league table imported");
    Ok(ImportSummary {
        kind: "league",
        name: league,
        rows_written: rows.len(),
    })
}

/// Replace one player's match history wholesale, keeping record order.
pub fn import_history(conn: &mut Connection, source: &str, records: &[MatchRecord]) -> Result<ImportSummary> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin history import")?;
    tx.execute("DELETE FROM match_records WHERE source = ?1", params![source])
        .context("clear match records")?;
    for (seq, record) in records.iter().enumerate() {
        let stats_json = serde_json::to_string(&record.stats).context("serialize match stats")?;
        tx.execute(
            "INSERT INTO match_records(source, seq, date, position, stats_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![source, seq as i64, record.date, record.position, stats_json, updated_at],
        )
        .with_context(|| format!("insert match record {seq}"))?;
    }
    record_run(&tx, "history", source, records.len(), &updated_at)?;
    tx.commit().context("commit history import")?;

    info!(%source, rows = records.len(), "match history imported");
    Ok(ImportSummary {
        kind: "history",
        name: source.to_string(),
        rows_written: records.len(),
    })
}

fn record_run(conn: &Connection, kind: &str, name: &str, rows: usize, at: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO import_runs(imported_at, kind, name, rows_written) VALUES (?1, ?2, ?3, ?4)",
        params![at, kind, name, rows as i64],
    )
    .context("insert import run")?;
    Ok(())
}

pub fn load_league(conn: &Connection, league: &str) -> Result<LeagueTable> {
    let league = league.trim().to_uppercase();
    let mut stmt = conn
        .prepare(
            r#"
            SELECT player, position, team, matches_played, birth_country, stats_json
            FROM league_rows
            WHERE league = ?1
            ORDER BY rowid ASC
            "#,
        )
        .context("prepare league query")?;
    let rows = stmt
        .query_map(params![league], |row| {
            Ok((
                LeagueRow {
                    player: row.get(0)?,
                    position: row.get(1)?,
                    team: row.get(2)?,
                    matches_played: row.get(3)?,
                    birth_country: row.get(4)?,
                    stats: BTreeMap::new(),
                },
                row.get::<_, String>(5)?,
            ))
        })
        .context("query league rows")?;

    let mut out = Vec::new();
    for row in rows {
        let (mut league_row, stats_json) = row.context("decode league row")?;
        league_row.stats = serde_json::from_str(&stats_json)
            .with_context(|| format!("decode stats for {}", league_row.player))?;
        out.push(league_row);
    }
    Ok(LeagueTable::new(league, out))
}

pub fn load_history(conn: &Connection, source: &str) -> Result<MatchHistory> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT date, position, stats_json
            FROM match_records
            WHERE source = ?1
            ORDER BY seq ASC
            "#,
        )
        .context("prepare history query")?;
    let rows = stmt
        .query_map(params![source], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .context("query match records")?;

    let mut records = Vec::new();
    for row in rows {
        let (date, position, stats_json) = row.context("decode match record")?;
        let stats = serde_json::from_str(&stats_json).context("decode match stats")?;
        records.push(MatchRecord {
            date,
            position,
            stats,
        });
    }
    Ok(MatchHistory {
        source: source.to_string(),
        records,
    })
}

fn distinct(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql).context("prepare distinct query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query distinct names")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode name")?);
    }
    Ok(out)
}

/// Whole store as an in-memory source.
pub fn load_snapshot(conn: &Connection) -> Result<MemorySource> {
    let mut source = MemorySource::new();
    for league in distinct(conn, "SELECT DISTINCT league FROM league_rows ORDER BY league")? {
        source.insert_league(load_league(conn, &league)?);
    }
    for name in distinct(conn, "SELECT DISTINCT source FROM match_records ORDER BY source")? {
        source.insert_history(load_history(conn, &name)?);
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TableSource;

    fn league_rows() -> Vec<LeagueRow> {
        vec![LeagueRow {
            player: "R. Dias".to_string(),
            position: "RCB".to_string(),
            team: Some("Man City".to_string()),
            matches_played: Some(30.0),
            birth_country: None,
            stats: BTreeMap::from([
                ("Interceptions per 90".to_string(), Some(3.1)),
                ("xG/Shot".to_string(), None),
            ]),
        }]
    }

    #[test]
    fn import_replaces_and_snapshot_round_trips() {
        let mut conn = Connection::open_in_memory().expect("memory db");
        init_schema(&conn).expect("schema");

        import_league(&mut conn, "epl", &league_rows()).expect("first import");
        let summary = import_league(&mut conn, "EPL", &league_rows()).expect("second import");
        assert_eq!(summary.rows_written, 1);

        let records = vec![
            MatchRecord {
                date: "2023-05-01".to_string(),
                position: "RCB".to_string(),
                stats: BTreeMap::from([("Interceptions".to_string(), Some(4.0))]),
            },
            MatchRecord {
                date: "2023-04-20".to_string(),
                position: "CB".to_string(),
                stats: BTreeMap::new(),
            },
        ];
        import_history(&mut conn, "Player stats R. Dias", &records).expect("history import");

        let snapshot = load_snapshot(&conn).expect("snapshot");
        let table = snapshot.league_table("epl");
        assert_eq!(table.rows, league_rows());
        let history = snapshot.match_history("R. Dias");
        assert_eq!(history.records, records);
    }

    #[test]
    fn duplicate_players_reject_the_whole_import() {
        let mut conn = Connection::open_in_memory().expect("memory db");
        init_schema(&conn).expect("schema");
        import_league(&mut conn, "epl", &league_rows()).expect("first import");

        let mut rows = league_rows();
        let mut twin = rows[0].clone();
        twin.team = Some("Benfica".to_string());
        rows.push(twin);
        let err = import_league(&mut conn, "epl", &rows).expect_err("duplicate player");
        assert!(err.to_string().contains("R. Dias"));

        let table = load_league(&conn, "EPL").expect("load league");
        assert_eq!(table.rows, league_rows());
    }
}
