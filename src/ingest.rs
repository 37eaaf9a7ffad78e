use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::tables::{LeagueRow, MatchRecord};

const LEAGUE_PLAYER: &str = "Player";
const LEAGUE_POSITION: &str = "Position";
const LEAGUE_TEAM: &str = "Team";
const LEAGUE_MATCHES: &str = "Matches played";
const LEAGUE_COUNTRY: &str = "Birth country";
const MATCH_DATE: &str = "Date";
const MATCH_POSITION: &str = "Position";

/// League table export: a JSON array of objects keyed by sheet header.
pub fn parse_league_rows_json(raw: &str) -> Result<Vec<LeagueRow>> {
    let rows = parse_sheet(raw).context("invalid league table json")?;
    rows.iter()
        .enumerate()
        .map(|(idx, obj)| league_row(obj).with_context(|| format!("league row {idx}")))
        .collect()
}

/// Per-match export for a single player, newest match first.
pub fn parse_match_records_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let rows = parse_sheet(raw).context("invalid match history json")?;
    rows.iter()
        .enumerate()
        .map(|(idx, obj)| match_record(obj).with_context(|| format!("match row {idx}")))
        .collect()
}

fn parse_sheet(raw: &str) -> Result<Vec<Map<String, Value>>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let Value::Array(items) = root else {
        return Err(anyhow!("expected a json array of rows"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(obj) => Ok(obj),
            other => Err(anyhow!("row {idx} is not an object: {other}")),
        })
        .collect()
}

fn league_row(obj: &Map<String, Value>) -> Result<LeagueRow> {
    let player = pick_string(obj, LEAGUE_PLAYER).ok_or_else(|| anyhow!("missing {LEAGUE_PLAYER}"))?;
    let position = pick_string(obj, LEAGUE_POSITION).unwrap_or_default();
    let reserved = [
        LEAGUE_PLAYER,
        LEAGUE_POSITION,
        LEAGUE_TEAM,
        LEAGUE_MATCHES,
        LEAGUE_COUNTRY,
    ];
    Ok(LeagueRow {
        player,
        position,
        team: pick_string(obj, LEAGUE_TEAM),
        matches_played: obj.get(LEAGUE_MATCHES).and_then(number),
        birth_country: pick_string(obj, LEAGUE_COUNTRY),
        stats: metric_cells(obj, &reserved),
    })
}

fn match_record(obj: &Map<String, Value>) -> Result<MatchRecord> {
    let date = pick_string(obj, MATCH_DATE).ok_or_else(|| anyhow!("missing {MATCH_DATE}"))?;
    Ok(MatchRecord {
        date,
        position: pick_string(obj, MATCH_POSITION).unwrap_or_default(),
        stats: metric_cells(obj, &[MATCH_DATE, MATCH_POSITION]),
    })
}

/// Numeric and empty cells become metric columns; text columns are ignored.
fn metric_cells(obj: &Map<String, Value>, reserved: &[&str]) -> BTreeMap<String, Option<f64>> {
    obj.iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .filter_map(|(key, value)| match value {
            Value::Null => Some((key.clone(), None)),
            Value::String(s) if s.trim().is_empty() => Some((key.clone(), None)),
            other => number(other).map(|n| (key.clone(), Some(n))),
        })
        .collect()
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn pick_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
