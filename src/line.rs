use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tables::{MatchHistory, MatchRecord};

/// Season axis for a match series. Exports list the newest match first and
/// the chart runs oldest to newest, so record `i` sits at `len - 1 - i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonWindows {
    /// `"{yy}/{yy+1}"`, newest season first.
    pub labels: Vec<String>,
    /// Label x positions, aligned with `labels`.
    pub positions: Vec<f64>,
    /// x position where each season starts, aligned with `labels`.
    pub boundaries: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub x: usize,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub player: String,
    pub points: Vec<SeriesPoint>,
    pub mean: Option<f64>,
    pub seasons: SeasonWindows,
    /// Records dropped because their date had no season year.
    pub skipped_records: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMarkers {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Two-digit season start year at offset 2 of an ISO-ish date (`"2023-..."`
/// gives `23`).
pub fn season_token(date: &str) -> Option<u32> {
    let digits = date.get(2..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn season_windows(tokens: &[u32]) -> SeasonWindows {
    let len = tokens.len();
    let mut distinct: Vec<u32> = Vec::new();
    for token in tokens {
        if !distinct.contains(token) {
            distinct.push(*token);
        }
    }

    let boundaries: Vec<usize> = distinct
        .iter()
        .map(|token| {
            let last = tokens.iter().rposition(|t| t == token).unwrap_or(0);
            len - last - 1
        })
        .collect();

    // Midpoints are taken left to right along the chart, the newest season
    // closing at the series length.
    let ascending: Vec<usize> = boundaries.iter().rev().copied().collect();
    let mut positions: Vec<f64> = ascending
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let right = ascending.get(i + 1).copied().unwrap_or(len);
            (*start + right) as f64 / 2.0
        })
        .collect();
    positions.reverse();

    let labels = distinct.iter().map(|y| format!("{}/{}", y, y + 1)).collect();

    SeasonWindows {
        labels,
        positions,
        boundaries,
    }
}

/// Windowed series of `stat` over `history`. Records without a season year
/// are dropped with a warning.
pub fn window_series(player: &str, history: &MatchHistory, stat: &str) -> LineSeries {
    let mut kept: Vec<(&MatchRecord, u32)> = Vec::with_capacity(history.records.len());
    let mut skipped_records = 0usize;
    for record in &history.records {
        match season_token(&record.date) {
            Some(token) => kept.push((record, token)),
            None => {
                warn!(player, date = %record.date, "skipping match record without season year");
                skipped_records += 1;
            }
        }
    }

    let len = kept.len();
    let points: Vec<SeriesPoint> = kept
        .iter()
        .enumerate()
        .map(|(i, (record, _))| SeriesPoint {
            date: record.date.clone(),
            x: len - 1 - i,
            value: record.stat(stat),
        })
        .collect();

    let present: Vec<f64> = points.iter().filter_map(|p| p.value).collect();
    let mean = (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64);

    let tokens: Vec<u32> = kept.iter().map(|(_, token)| *token).collect();

    LineSeries {
        player: player.to_string(),
        points,
        mean,
        seasons: season_windows(&tokens),
        skipped_records,
    }
}

fn point_date(point: &SeriesPoint) -> Option<NaiveDate> {
    let head = point.date.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Chart positions of the first match on or after `start` and the last match
/// on or before `end`.
pub fn date_markers(points: &[SeriesPoint], start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateMarkers {
    let dated: Vec<(usize, NaiveDate)> = points
        .iter()
        .filter_map(|p| point_date(p).map(|d| (p.x, d)))
        .collect();

    let start = start.and_then(|bound| {
        dated
            .iter()
            .filter(|(_, d)| *d >= bound)
            .min_by_key(|(x, d)| (*d, *x))
            .map(|(x, _)| *x)
    });
    let end = end.and_then(|bound| {
        dated
            .iter()
            .filter(|(_, d)| *d <= bound)
            .max_by_key(|(x, d)| (*d, *x))
            .map(|(x, _)| *x)
    });
    DateMarkers { start, end }
}
