use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::tables::LeagueRow;

pub const DEFAULT_TICK_COUNT: usize = 6;

const MAX_TICK_DECIMALS: i32 = 15;
const TICK_RADIUS_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSeries {
    pub player: String,
    /// Raw metric values, closed (first value repeated at the end).
    pub values: Vec<f64>,
    /// `values / scale`, closed.
    pub normalized: Vec<f64>,
}

/// One tick value placed on a metric's spoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    pub metric_index: usize,
    pub angle: f64,
    pub radius: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarProjection {
    pub metrics: Vec<String>,
    pub scales: Vec<f64>,
    /// Closed angle list, one more entry than `metrics`.
    pub angles: Vec<f64>,
    pub primary: RadarSeries,
    pub compare: Option<RadarSeries>,
    /// Tick values per metric, zero included.
    pub tick_values: Vec<Vec<f64>>,
    /// Ticks to draw, zero ticks suppressed.
    pub tick_labels: Vec<TickLabel>,
    /// Radial offset of each metric's name label from the plot edge.
    pub label_offsets: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarCaption {
    pub title: String,
    pub subtitle: Vec<String>,
}

/// Row values for `metrics` in order, plus the first value again.
pub fn closed_values<S: AsRef<str>>(row: &LeagueRow, metrics: &[S]) -> Vec<f64> {
    let mut values: Vec<f64> = metrics.iter().map(|m| row.metric(m.as_ref())).collect();
    if let Some(first) = values.first().copied() {
        values.push(first);
    }
    values
}

/// Spoke angles for a closed polygon of `points` vertices (the last vertex
/// repeats the first, so there are `points - 1` spokes).
pub fn polar_angles(points: usize) -> Vec<f64> {
    let n = points.saturating_sub(1);
    if n == 0 {
        return Vec::new();
    }
    let mut angles: Vec<f64> = (0..n).map(|i| 2.0 * PI * i as f64 / n as f64).collect();
    angles.push(angles[0]);
    angles
}

pub fn normalize(values: &[f64], scales: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values
        .iter()
        .zip(scales)
        .map(|(value, scale)| value / scale)
        .collect();
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

pub fn is_all_zero(values: &[f64]) -> bool {
    values.iter().all(|v| *v == 0.0)
}

pub fn check_scales<S: AsRef<str>>(metrics: &[S], scales: &[f64]) -> ChartResult<()> {
    if metrics.len() != scales.len() {
        return Err(ChartError::DegenerateData(format!(
            "{} metrics but {} scales",
            metrics.len(),
            scales.len()
        )));
    }
    for (metric, scale) in metrics.iter().zip(scales) {
        if !(scale.is_finite() && *scale > 0.0) {
            return Err(ChartError::DegenerateData(format!(
                "metric {:?} has no positive value anywhere in the league",
                metric.as_ref()
            )));
        }
    }
    Ok(())
}

/// `count` evenly spaced ticks from 0 to `scale`. Precision grows as the
/// spacing shrinks so neighbouring ticks never round to the same label.
pub fn tick_values(scale: f64, count: usize) -> Vec<f64> {
    let ticks = linspace(scale, count);
    if count == 0 || !(scale.is_finite() && scale > 0.0) {
        return ticks;
    }

    let mut fraction = scale / count as f64;
    let decimals = if fraction >= 1.0 {
        2
    } else {
        let mut decimals = 0;
        while fraction < 1.0 && decimals < MAX_TICK_DECIMALS {
            fraction *= 10.0;
            decimals += 1;
        }
        decimals + 1
    };
    ticks.into_iter().map(|v| round_to(v, decimals)).collect()
}

pub fn tick_value_lists(scales: &[f64], count: usize) -> Vec<Vec<f64>> {
    scales.iter().map(|s| tick_values(*s, count)).collect()
}

fn linspace(stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = stop / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { stop } else { step * i as f64 })
                .collect()
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Place non-zero ticks along each spoke, spread over the primary outline's
/// radius.
pub fn place_tick_labels(angles: &[f64], tick_values: &[Vec<f64>], primary_normalized: &[f64]) -> Vec<TickLabel> {
    let peak = primary_normalized.iter().copied().fold(0.0, f64::max);
    let radius = peak * TICK_RADIUS_HEADROOM;

    let mut out = Vec::new();
    for (metric_index, (ticks, angle)) in tick_values.iter().zip(angles).enumerate() {
        let step = radius / ticks.len() as f64;
        for (j, value) in ticks.iter().enumerate() {
            if *value == 0.0 {
                continue;
            }
            out.push(TickLabel {
                metric_index,
                angle: *angle,
                radius: step * (j as f64 + 0.5),
                value: *value,
            });
        }
    }
    out
}

/// Metric names sit further out the closer their spoke is to horizontal.
pub fn label_offset(angle: f64) -> f64 {
    let vertical = if angle < (PI - angle).abs() {
        0.0
    } else if (2.0 * PI - angle).abs() < (angle - PI).abs() {
        2.0 * PI
    } else {
        PI
    };
    0.2 * ((angle - vertical).abs() / (PI / 2.0)) + 0.03
}

fn series(row: &LeagueRow, metrics: &[String], scales: &[f64]) -> ChartResult<RadarSeries> {
    let values = closed_values(row, metrics);
    if is_all_zero(&values[..metrics.len()]) {
        return Err(ChartError::DegenerateData(format!(
            "player {} has no data for the requested metrics",
            row.player
        )));
    }
    let normalized = normalize(&values[..metrics.len()], scales);
    Ok(RadarSeries {
        player: row.player.clone(),
        values,
        normalized,
    })
}

pub fn build_projection(
    primary: &LeagueRow,
    compare: Option<&LeagueRow>,
    metrics: &[String],
    scales: &[f64],
    tick_count: usize,
) -> ChartResult<RadarProjection> {
    if metrics.is_empty() {
        return Err(ChartError::DegenerateData("no metrics to project".to_string()));
    }
    check_scales(metrics, scales)?;

    let primary = series(primary, metrics, scales)?;
    let compare = compare.map(|row| series(row, metrics, scales)).transpose()?;

    let angles = polar_angles(primary.values.len());
    let tick_values = tick_value_lists(scales, tick_count);
    let tick_labels = place_tick_labels(&angles, &tick_values, &primary.normalized);
    let label_offsets = angles[..metrics.len()].iter().map(|a| label_offset(*a)).collect();

    Ok(RadarProjection {
        metrics: metrics.to_vec(),
        scales: scales.to_vec(),
        angles,
        primary,
        compare,
        tick_values,
        tick_labels,
        label_offsets,
    })
}

pub fn caption(primary: &LeagueRow, position_long: Option<&str>, compare: Option<&str>) -> RadarCaption {
    let position = position_long.unwrap_or("Player");
    let article = match position.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    let mut subtitle = vec![
        format!(
            "Birth country: {}",
            primary.birth_country.as_deref().unwrap_or("Unknown")
        ),
        format!("Team: {}", primary.team.as_deref().unwrap_or("Unknown")),
        format!(
            "Matches played: {}",
            primary
                .matches_played
                .map(|m| m.to_string())
                .unwrap_or_else(|| "0".to_string())
        ),
    ];
    if let Some(compare) = compare {
        subtitle.push(format!("Compared with {compare}"));
    }
    RadarCaption {
        title: format!("Radar chart for {}, {article} {position}", primary.player),
        subtitle,
    }
}
