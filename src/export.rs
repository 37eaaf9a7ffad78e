use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::line::LineSeries;
use crate::pipeline::{LineSpec, RadarSpec, ResolvedSpec};

pub fn to_json(spec: &ResolvedSpec) -> Result<String> {
    serde_json::to_string_pretty(spec).context("serialize resolved chart")
}

/// Chart data as a workbook: a summary sheet plus one data sheet.
pub fn write_workbook(path: &Path, spec: &ResolvedSpec) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows(spec))?;
    }
    {
        let sheet = workbook.add_worksheet();
        match spec {
            ResolvedSpec::Radar(radar) => {
                sheet.set_name("Radar")?;
                write_rows(sheet, &radar_rows(radar))?;
            }
            ResolvedSpec::Line(line) => {
                sheet.set_name("Line")?;
                write_rows(sheet, &line_rows(line))?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn summary_rows(spec: &ResolvedSpec) -> Vec<Vec<String>> {
    let family = match spec {
        ResolvedSpec::Radar(_) => "radar",
        ResolvedSpec::Line(_) => "line",
    };
    let mut rows = vec![
        vec!["Field".to_string(), "Value".to_string()],
        vec!["Type".to_string(), family.to_string()],
        vec!["League".to_string(), spec.league().to_string()],
        vec!["Player".to_string(), spec.player().to_string()],
        vec!["Compare".to_string(), spec.compare().unwrap_or_default().to_string()],
    ];
    match spec {
        ResolvedSpec::Radar(radar) => {
            rows.push(vec!["Position".to_string(), radar.position.code.clone()]);
            rows.push(vec!["Title".to_string(), radar.caption.title.clone()]);
        }
        ResolvedSpec::Line(line) => {
            rows.push(vec!["Stat".to_string(), line.stat.clone()]);
            rows.push(vec!["Start date".to_string(), opt_to_string(line.start_date)]);
            rows.push(vec!["End date".to_string(), opt_to_string(line.end_date)]);
        }
    }
    rows
}

fn radar_rows(spec: &RadarSpec) -> Vec<Vec<String>> {
    let projection = &spec.projection;
    let mut rows = vec![vec![
        "Metric".to_string(),
        "Scale".to_string(),
        "Angle".to_string(),
        spec.player.clone(),
        format!("{} (normalized)", spec.player),
        spec.compare.clone().unwrap_or_default(),
        "Compare (normalized)".to_string(),
        "Ticks".to_string(),
    ]];
    for (idx, metric) in projection.metrics.iter().enumerate() {
        let compare = projection.compare.as_ref();
        rows.push(vec![
            metric.clone(),
            projection.scales[idx].to_string(),
            projection.angles[idx].to_string(),
            projection.primary.values[idx].to_string(),
            projection.primary.normalized[idx].to_string(),
            opt_to_string(compare.map(|c| c.values[idx])),
            opt_to_string(compare.map(|c| c.normalized[idx])),
            projection.tick_values[idx]
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ]);
    }
    rows
}

fn line_rows(spec: &LineSpec) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Series".to_string(),
        "Date".to_string(),
        "X".to_string(),
        spec.stat.clone(),
    ]];
    series_rows(&mut rows, &spec.primary);
    if let Some(compare) = &spec.compare_series {
        series_rows(&mut rows, compare);
    }
    rows.push(Vec::new());
    rows.push(vec![
        "Season".to_string(),
        "Label position".to_string(),
        "Starts at".to_string(),
    ]);
    let seasons = &spec.primary.seasons;
    for (idx, label) in seasons.labels.iter().enumerate() {
        rows.push(vec![
            label.clone(),
            seasons.positions[idx].to_string(),
            seasons.boundaries[idx].to_string(),
        ]);
    }
    rows
}

fn series_rows(rows: &mut Vec<Vec<String>>, series: &LineSeries) {
    for point in &series.points {
        rows.push(vec![
            series.player.clone(),
            point.date.clone(),
            point.x.to_string(),
            opt_to_string(point.value),
        ]);
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
