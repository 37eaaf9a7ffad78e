use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ChartError, ChartResult, EntityKind};
use crate::line::{self, DateMarkers, LineSeries};
use crate::params::{ChartFamily, RequestParameters};
use crate::positions::{self, majority_position, primary_position};
use crate::radar::{self, RadarCaption, RadarProjection};
use crate::resolver::{self, ResolvedParams, ResolverPolicy};
use crate::tables::{LeagueRow, LeagueTable, TableSource};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub policy: ResolverPolicy,
    pub tick_count: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            policy: ResolverPolicy::default(),
            tick_count: radar::DEFAULT_TICK_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub code: String,
    pub long: Option<String>,
    pub short: Option<String>,
}

impl PositionInfo {
    fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            long: positions::category_long(code).map(str::to_string),
            short: positions::category_short(code).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSpec {
    pub league: String,
    pub player: String,
    pub compare: Option<String>,
    pub position: PositionInfo,
    pub primary_row: LeagueRow,
    pub compare_row: Option<LeagueRow>,
    pub projection: RadarProjection,
    pub caption: RadarCaption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub league: String,
    pub player: String,
    pub compare: Option<String>,
    pub stat: String,
    pub position: Option<PositionInfo>,
    pub primary: LineSeries,
    pub compare_series: Option<LineSeries>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub markers: DateMarkers,
}

/// Render-ready chart description handed to the drawing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedSpec {
    Radar(RadarSpec),
    Line(LineSpec),
}

impl ResolvedSpec {
    pub fn family(&self) -> ChartFamily {
        match self {
            ResolvedSpec::Radar(_) => ChartFamily::Radar,
            ResolvedSpec::Line(_) => ChartFamily::Line,
        }
    }

    pub fn player(&self) -> &str {
        match self {
            ResolvedSpec::Radar(spec) => &spec.player,
            ResolvedSpec::Line(spec) => &spec.player,
        }
    }

    pub fn league(&self) -> &str {
        match self {
            ResolvedSpec::Radar(spec) => &spec.league,
            ResolvedSpec::Line(spec) => &spec.league,
        }
    }

    pub fn compare(&self) -> Option<&str> {
        match self {
            ResolvedSpec::Radar(spec) => spec.compare.as_deref(),
            ResolvedSpec::Line(spec) => spec.compare.as_deref(),
        }
    }
}

/// Resolve missing parameters, fetch the entities and compute the chart
/// geometry. Any failure aborts the whole request.
pub fn build_chart<S, R>(
    source: &S,
    request: &RequestParameters,
    options: &PipelineOptions,
    rng: &mut R,
) -> ChartResult<ResolvedSpec>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let resolved = resolver::resolve(source, request, &options.policy, rng)?;
    let spec = match resolved.family {
        ChartFamily::Radar => ResolvedSpec::Radar(build_radar(source, resolved, options.tick_count)?),
        ChartFamily::Line => ResolvedSpec::Line(build_line(source, resolved)?),
    };
    info!(
        family = ?spec.family(),
        player = spec.player(),
        league = spec.league(),
        compare = spec.compare().unwrap_or("-"),
        "chart resolved"
    );
    Ok(spec)
}

fn build_radar<S>(source: &S, resolved: ResolvedParams, tick_count: usize) -> ChartResult<RadarSpec>
where
    S: TableSource + ?Sized,
{
    let table = match resolved.league_table {
        Some(table) => table,
        None => load_league(source, &resolved.league)?,
    };

    let primary_row = table
        .row_for(&resolved.player)
        .cloned()
        .ok_or_else(|| ChartError::not_found(EntityKind::Player, resolved.player.clone()))?;
    let compare_row = match &resolved.compare {
        Some(compare) => Some(
            table
                .row_for(compare)
                .cloned()
                .ok_or_else(|| ChartError::not_found(EntityKind::Compare, compare.clone()))?,
        ),
        None => None,
    };

    let code = primary_position(&primary_row).ok_or_else(|| {
        ChartError::NoData(format!("player {} has no position listed", primary_row.player))
    })?;
    let position = PositionInfo::from_code(code);
    let metrics: Vec<String> = position
        .short
        .as_deref()
        .and_then(positions::metrics_for)
        .ok_or_else(|| ChartError::NoData(format!("no radar metrics for position {code}")))?
        .iter()
        .map(|m| m.to_string())
        .collect();

    let scales = table.scales(&metrics);
    let projection = radar::build_projection(
        &primary_row,
        compare_row.as_ref(),
        &metrics,
        &scales,
        tick_count,
    )?;
    let caption = radar::caption(&primary_row, position.long.as_deref(), resolved.compare.as_deref());

    Ok(RadarSpec {
        league: resolved.league,
        player: resolved.player,
        compare: resolved.compare,
        position,
        primary_row,
        compare_row,
        projection,
        caption,
    })
}

fn load_league<S>(source: &S, league: &str) -> ChartResult<LeagueTable>
where
    S: TableSource + ?Sized,
{
    let table = source.league_table(league);
    if table.is_empty() {
        return Err(ChartError::not_found(EntityKind::League, league));
    }
    Ok(table.with_missing_as_zero())
}

fn build_line<S>(source: &S, resolved: ResolvedParams) -> ChartResult<LineSpec>
where
    S: TableSource + ?Sized,
{
    let stat = resolved
        .stat
        .clone()
        .ok_or_else(|| ChartError::InvalidParameter("line chart without a stat".to_string()))?;

    let history = source.match_history(&resolved.player);
    if history.is_empty() {
        return Err(ChartError::not_found(EntityKind::Player, resolved.player.clone()));
    }
    if !history.has_stat(&stat) {
        return Err(ChartError::not_found(EntityKind::Metric, stat));
    }

    let position = majority_position(&history.records).map(PositionInfo::from_code);
    let primary = line::window_series(&resolved.player, &history, &stat);
    if primary.points.is_empty() {
        return Err(ChartError::DegenerateData(format!(
            "no dated matches for {}",
            resolved.player
        )));
    }

    let compare_series = match &resolved.compare {
        Some(compare) => {
            let history = source.match_history(compare);
            if history.is_empty() {
                return Err(ChartError::not_found(EntityKind::Compare, compare.clone()));
            }
            Some(line::window_series(compare, &history, &stat))
        }
        None => None,
    };

    let markers = line::date_markers(&primary.points, resolved.start_date, resolved.end_date);

    Ok(LineSpec {
        league: resolved.league,
        player: resolved.player,
        compare: resolved.compare,
        stat,
        position,
        primary,
        compare_series,
        start_date: resolved.start_date,
        end_date: resolved.end_date,
        markers,
    })
}
