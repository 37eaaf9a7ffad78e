use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{ChartError, ChartResult, EntityKind};
use crate::names::display_name_from_source;
use crate::params::{ChartFamily, RequestParameters};
use crate::positions::{self, primary_position};
use crate::radar::{closed_values, is_all_zero};
use crate::tables::{LeagueRow, LeagueTable, MatchHistory, TableSource};

/// Per-match columns a line chart can be drawn for.
pub const LINE_STAT_CATALOG: [&str; 47] = [
    "Minutes played",
    "Total actions / successful",
    "Goals",
    "Assists",
    "Shots / on target",
    "xG",
    "Passes / accurate",
    "Long passes / accurate",
    "Crosses / accurate",
    "Dribbles / successful",
    "Duels / won",
    "Aerial duels / won",
    "Interceptions",
    "Losses / own half",
    "Recoveries / opp. half",
    "Yellow card",
    "Red card",
    "Defensive duels / won",
    "Loose ball duels / won",
    "Sliding tackles / successful",
    "Clearances",
    "Fouls",
    "Yellow cards",
    "Red cards",
    "Shot assists",
    "Offensive duels / won",
    "Touches in penalty area",
    "Offsides",
    "Progressive runs",
    "Fouls suffered",
    "Through passes / accurate",
    "xA",
    "Second assists",
    "Passes to final third / accurate",
    "Passes to penalty area / accurate",
    "Received passes",
    "Forward passes / accurate",
    "Back passes / accurate",
    "Conceded goals",
    "xCG",
    "Shots against",
    "Saves / with reflexes",
    "Exits",
    "Passes to GK / accurate",
    "Goal kicks",
    "Short goal kicks",
    "Long goal kicks",
];

#[derive(Debug, Clone)]
pub struct ResolverPolicy {
    /// Radar requests without `compare` get a random same-role opponent.
    pub random_compare: bool,
    /// League label for line charts when none was requested.
    pub default_line_league: String,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            random_compare: true,
            default_line_league: "League".to_string(),
        }
    }
}

/// Request with every field the chosen family needs filled in.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub family: ChartFamily,
    pub league: String,
    pub player: String,
    pub compare: Option<String>,
    pub stat: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Zero-filled league table, materialised once for radar requests.
    pub league_table: Option<LeagueTable>,
}

pub fn resolve<S, R>(
    source: &S,
    request: &RequestParameters,
    policy: &ResolverPolicy,
    rng: &mut R,
) -> ChartResult<ResolvedParams>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let family = request.family.pick(rng);
    debug!(?family, "resolving chart parameters");
    match family {
        ChartFamily::Radar => resolve_radar(source, request, policy, rng),
        ChartFamily::Line => resolve_line(source, request, policy, rng),
    }
}

fn resolve_radar<S, R>(
    source: &S,
    request: &RequestParameters,
    policy: &ResolverPolicy,
    rng: &mut R,
) -> ChartResult<ResolvedParams>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let league = match &request.league {
        Some(league) => league.to_uppercase(),
        None => random_league(source, rng)?,
    };

    let table = source.league_table(&league);
    if table.is_empty() {
        return Err(ChartError::not_found(EntityKind::League, league));
    }
    let table = table.with_missing_as_zero();

    let player = match &request.player {
        Some(player) => player.clone(),
        None => random_league_player(&table, rng)?,
    };

    let compare = match &request.compare {
        Some(compare) => Some(compare.clone()),
        None if policy.random_compare => Some(random_compare(&table, &player, rng)?),
        None => None,
    };

    Ok(ResolvedParams {
        family: ChartFamily::Radar,
        league,
        player,
        compare,
        stat: None,
        start_date: request.start_date,
        end_date: request.end_date,
        league_table: Some(table),
    })
}

fn resolve_line<S, R>(
    source: &S,
    request: &RequestParameters,
    policy: &ResolverPolicy,
    rng: &mut R,
) -> ChartResult<ResolvedParams>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let league = request
        .league
        .as_ref()
        .map(|l| l.to_uppercase())
        .unwrap_or_else(|| policy.default_line_league.clone());

    let player = match &request.player {
        Some(player) => player.clone(),
        None => random_history_player(source, rng)?,
    };

    let stat = match &request.stat {
        Some(stat) => stat.clone(),
        None => {
            let history = source.match_history(&player);
            if history.is_empty() {
                return Err(ChartError::not_found(EntityKind::Player, player));
            }
            random_stat(&history, rng)?
        }
    };

    Ok(ResolvedParams {
        family: ChartFamily::Line,
        league,
        player,
        compare: request.compare.clone(),
        stat: Some(stat),
        start_date: request.start_date,
        end_date: request.end_date,
        league_table: None,
    })
}

pub fn random_league<S, R>(source: &S, rng: &mut R) -> ChartResult<String>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let leagues = source.league_names();
    let league = leagues
        .choose(rng)
        .cloned()
        .ok_or_else(|| ChartError::NoData("no league tables available".to_string()))?;
    debug!(%league, "picked random league");
    Ok(league)
}

/// Random row that can be drawn: known position and some data for its role.
pub fn random_league_player<R: Rng + ?Sized>(table: &LeagueTable, rng: &mut R) -> ChartResult<String> {
    if table.rows.is_empty() {
        return Err(ChartError::NoData(format!("league {} has no rows", table.name)));
    }
    let plottable: Vec<&LeagueRow> = table
        .rows
        .iter()
        .filter(|row| role_metrics(row).is_some_and(|metrics| has_data_for(row, metrics)))
        .collect();
    let row = plottable.choose(rng).ok_or_else(|| {
        ChartError::NoEligibleCandidate(format!(
            "no player in {} has data for their position",
            table.name
        ))
    })?;
    debug!(player = %row.player, "picked random player from league table");
    Ok(row.player.clone())
}

pub fn random_history_player<S, R>(source: &S, rng: &mut R) -> ChartResult<String>
where
    S: TableSource + ?Sized,
    R: Rng + ?Sized,
{
    let sources = source.history_sources();
    let picked = sources
        .choose(rng)
        .ok_or_else(|| ChartError::NoData("no match histories available".to_string()))?;
    let player = display_name_from_source(picked);
    if player.is_empty() {
        return Err(ChartError::NoData(format!(
            "match history {picked:?} has no usable player name"
        )));
    }
    debug!(%player, source = %picked, "picked random match history");
    Ok(player)
}

/// Catalog stat that `history` actually records.
pub fn random_stat<R: Rng + ?Sized>(history: &MatchHistory, rng: &mut R) -> ChartResult<String> {
    let available: Vec<&str> = LINE_STAT_CATALOG
        .iter()
        .copied()
        .filter(|stat| history.has_stat(stat))
        .collect();
    let stat = available.choose(rng).ok_or_else(|| {
        ChartError::NoEligibleCandidate(format!(
            "match history {} has no charted stat",
            history.source
        ))
    })?;
    debug!(%stat, "picked random stat");
    Ok(stat.to_string())
}

fn role_metrics(row: &LeagueRow) -> Option<&'static [&'static str]> {
    primary_position(row)
        .and_then(positions::category_short)
        .and_then(positions::metrics_for)
}

fn has_data_for(row: &LeagueRow, metrics: &[&str]) -> bool {
    !is_all_zero(&closed_values(row, metrics))
}

/// Rows that play the same role as `primary` and have data for its metrics,
/// excluding `primary` itself.
pub fn comparison_candidates<'a>(table: &'a LeagueTable, primary: &LeagueRow) -> Vec<&'a LeagueRow> {
    let Some(code) = primary_position(primary) else {
        return Vec::new();
    };
    let role = positions::category(code);
    let metrics = role_metrics(primary);
    table
        .rows
        .iter()
        .filter(|row| row.player != primary.player)
        .filter(|row| match role {
            Some(role) => row
                .position_tokens()
                .any(|token| positions::category(token) == Some(role)),
            None => row.position.contains(code),
        })
        .filter(|row| metrics.is_none_or(|metrics| has_data_for(row, metrics)))
        .collect()
}

pub fn random_compare<R: Rng + ?Sized>(
    table: &LeagueTable,
    player: &str,
    rng: &mut R,
) -> ChartResult<String> {
    let primary = table
        .row_for(player)
        .ok_or_else(|| ChartError::not_found(EntityKind::Player, player))?;
    let candidates = comparison_candidates(table, primary);
    let picked = candidates.choose(rng).ok_or_else(|| {
        ChartError::NoEligibleCandidate(format!(
            "no other player in {} shares the position of {player}",
            table.name
        ))
    })?;
    debug!(compare = %picked.player, "picked random comparison player");
    Ok(picked.player.clone())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::params::RequestedFamily;
    use crate::positions::PositionCategory;
    use crate::tables::{MatchRecord, MemorySource};

    fn row(player: &str, position: &str) -> LeagueRow {
        let mut stats: BTreeMap<String, Option<f64>> = PositionCategory::CenterBack
            .metrics()
            .iter()
            .chain(PositionCategory::Striker.metrics())
            .map(|metric| (metric.to_string(), Some(1.0)))
            .collect();
        stats.insert("Goals per 90".to_string(), None);
        LeagueRow {
            player: player.to_string(),
            position: position.to_string(),
            team: None,
            matches_played: None,
            birth_country: None,
            stats,
        }
    }

    fn empty_row(player: &str, position: &str) -> LeagueRow {
        LeagueRow {
            stats: BTreeMap::new(),
            ..row(player, position)
        }
    }

    fn match_record(date: &str, stats: &[&str]) -> MatchRecord {
        MatchRecord {
            date: date.to_string(),
            position: "RCB".to_string(),
            stats: stats.iter().map(|s| (s.to_string(), Some(1.0))).collect(),
        }
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with_league(LeagueTable::new(
                "epl",
                vec![
                    row("A", "RCB, CB"),
                    row("B", "LCB3"),
                    row("C", "CF"),
                    row("D", "CB"),
                    empty_row("E", "CB"),
                ],
            ))
            .with_history(MatchHistory {
                source: "Player stats A (1)".to_string(),
                records: vec![
                    match_record("2023-05-01", &["Goals", "xG", "Tackles won"]),
                    match_record("2023-04-20", &["Goals"]),
                ],
            })
    }

    #[test]
    fn compare_is_never_the_primary() {
        let table = source().league_table("EPL");
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = random_compare(&table, "A", &mut rng).expect("candidate");
            assert_ne!(picked, "A");
            assert!(picked == "B" || picked == "D");
        }
    }

    #[test]
    fn lone_role_has_no_comparison() {
        let table = source().league_table("EPL");
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            random_compare(&table, "C", &mut rng),
            Err(ChartError::NoEligibleCandidate(_))
        ));
        assert!(matches!(
            random_compare(&table, "Z", &mut rng),
            Err(ChartError::NotFound { kind: EntityKind::Player, .. })
        ));
    }

    #[test]
    fn explicit_values_are_kept() {
        let request = RequestParameters::new(ChartFamily::Radar)
            .with_league("epl")
            .with_player("A")
            .with_compare("C");
        let mut rng = StdRng::seed_from_u64(1);
        let resolved = resolve(&source(), &request, &ResolverPolicy::default(), &mut rng)
            .expect("resolved");
        assert_eq!(resolved.league, "EPL");
        assert_eq!(resolved.player, "A");
        assert_eq!(resolved.compare.as_deref(), Some("C"));
        let table = resolved.league_table.expect("cached table");
        assert_eq!(table.row_for("C").and_then(|r| r.stats["Goals per 90"]), Some(0.0));

        let request = RequestParameters::new(ChartFamily::Line)
            .with_league("epl")
            .with_player("A")
            .with_stat("Goals");
        let resolved = resolve(&source(), &request, &ResolverPolicy::default(), &mut rng)
            .expect("resolved");
        assert_eq!(resolved.family, ChartFamily::Line);
        assert_eq!(resolved.stat.as_deref(), Some("Goals"));
        assert_eq!(resolved.compare, None);
    }

    #[test]
    fn missing_values_are_filled_from_data() {
        let mut rng = StdRng::seed_from_u64(3);
        let resolved = resolve(
            &source(),
            &RequestParameters::new(ChartFamily::Line),
            &ResolverPolicy::default(),
            &mut rng,
        )
        .expect("resolved");
        assert_eq!(resolved.player, "A");
        assert_eq!(resolved.league, "League");
        let stat = resolved.stat.as_deref().unwrap_or_default();
        assert!(stat == "Goals" || stat == "xG");

        let resolved = resolve(
            &source(),
            &RequestParameters::new(ChartFamily::Radar),
            &ResolverPolicy::default(),
            &mut rng,
        );
        match resolved {
            Ok(resolved) => {
                assert_eq!(resolved.league, "EPL");
                assert_ne!(resolved.player, "E");
                assert_ne!(resolved.compare.as_deref(), Some(resolved.player.as_str()));
            }
            // "C" is the only striker.
            Err(ChartError::NoEligibleCandidate(_)) => {}
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn random_picks_skip_rows_without_data() {
        let table = source().league_table("EPL").with_missing_as_zero();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_ne!(random_compare(&table, "A", &mut rng).expect("candidate"), "E");
            assert_ne!(random_league_player(&table, &mut rng).expect("player"), "E");
        }

        let blank = LeagueTable::new("EPL", vec![empty_row("E", "CB"), empty_row("F", "RCB")]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            random_league_player(&blank, &mut rng),
            Err(ChartError::NoEligibleCandidate(_))
        ));
    }

    #[test]
    fn random_stat_comes_from_the_history() {
        let history = MatchHistory {
            source: "Player stats A (1)".to_string(),
            records: vec![match_record("2023-05-01", &["xG", "Tackles won"])],
        };
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(random_stat(&history, &mut rng).expect("stat"), "xG");

        let uncharted = MatchHistory {
            source: "Player stats B".to_string(),
            records: vec![match_record("2023-05-01", &["Tackles won"])],
        };
        assert!(matches!(
            random_stat(&uncharted, &mut rng),
            Err(ChartError::NoEligibleCandidate(_))
        ));
    }

    #[test]
    fn empty_source_reports_no_data() {
        let empty = MemorySource::new();
        let mut rng = StdRng::seed_from_u64(0);
        for family in [RequestedFamily::Radar, RequestedFamily::Line] {
            let err = resolve(&empty, &RequestParameters::new(family), &ResolverPolicy::default(), &mut rng)
                .expect_err("no data");
            assert!(matches!(err, ChartError::NoData(_)));
        }
    }

    #[test]
    fn unknown_league_is_not_found() {
        let request = RequestParameters::new(ChartFamily::Radar).with_league("serie a");
        let mut rng = StdRng::seed_from_u64(0);
        let err = resolve(&source(), &request, &ResolverPolicy::default(), &mut rng).expect_err("missing");
        assert!(matches!(err, ChartError::NotFound { kind: EntityKind::League, .. }));
    }
}
