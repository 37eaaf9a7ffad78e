use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of a player's per-match export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub stats: BTreeMap<String, Option<f64>>,
}

impl MatchRecord {
    /// Raw position tokens; a match row may list several, comma-separated.
    pub fn position_tokens(&self) -> impl Iterator<Item = &str> {
        self.position
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchHistory {
    /// Identifier of the export the records came from (usually a file stem).
    pub source: String,
    pub records: Vec<MatchRecord>,
}

impl MatchHistory {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_stat(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.stats.contains_key(name))
    }
}

/// One row of a season league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRow {
    pub player: String,
    pub position: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub matches_played: Option<f64>,
    #[serde(default)]
    pub birth_country: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, Option<f64>>,
}

impl LeagueRow {
    /// League rows separate positions with ", ".
    pub fn position_tokens(&self) -> impl Iterator<Item = &str> {
        self.position
            .split(", ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Metric value with missing cells read as zero.
    pub fn metric(&self, name: &str) -> f64 {
        self.stats.get(name).copied().flatten().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueTable {
    pub name: String,
    pub rows: Vec<LeagueRow>,
}

impl LeagueTable {
    pub fn new(name: impl Into<String>, rows: Vec<LeagueRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_for(&self, player: &str) -> Option<&LeagueRow> {
        self.rows.iter().find(|row| row.player == player)
    }

    pub fn metric_columns(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.stats.keys().map(String::as_str))
            .collect()
    }

    /// Copy of the table where every metric column is present on every row
    /// and absent cells hold `0.0`.
    pub fn with_missing_as_zero(&self) -> LeagueTable {
        let columns: Vec<String> = self.metric_columns().into_iter().map(str::to_string).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                for column in &columns {
                    let cell = row.stats.entry(column.clone()).or_insert(None);
                    if cell.is_none() {
                        *cell = Some(0.0);
                    }
                }
                row
            })
            .collect();
        LeagueTable {
            name: self.name.clone(),
            rows,
        }
    }

    pub fn metric_max(&self, metric: &str) -> f64 {
        self.rows
            .iter()
            .map(|row| row.metric(metric))
            .fold(0.0, f64::max)
    }

    /// League-wide maximum per metric, used as the radial denominator.
    pub fn scales<S: AsRef<str> + Sync>(&self, metrics: &[S]) -> Vec<f64> {
        metrics
            .par_iter()
            .map(|metric| self.metric_max(metric.as_ref()))
            .collect()
    }
}

pub fn league_row_for<'a>(player: &str, table: &'a LeagueTable) -> Option<&'a LeagueRow> {
    table.row_for(player)
}

/// Read side of the spreadsheet layer. Lookups never fail: an unknown name
/// yields an empty table.
pub trait TableSource {
    fn league_names(&self) -> Vec<String>;
    fn league_table(&self, league: &str) -> LeagueTable;
    fn history_sources(&self) -> Vec<String>;
    fn match_history(&self, player: &str) -> MatchHistory;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    leagues: BTreeMap<String, LeagueTable>,
    histories: Vec<MatchHistory>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_league(&mut self, table: LeagueTable) {
        let key = table.name.to_uppercase();
        self.leagues.insert(
            key.clone(),
            LeagueTable {
                name: key,
                rows: table.rows,
            },
        );
    }

    pub fn insert_history(&mut self, history: MatchHistory) {
        self.histories.retain(|h| h.source != history.source);
        self.histories.push(history);
    }

    pub fn with_league(mut self, table: LeagueTable) -> Self {
        self.insert_league(table);
        self
    }

    pub fn with_history(mut self, history: MatchHistory) -> Self {
        self.insert_history(history);
        self
    }
}

impl TableSource for MemorySource {
    fn league_names(&self) -> Vec<String> {
        self.leagues.keys().cloned().collect()
    }

    fn league_table(&self, league: &str) -> LeagueTable {
        self.leagues
            .get(&league.to_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    fn history_sources(&self) -> Vec<String> {
        self.histories.iter().map(|h| h.source.clone()).collect()
    }

    fn match_history(&self, player: &str) -> MatchHistory {
        let player = player.trim();
        if player.is_empty() {
            return MatchHistory::default();
        }
        self.histories
            .iter()
            .find(|h| h.source.contains(player))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(player: &str, stats: &[(&str, Option<f64>)]) -> LeagueRow {
        LeagueRow {
            player: player.to_string(),
            position: "CB".to_string(),
            team: None,
            matches_played: None,
            birth_country: None,
            stats: stats
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    #[test]
    fn zero_fill_adds_missing_columns() {
        let table = LeagueTable::new(
            "EPL",
            vec![
                row("a", &[("Goals per 90", Some(0.4))]),
                row("b", &[("Assists per 90", None)]),
            ],
        );
        let filled = table.with_missing_as_zero();
        let b = filled.row_for("b").expect("row b");
        assert_eq!(b.stats.get("Goals per 90"), Some(&Some(0.0)));
        assert_eq!(b.stats.get("Assists per 90"), Some(&Some(0.0)));
        assert_eq!(filled.scales(&["Goals per 90", "Assists per 90"]), vec![0.4, 0.0]);
    }

    #[test]
    fn memory_source_lookups_are_empty_when_unknown() {
        let source = MemorySource::new()
            .with_league(LeagueTable::new("epl", vec![row("a", &[])]))
            .with_history(MatchHistory {
                source: "Player stats J. Doe".to_string(),
                records: Vec::new(),
            });
        assert_eq!(source.league_names(), vec!["EPL".to_string()]);
        assert_eq!(source.league_table("Epl").rows.len(), 1);
        assert!(source.league_table("LIGA").is_empty());
        assert_eq!(source.match_history("J. Doe").source, "Player stats J. Doe");
        assert!(source.match_history("Nobody").source.is_empty());
        assert!(source.match_history("").source.is_empty());
    }

    #[test]
    fn league_row_positions_split_on_comma_space() {
        let mut r = row("a", &[]);
        r.position = "RCB, LCB3".to_string();
        assert_eq!(r.position_tokens().collect::<Vec<_>>(), vec!["RCB", "LCB3"]);
        assert!(league_row_for("a", &LeagueTable::new("x", vec![r.clone()])).is_some());
    }
}
