use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFamily {
    Radar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedFamily {
    Radar,
    Line,
    Random,
}

impl RequestedFamily {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "radar" => Some(RequestedFamily::Radar),
            "line" => Some(RequestedFamily::Line),
            "random" => Some(RequestedFamily::Random),
            _ => None,
        }
    }

    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> ChartFamily {
        match self {
            RequestedFamily::Radar => ChartFamily::Radar,
            RequestedFamily::Line => ChartFamily::Line,
            RequestedFamily::Random => {
                if rng.gen_bool(0.5) {
                    ChartFamily::Radar
                } else {
                    ChartFamily::Line
                }
            }
        }
    }
}

impl From<ChartFamily> for RequestedFamily {
    fn from(family: ChartFamily) -> Self {
        match family {
            ChartFamily::Radar => RequestedFamily::Radar,
            ChartFamily::Line => RequestedFamily::Line,
        }
    }
}

/// What arrives from the request layer. Only the family is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub family: RequestedFamily,
    pub player: Option<String>,
    pub compare: Option<String>,
    pub league: Option<String>,
    pub stat: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RequestParameters {
    pub fn new(family: impl Into<RequestedFamily>) -> Self {
        Self {
            family: family.into(),
            player: None,
            compare: None,
            league: None,
            stat: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_player(mut self, player: &str) -> Self {
        self.player = non_empty(player);
        self
    }

    pub fn with_compare(mut self, compare: &str) -> Self {
        self.compare = non_empty(compare);
        self
    }

    pub fn with_league(mut self, league: &str) -> Self {
        self.league = non_empty(league);
        self
    }

    pub fn with_stat(mut self, stat: &str) -> Self {
        self.stat = non_empty(stat);
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Builds parameters from a flat form/JSON map. Both the dashed keys of
    /// the HTTP endpoints and underscored variants are accepted.
    pub fn from_map(map: &HashMap<String, String>) -> ChartResult<Self> {
        let lookup = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| map.get(*k))
                .find_map(|v| non_empty(v))
        };

        let raw_family = lookup(&["type", "graph-type", "graph_type"])
            .ok_or_else(|| ChartError::InvalidParameter("missing chart type".to_string()))?;
        let family = RequestedFamily::parse(&raw_family).ok_or_else(|| {
            ChartError::InvalidParameter(format!("unknown chart type: {raw_family}"))
        })?;

        Ok(Self {
            family,
            player: lookup(&["player"]),
            compare: lookup(&["compare"]),
            league: lookup(&["league"]),
            stat: lookup(&["stat"]),
            start_date: parse_date(lookup(&["start-date", "start_date"]))?,
            end_date: parse_date(lookup(&["end-date", "end_date"]))?,
        })
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(raw: Option<String>) -> ChartResult<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ChartError::InvalidParameter(format!("bad date {raw:?}, expected YYYY-MM-DD")))
}
