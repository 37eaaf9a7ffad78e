use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    League,
    Player,
    Compare,
    Metric,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::League => "league",
            EntityKind::Player => "player",
            EntityKind::Compare => "comparison player",
            EntityKind::Metric => "metric",
        };
        f.write_str(label)
    }
}

/// Failures that end a chart request. Malformed match records are not listed
/// here: the windower drops them and keeps going.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("no eligible candidate: {0}")]
    NoEligibleCandidate(String),

    #[error("no data available: {0}")]
    NoData(String),

    #[error("degenerate data: {0}")]
    DegenerateData(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ChartError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        ChartError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

pub type ChartResult<T> = std::result::Result<T, ChartError>;
