pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod line;
pub mod names;
pub mod params;
pub mod pipeline;
pub mod positions;
pub mod radar;
pub mod resolver;
pub mod store;
pub mod tables;
pub mod telemetry;

pub use error::{ChartError, ChartResult, EntityKind};
pub use params::{ChartFamily, RequestParameters, RequestedFamily};
pub use pipeline::{PipelineOptions, ResolvedSpec, build_chart};
pub use tables::{LeagueRow, LeagueTable, MatchHistory, MatchRecord, MemorySource, TableSource};
