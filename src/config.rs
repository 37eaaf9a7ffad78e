use std::env;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::pipeline::PipelineOptions;
use crate::radar::DEFAULT_TICK_COUNT;
use crate::resolver::ResolverPolicy;

const CACHE_DIR: &str = "statgraph";
const DB_FILE: &str = "tables.sqlite";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub tick_count: usize,
    pub random_compare: bool,
    pub default_line_league: String,
    pub seed: Option<u64>,
}

impl Config {
    /// Environment (and `.env`, when present) with defaults for anything unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("STATGRAPH_DB")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path);
        let tick_count = env::var("STATGRAPH_TICKS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TICK_COUNT)
            .clamp(2, 20);
        let random_compare = env::var("STATGRAPH_RANDOM_COMPARE")
            .ok()
            .and_then(|val| parse_flag(&val))
            .unwrap_or(true);
        let default_line_league = env::var("STATGRAPH_LINE_LEAGUE")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| "League".to_string());
        let seed = env::var("STATGRAPH_SEED")
            .ok()
            .and_then(|val| val.parse::<u64>().ok());

        Self {
            db_path,
            tick_count,
            random_compare,
            default_line_league,
            seed,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            policy: ResolverPolicy {
                random_compare: self.random_compare,
                default_line_league: self.default_line_league.clone(),
            },
            tick_count: self.tick_count,
        }
    }

    /// Seeded generator when `STATGRAPH_SEED` is set, OS entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

/// `--db <path>` or `--db=<path>` from the command line.
pub fn parse_db_path_arg(args: &[String]) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_loosely() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn db_arg_forms() {
        let args = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            parse_db_path_arg(&args(&["resolve", "--db=/tmp/a.sqlite"])),
            Some(PathBuf::from("/tmp/a.sqlite"))
        );
        assert_eq!(
            parse_db_path_arg(&args(&["--db", "b.sqlite", "type=radar"])),
            Some(PathBuf::from("b.sqlite"))
        );
        assert_eq!(parse_db_path_arg(&args(&["--db"])), None);
    }

    #[test]
    fn seeded_config_is_reproducible() {
        use rand::Rng;

        let cfg = Config {
            db_path: None,
            tick_count: 6,
            random_compare: false,
            default_line_league: "League".to_string(),
            seed: Some(42),
        };
        let a: u64 = cfg.rng().r#gen();
        let b: u64 = cfg.rng().r#gen();
        assert_eq!(a, b);
        assert!(!cfg.pipeline_options().policy.random_compare);
    }
}
