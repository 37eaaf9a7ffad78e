use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use statgraph::config::{self, Config};
use statgraph::{RequestParameters, build_chart, export, store, telemetry};

const USAGE: &str = "usage: statgraph [--db <path>] [--xlsx <path>] type=<radar|line|random> [player=..] [compare=..] [league=..] [stat=..] [start-date=YYYY-MM-DD] [end-date=YYYY-MM-DD]";

fn main() -> Result<()> {
    telemetry::init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let cfg = Config::from_env();
    let db_path = config::parse_db_path_arg(&args)
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let xlsx_path = parse_xlsx_arg(&args);

    let map = parse_param_pairs(&args)?;
    let request = RequestParameters::from_map(&map)?;

    let conn = store::open_db(&db_path)?;
    let source = store::load_snapshot(&conn)
        .with_context(|| format!("load tables from {}", db_path.display()))?;

    let mut rng = cfg.rng();
    let spec = build_chart(&source, &request, &cfg.pipeline_options(), &mut rng)?;

    println!("{}", export::to_json(&spec)?);
    if let Some(path) = xlsx_path {
        export::write_workbook(&path, &spec)?;
        eprintln!("Workbook written to {}", path.display());
    }
    Ok(())
}

/// Collects `key=value` arguments; flags and their values are skipped.
fn parse_param_pairs(args: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" || arg == "--xlsx" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got {arg:?}\n{USAGE}"))?;
        map.insert(key.trim().to_string(), value.to_string());
    }
    Ok(map)
}

fn parse_xlsx_arg(args: &[String]) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--xlsx=") {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path.trim()));
            }
        }
        if arg == "--xlsx" {
            if let Some(next) = args.get(idx + 1) {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
