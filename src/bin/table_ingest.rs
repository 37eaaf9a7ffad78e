use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use statgraph::config::{self, Config};
use statgraph::{ingest, store, telemetry};

const USAGE: &str = "usage: table_ingest [--db <path>] (league <NAME> <rows.json> | history <rows.json> [source])";

fn main() -> Result<()> {
    telemetry::init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = Config::from_env();
    let db_path = config::parse_db_path_arg(&args)
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let positional = positional_args(&args);

    let mut conn = store::open_db(&db_path)?;
    let summary = match positional.as_slice() {
        ["league", name, file] => {
            let rows = ingest::parse_league_rows_json(&read(file)?)?;
            store::import_league(&mut conn, name, &rows)?
        }
        ["history", file, rest @ ..] => {
            let source = match rest {
                [source] => source.to_string(),
                [] => source_from_path(Path::new(file))?,
                _ => return Err(anyhow!("{USAGE}")),
            };
            let records = ingest::parse_match_records_json(&read(file)?)?;
            store::import_history(&mut conn, &source, &records)?
        }
        _ => return Err(anyhow!("{USAGE}")),
    };

    println!("Import complete");
    println!("DB: {}", db_path.display());
    println!("{}: {}", summary.kind, summary.name);
    println!("Rows written: {}", summary.rows_written);
    Ok(())
}

fn positional_args(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn read(file: &str) -> Result<String> {
    fs::read_to_string(PathBuf::from(file)).with_context(|| format!("read {file}"))
}

// Export files are named after the player ("Player stats L. Messi.json").
fn source_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive source name from {}", path.display()))
}
