use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use statgraph::ingest::{parse_league_rows_json, parse_match_records_json};
use statgraph::line::{season_windows, window_series};
use statgraph::positions::PositionCategory;
use statgraph::radar::{build_projection, tick_values};
use statgraph::{
    ChartFamily, LeagueTable, MatchHistory, MemorySource, PipelineOptions, RequestParameters,
    build_chart,
};

fn bench_league_parse(c: &mut Criterion) {
    c.bench_function("league_rows_parse", |b| {
        b.iter(|| {
            let rows = parse_league_rows_json(black_box(LEAGUE_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_tick_values(c: &mut Criterion) {
    let scales = [0.05, 1.0, 2.84, 63.14, 100.0];
    c.bench_function("tick_values", |b| {
        b.iter(|| {
            for scale in scales {
                black_box(tick_values(black_box(scale), 6));
            }
        })
    });
}

fn bench_projection(c: &mut Criterion) {
    let table = LeagueTable::new("EPL", parse_league_rows_json(LEAGUE_JSON).unwrap()).with_missing_as_zero();
    let metrics: Vec<String> = PositionCategory::CenterBack
        .metrics()
        .iter()
        .map(|m| m.to_string())
        .collect();
    let scales = table.scales(&metrics);
    let primary = table.row_for("R. Dias").unwrap().clone();
    let compare = table.row_for("W. Saliba").unwrap().clone();

    c.bench_function("radar_projection", |b| {
        b.iter(|| {
            let projection = build_projection(&primary, Some(&compare), &metrics, &scales, 6).unwrap();
            black_box(projection.tick_labels.len());
        })
    });
}

fn bench_season_windows(c: &mut Criterion) {
    // Five seasons of 38 matches, newest first.
    let tokens: Vec<u32> = (19..24).rev().flat_map(|y| std::iter::repeat_n(y, 38)).collect();
    c.bench_function("season_windows", |b| {
        b.iter(|| {
            let windows = season_windows(black_box(&tokens));
            black_box(windows.positions.len());
        })
    });

    let history = MatchHistory {
        source: "Player stats E. Haaland".to_string(),
        records: parse_match_records_json(HISTORY_JSON).unwrap(),
    };
    c.bench_function("window_series", |b| {
        b.iter(|| {
            let series = window_series("E. Haaland", black_box(&history), "xG");
            black_box(series.mean);
        })
    });
}

fn bench_build_chart(c: &mut Criterion) {
    let source = MemorySource::new()
        .with_league(LeagueTable::new("epl", parse_league_rows_json(LEAGUE_JSON).unwrap()))
        .with_history(MatchHistory {
            source: "Player stats E. Haaland".to_string(),
            records: parse_match_records_json(HISTORY_JSON).unwrap(),
        });
    let options = PipelineOptions::default();
    let radar = RequestParameters::new(ChartFamily::Radar)
        .with_league("epl")
        .with_player("R. Dias")
        .with_compare("V. van Dijk");
    let line = RequestParameters::new(ChartFamily::Line)
        .with_player("E. Haaland")
        .with_stat("Goals");

    c.bench_function("build_chart_radar_and_line", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            black_box(build_chart(&source, &radar, &options, &mut rng).unwrap());
            black_box(build_chart(&source, &line, &options, &mut rng).unwrap());
        })
    });
}

criterion_group!(
    perf,
    bench_league_parse,
    bench_tick_values,
    bench_projection,
    bench_season_windows,
    bench_build_chart
);
criterion_main!(perf);

static LEAGUE_JSON: &str = include_str!("../tests/fixtures/league_epl.json");
static HISTORY_JSON: &str = include_str!("../tests/fixtures/Player stats E. Haaland.json");
