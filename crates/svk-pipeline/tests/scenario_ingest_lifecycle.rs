//! Scenario: ingest runs against a real data directory.
//!
//! GREEN when:
//! - a first daily run creates the store, a raw archive, and the state file
//! - a duplicated, unordered first batch is stored deduplicated and sorted
//! - a re-scrape of an overlapping window overrides stored values
//! - a producer failure leaves the store byte-identical and exits clean
//! - no store plus no data is "could not run"
//! - weekly fills recent gaps one date at a time, skipping failed dates
//! - an unreadable store aborts before anything is written

use std::fs;
use std::path::Path;

use svk_config::Settings;
use svk_pipeline::{run_ingest, IngestPlan, PipelineContext, RunStatus};
use svk_records::{csv_store, Record, RecordSet, FORECAST_COLUMN};
use svk_store::{read_state, RunMetadata, StoreGateway, StoreLayout};
use svk_testkit::{
    date, hourly_days, with_values, without_date, FailingProducer, RecordingProducer,
    StaticProducer,
};

fn ctx(root: &Path, today: chrono::NaiveDate) -> PipelineContext {
    let mut settings = Settings::default();
    settings.paths.data_dir = root.join("data");
    settings.paths.report_dir = root.join("reports");
    PipelineContext {
        settings,
        config_hash: "test-hash".to_string(),
        today,
        run: RunMetadata::local(),
    }
}

fn gateway(ctx: &PipelineContext) -> StoreGateway {
    StoreGateway::new(StoreLayout::from_settings(&ctx.settings))
}

fn raw_files(data_dir: &Path) -> usize {
    fs::read_dir(data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("raw_"))
        .count()
}

#[test]
fn scenario_first_daily_run_creates_store_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let today = date(2024, 3, 10);
    let ctx = ctx(dir.path(), today);
    let producer = StaticProducer::new(hourly_days(date(2024, 3, 1), 10));

    let out = run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &producer).unwrap();
    assert_eq!(out.status, RunStatus::Clean);
    assert_eq!(out.records_obtained, 72);
    assert_eq!(out.total_records, 72);
    assert!(out.saved.as_ref().unwrap().backup.is_none());
    assert_eq!(raw_files(&ctx.settings.paths.data_dir), 1);

    let store = gateway(&ctx).load().unwrap();
    assert_eq!(store.len(), 72);
    assert!(store.is_canonical());

    let state = read_state(&ctx.settings.paths.state_path()).unwrap().unwrap();
    assert_eq!(state.total_records, 72);
    assert_eq!(state.date_range.start, Some(date(2024, 3, 8)));
    assert_eq!(state.date_range.end, Some(today));
    assert_eq!(state.ingest_id, out.ingest_id);
    assert_eq!(state.config_hash, "test-hash");
    assert_eq!(state.github_run_id, "local");
}

#[test]
fn scenario_first_batch_with_retries_is_stored_canonical() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path(), date(2024, 3, 10));
    let batch = RecordSet::from_records(vec![
        Record::new("2024-03-10", "5").with_field(FORECAST_COLUMN, "100"),
        Record::new("2024-03-09", "1").with_field(FORECAST_COLUMN, "1"),
        Record::new("2024-03-10", "5").with_field(FORECAST_COLUMN, "200"),
    ]);

    let producer = StaticProducer::new(batch);
    let out = run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &producer).unwrap();
    assert_eq!(out.status, RunStatus::Clean);
    assert_eq!(out.records_obtained, 3);
    assert_eq!(out.total_records, 2);

    let stored = csv_store::read_path(&ctx.settings.paths.master_path()).unwrap();
    assert!(stored.is_canonical());
    let rows: Vec<_> = stored
        .iter()
        .map(|r| (r.date.clone(), r.hour.clone(), r.forecast_mw()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2024-03-09".to_string(), "1".to_string(), Some(1.0)),
            ("2024-03-10".to_string(), "5".to_string(), Some(200.0)),
        ]
    );

    let state = read_state(&ctx.settings.paths.state_path()).unwrap().unwrap();
    assert_eq!(state.total_records, 2);
}

#[test]
fn scenario_rescrape_overrides_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let ctx1 = ctx(dir.path(), date(2024, 3, 10));
    let first = StaticProducer::new(hourly_days(date(2024, 3, 1), 10));
    run_ingest(&ctx1, IngestPlan::Daily { days: 3 }, &first).unwrap();

    // Next day: values for 2024-03-10 were corrected upstream.
    let ctx2 = ctx(dir.path(), date(2024, 3, 11));
    let corrected = with_values(
        &hourly_days(date(2024, 3, 1), 11),
        date(2024, 3, 10),
        FORECAST_COLUMN,
        "999",
    );
    let out = run_ingest(&ctx2, IngestPlan::Daily { days: 3 }, &StaticProducer::new(corrected))
        .unwrap();
    assert_eq!(out.total_records, 4 * 24);
    assert!(out.saved.as_ref().unwrap().backup.is_some());

    let store = gateway(&ctx2).load().unwrap();
    let day10: Vec<f64> = store
        .iter()
        .filter(|r| r.parsed_date() == Some(date(2024, 3, 10)))
        .filter_map(|r| r.forecast_mw())
        .collect();
    assert_eq!(day10.len(), 24);
    assert!(day10.iter().all(|v| *v == 999.0));
}

#[test]
fn scenario_producer_failure_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path(), date(2024, 3, 10));
    run_ingest(
        &ctx,
        IngestPlan::Daily { days: 3 },
        &StaticProducer::new(hourly_days(date(2024, 3, 8), 3)),
    )
    .unwrap();
    let master = ctx.settings.paths.master_path();
    let before = fs::read(&master).unwrap();

    let out = run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &FailingProducer::unavailable())
        .unwrap();
    assert_eq!(out.status, RunStatus::Clean);
    assert_eq!(out.failed.len(), 1);
    assert!(out.saved.is_none());
    assert_eq!(fs::read(&master).unwrap(), before);
    assert_eq!(raw_files(&ctx.settings.paths.data_dir), 1);
}

#[test]
fn scenario_no_store_and_no_data_could_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path(), date(2024, 3, 10));

    let empty = run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &StaticProducer::empty()).unwrap();
    assert_eq!(empty.status, RunStatus::CouldNotRun);

    let failing =
        run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &FailingProducer::unavailable()).unwrap();
    assert_eq!(failing.status, RunStatus::CouldNotRun);
    assert!(!ctx.settings.paths.master_path().exists());
}

#[test]
fn scenario_weekly_fills_gaps_and_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    let today = date(2024, 4, 30);
    let ctx = ctx(dir.path(), today);

    let upstream = hourly_days(date(2024, 3, 31), 31);
    let mut stored = upstream.clone();
    for d in [2, 4, 6, 8, 10, 12] {
        stored = without_date(&stored, date(2024, 4, d));
    }
    let backfill = IngestPlan::Custom {
        days: 31,
        start: Some(date(2024, 3, 31)),
    };
    run_ingest(&ctx, backfill, &StaticProducer::new(stored)).unwrap();

    let producer = RecordingProducer::new(upstream).failing_on(date(2024, 4, 4));
    let plan = IngestPlan::Weekly {
        days_back: 30,
        max_dates: 5,
    };
    let out = run_ingest(&ctx, plan, &producer).unwrap();

    let asked: Vec<_> = producer.requests().iter().map(|r| r.start).collect();
    assert_eq!(
        asked,
        vec![
            date(2024, 4, 2),
            date(2024, 4, 4),
            date(2024, 4, 6),
            date(2024, 4, 8),
            date(2024, 4, 10),
        ]
    );
    assert_eq!(out.failed.len(), 1);
    assert_eq!(out.records_obtained, 4 * 24);

    let store = gateway(&ctx).load().unwrap();
    let dates = store.dates();
    assert!(dates.contains(&date(2024, 4, 2)));
    assert!(!dates.contains(&date(2024, 4, 4)));
    assert!(!dates.contains(&date(2024, 4, 12)));
    assert_eq!(store.len(), (31 - 2) * 24);
}

#[test]
fn scenario_unreadable_store_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path(), date(2024, 3, 10));
    let master = ctx.settings.paths.master_path();
    fs::create_dir_all(master.parent().unwrap()).unwrap();
    fs::write(&master, [0xC3, 0x28]).unwrap();

    let producer = StaticProducer::new(hourly_days(date(2024, 3, 8), 3));
    assert!(run_ingest(&ctx, IngestPlan::Daily { days: 3 }, &producer).is_err());
    assert_eq!(fs::read(&master).unwrap(), vec![0xC3, 0x28]);
}
