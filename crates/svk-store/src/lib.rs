//! svk-store
//!
//! Everything that touches disk for the time series:
//! - `gateway`: load/save of the canonical store, raw batch archive
//! - `backup`: bounded-retention snapshots of the previous store
//! - `state`: the monitoring state file
//! - `artifacts` / `render`: persisted quality reports

pub mod artifacts;
pub mod backup;
pub mod gateway;
pub mod render;
pub mod state;

pub use artifacts::{
    write_quality_artifacts, QualityArtifacts, ReportMeta, MISSING_DATES_CSV, REPORT_HTML,
    SUMMARY_JSON,
};
pub use gateway::{SaveOutcome, StoreGateway, StoreLayout};
pub use state::{read_state, write_state, RunMetadata, ScraperState};
