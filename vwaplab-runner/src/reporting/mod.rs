//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod export;
pub mod reports;

pub use artifacts::{ArtifactManager, ArtifactPaths, EquityRow, WalkForwardPaths};
pub use export::{export_run_with_report, report_from_trades_csv, ReportPaths};
