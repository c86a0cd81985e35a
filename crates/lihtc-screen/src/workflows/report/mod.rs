mod export;
mod html;
mod summary;
mod views;

pub use export::{write_csv, write_csv_path, write_summary_json, write_summary_json_path};
pub use html::{render_html, ReportHeading};
pub use summary::ScreeningSummary;
pub use views::{ReasonCountEntry, ScoredSiteRow, TierCountEntry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render HTML report")]
    Format(#[from] std::fmt::Error),
}
