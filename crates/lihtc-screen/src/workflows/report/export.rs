use super::summary::ScreeningSummary;
use super::views::ScoredSiteRow;
use super::ReportError;
use crate::workflows::screening::ScreeningResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one row per result with a header line. Returns the row count.
pub fn write_csv<W: Write>(results: &[ScreeningResult], writer: W) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serde only emits the header alongside the first row.
    if results.is_empty() {
        csv_writer.write_record(ScoredSiteRow::COLUMNS)?;
    }
    for result in results {
        csv_writer.serialize(ScoredSiteRow::from_result(result))?;
    }
    csv_writer.flush()?;
    Ok(results.len())
}

pub fn write_csv_path<P: AsRef<Path>>(
    results: &[ScreeningResult],
    path: P,
) -> Result<usize, ReportError> {
    let file = File::create(path)?;
    write_csv(results, BufWriter::new(file))
}

pub fn write_summary_json<W: Write>(
    summary: &ScreeningSummary,
    writer: W,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

pub fn write_summary_json_path<P: AsRef<Path>>(
    summary: &ScreeningSummary,
    path: P,
) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_summary_json(summary, &mut writer)?;
    writer.flush()?;
    Ok(())
}
