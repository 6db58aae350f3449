//! CSV export, one row per (alert, responder)

use crate::models::Report;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "time in zone",
    "Alert ID",
    "Description",
    "Responder Name",
    "Escalation Policy",
    "Off Hour",
    "Sleep Hour",
    "URL",
];

/// Number of data rows [`write_records`] will produce.
pub fn row_count(report: &Report) -> usize {
    report.alerts.iter().map(|a| a.responders.len()).sum()
}

/// Write the header and every row. The writer is flushed even when a row fails;
/// the first error is returned.
pub fn write_records<W: Write>(report: &Report, timestamp_format: &str, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let written = write_rows(&mut writer, report, timestamp_format);
    let flushed = writer.flush().context("Failed to flush CSV output");
    written?;
    flushed
}

fn write_rows<W: Write>(writer: &mut csv::Writer<W>, report: &Report, timestamp_format: &str) -> Result<()> {
    writer.write_record(HEADER).context("Failed to write CSV header")?;

    for alert in &report.alerts {
        let time = alert.date_time.format(timestamp_format).to_string();
        for tally in alert.responders.values() {
            let off_hour = tally.off_hour.to_string();
            let sleep_hour = tally.sleep_hour.to_string();
            writer
                .write_record([
                    time.as_str(),
                    alert.id.as_str(),
                    alert.desc.as_str(),
                    tally.name.as_str(),
                    tally.escalation_policy.as_str(),
                    off_hour.as_str(),
                    sleep_hour.as_str(),
                    alert.url.as_str(),
                ])
                .with_context(|| format!("Failed to write CSV row for alert {}", alert.id))?;
        }
    }

    Ok(())
}

/// Create or truncate `path` and write the report into it.
pub fn write_file(report: &Report, path: &Path, timestamp_format: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_records(report, timestamp_format, file)
}
