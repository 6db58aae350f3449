//! Report output
//!
//! A finished [`Report`] can be rendered three ways:
//!
//! - **Table**: colored console tables for all alerts, off-hour alerts and sleep-hour
//!   alerts, each with footer totals, followed by the monthly breakdown and any weekly
//!   SLO violations ([`table`])
//! - **CSV**: one row per alert and responder, written to a file ([`csv_export`])
//! - **JSON**: the whole report, pretty printed to stdout

pub mod csv_export;
pub mod table;

use crate::config::OutputConfig;
use crate::models::Report;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

pub struct DisplayManager {
    csv_path: PathBuf,
    timestamp_format: String,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl DisplayManager {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            csv_path: output.csv_path.clone(),
            timestamp_format: output.timestamp_format.clone(),
        }
    }

    pub fn with_csv_path(mut self, path: PathBuf) -> Self {
        self.csv_path = path;
        self
    }

    pub fn emit(&self, report: &Report, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                table::write_report(report, &self.timestamp_format, &mut out)
                    .context("Failed to write report table")?;
                out.flush()?;
            }
            OutputFormat::Csv => {
                csv_export::write_file(report, &self.csv_path, &self.timestamp_format)?;
                info!(path = %self.csv_path.display(), rows = csv_export::row_count(report), "Wrote CSV report");
                println!("Report written to {}", self.csv_path.display());
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report)
                    .context("Failed to serialize report to JSON")?;
                println!("{}", json);
            }
        }
        Ok(())
    }
}
