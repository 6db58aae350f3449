//! Month-aligned query windows
//!
//! The window starts on the first day of the start month and ends, exclusively, on the
//! first day of the end month. Both bounds are UTC midnight.

use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.since.format("%Y-%m-%d"), self.until.format("%Y-%m-%d"))
    }
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    if !(1..=12).contains(&month) {
        bail!("Month must be between 1 and 12, got {}", month);
    }
    match Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single() {
        Some(dt) => Ok(dt),
        None => bail!("Invalid date {}-{:02}-01", year, month),
    }
}

fn next_month(year: i32, month: u32) -> Result<(i32, u32)> {
    if month < 12 {
        return Ok((year, month + 1));
    }
    match year.checked_add(1) {
        Some(next) => Ok((next, 1)),
        None => bail!("Invalid date {}-{:02}-01", year, month),
    }
}

impl ReportWindow {
    /// Build a window from optional flags. Start defaults to the month containing
    /// `today`; end defaults to the month after the start.
    pub fn from_flags(
        today: NaiveDate,
        start_year: Option<i32>,
        start_month: Option<u32>,
        end_year: Option<i32>,
        end_month: Option<u32>,
    ) -> Result<Self> {
        let start_year = start_year.unwrap_or_else(|| today.year());
        let start_month = start_month.unwrap_or_else(|| today.month());
        let (default_end_year, default_end_month) = next_month(start_year, start_month)?;
        let end_year = end_year.unwrap_or(default_end_year);
        let end_month = end_month.unwrap_or(default_end_month);

        let since = month_start(start_year, start_month)?;
        let until = month_start(end_year, end_month)?;
        if since >= until {
            bail!("Window start {} must be before end {}", since.format("%Y-%m"), until.format("%Y-%m"));
        }

        Ok(Self { since, until })
    }

    pub fn current_month(today: NaiveDate) -> Self {
        let since = Utc
            .with_ymd_and_hms(today.year(), today.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let (y, m) = next_month(today.year(), today.month()).unwrap_or((today.year(), today.month()));
        let until = Utc
            .with_ymd_and_hms(y, m, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self { since, until }
    }
}
