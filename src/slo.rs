//! Weekly sleep-interruption SLO
//!
//! Each responder may be woken up at most `max_per_week` times per ISO week before the
//! week is reported as a violation.

use chrono::{DateTime, Datelike, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SloViolation {
    pub responder: String,
    pub iso_year: i32,
    pub week: u32,
    pub interruptions: u32,
}

#[derive(Debug)]
pub struct SleepSloTracker {
    max_per_week: u32,
    // (responder id, iso year, iso week) -> (display name, count)
    weeks: BTreeMap<(String, i32, u32), (String, u32)>,
}

impl SleepSloTracker {
    pub fn new(max_per_week: u32) -> Self {
        Self {
            max_per_week,
            weeks: BTreeMap::new(),
        }
    }

    /// Record one counted sleep-hour interruption. Returns the week's running count.
    pub fn record<Tz: TimeZone>(&mut self, responder_id: &str, name: &str, local: &DateTime<Tz>) -> u32 {
        let week = local.iso_week();
        let entry = self
            .weeks
            .entry((responder_id.to_string(), week.year(), week.week()))
            .or_insert_with(|| (name.to_string(), 0));
        entry.1 += 1;

        if entry.1 > self.max_per_week {
            warn!(
                responder = name,
                iso_year = week.year(),
                week = week.week(),
                interruptions = entry.1,
                "Sleep interruption SLO violated"
            );
        }
        entry.1
    }

    /// One entry per responder-week over the limit, ordered by responder id then week.
    pub fn violations(&self) -> Vec<SloViolation> {
        self.weeks
            .iter()
            .filter(|(_, (_, count))| *count > self.max_per_week)
            .map(|((_, iso_year, week), (name, count))| SloViolation {
                responder: name.clone(),
                iso_year: *iso_year,
                week: *week,
                interruptions: *count,
            })
            .collect()
    }
}
