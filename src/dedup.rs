//! Interruption deduplication
//!
//! Bots retrigger, log entries repeat, and the same person can be reached through more
//! than one resolution path. A human perceives all of that as one disturbance, so a
//! responder is charged at most once per local calendar hour.
//!
//! The key is `(responder id, year, day-of-year, hour)` in the responder's own zone. It
//! deliberately leaves out the incident id: two different incidents paging the same
//! person inside one clock hour collapse into a single interruption.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub responder_id: String,
    pub year: i32,
    pub day_of_year: u32,
    pub hour: u32,
}

impl DedupeKey {
    pub fn new<Tz: TimeZone>(responder_id: &str, local: &DateTime<Tz>) -> Self {
        Self {
            responder_id: responder_id.to_string(),
            year: local.year(),
            day_of_year: local.ordinal(),
            hour: local.hour(),
        }
    }
}

/// Per-run set of responder-hours that have already been charged.
#[derive(Debug, Default)]
pub struct InterruptionDeduper {
    seen: HashSet<DedupeKey>,
    duplicates: usize,
}

impl InterruptionDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a responder-hour is offered and marks it seen.
    /// Later offers of the same key return `false` and are tallied as duplicates.
    pub fn first_occurrence<Tz: TimeZone>(&mut self, responder_id: &str, local: &DateTime<Tz>) -> bool {
        let key = DedupeKey::new(responder_id, local);
        if self.seen.insert(key) {
            true
        } else {
            self.duplicates += 1;
            tracing::debug!(
                responder_id,
                day_of_year = local.ordinal(),
                hour = local.hour(),
                "Skipping duplicate responder-hour"
            );
            false
        }
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
