//! Core Data Models
//!
//! Two groups of types live here:
//!
//! 1. **Wire types** decoded from the PagerDuty REST API: [`Incident`], [`LogEntry`],
//!    [`User`], [`Service`], [`EscalationPolicy`] and the generic [`Page`] wrapper.
//! 2. **Report types** built by the analyzer: [`Report`], [`Alert`], [`ResponderTally`]
//!    and [`MonthTally`].
//!
//! Everything is created fresh for a single run and dropped once the report is emitted.
//!
//! The report keeps one invariant: the per-alert [`ResponderTally`] counters sum to the
//! report-level totals, and so do the [`MonthTally`] buckets.

use crate::slo::SloViolation;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed pointer to another PagerDuty object (`{"id", "type", "summary"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
}

impl Reference {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            summary: summary.into(),
        }
    }

    /// Service and integration references, as opposed to users.
    pub fn is_service(&self) -> bool {
        self.kind.starts_with("service") || self.kind.ends_with("integration_reference")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(default)]
    pub incident_number: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub last_status_change_by: Option<Reference>,
    #[serde(default)]
    pub escalation_policy: Option<Reference>,
    #[serde(default)]
    pub teams: Vec<Reference>,
}

impl Incident {
    /// Description if present, otherwise the summary line.
    pub fn display_text(&self) -> &str {
        if self.description.is_empty() {
            &self.summary
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub agent: Option<Reference>,
    #[serde(default)]
    pub user: Option<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub more: bool,
}

/// Per-responder counters for one alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderTally {
    pub name: String,
    pub escalation_policy: String,
    pub off_hour: u32,
    pub sleep_hour: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub desc: String,
    #[serde(rename = "alert_url")]
    pub url: String,
    pub date_time: DateTime<FixedOffset>,
    /// Keyed by responder display name.
    pub responders: BTreeMap<String, ResponderTally>,
}

impl Alert {
    pub fn off_hour_count(&self) -> u32 {
        self.responders.values().map(|r| r.off_hour).sum()
    }

    pub fn sleep_hour_count(&self) -> u32 {
        self.responders.values().map(|r| r.sleep_hour).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthTally {
    pub alerts: u32,
    pub sleep_hour: u32,
    pub off_hour: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub alert_total: u32,
    pub off_hour_total: u32,
    pub sleep_hour_total: u32,
    pub alerts: Vec<Alert>,
    /// Keyed by `YYYY-MM`.
    pub monthly: BTreeMap<String, MonthTally>,
    pub slo_violations: Vec<SloViolation>,
    /// Display names of services that showed up as responders and were not counted.
    pub excluded_services: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts that charged at least one off-hour interruption.
    pub fn off_hour_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.off_hour_count() > 0)
    }

    /// Alerts that charged at least one sleep-hour interruption.
    pub fn sleep_hour_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.sleep_hour_count() > 0)
    }

    /// `true` when the per-alert counters add up to the report totals.
    pub fn is_consistent(&self) -> bool {
        let off: u32 = self.alerts.iter().map(Alert::off_hour_count).sum();
        let sleep: u32 = self.alerts.iter().map(Alert::sleep_hour_count).sum();
        let month_off: u32 = self.monthly.values().map(|m| m.off_hour).sum();
        let month_sleep: u32 = self.monthly.values().map(|m| m.sleep_hour).sum();
        let month_alerts: u32 = self.monthly.values().map(|m| m.alerts).sum();

        off == self.off_hour_total
            && sleep == self.sleep_hour_total
            && month_off == self.off_hour_total
            && month_sleep == self.sleep_hour_total
            && month_alerts == self.alert_total
    }
}
