//! Interruption Analysis Engine
//!
//! [`InterruptionAnalyzer`] turns a time window into a [`Report`]:
//!
//! 1. **Incidents**: page through the incident list (100 per page) until the API says
//!    there is nothing more
//! 2. **Responders**: page through each incident's log entries and collect the distinct
//!    users that were notified; incidents without any fall back to whoever last changed
//!    their status
//! 3. **Filtering**: services, integrations and ignored users are never charged
//! 4. **Localization**: each responder's zone is looked up (fallback zone when the
//!    profile has none) and the creation time converted into it
//! 5. **Classification and dedup**: one charge per responder per local clock hour
//! 6. **Accumulation**: per-responder tallies, report totals, monthly buckets and the
//!    weekly sleep SLO
//!
//! Everything runs sequentially against a single API handle. The first fatal error
//! aborts the run; no partial report is produced.

use crate::classify::{HourClass, HourRules};
use crate::config::Config;
use crate::dedup::InterruptionDeduper;
use crate::error::{AnalyzeError, ApiError};
use crate::models::*;
use crate::pagerduty::{IncidentQuery, PagerDutyApi};
use crate::slo::SleepSloTracker;
use crate::timestamp_parser::TimestampParser;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, warn};

/// Knobs the analyzer needs, extracted from [`Config`].
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub rules: HourRules,
    pub fallback_zone: Tz,
    pub page_limit: u32,
    pub slo_max_per_week: u32,
    pub description_width: usize,
    pub ignored_user_ids: Vec<String>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            rules: HourRules::default(),
            fallback_zone: chrono_tz::America::Denver,
            page_limit: 100,
            slo_max_per_week: 1,
            description_width: 50,
            ignored_user_ids: Vec::new(),
        }
    }
}

impl AnalyzerSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            rules: config.hours.rules(),
            fallback_zone: config.hours.fallback_zone()?,
            page_limit: config.api.page_limit,
            slo_max_per_week: config.hours.slo_max_sleep_interruptions_per_week,
            description_width: config.output.description_width,
            ignored_user_ids: config.query.ignored_user_ids.clone(),
        })
    }
}

/// A human responder after profile lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponder {
    pub id: String,
    pub name: String,
    pub zone: Tz,
}

enum Resolution {
    Human(ResolvedResponder),
    Service(String),
}

/// Mutable state for one pass over the incidents.
struct RunState {
    report: Report,
    dedup: InterruptionDeduper,
    slo: SleepSloTracker,
    services_seen: HashSet<String>,
}

pub struct InterruptionAnalyzer<'a, A: PagerDutyApi + ?Sized> {
    api: &'a A,
    settings: AnalyzerSettings,
}

/// Drain a paginated endpoint. Stops on `more == false`, and on an empty page so a
/// misbehaving server cannot keep the loop alive.
pub async fn collect_pages<T, F, Fut>(limit: u32, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut offset = 0u32;

    loop {
        let page = fetch(offset).await?;
        let received = page.items.len();
        items.extend(page.items);

        if !page.more {
            break;
        }
        if received == 0 {
            warn!(offset, "Empty page reported more results; stopping pagination");
            break;
        }
        offset += limit;
    }

    Ok(items)
}

impl<'a, A: PagerDutyApi + ?Sized> InterruptionAnalyzer<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self::with_settings(api, AnalyzerSettings::default())
    }

    pub fn with_settings(api: &'a A, settings: AnalyzerSettings) -> Self {
        Self { api, settings }
    }

    pub async fn fetch_incidents(&self, query: &IncidentQuery) -> Result<Vec<Incident>, ApiError> {
        let limit = self.settings.page_limit;
        let incidents =
            collect_pages(limit, |offset| self.api.list_incidents(query, offset, limit)).await?;
        info!(count = incidents.len(), "Fetched incidents");
        Ok(incidents)
    }

    pub async fn fetch_log_entries(&self, incident_id: &str) -> Result<Vec<LogEntry>, ApiError> {
        let limit = self.settings.page_limit;
        collect_pages(limit, |offset| {
            self.api.list_incident_log_entries(incident_id, offset, limit)
        })
        .await
    }

    /// Distinct notified users from the incident's log entries, or the last status
    /// changer when the log names nobody.
    pub async fn responders(&self, incident: &Incident) -> Result<Vec<Reference>, ApiError> {
        let entries = self.fetch_log_entries(&incident.id).await?;

        let mut seen = HashSet::new();
        let mut responders = Vec::new();
        for user in entries.into_iter().filter_map(|e| e.user) {
            if user.id.is_empty() || self.settings.ignored_user_ids.contains(&user.id) {
                continue;
            }
            if seen.insert(user.id.clone()) {
                responders.push(user);
            }
        }

        if responders.is_empty() {
            if let Some(last) = &incident.last_status_change_by {
                if !last.id.is_empty() && !self.settings.ignored_user_ids.contains(&last.id) {
                    debug!(incident_id = %incident.id, responder = %last.summary, "No notified users in log; using last status change");
                    responders.push(last.clone());
                }
            }
        }

        Ok(responders)
    }

    async fn resolve(&self, reference: &Reference) -> Result<Resolution, AnalyzeError> {
        if reference.is_service() {
            return Ok(Resolution::Service(reference.summary.clone()));
        }

        if !is_user_kind(&reference.kind) {
            match self.api.get_service(&reference.id).await {
                Ok(service) => return Ok(Resolution::Service(service.name)),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        let (name, zone_name) = match self.api.get_user(&reference.id).await {
            Ok(user) => {
                let name = if user.name.is_empty() {
                    fallback_name(reference)
                } else {
                    user.name
                };
                (name, user.time_zone.filter(|tz| !tz.is_empty()))
            }
            Err(e) if e.is_not_found() => (fallback_name(reference), None),
            Err(e) => return Err(e.into()),
        };

        let zone = match zone_name {
            Some(name) => TimestampParser::zone(&name)?,
            None => {
                debug!(responder = %name, fallback = %self.settings.fallback_zone, "No time zone on profile; using fallback");
                self.settings.fallback_zone
            }
        };

        Ok(Resolution::Human(ResolvedResponder {
            id: reference.id.clone(),
            name,
            zone,
        }))
    }

    async fn escalation_policy_label(&self, incident: &Incident) -> Result<String, ApiError> {
        let Some(policy) = &incident.escalation_policy else {
            return Ok(String::new());
        };
        if policy.id.is_empty() {
            return Ok(policy.summary.clone());
        }
        match self.api.get_escalation_policy(&policy.id).await {
            Ok(p) if !p.summary.is_empty() => Ok(p.summary),
            Ok(p) => Ok(p.name),
            Err(e) if e.is_not_found() => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Build the full report for a window.
    pub async fn analyze(&self, query: &IncidentQuery) -> Result<Report, AnalyzeError> {
        let incidents = self.fetch_incidents(query).await?;
        self.analyze_incidents(&incidents).await
    }

    /// Build the report for an already fetched incident list.
    pub async fn analyze_incidents(&self, incidents: &[Incident]) -> Result<Report, AnalyzeError> {
        let mut state = RunState {
            report: Report::new(),
            dedup: InterruptionDeduper::new(),
            slo: SleepSloTracker::new(self.settings.slo_max_per_week),
            services_seen: HashSet::new(),
        };

        for incident in incidents {
            self.process_incident(incident, &mut state).await?;
        }

        let mut report = state.report;
        report.slo_violations = state.slo.violations();

        info!(
            incidents = report.alert_total,
            sleep_hour = report.sleep_hour_total,
            off_hour = report.off_hour_total,
            duplicates = state.dedup.duplicates(),
            "Analysis complete"
        );

        Ok(report)
    }

    async fn process_incident(&self, incident: &Incident, state: &mut RunState) -> Result<(), AnalyzeError> {
        let created = TimestampParser::parse(&incident.created_at)?;
        let policy = self.escalation_policy_label(incident).await?;
        let references = self.responders(incident).await?;

        let mut alert_time: Option<DateTime<FixedOffset>> = None;
        let mut responders = std::collections::BTreeMap::new();
        let mut sleep = 0u32;
        let mut off = 0u32;

        for reference in &references {
            let responder = match self.resolve(reference).await? {
                Resolution::Human(r) => r,
                Resolution::Service(name) => {
                    info!(incident_id = %incident.id, service = %name, "Service responder excluded from counts");
                    if state.services_seen.insert(name.clone()) {
                        state.report.excluded_services.push(name);
                    }
                    continue;
                }
            };

            let local = created.with_timezone(&responder.zone);
            if !state.dedup.first_occurrence(&responder.id, &local) {
                continue;
            }
            alert_time.get_or_insert_with(|| local.with_timezone(&local.offset().fix()));

            let class = self.settings.rules.classify_local(&local);
            let tally: &mut ResponderTally =
                responders
                    .entry(responder.name.clone())
                    .or_insert_with(|| ResponderTally {
                        name: responder.name.clone(),
                        escalation_policy: policy.clone(),
                        ..Default::default()
                    });

            match class {
                HourClass::SleepHours => {
                    tally.sleep_hour += 1;
                    sleep += 1;
                    let week_count = state.slo.record(&responder.id, &responder.name, &local);
                    info!(
                        incident_id = %incident.id,
                        responder = %responder.name,
                        week_count,
                        "Sleep interruption: {}",
                        incident.display_text()
                    );
                }
                HourClass::OffHours => {
                    tally.off_hour += 1;
                    off += 1;
                    debug!(incident_id = %incident.id, responder = %responder.name, "Off-hour interruption");
                }
                HourClass::BusinessHours => {}
            }
        }

        let date_time = alert_time.unwrap_or_else(|| DateTime::<FixedOffset>::from(created));
        let month = state
            .report
            .monthly
            .entry(date_time.format("%Y-%m").to_string())
            .or_default();
        month.alerts += 1;
        month.sleep_hour += sleep;
        month.off_hour += off;

        state.report.alert_total += 1;
        state.report.sleep_hour_total += sleep;
        state.report.off_hour_total += off;
        state.report.alerts.push(Alert {
            id: incident.id.clone(),
            desc: truncate(incident.display_text(), self.settings.description_width),
            url: incident.html_url.clone(),
            date_time,
            responders,
        });

        Ok(())
    }
}

fn is_user_kind(kind: &str) -> bool {
    matches!(kind, "user" | "user_reference")
}

fn fallback_name(reference: &Reference) -> String {
    if reference.summary.is_empty() {
        reference.id.clone()
    } else {
        reference.summary.clone()
    }
}

/// Char-safe prefix of at most `width` characters.
pub fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Convenience for callers holding a UTC window.
pub fn incident_query(config: &Config, since: DateTime<Utc>, until: DateTime<Utc>) -> IncidentQuery {
    IncidentQuery {
        since,
        until,
        urgencies: config.api.urgencies.clone(),
        team_ids: config.query.team_ids.clone(),
    }
}
