#![allow(dead_code)]

use async_trait::async_trait;
use pager_interrupts::error::ApiError;
use pager_interrupts::models::*;
use pager_interrupts::pagerduty::{IncidentQuery, PagerDutyApi};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory PagerDuty account. Lists honor offset/limit like the real API.
#[derive(Default)]
pub struct FakePagerDuty {
    pub incidents: Vec<Incident>,
    pub log_entries: HashMap<String, Vec<LogEntry>>,
    pub users: HashMap<String, User>,
    pub services: HashMap<String, Service>,
    pub policies: HashMap<String, EscalationPolicy>,
    pub rate_limited_users: HashSet<String>,
    pub incident_calls: Mutex<Vec<u32>>,
}

fn slice_page<T: Clone>(items: &[T], offset: u32, limit: u32) -> Page<T> {
    let start = (offset as usize).min(items.len());
    let end = (start + limit as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        more: end < items.len(),
    }
}

impl FakePagerDuty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incident(mut self, incident: Incident, notified: &[Reference]) -> Self {
        let entries = notified
            .iter()
            .enumerate()
            .map(|(i, r)| LogEntry {
                id: format!("{}-L{}", incident.id, i),
                kind: "notify_log_entry".to_string(),
                created_at: incident.created_at.clone(),
                agent: None,
                user: Some(r.clone()),
            })
            .collect();
        self.log_entries.insert(incident.id.clone(), entries);
        self.incidents.push(incident);
        self
    }

    pub fn with_user(mut self, id: &str, name: &str, time_zone: Option<&str>) -> Self {
        self.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                time_zone: time_zone.map(str::to_string),
            },
        );
        self
    }

    pub fn with_service(mut self, id: &str, name: &str) -> Self {
        self.services.insert(
            id.to_string(),
            Service {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_policy(mut self, id: &str, summary: &str) -> Self {
        self.policies.insert(
            id.to_string(),
            EscalationPolicy {
                id: id.to_string(),
                name: summary.to_string(),
                summary: summary.to_string(),
            },
        );
        self
    }

    pub fn incident_page_requests(&self) -> Vec<u32> {
        self.incident_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagerDutyApi for FakePagerDuty {
    async fn list_incidents(
        &self,
        _query: &IncidentQuery,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Incident>, ApiError> {
        self.incident_calls.lock().unwrap().push(offset);
        Ok(slice_page(&self.incidents, offset, limit))
    }

    async fn list_incident_log_entries(
        &self,
        incident_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<LogEntry>, ApiError> {
        match self.log_entries.get(incident_id) {
            Some(entries) => Ok(slice_page(entries, offset, limit)),
            None => Ok(Page {
                items: Vec::new(),
                more: false,
            }),
        }
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        if self.rate_limited_users.contains(id) {
            return Err(ApiError::RateLimited);
        }
        self.users.get(id).cloned().ok_or_else(|| ApiError::NotFound {
            resource: "user",
            id: id.to_string(),
        })
    }

    async fn get_service(&self, id: &str) -> Result<Service, ApiError> {
        self.services.get(id).cloned().ok_or_else(|| ApiError::NotFound {
            resource: "service",
            id: id.to_string(),
        })
    }

    async fn get_escalation_policy(&self, id: &str) -> Result<EscalationPolicy, ApiError> {
        self.policies.get(id).cloned().ok_or_else(|| ApiError::NotFound {
            resource: "escalation policy",
            id: id.to_string(),
        })
    }
}

pub fn user_ref(id: &str, name: &str) -> Reference {
    Reference::new(id, "user_reference", name)
}

pub fn incident(id: &str, created_at: &str) -> Incident {
    Incident {
        id: id.to_string(),
        incident_number: 0,
        summary: format!("[#{}] Something broke", id),
        description: format!("Something broke in {}", id),
        created_at: created_at.to_string(),
        urgency: "high".to_string(),
        html_url: format!("https://acme.pagerduty.com/incidents/{}", id),
        last_status_change_by: None,
        escalation_policy: None,
        teams: Vec::new(),
    }
}

pub fn query() -> IncidentQuery {
    use chrono::TimeZone;
    IncidentQuery {
        since: chrono::Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        until: chrono::Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap(),
        urgencies: vec!["high".to_string()],
        team_ids: Vec::new(),
    }
}
