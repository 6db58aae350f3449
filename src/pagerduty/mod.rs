//! PagerDuty access
//!
//! [`PagerDutyApi`] is the seam between the analyzer and the network. The production
//! implementation is [`PagerDutyClient`]; tests substitute an in-memory fake.

pub mod client;

pub use client::PagerDutyClient;

use crate::error::ApiError;
use crate::models::{EscalationPolicy, Incident, LogEntry, Page, Service, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter for the incident list endpoint.
#[derive(Debug, Clone)]
pub struct IncidentQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub urgencies: Vec<String>,
    /// Empty means no team filter.
    pub team_ids: Vec<String>,
}

#[async_trait]
pub trait PagerDutyApi: Send + Sync {
    async fn list_incidents(
        &self,
        query: &IncidentQuery,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Incident>, ApiError>;

    async fn list_incident_log_entries(
        &self,
        incident_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<LogEntry>, ApiError>;

    async fn get_user(&self, id: &str) -> Result<User, ApiError>;

    async fn get_service(&self, id: &str) -> Result<Service, ApiError>;

    async fn get_escalation_policy(&self, id: &str) -> Result<EscalationPolicy, ApiError>;
}
