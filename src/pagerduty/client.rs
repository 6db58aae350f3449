//! reqwest-backed PagerDuty REST API v2 client

use super::{IncidentQuery, PagerDutyApi};
use crate::error::ApiError;
use crate::models::{EscalationPolicy, Incident, LogEntry, Page, Service, User};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

#[derive(Debug, Deserialize)]
struct IncidentsResponse {
    incidents: Vec<Incident>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct LogEntriesResponse {
    log_entries: Vec<LogEntry>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    service: Service,
}

#[derive(Debug, Deserialize)]
struct EscalationPolicyResponse {
    escalation_policy: EscalationPolicy,
}

/// One long-lived client per run; it holds the token and connection pool.
#[derive(Debug, Clone)]
pub struct PagerDutyClient {
    http: reqwest::Client,
    base_url: String,
}

impl PagerDutyClient {
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));
        let mut auth = HeaderValue::from_str(&format!("Token token={}", token)).map_err(|_| {
            ApiError::Status {
                status: StatusCode::UNAUTHORIZED,
                body: "API token contains invalid header characters".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        resource: &'static str,
        id: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, params = ?params, "GET");

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        check_status(status, resource, id, &body)?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            what: resource,
            source,
        })
    }
}

/// Map a response status onto the error taxonomy.
fn check_status(status: StatusCode, resource: &'static str, id: &str, body: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound {
            resource,
            id: id.to_string(),
        }),
        _ => Err(ApiError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

fn page_params(offset: u32, limit: u32) -> Vec<(&'static str, String)> {
    vec![
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
        ("time_zone", "UTC".to_string()),
    ]
}

fn incident_params(query: &IncidentQuery, offset: u32, limit: u32) -> Vec<(&'static str, String)> {
    let mut params = page_params(offset, limit);
    params.push(("since", query.since.to_rfc3339()));
    params.push(("until", query.until.to_rfc3339()));
    for urgency in &query.urgencies {
        params.push(("urgencies[]", urgency.clone()));
    }
    for team in &query.team_ids {
        params.push(("team_ids[]", team.clone()));
    }
    params
}

#[async_trait]
impl PagerDutyApi for PagerDutyClient {
    async fn list_incidents(
        &self,
        query: &IncidentQuery,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Incident>, ApiError> {
        let params = incident_params(query, offset, limit);
        let resp: IncidentsResponse = self.get("/incidents", &params, "incidents", "").await?;
        Ok(Page {
            items: resp.incidents,
            more: resp.more,
        })
    }

    async fn list_incident_log_entries(
        &self,
        incident_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Page<LogEntry>, ApiError> {
        let path = format!("/incidents/{}/log_entries", incident_id);
        let params = page_params(offset, limit);
        let resp: LogEntriesResponse = self.get(&path, &params, "incident", incident_id).await?;
        Ok(Page {
            items: resp.log_entries,
            more: resp.more,
        })
    }

    async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let resp: UserResponse = self.get(&format!("/users/{}", id), &[], "user", id).await?;
        Ok(resp.user)
    }

    async fn get_service(&self, id: &str) -> Result<Service, ApiError> {
        let resp: ServiceResponse = self.get(&format!("/services/{}", id), &[], "service", id).await?;
        Ok(resp.service)
    }

    async fn get_escalation_policy(&self, id: &str) -> Result<EscalationPolicy, ApiError> {
        let path = format!("/escalation_policies/{}", id);
        let resp: EscalationPolicyResponse = self.get(&path, &[], "escalation policy", id).await?;
        Ok(resp.escalation_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "user", "P1", "").is_ok());
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, "user", "P1", ""),
            Err(ApiError::RateLimited)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "user", "P1", ""),
            Err(ApiError::NotFound { resource: "user", .. })
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, "user", "P1", "nope"),
            Err(ApiError::Status { status: StatusCode::FORBIDDEN, .. })
        ));
    }

    #[test]
    fn test_incident_params_repeat_array_filters() {
        let query = IncidentQuery {
            since: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            until: Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap(),
            urgencies: vec!["high".to_string()],
            team_ids: vec!["PTV792K".to_string(), "PTBNXW0".to_string()],
        };
        let params = incident_params(&query, 200, 100);

        assert!(params.contains(&("offset", "200".to_string())));
        assert!(params.contains(&("since", "2022-01-01T00:00:00+00:00".to_string())));
        assert_eq!(params.iter().filter(|(k, _)| *k == "team_ids[]").count(), 2);
        assert!(params.contains(&("urgencies[]", "high".to_string())));
    }

    #[test]
    fn test_list_response_decodes() {
        let body = r#"{"incidents": [], "limit": 100, "offset": 0, "more": true}"#;
        let resp: IncidentsResponse = serde_json::from_str(body).unwrap();
        assert!(resp.more);
        assert!(resp.incidents.is_empty());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = PagerDutyClient::new("abc", "https://api.pagerduty.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://api.pagerduty.com");
    }
}
