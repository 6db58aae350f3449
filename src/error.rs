//! Error taxonomy for PagerDuty access and report aggregation
//!
//! Lookups that can legitimately miss (a user without a profile, an id that is not a
//! service) surface [`ApiError::NotFound`] so callers can map it to a fallback value.
//! Everything else is fatal and bubbles up to `main`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited by the PagerDuty API")]
    RateLimited,

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("unexpected status code {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("bad timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("unknown time zone {name:?}")]
    TimeZone { name: String },
}

impl AnalyzeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AnalyzeError::Api(e) if e.is_rate_limited())
    }
}
