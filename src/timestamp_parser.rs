use crate::error::AnalyzeError;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Parses incident timestamps and resolves IANA zone names
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a PagerDuty timestamp into a DateTime<Utc>
    /// Handles both Z suffix and explicit offsets
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>, AnalyzeError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp_str) {
            return Ok(dt.with_timezone(&Utc));
        }

        // Offset-less timestamps are requested with time_zone=UTC
        match NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(naive) => Ok(DateTime::from_naive_utc_and_offset(naive, Utc)),
            Err(e) => Err(AnalyzeError::Timestamp {
                value: timestamp_str.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Resolve an IANA zone name such as `America/Denver`
    pub fn zone(name: &str) -> Result<Tz, AnalyzeError> {
        name.parse::<Tz>().map_err(|_| AnalyzeError::TimeZone {
            name: name.to_string(),
        })
    }
}
