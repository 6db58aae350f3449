//! Time-of-day classification
//!
//! Every local timestamp falls into exactly one [`HourClass`]:
//!
//! - **Sleep hours**: `sleep_start <= hour < sleep_end`, wrapping past midnight when
//!   `sleep_start > sleep_end`, every day of the week
//! - **Business hours**: Monday through Friday, `business_start <= hour < business_end`
//! - **Off hours**: everything else (weekday evenings, weekend daytime)
//!
//! Sleep is checked first, so a weekday 23:00 page is sleep-hours and never off-hours.
//! The classifier only sees the hour and weekday; callers convert timestamps into the
//! responder's zone before asking.

use chrono::{Datelike, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourClass {
    SleepHours,
    BusinessHours,
    OffHours,
}

impl HourClass {
    /// Sleep and off hours count as interruptions; business hours do not.
    pub fn is_interruption(self) -> bool {
        !matches!(self, HourClass::BusinessHours)
    }
}

impl fmt::Display for HourClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HourClass::SleepHours => "sleep hours",
            HourClass::BusinessHours => "business hours",
            HourClass::OffHours => "off hours",
        };
        f.write_str(label)
    }
}

/// Hour boundaries used by the classifier. All values are local hours in `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRules {
    pub sleep_start: u32,
    pub sleep_end: u32,
    pub business_start: u32,
    pub business_end: u32,
}

impl Default for HourRules {
    fn default() -> Self {
        Self {
            sleep_start: 21,
            sleep_end: 8,
            business_start: 8,
            business_end: 19,
        }
    }
}

impl HourRules {
    /// The window wraps past midnight when `sleep_start > sleep_end`.
    pub fn is_sleep_hour(&self, hour: u32) -> bool {
        if self.sleep_start > self.sleep_end {
            hour >= self.sleep_start || hour < self.sleep_end
        } else {
            hour >= self.sleep_start && hour < self.sleep_end
        }
    }

    pub fn is_business_hour(&self, hour: u32, weekday: Weekday) -> bool {
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return false;
        }
        hour >= self.business_start && hour < self.business_end
    }

    pub fn classify(&self, hour: u32, weekday: Weekday) -> HourClass {
        if self.is_sleep_hour(hour) {
            HourClass::SleepHours
        } else if self.is_business_hour(hour, weekday) {
            HourClass::BusinessHours
        } else {
            HourClass::OffHours
        }
    }

    pub fn classify_local<Tz: TimeZone>(&self, local: &chrono::DateTime<Tz>) -> HourClass {
        self.classify(local.hour(), local.weekday())
    }
}

/// Classify with the default 21:00-08:00 sleep window and 08:00-19:00 business day.
pub fn classify(hour: u32, weekday: Weekday) -> HourClass {
    HourRules::default().classify(hour, weekday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::{Denver, New_York};

    #[test]
    fn test_reference_points() {
        assert_eq!(classify(21, Weekday::Mon), HourClass::SleepHours);
        assert_eq!(classify(8, Weekday::Mon), HourClass::BusinessHours);
        assert_eq!(classify(19, Weekday::Mon), HourClass::OffHours);
        assert_eq!(classify(10, Weekday::Sat), HourClass::OffHours);
        assert_eq!(classify(3, Weekday::Sun), HourClass::SleepHours);
    }

    #[test]
    fn test_weekday_boundaries() {
        assert_eq!(classify(7, Weekday::Wed), HourClass::SleepHours);
        assert_eq!(classify(18, Weekday::Wed), HourClass::BusinessHours);
        assert_eq!(classify(20, Weekday::Wed), HourClass::OffHours);
        assert_eq!(classify(23, Weekday::Fri), HourClass::SleepHours);
        assert_eq!(classify(0, Weekday::Tue), HourClass::SleepHours);
    }

    #[test]
    fn test_weekend_daytime_is_off_hours() {
        for hour in 8..21 {
            assert_eq!(classify(hour, Weekday::Sat), HourClass::OffHours);
            assert_eq!(classify(hour, Weekday::Sun), HourClass::OffHours);
        }
    }

    #[test]
    fn test_every_hour_has_exactly_one_class() {
        let rules = HourRules::default();
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        for day in days {
            for hour in 0..24 {
                let flags = [
                    rules.is_sleep_hour(hour),
                    rules.is_business_hour(hour, day) && !rules.is_sleep_hour(hour),
                    rules.classify(hour, day) == HourClass::OffHours,
                ];
                assert_eq!(
                    flags.iter().filter(|f| **f).count(),
                    1,
                    "hour {hour} on {day:?}"
                );
            }
        }
    }

    #[test]
    fn test_sleep_window_that_does_not_wrap() {
        let rules = HourRules {
            sleep_start: 0,
            sleep_end: 6,
            ..HourRules::default()
        };
        assert_eq!(rules.classify(0, Weekday::Wed), HourClass::SleepHours);
        assert_eq!(rules.classify(5, Weekday::Wed), HourClass::SleepHours);
        assert_eq!(rules.classify(6, Weekday::Wed), HourClass::OffHours);
        assert_eq!(rules.classify(12, Weekday::Wed), HourClass::BusinessHours);
        assert_eq!(rules.classify(23, Weekday::Wed), HourClass::OffHours);
    }

    #[test]
    fn test_interruption_flag() {
        assert!(HourClass::SleepHours.is_interruption());
        assert!(HourClass::OffHours.is_interruption());
        assert!(!HourClass::BusinessHours.is_interruption());
    }

    #[test]
    fn test_same_instant_differs_by_zone() {
        // 2022-03-15 13:00 UTC is 07:00 in Denver (MDT) and 09:00 in New York (EDT)
        let utc = chrono::Utc.with_ymd_and_hms(2022, 3, 15, 13, 0, 0).unwrap();
        let rules = HourRules::default();
        assert_eq!(
            rules.classify_local(&utc.with_timezone(&Denver)),
            HourClass::SleepHours
        );
        assert_eq!(
            rules.classify_local(&utc.with_timezone(&New_York)),
            HourClass::BusinessHours
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = HourRules {
            sleep_start: 22,
            sleep_end: 7,
            business_start: 9,
            business_end: 17,
        };
        assert_eq!(rules.classify(21, Weekday::Mon), HourClass::OffHours);
        assert_eq!(rules.classify(7, Weekday::Mon), HourClass::OffHours);
        assert_eq!(rules.classify(9, Weekday::Mon), HourClass::BusinessHours);
    }
}
