//! Pager Interrupts Library
//!
//! Measures how often on-call responders are paged outside working hours. High-urgency
//! PagerDuty incidents for a date window are fetched, the people who were actually
//! notified are found through each incident's log entries, and every notification is
//! classified in the responder's own time zone as sleep hours, off hours or business
//! hours.
//!
//! ## Architecture Overview
//!
//! - [`classify`] - Pure hour-of-day / day-of-week classification
//! - [`dedup`] - One charge per responder per local clock hour
//! - [`slo`] - Weekly sleep-interruption budget per responder
//! - [`pagerduty`] - The [`pagerduty::PagerDutyApi`] seam and its reqwest client
//! - [`analyzer`] - Pagination, responder resolution and aggregation into a [`Report`]
//! - [`display`] - Table, CSV and JSON output
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`logging`] - Structured logging with pretty and JSON formats
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pager_interrupts::analyzer::{incident_query, AnalyzerSettings, InterruptionAnalyzer};
//! use pager_interrupts::config::Config;
//! use pager_interrupts::pagerduty::PagerDutyClient;
//! use pager_interrupts::window::ReportWindow;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let client = PagerDutyClient::new("token", &config.api.base_url, Duration::from_secs(30))?;
//! let analyzer = InterruptionAnalyzer::with_settings(&client, AnalyzerSettings::from_config(&config)?);
//!
//! let window = ReportWindow::current_month(chrono::Utc::now().date_naive());
//! let report = analyzer
//!     .analyze(&incident_query(&config, window.since, window.until))
//!     .await?;
//! println!("{} sleep-hour interruptions", report.sleep_hour_total);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod pagerduty;
pub mod slo;
pub mod timestamp_parser;
pub mod window;

pub use analyzer::InterruptionAnalyzer;
pub use classify::{classify, HourClass};
pub use models::*;
