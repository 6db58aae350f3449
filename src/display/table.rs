//! Console tables
//!
//! Plain padded columns; only titles and footers are colored so data rows stay
//! copy-pasteable.

use crate::models::{Alert, Report};
use colored::Colorize;
use std::io::{self, Write};

const ALERT_HEADERS: [&str; 7] = [
    "Time",
    "Alert",
    "Description",
    "Responder",
    "Escalation Policy",
    "Off Hour",
    "Sleep Hour",
];

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    footer: Vec<String>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn set_footer(&mut self, footer: Vec<String>) {
        self.footer = footer;
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows.iter().chain(std::iter::once(&self.footer)) {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn format_line(cells: &[String], widths: &[usize]) -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule = "-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1));

        let mut out = String::new();
        out.push_str(&Self::format_line(&self.headers, &widths).bold().to_string());
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&Self::format_line(row, &widths));
            out.push('\n');
        }
        if !self.footer.is_empty() {
            out.push_str(&rule);
            out.push('\n');
            out.push_str(&Self::format_line(&self.footer, &widths).bright_white().to_string());
            out.push('\n');
        }
        out
    }
}

fn alert_table<'a>(alerts: impl Iterator<Item = &'a Alert>, timestamp_format: &str) -> Table {
    let mut table = Table::new(ALERT_HEADERS);
    let mut off_total = 0;
    let mut sleep_total = 0;
    let mut alert_count = 0;

    for alert in alerts {
        alert_count += 1;
        let time = alert.date_time.format(timestamp_format).to_string();
        if alert.responders.is_empty() {
            table.push_row(vec![time, alert.id.clone(), alert.desc.clone()]);
            continue;
        }
        for tally in alert.responders.values() {
            off_total += tally.off_hour;
            sleep_total += tally.sleep_hour;
            table.push_row(vec![
                time.clone(),
                alert.id.clone(),
                alert.desc.clone(),
                tally.name.clone(),
                tally.escalation_policy.clone(),
                tally.off_hour.to_string(),
                tally.sleep_hour.to_string(),
            ]);
        }
    }

    table.set_footer(vec![
        String::new(),
        format!("Alerts: {}", alert_count),
        String::new(),
        String::new(),
        String::new(),
        format!("Off Hours: {}", off_total),
        format!("Sleep Hours: {}", sleep_total),
    ]);
    table
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(80).bright_cyan())?;
    writeln!(out, "{}", title.bright_white().bold())?;
    writeln!(out, "{}", "=".repeat(80).bright_cyan())
}

pub fn write_report<W: Write>(report: &Report, timestamp_format: &str, out: &mut W) -> io::Result<()> {
    section(out, "All Alerts")?;
    write!(out, "{}", alert_table(report.alerts.iter(), timestamp_format).render())?;

    section(out, "Off Hour Alerts")?;
    write!(out, "{}", alert_table(report.off_hour_alerts(), timestamp_format).render())?;

    section(out, "Sleep Hour Alerts")?;
    write!(out, "{}", alert_table(report.sleep_hour_alerts(), timestamp_format).render())?;

    section(out, "Monthly Breakdown")?;
    let mut monthly = Table::new(["Month", "Alerts", "Off Hour", "Sleep Hour"]);
    for (month, tally) in &report.monthly {
        monthly.push_row(vec![
            month.clone(),
            tally.alerts.to_string(),
            tally.off_hour.to_string(),
            tally.sleep_hour.to_string(),
        ]);
    }
    monthly.set_footer(vec![
        "Total".to_string(),
        report.alert_total.to_string(),
        report.off_hour_total.to_string(),
        report.sleep_hour_total.to_string(),
    ]);
    write!(out, "{}", monthly.render())?;

    if !report.slo_violations.is_empty() {
        section(out, "Sleep Interruption SLO Violations")?;
        let mut slo = Table::new(["Responder", "ISO Week", "Interruptions"]);
        for v in &report.slo_violations {
            slo.push_row(vec![
                v.responder.clone(),
                format!("{}-W{:02}", v.iso_year, v.week),
                v.interruptions.to_string(),
            ]);
        }
        write!(out, "{}", slo.render())?;
    }

    if !report.excluded_services.is_empty() {
        writeln!(
            out,
            "\n{} {}",
            "Services not counted:".yellow(),
            report.excluded_services.join(", ")
        )?;
    }

    writeln!(
        out,
        "\n{} alerts • {} off-hour • {} sleep-hour interruptions",
        report.alert_total.to_string().bright_white().bold(),
        report.off_hour_total.to_string().bright_yellow().bold(),
        report.sleep_hour_total.to_string().bright_red().bold()
    )
}
