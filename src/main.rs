use anyhow::{Context, Result};
use clap::Parser;
use pager_interrupts::analyzer::{incident_query, AnalyzerSettings, InterruptionAnalyzer};
use pager_interrupts::config::{split_ids, Config, TOKEN_ENV};
use pager_interrupts::display::{DisplayManager, OutputFormat};
use pager_interrupts::error::AnalyzeError;
use pager_interrupts::logging;
use pager_interrupts::pagerduty::PagerDutyClient;
use pager_interrupts::window::ReportWindow;
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{info, Instrument};

#[derive(Parser)]
#[command(name = "pager-interrupts")]
#[command(about = "Report sleep-hour and off-hour pages for PagerDuty responders")]
#[command(version)]
#[command(after_help = "Requires the PAGERDUTY_API_TOKEN environment variable.")]
struct Cli {
    /// First year of the window (default: current year)
    #[arg(long)]
    start_year: Option<i32>,
    /// First month of the window, 1-12 (default: current month)
    #[arg(long)]
    start_month: Option<u32>,
    /// Year of the exclusive end month (default: month after the start)
    #[arg(long)]
    end_year: Option<i32>,
    /// Exclusive end month, 1-12 (default: month after the start)
    #[arg(long)]
    end_month: Option<u32>,
    /// Comma-separated team ids to filter incidents by
    #[arg(long)]
    teams: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// CSV output path (default: report.csv)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Config file to load instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.format == OutputFormat::Json;

    let token = match env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            eprintln!("env {} is required", TOKEN_ENV);
            eprintln!("Usage: {}=<token> pager-interrupts [OPTIONS]", TOKEN_ENV);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli, &token).await {
        handle_error(e, json);
    }
}

async fn run(cli: Cli, token: &str) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(teams) = &cli.teams {
        config.query.team_ids = split_ids(teams);
    }

    let _log_guard = logging::init_logging(&config.logging);
    match &config.source {
        Some(path) => info!(config_file = %path.display(), "Loaded configuration from file"),
        None => info!("No config file found, using defaults"),
    }

    let today = chrono::Utc::now().date_naive();
    let window = ReportWindow::from_flags(
        today,
        cli.start_year,
        cli.start_month,
        cli.end_year,
        cli.end_month,
    )?;

    let client = PagerDutyClient::new(
        token,
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )
    .context("Failed to build PagerDuty client")?;
    let analyzer = InterruptionAnalyzer::with_settings(&client, AnalyzerSettings::from_config(&config)?);

    let span = logging::run_span();
    let query = incident_query(&config, window.since, window.until);
    let report = async {
        info!(window = %window, teams = ?query.team_ids, "Starting report");
        analyzer.analyze(&query).await
    }
    .instrument(span)
    .await?;

    let mut display = DisplayManager::new(&config.output);
    if let Some(path) = cli.output {
        display = display.with_csv_path(path);
    }
    display.emit(&report, cli.format)
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    let rate_limited = e
        .downcast_ref::<AnalyzeError>()
        .map(AnalyzeError::is_rate_limited)
        .unwrap_or(false);

    if json {
        let body = serde_json::json!({
            "error": format!("{:#}", e),
            "rate_limited": rate_limited,
        });
        println!("{}", body);
    } else if rate_limited {
        eprintln!("rate limited");
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
