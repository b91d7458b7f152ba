//! cellar - Cellar notice statistics CLI
//!
//! Runs the daily, period and competition dashboards against the public
//! endpoints (or the ones in `--config`) and prints a summary or JSON.

use anyhow::Context;
use cellar_core::config::CellarConfig;
use cellar_core::errors::CellarError;
use cellar_core::window::parse_date;
use cellar_core::{
    default_daily_date, default_period, CompetitionReport, DailyReport, Dashboard, DateWindow,
    NoticeTypeCode, PeriodReport, QueryBuilder, QueryProfile, RestCount,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellar")]
#[command(version)]
#[command(about = "Cellar notice statistics", long_about = None)]
struct Cli {
    /// Dashboard configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Notices of one day, reconciled against the TED search API
    Daily {
        /// Publication date (YYYY-MM-DD); defaults to the last publication day
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Notice counts and Cellar upload activity over a period
    Period {
        /// First day (YYYY-MM-DD); defaults to 90 days ago
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Restrict to notice types (e.g. cn-standard); repeatable
        #[arg(long = "type", value_parser = parse_code)]
        types: Vec<NoticeTypeCode>,
    },
    /// Calls for competition of one day per buyer country
    Competition {
        /// Publication date (YYYY-MM-DD); defaults to the last publication day
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Print the SPARQL of a query profile without running it
    Query {
        /// daily-notices, notice-counts-by-date, pipeline-activity or competition-notices
        #[arg(value_parser = parse_profile)]
        profile: QueryProfile,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(long = "type", value_parser = parse_code)]
        types: Vec<NoticeTypeCode>,
    },
}

fn parse_code(value: &str) -> Result<NoticeTypeCode, CellarError> {
    NoticeTypeCode::new(value)
}

fn parse_profile(value: &str) -> Result<QueryProfile, CellarError> {
    value.parse()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Window from optional bounds. Missing bounds fall back to the default
/// period; a single `--from` or `--to` keeps the other default.
fn window_from(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<DateWindow, CellarError> {
    let default = default_period(today());
    DateWindow::new(from.unwrap_or(default.start()), to.unwrap_or(default.end()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cellar_core::logging::init(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Daily { date } => {
            let date = date.unwrap_or_else(|| default_daily_date(today()));
            let report = dashboard(config)?
                .daily(date)
                .await
                .with_context(|| format!("daily dashboard for {} failed", date))?;
            emit(&report, cli.json, print_daily)?;
        }
        Commands::Period { from, to, types } => {
            let window = window_from(from, to)?;
            let filters: BTreeSet<NoticeTypeCode> = types.into_iter().collect();
            let report = dashboard(config)?
                .period(&window, &filters)
                .await
                .with_context(|| format!("period dashboard for {} failed", window))?;
            emit(&report, cli.json, print_period)?;
        }
        Commands::Competition { date } => {
            let date = date.unwrap_or_else(|| default_daily_date(today()));
            let report = dashboard(config)?
                .competition(date)
                .await
                .with_context(|| format!("competition dashboard for {} failed", date))?;
            emit(&report, cli.json, print_competition)?;
        }
        Commands::Query {
            profile,
            from,
            to,
            types,
        } => {
            let window = match (from, to) {
                (None, None) => DateWindow::single_day(default_daily_date(today())),
                (from, to) => window_from(from, to)?,
            };
            let filters: BTreeSet<NoticeTypeCode> = types.into_iter().collect();
            let query = QueryBuilder::build(profile, &window, &filters)?;
            println!("{}", query);
        }
    }

    Ok(())
}

fn dashboard(config: Option<&Path>) -> anyhow::Result<Dashboard> {
    let config = CellarConfig::load_or_default(config).context("failed to load configuration")?;
    Ok(Dashboard::from_config(&config)?)
}

fn emit<T: Serialize>(report: &T, json: bool, print: fn(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print(report);
    }
    Ok(())
}

fn rest_cell(count: &RestCount, graph: u64) -> String {
    match count {
        RestCount::Counted(n) if *n == graph => format!("{} {}", n, "✓".green()),
        RestCount::Counted(n) => {
            let diff = graph as i64 - *n as i64;
            format!("{} {}", n, format!("({:+})", diff).yellow())
        }
        RestCount::NotAttempted => "-".dimmed().to_string(),
        RestCount::Unavailable { reason } => format!("{} {}", "unavailable".red(), reason.dimmed()),
    }
}

fn print_breakdown(title: &str, breakdown: &std::collections::BTreeMap<String, u64>) {
    println!("\n{}", title.bold());
    let width = breakdown.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    for (label, count) in breakdown {
        println!("  {:<width$}  {:>6}", label, count, width = width);
    }
}

fn print_daily(report: &DailyReport) {
    let result = &report.reconciliation;
    println!("{} {}", "Daily notices".bold(), report.date);
    println!("  Cellar (SPARQL):       {}", result.graph_count);
    println!("  TED API:               {}", rest_cell(&result.rest_count, result.graph_count));
    println!(
        "  TED API, same types:   {}",
        rest_cell(&result.rest_count_same_filter, result.graph_count)
    );

    print_breakdown("Notices by type", &result.breakdown_by_type);
    print_breakdown("Notices by form", &result.breakdown_by_form);

    if !result.unknown_labels.is_empty() {
        println!(
            "\n{} {} URI(s) without a label",
            "warning:".yellow(),
            result.unknown_labels.len()
        );
    }
    if !result.unusable_notice_types.is_empty() {
        let rows: u64 = result.unusable_notice_types.values().sum();
        println!(
            "{} {} notice(s) with a notice type outside the TED comparison",
            "warning:".yellow(),
            rows
        );
    }
}

fn print_period(report: &PeriodReport) {
    println!("{} {}", "Notices published".bold(), report.window);
    println!("  Total: {}", report.total);
    print_breakdown("Notices by type", &report.by_type);

    println!("\n{}", "Notices by publication date".bold());
    for (date, count) in &report.by_date {
        println!("  {}  {:>6}", date, count);
    }

    println!("\n{}", "Cellar upload activity".bold());
    for day in &report.activity {
        println!(
            "  {}  {:>6}  published {}..{}",
            day.date_updated, day.document_count, day.min_publication_date, day.max_publication_date
        );
    }
}

fn print_competition(report: &CompetitionReport) {
    println!("{} {}", "Calls for competition".bold(), report.date);
    println!("  Notices: {}", report.notices.len());

    println!("\n{}", "Notices by buyer country".bold());
    for country in &report.countries.countries {
        println!("  {} {:<24} {:>6}", country.id, country.name, country.count);
    }
    if !report.countries.unmapped.is_empty() {
        let codes: Vec<&str> = report.countries.unmapped.keys().map(String::as_str).collect();
        println!(
            "\n{} {} notice(s) from unmapped countries: {}",
            "warning:".yellow(),
            report.countries.unmapped_total(),
            codes.join(", ")
        );
    }
}
