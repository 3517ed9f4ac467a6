mod add;
mod export;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::config::LogbookConfig;
use crate::services::{
    duration, odometer, paginate, Aggregator, OdometerPolicy, ReportFilter, ReportStore,
    WorkStatus, ITEMS_PER_PAGE,
};
use crate::types::{DailyReport, Driver, MonthlyStats, Period, Result};

pub use add::AddArgs;
pub use export::ExportArgs;

/// Daily work logbook for delivery drivers
#[derive(Parser)]
#[command(name = "logbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.driver-logbook/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Act as this driver id instead of the configured one
    #[arg(long, global = true, value_name = "ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui,

    /// Create or update a daily report
    Add(AddArgs),

    /// Delete a report
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// List reports, newest first
    List {
        /// First date (inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date (inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// all, worked or off
        #[arg(long, default_value = "all")]
        status: WorkStatus,
        /// Substring of the notes
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show statistics for a month (default: current month)
    Stats {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export reports as CSV or PDF
    Export(ExportArgs),

    /// List available export formats
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Resolved configuration, acting driver and store for one invocation
pub struct AppContext {
    pub config: LogbookConfig,
    pub driver: Driver,
    pub store: ReportStore,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>, user: Option<&str>) -> Result<Self> {
        let config = LogbookConfig::load(config_path)?;
        let driver = config.driver(user);
        let store = ReportStore::open(&config.data_dir()?, config.store_policy())?;
        Ok(Self {
            config,
            driver,
            store,
        })
    }

    /// Today in the configured offset
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.offset()).date_naive()
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        if let Some(Commands::Formats { json }) = self.command {
            return print_formats(json);
        }

        let ctx = AppContext::load(self.config.as_deref(), self.user.as_deref())?;

        match self.command {
            None | Some(Commands::Tui) => crate::tui::run(ctx),
            Some(Commands::Add(args)) => args.run(&ctx),
            Some(Commands::Delete { id }) => {
                let deleted = ctx.store.delete(&ctx.driver, id)?;
                println!("Deleted report {} ({})", deleted.id, deleted.date);
                Ok(())
            }
            Some(Commands::List {
                from,
                to,
                status,
                search,
                page,
                json,
            }) => {
                let filter = ReportFilter {
                    date_from: from,
                    date_to: to,
                    status,
                    search,
                };
                run_list(&ctx, &filter, page, json)
            }
            Some(Commands::Stats { year, month, json }) => {
                let period = match (year, month) {
                    (Some(y), Some(m)) => Period::month(y, m)?,
                    _ => Period::month_of(ctx.today()),
                };
                run_stats(&ctx, &period, json)
            }
            Some(Commands::Export(args)) => args.run(&ctx),
            Some(Commands::Formats { .. }) => Ok(()),
        }
    }
}

fn run_list(ctx: &AppContext, filter: &ReportFilter, page: usize, json: bool) -> anyhow::Result<()> {
    let reports = ctx.store.list(&ctx.driver);
    let matching: Vec<DailyReport> = filter.apply(&reports).into_iter().cloned().collect();
    let slice = paginate(&matching, page, ITEMS_PER_PAGE);

    if json {
        println!("{}", serde_json::to_string_pretty(&slice)?);
        return Ok(());
    }

    if slice.items.is_empty() {
        println!("No reports found");
        return Ok(());
    }

    let policy = ctx.config.odometer_policy();
    for report in &slice.items {
        println!("{}", list_line(report, policy));
    }
    println!(
        "-- page {}/{} ({} reports)",
        slice.page, slice.total_pages, slice.total_items
    );
    Ok(())
}

fn list_line(report: &DailyReport, policy: OdometerPolicy) -> String {
    let mark = if report.is_worked { "○" } else { "×" };
    if !report.is_worked {
        return format!("{:>5}  {}  {}  {}", report.id, report.date, mark, report.notes_or_empty());
    }

    let hours = match duration::work_minutes(
        report.start_time.as_deref(),
        report.end_time.as_deref(),
    ) {
        Ok(Some(minutes)) => duration::format_hours_minutes_compact(minutes),
        Ok(None) => "-".to_string(),
        Err(_) => "invalid".to_string(),
    };
    let km = odometer::distance(report.start_odometer, report.end_odometer, policy)
        .map(|km| format!("{:.1}km", km))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:>5}  {}  {}  {}-{}  {}  {}  {}件  ¥{}  {}",
        report.id,
        report.date,
        mark,
        report.start_time.as_deref().unwrap_or("--:--"),
        report.end_time.as_deref().unwrap_or("--:--"),
        hours,
        km,
        report.deliveries.unwrap_or(0),
        report.highway_fee.unwrap_or(0),
        report.notes_or_empty()
    )
}

fn run_stats(ctx: &AppContext, period: &Period, json: bool) -> anyhow::Result<()> {
    let reports = ctx.store.list_period(&ctx.driver, period);
    let stats = Aggregator::stats(&reports, period, ctx.config.odometer_policy())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} ({})", ctx.config.labels.period_display(period), ctx.driver.name);
    for line in stats_lines(&stats) {
        println!("  {}", line);
    }
    Ok(())
}

fn stats_lines(stats: &MonthlyStats) -> Vec<String> {
    vec![
        format!("稼働日数:     {}日", stats.working_days),
        format!("総走行距離:   {:.1}km", stats.total_distance_km),
        format!("総作業時間:   {:.1}時間", stats.total_work_hours),
        format!("総配送件数:   {}件", stats.total_deliveries),
        format!("高速代合計:   {}円", stats.total_highway_fee),
        format!("平均走行距離: {:.1}km/日", stats.average_distance_km),
        format!("平均配送件数: {:.1}件/日", stats.average_deliveries),
        format!("平均作業時間: {:.1}時間/日", stats.average_work_hours),
    ]
}

fn print_formats(json: bool) -> anyhow::Result<()> {
    let formats = crate::export::catalogue();
    if json {
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }
    for f in formats {
        println!("{:<4} {:<11} {}  {}", f.kind, f.value, f.label, f.description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["logbook"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["logbook", "stats", "--user", "bob", "--config", "/tmp/c.json"])
                .unwrap();
        assert_eq!(cli.user.as_deref(), Some("bob"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn test_cli_parse_list() {
        let cli = Cli::try_parse_from([
            "logbook", "list", "--from", "2025-03-01", "--status", "off", "--page", "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::List {
                from, status, page, ..
            }) => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 1));
                assert_eq!(status, WorkStatus::Off);
                assert_eq!(page, 2);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["logbook", "list", "--status", "busy"]).is_err());
    }

    #[test]
    fn test_cli_stats_requires_year_and_month_together() {
        assert!(Cli::try_parse_from(["logbook", "stats", "--year", "2025"]).is_err());
        let cli = Cli::try_parse_from(["logbook", "stats", "--year", "2025", "--month", "3"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Stats {
                year: Some(2025),
                month: Some(3),
                json: false
            })
        ));
    }

    #[test]
    fn test_cli_parse_delete() {
        let cli = Cli::try_parse_from(["logbook", "delete", "42"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Delete { id: 42 })));
    }

    #[test]
    fn test_list_line_off_day() {
        let report: DailyReport = serde_json::from_str(
            r#"{"id": 3, "user_id": "d", "date": "2025-03-02", "is_worked": false,
                "notes": "休み",
                "created_at": "2025-03-02T00:00:00Z", "updated_at": "2025-03-02T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            list_line(&report, OdometerPolicy::Strict),
            "    3  2025-03-02  ×  休み"
        );
    }

    #[test]
    fn test_list_line_marks_invalid_time() {
        let json = r#"{"id": 4, "user_id": "d", "date": "2025-03-03", "is_worked": true,
                "start_time": "08:00", "end_time": "8時",
                "created_at": "2025-03-03T00:00:00Z", "updated_at": "2025-03-03T00:00:00Z"}"#;
        let mut report: DailyReport = serde_json::from_str(json).unwrap();
        let line = list_line(&report, OdometerPolicy::Strict);
        assert!(line.contains("  invalid  "), "{}", line);

        report.end_time = None;
        let line = list_line(&report, OdometerPolicy::Strict);
        assert!(!line.contains("invalid"));
        assert!(line.contains("08:00---:--  -  "), "{}", line);
    }

    #[test]
    fn test_stats_lines() {
        let stats = MonthlyStats {
            working_days: 3,
            total_distance_km: 60.0,
            ..Default::default()
        }
        .with_averages();
        let lines = stats_lines(&stats);
        assert_eq!(lines[0], "稼働日数:     3日");
        assert_eq!(lines[5], "平均走行距離: 20.0km/日");
    }
}
