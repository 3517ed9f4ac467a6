//! Report exporters (CSV and PDF)
//!
//! Every exporter receives reports that the caller has already narrowed to
//! the export period, sorts them chronologically, and renders one complete
//! artifact or fails as a whole.

pub mod csv;
pub mod labels;
pub mod layout;
pub mod pdf;

pub use self::csv::{CsvExporter, CsvSchema};
pub use labels::ExportLabels;
pub use pdf::PdfExporter;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Weekday};
use serde::Serialize;

use crate::services::{duration, OdometerPolicy};
use crate::types::{round1, DailyReport, Driver, Period, Result};

/// Everything an exporter needs besides the reports themselves
#[derive(Debug, Clone)]
pub struct ExportContext<'a> {
    pub period: &'a Period,
    pub driver: &'a Driver,
    pub labels: &'a ExportLabels,
    pub policy: OdometerPolicy,
    /// Offset used to display stored UTC timestamps
    pub utc_offset: FixedOffset,
    /// Shown in the PDF footer; passed in so rendering stays deterministic
    pub generated_at: DateTime<FixedOffset>,
}

/// Trait for rendering a report list into a downloadable artifact
pub trait ReportExporter {
    /// Exporter name (e.g., "csv-basic")
    fn name(&self) -> &str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Auto-generated file name for this export
    fn file_name(&self, ctx: &ExportContext<'_>) -> String;

    /// Render the artifact. Empty input yields a header-only artifact.
    fn render(&self, reports: &[DailyReport], ctx: &ExportContext<'_>) -> Result<Vec<u8>>;
}

/// Entry in the export format catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub kind: &'static str,
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// All export formats the tool offers, for help screens and `logbook formats`
pub fn catalogue() -> Vec<FormatInfo> {
    let mut formats: Vec<FormatInfo> = CsvSchema::all()
        .iter()
        .map(|schema| FormatInfo {
            kind: "csv",
            value: schema.name(),
            label: schema.display_name(),
            description: schema.description(),
        })
        .collect();

    formats.extend([
        FormatInfo {
            kind: "pdf",
            value: "monthly",
            label: "月次レポート",
            description: "指定した月の日報データをPDF出力",
        },
        FormatInfo {
            kind: "pdf",
            value: "custom",
            label: "カスタム期間",
            description: "任意の期間の日報データをPDF出力",
        },
        FormatInfo {
            kind: "pdf",
            value: "annual",
            label: "年間レポート",
            description: "指定した年の全日報データをPDF出力",
        },
    ]);
    formats
}

/// Reports in ascending date order; equal dates keep their input order
pub(crate) fn sorted_by_date(reports: &[DailyReport]) -> Vec<&DailyReport> {
    let mut sorted: Vec<&DailyReport> = reports.iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

/// ○ / ×
pub(crate) fn worked_symbol(is_worked: bool) -> &'static str {
    if is_worked {
        "○"
    } else {
        "×"
    }
}

/// Distance rounded to one decimal, without a trailing ".0": 60.0 → "60"
pub(crate) fn format_km(km: f64) -> String {
    format!("{}", round1(km))
}

/// Normalised `HH:MM`, or "" when absent. Malformed input is an error.
pub(crate) fn display_time(raw: Option<&str>) -> Result<String> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(duration::ClockTime::parse(s)?.to_string()),
        _ => Ok(String::new()),
    }
}

/// "3/5(水)"
pub(crate) fn short_date_ja(date: NaiveDate) -> String {
    format!("{}/{}({})", date.month(), date.day(), weekday_ja(date.weekday()))
}

fn weekday_ja(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}
