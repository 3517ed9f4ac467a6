//! Delimited-text export in three fixed column schemas
//!
//! Output is UTF-8 with a byte-order mark and CRLF line endings so that
//! spreadsheet applications detect the encoding.

use std::str::FromStr;

use chrono::FixedOffset;

use super::{display_time, format_km, sorted_by_date, worked_symbol, ExportContext, ReportExporter};
use crate::services::{duration, odometer, OdometerPolicy};
use crate::types::{DailyReport, LogbookError, Result};

/// UTF-8 byte-order mark
pub const BOM: &str = "\u{FEFF}";

const BASIC_HEADERS: [&str; 8] = [
    "日付",
    "稼働",
    "開始時刻",
    "終了時刻",
    "距離(km)",
    "配送件数",
    "高速代",
    "備考",
];

const DETAILED_HEADERS: [&str; 11] = [
    "日付",
    "稼働状況",
    "開始時刻",
    "終了時刻",
    "作業時間",
    "走行距離(km)",
    "配送件数",
    "高速代",
    "備考",
    "作成日",
    "更新日",
];

const ACCOUNTING_HEADERS: [&str; 9] = [
    "作業日",
    "稼働フラグ",
    "開始",
    "終了",
    "時間",
    "距離",
    "配送件数",
    "高速代",
    "メモ",
];

/// CSV column schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvSchema {
    #[default]
    Basic,
    Detailed,
    Accounting,
}

impl CsvSchema {
    pub fn all() -> &'static [CsvSchema] {
        &[Self::Basic, Self::Detailed, Self::Accounting]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
            Self::Accounting => "accounting",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Basic => "基本形式",
            Self::Detailed => "詳細形式",
            Self::Accounting => "経理用形式",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Basic => "日付、稼働状況、時間、距離、配送件数、高速代、備考",
            Self::Detailed => "基本情報 + 作業時間計算 + 作成・更新日時",
            Self::Accounting => "会計ソフト向けの数値形式（稼働フラグ、時間を小数点表示）",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &BASIC_HEADERS,
            Self::Detailed => &DETAILED_HEADERS,
            Self::Accounting => &ACCOUNTING_HEADERS,
        }
    }
}

impl FromStr for CsvSchema {
    type Err = LogbookError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            "accounting" => Ok(Self::Accounting),
            other => Err(LogbookError::validation(format!(
                "unsupported export schema {:?} (expected basic, detailed or accounting)",
                other
            ))),
        }
    }
}

/// Render `reports` as CSV text in `schema`, BOM-prefixed, rows in date order
pub fn generate_csv(
    reports: &[DailyReport],
    schema: CsvSchema,
    policy: OdometerPolicy,
    utc_offset: FixedOffset,
) -> Result<String> {
    // Rows are built first so a malformed report fails before any output exists
    let rows = sorted_by_date(reports)
        .into_iter()
        .map(|report| match schema {
            CsvSchema::Basic => basic_row(report, policy),
            CsvSchema::Detailed => detailed_row(report, policy, utc_offset),
            CsvSchema::Accounting => accounting_row(report, policy),
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::from(BOM.as_bytes()));

    writer
        .write_record(schema.headers())
        .map_err(|e| LogbookError::Export(format!("CSV write error: {e}")))?;
    for row in &rows {
        writer
            .write_record(row)
            .map_err(|e| LogbookError::Export(format!("CSV write error: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LogbookError::Export(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| LogbookError::Export(format!("CSV encoding error: {e}")))
}

/// Work-detail columns shared by all schemas; blank on days off
struct WorkCells {
    start: String,
    end: String,
    minutes: Option<u32>,
    distance: String,
    deliveries: String,
    highway_fee: String,
}

impl WorkCells {
    fn of(report: &DailyReport, policy: OdometerPolicy) -> Result<Self> {
        if !report.is_worked {
            return Ok(Self {
                start: String::new(),
                end: String::new(),
                minutes: None,
                distance: String::new(),
                deliveries: String::new(),
                highway_fee: String::new(),
            });
        }

        Ok(Self {
            start: display_time(report.start_time.as_deref())?,
            end: display_time(report.end_time.as_deref())?,
            minutes: duration::work_minutes(report.start_time.as_deref(), report.end_time.as_deref())?,
            distance: odometer::distance(report.start_odometer, report.end_odometer, policy)
                .map(format_km)
                .unwrap_or_default(),
            deliveries: report.deliveries.map(|d| d.to_string()).unwrap_or_default(),
            highway_fee: report.highway_fee.map(|f| f.to_string()).unwrap_or_default(),
        })
    }
}

fn basic_row(report: &DailyReport, policy: OdometerPolicy) -> Result<Vec<String>> {
    let cells = WorkCells::of(report, policy)?;
    Ok(vec![
        report.date.format("%Y-%m-%d").to_string(),
        worked_symbol(report.is_worked).to_string(),
        cells.start,
        cells.end,
        cells.distance,
        cells.deliveries,
        cells.highway_fee,
        report.notes_or_empty().to_string(),
    ])
}

fn detailed_row(
    report: &DailyReport,
    policy: OdometerPolicy,
    utc_offset: FixedOffset,
) -> Result<Vec<String>> {
    let cells = WorkCells::of(report, policy)?;
    Ok(vec![
        report.date.format("%Y-%m-%d").to_string(),
        if report.is_worked { "稼働" } else { "休日" }.to_string(),
        cells.start,
        cells.end,
        cells
            .minutes
            .map(duration::format_hours_minutes)
            .unwrap_or_default(),
        cells.distance,
        cells.deliveries,
        cells.highway_fee,
        report.notes_or_empty().to_string(),
        report
            .created_at
            .with_timezone(&utc_offset)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        report
            .updated_at
            .with_timezone(&utc_offset)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    ])
}

fn accounting_row(report: &DailyReport, policy: OdometerPolicy) -> Result<Vec<String>> {
    let cells = WorkCells::of(report, policy)?;
    Ok(vec![
        report.date.format("%Y/%m/%d").to_string(),
        if report.is_worked { "1" } else { "0" }.to_string(),
        cells.start,
        cells.end,
        duration::format_decimal_hours(cells.minutes.unwrap_or(0)),
        cells.distance,
        cells.deliveries,
        cells.highway_fee,
        report.notes_or_empty().to_string(),
    ])
}

/// CSV exporter for one schema
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    schema: CsvSchema,
}

impl CsvExporter {
    pub fn new(schema: CsvSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> CsvSchema {
        self.schema
    }
}

impl ReportExporter for CsvExporter {
    fn name(&self) -> &str {
        match self.schema {
            CsvSchema::Basic => "csv-basic",
            CsvSchema::Detailed => "csv-detailed",
            CsvSchema::Accounting => "csv-accounting",
        }
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn file_name(&self, ctx: &ExportContext<'_>) -> String {
        ctx.labels.csv_file_name(ctx.period, self.schema)
    }

    fn render(&self, reports: &[DailyReport], ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
        tracing::debug!(schema = self.schema.name(), rows = reports.len(), "rendering CSV");
        generate_csv(reports, self.schema, ctx.policy, ctx.utc_offset).map(String::into_bytes)
    }
}
