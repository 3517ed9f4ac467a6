//! Locale labels used in exported file names and headings

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::csv::CsvSchema;
use crate::types::{Period, PeriodKind};

/// User-facing literals for exports. Defaults are Japanese; every field can be
/// overridden from the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportLabels {
    /// Record name used as the CSV file prefix
    pub report_name: String,
    /// PDF document title and file prefix
    pub pdf_title: String,
    pub year_unit: String,
    pub month_unit: String,
    pub basic_suffix: String,
    pub detailed_suffix: String,
    pub accounting_suffix: String,
}

impl Default for ExportLabels {
    fn default() -> Self {
        Self {
            report_name: "日報".to_string(),
            pdf_title: "運転手業務月次レポート".to_string(),
            year_unit: "年".to_string(),
            month_unit: "月".to_string(),
            basic_suffix: "基本".to_string(),
            detailed_suffix: "詳細".to_string(),
            accounting_suffix: "経理用".to_string(),
        }
    }
}

impl ExportLabels {
    /// Human-readable period: "2025年3月", "2025年", "2025/3/1 - 2025/3/31"
    pub fn period_display(&self, period: &Period) -> String {
        match period.kind() {
            PeriodKind::Month { year, month } => {
                format!("{}{}{}{}", year, self.year_unit, month, self.month_unit)
            }
            PeriodKind::Year(year) => format!("{}{}", year, self.year_unit),
            PeriodKind::Range => {
                let (s, e) = (period.start(), period.end());
                format!(
                    "{}/{}/{} - {}/{}/{}",
                    s.year(),
                    s.month(),
                    s.day(),
                    e.year(),
                    e.month(),
                    e.day()
                )
            }
        }
    }

    /// Period as used inside file names: "2025年03月", "2025年", "2025-03-01_2025-03-31"
    pub fn period_file_part(&self, period: &Period) -> String {
        match period.kind() {
            PeriodKind::Month { year, month } => {
                format!("{}{}{:02}{}", year, self.year_unit, month, self.month_unit)
            }
            PeriodKind::Year(year) => format!("{}{}", year, self.year_unit),
            PeriodKind::Range => format!(
                "{}_{}",
                period.start().format("%Y-%m-%d"),
                period.end().format("%Y-%m-%d")
            ),
        }
    }

    pub fn schema_suffix(&self, schema: CsvSchema) -> &str {
        match schema {
            CsvSchema::Basic => &self.basic_suffix,
            CsvSchema::Detailed => &self.detailed_suffix,
            CsvSchema::Accounting => &self.accounting_suffix,
        }
    }

    /// `<record>_<period>_<suffix>.csv`
    pub fn csv_file_name(&self, period: &Period, schema: CsvSchema) -> String {
        format!(
            "{}_{}_{}.csv",
            self.report_name,
            self.period_file_part(period),
            self.schema_suffix(schema)
        )
    }

    /// `<title>_<period>.pdf`
    pub fn pdf_file_name(&self, period: &Period) -> String {
        format!("{}_{}.pdf", self.pdf_title, self.period_file_part(period))
    }
}
