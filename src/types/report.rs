//! Daily report records and the acting driver

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One driver's record for one calendar day, as persisted by the store.
///
/// Work-detail fields are only meaningful when `is_worked` is true; every
/// consumer checks the flag before reading them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyReport {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub is_worked: bool,
    /// `HH:MM`, validated when a duration is computed
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub start_odometer: Option<f64>,
    #[serde(default)]
    pub end_odometer: Option<f64>,
    #[serde(default)]
    pub deliveries: Option<u32>,
    /// Highway tolls in yen
    #[serde(default)]
    pub highway_fee: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Cached copy written by the store; never read back for computation
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyReport {
    /// Notes, or "" when absent
    pub fn notes_or_empty(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// Input for creating or updating a report.
///
/// With `id` set the matching report is updated; otherwise the driver's
/// report for `date` is replaced, or a new one inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDraft {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub is_worked: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_odometer: Option<f64>,
    pub end_odometer: Option<f64>,
    pub deliveries: Option<u32>,
    pub highway_fee: Option<u32>,
    pub notes: Option<String>,
}

impl ReportDraft {
    /// A draft for `date` with every optional field empty
    pub fn new(date: NaiveDate, is_worked: bool) -> Self {
        Self {
            id: None,
            date,
            is_worked,
            start_time: None,
            end_time: None,
            start_odometer: None,
            end_odometer: None,
            deliveries: None,
            highway_fee: None,
            notes: None,
        }
    }
}

/// The driver on whose behalf an operation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Driver {
    pub id: String,
    pub name: String,
}

impl Default for Driver {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "ユーザー".to_string(),
        }
    }
}
