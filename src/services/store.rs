//! File-backed report store
//!
//! Reports live in one JSON file per calendar month under
//! `<data_dir>/reports/YYYY-MM.json`. Writers serialize on an exclusive lock
//! and replace month files atomically (temp file + rename); readers take a
//! shared lock on the month file they read.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Utc};
use fs2::FileExt;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::services::{duration, odometer, OdometerPolicy};
use crate::types::{
    DailyReport, Driver, LogbookError, Period, ReportDraft, Result, StoreWarning,
};

/// On-disk format version of month files
pub const STORE_VERSION: u32 = 1;

const LOCK_FILE: &str = ".lock";

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthFile {
    pub version: u32,
    pub reports: Vec<DailyReport>,
}

/// Write-time validation rules
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StorePolicy {
    pub odometer: OdometerPolicy,
    /// Longest accepted shift; `None` disables the check
    pub max_shift_hours: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    reports_dir: PathBuf,
    policy: StorePolicy,
}

impl ReportStore {
    /// Open the store under `data_dir`, creating the reports directory
    pub fn open(data_dir: &Path, policy: StorePolicy) -> Result<Self> {
        let reports_dir = data_dir.join("reports");
        fs::create_dir_all(&reports_dir)?;
        Ok(Self {
            reports_dir,
            policy,
        })
    }

    pub fn with_reports_dir(reports_dir: PathBuf) -> Self {
        Self {
            reports_dir,
            policy: StorePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn month_path(&self, year: i32, month: u32) -> PathBuf {
        self.reports_dir.join(format!("{:04}-{:02}.json", year, month))
    }

    /// All of the driver's reports, newest first. Unreadable month files are
    /// skipped and logged.
    pub fn list(&self, driver: &Driver) -> Vec<DailyReport> {
        let (reports, warnings) = self.list_with_warnings(driver);
        log_warnings(&warnings);
        reports
    }

    /// Like [`list`](Self::list), returning load problems instead of logging them
    pub fn list_with_warnings(&self, driver: &Driver) -> (Vec<DailyReport>, Vec<StoreWarning>) {
        let (all, warnings) = self.load_all();
        let mut reports: Vec<DailyReport> = all
            .into_iter()
            .filter(|r| r.user_id == driver.id)
            .collect();
        sort_newest_first(&mut reports);
        (reports, warnings)
    }

    /// The driver's reports inside `period`, newest first
    pub fn list_period(&self, driver: &Driver, period: &Period) -> Vec<DailyReport> {
        let files: Vec<PathBuf> = months_in(period)
            .into_iter()
            .map(|(y, m)| self.month_path(y, m))
            .filter(|p| p.exists())
            .collect();

        let (loaded, warnings) = load_files(&files);
        log_warnings(&warnings);

        let mut reports: Vec<DailyReport> = loaded
            .into_iter()
            .filter(|r| r.user_id == driver.id && period.contains(r.date))
            .collect();
        sort_newest_first(&mut reports);
        reports
    }

    pub fn get_by_id(&self, driver: &Driver, id: i64) -> Option<DailyReport> {
        self.list(driver).into_iter().find(|r| r.id == id)
    }

    pub fn get_by_date(&self, driver: &Driver, date: NaiveDate) -> Option<DailyReport> {
        let path = self.month_path(date.year(), date.month());
        if !path.exists() {
            return None;
        }
        match load_month_file(&path) {
            Ok(reports) => reports
                .into_iter()
                .find(|r| r.user_id == driver.id && r.date == date),
            Err(warning) => {
                log_warnings(&[warning]);
                None
            }
        }
    }

    /// End reading of the driver's most recent worked day that has one
    pub fn latest_odometer(&self, driver: &Driver) -> Option<f64> {
        self.list(driver)
            .into_iter()
            .filter(|r| r.is_worked)
            .find_map(|r| r.end_odometer)
    }

    /// Create or update a report.
    ///
    /// With `draft.id` the driver's report with that id is updated (and moved
    /// if the date changed). Without it, the driver's report for `draft.date`
    /// is replaced, or a new report is inserted with the next free id.
    pub fn upsert(&self, driver: &Driver, draft: ReportDraft) -> Result<DailyReport> {
        let draft = normalize_draft(draft);
        self.validate(&draft)?;

        let _lock = self.write_lock()?;
        let all = self.load_all_strict()?;

        let existing = match draft.id {
            Some(id) => Some(
                all.iter()
                    .find(|r| r.id == id && r.user_id == driver.id)
                    .cloned()
                    .ok_or_else(|| LogbookError::Store(format!("report {} not found", id)))?,
            ),
            None => all
                .iter()
                .find(|r| r.user_id == driver.id && r.date == draft.date)
                .cloned(),
        };

        if let Some(clash) = all.iter().find(|r| {
            r.user_id == driver.id
                && r.date == draft.date
                && existing.as_ref().map_or(true, |e| e.id != r.id)
        }) {
            return Err(LogbookError::validation(format!(
                "a report for {} already exists (id {})",
                clash.date, clash.id
            )));
        }

        let now = Utc::now();
        let (id, created_at) = match &existing {
            Some(e) => (e.id, e.created_at),
            None => (all.iter().map(|r| r.id).max().unwrap_or(0) + 1, now),
        };

        let report = DailyReport {
            id,
            user_id: driver.id.clone(),
            date: draft.date,
            is_worked: draft.is_worked,
            distance_km: odometer::distance(
                draft.start_odometer,
                draft.end_odometer,
                self.policy.odometer,
            ),
            start_time: draft.start_time,
            end_time: draft.end_time,
            start_odometer: draft.start_odometer,
            end_odometer: draft.end_odometer,
            deliveries: draft.deliveries,
            highway_fee: draft.highway_fee,
            notes: draft.notes,
            created_at,
            updated_at: now,
        };

        if let Some(old) = existing.as_ref().filter(|e| !same_month(e.date, report.date)) {
            self.modify_month(old.date, |reports| reports.retain(|r| r.id != old.id))?;
        }
        self.modify_month(report.date, |reports| {
            reports.retain(|r| r.id != report.id);
            reports.push(report.clone());
        })?;

        tracing::info!(id = report.id, date = %report.date, "saved report");
        Ok(report)
    }

    /// Delete the driver's report `id`, returning it
    pub fn delete(&self, driver: &Driver, id: i64) -> Result<DailyReport> {
        let _lock = self.write_lock()?;
        let all = self.load_all_strict()?;

        let target = all
            .into_iter()
            .find(|r| r.id == id && r.user_id == driver.id)
            .ok_or_else(|| LogbookError::Store(format!("report {} not found", id)))?;

        self.modify_month(target.date, |reports| reports.retain(|r| r.id != id))?;
        tracing::info!(id, date = %target.date, "deleted report");
        Ok(target)
    }

    fn validate(&self, draft: &ReportDraft) -> Result<()> {
        if !draft.is_worked {
            return Ok(());
        }

        let minutes = duration::work_minutes(draft.start_time.as_deref(), draft.end_time.as_deref())?;
        for time in [&draft.start_time, &draft.end_time].into_iter().flatten() {
            duration::ClockTime::parse(time)?;
        }

        if let (Some(max_hours), Some(minutes)) = (self.policy.max_shift_hours, minutes) {
            if f64::from(minutes) > max_hours * 60.0 {
                return Err(LogbookError::validation(format!(
                    "shift of {} exceeds the {} hour limit",
                    duration::format_hours_minutes(minutes),
                    max_hours
                )));
            }
        }

        odometer::validate(draft.start_odometer, draft.end_odometer, self.policy.odometer)
    }

    /// Every month file, parsed in parallel
    fn load_all(&self) -> (Vec<DailyReport>, Vec<StoreWarning>) {
        let pattern = self.reports_dir.join("*.json");
        let files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();
        load_files(&files)
    }

    /// Every month file for a write. Ids are allocated across all files, so an
    /// unreadable one blocks the write until it is repaired.
    fn load_all_strict(&self) -> Result<Vec<DailyReport>> {
        let (all, warnings) = self.load_all();
        match warnings.first() {
            Some(warning) => Err(LogbookError::Store(format!(
                "refusing to write while a month file is unreadable: {}",
                warning.message()
            ))),
            None => Ok(all),
        }
    }

    fn write_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.reports_dir)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.reports_dir.join(LOCK_FILE))?;
        file.lock_exclusive()
            .map_err(|e| LogbookError::Store(format!("Failed to acquire write lock: {}", e)))?;
        Ok(file)
    }

    /// Read-modify-write one month file. Caller holds the write lock.
    fn modify_month(&self, date: NaiveDate, f: impl FnOnce(&mut Vec<DailyReport>)) -> Result<()> {
        let path = self.month_path(date.year(), date.month());
        let mut reports = read_month_strict(&path)?;
        f(&mut reports);

        if reports.is_empty() {
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Ok(());
        }

        reports.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        write_month_file(&path, reports)
    }
}

/// Off days carry no work details
fn normalize_draft(mut draft: ReportDraft) -> ReportDraft {
    let blank_to_none = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
    draft.notes = blank_to_none(draft.notes);
    if draft.is_worked {
        draft.start_time = blank_to_none(draft.start_time);
        draft.end_time = blank_to_none(draft.end_time);
    } else {
        draft.start_time = None;
        draft.end_time = None;
        draft.start_odometer = None;
        draft.end_odometer = None;
        draft.deliveries = None;
        draft.highway_fee = None;
    }
    draft
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn sort_newest_first(reports: &mut [DailyReport]) {
    reports.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

/// (year, month) pairs covered by `period`
fn months_in(period: &Period) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut y, mut m) = (period.start().year(), period.start().month());
    let end = (period.end().year(), period.end().month());
    while (y, m) <= end {
        months.push((y, m));
        if m == 12 {
            y += 1;
            m = 1;
        } else {
            m += 1;
        }
    }
    months
}

fn log_warnings(warnings: &[StoreWarning]) {
    for warning in warnings {
        tracing::warn!("{}", warning.message());
    }
}

fn load_files(files: &[PathBuf]) -> (Vec<DailyReport>, Vec<StoreWarning>) {
    let results: Vec<std::result::Result<Vec<DailyReport>, StoreWarning>> =
        files.par_iter().map(|f| load_month_file(f)).collect();

    let mut reports = Vec::new();
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(mut loaded) => reports.append(&mut loaded),
            Err(warning) => warnings.push(warning),
        }
    }
    (reports, warnings)
}

/// Read a month file under a shared lock
fn load_month_file(path: &Path) -> std::result::Result<Vec<DailyReport>, StoreWarning> {
    let name = path.display();
    let file = File::open(path)
        .map_err(|e| StoreWarning::LoadFailed(format!("Failed to open {}: {}", name, e)))?;

    file.lock_shared().map_err(|e| {
        StoreWarning::LoadFailed(format!("Failed to acquire read lock on {}: {}", name, e))
    })?;

    let mut content = Vec::new();
    let read = std::io::BufReader::new(&file).read_to_end(&mut content);
    let _ = file.unlock();
    read.map_err(|e| StoreWarning::LoadFailed(format!("Failed to read {}: {}", name, e)))?;

    let month: MonthFile = simd_json::from_slice(&mut content)
        .map_err(|e| StoreWarning::Corrupted(format!("Corrupted month file {}: {}", name, e)))?;

    if month.version != STORE_VERSION {
        return Err(StoreWarning::VersionMismatch(format!(
            "{} has format version {}, expected {}",
            name, month.version, STORE_VERSION
        )));
    }
    Ok(month.reports)
}

/// Read a month file for rewriting; a missing file is empty, a damaged one is
/// an error so it is never overwritten.
fn read_month_strict(path: &Path) -> Result<Vec<DailyReport>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    load_month_file(path).map_err(|w| {
        LogbookError::Store(format!("refusing to overwrite: {}", w.message()))
    })
}

/// Atomic write (temp file + rename)
fn write_month_file(path: &Path, reports: Vec<DailyReport>) -> Result<()> {
    let month = MonthFile {
        version: STORE_VERSION,
        reports,
    };
    let content = serde_json::to_string_pretty(&month)
        .map_err(|e| LogbookError::Store(format!("Serialization failed: {}", e)))?;

    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&temp_path)
            .map_err(|e| LogbookError::Store(format!("Failed to create temp file: {}", e)))?;
        file.write_all(content.as_bytes())
            .map_err(|e| LogbookError::Store(format!("Failed to write temp file: {}", e)))?;
        file.sync_all()
            .map_err(|e| LogbookError::Store(format!("Failed to sync temp file: {}", e)))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| LogbookError::Store(format!("Failed to rename temp file: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn driver(id: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: id.to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn worked(day: &str, start: &str, end: &str, odo: (f64, f64)) -> ReportDraft {
        let mut draft = ReportDraft::new(date(day), true);
        draft.start_time = Some(start.to_string());
        draft.end_time = Some(end.to_string());
        draft.start_odometer = Some(odo.0);
        draft.end_odometer = Some(odo.1);
        draft
    }

    fn create_test_store() -> (ReportStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path(), StorePolicy::default()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_insert_assigns_ids_and_distance() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let first = store
            .upsert(&alice, worked("2025-03-01", "09:00", "17:00", (100.0, 150.5)))
            .unwrap();
        let second = store
            .upsert(&alice, worked("2025-03-02", "09:00", "17:00", (150.5, 200.0)))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.distance_km, Some(50.5));
        assert_eq!(first.user_id, "alice");
        assert!(store.month_path(2025, 3).exists());
    }

    #[test]
    fn test_upsert_by_date_replaces_existing() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let original = store
            .upsert(&alice, worked("2025-03-01", "09:00", "17:00", (100.0, 150.0)))
            .unwrap();
        let mut draft = worked("2025-03-01", "08:00", "18:00", (100.0, 180.0));
        draft.deliveries = Some(30);
        let updated = store.upsert(&alice, draft).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.start_time.as_deref(), Some("08:00"));
        assert_eq!(updated.distance_km, Some(80.0));
        assert_eq!(store.list(&alice).len(), 1);
    }

    #[test]
    fn test_update_by_id_moves_between_months() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let saved = store
            .upsert(&alice, worked("2025-03-31", "09:00", "17:00", (0.0, 10.0)))
            .unwrap();
        let mut draft = worked("2025-04-01", "09:00", "17:00", (0.0, 10.0));
        draft.id = Some(saved.id);
        store.upsert(&alice, draft).unwrap();

        assert!(!store.month_path(2025, 3).exists());
        let moved = store.get_by_id(&alice, saved.id).unwrap();
        assert_eq!(moved.date, date("2025-04-01"));
    }

    #[test]
    fn test_update_onto_taken_date_rejected() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let a = store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-02"), false))
            .unwrap();

        let mut draft = ReportDraft::new(date("2025-03-02"), true);
        draft.id = Some(a.id);
        assert!(store.upsert(&alice, draft).unwrap_err().is_validation());
    }

    #[test]
    fn test_ownership_filtering() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        let bob = driver("bob");

        let report = store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();
        store
            .upsert(&bob, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();

        assert_eq!(store.list(&alice).len(), 1);
        assert_eq!(store.list(&bob).len(), 1);
        assert!(store.get_by_id(&bob, report.id).is_none());
        assert!(store.delete(&bob, report.id).is_err());

        let mut draft = ReportDraft::new(date("2025-03-05"), false);
        draft.id = Some(report.id);
        assert!(matches!(
            store.upsert(&bob, draft),
            Err(LogbookError::Store(_))
        ));
    }

    #[test]
    fn test_delete() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let a = store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-02"), false))
            .unwrap();

        let deleted = store.delete(&alice, a.id).unwrap();
        assert_eq!(deleted.id, a.id);
        assert_eq!(store.list(&alice).len(), 1);
        assert!(store.delete(&alice, a.id).is_err());
    }

    #[test]
    fn test_list_newest_first_and_period() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        for day in ["2025-02-27", "2025-03-10", "2025-03-02", "2025-04-01"] {
            store
                .upsert(&alice, ReportDraft::new(date(day), false))
                .unwrap();
        }

        let dates: Vec<NaiveDate> = store.list(&alice).iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                date("2025-04-01"),
                date("2025-03-10"),
                date("2025-03-02"),
                date("2025-02-27")
            ]
        );

        let march = store.list_period(&alice, &Period::month(2025, 3).unwrap());
        let dates: Vec<NaiveDate> = march.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2025-03-10"), date("2025-03-02")]);
    }

    #[test]
    fn test_get_by_date() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();

        assert!(store.get_by_date(&alice, date("2025-03-01")).is_some());
        assert!(store.get_by_date(&alice, date("2025-03-02")).is_none());
        assert!(store.get_by_date(&driver("bob"), date("2025-03-01")).is_none());
    }

    #[test]
    fn test_latest_odometer_skips_off_days_and_missing_readings() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        assert_eq!(store.latest_odometer(&alice), None);

        store
            .upsert(&alice, worked("2025-03-01", "09:00", "17:00", (100.0, 150.0)))
            .unwrap();
        store
            .upsert(&alice, worked("2025-03-02", "09:00", "17:00", (150.0, 210.0)))
            .unwrap();
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-03"), false))
            .unwrap();
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-04"), true))
            .unwrap();

        assert_eq!(store.latest_odometer(&alice), Some(210.0));
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");

        let bad_time = worked("2025-03-01", "9", "17:00", (0.0, 1.0));
        assert!(store.upsert(&alice, bad_time).unwrap_err().is_validation());

        let backwards = worked("2025-03-01", "09:00", "17:00", (200.0, 100.0));
        assert!(store.upsert(&alice, backwards).unwrap_err().is_validation());

        let negative = worked("2025-03-01", "09:00", "17:00", (-5.0, 100.0));
        assert!(store.upsert(&alice, negative).unwrap_err().is_validation());

        assert!(store.list(&alice).is_empty());
    }

    #[test]
    fn test_rollover_policy_accepts_wrapped_reading() {
        let temp_dir = TempDir::new().unwrap();
        let policy = StorePolicy {
            odometer: OdometerPolicy::Rollover { max: 1000.0 },
            max_shift_hours: None,
        };
        let store = ReportStore::open(temp_dir.path(), policy).unwrap();

        let saved = store
            .upsert(&driver("alice"), worked("2025-03-01", "09:00", "17:00", (990.0, 15.0)))
            .unwrap();
        assert_eq!(saved.distance_km, Some(25.0));
    }

    #[test]
    fn test_shift_guard() {
        let temp_dir = TempDir::new().unwrap();
        let policy = StorePolicy {
            odometer: OdometerPolicy::Strict,
            max_shift_hours: Some(16.0),
        };
        let store = ReportStore::open(temp_dir.path(), policy).unwrap();
        let alice = driver("alice");

        // 08:00 → 07:00 reads as a 23 hour overnight shift
        let too_long = worked("2025-03-01", "08:00", "07:00", (0.0, 1.0));
        assert!(store.upsert(&alice, too_long).unwrap_err().is_validation());

        let overnight = worked("2025-03-01", "22:00", "06:00", (0.0, 1.0));
        assert!(store.upsert(&alice, overnight).is_ok());
    }

    #[test]
    fn test_off_day_drops_work_details() {
        let (store, _temp) = create_test_store();
        let mut draft = worked("2025-03-01", "09:00", "17:00", (0.0, 10.0));
        draft.is_worked = false;
        draft.notes = Some("休み".into());

        let saved = store.upsert(&driver("alice"), draft).unwrap();
        assert!(saved.start_time.is_none());
        assert!(saved.start_odometer.is_none());
        assert!(saved.distance_km.is_none());
        assert_eq!(saved.notes.as_deref(), Some("休み"));
    }

    #[test]
    fn test_corrupted_month_skipped_with_warning() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();
        fs::write(store.month_path(2025, 2), "not valid json {{{").unwrap();

        let (reports, warnings) = store.list_with_warnings(&alice);
        assert_eq!(reports.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], StoreWarning::Corrupted(_)));

        // Writes into the damaged month are refused
        let err = store
            .upsert(&alice, ReportDraft::new(date("2025-02-10"), false))
            .unwrap_err();
        assert!(matches!(err, LogbookError::Store(_)));
    }

    #[test]
    fn test_unreadable_month_blocks_writes_elsewhere() {
        let (store, _temp) = create_test_store();
        let alice = driver("alice");
        let first = store
            .upsert(&alice, ReportDraft::new(date("2025-02-01"), false))
            .unwrap();
        store
            .upsert(&alice, ReportDraft::new(date("2025-02-02"), false))
            .unwrap();
        let march = store
            .upsert(&alice, ReportDraft::new(date("2025-03-05"), false))
            .unwrap();

        let february = store.month_path(2025, 2);
        let saved = fs::read(&february).unwrap();
        fs::write(&february, "{ not json").unwrap();

        // Ids in the damaged month are unknown, so no new id may be handed out
        let err = store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap_err();
        assert!(matches!(err, LogbookError::Store(_)));
        let err = store.delete(&alice, march.id).unwrap_err();
        assert!(matches!(err, LogbookError::Store(_)));

        fs::write(&february, saved).unwrap();
        let added = store
            .upsert(&alice, ReportDraft::new(date("2025-03-01"), false))
            .unwrap();
        assert_ne!(added.id, first.id);

        let mut ids: Vec<i64> = store.list(&alice).iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_version_mismatch_skipped() {
        let (store, _temp) = create_test_store();
        fs::write(
            store.month_path(2025, 1),
            r#"{"version": 99, "reports": []}"#,
        )
        .unwrap();

        let (_, warnings) = store.list_with_warnings(&driver("alice"));
        assert!(matches!(warnings[0], StoreWarning::VersionMismatch(_)));
    }

    #[test]
    fn test_months_in_period() {
        let period = Period::range(date("2024-11-15"), date("2025-02-01")).unwrap();
        assert_eq!(
            months_in(&period),
            vec![(2024, 11), (2024, 12), (2025, 1), (2025, 2)]
        );
    }
}
