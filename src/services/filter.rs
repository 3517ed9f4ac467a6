//! History filtering and pagination

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{DailyReport, LogbookError};

/// Reports per page in history listings
pub const ITEMS_PER_PAGE: usize = 10;

/// Reports shown in a "recent" summary
pub const RECENT_COUNT: usize = 5;

/// Work-status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkStatus {
    #[default]
    All,
    Worked,
    Off,
}

impl WorkStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Worked => "worked",
            Self::Off => "off",
        }
    }

    /// Cycle All → Worked → Off → All
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Worked,
            Self::Worked => Self::Off,
            Self::Off => Self::All,
        }
    }

    fn matches(self, report: &DailyReport) -> bool {
        match self {
            Self::All => true,
            Self::Worked => report.is_worked,
            Self::Off => !report.is_worked,
        }
    }
}

impl FromStr for WorkStatus {
    type Err = LogbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "worked" => Ok(Self::Worked),
            "off" => Ok(Self::Off),
            other => Err(LogbookError::validation(format!(
                "unknown work status {:?} (expected all, worked or off)",
                other
            ))),
        }
    }
}

/// Criteria for narrowing a report history. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: WorkStatus,
    /// Case-insensitive substring of the notes
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.status == WorkStatus::All
            && self.search.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, report: &DailyReport) -> bool {
        if self.date_from.is_some_and(|from| report.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| report.date > to) {
            return false;
        }
        if !self.status.matches(report) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => report
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&needle.to_lowercase())),
            _ => true,
        }
    }

    /// Matching reports, order preserved
    pub fn apply<'a>(&self, reports: &'a [DailyReport]) -> Vec<&'a DailyReport> {
        reports.iter().filter(|r| self.matches(r)).collect()
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 0-based index of the first item on this page
    pub start_index: usize,
}

impl<T> PageSlice<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into the requested 1-based page.
///
/// An empty input has zero pages and reports page 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> PageSlice<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start_index = (page - 1) * per_page;
    let end_index = (start_index + per_page).min(total_items);

    PageSlice {
        items: items
            .get(start_index..end_index)
            .map(<[T]>::to_vec)
            .unwrap_or_default(),
        page,
        total_pages,
        total_items,
        start_index,
    }
}

/// The most recent `count` reports, newest first
pub fn recent(reports: &[DailyReport], count: usize) -> Vec<&DailyReport> {
    let mut sorted: Vec<&DailyReport> = reports.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(count);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_report(day: u32, is_worked: bool, notes: Option<&str>) -> DailyReport {
        DailyReport {
            id: i64::from(day),
            user_id: "driver-1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            is_worked,
            start_time: None,
            end_time: None,
            start_odometer: None,
            end_odometer: None,
            deliveries: None,
            highway_fee: None,
            notes: notes.map(String::from),
            distance_km: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<DailyReport> {
        vec![
            make_report(1, true, Some("Route A north")),
            make_report(2, false, None),
            make_report(3, true, Some("route b")),
            make_report(4, true, Some("渋滞あり")),
        ]
    }

    // ========== ReportFilter tests ==========

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = ReportFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample()).len(), 4);
    }

    #[test]
    fn test_date_range_inclusive() {
        let filter = ReportFilter {
            date_from: NaiveDate::from_ymd_opt(2025, 3, 2),
            date_to: NaiveDate::from_ymd_opt(2025, 3, 3),
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(&sample()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_status_filter() {
        let worked = ReportFilter {
            status: WorkStatus::Worked,
            ..Default::default()
        };
        let off = ReportFilter {
            status: WorkStatus::Off,
            ..Default::default()
        };
        assert_eq!(worked.apply(&sample()).len(), 3);
        assert_eq!(off.apply(&sample()).len(), 1);
    }

    #[test]
    fn test_search_case_insensitive_on_notes() {
        let filter = ReportFilter {
            search: Some("ROUTE".into()),
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(&sample()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let filter = ReportFilter {
            search: Some("渋滞".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&sample()).len(), 1);
    }

    #[test]
    fn test_work_status_from_str() {
        assert_eq!("worked".parse::<WorkStatus>().unwrap(), WorkStatus::Worked);
        assert!("busy".parse::<WorkStatus>().unwrap_err().is_validation());
    }

    #[test]
    fn test_work_status_cycle() {
        assert_eq!(WorkStatus::All.next(), WorkStatus::Worked);
        assert_eq!(WorkStatus::Worked.next(), WorkStatus::Off);
        assert_eq!(WorkStatus::Off.next(), WorkStatus::All);
    }

    // ========== paginate() tests ==========

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 2, ITEMS_PER_PAGE);

        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.start_index, 10);
        assert!(page.has_prev());
        assert!(page.has_next());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 3, ITEMS_PER_PAGE);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_paginate_clamps_page() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, 0, 10).page, 1);
        assert_eq!(paginate(&items, 9, 10).page, 1);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(!page.has_next());
    }

    // ========== recent() tests ==========

    #[test]
    fn test_recent_newest_first() {
        let ids: Vec<i64> = recent(&sample(), 2).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }
}
