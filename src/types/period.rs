//! Reporting periods with inclusive calendar bounds

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::{LogbookError, Result};

/// What kind of period a [`Period`] was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodKind {
    Month { year: i32, month: u32 },
    Year(i32),
    Range,
}

/// An inclusive date range. Constructors validate, so bounds always exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    kind: PeriodKind,
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Calendar month: first to last day, inclusive
    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LogbookError::validation(format!(
                "month must be 1-12, got {}",
                month
            )));
        }
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| LogbookError::validation(format!("year {} out of range", year)))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| LogbookError::validation(format!("year {} out of range", year)))?;
        Ok(Self {
            kind: PeriodKind::Month { year, month },
            start,
            end,
        })
    }

    /// Calendar year: January 1 to December 31
    pub fn year(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                kind: PeriodKind::Year(year),
                start,
                end,
            }),
            _ => Err(LogbookError::validation(format!(
                "year {} out of range",
                year
            ))),
        }
    }

    /// Arbitrary inclusive range; `start` must not be after `end`
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LogbookError::validation(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            kind: PeriodKind::Range,
            start,
            end,
        })
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self {
            kind: PeriodKind::Month {
                year: date.year(),
                month: date.month(),
            },
            start,
            end,
        }
    }

    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Previous calendar month (only meaningful for monthly periods)
    pub fn prev_month(&self) -> Self {
        self.start
            .pred_opt()
            .map(Self::month_of)
            .unwrap_or(*self)
    }

    /// Next calendar month (only meaningful for monthly periods)
    pub fn next_month(&self) -> Self {
        self.end.succ_opt().map(Self::month_of).unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let p = Period::month(2025, 3).unwrap();
        assert_eq!(p.start(), date(2025, 3, 1));
        assert_eq!(p.end(), date(2025, 3, 31));
        assert_eq!(p.kind(), PeriodKind::Month { year: 2025, month: 3 });
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let p = Period::month(2024, 2).unwrap();
        assert_eq!(p.end(), date(2024, 2, 29));

        let p = Period::month(2025, 2).unwrap();
        assert_eq!(p.end(), date(2025, 2, 28));
    }

    #[test]
    fn test_month_bounds_december() {
        let p = Period::month(2024, 12).unwrap();
        assert_eq!(p.end(), date(2024, 12, 31));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(Period::month(2025, 0).unwrap_err().is_validation());
        assert!(Period::month(2025, 13).unwrap_err().is_validation());
    }

    #[test]
    fn test_year_bounds() {
        let p = Period::year(2025).unwrap();
        assert_eq!(p.start(), date(2025, 1, 1));
        assert_eq!(p.end(), date(2025, 12, 31));
    }

    #[test]
    fn test_range_inclusive() {
        let p = Period::range(date(2025, 3, 10), date(2025, 3, 20)).unwrap();
        assert!(p.contains(date(2025, 3, 10)));
        assert!(p.contains(date(2025, 3, 20)));
        assert!(!p.contains(date(2025, 3, 9)));
        assert!(!p.contains(date(2025, 3, 21)));
    }

    #[test]
    fn test_range_reversed_rejected() {
        let err = Period::range(date(2025, 3, 20), date(2025, 3, 10)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_month_of_and_navigation() {
        let p = Period::month_of(date(2025, 1, 17));
        assert_eq!(p, Period::month(2025, 1).unwrap());
        assert_eq!(p.prev_month(), Period::month(2024, 12).unwrap());
        assert_eq!(p.next_month(), Period::month(2025, 2).unwrap());
    }
}
