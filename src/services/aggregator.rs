//! Aggregator service for computing period statistics

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::services::{duration, odometer, OdometerPolicy};
use crate::types::{DailyReport, MonthlyStats, Period, Result};

/// Aggregator for computing report statistics
pub struct Aggregator;

impl Aggregator {
    /// Statistics for the reports whose date falls inside `period`
    pub fn stats(
        reports: &[DailyReport],
        period: &Period,
        policy: OdometerPolicy,
    ) -> Result<MonthlyStats> {
        Self::fold(reports.iter().filter(|r| period.contains(r.date)), policy)
    }

    /// Statistics over every given report (caller has already period-filtered)
    pub fn summarize(reports: &[DailyReport], policy: OdometerPolicy) -> Result<MonthlyStats> {
        Self::fold(reports.iter(), policy)
    }

    /// One entry per calendar month that has reports, sorted ascending
    pub fn by_month(
        reports: &[DailyReport],
        policy: OdometerPolicy,
    ) -> Result<Vec<(Period, MonthlyStats)>> {
        let mut month_map: BTreeMap<(i32, u32), Vec<&DailyReport>> = BTreeMap::new();
        for report in reports {
            month_map
                .entry((report.date.year(), report.date.month()))
                .or_default()
                .push(report);
        }

        month_map
            .into_iter()
            .map(|((year, month), group)| {
                let period = Period::month(year, month)?;
                let stats = Self::fold(group.into_iter(), policy)?;
                Ok((period, stats))
            })
            .collect()
    }

    fn fold<'a>(
        reports: impl Iterator<Item = &'a DailyReport>,
        policy: OdometerPolicy,
    ) -> Result<MonthlyStats> {
        let mut stats = MonthlyStats::default();

        for report in reports.filter(|r| r.is_worked) {
            stats.working_days = stats.working_days.saturating_add(1);

            // Missing odometer data keeps the day, drops only the distance
            if let Some(km) = odometer::distance(report.start_odometer, report.end_odometer, policy)
            {
                stats.total_distance_km += km;
            }

            stats.total_deliveries = stats
                .total_deliveries
                .saturating_add(u64::from(report.deliveries.unwrap_or(0)));
            stats.total_highway_fee = stats
                .total_highway_fee
                .saturating_add(u64::from(report.highway_fee.unwrap_or(0)));

            if let Some(minutes) =
                duration::work_minutes(report.start_time.as_deref(), report.end_time.as_deref())?
            {
                stats.total_work_hours += f64::from(minutes) / 60.0;
            }
        }

        Ok(stats.with_averages())
    }
}
