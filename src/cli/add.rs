//! `logbook add` subcommand for creating or editing a daily report

use chrono::NaiveDate;
use clap::Args;

use super::AppContext;
use crate::types::{DailyReport, LogbookError, ReportDraft};

/// Create or update the report for one day
#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Report date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Edit the report with this id instead of matching by date
    #[arg(long)]
    pub id: Option<i64>,

    /// Record a day off
    #[arg(long)]
    pub off: bool,

    /// Start time, HH:MM
    #[arg(long)]
    pub start: Option<String>,

    /// End time, HH:MM (earlier than start means past midnight)
    #[arg(long)]
    pub end: Option<String>,

    /// Odometer at start, km (default: last recorded end reading)
    #[arg(long)]
    pub start_odo: Option<f64>,

    /// Odometer at end, km
    #[arg(long)]
    pub end_odo: Option<f64>,

    #[arg(long)]
    pub deliveries: Option<u32>,

    /// Highway tolls, yen
    #[arg(long)]
    pub highway_fee: Option<u32>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl AddArgs {
    pub fn run(self, ctx: &AppContext) -> anyhow::Result<()> {
        let draft = self.into_draft(ctx)?;
        let saved = ctx.store.upsert(&ctx.driver, draft)?;

        println!("{}", serde_json::to_string_pretty(&saved)?);
        Ok(())
    }

    /// Merge the flags over the existing report, if any
    fn into_draft(self, ctx: &AppContext) -> crate::types::Result<ReportDraft> {
        let existing: Option<DailyReport> = match self.id {
            Some(id) => Some(ctx.store.get_by_id(&ctx.driver, id).ok_or_else(|| {
                LogbookError::Store(format!("report {} not found", id))
            })?),
            None => {
                let date = self.date.unwrap_or_else(|| ctx.today());
                ctx.store.get_by_date(&ctx.driver, date)
            }
        };

        let date = self
            .date
            .or_else(|| existing.as_ref().map(|r| r.date))
            .unwrap_or_else(|| ctx.today());
        let mut draft = match &existing {
            Some(r) => draft_from(r),
            None => ReportDraft::new(date, true),
        };
        draft.date = date;
        draft.is_worked = !self.off;

        if self.start.is_some() {
            draft.start_time = self.start;
        }
        if self.end.is_some() {
            draft.end_time = self.end;
        }
        if self.start_odo.is_some() {
            draft.start_odometer = self.start_odo;
        }
        if self.end_odo.is_some() {
            draft.end_odometer = self.end_odo;
        }
        if self.deliveries.is_some() {
            draft.deliveries = self.deliveries;
        }
        if self.highway_fee.is_some() {
            draft.highway_fee = self.highway_fee;
        }
        if self.notes.is_some() {
            draft.notes = self.notes;
        }

        if draft.is_worked && draft.start_odometer.is_none() && existing.is_none() {
            draft.start_odometer = ctx.store.latest_odometer(&ctx.driver);
        }
        Ok(draft)
    }
}

fn draft_from(report: &DailyReport) -> ReportDraft {
    ReportDraft {
        id: Some(report.id),
        date: report.date,
        is_worked: report.is_worked,
        start_time: report.start_time.clone(),
        end_time: report.end_time.clone(),
        start_odometer: report.start_odometer,
        end_odometer: report.end_odometer,
        deliveries: report.deliveries,
        highway_fee: report.highway_fee,
        notes: report.notes.clone(),
    }
}
