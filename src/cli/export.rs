//! `logbook export` subcommand

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};

use super::AppContext;
use crate::export::{CsvExporter, CsvSchema, ExportContext, PdfExporter, ReportExporter};
use crate::types::Period;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    format: ExportFormat,
}

#[derive(Subcommand, Debug)]
enum ExportFormat {
    /// One month as CSV
    Csv {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// basic, detailed or accounting
        #[arg(long, default_value = "basic")]
        schema: CsvSchema,
        /// Output file or directory (default: generated name in the current directory)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// A month, a year or a date range as PDF
    Pdf {
        #[arg(long, requires = "month", conflicts_with_all = ["annual", "from"])]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
        /// Whole calendar year
        #[arg(long, value_name = "YEAR", conflicts_with = "from")]
        annual: Option<i32>,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// Output file or directory (default: generated name in the current directory)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl ExportArgs {
    pub fn run(self, ctx: &AppContext) -> anyhow::Result<()> {
        let (period, exporter, output): (Period, Box<dyn ReportExporter>, Option<PathBuf>) =
            match self.format {
                ExportFormat::Csv {
                    year,
                    month,
                    schema,
                    output,
                } => (
                    Period::month(year, month)?,
                    Box::new(CsvExporter::new(schema)),
                    output,
                ),
                ExportFormat::Pdf {
                    year,
                    month,
                    annual,
                    from,
                    to,
                    output,
                } => (
                    pdf_period(year, month, annual, from, to)?,
                    Box::new(PdfExporter::new(ctx.config.pdf_font_path.clone())),
                    output,
                ),
            };

        let reports = ctx.store.list_period(&ctx.driver, &period);
        if reports.is_empty() {
            bail!("no data to export");
        }

        let offset = ctx.config.offset();
        let export_ctx = ExportContext {
            period: &period,
            driver: &ctx.driver,
            labels: &ctx.config.labels,
            policy: ctx.config.odometer_policy(),
            utc_offset: offset,
            generated_at: Utc::now().with_timezone(&offset),
        };

        let path = output_path(output.as_deref(), &exporter.file_name(&export_ctx));
        let bytes = exporter.render(&reports, &export_ctx)?;
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;

        tracing::info!(exporter = exporter.name(), rows = reports.len(), "export written");
        println!("{}", path.display());
        Ok(())
    }
}

fn pdf_period(
    year: Option<i32>,
    month: Option<u32>,
    annual: Option<i32>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Period> {
    match (year, month, annual, from, to) {
        (Some(y), Some(m), None, None, None) => Ok(Period::month(y, m)?),
        (None, None, Some(y), None, None) => Ok(Period::year(y)?),
        (None, None, None, Some(f), Some(t)) => Ok(Period::range(f, t)?),
        _ => bail!("choose one period: --year/--month, --annual or --from/--to"),
    }
}

/// An existing directory gets the generated name appended
fn output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(p) if p.is_dir() => p.join(file_name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
