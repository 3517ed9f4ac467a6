//! Page model for the printable report
//!
//! Positions are in millimetres measured from the top-left corner of an A4
//! page. The renderer in `pdf.rs` only translates this model; every
//! pagination decision is made here.

use super::{display_time, format_km, short_date_ja, sorted_by_date, worked_symbol, ExportContext};
use crate::services::{duration, odometer};
use crate::types::{DailyReport, MonthlyStats, Result};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 20.0;
pub const LINE_HEIGHT_MM: f64 = 5.0;
pub const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

/// A row starting below this offset goes on a fresh page
pub const PAGE_BREAK_Y_MM: f64 = 250.0;

pub const FONT_TITLE: f32 = 16.0;
pub const FONT_SUBTITLE: f32 = 12.0;
pub const FONT_BODY: f32 = 10.0;
pub const FONT_SMALL: f32 = 8.0;

pub const TABLE_HEADERS: [&str; 7] = ["日付", "稼働", "開始", "終了", "時間", "距離(km)", "備考"];
pub const COLUMN_WIDTHS_MM: [f64; 7] = [25.0, 15.0, 20.0, 20.0, 25.0, 20.0, 45.0];

const STATS_TITLE: &str = "月次統計";
const TABLE_TITLE: &str = "日別詳細";
const NOTES_MAX_CHARS: usize = 20;

/// Text colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Black,
    Gray,
    LightGray,
}

impl Tone {
    /// Greyscale level, 0.0 = black
    pub fn level(self) -> f32 {
        match self {
            Self::Black => 0.0,
            Self::Gray => 0.4,
            Self::LightGray => 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f64,
        y: f64,
        size: f32,
        tone: Tone,
        text: String,
    },
    /// Horizontal rule
    Rule { x1: f64, x2: f64, y: f64, tone: Tone },
}

impl Element {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Rule { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    /// 1-based
    pub number: usize,
    pub elements: Vec<Element>,
}

impl PageLayout {
    fn text(&mut self, x: f64, y: f64, size: f32, tone: Tone, text: impl Into<String>) {
        self.elements.push(Element::Text {
            x,
            y,
            size,
            tone,
            text: text.into(),
        });
    }

    fn rule(&mut self, y: f64, tone: Tone) {
        self.elements.push(Element::Rule {
            x1: MARGIN_MM,
            x2: MARGIN_MM + CONTENT_WIDTH_MM,
            y,
            tone,
        });
    }

    /// All text on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(Element::text)
    }

    /// Number of table body rows on the page
    pub fn row_count(&self) -> usize {
        // Each body row draws its date cell at the left margin in body size
        let header_rows = self.texts().filter(|t| *t == TABLE_HEADERS[0]).count();
        let first_column = self
            .elements
            .iter()
            .filter(|e| {
                matches!(e, Element::Text { x, size, .. }
                    if *x == MARGIN_MM && *size == FONT_BODY)
            })
            .count();
        first_column - header_rows
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

/// One table row, already formatted
struct RowCells([String; 7]);

impl RowCells {
    fn of(report: &DailyReport, ctx: &ExportContext<'_>) -> Result<Self> {
        let date = short_date_ja(report.date);
        let symbol = worked_symbol(report.is_worked).to_string();
        let notes = truncate_chars(report.notes_or_empty(), NOTES_MAX_CHARS);

        if !report.is_worked {
            return Ok(Self([
                date,
                symbol,
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                notes,
            ]));
        }

        let minutes =
            duration::work_minutes(report.start_time.as_deref(), report.end_time.as_deref())?;
        Ok(Self([
            date,
            symbol,
            display_time(report.start_time.as_deref())?,
            display_time(report.end_time.as_deref())?,
            minutes
                .map(duration::format_hours_minutes_compact)
                .unwrap_or_default(),
            odometer::distance(report.start_odometer, report.end_odometer, ctx.policy)
                .map(format_km)
                .unwrap_or_default(),
            notes,
        ]))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn stat_lines(stats: &MonthlyStats) -> [String; 7] {
    [
        format!("稼働日数: {}日", stats.working_days),
        format!("総走行距離: {:.1}km", stats.total_distance_km),
        format!("総作業時間: {:.1}時間", stats.total_work_hours),
        format!("平均走行距離: {:.1}km/日", stats.average_distance_km),
        format!("平均作業時間: {:.1}時間/日", stats.average_work_hours),
        format!("総配送件数: {}件", stats.total_deliveries),
        format!("高速代合計: {}円", stats.total_highway_fee),
    ]
}

/// Lay out the full document. Fails before producing anything if a report
/// holds a malformed time.
pub fn layout(
    reports: &[DailyReport],
    stats: &MonthlyStats,
    ctx: &ExportContext<'_>,
) -> Result<DocumentLayout> {
    let rows = sorted_by_date(reports)
        .into_iter()
        .map(|r| RowCells::of(r, ctx))
        .collect::<Result<Vec<_>>>()?;

    let title = ctx.labels.pdf_title.clone();
    let mut pages = Vec::new();
    let mut page = PageLayout {
        number: 1,
        elements: Vec::new(),
    };

    let mut y = draw_header(&mut page, &title, ctx);
    y += LINE_HEIGHT_MM;
    y = draw_statistics(&mut page, stats, y);
    y += LINE_HEIGHT_MM;
    y = draw_table_header(&mut page, y);

    for row in rows {
        if y > PAGE_BREAK_Y_MM {
            let number = page.number + 1;
            pages.push(std::mem::replace(
                &mut page,
                PageLayout {
                    number,
                    elements: Vec::new(),
                },
            ));
            y = draw_table_header(&mut page, MARGIN_MM);
        }
        y = draw_row(&mut page, &row, y);
    }
    pages.push(page);

    let generated = ctx
        .generated_at
        .format("%Y年%-m月%-d日 %H:%M生成")
        .to_string();
    for page in &mut pages {
        draw_footer(page, &generated);
    }

    tracing::debug!(pages = pages.len(), "laid out report document");
    Ok(DocumentLayout { title, pages })
}

fn draw_header(page: &mut PageLayout, title: &str, ctx: &ExportContext<'_>) -> f64 {
    let mut y = MARGIN_MM;
    page.text(MARGIN_MM, y, FONT_TITLE, Tone::Black, title);
    y += LINE_HEIGHT_MM * 2.0;

    page.text(
        MARGIN_MM,
        y,
        FONT_SUBTITLE,
        Tone::Gray,
        format!("期間: {}", ctx.labels.period_display(ctx.period)),
    );
    page.text(
        MARGIN_MM + 80.0,
        y,
        FONT_SUBTITLE,
        Tone::Gray,
        format!("ユーザー: {}", ctx.driver.name),
    );
    y += LINE_HEIGHT_MM * 2.0;

    page.rule(y, Tone::LightGray);
    y + LINE_HEIGHT_MM
}

fn draw_statistics(page: &mut PageLayout, stats: &MonthlyStats, mut y: f64) -> f64 {
    page.text(MARGIN_MM, y, FONT_SUBTITLE, Tone::Black, STATS_TITLE);
    y += LINE_HEIGHT_MM * 1.5;

    for line in stat_lines(stats) {
        page.text(MARGIN_MM + 5.0, y, FONT_BODY, Tone::Gray, line);
        y += LINE_HEIGHT_MM;
    }
    y + LINE_HEIGHT_MM
}

fn draw_table_header(page: &mut PageLayout, mut y: f64) -> f64 {
    page.text(MARGIN_MM, y, FONT_SUBTITLE, Tone::Black, TABLE_TITLE);
    y += LINE_HEIGHT_MM * 1.5;

    let mut x = MARGIN_MM;
    for (header, width) in TABLE_HEADERS.iter().zip(COLUMN_WIDTHS_MM) {
        page.text(x, y, FONT_BODY, Tone::Black, *header);
        x += width;
    }
    y += LINE_HEIGHT_MM * 0.5;

    page.rule(y, Tone::Black);
    y + LINE_HEIGHT_MM * 0.5
}

fn draw_row(page: &mut PageLayout, row: &RowCells, y: f64) -> f64 {
    let mut x = MARGIN_MM;
    for (cell, width) in row.0.iter().zip(COLUMN_WIDTHS_MM) {
        if !cell.is_empty() {
            page.text(x, y, FONT_BODY, Tone::Gray, cell.as_str());
        }
        x += width;
    }
    y + LINE_HEIGHT_MM
}

fn draw_footer(page: &mut PageLayout, generated: &str) {
    let y = PAGE_HEIGHT_MM - MARGIN_MM + 5.0;
    page.text(MARGIN_MM, y, FONT_SMALL, Tone::Gray, generated);
    page.text(
        MARGIN_MM + CONTENT_WIDTH_MM - 20.0,
        y,
        FONT_SMALL,
        Tone::Gray,
        format!("{} ページ", page.number),
    );
}
