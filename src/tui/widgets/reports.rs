//! Reports table widget - one page of the driver's report history

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::render_separator;
use super::tabs::{Tab, TabBar};
use crate::services::{duration, odometer, OdometerPolicy, PageSlice, WorkStatus};
use crate::tui::theme::Theme;
use crate::types::DailyReport;

const MAX_CONTENT_WIDTH: u16 = 170;

/// Column indices
const COL_DATE: usize = 0;
const COL_WORKED: usize = 1;
const COL_TIME: usize = 2;
const COL_HOURS: usize = 3;
const COL_DISTANCE: usize = 4;
const COL_DELIVERIES: usize = 5;
const COL_FEE: usize = 6;
const COL_NOTES: usize = 7;

/// Column definitions: (label, width)
const COLUMNS: [(&str, u16); 8] = [
    ("Date", 18),       // 0: COL_DATE
    ("Worked", 8),      // 1: COL_WORKED
    ("Time", 14),       // 2: COL_TIME
    ("Hours", 8),       // 3: COL_HOURS
    ("km", 9),          // 4: COL_DISTANCE
    ("Deliveries", 12), // 5: COL_DELIVERIES
    ("Toll", 10),       // 6: COL_FEE
    ("Notes", 32),      // 7: COL_NOTES
];

/// Columns dropped first when the terminal is narrow
fn visible_columns(width: u16) -> Vec<usize> {
    const HIDE_ORDER: [usize; 3] = [COL_NOTES, COL_FEE, COL_DELIVERIES];

    let mut visible: Vec<usize> = (0..COLUMNS.len()).collect();

    for &col_idx in &HIDE_ORDER {
        let total: u16 = visible.iter().map(|&i| COLUMNS[i].1).sum();
        if total <= width {
            return visible;
        }
        visible.retain(|&i| i != col_idx);
    }

    visible
}

fn table_width_for(visible: &[usize]) -> u16 {
    visible.iter().map(|&i| COLUMNS[i].1).sum()
}

/// Reports table view
pub struct ReportsView<'a> {
    page: &'a PageSlice<DailyReport>,
    status: WorkStatus,
    policy: OdometerPolicy,
    /// Number of month files skipped while loading
    warning_count: usize,
    theme: Theme,
}

impl<'a> ReportsView<'a> {
    pub fn new(
        page: &'a PageSlice<DailyReport>,
        status: WorkStatus,
        policy: OdometerPolicy,
        warning_count: usize,
        theme: Theme,
    ) -> Self {
        Self {
            page,
            status,
            policy,
            warning_count,
            theme,
        }
    }
}

impl Widget for ReportsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: Top padding
            Constraint::Length(1), // 1: Tab bar
            Constraint::Length(1), // 2: Separator
            Constraint::Length(1), // 3: Filter / page info
            Constraint::Length(1), // 4: Header
            Constraint::Fill(1),   // 5: Report rows
            Constraint::Length(1), // 6: Separator
            Constraint::Length(1), // 7: Keybindings
        ])
        .split(centered_area);

        TabBar::new(Tab::Reports, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);
        self.render_status_line(chunks[3], buf);

        let visible = visible_columns(centered_area.width);
        self.render_header(chunks[4], buf, &visible);

        if self.page.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No reports",
                Style::default().fg(self.theme.muted()),
            )))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
        } else {
            self.render_rows(chunks[5], buf, &visible);
        }

        render_separator(chunks[6], buf, self.theme);
        self.render_keybindings(chunks[7], buf);
    }
}

impl ReportsView<'_> {
    fn render_status_line(&self, area: Rect, buf: &mut Buffer) {
        let page_info = if self.page.total_pages == 0 {
            "0 reports".to_string()
        } else {
            format!(
                "Page {}/{} ({} reports)",
                self.page.page, self.page.total_pages, self.page.total_items
            )
        };

        let mut spans = vec![
            Span::styled("Filter: ", Style::default().fg(self.theme.muted())),
            Span::styled(
                self.status.label(),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(page_info, Style::default().fg(self.theme.text())),
        ];

        if self.warning_count > 0 {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                format!("⚠ {} file(s) skipped", self.warning_count),
                Style::default().fg(self.theme.error()),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, visible: &[usize]) {
        let tw = table_width_for(visible);
        let offset = area.width.saturating_sub(tw) / 2;
        let header_style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);

        let spans: Vec<Span> = visible
            .iter()
            .map(|&col| {
                let (label, width) = COLUMNS[col];
                let formatted = match col {
                    COL_DATE | COL_WORKED | COL_TIME | COL_NOTES => {
                        format!("{:<width$}", label, width = width as usize)
                    }
                    _ => format!("{:>width$} ", label, width = width as usize - 1),
                };
                Span::styled(formatted, header_style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .render(
                Rect {
                    x: area.x + offset,
                    y: area.y,
                    width: tw.min(area.width),
                    height: area.height,
                },
                buf,
            );
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer, visible: &[usize]) {
        let tw = table_width_for(visible);
        let offset = area.width.saturating_sub(tw) / 2;

        for (i, report) in self.page.items.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }

            let row_area = Rect {
                x: area.x + offset,
                y,
                width: tw.min(area.width),
                height: 1,
            };
            self.render_row(row_area, buf, report, visible);
        }
    }

    fn render_row(&self, area: Rect, buf: &mut Buffer, report: &DailyReport, visible: &[usize]) {
        let cells = RowCells::from_report(report, self.policy);
        let muted = Style::default().fg(self.theme.muted());

        let spans: Vec<Span> = visible
            .iter()
            .map(|&col| {
                let width = COLUMNS[col].1 as usize;
                let (text, style) = match col {
                    COL_DATE => (
                        format!("{:<width$}", cells.date, width = width),
                        Style::default().fg(self.theme.date()),
                    ),
                    COL_WORKED if report.is_worked => (
                        format!("{:<width$}", "○", width = width),
                        Style::default().fg(self.theme.distance()),
                    ),
                    COL_WORKED => (format!("{:<width$}", "×", width = width), muted),
                    COL_TIME => (
                        format!("{:<width$}", cells.time, width = width),
                        Style::default().fg(self.theme.text()),
                    ),
                    COL_HOURS => (
                        format!("{:>w$} ", cells.hours, w = width - 1),
                        Style::default().fg(self.theme.hours()),
                    ),
                    COL_DISTANCE => (
                        format!("{:>w$} ", cells.distance, w = width - 1),
                        Style::default().fg(self.theme.distance()),
                    ),
                    COL_DELIVERIES => (
                        format!("{:>w$} ", cells.deliveries, w = width - 1),
                        Style::default().fg(self.theme.deliveries()),
                    ),
                    COL_FEE => (
                        format!("{:>w$} ", cells.fee, w = width - 1),
                        Style::default().fg(self.theme.money()),
                    ),
                    COL_NOTES => (
                        truncate_str(report.notes_or_empty(), width / 2),
                        Style::default().fg(self.theme.text()),
                    ),
                    _ => unreachable!(),
                };
                let style = if report.is_worked || col == COL_DATE || col == COL_NOTES {
                    style
                } else {
                    muted
                };
                Span::styled(text, style)
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .render(area, buf);
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("←/→", Style::default().fg(self.theme.accent())),
            Span::styled(": Page", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("f", Style::default().fg(self.theme.accent())),
            Span::styled(": Filter", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("Tab", Style::default().fg(self.theme.accent())),
            Span::styled(": Switch view", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("?", Style::default().fg(self.theme.accent())),
            Span::styled(": Help", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center);

        bindings.render(area, buf);
    }
}

/// Display strings for one table row; work columns are "-" on days off
struct RowCells {
    date: String,
    time: String,
    hours: String,
    distance: String,
    deliveries: String,
    fee: String,
}

impl RowCells {
    fn from_report(report: &DailyReport, policy: OdometerPolicy) -> Self {
        let date = report.date.format("%Y-%m-%d (%a)").to_string();
        if !report.is_worked {
            return Self {
                date,
                time: "-".to_string(),
                hours: "-".to_string(),
                distance: "-".to_string(),
                deliveries: "-".to_string(),
                fee: "-".to_string(),
            };
        }

        let start = report.start_time.as_deref().unwrap_or("--:--");
        let end = report.end_time.as_deref().unwrap_or("--:--");
        let hours = match duration::work_minutes(
            report.start_time.as_deref(),
            report.end_time.as_deref(),
        ) {
            Ok(Some(minutes)) => duration::format_decimal_hours(minutes),
            Ok(None) => "-".to_string(),
            Err(_) => "invalid".to_string(),
        };
        let distance = odometer::distance(report.start_odometer, report.end_odometer, policy)
            .map(|km| format!("{:.1}", km))
            .unwrap_or_else(|| "-".to_string());

        Self {
            date,
            time: format!("{}-{}", start, end),
            hours,
            distance,
            deliveries: report
                .deliveries
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fee: report
                .highway_fee
                .map(|fee| format!("¥{}", fee))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Truncate a string to max chars, appending "…" if truncated
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars()
                .take(max_chars.saturating_sub(1))
                .collect::<String>()
        )
    }
}
