//! Monthly view widget - statistics for one month in a card grid

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::tabs::{Tab, TabBar};
use super::{display_width, render_separator};
use crate::tui::theme::Theme;
use crate::types::MonthlyStats;

const MAX_CONTENT_WIDTH: u16 = 170;

/// Card dimensions
const CARD_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 5;
const CARD_COUNT: usize = 6;

/// Fixed number of columns for balanced 2x3 grid
const FIXED_COLS: usize = 3;

/// Calculate number of cards per row based on available width (max 3 for balanced grid)
fn cards_per_row(width: u16) -> usize {
    let usable_width = width.saturating_sub(4);
    let cards = (usable_width / (CARD_WIDTH + 2)) as usize;
    cards.clamp(1, FIXED_COLS)
}

/// Monthly statistics widget
pub struct MonthlyView<'a> {
    /// Statistics, or the reason they could not be computed
    stats: Result<&'a MonthlyStats, &'a str>,
    /// e.g. "2025年3月"
    period_label: &'a str,
    theme: Theme,
}

impl<'a> MonthlyView<'a> {
    pub fn new(stats: Result<&'a MonthlyStats, &'a str>, period_label: &'a str, theme: Theme) -> Self {
        Self {
            stats,
            period_label,
            theme,
        }
    }
}

impl Widget for MonthlyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let cols = cards_per_row(centered_area.width);
        let rows = CARD_COUNT.div_ceil(cols);
        let grid_height = (rows as u16) * (CARD_HEIGHT + 1);

        let chunks = Layout::vertical([
            Constraint::Length(1),           // Top padding
            Constraint::Length(1),           // Tabs
            Constraint::Length(1),           // Separator
            Constraint::Length(1),           // Title
            Constraint::Length(1),           // Blank
            Constraint::Length(grid_height), // Card grid
            Constraint::Length(1),           // Separator
            Constraint::Length(1),           // Keybindings
            Constraint::Min(0),
        ])
        .split(centered_area);

        TabBar::new(Tab::Monthly, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);
        self.render_title(chunks[3], buf);

        match self.stats {
            Ok(stats) => self.render_card_grid(chunks[5], buf, cols, stats),
            Err(message) => {
                Paragraph::new(Line::from(Span::styled(
                    message.to_string(),
                    Style::default().fg(self.theme.error()),
                )))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
            }
        }

        render_separator(chunks[6], buf, self.theme);
        self.render_keybindings(chunks[7], buf);
    }
}

impl MonthlyView<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled("◀ ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format!("{} 月次統計", self.period_label),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center);
        title.render(area, buf);
    }

    fn render_card_grid(&self, area: Rect, buf: &mut Buffer, cols: usize, stats: &MonthlyStats) {
        let cards = self.build_cards(stats);

        let total_cards_width = (cols as u16) * CARD_WIDTH + ((cols - 1) as u16) * 2;
        let start_x = area.x + (area.width.saturating_sub(total_cards_width)) / 2;

        for (i, card) in cards.iter().enumerate() {
            let row = i / cols;
            let col = i % cols;

            let card_x = start_x + (col as u16) * (CARD_WIDTH + 2);
            let card_y = area.y + (row as u16) * (CARD_HEIGHT + 1);

            if card_y + CARD_HEIGHT > area.y + area.height {
                continue;
            }

            let card_area = Rect {
                x: card_x,
                y: card_y,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            };

            self.render_card(card_area, buf, card);
        }
    }

    fn build_cards(&self, stats: &MonthlyStats) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "稼働日数".to_string(),
                value: format!("{}日", stats.working_days),
                color: self.theme.accent(),
            },
            StatCard {
                title: "総走行距離".to_string(),
                value: format!("{:.1}km", stats.total_distance_km),
                color: self.theme.distance(),
            },
            StatCard {
                title: "総作業時間".to_string(),
                value: format!("{:.1}時間", stats.total_work_hours),
                color: self.theme.hours(),
            },
            StatCard {
                title: "総配送件数".to_string(),
                value: format!("{}件", stats.total_deliveries),
                color: self.theme.deliveries(),
            },
            StatCard {
                title: "平均走行距離".to_string(),
                value: format!("{:.1}km/日", stats.average_distance_km),
                color: self.theme.date(),
            },
            StatCard {
                title: "高速代合計".to_string(),
                value: format!("¥{}", stats.total_highway_fee),
                color: self.theme.money(),
            },
        ]
    }

    fn render_card(&self, area: Rect, buf: &mut Buffer, card: &StatCard) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(card.color));
        block.render(area, buf);

        if area.height > 2 {
            let title_y = area.y + 1;
            let title_x =
                area.x + (area.width.saturating_sub(display_width(&card.title))) / 2;
            buf.set_string(title_x, title_y, &card.title, Style::default().fg(card.color));
        }

        if area.height > 3 {
            let value_y = area.y + 3;
            let value_x =
                area.x + (area.width.saturating_sub(display_width(&card.value))) / 2;
            buf.set_string(
                value_x,
                value_y,
                &card.value,
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            );
        }
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("q", Style::default().fg(self.theme.accent())),
            Span::styled(": Quit", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("←/→", Style::default().fg(self.theme.accent())),
            Span::styled(": Month", Style::default().fg(self.theme.muted())),
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

/// Internal card representation
struct StatCard {
    title: String,
    value: String,
    color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::buffer_text;

    fn sample_stats() -> MonthlyStats {
        MonthlyStats {
            working_days: 3,
            total_distance_km: 60.0,
            total_deliveries: 90,
            total_highway_fee: 2640,
            total_work_hours: 24.0,
            ..Default::default()
        }
        .with_averages()
    }

    #[test]
    fn test_monthly_view_builds_six_cards() {
        let stats = sample_stats();
        let view = MonthlyView::new(Ok(&stats), "2025年3月", Theme::Dark);
        let cards = view.build_cards(&stats);

        assert_eq!(cards.len(), CARD_COUNT);
        assert_eq!(cards[1].value, "60.0km");
        assert_eq!(cards[4].value, "20.0km/日");
        assert_eq!(cards[5].value, "¥2640");
    }

    #[test]
    fn test_cards_per_row() {
        assert!((1..=2).contains(&cards_per_row(60)));
        assert_eq!(cards_per_row(170), 3);
        assert_eq!(cards_per_row(10), 1);
    }

    #[test]
    fn test_renders_title_and_values() {
        let stats = sample_stats();
        let area = Rect::new(0, 0, 120, 24);
        let mut buf = Buffer::empty(area);
        MonthlyView::new(Ok(&stats), "2025年3月", Theme::Dark).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("月次統計"));
        assert!(text.contains("60.0km"));
    }

    #[test]
    fn test_renders_error_message() {
        let area = Rect::new(0, 0, 120, 24);
        let mut buf = Buffer::empty(area);
        MonthlyView::new(Err("invalid time"), "2025年3月", Theme::Dark).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("invalid time"));
    }
}
