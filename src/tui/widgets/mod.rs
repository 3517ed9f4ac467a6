//! TUI widgets

pub mod help;
pub mod monthly;
pub mod reports;
pub mod spinner;
pub mod tabs;

use ratatui::{buffer::Buffer, layout::Rect, style::Style, text::Span};

use crate::tui::theme::Theme;

fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}

/// Terminal columns taken by `s` (CJK characters count double)
fn display_width(s: &str) -> u16 {
    Span::raw(s).width() as u16
}

/// Buffer contents as text, one line per row, without the padding cells
/// that follow wide characters
#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.y..area.y + area.height {
        let mut x = area.x;
        while x < area.x + area.width {
            let symbol = buf[(x, y)].symbol();
            out.push_str(symbol);
            x += display_width(symbol).max(1);
        }
        out.push('\n');
    }
    out
}
