//! Application state and event loop

use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::cli::AppContext;
use crate::export::ExportLabels;
use crate::services::{
    paginate, Aggregator, OdometerPolicy, PageSlice, ReportFilter, ReportStore, WorkStatus,
    ITEMS_PER_PAGE,
};
use crate::types::{DailyReport, Driver, Period, StoreWarning};

use super::theme::Theme;
use super::widgets::{
    help::HelpPopup, monthly::MonthlyView, reports::ReportsView, spinner::Spinner, tabs::Tab,
};

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading { spinner_frame: usize },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Error state
    Error { message: String },
}

/// Loaded application data
pub struct AppData {
    /// The driver's reports, newest first
    pub reports: Vec<DailyReport>,
    /// Month files that could not be read
    pub warnings: Vec<StoreWarning>,
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    theme: Theme,
    show_help: bool,
    status: WorkStatus,
    /// 1-based page of the reports table
    page: usize,
    /// Month shown on the monthly tab
    month: Period,
    policy: OdometerPolicy,
    labels: ExportLabels,
}

impl App {
    /// Create a new app in loading state
    pub fn new(month: Period, policy: OdometerPolicy, labels: ExportLabels, theme: Theme) -> Self {
        Self {
            state: AppState::Loading { spinner_frame: 0 },
            should_quit: false,
            current_tab: Tab::default(),
            theme,
            show_help: false,
            status: WorkStatus::default(),
            page: 1,
            month,
            policy,
            labels,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        self.should_quit = true;
                    }
                    KeyCode::Tab => {
                        self.current_tab = self.current_tab.next();
                    }
                    KeyCode::BackTab => {
                        self.current_tab = self.current_tab.prev();
                    }
                    KeyCode::Char(c @ '1'..='2') => {
                        if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                            self.current_tab = tab;
                        }
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Char('f') if self.current_tab == Tab::Reports => {
                        self.status = self.status.next();
                        self.page = 1;
                    }
                    KeyCode::Left | KeyCode::Char('h') => self.step(false),
                    KeyCode::Right | KeyCode::Char('l') => self.step(true),
                    _ => {}
                }
            }
        }
    }

    /// Move to the next/previous page or month, depending on the tab
    fn step(&mut self, forward: bool) {
        match self.current_tab {
            Tab::Reports => {
                let total_pages = match &self.state {
                    AppState::Ready { data } => self.page_slice(data).total_pages,
                    _ => return,
                };
                self.page = if forward {
                    (self.page + 1).min(total_pages.max(1))
                } else {
                    self.page.saturating_sub(1).max(1)
                };
            }
            Tab::Monthly => {
                self.month = if forward {
                    self.month.next_month()
                } else {
                    self.month.prev_month()
                };
            }
        }
    }

    /// The current page of reports under the active status filter
    fn page_slice(&self, data: &AppData) -> PageSlice<DailyReport> {
        let filter = ReportFilter {
            status: self.status,
            ..Default::default()
        };
        let matching: Vec<DailyReport> = filter.apply(&data.reports).into_iter().cloned().collect();
        paginate(&matching, self.page, ITEMS_PER_PAGE)
    }

    /// Apply the loader's result
    fn apply_data(&mut self, data: Box<AppData>) {
        self.page = 1;
        self.state = AppState::Ready { data };
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading { spinner_frame } = &self.state {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading { spinner_frame } => {
                Spinner::new(*spinner_frame).render(area, buf);
            }
            AppState::Ready { data } => {
                match self.current_tab {
                    Tab::Reports => {
                        let page = self.page_slice(data);
                        ReportsView::new(
                            &page,
                            self.status,
                            self.policy,
                            data.warnings.len(),
                            self.theme,
                        )
                        .render(area, buf);
                    }
                    Tab::Monthly => {
                        let label = self.labels.period_display(&self.month);
                        let stats = Aggregator::stats(&data.reports, &self.month, self.policy);
                        let message: String;
                        let view_stats = match &stats {
                            Ok(stats) => Ok(stats),
                            Err(e) => {
                                message = e.to_string();
                                Err(message.as_str())
                            }
                        };
                        MonthlyView::new(view_stats, &label, self.theme).render(area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));
            }
        }
    }
}

/// Run the TUI application
pub fn run(ctx: AppContext) -> anyhow::Result<()> {
    // Detect before raw mode; the query needs a cooked terminal
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, ctx, theme);
    ratatui::restore();
    result
}

/// Load the driver's reports (runs on the background thread)
fn load_data_sync(store: &ReportStore, driver: &Driver) -> Box<AppData> {
    let (reports, warnings) = store.list_with_warnings(driver);
    for warning in &warnings {
        tracing::warn!(warning = warning.message(), "skipped month file");
    }
    tracing::debug!(count = reports.len(), driver = %driver.id, "reports loaded");
    Box::new(AppData { reports, warnings })
}

fn run_app(terminal: &mut DefaultTerminal, ctx: AppContext, theme: Theme) -> anyhow::Result<()> {
    let month = Period::month_of(ctx.today());
    let mut app = App::new(
        month,
        ctx.config.odometer_policy(),
        ctx.config.labels.clone(),
        theme,
    );

    // Spawn background thread for data loading
    let (data_tx, data_rx) = mpsc::channel();
    let store = ctx.store.clone();
    let driver = ctx.driver.clone();
    thread::spawn(move || {
        let _ = data_tx.send(load_data_sync(&store, &driver));
    });

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Check for data loading completion (non-blocking)
        if matches!(app.state, AppState::Loading { .. }) {
            match data_rx.try_recv() {
                Ok(data) => app.apply_data(data),
                Err(TryRecvError::Disconnected) => {
                    app.state = AppState::Error {
                        message: "report loader stopped unexpectedly".to_string(),
                    };
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::{make_report, make_worked};
    use crate::tui::widgets::buffer_text;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn make_app() -> App {
        App::new(
            Period::month(2025, 3).unwrap(),
            OdometerPolicy::default(),
            ExportLabels::default(),
            Theme::Dark,
        )
    }

    /// 25 reports: March 1-25, every fifth day off, newest first
    fn make_ready_app() -> App {
        let mut reports: Vec<DailyReport> = (1..=25)
            .map(|d| {
                let date = format!("2025-03-{:02}", d);
                if d % 5 == 0 {
                    make_report(&date, false)
                } else {
                    make_worked(&date, "09:00", "17:00", (1000.0, 1020.0))
                }
            })
            .collect();
        reports.reverse();

        let mut app = make_app();
        app.apply_data(Box::new(AppData {
            reports,
            warnings: Vec::new(),
        }));
        app
    }

    #[test]
    fn test_app_initial_state() {
        let app = make_app();
        assert!(matches!(
            app.state,
            AppState::Loading { spinner_frame: 0 }
        ));
        assert!(!app.should_quit());
        assert_eq!(app.current_tab, Tab::Reports);
    }

    #[test]
    fn test_app_quit_on_q_and_esc() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = make_app();
        app.handle_event(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_tick_updates_spinner() {
        let mut app = make_app();
        app.tick();
        assert!(matches!(
            app.state,
            AppState::Loading { spinner_frame: 1 }
        ));
    }

    #[test]
    fn test_app_tab_navigation() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Monthly);
        app.handle_event(key(KeyCode::BackTab));
        assert_eq!(app.current_tab, Tab::Reports);
        app.handle_event(key(KeyCode::Char('2')));
        assert_eq!(app.current_tab, Tab::Monthly);
        app.handle_event(key(KeyCode::Char('1')));
        assert_eq!(app.current_tab, Tab::Reports);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = make_app();
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_page_navigation_clamped() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Left));
        assert_eq!(app.page, 1);

        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Char('l')));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.page, 3);

        app.handle_event(key(KeyCode::Char('h')));
        assert_eq!(app.page, 2);
    }

    #[test]
    fn test_filter_cycles_and_resets_page() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.page, 2);

        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.status, WorkStatus::Worked);
        assert_eq!(app.page, 1);

        let AppState::Ready { data } = &app.state else {
            panic!("expected ready state");
        };
        assert_eq!(app.page_slice(data).total_items, 20);

        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.status, WorkStatus::Off);
        let AppState::Ready { data } = &app.state else {
            panic!("expected ready state");
        };
        assert_eq!(app.page_slice(data).total_items, 5);
    }

    #[test]
    fn test_month_navigation_on_monthly_tab() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('2')));
        app.handle_event(key(KeyCode::Left));
        assert_eq!(app.month, Period::month(2025, 2).unwrap());
        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.month, Period::month(2025, 4).unwrap());
        // Page untouched
        assert_eq!(app.page, 1);
    }

    #[test]
    fn test_render_monthly_tab() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('2')));

        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("2025年3月 月次統計"));
        // 20 worked days x 20 km
        assert!(text.contains("400.0km"));
    }

    #[test]
    fn test_render_error_state() {
        let mut app = make_app();
        app.state = AppState::Error {
            message: "boom".to_string(),
        };
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Error: boom"));
    }
}
