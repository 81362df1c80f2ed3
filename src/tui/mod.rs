//! Ratatui-based terminal UI.
//!
//! Left: the instrument keys, filterable with `/`. Right: the selected key's
//! price history over the current window as an area chart. Presets and date
//! edits go through the session, so the TUI and the one-shot commands share
//! the same window rules.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::info;

use crate::app::pipeline::{self, LoadOutput};
use crate::domain::{DATE_FORMAT, LoadState, Preset, WindowEdge};
use crate::error::{AppError, DataSourceError};
use crate::io::source::DataSource;
use crate::report::format_delta;
use crate::session::ViewerSession;
use crate::view::ViewSlice;

mod plotters_chart;

use plotters_chart::PriceAreaChart;

const SIDEBAR_WIDTH: u16 = 24;

/// Start the TUI on `source`, optionally preselecting `initial_key`.
pub fn run(source: Box<dyn DataSource>, initial_key: Option<String>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, initial_key);
    app.reload(&mut terminal)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Edit(WindowEdge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Reload,
    Quit,
}

struct App {
    source: Box<dyn DataSource>,
    session: ViewerSession,
    /// Key requested on the command line; consumed by the first load.
    preferred_key: Option<String>,
    mode: Mode,
    filter: String,
    /// Index into the filtered key list.
    cursor: usize,
    input: String,
    status: String,
}

impl App {
    fn new(source: Box<dyn DataSource>, preferred_key: Option<String>) -> Self {
        Self {
            source,
            session: ViewerSession::new(),
            preferred_key,
            mode: Mode::Browse,
            filter: String::new(),
            cursor: 0,
            input: String::new(),
            status: String::new(),
        }
    }

    /// Show the loading frame, then load synchronously and install the result.
    fn reload<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        self.begin_load();
        terminal
            .draw(|f| self.draw(f))
            .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;

        let result = pipeline::load(self.source.as_ref());
        self.finish_load(result);
        Ok(())
    }

    fn begin_load(&mut self) {
        self.session = ViewerSession::new();
        self.mode = Mode::Browse;
        self.status = format!("Loading {}...", self.source.describe());
    }

    fn finish_load(&mut self, result: Result<LoadOutput, DataSourceError>) {
        match result {
            Ok(out) => {
                self.status = format!(
                    "Loaded {} key(s), {} row(s) dropped.",
                    out.map.len(),
                    out.dropped.len()
                );
                self.session.finish_load(Ok(out.map));
            }
            Err(err) => {
                self.status = format!("Load failed: {err}");
                self.session.finish_load(Err(err));
            }
        }

        if let Some(key) = self.preferred_key.take() {
            if !self.session.select(&key) {
                self.status = format!("Unknown key '{key}'; showing {}.", self.selected_label());
            }
        }
        self.sync_cursor();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key.code) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Reload => self.reload(terminal)?,
                        KeyOutcome::Continue => {}
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> KeyOutcome {
        match self.mode {
            Mode::Browse => self.handle_browse(code),
            Mode::Search => {
                self.handle_search(code);
                KeyOutcome::Continue
            }
            Mode::Edit(edge) => {
                self.handle_edit(edge, code);
                KeyOutcome::Continue
            }
        }
    }

    fn handle_browse(&mut self, code: KeyCode) -> KeyOutcome {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Char('r') => return KeyOutcome::Reload,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.status = "Type to filter keys. Enter to keep, Esc to clear.".to_string();
            }
            KeyCode::Char('s') => self.begin_edit(WindowEdge::Start),
            KeyCode::Char('e') => self.begin_edit(WindowEdge::End),
            KeyCode::Char(c) => {
                if let Some(preset) = preset_for_key(c) {
                    self.apply_preset(preset);
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_search(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = Mode::Browse;
                self.status.clear();
                self.sync_cursor();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.select_at_cursor();
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.sync_cursor();
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                let n = self.filtered_keys().len();
                self.cursor = (self.cursor + 1).min(n.saturating_sub(1));
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.sync_cursor();
            }
            _ => {}
        }
    }

    fn handle_edit(&mut self, edge: WindowEdge, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.status = match self.session.edit_window(edge, &self.input) {
                    Ok(window) => format!("Window: {window}"),
                    Err(err) => format!("Rejected {edge} '{}': {err}", self.input),
                };
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => self.input.push(c),
            _ => {}
        }
    }

    fn begin_edit(&mut self, edge: WindowEdge) {
        let Some(window) = self.session.window() else {
            self.status = "Nothing selected.".to_string();
            return;
        };
        self.input = window.edge(edge).format(DATE_FORMAT).to_string();
        self.mode = Mode::Edit(edge);
        self.status = format!("Editing {edge} (YYYY-MM-DD). Enter to apply, Esc to cancel.");
    }

    fn apply_preset(&mut self, preset: Preset) {
        if self.session.apply_preset(preset.months()) {
            if let Some(window) = self.session.window() {
                self.status = format!("{}: {window}", preset.label());
            }
        }
    }

    /// Keys matching the search filter (case-insensitive substring).
    fn filtered_keys(&self) -> Vec<&str> {
        let needle = self.filter.to_lowercase();
        self.session
            .keys()
            .into_iter()
            .filter(|k| k.to_lowercase().contains(&needle))
            .collect()
    }

    fn move_cursor(&mut self, delta: isize) {
        let n = self.filtered_keys().len();
        if n == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(n - 1);
        self.select_at_cursor();
    }

    fn select_at_cursor(&mut self) {
        let Some(key) = self.filtered_keys().get(self.cursor).map(|k| k.to_string()) else {
            return;
        };
        if self.session.selected() != Some(key.as_str()) && self.session.select(&key) {
            info!(key = %key, "selected instrument");
            self.status = match self.session.window() {
                Some(window) => format!("{key}: {window}"),
                None => key,
            };
        }
    }

    /// Point the cursor at the selected key if it survives the filter.
    fn sync_cursor(&mut self) {
        let selected = self.session.selected();
        self.cursor = self
            .filtered_keys()
            .iter()
            .position(|k| Some(*k) == selected)
            .unwrap_or(0);
    }

    fn selected_label(&self) -> String {
        self.session.selected().unwrap_or("-").to_string()
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_keys(frame, body[0]);
        self.draw_chart(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = vec![Line::from(vec![
            Span::styled("tv", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.source.describe())),
        ])];

        let detail = match (self.session.state(), self.session.view()) {
            (LoadState::Loading, _) => Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow))),
            (LoadState::Failed { reason }, _) => Line::from(Span::styled(
                format!("Load failed: {reason}"),
                Style::default().fg(Color::Red),
            )),
            (LoadState::Loaded(_), Some(slice)) => summary_line(&slice),
            (LoadState::Loaded(_), None) => Line::from(Span::styled("No instruments.", Style::default().fg(Color::Gray))),
        };
        lines.push(detail);

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_keys(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.filter.is_empty() && self.mode != Mode::Search {
            "Keys".to_string()
        } else {
            format!("Keys /{}", self.filter)
        };

        let keys = self.filtered_keys();
        let items: Vec<ListItem> = keys.iter().map(|k| ListItem::new(k.to_string())).collect();
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !keys.is_empty() {
            state.select(Some(self.cursor.min(keys.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let message = match (self.session.state(), self.session.view()) {
            (LoadState::Loading, _) => "Loading data...",
            (LoadState::Failed { .. }, _) => "No data (load failed). Press r to retry.",
            (LoadState::Loaded(_), None) => "No instrument selected.",
            (LoadState::Loaded(_), Some(slice)) if slice.is_empty() => "No data available for this range.",
            (LoadState::Loaded(_), Some(slice)) => {
                render_slice(frame, inner, &slice);
                return;
            }
        };
        let msg = Paragraph::new(message).style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = match self.mode {
            Mode::Edit(edge) => Line::from(vec![
                Span::styled(format!("{edge}: "), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{}_", self.input),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" | "),
                Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            ]),
            Mode::Search | Mode::Browse => {
                let help = if self.mode == Mode::Search {
                    "type filter  ↑/↓ move  Enter select  Esc clear"
                } else {
                    "↑/↓ key  / search  1 6 y 5 presets  s/e edit dates  r reload  q quit"
                };
                Line::from(vec![
                    Span::styled(help, Style::default().fg(Color::Gray)),
                    Span::raw(" | "),
                    Span::styled(&self.status, Style::default().fg(Color::Yellow)),
                ])
            }
        };
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn preset_for_key(c: char) -> Option<Preset> {
    match c {
        '1' => Some(Preset::OneMonth),
        '6' => Some(Preset::SixMonths),
        'y' => Some(Preset::OneYear),
        '5' => Some(Preset::FiveYears),
        _ => None,
    }
}

fn summary_line(slice: &ViewSlice<'_>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        slice.key.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    match slice.last() {
        Some(last) => {
            let delta = slice.profitability_delta();
            let color = if delta >= 0.0 { Color::Green } else { Color::Red };
            spans.push(Span::raw(format!("  ${:.2}  ", last.price)));
            spans.push(Span::styled(format_delta(delta), Style::default().fg(color)));
        }
        None => spans.push(Span::raw("  no data")),
    }
    spans.push(Span::styled(
        format!("  | {} | {} point(s)", slice.window, slice.len()),
        Style::default().fg(Color::Gray),
    ));
    Line::from(spans)
}

/// Chart data for a slice: `(day offset, price)` points plus padded bounds.
fn chart_points(slice: &ViewSlice<'_>) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let t0 = slice.window.start();
    let points: Vec<(f64, f64)> = slice
        .observations
        .iter()
        .map(|o| ((o.date - t0).num_days() as f64, o.price))
        .collect();

    let span = (slice.window.end() - t0).num_days().max(1) as f64;
    let (lo, hi) = slice.price_range().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.05).max(hi.abs() * 0.01).max(1e-6);

    (points, [0.0, span], [lo - pad, hi + pad])
}

fn render_slice(frame: &mut ratatui::Frame<'_>, area: Rect, slice: &ViewSlice<'_>) {
    let (points, x_bounds, y_bounds) = chart_points(slice);
    // Short windows label day and month; long ones label year and month.
    let date_fmt = if x_bounds[1] <= 366.0 { "%m-%d" } else { "%Y-%m" };

    let widget = PriceAreaChart {
        points: &points,
        x_bounds,
        y_bounds,
        rising: slice.profitability_delta() >= 0.0,
        origin: slice.window.start(),
        date_fmt,
        fmt_y: fmt_price,
    };
    frame.render_widget(widget, area);
}

fn fmt_price(v: f64) -> String {
    format!("{v:.2}")
}
