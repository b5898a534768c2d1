// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Sparkline, Table, Tabs};
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tablero_app::catalog::WIDGET_DEFINITIONS;
use tablero_app::{DashboardEngine, GridPlacement, Role, RowAnchor, Widget, WidgetId, WidgetKind};
use tablero_data::{KpiValue, RevenuePoint, UserRow, UserStatus};

pub const GRID_COLUMNS: u32 = 12;

/// Bridge to everything outside the engine: durable persistence and the
/// metric service the widget bodies render from.
pub trait AppRuntime {
    /// Called after every state-changing engine operation. A failure is
    /// reported in the status line; the in-memory state stays
    /// authoritative.
    fn persist(&mut self, engine: &DashboardEngine) -> Result<()>;
    fn fetch_revenue(&mut self) -> Result<Vec<RevenuePoint>>;
    fn fetch_users(&mut self) -> Result<Vec<UserRow>>;
    fn fetch_kpi(&mut self, metric: &str) -> Result<Option<KpiValue>>;
}

#[derive(Debug, Clone, PartialEq)]
enum WidgetData {
    Revenue(Vec<RevenuePoint>),
    Users(Vec<UserRow>),
    Kpi(KpiValue),
    MissingMetric(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiMode {
    Grid,
    AddPanel,
    TitleEdit,
}

#[derive(Debug, Clone)]
struct ViewData {
    mode: UiMode,
    selected: usize,
    add_cursor: usize,
    title_input: String,
    status_line: Option<String>,
    data: HashMap<String, WidgetData>,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            mode: UiMode::Grid,
            selected: 0,
            add_cursor: 0,
            title_input: String::new(),
            status_line: None,
            data: HashMap::new(),
        }
    }
}

/// Shared cache key for a widget's backing data. Widgets showing the
/// same metric share one fetch; notes have no backing data.
fn cache_key(widget: &Widget) -> Option<String> {
    match widget.kind {
        WidgetKind::LineChart => Some("revenue".to_owned()),
        WidgetKind::UsersTable => Some("users".to_owned()),
        WidgetKind::SimpleKpi => Some(format!(
            "kpi:{}",
            widget.config.text("metric").unwrap_or("")
        )),
        WidgetKind::Notes => None,
    }
}

pub fn run_app<R: AppRuntime>(
    role: Role,
    engine: &mut DashboardEngine,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    refresh_missing_data(engine, runtime, &mut view_data);

    let mut result = Ok(());
    loop {
        if let Err(error) = terminal.draw(|frame| render(frame, role, engine, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(role, engine, runtime, &mut view_data, key) {
                        break;
                    }
                    refresh_missing_data(engine, runtime, &mut view_data);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn refresh_missing_data<R: AppRuntime>(
    engine: &DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
) {
    let Some(dashboard) = engine.active_dashboard() else {
        return;
    };

    let wanted: Vec<(String, WidgetKind, String)> = dashboard
        .widgets
        .iter()
        .filter_map(|widget| {
            cache_key(widget).map(|key| {
                (
                    key,
                    widget.kind,
                    widget.config.text("metric").unwrap_or("").to_owned(),
                )
            })
        })
        .collect();

    for (key, kind, metric) in wanted {
        if view_data.data.contains_key(&key) {
            continue;
        }
        let fetched = match kind {
            WidgetKind::LineChart => match runtime.fetch_revenue() {
                Ok(points) => WidgetData::Revenue(points),
                Err(error) => WidgetData::Failed(error.to_string()),
            },
            WidgetKind::UsersTable => match runtime.fetch_users() {
                Ok(rows) => WidgetData::Users(rows),
                Err(error) => WidgetData::Failed(error.to_string()),
            },
            WidgetKind::SimpleKpi => match runtime.fetch_kpi(&metric) {
                Ok(Some(value)) => WidgetData::Kpi(value),
                Ok(None) => WidgetData::MissingMetric(metric),
                Err(error) => WidgetData::Failed(error.to_string()),
            },
            WidgetKind::Notes => continue,
        };
        view_data.data.insert(key, fetched);
    }
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    role: Role,
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match view_data.mode {
        UiMode::Grid => handle_grid_key(role, engine, runtime, view_data, key),
        UiMode::AddPanel => {
            handle_add_panel_key(engine, runtime, view_data, key);
            false
        }
        UiMode::TitleEdit => {
            handle_title_key(engine, runtime, view_data, key);
            false
        }
    }
}

fn handle_grid_key<R: AppRuntime>(
    role: Role,
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, KeyModifiers::NONE) => {
            switch_dashboard(engine, runtime, view_data, 1);
        }
        (KeyCode::BackTab, _) => {
            switch_dashboard(engine, runtime, view_data, -1);
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) => {
            move_selection(engine, view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) => {
            move_selection(engine, view_data, -1);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            view_data.data.clear();
            view_data.status_line = Some("refreshing widget data".to_owned());
        }
        _ => {
            if role.is_editor() {
                return handle_editor_key(engine, runtime, view_data, key);
            }
        }
    }
    false
}

fn handle_editor_key<R: AppRuntime>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.mode = UiMode::AddPanel;
            view_data.add_cursor = 0;
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            if let Some(id) = selected_widget_id(engine, view_data)
                && engine.remove_widget(&id)
            {
                clamp_selection(engine, view_data);
                persist_after_change(engine, runtime, view_data);
            }
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            if let Some(id) = selected_widget_id(engine, view_data)
                && engine.duplicate_widget(&id)
            {
                persist_after_change(engine, runtime, view_data);
            }
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            if let Some(id) = selected_widget_id(engine, view_data) {
                let title = engine
                    .active_dashboard()
                    .and_then(|dashboard| dashboard.widget(&id))
                    .map(|widget| widget.config.title().to_owned())
                    .unwrap_or_default();
                view_data.title_input = title;
                view_data.mode = UiMode::TitleEdit;
            }
        }
        (KeyCode::Char('z'), KeyModifiers::NONE) => {
            if engine.undo() {
                clamp_selection(engine, view_data);
                persist_after_change(engine, runtime, view_data);
            }
        }
        (KeyCode::Char('Z'), _) => {
            if engine.redo() {
                clamp_selection(engine, view_data);
                persist_after_change(engine, runtime, view_data);
            }
        }
        (KeyCode::Left, KeyModifiers::NONE) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.x = placement.x.saturating_sub(1);
            });
        }
        (KeyCode::Right, KeyModifiers::NONE) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.x = (placement.x + 1).min(GRID_COLUMNS.saturating_sub(placement.w));
            });
        }
        (KeyCode::Up, KeyModifiers::NONE) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                if let RowAnchor::Row(y) = placement.y {
                    placement.y = RowAnchor::Row(y.saturating_sub(1));
                }
            });
        }
        (KeyCode::Down, KeyModifiers::NONE) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                if let RowAnchor::Row(y) = placement.y {
                    placement.y = RowAnchor::Row(y + 1);
                }
            });
        }
        (KeyCode::Left, KeyModifiers::SHIFT) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.w = placement.w.saturating_sub(1).max(1);
            });
        }
        (KeyCode::Right, KeyModifiers::SHIFT) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.w = (placement.w + 1).min(GRID_COLUMNS.saturating_sub(placement.x));
            });
        }
        (KeyCode::Up, KeyModifiers::SHIFT) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.h = placement.h.saturating_sub(1).max(1);
            });
        }
        (KeyCode::Down, KeyModifiers::SHIFT) => {
            apply_placement_edit(engine, runtime, view_data, |placement| {
                placement.h += 1;
            });
        }
        _ => {}
    }
    false
}

fn handle_add_panel_key<R: AppRuntime>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.mode = UiMode::Grid;
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
            view_data.add_cursor = view_data.add_cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
            view_data.add_cursor = (view_data.add_cursor + 1).min(WIDGET_DEFINITIONS.len() - 1);
        }
        (KeyCode::Char(ch), KeyModifiers::NONE) if ('1'..='4').contains(&ch) => {
            let index = (ch as usize) - ('1' as usize);
            add_widget_at(engine, runtime, view_data, index);
        }
        (KeyCode::Enter, _) => {
            add_widget_at(engine, runtime, view_data, view_data.add_cursor);
        }
        _ => {}
    }
}

fn add_widget_at<R: AppRuntime>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    index: usize,
) {
    let Some(definition) = WIDGET_DEFINITIONS.get(index) else {
        return;
    };
    if engine.add_widget(definition.kind) {
        if let Some(dashboard) = engine.active_dashboard() {
            view_data.selected = dashboard.widgets.len().saturating_sub(1);
        }
        persist_after_change(engine, runtime, view_data);
    }
    view_data.mode = UiMode::Grid;
}

fn handle_title_key<R: AppRuntime>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.mode = UiMode::Grid;
            view_data.title_input.clear();
        }
        (KeyCode::Backspace, _) => {
            view_data.title_input.pop();
        }
        (KeyCode::Enter, _) => {
            if let Some(id) = selected_widget_id(engine, view_data) {
                let config = engine
                    .active_dashboard()
                    .and_then(|dashboard| dashboard.widget(&id))
                    .map(|widget| {
                        let mut config = widget.config.clone();
                        config.insert("title", view_data.title_input.clone());
                        config
                    });
                if let Some(config) = config
                    && engine.update_widget_config(&id, config)
                {
                    persist_after_change(engine, runtime, view_data);
                }
            }
            view_data.mode = UiMode::Grid;
            view_data.title_input.clear();
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            view_data.title_input.push(ch);
        }
        _ => {}
    }
}

fn switch_dashboard<R: AppRuntime>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    delta: isize,
) {
    let ids: Vec<_> = engine
        .dashboards()
        .iter()
        .map(|dashboard| dashboard.id.clone())
        .collect();
    if ids.is_empty() {
        return;
    }

    let current = engine
        .active_dashboard_id()
        .and_then(|active| ids.iter().position(|id| id == active))
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(ids.len() as isize) as usize;
    if engine.set_active_dashboard(&ids[next]) {
        view_data.selected = 0;
        persist_after_change(engine, runtime, view_data);
    }
}

fn move_selection(engine: &DashboardEngine, view_data: &mut ViewData, delta: isize) {
    let Some(dashboard) = engine.active_dashboard() else {
        return;
    };
    let count = dashboard.widgets.len();
    if count == 0 {
        return;
    }
    let current = view_data.selected.min(count - 1) as isize;
    view_data.selected = (current + delta).rem_euclid(count as isize) as usize;
}

fn selected_widget_id(engine: &DashboardEngine, view_data: &ViewData) -> Option<WidgetId> {
    let dashboard = engine.active_dashboard()?;
    let index = view_data
        .selected
        .min(dashboard.widgets.len().checked_sub(1)?);
    Some(dashboard.widgets[index].id.clone())
}

fn clamp_selection(engine: &DashboardEngine, view_data: &mut ViewData) {
    let count = engine
        .active_dashboard()
        .map(|dashboard| dashboard.widgets.len())
        .unwrap_or(0);
    view_data.selected = view_data.selected.min(count.saturating_sub(1));
}

/// Edit the selected widget's settled placement and feed the full
/// placement list back through layout reconciliation, exactly as a
/// drag/resize surface would.
fn apply_placement_edit<R, F>(
    engine: &mut DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
    edit: F,
) where
    R: AppRuntime,
    F: FnOnce(&mut GridPlacement),
{
    let Some(id) = selected_widget_id(engine, view_data) else {
        return;
    };
    let Some(dashboard) = engine.active_dashboard() else {
        return;
    };
    let mut placements = dashboard.resolved_placements();
    let Some(entry) = placements.iter_mut().find(|placement| placement.i == id) else {
        return;
    };
    edit(entry);
    if engine.update_layout(&placements) {
        persist_after_change(engine, runtime, view_data);
    }
}

fn persist_after_change<R: AppRuntime>(
    engine: &DashboardEngine,
    runtime: &mut R,
    view_data: &mut ViewData,
) {
    match runtime.persist(engine) {
        Ok(()) => {
            view_data.status_line = None;
        }
        Err(error) => {
            view_data.status_line =
                Some(format!("save failed: {error}; changes are not being saved"));
        }
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    role: Role,
    engine: &DashboardEngine,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, layout[0], engine);
    render_grid(frame, layout[1], role, engine, view_data);

    let status = view_data
        .status_line
        .clone()
        .unwrap_or_else(|| status_hint(role, engine));
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    if view_data.mode == UiMode::AddPanel {
        render_add_panel(frame, view_data);
    }
    if view_data.mode == UiMode::TitleEdit {
        render_title_editor(frame, view_data);
    }
}

fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, engine: &DashboardEngine) {
    let names: Vec<String> = engine
        .dashboards()
        .iter()
        .map(|dashboard| dashboard.name.clone())
        .collect();
    let selected = engine
        .active_dashboard_id()
        .and_then(|active| {
            engine
                .dashboards()
                .iter()
                .position(|dashboard| &dashboard.id == active)
        })
        .unwrap_or(0);

    let tabs = Tabs::new(names)
        .block(Block::default().title("tablero").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, area);
}

fn render_grid(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    role: Role,
    engine: &DashboardEngine,
    view_data: &ViewData,
) {
    let Some(dashboard) = engine.active_dashboard() else {
        let empty =
            Paragraph::new("no dashboard selected").block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    if dashboard.widgets.is_empty() {
        let hint = if role.is_editor() {
            "dashboard is empty -- press a to add a widget"
        } else {
            "dashboard is empty"
        };
        let empty = Paragraph::new(hint).block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let placements = dashboard.resolved_placements();
    for (index, widget) in dashboard.widgets.iter().enumerate() {
        let rect = widget_rect(area, &placements[index]);
        if rect.width < 3 || rect.height < 2 {
            continue;
        }

        let selected = index == view_data.selected.min(dashboard.widgets.len() - 1);
        let border_style = if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(truncate(widget.config.title(), rect.width.saturating_sub(4)))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        render_widget_body(frame, inner, widget, view_data);
    }
}

fn widget_rect(area: Rect, placement: &GridPlacement) -> Rect {
    let cell_w = (area.width / GRID_COLUMNS as u16).max(1);
    let row = match placement.y {
        RowAnchor::Row(y) => y,
        RowAnchor::Append => 0,
    };

    let x = area
        .x
        .saturating_add(cell_w.saturating_mul(to_u16(placement.x)));
    let y = area.y.saturating_add(to_u16(row));
    Rect::new(
        x,
        y,
        cell_w.saturating_mul(to_u16(placement.w)),
        to_u16(placement.h),
    )
    .intersection(area)
}

fn to_u16(value: u32) -> u16 {
    value.min(u32::from(u16::MAX)) as u16
}

fn render_widget_body(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    widget: &Widget,
    view_data: &ViewData,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    if widget.kind == WidgetKind::Notes {
        let content = widget.config.text("content").unwrap_or("");
        let paragraph = Paragraph::new(markdown_lines(content));
        frame.render_widget(paragraph, area);
        return;
    }

    let key = cache_key(widget).unwrap_or_default();
    match view_data.data.get(&key) {
        None => {
            frame.render_widget(
                Paragraph::new("loading...").style(Style::default().fg(Color::DarkGray)),
                area,
            );
        }
        Some(WidgetData::Failed(message)) => {
            frame.render_widget(
                Paragraph::new(format!("error: {message}")).style(Style::default().fg(Color::Red)),
                area,
            );
        }
        Some(WidgetData::MissingMetric(metric)) => {
            frame.render_widget(
                Paragraph::new(format!("metric '{metric}' not found"))
                    .style(Style::default().fg(Color::Yellow)),
                area,
            );
        }
        Some(WidgetData::Revenue(points)) => render_revenue(frame, area, points),
        Some(WidgetData::Users(rows)) => render_users(frame, area, widget, rows),
        Some(WidgetData::Kpi(value)) => render_kpi(frame, area, widget, *value),
    }
}

fn render_revenue(frame: &mut ratatui::Frame<'_>, area: Rect, points: &[RevenuePoint]) {
    let values: Vec<u64> = points
        .iter()
        .map(|point| point.revenue.max(0) as u64)
        .collect();
    let latest = points.last().map(|point| point.revenue).unwrap_or(0);

    if area.height >= 2 {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);
        let caption = Paragraph::new(format!("last {} days  latest {}", points.len(), latest))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(caption, split[0]);
        frame.render_widget(
            Sparkline::default()
                .data(&values)
                .style(Style::default().fg(Color::Green)),
            split[1],
        );
    } else {
        frame.render_widget(Sparkline::default().data(&values), area);
    }
}

fn render_users(frame: &mut ratatui::Frame<'_>, area: Rect, widget: &Widget, rows: &[UserRow]) {
    let filter = widget.config.text("status").unwrap_or("All");
    let visible: Vec<&UserRow> = rows
        .iter()
        .filter(|row| filter == "All" || row.status.as_str() == filter)
        .collect();

    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new("no users found").style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let table_rows: Vec<Row> = visible
        .iter()
        .map(|row| {
            let status_style = match row.status {
                UserStatus::Active => Style::default().fg(Color::Green),
                UserStatus::Pending => Style::default().fg(Color::Yellow),
                UserStatus::Inactive => Style::default().fg(Color::Red),
            };
            Row::new(vec![
                Span::raw(row.name.clone()),
                Span::raw(row.email.clone()),
                Span::styled(row.status.as_str(), status_style),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(32),
            Constraint::Percentage(48),
            Constraint::Percentage(20),
        ],
    )
    .header(
        Row::new(vec!["name", "email", "status"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

fn render_kpi(frame: &mut ratatui::Frame<'_>, area: Rect, widget: &Widget, value: KpiValue) {
    let metric = widget.config.text("metric").unwrap_or("");
    let description = widget.config.text("description").unwrap_or("");

    let (change_marker, change_style) = if value.change >= 0.0 {
        ("up", Style::default().fg(Color::Green))
    } else {
        ("down", Style::default().fg(Color::Red))
    };

    let lines = vec![
        Line::from(Span::styled(
            description.to_owned(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            kpi_value_text(metric, value.value),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{change_marker} {:+.1}%", value.change),
            change_style,
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn kpi_value_text(metric: &str, value: f64) -> String {
    match metric {
        "totalRevenue" => format!("${}", format_thousands(value.round() as i64)),
        "conversionRate" => format!("{value:.1}%"),
        _ => format_thousands(value.round() as i64),
    }
}

fn format_thousands(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Minimal note rendering: `#`/`##` headings, `*italic*`, `__bold__`.
/// Anything else passes through untouched.
fn markdown_lines(content: &str) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|line| {
            if let Some(heading) = line.strip_prefix("# ") {
                Line::from(Span::styled(
                    heading.to_owned(),
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                ))
            } else if let Some(heading) = line.strip_prefix("## ") {
                Line::from(Span::styled(
                    heading.to_owned(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(inline_spans(line))
            }
        })
        .collect()
}

fn inline_spans(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = line;
    loop {
        let bold = rest.find("__").and_then(|start| {
            rest[start + 2..]
                .find("__")
                .map(|len| (start, start + 2 + len + 2, Modifier::BOLD))
        });
        let italic = rest.find('*').and_then(|start| {
            rest[start + 1..]
                .find('*')
                .map(|len| (start, start + 1 + len + 1, Modifier::ITALIC))
        });

        let next = match (bold, italic) {
            (Some(b), Some(i)) => {
                if b.0 <= i.0 {
                    Some(b)
                } else {
                    Some(i)
                }
            }
            (Some(b), None) => Some(b),
            (None, Some(i)) => Some(i),
            (None, None) => None,
        };

        let Some((start, end, modifier)) = next else {
            if !rest.is_empty() {
                spans.push(Span::raw(rest.to_owned()));
            }
            break;
        };

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_owned()));
        }
        let marker_len = if modifier == Modifier::BOLD { 2 } else { 1 };
        spans.push(Span::styled(
            rest[start + marker_len..end - marker_len].to_owned(),
            Style::default().add_modifier(modifier),
        ));
        rest = &rest[end..];
    }
    if spans.is_empty() {
        spans.push(Span::raw(String::new()));
    }
    spans
}

fn render_add_panel(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let area = centered_rect(56, 50, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = Vec::with_capacity(WIDGET_DEFINITIONS.len() + 2);
    for (index, definition) in WIDGET_DEFINITIONS.iter().enumerate() {
        let marker = if index == view_data.add_cursor {
            "> "
        } else {
            "  "
        };
        let style = if index == view_data.add_cursor {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}{} {}  {}",
                index + 1,
                definition.display_name,
                definition.description
            ),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter/1-4 add  esc close",
        Style::default().fg(Color::DarkGray),
    )));

    let panel =
        Paragraph::new(lines).block(Block::default().title("add widget").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_title_editor(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let area = centered_rect(48, 18, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(format!("title: {}_", view_data.title_input)),
        Line::from(""),
        Line::from(Span::styled(
            "enter save  esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let editor =
        Paragraph::new(lines).block(Block::default().title("rename widget").borders(Borders::ALL));
    frame.render_widget(editor, area);
}

fn status_hint(role: Role, engine: &DashboardEngine) -> String {
    let undo = if engine.can_undo() { "z undo" } else { "z -" };
    let redo = if engine.can_redo() { "Z redo" } else { "Z -" };
    if role.is_editor() {
        format!(
            "a add  c dup  x del  e title  arrows move  shift+arrows resize  {undo}  {redo}  tab board  j/k select  r refresh  q quit"
        )
    } else {
        "tab board  j/k select  r refresh  q quit  [viewer]".to_owned()
    }
}

fn truncate(text: &str, max: u16) -> String {
    let max = max as usize;
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}~")
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
