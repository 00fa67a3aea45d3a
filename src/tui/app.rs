//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store, handles
//! keyboard input, and renders the calendar, the daily list, the list of all
//! tasks and the add form.

use std::io;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use uuid::Uuid;

use crate::dates::format_deadline;
use crate::fields::{Category, Priority};
use crate::store::TodoStore;
use crate::task::Task;
use crate::tui::{
    colors::{category_color, ACCENT, DARK_RED, ERROR_RED, HEADER_GRAY},
    enums::{AppState, ConfirmAction, Focus},
    task_form::{TaskForm, COLOR_FIELD, DEADLINE_FIELD, NAME_FIELD, PRIORITY_FIELD},
    utils::centered_rect,
};
use crate::views::{colors_on_day, month_grid, open_count, shift_month, tasks_on_day};

/// Width of one calendar cell: two digits plus up to four dots.
const CALENDAR_CELL: usize = 7;

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TodoStore,
    focus: Focus,
    today: NaiveDate,
    selected_day: NaiveDate,
    daily_state: TableState,
    all_state: TableState,
    form: TaskForm,
    confirm: Option<ConfirmAction>,
    status_message: String,
}

impl App {
    /// Create a new App over an opened store, with today selected.
    pub fn new(store: TodoStore) -> Self {
        let today = Local::now().date_naive();
        Self::with_today(store, today)
    }

    pub fn with_today(store: TodoStore, today: NaiveDate) -> Self {
        let mut app = App {
            state: AppState::Main,
            store,
            focus: Focus::Calendar,
            today,
            selected_day: today,
            daily_state: TableState::default(),
            all_state: TableState::default(),
            form: TaskForm::new(),
            confirm: None,
            status_message: String::new(),
        };
        app.clamp_selection();
        app
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn daily_ids(&self) -> Vec<Uuid> {
        tasks_on_day(self.store.tasks(), self.selected_day)
            .iter()
            .map(|t| t.id)
            .collect()
    }

    fn all_ids(&self) -> Vec<Uuid> {
        self.store.tasks().iter().map(|t| t.id).collect()
    }

    /// Id of the highlighted task in the focused list.
    fn selected_task_id(&self) -> Option<Uuid> {
        match self.focus {
            Focus::Calendar => None,
            Focus::Daily => self.daily_state.selected().and_then(|i| self.daily_ids().get(i).copied()),
            Focus::All => self.all_state.selected().and_then(|i| self.all_ids().get(i).copied()),
        }
    }

    /// Keep list selections inside their lists after any change.
    fn clamp_selection(&mut self) {
        let daily_len = self.daily_ids().len();
        let all_len = self.store.len();
        for (state, len) in [(&mut self.daily_state, daily_len), (&mut self.all_state, all_len)] {
            match (state.selected(), len) {
                (_, 0) => state.select(None),
                (None, _) => state.select(Some(0)),
                (Some(i), n) if i >= n => state.select(Some(n - 1)),
                _ => {}
            }
        }
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn select_day(&mut self, day: NaiveDate) {
        self.selected_day = day;
        self.daily_state.select(None);
        self.clamp_selection();
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.store.toggle(id) {
            Ok(Some(task)) => {
                let msg = format!(
                    "{} '{}'",
                    if task.is_done { "Completed" } else { "Reopened" },
                    task.name
                );
                self.set_status_message(msg);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("toggle failed: {e}");
                self.set_status_message(format!("Error: {e}"));
            }
        }
    }

    fn confirm_delete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            self.set_status_message("Select a task in a list first (Tab)");
            return;
        };
        if let Some(task) = self.store.get(id) {
            self.confirm = Some(ConfirmAction::Delete {
                id,
                name: task.name.clone(),
            });
            self.state = AppState::Confirm;
        }
    }

    fn confirm_clear_completed(&mut self) {
        let count = self.store.tasks().iter().filter(|t| t.is_done).count();
        if count == 0 {
            self.set_status_message("No completed tasks to remove");
            return;
        }
        self.confirm = Some(ConfirmAction::ClearCompleted { count });
        self.state = AppState::Confirm;
    }

    fn run_confirmed(&mut self, action: ConfirmAction) {
        let result = match action {
            ConfirmAction::Delete { id, name } => self
                .store
                .remove(id)
                .map(|_| format!("Deleted '{name}'")),
            ConfirmAction::ClearCompleted { .. } => self
                .store
                .remove_completed()
                .map(|n| format!("Removed {n} completed task(s)")),
        };
        match result {
            Ok(msg) => self.set_status_message(msg),
            Err(e) => {
                warn!("delete failed: {e}");
                self.set_status_message(format!("Error: {e}"));
            }
        }
        self.clamp_selection();
    }

    fn open_form(&mut self) {
        self.form.prefill_deadline(self.selected_day);
        self.state = AppState::AddTask;
    }

    fn submit_form(&mut self) {
        let Some(input) = self.form.submit(self.today) else {
            return;
        };
        match self.store.add(input) {
            Ok(task) => {
                let msg = format!("Added '{}'", task.name);
                self.set_status_message(msg);
                self.form.reset();
                self.state = AppState::Main;
                self.clamp_selection();
            }
            Err(e) => {
                warn!("add failed: {e}");
                self.set_status_message(format!("Error: {e}"));
            }
        }
    }

    fn move_list(&mut self, down: bool) {
        let (state, len) = match self.focus {
            Focus::Calendar => return,
            Focus::Daily => {
                let len = self.daily_ids().len();
                (&mut self.daily_state, len)
            }
            Focus::All => {
                let len = self.store.len();
                (&mut self.all_state, len)
            }
        };
        if len == 0 {
            return;
        }
        let i = state.selected().unwrap_or(0);
        let next = if down { (i + 1).min(len - 1) } else { i.saturating_sub(1) };
        state.select(Some(next));
    }

    fn handle_main_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('a') => self.open_form(),
            KeyCode::Char('C') => self.confirm_clear_completed(),
            KeyCode::Char('d') | KeyCode::Delete => self.confirm_delete_selected(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            KeyCode::Char('t') => {
                self.select_day(self.today);
                self.set_status_message("Jumped to today");
            }
            KeyCode::Char('[') => self.select_day(shift_month(self.selected_day, -1)),
            KeyCode::Char(']') => self.select_day(shift_month(self.selected_day, 1)),
            code => match self.focus {
                Focus::Calendar => {
                    let step = match code {
                        KeyCode::Left => -1,
                        KeyCode::Right => 1,
                        KeyCode::Up => -7,
                        KeyCode::Down => 7,
                        _ => 0,
                    };
                    if step != 0 {
                        if let Some(day) =
                            self.selected_day.checked_add_signed(chrono::Duration::days(step))
                        {
                            self.select_day(day);
                        }
                    }
                }
                Focus::Daily | Focus::All => match code {
                    KeyCode::Up => self.move_list(false),
                    KeyCode::Down => self.move_list(true),
                    KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
                    _ => {}
                },
            },
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyEvent) -> bool {
        let modified = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => self.state = AppState::Main,
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            code => {
                let field = self.form.current_field;
                if field == PRIORITY_FIELD || field == COLOR_FIELD {
                    match code {
                        KeyCode::Left => self.form.cycle(-1),
                        KeyCode::Right | KeyCode::Char(' ') => self.form.cycle(1),
                        _ => {}
                    }
                    return false;
                }
                let Some(input) = self.form.active_input() else {
                    return false;
                };
                match code {
                    KeyCode::Char(_) if modified => return false,
                    KeyCode::Char(c) => input.handle_char(c),
                    KeyCode::Backspace => input.handle_backspace(),
                    KeyCode::Delete => input.handle_delete(),
                    KeyCode::Left => input.move_cursor_left(),
                    KeyCode::Right => input.move_cursor_right(),
                    KeyCode::Home => input.move_home(),
                    KeyCode::End => input.move_end(),
                    _ => return false,
                }
                self.form.after_edit();
            }
        }
        false
    }

    fn handle_confirm_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(action) = self.confirm.take() {
                    self.run_confirmed(action);
                }
                self.state = AppState::Main;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
                self.state = AppState::Main;
                self.set_status_message("Cancelled");
            }
            _ => {}
        }
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if self.state != AppState::AddTask {
            self.status_message.clear();
        }
        match self.state {
            AppState::Main => return self.handle_main_input(key),
            AppState::AddTask => return self.handle_form_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
            AppState::Help => self.state = AppState::Main,
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                debug!("key {:?} in {:?}", key.code, self.state);
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    fn pane_block(&self, title: String, pane: Focus) -> Block<'static> {
        let border = if self.focus == pane && self.state == AppState::Main {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(HEADER_GRAY)
        };
        Block::default().borders(Borders::ALL).border_style(border).title(title)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let text = Line::from(vec![
            Span::styled("TODO CALENDAR", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} open / {} total",
                    open_count(self.store.tasks()),
                    self.store.len()
                ),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let header = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ACCENT)))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_calendar(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled(
                self.selected_day.format("%B %Y").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::from(
                ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
                    .iter()
                    .map(|d| {
                        Span::styled(
                            format!("{d:<width$}", width = CALENDAR_CELL),
                            Style::default().fg(HEADER_GRAY),
                        )
                    })
                    .collect::<Vec<_>>(),
            ),
        ];

        for week in month_grid(self.selected_day) {
            let mut spans = Vec::new();
            for cell in week {
                let Some(day) = cell else {
                    spans.push(Span::raw(" ".repeat(CALENDAR_CELL)));
                    continue;
                };
                let mut style = Style::default();
                if day == self.today {
                    style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                }
                if day == self.selected_day {
                    style = style.bg(Color::Gray).fg(Color::Black);
                }
                spans.push(Span::styled(format!("{:>2}", day.day()), style));
                let colors = colors_on_day(self.store.tasks(), day);
                for c in &colors {
                    spans.push(Span::styled("•", Style::default().fg(category_color(*c))));
                }
                spans.push(Span::raw(" ".repeat(CALENDAR_CELL.saturating_sub(2 + colors.len()))));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(
            Category::ALL
                .iter()
                .flat_map(|c| {
                    [
                        Span::styled("• ", Style::default().fg(category_color(*c))),
                        Span::raw(format!("{}  ", c.as_str())),
                    ]
                })
                .collect::<Vec<_>>(),
        ));

        let calendar = Paragraph::new(lines)
            .block(self.pane_block("Calendar".to_string(), Focus::Calendar))
            .wrap(Wrap { trim: false });
        f.render_widget(calendar, area);
    }

    fn task_rows<'a>(&self, tasks: &[&'a Task]) -> Vec<Row<'a>> {
        tasks
            .iter()
            .map(|&task| {
                let style = if task.is_done {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(if task.is_done { "[x]" } else { "[ ]" }),
                    Cell::from(Span::styled("●", Style::default().fg(category_color(task.color)))),
                    Cell::from(priority_text(task.priority)),
                    Cell::from(format_deadline(task.deadline, self.today)),
                    Cell::from(task.name.as_str()),
                ])
                .style(style)
            })
            .collect()
    }

    fn render_task_table(&mut self, f: &mut Frame, area: Rect, pane: Focus) {
        let tasks: Vec<&Task> = match pane {
            Focus::Daily => tasks_on_day(self.store.tasks(), self.selected_day),
            _ => self.store.tasks().iter().collect(),
        };
        let title = match pane {
            Focus::Daily => format!(
                "Daily: {} ({})",
                self.selected_day.format("%Y-%m-%d %a"),
                tasks.len()
            ),
            _ => format!("All tasks ({})", tasks.len()),
        };
        let block = self.pane_block(title, pane);

        if tasks.is_empty() {
            let empty = match pane {
                Focus::Daily => "No tasks scheduled for this day.",
                _ => "No tasks yet. Press 'a' to add one.",
            };
            let p = Paragraph::new(Span::styled(empty, Style::default().fg(HEADER_GRAY))).block(block);
            f.render_widget(p, area);
            return;
        }

        let header = Row::new(["", "", "Pri", "Deadline", "Name"].iter().map(|h| {
            Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().fg(Color::White).bg(ACCENT));

        let widths = [
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(26),
            Constraint::Min(10),
        ];
        let rows = self.task_rows(&tasks);
        let focused = self.focus == pane;
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(if focused {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default()
            })
            .highlight_symbol(if focused { ">> " } else { "   " });

        let state = match pane {
            Focus::Daily => &mut self.daily_state,
            _ => &mut self.all_state,
        };
        f.render_stateful_widget(table, area, state);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .title("Add New Task")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(1), // Name error
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Category
                Constraint::Length(3), // Deadline
                Constraint::Length(1), // Deadline error
                Constraint::Min(1),    // Instructions
            ])
            .split(inner);

        let field_block = |title: &'static str, field: usize, error: bool| {
            let style = if error {
                Style::default().fg(ERROR_RED)
            } else if self.form.current_field == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Block::default().borders(Borders::ALL).border_style(style).title(title)
        };

        f.render_widget(
            Paragraph::new(self.form.name.value.as_str())
                .block(field_block("Name (2-32 characters)", NAME_FIELD, self.form.name_error.is_some())),
            chunks[0],
        );
        if let Some(err) = &self.form.name_error {
            f.render_widget(error_line(err), chunks[1]);
        }

        let priority_spans = Priority::ALL
            .iter()
            .flat_map(|p| {
                let selected = *p == self.form.selected_priority();
                [
                    Span::styled(
                        format!("({}) {}", if selected { "•" } else { " " }, p.label()),
                        if selected {
                            Style::default().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(HEADER_GRAY)
                        },
                    ),
                    Span::raw("   "),
                ]
            })
            .collect::<Vec<_>>();
        f.render_widget(
            Paragraph::new(Line::from(priority_spans)).block(field_block("Priority", PRIORITY_FIELD, false)),
            chunks[2],
        );

        let color = self.form.selected_color();
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("◀ "),
                Span::styled("● ", Style::default().fg(category_color(color))),
                Span::raw(color.label()),
                Span::raw(" ▶"),
            ]))
            .block(field_block("Category (color)", COLOR_FIELD, false)),
            chunks[3],
        );

        f.render_widget(
            Paragraph::new(self.form.deadline.value.as_str()).block(field_block(
                "Deadline (YYYY-MM-DD HH:MM, empty for none)",
                DEADLINE_FIELD,
                self.form.deadline_error.is_some(),
            )),
            chunks[4],
        );
        if let Some(err) = &self.form.deadline_error {
            f.render_widget(error_line(err), chunks[5]);
        }

        let instructions = Paragraph::new(
            "Tab/↑↓ move between fields  ←→ change selection  Enter add  Esc back",
        )
        .style(Style::default().fg(HEADER_GRAY))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(instructions, chunks[6]);

        let cursor_target = match self.form.current_field {
            NAME_FIELD => Some((chunks[0], &self.form.name)),
            DEADLINE_FIELD => Some((chunks[4], &self.form.deadline)),
            _ => None,
        };
        if let Some((rect, input)) = cursor_target {
            let max_x = rect.width.saturating_sub(2);
            let column = u16::try_from(input.cursor_column()).unwrap_or(u16::MAX);
            f.set_cursor_position((rect.x + 1 + column.min(max_x), rect.y + 1));
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let rows = [
            ("Tab / Shift+Tab", "Switch between calendar, daily list and all tasks"),
            ("←→↑↓", "Calendar: move the selected day"),
            ("[ / ]", "Previous / next month"),
            ("t", "Jump to today"),
            ("↑↓", "Lists: move selection"),
            ("Space / Enter", "Lists: toggle done"),
            ("a", "Add a new task"),
            ("d", "Delete the selected task"),
            ("C", "Delete all completed tasks"),
            ("h / ?", "This help"),
            ("q / Esc / Ctrl+C", "Quit"),
        ];
        let mut lines = vec![Line::from("")];
        for (key, desc) in rows {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:>16}  "), Style::default().fg(Color::Yellow)),
                Span::raw(desc),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Press any key to return").alignment(Alignment::Center));
        let area = centered_rect(70, 70, area);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help")),
            area,
        );
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(self.confirm.as_ref().map(ConfirmAction::describe).unwrap_or_default()),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Main => format!(
                    "{} | Tab switch pane | a add | C clear completed | h help | q quit",
                    self.selected_day.format("%Y-%m-%d")
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(text).style(Style::default().bg(ACCENT).fg(Color::White));
        f.render_widget(status, area);
    }

    /// Main render function.
    fn render(&mut self, f: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, outer[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((CALENDAR_CELL * 7 + 2) as u16),
                Constraint::Min(30),
            ])
            .split(outer[1]);
        self.render_calendar(f, body[0]);

        let lists = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        self.render_task_table(f, lists[0], Focus::Daily);
        self.render_task_table(f, lists[1], Focus::All);

        match self.state {
            AppState::Main => {}
            AppState::AddTask => self.render_form(f, outer[1]),
            AppState::Help => self.render_help(f, outer[1]),
            AppState::Confirm => self.render_confirm(f, outer[1]),
        }

        self.render_status_bar(f, outer[2]);
    }

    /// Main event loop. Redraws after every input poll until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.today = Local::now().date_naive();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn priority_text(p: Priority) -> Span<'static> {
    let color = match p {
        Priority::High => ERROR_RED,
        Priority::Medium => Color::Yellow,
        Priority::Low => HEADER_GRAY,
    };
    Span::styled(p.label(), Style::default().fg(color))
}

fn error_line(msg: &str) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::styled("⚠ ", Style::default().fg(ERROR_RED)),
        Span::styled(msg, Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::to_local;
    use crate::store::snapshot_file_name;
    use crate::task::NewTask;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app_with_tasks() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let mut store = TodoStore::open(dir.path().join(snapshot_file_name())).unwrap();
        let at = |d: NaiveDate| to_local(d.and_hms_opt(10, 0, 0).unwrap());
        store
            .add(NewTask::new("Low today").priority(Priority::Low).deadline(at(day(2024, 5, 10))))
            .unwrap();
        store
            .add(NewTask::new("High today").priority(Priority::High).deadline(at(day(2024, 5, 10))))
            .unwrap();
        store
            .add(NewTask::new("Tomorrow").deadline(at(day(2024, 5, 11))))
            .unwrap();
        (dir, App::with_today(store, day(2024, 5, 10)))
    }

    #[test]
    fn test_calendar_navigation() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_day(), day(2024, 5, 11));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_day(), day(2024, 5, 18));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.selected_day(), day(2024, 6, 18));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.selected_day(), day(2024, 5, 10));
    }

    #[test]
    fn test_toggle_from_daily_list_hits_highest_priority_first() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char(' '));
        let done: Vec<&str> = app
            .store()
            .tasks()
            .iter()
            .filter(|t| t.is_done)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(done, ["High today"]);
    }

    #[test]
    fn test_add_form_rejects_then_accepts() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state(), AppState::AddTask);

        type_text(&mut app, "x");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::AddTask);
        assert_eq!(app.store().len(), 3);

        type_text(&mut app, "y");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state(), AppState::Main);
        assert_eq!(app.store().len(), 4);
        let added = &app.store().tasks()[3];
        assert_eq!(added.name, "xy");
        assert_eq!(added.deadline_day(), Some(day(2024, 5, 10)));
        assert_eq!(app.status_message(), "Added 'xy'");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state(), AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store().len(), 3);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store().len(), 2);
        assert_eq!(app.store().tasks()[0].name, "High today");
    }

    #[test]
    fn test_clear_completed() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Char('C'));
        assert_eq!(app.state(), AppState::Main);
        assert_eq!(app.status_message(), "No completed tasks to remove");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store().len(), 2);
        assert!(app.store().tasks().iter().all(|t| !t.is_done));
    }

    #[test]
    fn test_quit_keys() {
        let (_dir, mut app) = app_with_tasks();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_ctrl_c_in_form_quits_without_typing() {
        let (_dir, mut app) = app_with_tasks();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "ab");
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(app.form.name.value, "ab");
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert_eq!(app.form.name.value, "ab");
        assert_eq!(app.store().len(), 3);
    }

    #[test]
    fn test_failed_save_shows_error_and_keeps_form() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file.txt");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = TodoStore::open(blocker.join(snapshot_file_name())).unwrap();
        let mut app = App::with_today(store, day(2024, 5, 10));

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Essay");
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message().starts_with("Error:"));
        assert_eq!(app.state(), AppState::AddTask);
        assert_eq!(app.form.name.value, "Essay");
        assert!(app.store().is_empty());

        press(&mut app, KeyCode::Enter);
        assert!(app.store().is_empty());

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Error:"));
    }

    #[test]
    fn test_calendar_cell_fits_four_dots() {
        let dir = TempDir::new().unwrap();
        let mut store = TodoStore::open(dir.path().join(snapshot_file_name())).unwrap();
        let due = to_local(day(2024, 5, 10).and_hms_opt(9, 0, 0).unwrap());
        for (i, color) in Category::ALL.into_iter().enumerate() {
            store.add(NewTask::new(format!("task {i}")).color(color).deadline(due)).unwrap();
        }
        let mut app = App::with_today(store, day(2024, 5, 10));

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("10•••• 11"));
    }

    #[test]
    fn test_render_shows_dots_and_daily_list() {
        let (_dir, mut app) = app_with_tasks();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("May 2024"));
        assert!(text.contains("High today"));
        assert!(text.contains("Daily: 2024-05-10"));
        assert!(text.contains("•"));
    }
}
