//! Walk-in queue board.
//!
//! Shows the live line for every department (or one), lets the desk check
//! patients in and move them through the queue, and keeps the analytics strip
//! current on every reload.

use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::{Department, QueueEntry, QueueStatus};
use crate::notify::Level;
use crate::refresh::RefreshSchedule;
use crate::services::{QueueAnalytics, QueueError, Services};
use crate::tui::Frame;
use crate::validation::{CheckInForm, FieldErrors};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::warn;

const CHECK_IN_FIELDS: [(&str, &str); 3] = [
    ("patient_id", "Patient ID *"),
    ("department_id", "Department ID *"),
    ("notes", "Notes"),
];
const CHECK_IN_SUBMIT: usize = CHECK_IN_FIELDS.len();
const CHECK_IN_CANCEL: usize = CHECK_IN_FIELDS.len() + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Board,
    Search,
    CheckIn,
    /// Remove confirmation; `true` when "Yes" is highlighted.
    ConfirmRemove(bool),
}

/// Board order: called-in patients first, then each line front to back,
/// then finished entries.
fn board_order(entry: &QueueEntry) -> (u8, u64, u32) {
    let rank = match entry.status {
        QueueStatus::InProgress => 0,
        QueueStatus::Waiting => 1,
        QueueStatus::Completed => 2,
        QueueStatus::NoShow => 3,
    };
    (rank, entry.department_id, entry.position)
}

fn status_color(status: QueueStatus) -> Color {
    match status {
        QueueStatus::Waiting => widgets::WARNING,
        QueueStatus::InProgress => widgets::INFO,
        QueueStatus::Completed => widgets::SUCCESS,
        QueueStatus::NoShow => widgets::DANGER,
    }
}

/// Whole minutes the entry has waited, up to completion or `now`.
fn wait_minutes(entry: &QueueEntry, now: OffsetDateTime) -> i64 {
    let until = entry.completed_at.unwrap_or(now);
    (until - entry.check_in_time).whole_minutes().max(0)
}

pub struct QueueBoard {
    entries: Vec<QueueEntry>,
    analytics: QueueAnalytics,
    departments: Vec<Department>,
    patient_names: HashMap<u64, String>,
    /// Index into `departments`; `None` shows every department.
    department_filter: Option<usize>,
    show_closed: bool,
    search: String,
    mode: Mode,
    check_in: CheckInForm,
    check_in_focus: usize,
    check_in_errors: FieldErrors,
    state: TableState,
    schedule: RefreshSchedule,
    loaded_at: OffsetDateTime,
}

impl QueueBoard {
    pub fn new(services: &Services, refresh_interval: Duration) -> Self {
        let mut schedule = RefreshSchedule::new(refresh_interval);
        schedule.start(Instant::now());
        let mut board = Self {
            entries: Vec::new(),
            analytics: QueueAnalytics::default(),
            departments: services.departments.list(),
            patient_names: HashMap::new(),
            department_filter: None,
            show_closed: false,
            search: String::new(),
            mode: Mode::Board,
            check_in: CheckInForm::default(),
            check_in_focus: 0,
            check_in_errors: FieldErrors::default(),
            state: TableState::default(),
            schedule,
            loaded_at: services.clock().now(),
        };
        board.reload(services);
        board
    }

    fn selected_department(&self) -> Option<&Department> {
        self.department_filter.and_then(|i| self.departments.get(i))
    }

    fn selected_entry(&self) -> Option<&QueueEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    fn patient_name(&self, id: u64) -> String {
        self.patient_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Patient #{id}"))
    }

    fn department_name(&self, id: u64) -> String {
        self.departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("Dept #{id}"))
    }

    fn load_entries(&self, services: &Services) -> Result<Vec<QueueEntry>, QueueError> {
        let department = self.selected_department().map(|d| d.id);
        let mut entries = if !self.search.trim().is_empty() {
            services.queue.search(&self.search)?
        } else if let Some(id) = department {
            services.queue.by_department(id)?
        } else if self.show_closed {
            services.queue.all()?
        } else {
            services.queue.active()?
        };

        entries.retain(|e| department.map_or(true, |id| e.department_id == id));
        if !self.show_closed {
            entries.retain(|e| !e.status.is_closed());
        }
        entries.sort_by_key(board_order);
        Ok(entries)
    }

    /// Reloads entries, analytics and patient names.
    fn reload(&mut self, services: &Services) {
        self.loaded_at = services.clock().now();
        self.patient_names = services
            .patients
            .list()
            .into_iter()
            .map(|p| (p.id, p.full_name()))
            .collect();

        match self.load_entries(services) {
            Ok(entries) => self.entries = entries,
            Err(err) => {
                report(services, &err);
                self.entries.clear();
            }
        }
        match services.queue.analytics() {
            Ok(analytics) => self.analytics = analytics,
            Err(err) => report(services, &err),
        }
        widgets::clamp_selection(&mut self.state, self.entries.len());
    }

    fn step_department(&mut self, step: isize) {
        // Slot 0 is "all departments".
        let slots = self.departments.len() as isize + 1;
        let current = self.department_filter.map_or(0, |i| i as isize + 1);
        let next = (current + step).rem_euclid(slots);
        self.department_filter = if next == 0 {
            None
        } else {
            Some(next as usize - 1)
        };
    }

    /// Runs a queue action against the selected entry and reports the outcome.
    fn act_on_selected(
        &mut self,
        services: &mut Services,
        verb: &str,
        action: impl FnOnce(&mut Services, u64) -> Result<QueueEntry, QueueError>,
    ) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let (id, name) = (entry.id, self.patient_name(entry.patient_id));
        match action(services, id) {
            Ok(entry) => services
                .notifier()
                .success(&format!("{} {verb} ({name})", entry.ticket_number)),
            Err(err) => report(services, &err),
        }
        self.reload(services);
    }

    fn call_next(&mut self, services: &mut Services) {
        let department = self
            .selected_department()
            .map(|d| d.id)
            .or_else(|| self.selected_entry().map(|e| e.department_id));
        let Some(department) = department else {
            return;
        };

        match services.queue.call_next(department) {
            Ok(Some(entry)) => {
                let name = self.patient_name(entry.patient_id);
                services
                    .notifier()
                    .success(&format!("Now serving {} ({name})", entry.ticket_number));
            }
            Ok(None) => services.notifier().notify(
                Level::Info,
                &format!("No one is waiting in {}", self.department_name(department)),
            ),
            Err(err) => report(services, &err),
        }
        self.reload(services);
    }

    fn remove_selected(&mut self, services: &mut Services) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let (id, ticket) = (entry.id, entry.ticket_number.clone());
        match services.queue.remove(id) {
            Ok(()) => services
                .notifier()
                .success(&format!("{ticket} removed from the queue")),
            Err(err) => report(services, &err),
        }
        self.reload(services);
    }

    fn open_check_in(&mut self) {
        self.check_in = CheckInForm {
            department_id: self
                .selected_department()
                .map(|d| d.id.to_string())
                .unwrap_or_default(),
            ..CheckInForm::default()
        };
        self.check_in_errors = FieldErrors::default();
        self.check_in_focus = 0;
        self.mode = Mode::CheckIn;
    }

    fn check_in_text(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.check_in.patient_id),
            1 => Some(&mut self.check_in.department_id),
            2 => Some(&mut self.check_in.notes),
            _ => None,
        }
    }

    fn submit_check_in(&mut self, services: &mut Services) {
        let request = match self.check_in.validate() {
            Ok(request) => request,
            Err(errors) => {
                self.check_in_errors = errors;
                return;
            }
        };

        match services.queue.check_in(request) {
            Ok(entry) => {
                let name = self.patient_name(entry.patient_id);
                services.notifier().success(&format!(
                    "{name} checked in: ticket {}, position {}",
                    entry.ticket_number, entry.position
                ));
                self.mode = Mode::Board;
            }
            Err(err) => report(services, &err),
        }
        self.reload(services);
    }

    fn handle_check_in_input(&mut self, key: KeyEvent, services: &mut Services) {
        const STOPS: usize = CHECK_IN_FIELDS.len() + 2;
        let index = self.check_in_focus;
        match key.code {
            KeyCode::Char(c) => {
                if let Some(text) = self.check_in_text(index) {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = self.check_in_text(index) {
                    text.pop();
                }
            }
            KeyCode::Down | KeyCode::Tab => self.check_in_focus = (index + 1) % STOPS,
            KeyCode::Up | KeyCode::BackTab => self.check_in_focus = (index + STOPS - 1) % STOPS,
            KeyCode::Enter => match index {
                CHECK_IN_SUBMIT => self.submit_check_in(services),
                CHECK_IN_CANCEL => self.mode = Mode::Board,
                _ => self.check_in_focus = index + 1,
            },
            KeyCode::Esc => self.mode = Mode::Board,
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent, services: &Services) {
        match key.code {
            KeyCode::Char(c) => self.search.push(c),
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Esc => {
                self.search.clear();
                self.mode = Mode::Board;
            }
            KeyCode::Enter => self.mode = Mode::Board,
            _ => return,
        }
        self.reload(services);
    }

    fn render_analytics(&self, frame: &mut Frame, area: Rect) {
        let stats = &self.analytics;
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 6); 6])
            .split(area);
        let figures = [
            ("In Queue", stats.total_in_queue.to_string(), widgets::INFO),
            ("Waiting", stats.currently_waiting.to_string(), widgets::WARNING),
            ("Served Today", stats.served_today.to_string(), widgets::SUCCESS),
            (
                "Avg Wait",
                format!("{:.1} min", stats.average_wait_minutes),
                widgets::TITLE,
            ),
            ("No-shows Today", stats.no_show_today.to_string(), widgets::DANGER),
            ("All Entries", stats.total_entries.to_string(), widgets::MUTED),
        ];
        for ((title, value, accent), area) in figures.into_iter().zip(cards.iter()) {
            let card = Paragraph::new(vec![
                Line::from(Span::styled(
                    value,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(title, Style::default().fg(widgets::MUTED))),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(widgets::BORDER))
                    .style(Style::default().bg(widgets::PANEL)),
            );
            frame.render_widget(card, *area);
        }
    }

    fn render_check_in(&self, frame: &mut Frame) {
        let area = widgets::centered(frame.area(), 60, 18);
        frame.render_widget(Clear, area);
        let block = widgets::panel(" Check In Patient ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .margin(1)
            .split(inner);

        for (index, (key, label)) in CHECK_IN_FIELDS.iter().enumerate() {
            let value = match index {
                0 => self.check_in.patient_id.as_str(),
                1 => self.check_in.department_id.as_str(),
                _ => self.check_in.notes.as_str(),
            };
            let field = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(1)])
                .split(rows[index]);
            frame.render_widget(
                widgets::input(
                    label,
                    value,
                    self.check_in_focus == index,
                    self.check_in_errors.get(key),
                ),
                field[0],
            );
            let hint = match index {
                0 => value
                    .trim()
                    .parse()
                    .ok()
                    .map(|id| self.patient_name(id)),
                1 => value
                    .trim()
                    .parse()
                    .ok()
                    .map(|id| self.department_name(id)),
                _ => None,
            };
            if let Some(hint) = hint {
                frame.render_widget(
                    Paragraph::new(format!("  → {hint}")).style(Style::default().fg(widgets::HELP)),
                    field[1],
                );
            }
        }

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[4]);
        frame.render_widget(
            widgets::button(
                "Check In",
                self.check_in_focus == CHECK_IN_SUBMIT,
                widgets::SUCCESS,
            ),
            buttons[0],
        );
        frame.render_widget(
            widgets::button("Cancel", self.check_in_focus == CHECK_IN_CANCEL, widgets::DANGER),
            buttons[1],
        );
    }
}

/// Shows a failed queue action to the user.
fn report(services: &Services, err: &QueueError) {
    warn!(error = %err, "queue action failed");
    let level = match err {
        QueueError::NotFound(_) => Level::Warning,
        _ => Level::Error,
    };
    services.notifier().notify(level, &err.to_string());
}

impl Component for QueueBoard {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        match self.mode {
            Mode::CheckIn => {
                self.handle_check_in_input(key, services);
                return Ok(None);
            }
            Mode::Search => {
                self.handle_search_input(key, services);
                return Ok(None);
            }
            Mode::ConfirmRemove(yes) => {
                match key.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                        self.mode = Mode::ConfirmRemove(!yes)
                    }
                    KeyCode::Enter => {
                        self.mode = Mode::Board;
                        if yes {
                            self.remove_selected(services);
                        }
                    }
                    KeyCode::Esc => self.mode = Mode::Board,
                    _ => {}
                }
                return Ok(None);
            }
            Mode::Board => {}
        }

        match key.code {
            KeyCode::Down => widgets::step_selection(&mut self.state, self.entries.len(), 1),
            KeyCode::Up => widgets::step_selection(&mut self.state, self.entries.len(), -1),
            KeyCode::Right => {
                self.step_department(1);
                self.reload(services);
            }
            KeyCode::Left => {
                self.step_department(-1);
                self.reload(services);
            }
            KeyCode::Char('i') | KeyCode::Char('I') => self.open_check_in(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.act_on_selected(services, "called in", |s, id| s.queue.call(id))
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.call_next(services),
            KeyCode::Enter | KeyCode::Char('f') | KeyCode::Char('F') => {
                self.act_on_selected(services, "completed", |s, id| s.queue.complete(id))
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.act_on_selected(services, "marked no-show", |s, id| {
                    s.queue.mark_no_show(id)
                })
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.act_on_selected(services, "back in line", |s, id| {
                    s.queue.set_status(id, QueueStatus::Waiting)
                })
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if self.selected_entry().is_some() {
                    self.mode = Mode::ConfirmRemove(false);
                }
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.show_closed = !self.show_closed;
                self.reload(services);
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(services),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if self.schedule.is_running() {
                    self.schedule.stop();
                } else {
                    self.schedule.start(Instant::now());
                }
            }
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                    self.reload(services);
                } else {
                    return Ok(Some(Transition::Home));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn on_tick(&mut self, services: &mut Services) -> Result<()> {
        // Don't pull the rows out from under an open form or dialog.
        if self.mode == Mode::Board && self.schedule.poll(Instant::now()) {
            self.reload(services);
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "🎫 PATIENT QUEUE");
        self.render_analytics(frame, layout[1]);

        let filters = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(1)
            .split(layout[2]);
        let department = self
            .selected_department()
            .map_or("All departments", |d| d.name.as_str());
        let view = if self.show_closed { "all entries" } else { "active" };
        frame.render_widget(
            widgets::input("Department (←→)", &format!("◄ {department} ► | {view}"), false, None),
            filters[0],
        );
        frame.render_widget(
            widgets::input(
                "Search ticket or status (/)",
                &self.search,
                self.mode == Mode::Search,
                None,
            ),
            filters[1],
        );

        let header = widgets::table_header(&[
            "Ticket",
            "Pos",
            "Patient",
            "Department",
            "Status",
            "Checked In",
            "Wait",
            "Notes",
        ]);
        let rows = self.entries.iter().map(|entry| {
            let position = if entry.status == QueueStatus::Waiting {
                entry.position.to_string()
            } else {
                "-".to_string()
            };
            let checked_in = entry.check_in_time.to_offset(self.loaded_at.offset());
            Row::new(vec![
                Cell::from(entry.ticket_number.clone()),
                Cell::from(position),
                Cell::from(self.patient_name(entry.patient_id)),
                Cell::from(self.department_name(entry.department_id)),
                Cell::from(entry.status.title())
                    .style(Style::default().fg(status_color(entry.status))),
                Cell::from(format!("{:02}:{:02}", checked_in.hour(), checked_in.minute())),
                Cell::from(format!("{} min", wait_minutes(entry, self.loaded_at))),
                Cell::from(entry.notes.clone()),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let focused = self.mode == Mode::Board;
        let refresh = if self.schedule.is_running() {
            "auto-refresh"
        } else {
            "paused"
        };
        let title = format!(" Queue ({}) | {refresh} ", self.entries.len());
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(4),
                Constraint::Percentage(20),
                Constraint::Percentage(16),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(focused))
        .highlight_symbol(if focused { "► " } else { "  " });
        frame.render_stateful_widget(table, layout[3], &mut self.state.clone());

        frame.render_widget(
            widgets::help(
                "I: Check in | C: Call | N: Call next | Enter: Complete | X: No-show | W: Re-queue | D: Remove | H: History | P: Pause | Esc: Back",
            ),
            layout[4],
        );

        match self.mode {
            Mode::CheckIn => self.render_check_in(frame),
            Mode::ConfirmRemove(yes) => {
                let message = match self.selected_entry() {
                    Some(entry) => format!("Remove {} from the queue?", entry.ticket_number),
                    None => "Remove this entry?".to_string(),
                };
                widgets::confirm_dialog(frame, "Confirm Remove", &message, yes);
            }
            Mode::Board | Mode::Search => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed, Stores};
    use crate::notify::RecordingNotifier;
    use crate::services::testing::services_with;
    use crossterm::event::KeyModifiers;
    use std::rc::Rc;
    use time::macros::date;

    fn seeded() -> (Services, Rc<RecordingNotifier>) {
        let mut stores = Stores::memory();
        seed::seed_demo_data(&mut stores, date!(2024 - 06 - 03)).unwrap();
        services_with(stores)
    }

    fn board(services: &Services) -> QueueBoard {
        QueueBoard::new(services, Duration::from_secs(30))
    }

    fn press(board: &mut QueueBoard, services: &mut Services, code: KeyCode) {
        board
            .handle_input(KeyEvent::new(code, KeyModifiers::NONE), services)
            .unwrap();
    }

    fn positions(services: &Services, department: u64) -> Vec<(u64, u32)> {
        services
            .queue
            .waiting(department)
            .unwrap()
            .iter()
            .map(|e| (e.id, e.position))
            .collect()
    }

    #[test]
    fn opens_on_the_active_line() {
        let (services, _) = seeded();
        let board = board(&services);
        let ids: Vec<u64> = board.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 6, 8]);
        assert_eq!(board.analytics.served_today, 1);
        assert_eq!(board.analytics.average_wait_minutes, 35.0);
    }

    #[test]
    fn history_toggle_shows_closed_entries() {
        let (mut services, _) = seeded();
        let mut board = board(&services);
        press(&mut board, &mut services, KeyCode::Char('h'));
        assert_eq!(board.entries.len(), 8);
        assert_eq!(board.entries.last().unwrap().status, QueueStatus::NoShow);
    }

    #[test]
    fn call_next_serves_the_front_of_the_filtered_line() {
        let (mut services, notifier) = seeded();
        let mut board = board(&services);

        // Departments are listed by name: Cardiology, then Emergency.
        press(&mut board, &mut services, KeyCode::Right);
        press(&mut board, &mut services, KeyCode::Right);
        assert_eq!(board.selected_department().unwrap().name, "Emergency");
        assert_eq!(board.entries.len(), 4);

        press(&mut board, &mut services, KeyCode::Char('n'));
        assert_eq!(services.queue.get(2).unwrap().status, QueueStatus::InProgress);
        assert_eq!(positions(&services, 1), [(3, 1), (4, 2)]);
        assert_eq!(notifier.count(Level::Success), 1);
    }

    #[test]
    fn check_in_form_appends_to_the_line() {
        let (mut services, _) = seeded();
        let mut board = board(&services);

        press(&mut board, &mut services, KeyCode::Char('i'));
        press(&mut board, &mut services, KeyCode::Char('5'));
        press(&mut board, &mut services, KeyCode::Down);
        press(&mut board, &mut services, KeyCode::Char('1'));
        press(&mut board, &mut services, KeyCode::Down);
        for c in "walk-in".chars() {
            press(&mut board, &mut services, KeyCode::Char(c));
        }
        press(&mut board, &mut services, KeyCode::Down);
        press(&mut board, &mut services, KeyCode::Enter);

        assert_eq!(board.mode, Mode::Board);
        let line = services.queue.waiting(1).unwrap();
        let newest = line.last().unwrap();
        assert_eq!(newest.patient_id, 5);
        assert_eq!(newest.position, 4);
        assert_eq!(newest.notes, "walk-in");
    }

    #[test]
    fn invalid_check_in_keeps_the_form_open() {
        let (mut services, _) = seeded();
        let mut board = board(&services);
        press(&mut board, &mut services, KeyCode::Char('i'));
        board.check_in_focus = CHECK_IN_SUBMIT;
        press(&mut board, &mut services, KeyCode::Enter);

        assert_eq!(board.mode, Mode::CheckIn);
        assert!(board.check_in_errors.get("patient_id").is_some());
        assert!(board.check_in_errors.get("department_id").is_some());
        assert_eq!(services.queue.all().unwrap().len(), 8);
    }

    #[test]
    fn confirmed_remove_closes_the_gap() {
        let (mut services, _) = seeded();
        let mut board = board(&services);
        // Row 1 is ticket Q100102, front of the Emergency line.
        press(&mut board, &mut services, KeyCode::Down);
        press(&mut board, &mut services, KeyCode::Char('d'));
        press(&mut board, &mut services, KeyCode::Left);
        press(&mut board, &mut services, KeyCode::Enter);

        assert!(services.queue.get(2).is_err());
        assert_eq!(positions(&services, 1), [(3, 1), (4, 2)]);
    }

    #[test]
    fn acting_on_a_vanished_entry_warns() {
        let (mut services, notifier) = seeded();
        let mut board = board(&services);
        press(&mut board, &mut services, KeyCode::Down);
        services.queue.remove(2).unwrap();

        press(&mut board, &mut services, KeyCode::Enter);
        assert_eq!(notifier.count(Level::Warning), 1);
        assert!(board.entries.iter().all(|e| e.id != 2));
    }

    #[test]
    fn wait_counts_up_to_completion() {
        let (services, _) = seeded();
        let done = services.queue.get(5).unwrap();
        assert_eq!(wait_minutes(&done, services.clock().now()), 35);
        let waiting = services.queue.get(2).unwrap();
        assert_eq!(wait_minutes(&waiting, services.clock().now()), 50);
    }
}
